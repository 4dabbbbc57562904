//! Interpose Type Model
//!
//! Descriptors standing in for runtime types: classes, interfaces, their
//! methods, properties and events, plus generic substitution and closing.
//! Descriptors are plain data; the proxy engine reads them to decide what
//! can be intercepted and how calls map from an interface onto a target.

#![warn(missing_docs)]

pub mod builder;
pub mod error;
pub mod generics;
pub mod method;
pub mod ty;

pub use builder::{EventBuilder, MethodBuilder, PropertyBuilder, TypeBuilder};
pub use error::TypeError;
pub use generics::Substitution;
pub use method::{
    MemberKind, MethodDescriptor, MethodId, MethodModifiers, MethodSignature, ParameterDescriptor,
    PassingMode,
};
pub use ty::{
    EventDescriptor, NamedType, PropertyDescriptor, TypeDescriptor, TypeKind, TypeRef, Visibility,
};
