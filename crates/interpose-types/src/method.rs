//! Method descriptors and method identity
//!
//! A [`MethodDescriptor`] describes one member as declared on a type. Two
//! derived keys exist:
//!
//! - [`MethodId`] is full identity: declaring type, name, parameter types,
//!   generic arity and generic arguments. The open and closed forms of a
//!   generic method have different ids.
//! - [`MethodSignature`] ignores the declaring type and is used to map an
//!   interface member onto the class member implementing it.

use std::fmt;

use crate::ty::{TypeRef, Visibility};

/// How an argument is passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PassingMode {
    /// By value
    #[default]
    In,
    /// Written by the callee, read back by the caller
    Out,
    /// Read and written by both
    Ref,
}

impl PassingMode {
    /// Whether the callee's final value is handed back to the caller
    pub fn is_by_ref(self) -> bool {
        matches!(self, PassingMode::Out | PassingMode::Ref)
    }
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: TypeRef,
    /// Passing mode
    pub mode: PassingMode,
}

/// What kind of member a method descriptor backs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Ordinary method
    Method,
    /// Getter of the named property
    PropertyGet(String),
    /// Setter of the named property
    PropertySet(String),
    /// Add accessor of the named event
    EventAdd(String),
    /// Remove accessor of the named event
    EventRemove(String),
}

impl MemberKind {
    /// Check if this is a property or event accessor
    pub fn is_accessor(&self) -> bool {
        !matches!(self, MemberKind::Method)
    }
}

/// Method modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MethodModifiers {
    /// Can be overridden
    pub is_virtual: bool,
    /// Has no body
    pub is_abstract: bool,
    /// Override that cannot be overridden further
    pub is_sealed: bool,
    /// Static method
    pub is_static: bool,
    /// Finalizer
    pub is_finalizer: bool,
}

/// Description of a method as declared on a type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    /// Method name
    pub name: String,
    /// Type declaring this method
    pub declaring_type: TypeRef,
    /// Parameters in order
    pub parameters: Vec<ParameterDescriptor>,
    /// Return type
    pub return_type: TypeRef,
    /// Declared generic parameter names
    pub generic_params: Vec<String>,
    /// Generic arguments once closed
    pub generic_args: Vec<TypeRef>,
    /// Accessibility
    pub visibility: Visibility,
    /// Modifiers
    pub modifiers: MethodModifiers,
    /// Backing member kind
    pub kind: MemberKind,
}

impl MethodDescriptor {
    /// Full identity of this method
    pub fn id(&self) -> MethodId {
        MethodId {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            parameter_types: self.parameter_types(),
            generic_arity: self.generic_params.len(),
            generic_args: self.generic_args.clone(),
        }
    }

    /// Signature used for interface mapping
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            parameter_types: self.parameter_types(),
            generic_arity: self.generic_params.len(),
        }
    }

    /// Parameter types in order
    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.ty.clone()).collect()
    }

    /// Number of generic parameters
    pub fn generic_arity(&self) -> usize {
        self.generic_params.len()
    }

    /// Check if this is a generic method that has not been closed yet
    pub fn is_generic_method_definition(&self) -> bool {
        !self.generic_params.is_empty() && self.generic_args.is_empty()
    }

    /// Check if a derived type may override this method
    pub fn is_overridable(&self) -> bool {
        (self.modifiers.is_virtual || self.modifiers.is_abstract) && !self.modifiers.is_sealed
    }

    /// Check if generated code may reach this method
    pub fn is_accessible(&self) -> bool {
        self.visibility.is_member_accessible()
    }

    /// Check if any parameter is passed by reference
    pub fn has_by_ref_parameters(&self) -> bool {
        self.parameters.iter().any(|p| p.mode.is_by_ref())
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        if !self.generic_args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        } else if !self.generic_params.is_empty() {
            write!(f, "<{}>", self.generic_params.join(", "))?;
        }
        write!(f, "(")?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match param.mode {
                PassingMode::In => {}
                PassingMode::Out => write!(f, "out ")?,
                PassingMode::Ref => write!(f, "ref ")?,
            }
            write!(f, "{}", param.ty)?;
        }
        write!(f, ")")
    }
}

/// Identity of a method
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
    /// Declaring type
    pub declaring_type: TypeRef,
    /// Method name
    pub name: String,
    /// Parameter types
    pub parameter_types: Vec<TypeRef>,
    /// Number of generic parameters
    pub generic_arity: usize,
    /// Generic arguments (empty for open or non-generic methods)
    pub generic_args: Vec<TypeRef>,
}

impl fmt::Display for MethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)?;
        if self.generic_arity > 0 {
            write!(f, "`{}", self.generic_arity)?;
        }
        write!(f, "(")?;
        for (i, ty) in self.parameter_types.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", ty)?;
        }
        write!(f, ")")
    }
}

/// Name, parameter types and generic arity, without the declaring type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// Parameter types
    pub parameter_types: Vec<TypeRef>,
    /// Number of generic parameters
    pub generic_arity: usize,
}
