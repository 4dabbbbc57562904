//! Implementation objects behind a proxy
//!
//! Targets, mixins and class-proxy base objects all implement
//! [`ProxyTarget`]: they report their type descriptor and execute a method
//! against a set of argument slots.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use interpose_types::{MethodDescriptor, TypeDescriptor};

use crate::error::InvocationError;
use crate::value::{Arguments, Value};

/// An object a proxy can forward calls to
pub trait ProxyTarget: Send + Sync {
    /// Runtime type of this object
    fn type_descriptor(&self) -> Arc<TypeDescriptor>;

    /// Execute `method` with the given arguments.
    ///
    /// `method` is the member as implemented by this object, closed over
    /// any generic arguments. Out and ref parameters are written back into
    /// `args`.
    fn invoke(&self, method: &MethodDescriptor, args: &mut Arguments) -> Result<Value, InvocationError>;

    /// Get the target as Any for downcasting
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyTarget")
            .field("type", &self.type_descriptor().to_string())
            .finish()
    }
}

/// Check whether two targets are the same object
pub fn same_target(a: &Arc<dyn ProxyTarget>, b: &Arc<dyn ProxyTarget>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
