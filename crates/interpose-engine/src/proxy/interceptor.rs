//! Interception policies
//!
//! - [`Interceptor`]: runs inside the call pipeline of every intercepted member
//! - [`InterceptorSelector`]: picks which interceptors apply to a method
//! - [`GenerationHook`]: decides at generation time which members are intercepted

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use interpose_types::{MethodDescriptor, TypeDescriptor};

use crate::error::InvocationError;
use crate::proxy::invocation::Invocation;

/// A unit of cross-cutting logic in a proxied member's call pipeline
pub trait Interceptor: Send + Sync {
    /// Handle one call.
    ///
    /// Call [`Invocation::proceed`] to continue down the chain, or set a
    /// return value and return without proceeding to short-circuit.
    fn intercept(&self, invocation: &mut Invocation<'_>) -> Result<(), InvocationError>;

    /// Get the interceptor as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor").field("name", &self.name()).finish()
    }
}

/// Closure-backed interceptor
pub struct FnInterceptor<F> {
    name: String,
    func: F,
}

impl<F> FnInterceptor<F>
where
    F: Fn(&mut Invocation<'_>) -> Result<(), InvocationError> + Send + Sync + 'static,
{
    /// Wrap a closure
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Wrap a closure into a shareable interceptor
    pub fn shared(name: impl Into<String>, func: F) -> Arc<dyn Interceptor> {
        Arc::new(Self::new(name, func))
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: Fn(&mut Invocation<'_>) -> Result<(), InvocationError> + Send + Sync + 'static,
{
    fn intercept(&self, invocation: &mut Invocation<'_>) -> Result<(), InvocationError> {
        (self.func)(invocation)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Chooses the interceptors that apply to one method.
///
/// Asked at most once per proxy instance and method; the answer is reused
/// for every later call.
pub trait InterceptorSelector: Send + Sync {
    /// Return the ordered subset of `interceptors` to run for `method`
    fn select_interceptors(
        &self,
        target_type: &TypeDescriptor,
        method: &MethodDescriptor,
        interceptors: &[Arc<dyn Interceptor>],
    ) -> Vec<Arc<dyn Interceptor>>;
}

/// Generation-time policy over which members get intercepted
pub trait GenerationHook: Send + Sync {
    /// Whether `method` of `ty` should be routed through interceptors
    fn should_intercept(&self, ty: &TypeDescriptor, method: &MethodDescriptor) -> bool;

    /// Called for accessible members that cannot be intercepted
    fn non_proxyable_member(&self, ty: &TypeDescriptor, method: &MethodDescriptor) {
        let _ = (ty, method);
    }

    /// Called once every member has been inspected
    fn methods_inspected(&self) {}
}

/// Hook that intercepts every eligible member
#[derive(Debug, Default, Clone, Copy)]
pub struct AllMethodsHook;

impl GenerationHook for AllMethodsHook {
    fn should_intercept(&self, _ty: &TypeDescriptor, _method: &MethodDescriptor) -> bool {
        true
    }
}

/// Selector that keeps interceptors whose concrete type is `T`
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeFilterSelector<T> {
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Any> TypeFilterSelector<T> {
    /// Create the selector
    pub fn new() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: Any> InterceptorSelector for TypeFilterSelector<T> {
    fn select_interceptors(
        &self,
        _target_type: &TypeDescriptor,
        _method: &MethodDescriptor,
        interceptors: &[Arc<dyn Interceptor>],
    ) -> Vec<Arc<dyn Interceptor>> {
        interceptors
            .iter()
            .filter(|i| i.as_any().is::<T>())
            .cloned()
            .collect()
    }
}
