//! Per-call invocation context
//!
//! An [`Invocation`] carries one call through the interceptor chain. The
//! chain is walked with an explicit cursor: [`Invocation::proceed`] enters
//! the next interceptor, or the implementation once the chain is exhausted,
//! and restores the cursor on return so an interceptor may proceed more
//! than once.

use std::sync::Arc;

use interpose_types::{MethodDescriptor, TypeDescriptor, TypeRef};

use crate::error::InvocationError;
use crate::generation::cache_key::ProxyKind;
use crate::generation::catalog::{CatalogEntry, Provider};
use crate::proxy::instance::{provides, CallOutcome, ProxyInstance};
use crate::proxy::interceptor::Interceptor;
use crate::proxy::target::ProxyTarget;
use crate::value::{Arguments, Value};

/// Lifecycle of an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Constructed, not started
    Created,
    /// Asking the selector for the interceptor chain
    SelectingInterceptors,
    /// Walking the chain
    Dispatching,
    /// Finished normally
    Completed,
    /// Finished with an error
    Faulted,
}

/// Context of one proxied call
pub struct Invocation<'a> {
    proxy: &'a ProxyInstance,
    entry: &'a CatalogEntry,
    method: Arc<MethodDescriptor>,
    method_on_target: Option<Arc<MethodDescriptor>>,
    generic_args: Vec<TypeRef>,
    arguments: Arguments,
    target: Option<Arc<dyn ProxyTarget>>,
    /// Call is routed to the proxy's target, which may be swapped
    retargetable: bool,
    chain: Arc<[Arc<dyn Interceptor>]>,
    cursor: usize,
    return_value: Value,
    state: InvocationState,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(
        proxy: &'a ProxyInstance,
        entry: &'a CatalogEntry,
        method: Arc<MethodDescriptor>,
        method_on_target: Option<Arc<MethodDescriptor>>,
        generic_args: Vec<TypeRef>,
        arguments: Arguments,
        target: Option<Arc<dyn ProxyTarget>>,
        retargetable: bool,
    ) -> Self {
        Self {
            proxy,
            entry,
            method,
            method_on_target,
            generic_args,
            arguments,
            target,
            retargetable,
            chain: Arc::from(Vec::new()),
            cursor: 0,
            return_value: Value::Null,
            state: InvocationState::Created,
        }
    }

    /// Select the chain and dispatch the call
    pub(crate) fn run(mut self) -> Result<CallOutcome, InvocationError> {
        self.state = InvocationState::SelectingInterceptors;
        self.chain = self.proxy.chain_for(self.entry);

        self.state = InvocationState::Dispatching;
        match self.proceed() {
            Ok(()) => {
                self.state = InvocationState::Completed;
                Ok(CallOutcome {
                    return_value: self.return_value,
                    arguments: self.arguments,
                })
            }
            Err(err) => {
                self.state = InvocationState::Faulted;
                Err(err)
            }
        }
    }

    /// Continue with the next interceptor, or the implementation at the end
    /// of the chain.
    ///
    /// Fails with [`InvocationError::NoImplementation`] when the chain is
    /// exhausted and nothing implements the member.
    pub fn proceed(&mut self) -> Result<(), InvocationError> {
        if self.cursor < self.chain.len() {
            let interceptor = Arc::clone(&self.chain[self.cursor]);
            self.cursor += 1;
            let result = interceptor.intercept(self);
            self.cursor -= 1;
            return result;
        }

        match (&self.target, &self.method_on_target) {
            (Some(target), Some(method)) => {
                self.return_value = target.invoke(method, &mut self.arguments)?;
                Ok(())
            }
            _ => Err(InvocationError::NoImplementation {
                method: self.method.to_string(),
            }),
        }
    }

    /// Swap the target for the rest of this call only.
    ///
    /// Only proxies created with a target interface support this, and only
    /// for calls routed to the target. The replacement must implement the
    /// proxied interface and the interface declaring the member.
    pub fn change_invocation_target(&mut self, target: Arc<dyn ProxyTarget>) -> Result<(), InvocationError> {
        let proxy_type = self.proxy.proxy_type();
        if proxy_type.kind() != ProxyKind::InterfaceWithTargetInterface || !self.retargetable {
            return Err(InvocationError::TargetChangeNotSupported {
                method: self.method.to_string(),
            });
        }
        let target_type = target.type_descriptor();
        if !target_type.implements(proxy_type.target_type()) {
            return Err(InvocationError::IncompatibleTarget {
                target: target_type.to_string(),
                interface: proxy_type.target_type().to_string(),
            });
        }
        if self.entry.provider != Provider::Target && !provides(target.as_ref(), self.entry) {
            return Err(InvocationError::IncompatibleTarget {
                target: target_type.to_string(),
                interface: self
                    .entry
                    .interface
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            });
        }
        self.target = Some(target);
        Ok(())
    }

    // ========================================================================
    // Arguments and return value
    // ========================================================================

    /// Read an argument
    pub fn argument(&self, index: usize) -> Result<&Value, InvocationError> {
        self.arguments.get(index)
    }

    /// Overwrite an argument
    pub fn set_argument(&mut self, index: usize, value: Value) -> Result<(), InvocationError> {
        self.arguments.set(index, value)
    }

    /// All arguments
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Current return value
    pub fn return_value(&self) -> &Value {
        &self.return_value
    }

    /// Set the return value
    pub fn set_return_value(&mut self, value: Value) {
        self.return_value = value;
    }

    // ========================================================================
    // Call context
    // ========================================================================

    /// The proxy instance being called
    pub fn proxy(&self) -> &ProxyInstance {
        self.proxy
    }

    /// The object that will execute the call, if any
    pub fn invocation_target(&self) -> Option<&Arc<dyn ProxyTarget>> {
        self.target.as_ref()
    }

    /// Type of the invocation target, if any
    pub fn target_type(&self) -> Option<Arc<TypeDescriptor>> {
        self.target.as_ref().map(|t| t.type_descriptor())
    }

    /// Method as proxied, closed over the call's generic arguments
    pub fn method(&self) -> &Arc<MethodDescriptor> {
        &self.method
    }

    /// Method as implemented on the target, closed over the call's generic
    /// arguments
    pub fn method_invocation_target(&self) -> Option<&Arc<MethodDescriptor>> {
        self.method_on_target.as_ref()
    }

    /// Generic arguments of the call
    pub fn generic_arguments(&self) -> &[TypeRef] {
        &self.generic_args
    }

    /// Lifecycle state
    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Position in the interceptor chain
    pub fn chain_position(&self) -> usize {
        self.cursor
    }
}
