//! Proxy instances
//!
//! A [`ProxyInstance`] pairs a shared [`ProxyType`] with per-instance state:
//! the target, the mixin instances and the configured interceptors. Calls
//! look up the member in the type's catalog, resolve the implementing
//! object from the member's provider, and run an [`Invocation`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use interpose_types::{MemberKind, MethodDescriptor, MethodId, TypeDescriptor, TypeRef};

use crate::error::InvocationError;
use crate::generation::catalog::{CatalogEntry, Provider};
use crate::generation::mixin::MixinData;
use crate::proxy::interceptor::Interceptor;
use crate::proxy::invocation::Invocation;
use crate::proxy::proxy_type::ProxyType;
use crate::proxy::target::ProxyTarget;
use crate::proxy::util::PROXY_TARGET_ACCESSOR_NAME;
use crate::value::{Arguments, Value};

/// Result of a completed call
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    /// Return value
    pub return_value: Value,
    /// Final argument slots; out and ref parameters carry the callee's values
    pub arguments: Arguments,
}

type Chain = Arc<[Arc<dyn Interceptor>]>;

/// Object and member a call resolves to
struct Resolution {
    target: Option<Arc<dyn ProxyTarget>>,
    method: Option<Arc<MethodDescriptor>>,
    /// Routed to the proxy's own target rather than a mixin
    on_proxy_target: bool,
}

/// An instance of a generated proxy type
pub struct ProxyInstance {
    proxy_type: Arc<ProxyType>,
    target: Option<Arc<dyn ProxyTarget>>,
    mixins: MixinData,
    interceptors: Chain,
    /// Selector answers, per proxied method
    chains: DashMap<MethodId, Chain>,
}

impl ProxyInstance {
    pub(crate) fn new(
        proxy_type: Arc<ProxyType>,
        target: Option<Arc<dyn ProxyTarget>>,
        mixins: MixinData,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Self {
        Self {
            proxy_type,
            target,
            mixins,
            interceptors: Arc::from(interceptors),
            chains: DashMap::new(),
        }
    }

    /// The generated type
    pub fn proxy_type(&self) -> &Arc<ProxyType> {
        &self.proxy_type
    }

    /// Target (or base implementation object), if any
    pub fn target(&self) -> Option<&Arc<dyn ProxyTarget>> {
        self.target.as_ref()
    }

    /// Mixin instances
    pub fn mixins(&self) -> &MixinData {
        &self.mixins
    }

    /// Configured interceptors, in order
    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Call a non-generic member by name
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, InvocationError> {
        let entry = self.find_method(name, 0, args.len())?;
        Ok(self.dispatch(entry, &[], args)?.return_value)
    }

    /// Call a generic member by name, closing it over `type_args`
    pub fn call_generic(
        &self,
        name: &str,
        type_args: &[TypeRef],
        args: Vec<Value>,
    ) -> Result<Value, InvocationError> {
        let entry = self.find_method(name, type_args.len(), args.len())?;
        Ok(self.dispatch(entry, type_args, args)?.return_value)
    }

    /// Call a member through a specific interface; disambiguates members
    /// with the same shape on different interfaces
    pub fn call_interface(
        &self,
        iface: &TypeDescriptor,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, InvocationError> {
        let candidates = self.proxy_type.catalog().find_on_interface(iface, name, 0, args.len());
        let entry = self.single(name, candidates)?;
        Ok(self.dispatch(entry, &[], args)?.return_value)
    }

    /// Call an exact member, returning the return value and the final
    /// argument slots
    pub fn invoke(
        &self,
        method: &MethodDescriptor,
        type_args: &[TypeRef],
        args: Vec<Value>,
    ) -> Result<CallOutcome, InvocationError> {
        let entry = self
            .proxy_type
            .catalog()
            .entry(&method.id())
            .ok_or_else(|| self.not_found(&method.to_string()))?;
        self.dispatch(entry, type_args, args)
    }

    /// Read a property
    pub fn get_property(&self, name: &str) -> Result<Value, InvocationError> {
        let entry = self.accessor(MemberKind::PropertyGet(name.to_string()), name)?;
        Ok(self.dispatch(entry, &[], Vec::new())?.return_value)
    }

    /// Write a property
    pub fn set_property(&self, name: &str, value: Value) -> Result<(), InvocationError> {
        let entry = self.accessor(MemberKind::PropertySet(name.to_string()), name)?;
        self.dispatch(entry, &[], vec![value]).map(|_| ())
    }

    /// Subscribe to an event
    pub fn add_event_handler(&self, name: &str, handler: Value) -> Result<(), InvocationError> {
        let entry = self.accessor(MemberKind::EventAdd(name.to_string()), name)?;
        self.dispatch(entry, &[], vec![handler]).map(|_| ())
    }

    /// Unsubscribe from an event
    pub fn remove_event_handler(&self, name: &str, handler: Value) -> Result<(), InvocationError> {
        let entry = self.accessor(MemberKind::EventRemove(name.to_string()), name)?;
        self.dispatch(entry, &[], vec![handler]).map(|_| ())
    }

    /// Find the single member matching a name, generic arity and argument count
    pub fn find_method(
        &self,
        name: &str,
        generic_arity: usize,
        arg_count: usize,
    ) -> Result<&CatalogEntry, InvocationError> {
        let candidates = self.proxy_type.catalog().find(name, generic_arity, arg_count);
        self.single(name, candidates)
    }

    fn accessor(&self, kind: MemberKind, name: &str) -> Result<&CatalogEntry, InvocationError> {
        let candidates = self.proxy_type.catalog().accessor(&kind);
        self.single(name, candidates)
    }

    fn single<'e>(&self, name: &str, candidates: Vec<&'e CatalogEntry>) -> Result<&'e CatalogEntry, InvocationError> {
        match candidates.len() {
            0 => Err(self.not_found(name)),
            1 => Ok(candidates[0]),
            n => Err(InvocationError::AmbiguousMethod {
                proxy: self.proxy_type.name().to_string(),
                name: name.to_string(),
                candidates: n,
            }),
        }
    }

    fn not_found(&self, name: &str) -> InvocationError {
        InvocationError::MethodNotFound {
            proxy: self.proxy_type.name().to_string(),
            name: name.to_string(),
        }
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(
        &self,
        entry: &CatalogEntry,
        type_args: &[TypeRef],
        args: Vec<Value>,
    ) -> Result<CallOutcome, InvocationError> {
        let method = self.proxy_type.close_method(&entry.method, type_args)?;
        let Resolution {
            target,
            method: method_on_target,
            on_proxy_target,
        } = self.resolve_implementation(entry, type_args)?;
        let mut arguments = Arguments::new(args);

        if !entry.intercepted {
            return match (target, method_on_target) {
                (Some(target), Some(implementation)) => {
                    let return_value = target.invoke(&implementation, &mut arguments)?;
                    Ok(CallOutcome {
                        return_value,
                        arguments,
                    })
                }
                _ => Err(InvocationError::NoImplementation {
                    method: method.to_string(),
                }),
            };
        }

        Invocation::new(
            self,
            entry,
            method,
            method_on_target,
            type_args.to_vec(),
            arguments,
            target,
            on_proxy_target,
        )
        .run()
    }

    /// Implementing object and member for a catalog entry
    fn resolve_implementation(
        &self,
        entry: &CatalogEntry,
        type_args: &[TypeRef],
    ) -> Result<Resolution, InvocationError> {
        let (target, implementation, on_proxy_target) = match entry.provider {
            Provider::Target => (self.target.clone(), entry.target_method.clone(), true),
            Provider::OptionalTarget(fallback) => match &self.target {
                Some(target) if provides(target.as_ref(), entry) => {
                    (Some(Arc::clone(target)), Some(Arc::clone(&entry.method)), true)
                }
                _ => match fallback {
                    Some(position) => self.mixin_implementation(position, entry),
                    None => (None, None, false),
                },
            },
            Provider::Mixin(position) => self.mixin_implementation(position, entry),
            Provider::None => (None, None, false),
        };

        let method = match implementation {
            Some(m) => Some(self.proxy_type.close_method(&m, type_args)?),
            None => None,
        };
        Ok(Resolution {
            target,
            method,
            on_proxy_target,
        })
    }

    fn mixin_implementation(
        &self,
        position: usize,
        entry: &CatalogEntry,
    ) -> (Option<Arc<dyn ProxyTarget>>, Option<Arc<MethodDescriptor>>, bool) {
        let iface = &self.proxy_type.mixin_layout().interfaces[position];
        match self.mixins.mixin_for(iface) {
            Some(mixin) => {
                let implementation = self
                    .proxy_type
                    .implementation_on(&mixin.type_descriptor(), &entry.method);
                (Some(Arc::clone(mixin)), Some(implementation), false)
            }
            None => (None, None, false),
        }
    }

    /// Interceptor chain for a member, consulting the selector once per
    /// member
    pub(crate) fn chain_for(&self, entry: &CatalogEntry) -> Chain {
        let Some(selector) = self.proxy_type.selector() else {
            return Arc::clone(&self.interceptors);
        };
        let id = entry.method.id();
        if let Some(chain) = self.chains.get(&id) {
            return Arc::clone(chain.value());
        }
        let selected: Chain = Arc::from(selector.select_interceptors(
            self.proxy_type.target_type(),
            &entry.method,
            &self.interceptors,
        ));
        Arc::clone(self.chains.entry(id).or_insert(selected).value())
    }

    /// Number of members with a memoized selector answer
    pub fn selected_chain_count(&self) -> usize {
        self.chains.len()
    }

    fn answer_accessor(&self, method: &MethodDescriptor) -> Result<Value, InvocationError> {
        match method.name.as_str() {
            "DynProxyGetTarget" => Ok(match &self.target {
                Some(target) => Value::object(Arc::new(Arc::clone(target))),
                None => Value::Null,
            }),
            "GetInterceptors" => Ok(Value::object(Arc::new(self.interceptors.to_vec()))),
            other => Err(self.not_found(other)),
        }
    }

    /// Catalog entry and generic arguments for a member descriptor handed
    /// in by an outer proxy; closed generic members are matched through
    /// their open definition
    fn entry_for(&self, method: &MethodDescriptor) -> Result<(&CatalogEntry, Vec<TypeRef>), InvocationError> {
        let catalog = self.proxy_type.catalog();
        if let Some(entry) = catalog.entry(&method.id()) {
            return Ok((entry, Vec::new()));
        }
        if !method.generic_args.is_empty() {
            let id = method.id();
            let matching = catalog
                .find(&method.name, method.generic_arity(), method.parameters.len())
                .into_iter()
                .find(|e| {
                    self.proxy_type
                        .close_method(&e.method, &method.generic_args)
                        .map(|closed| closed.id() == id)
                        .unwrap_or(false)
                });
            if let Some(entry) = matching {
                return Ok((entry, method.generic_args.clone()));
            }
        }
        Err(self.not_found(&method.to_string()))
    }
}

/// Whether `target` implements the interface declaring `entry`
pub(crate) fn provides(target: &dyn ProxyTarget, entry: &CatalogEntry) -> bool {
    entry
        .interface
        .as_ref()
        .is_some_and(|iface| target.type_descriptor().implements_ref(iface))
}

impl ProxyTarget for ProxyInstance {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(self.proxy_type.descriptor())
    }

    fn invoke(&self, method: &MethodDescriptor, args: &mut Arguments) -> Result<Value, InvocationError> {
        if method.declaring_type.name() == Some(PROXY_TARGET_ACCESSOR_NAME) {
            return self.answer_accessor(method);
        }
        let (entry, type_args) = self.entry_for(method)?;
        // the caller's slots stay intact when the call faults
        let outcome = self.dispatch(entry, &type_args, args.clone().into_vec())?;
        *args = outcome.arguments;
        Ok(outcome.return_value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for ProxyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyInstance")
            .field("proxy_type", &self.proxy_type.name())
            .field("has_target", &self.target.is_some())
            .field("mixins", &self.mixins.mixins().len())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
