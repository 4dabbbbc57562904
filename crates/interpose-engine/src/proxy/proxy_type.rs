//! Generated proxy types
//!
//! A [`ProxyType`] is created once per distinct cache key and shared by
//! every instance built from it. It owns the dispatch table (the method
//! catalog with provider decisions), the mixin layout it was generated for,
//! and memos for generic method closing and implementation lookup.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use interpose_types::{MethodDescriptor, MethodId, TypeDescriptor, TypeError, TypeRef};

use crate::error::ConfigurationError;
use crate::generation::builder::BuildRequest;
use crate::generation::cache_key::ProxyKind;
use crate::generation::catalog::MethodCatalog;
use crate::generation::closing::GenericMethodCache;
use crate::generation::mixin::{check_layout, MixinData, MixinLayout};
use crate::generation::options::AttributeSpec;
use crate::proxy::instance::ProxyInstance;
use crate::proxy::interceptor::{Interceptor, InterceptorSelector};
use crate::proxy::target::ProxyTarget;

/// Unique identifier for a generated proxy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProxyTypeId(u64);

impl ProxyTypeId {
    /// Create a new unique ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ProxyTypeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ProxyTypeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A synthesized proxy type
pub struct ProxyType {
    id: ProxyTypeId,
    kind: ProxyKind,
    descriptor: Arc<TypeDescriptor>,
    target_type: Arc<TypeDescriptor>,
    target_impl: Option<Arc<TypeDescriptor>>,
    interfaces: Vec<Arc<TypeDescriptor>>,
    catalog: MethodCatalog,
    mixin_layout: MixinLayout,
    selector: Option<Arc<dyn InterceptorSelector>>,
    attributes: Vec<AttributeSpec>,
    generic_methods: GenericMethodCache,
    /// (implementor, proxied method) -> implementing method
    implementations: DashMap<(TypeRef, MethodId), Arc<MethodDescriptor>>,
}

impl ProxyType {
    /// Assemble a proxy type from a build request and the descriptor a
    /// backend synthesized for it
    pub fn from_request(request: BuildRequest<'_>, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            id: ProxyTypeId::new(),
            kind: request.kind,
            descriptor,
            target_type: Arc::clone(request.target),
            target_impl: request.target_impl.cloned(),
            interfaces: request.interfaces.to_vec(),
            catalog: request.catalog,
            mixin_layout: request.mixins.layout().clone(),
            selector: request.options.selector.clone(),
            attributes: request.options.additional_attributes.clone(),
            generic_methods: GenericMethodCache::new(),
            implementations: DashMap::new(),
        }
    }

    /// Unique ID
    pub fn id(&self) -> ProxyTypeId {
        self.id
    }

    /// Generated type name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Access pattern
    pub fn kind(&self) -> ProxyKind {
        self.kind
    }

    /// Descriptor of the generated type
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Proxied class or interface
    pub fn target_type(&self) -> &Arc<TypeDescriptor> {
        &self.target_type
    }

    /// Concrete target type, for interface proxies with a fixed target
    pub fn target_impl(&self) -> Option<&Arc<TypeDescriptor>> {
        self.target_impl.as_ref()
    }

    /// Additional interfaces as requested
    pub fn additional_interfaces(&self) -> &[Arc<TypeDescriptor>] {
        &self.interfaces
    }

    /// Dispatch table
    pub fn catalog(&self) -> &MethodCatalog {
        &self.catalog
    }

    /// Mixin layout the type was generated for
    pub fn mixin_layout(&self) -> &MixinLayout {
        &self.mixin_layout
    }

    /// Interceptor selector, if any
    pub fn selector(&self) -> Option<&Arc<dyn InterceptorSelector>> {
        self.selector.as_ref()
    }

    /// Extra type-level attributes
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Close a (possibly generic) method over call-site type arguments;
    /// memoized per proxy type
    pub fn close_method(
        &self,
        method: &Arc<MethodDescriptor>,
        type_args: &[TypeRef],
    ) -> Result<Arc<MethodDescriptor>, TypeError> {
        self.generic_methods.close(method, type_args)
    }

    /// Number of memoized generic closings
    pub fn closed_method_count(&self) -> usize {
        self.generic_methods.len()
    }

    /// Member of `implementor` implementing the proxied `method`.
    ///
    /// Falls back to `method` itself when the implementor's type does not
    /// map it, leaving dispatch to the implementor. Memoized per implementor
    /// type.
    pub fn implementation_on(
        &self,
        implementor: &TypeDescriptor,
        method: &Arc<MethodDescriptor>,
    ) -> Arc<MethodDescriptor> {
        let key = (implementor.type_ref(), method.id());
        if let Some(hit) = self.implementations.get(&key) {
            return Arc::clone(hit.value());
        }
        let found = implementor
            .find_implementation(method)
            .unwrap_or_else(|| Arc::clone(method));
        Arc::clone(self.implementations.entry(key).or_insert(found).value())
    }

    /// Create an instance.
    ///
    /// `target` is the forwarding target for interface proxies and the base
    /// implementation object for class proxies; targetless proxies ignore
    /// it. A fixed target must be of the type the proxy type was generated
    /// for, and a base implementation must derive from the proxied class.
    /// `mixins` must expose the interfaces the type was generated for.
    pub fn instantiate(
        self: &Arc<Self>,
        target: Option<Arc<dyn ProxyTarget>>,
        mixins: MixinData,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> Result<Arc<ProxyInstance>, ConfigurationError> {
        let target = match (self.kind, target) {
            (ProxyKind::InterfaceWithoutTarget, _) => None,
            (_, None) => {
                return Err(ConfigurationError::MissingTarget {
                    proxy: self.name().to_string(),
                })
            }
            (ProxyKind::Class, Some(target)) => {
                let base_type = target.type_descriptor();
                if !base_type.derives_from(&self.target_type) {
                    return Err(ConfigurationError::BaseTypeMismatch {
                        class: self.target_type.to_string(),
                        actual: base_type.to_string(),
                    });
                }
                Some(target)
            }
            (ProxyKind::InterfaceWithTarget, Some(target)) => {
                let target_type = target.type_descriptor();
                match &self.target_impl {
                    Some(expected) if **expected == *target_type => Some(target),
                    expected => {
                        return Err(ConfigurationError::TargetTypeMismatch {
                            proxy: self.name().to_string(),
                            expected: expected.as_ref().map(ToString::to_string).unwrap_or_default(),
                            actual: target_type.to_string(),
                        })
                    }
                }
            }
            (_, Some(target)) => {
                let target_type = target.type_descriptor();
                if !target_type.implements(&self.target_type) {
                    return Err(ConfigurationError::TargetDoesNotImplementInterface {
                        target: target_type.to_string(),
                        interface: self.target_type.to_string(),
                    });
                }
                Some(target)
            }
        };
        check_layout(self.name(), &self.mixin_layout, &mixins)?;

        Ok(Arc::new(ProxyInstance::new(
            Arc::clone(self),
            target,
            mixins,
            interceptors,
        )))
    }
}

impl fmt::Debug for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyType")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("target_type", &self.target_type.to_string())
            .field("members", &self.catalog.len())
            .finish()
    }
}
