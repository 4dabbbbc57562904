//! Proxy type builder seam
//!
//! A [`ProxyTypeBuilder`] turns a collected method catalog and a mixin
//! layout into a [`ProxyType`]. The default [`DispatchTableBuilder`]
//! synthesizes a type descriptor and keeps the catalog as the dispatch
//! table; other backends may validate further or emit code, as long as they
//! honor the same catalog and provider decisions.

use std::sync::Arc;

use interpose_types::{
    EventDescriptor, PropertyDescriptor, TypeDescriptor, TypeKind, TypeRef, Visibility,
};
use rustc_hash::FxHashSet;

use crate::error::GenerationError;
use crate::generation::cache_key::ProxyKind;
use crate::generation::catalog::MethodCatalog;
use crate::generation::mixin::MixinData;
use crate::generation::options::GenerationOptions;
use crate::proxy::proxy_type::ProxyType;
use crate::proxy::util::PROXY_TARGET_ACCESSOR;

/// Everything a backend needs to build one proxy type
pub struct BuildRequest<'a> {
    /// Unique name reserved for the type
    pub name: String,
    /// Access pattern
    pub kind: ProxyKind,
    /// Proxied class or interface
    pub target: &'a Arc<TypeDescriptor>,
    /// Concrete target type for interface proxies with a fixed target
    pub target_impl: Option<&'a Arc<TypeDescriptor>>,
    /// Additional interfaces, as requested
    pub interfaces: &'a [Arc<TypeDescriptor>],
    /// Collected members
    pub catalog: MethodCatalog,
    /// Mixin snapshot
    pub mixins: &'a MixinData,
    /// Request options
    pub options: &'a GenerationOptions,
}

/// Backend that synthesizes proxy types
pub trait ProxyTypeBuilder: Send + Sync {
    /// Build the proxy type for a request
    fn build_proxy_type(&self, request: BuildRequest<'_>) -> Result<ProxyType, GenerationError>;
}

/// Default backend: the catalog is the dispatch table
#[derive(Debug, Default, Clone, Copy)]
pub struct DispatchTableBuilder;

impl DispatchTableBuilder {
    /// Create the builder
    pub fn new() -> Self {
        Self
    }

    /// Synthesize the descriptor of the generated type
    pub fn synthesize_descriptor(request: &BuildRequest<'_>) -> Arc<TypeDescriptor> {
        let base = match request.kind {
            ProxyKind::Class => Some(Arc::clone(request.target)),
            _ => request.options.base_type_for_interface_proxy.clone(),
        };

        let mut seen: FxHashSet<TypeRef> = FxHashSet::default();
        let mut interfaces = Vec::new();
        let direct = request
            .catalog
            .interfaces()
            .iter()
            .map(|(iface, _)| iface)
            .chain(std::iter::once(&*PROXY_TARGET_ACCESSOR));
        for iface in direct {
            if seen.insert(iface.type_ref()) {
                interfaces.push(Arc::clone(iface));
            }
        }

        let mut properties: Vec<PropertyDescriptor> = Vec::new();
        let mut events: Vec<EventDescriptor> = Vec::new();
        let mut owners: Vec<&TypeDescriptor> = Vec::new();
        if request.kind == ProxyKind::Class {
            owners.push(&**request.target);
        }
        owners.extend(request.catalog.interfaces().iter().map(|(iface, _)| &**iface));
        for owner in owners {
            for prop in &owner.properties {
                if !properties.iter().any(|p| p.name == prop.name) {
                    properties.push(prop.clone());
                }
            }
            for event in &owner.events {
                if !events.iter().any(|e| e.name == event.name) {
                    events.push(event.clone());
                }
            }
        }

        Arc::new(TypeDescriptor {
            name: request.name.clone(),
            kind: TypeKind::Class,
            visibility: Visibility::Public,
            is_sealed: false,
            type_params: Vec::new(),
            type_args: Vec::new(),
            base,
            interfaces,
            methods: request
                .catalog
                .entries()
                .iter()
                .map(|e| Arc::clone(&e.method))
                .collect(),
            properties,
            events,
        })
    }
}

impl ProxyTypeBuilder for DispatchTableBuilder {
    fn build_proxy_type(&self, request: BuildRequest<'_>) -> Result<ProxyType, GenerationError> {
        let descriptor = Self::synthesize_descriptor(&request);
        Ok(ProxyType::from_request(request, descriptor))
    }
}
