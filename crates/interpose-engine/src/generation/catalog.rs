//! Method catalog
//!
//! Enumerates the members a proxy type exposes and decides, per member,
//! whether it is intercepted and which object provides its implementation.
//!
//! Members are gathered in this order:
//!
//! 1. Class members (class proxies only). Virtual and abstract members are
//!    interception points; other accessible members pass straight through
//!    to the base implementation.
//! 2. Interface members. Each interface is resolved once to a [`Provider`]:
//!    the target wins for interfaces it implements, then a mixin, and
//!    otherwise nothing. Proxies whose target is swappable cannot know the
//!    target type up front, so their additional interfaces resolve to
//!    [`Provider::OptionalTarget`] and are settled per call.
//!
//! Property and event accessors come before plain methods within each type.

use std::sync::Arc;

use interpose_types::{MemberKind, MethodDescriptor, MethodId, TypeDescriptor, TypeRef};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::generation::cache_key::ProxyKind;
use crate::generation::mixin::MixinData;
use crate::proxy::interceptor::GenerationHook;

/// Source of a member's implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// The proxy's target (or base implementation for class proxies)
    Target,
    /// The mixin serving the interface at this position of the sorted
    /// mixin interface list
    Mixin(usize),
    /// The current target when it implements the member's interface,
    /// otherwise the mixin at the given position, otherwise nothing
    OptionalTarget(Option<usize>),
    /// Nothing; interceptors must produce the result
    None,
}

/// One member exposed by a proxy type
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Member as proxied
    pub method: Arc<MethodDescriptor>,
    /// Member as implemented, when known at generation time
    pub target_method: Option<Arc<MethodDescriptor>>,
    /// Who implements the member
    pub provider: Provider,
    /// Interface declaring the member, for interface members
    pub interface: Option<TypeRef>,
    /// Whether calls run through the interceptor chain
    pub intercepted: bool,
}

/// Input to [`MethodCatalog::collect`]
#[derive(Clone, Copy)]
pub struct CatalogRequest<'a> {
    /// Access pattern
    pub kind: ProxyKind,
    /// Proxied class or interface
    pub target: &'a Arc<TypeDescriptor>,
    /// Concrete target type for interface proxies with a fixed target
    pub target_impl: Option<&'a TypeDescriptor>,
    /// Additional interfaces
    pub interfaces: &'a [Arc<TypeDescriptor>],
    /// Mixin snapshot
    pub mixins: &'a MixinData,
    /// Interception policy
    pub hook: &'a dyn GenerationHook,
}

/// Members of a proxy type
#[derive(Debug, Clone, Default)]
pub struct MethodCatalog {
    entries: Vec<CatalogEntry>,
    by_id: FxHashMap<MethodId, usize>,
    /// Interface member id -> class member implementing it (class proxies)
    aliases: FxHashMap<MethodId, usize>,
    /// Interfaces in resolution order with their provider
    interfaces: Vec<(Arc<TypeDescriptor>, Provider)>,
}

impl MethodCatalog {
    /// Enumerate members for a generation request
    pub fn collect(request: CatalogRequest<'_>) -> Self {
        let mut catalog = Self::default();

        if request.kind == ProxyKind::Class {
            catalog.collect_class_members(&request);
        }

        let interfaces = resolve_interfaces(&request);
        for (iface, provider) in &interfaces {
            catalog.collect_interface_members(&request, iface, *provider);
        }
        catalog.interfaces = interfaces;

        request.hook.methods_inspected();
        debug!(
            proxied = %request.target,
            kind = %request.kind,
            members = catalog.entries.len(),
            intercepted = catalog.intercepted_count(),
            "method catalog collected"
        );
        catalog
    }

    fn push(&mut self, entry: CatalogEntry) {
        let id = entry.method.id();
        if self.by_id.contains_key(&id) {
            return;
        }
        self.by_id.insert(id, self.entries.len());
        self.entries.push(entry);
    }

    fn collect_class_members(&mut self, request: &CatalogRequest<'_>) {
        let class = request.target;
        for method in class.instance_methods() {
            if method.modifiers.is_finalizer {
                continue;
            }
            if !method.is_accessible() {
                debug!(method = %method, visibility = %method.visibility, "skipping inaccessible member");
                continue;
            }
            if !method.is_overridable() {
                debug!(method = %method, sealed = method.modifiers.is_sealed, "member is not proxyable");
                request.hook.non_proxyable_member(class, &method);
                self.push(CatalogEntry {
                    target_method: Some(Arc::clone(&method)),
                    method,
                    provider: Provider::Target,
                    interface: None,
                    intercepted: false,
                });
                continue;
            }

            let intercepted = request.hook.should_intercept(class, &method);
            if !intercepted {
                debug!(method = %method, "hook declined interception");
            }
            let (provider, target_method) = if method.modifiers.is_abstract {
                (Provider::None, None)
            } else {
                (Provider::Target, Some(Arc::clone(&method)))
            };
            self.push(CatalogEntry {
                method,
                target_method,
                provider,
                interface: None,
                intercepted,
            });
        }
    }

    fn collect_interface_members(
        &mut self,
        request: &CatalogRequest<'_>,
        iface: &Arc<TypeDescriptor>,
        provider: Provider,
    ) {
        for method in &iface.methods {
            if request.kind == ProxyKind::Class && provider == Provider::Target {
                // the class member implementing it is already in the catalog
                let implementation = request
                    .target
                    .find_implementation(method)
                    .and_then(|m| self.by_id.get(&m.id()).copied());
                if let Some(index) = implementation {
                    self.aliases.insert(method.id(), index);
                    continue;
                }
            }

            let (provider, target_method) = match (provider, request.kind) {
                (Provider::Target, ProxyKind::InterfaceWithTarget) => {
                    let implementation = request
                        .target_impl
                        .and_then(|ty| ty.find_implementation(method))
                        .unwrap_or_else(|| Arc::clone(method));
                    (Provider::Target, Some(implementation))
                }
                (Provider::Target, ProxyKind::InterfaceWithTargetInterface) => {
                    (Provider::Target, Some(Arc::clone(method)))
                }
                (Provider::Target, _) => (Provider::None, None),
                (other, _) => (other, None),
            };

            let intercepted = request.hook.should_intercept(iface, method);
            self.push(CatalogEntry {
                method: Arc::clone(method),
                target_method,
                provider,
                interface: Some(iface.type_ref()),
                intercepted,
            });
        }
    }

    /// All entries in collection order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check for an empty catalog
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of intercepted entries
    pub fn intercepted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.intercepted).count()
    }

    /// Interfaces in resolution order with their provider
    pub fn interfaces(&self) -> &[(Arc<TypeDescriptor>, Provider)] {
        &self.interfaces
    }

    /// Provider resolved for an interface
    pub fn provider_for(&self, iface: &TypeRef) -> Option<Provider> {
        self.interfaces
            .iter()
            .find(|(i, _)| i.type_ref() == *iface)
            .map(|(_, provider)| *provider)
    }

    /// Entry for a method id; interface members implemented by a class
    /// proxy's class resolve to the class member
    pub fn entry(&self, id: &MethodId) -> Option<&CatalogEntry> {
        self.by_id
            .get(id)
            .or_else(|| self.aliases.get(id))
            .map(|&index| &self.entries[index])
    }

    /// Entries matching a name, generic arity and argument count
    pub fn find(&self, name: &str, generic_arity: usize, arg_count: usize) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                e.method.name == name
                    && e.method.generic_arity() == generic_arity
                    && e.method.parameters.len() == arg_count
            })
            .collect()
    }

    /// Entries declared by (or aliased from) one interface, matching a name
    /// and argument count
    pub fn find_on_interface(
        &self,
        iface: &TypeDescriptor,
        name: &str,
        generic_arity: usize,
        arg_count: usize,
    ) -> Vec<&CatalogEntry> {
        let mut seen = FxHashSet::default();
        iface
            .methods
            .iter()
            .filter(|m| {
                m.name == name && m.generic_arity() == generic_arity && m.parameters.len() == arg_count
            })
            .filter_map(|m| self.entry(&m.id()))
            .filter(|e| seen.insert(e.method.id()))
            .collect()
    }

    /// Entry for a property or event accessor
    pub fn accessor(&self, kind: &MemberKind) -> Vec<&CatalogEntry> {
        self.entries.iter().filter(|e| e.method.kind == *kind).collect()
    }
}

/// Resolve every interface the proxy exposes to its provider
fn resolve_interfaces(request: &CatalogRequest<'_>) -> Vec<(Arc<TypeDescriptor>, Provider)> {
    let mut resolved: Vec<(Arc<TypeDescriptor>, Provider)> = Vec::new();
    let mut claimed: FxHashSet<TypeRef> = FxHashSet::default();
    let mut claim = |iface: &Arc<TypeDescriptor>, provider: Provider, resolved: &mut Vec<_>| {
        if claimed.insert(iface.type_ref()) {
            resolved.push((Arc::clone(iface), provider));
        }
    };

    // 1. the proxied type's own interfaces belong to the target
    if request.target.is_interface() {
        claim(request.target, Provider::Target, &mut resolved);
    }
    for iface in request.target.all_interfaces() {
        claim(&iface, Provider::Target, &mut resolved);
    }

    // 2. additional interfaces: target if it implements them, else a mixin
    let target_implements = |iface: &TypeDescriptor| match request.kind {
        ProxyKind::Class => request.target.implements(iface),
        ProxyKind::InterfaceWithTarget => request.target_impl.is_some_and(|t| t.implements(iface)),
        ProxyKind::InterfaceWithTargetInterface | ProxyKind::InterfaceWithoutTarget => false,
    };
    for additional in request.interfaces {
        let mut family = vec![Arc::clone(additional)];
        family.extend(additional.all_interfaces());
        for iface in family {
            let provider = if target_implements(&iface) {
                Provider::Target
            } else if request.kind == ProxyKind::InterfaceWithTargetInterface {
                Provider::OptionalTarget(request.mixins.interface_position(&iface.type_ref()))
            } else {
                mixin_provider(request.mixins, &iface)
            };
            claim(&iface, provider, &mut resolved);
        }
    }

    // 3. remaining mixin interfaces
    for iface in request.mixins.mixin_interfaces() {
        let provider = mixin_provider(request.mixins, iface);
        claim(iface, provider, &mut resolved);
    }

    resolved
}

fn mixin_provider(mixins: &MixinData, iface: &TypeDescriptor) -> Provider {
    mixins
        .interface_position(&iface.type_ref())
        .map_or(Provider::None, Provider::Mixin)
}
