//! Proxy generator facade
//!
//! Entry points for the four access patterns:
//!
//! | Entry point                                      | Target            |
//! |--------------------------------------------------|-------------------|
//! | `create_class_proxy`                             | base object       |
//! | `create_interface_proxy_with_target`             | fixed object      |
//! | `create_interface_proxy_with_target_interface`   | swappable per call|
//! | `create_interface_proxy_without_target`          | none              |
//!
//! Every entry point validates the request, computes its cache key and
//! obtains the proxy type from the module scope's cache before
//! instantiating it.

use std::sync::Arc;

use interpose_types::TypeDescriptor;
use tracing::debug;

use crate::error::{ConfigurationError, GenerationError, ProxyResult};
use crate::generation::builder::{BuildRequest, DispatchTableBuilder, ProxyTypeBuilder};
use crate::generation::cache_key::{CacheKey, OptionsFingerprint, ProxyKind};
use crate::generation::catalog::{CatalogRequest, MethodCatalog};
use crate::generation::mixin::MixinData;
use crate::generation::options::GenerationOptions;
use crate::generation::scope::ModuleScope;
use crate::proxy::instance::ProxyInstance;
use crate::proxy::interceptor::{AllMethodsHook, GenerationHook, Interceptor};
use crate::proxy::proxy_type::ProxyType;
use crate::proxy::target::ProxyTarget;
use crate::proxy::util::PROXY_TARGET_ACCESSOR_NAME;

/// A proxy generation request
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    /// Access pattern
    pub kind: ProxyKind,
    /// Proxied class or interface
    pub target: Arc<TypeDescriptor>,
    /// Concrete target type, for interface proxies with a fixed target
    pub target_impl: Option<Arc<TypeDescriptor>>,
    /// Additional interfaces
    pub interfaces: Vec<Arc<TypeDescriptor>>,
    /// Options
    pub options: GenerationOptions,
}

impl ProxyRequest {
    fn new(kind: ProxyKind, target: Arc<TypeDescriptor>) -> Self {
        Self {
            kind,
            target,
            target_impl: None,
            interfaces: Vec::new(),
            options: GenerationOptions::default(),
        }
    }

    /// Class proxy request
    pub fn class(class: Arc<TypeDescriptor>) -> Self {
        Self::new(ProxyKind::Class, class)
    }

    /// Interface proxy forwarding to an object of type `target_impl`
    pub fn interface_with_target(iface: Arc<TypeDescriptor>, target_impl: Arc<TypeDescriptor>) -> Self {
        let mut request = Self::new(ProxyKind::InterfaceWithTarget, iface);
        request.target_impl = Some(target_impl);
        request
    }

    /// Interface proxy whose target may be swapped per call
    pub fn interface_with_target_interface(iface: Arc<TypeDescriptor>) -> Self {
        Self::new(ProxyKind::InterfaceWithTargetInterface, iface)
    }

    /// Interface proxy without a target
    pub fn interface_without_target(iface: Arc<TypeDescriptor>) -> Self {
        Self::new(ProxyKind::InterfaceWithoutTarget, iface)
    }

    /// Set additional interfaces
    pub fn with_interfaces(mut self, interfaces: &[Arc<TypeDescriptor>]) -> Self {
        self.interfaces = interfaces.to_vec();
        self
    }

    /// Set options
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Creates proxy types and instances
pub struct ProxyGenerator {
    scope: Arc<ModuleScope>,
    builder: Arc<dyn ProxyTypeBuilder>,
}

impl ProxyGenerator {
    /// Generator with a fresh scope and the default backend
    pub fn new() -> Self {
        Self::with_scope(Arc::new(ModuleScope::new()))
    }

    /// Generator sharing an existing scope
    pub fn with_scope(scope: Arc<ModuleScope>) -> Self {
        Self::with_builder(scope, Arc::new(DispatchTableBuilder::new()))
    }

    /// Generator with a custom backend
    pub fn with_builder(scope: Arc<ModuleScope>, builder: Arc<dyn ProxyTypeBuilder>) -> Self {
        Self { scope, builder }
    }

    /// Module scope
    pub fn scope(&self) -> &Arc<ModuleScope> {
        &self.scope
    }

    /// Obtain the proxy type for a request, generating it on first use
    pub fn proxy_type(&self, request: &ProxyRequest) -> ProxyResult<Arc<ProxyType>> {
        if let Err(err) = validate(request) {
            debug!(target_type = %request.target, kind = ?request.kind, error = %err, "proxy request rejected");
            return Err(err);
        }
        let mixins = request.options.mixin_data()?;
        let key = CacheKey::new(
            request.kind,
            &request.target,
            request.target_impl.as_deref(),
            &request.interfaces,
            OptionsFingerprint::new(&request.options, &mixins),
        );

        let ty = self
            .scope
            .cache()
            .get_or_generate(key, || self.generate(request, &mixins))?;
        Ok(ty)
    }

    fn generate(&self, request: &ProxyRequest, mixins: &MixinData) -> Result<ProxyType, GenerationError> {
        let default_hook = AllMethodsHook;
        let hook: &dyn GenerationHook = match &request.options.hook {
            Some(hook) => &**hook,
            None => &default_hook,
        };
        let catalog = MethodCatalog::collect(CatalogRequest {
            kind: request.kind,
            target: &request.target,
            target_impl: request.target_impl.as_deref(),
            interfaces: &request.interfaces,
            mixins,
            hook,
        });
        self.builder.build_proxy_type(BuildRequest {
            name: self.scope.proxy_type_name(&request.target),
            kind: request.kind,
            target: &request.target,
            target_impl: request.target_impl.as_ref(),
            interfaces: &request.interfaces,
            catalog,
            mixins,
            options: &request.options,
        })
    }

    /// Generate (or reuse) the proxy type and instantiate it
    pub fn create_proxy(
        &self,
        request: &ProxyRequest,
        target: Option<Arc<dyn ProxyTarget>>,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> ProxyResult<Arc<ProxyInstance>> {
        if request.kind.requires_target() && target.is_none() {
            return Err(ConfigurationError::MissingTarget {
                proxy: request.target.to_string(),
            }
            .into());
        }
        let ty = self.proxy_type(request)?;
        let mixins = request.options.mixin_data()?;
        Ok(ty.instantiate(target, mixins, interceptors)?)
    }

    /// Proxy deriving from `class`; `base` is the base implementation object
    pub fn create_class_proxy(
        &self,
        class: &Arc<TypeDescriptor>,
        additional: &[Arc<TypeDescriptor>],
        options: GenerationOptions,
        base: Arc<dyn ProxyTarget>,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> ProxyResult<Arc<ProxyInstance>> {
        let request = ProxyRequest::class(Arc::clone(class))
            .with_interfaces(additional)
            .with_options(options);
        self.create_proxy(&request, Some(base), interceptors)
    }

    /// Interface proxy forwarding to `target`
    pub fn create_interface_proxy_with_target(
        &self,
        iface: &Arc<TypeDescriptor>,
        additional: &[Arc<TypeDescriptor>],
        target: Arc<dyn ProxyTarget>,
        options: GenerationOptions,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> ProxyResult<Arc<ProxyInstance>> {
        let request = ProxyRequest::interface_with_target(Arc::clone(iface), target.type_descriptor())
            .with_interfaces(additional)
            .with_options(options);
        self.create_proxy(&request, Some(target), interceptors)
    }

    /// Interface proxy forwarding to `target`, which interceptors may swap
    /// for the duration of a call
    pub fn create_interface_proxy_with_target_interface(
        &self,
        iface: &Arc<TypeDescriptor>,
        additional: &[Arc<TypeDescriptor>],
        target: Arc<dyn ProxyTarget>,
        options: GenerationOptions,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> ProxyResult<Arc<ProxyInstance>> {
        let request = ProxyRequest::interface_with_target_interface(Arc::clone(iface))
            .with_interfaces(additional)
            .with_options(options);
        self.create_proxy(&request, Some(target), interceptors)
    }

    /// Interface proxy with no target; interceptors and mixins supply behavior
    pub fn create_interface_proxy_without_target(
        &self,
        iface: &Arc<TypeDescriptor>,
        additional: &[Arc<TypeDescriptor>],
        options: GenerationOptions,
        interceptors: Vec<Arc<dyn Interceptor>>,
    ) -> ProxyResult<Arc<ProxyInstance>> {
        let request = ProxyRequest::interface_without_target(Arc::clone(iface))
            .with_interfaces(additional)
            .with_options(options);
        self.create_proxy(&request, None, interceptors)
    }
}

impl Default for ProxyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Reject requests that cannot produce a proxy type
fn validate(request: &ProxyRequest) -> ProxyResult<()> {
    let target = &request.target;
    check_proxyable(target)?;
    match request.kind {
        ProxyKind::Class => {
            if !target.is_class() {
                return Err(GenerationError::NotAClass { name: target.to_string() }.into());
            }
            if target.is_sealed {
                return Err(GenerationError::SealedType { name: target.to_string() }.into());
            }
        }
        _ => {
            if !target.is_interface() {
                return Err(GenerationError::NotAnInterface { name: target.to_string() }.into());
            }
        }
    }

    if let (ProxyKind::InterfaceWithTarget, Some(target_impl)) = (request.kind, &request.target_impl) {
        if !target_impl.implements(target) {
            return Err(ConfigurationError::TargetDoesNotImplementInterface {
                target: target_impl.to_string(),
                interface: target.to_string(),
            }
            .into());
        }
    }

    for iface in &request.interfaces {
        if !iface.is_interface() {
            return Err(GenerationError::NotAnInterface { name: iface.to_string() }.into());
        }
        check_proxyable(iface)?;
        if let Some(infrastructure) = std::iter::once(Arc::clone(iface))
            .chain(iface.all_interfaces())
            .find(|i| i.name == PROXY_TARGET_ACCESSOR_NAME)
        {
            return Err(ConfigurationError::InfrastructureInterface {
                interface: infrastructure.to_string(),
            }
            .into());
        }
    }

    if request.kind.is_interface_proxy() {
        if let Some(base) = &request.options.base_type_for_interface_proxy {
            check_base_type(base)?;
        }
    }
    Ok(())
}

fn check_proxyable(ty: &TypeDescriptor) -> Result<(), GenerationError> {
    if !ty.is_accessible() {
        return Err(GenerationError::InaccessibleType {
            name: ty.to_string(),
            visibility: ty.visibility.to_string(),
        });
    }
    if ty.is_open() {
        return Err(GenerationError::OpenGenericType { name: ty.to_string() });
    }
    if let Some(argument) = ty.first_inaccessible_argument() {
        return Err(GenerationError::InaccessibleGenericArgument {
            name: ty.to_string(),
            argument: argument.name.clone(),
        });
    }
    Ok(())
}

fn check_base_type(base: &TypeDescriptor) -> Result<(), GenerationError> {
    let reason = if !base.is_class() {
        Some("must be a class")
    } else if base.is_sealed {
        Some("must not be sealed")
    } else if !base.is_accessible() {
        Some("must be accessible")
    } else if base.is_open() {
        Some("must not be an open generic type")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(GenerationError::InvalidBaseType {
            name: base.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
