//! Generation options

use std::fmt;
use std::sync::Arc;

use interpose_types::TypeDescriptor;

use crate::error::ConfigurationError;
use crate::generation::mixin::MixinData;
use crate::proxy::interceptor::{GenerationHook, InterceptorSelector};
use crate::proxy::target::ProxyTarget;

/// Extra type-level attribute attached to a generated proxy type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeSpec {
    /// Attribute name
    pub name: String,
    /// Constructor arguments, rendered as strings
    pub args: Vec<String>,
}

impl AttributeSpec {
    /// Attribute without arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Add a constructor argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Options shaping a generated proxy type
#[derive(Clone, Default)]
pub struct GenerationOptions {
    /// Class an interface proxy derives from instead of `object`
    pub base_type_for_interface_proxy: Option<Arc<TypeDescriptor>>,
    /// Mixin instances
    pub mixins: Vec<Arc<dyn ProxyTarget>>,
    /// Per-method interceptor selection policy
    pub selector: Option<Arc<dyn InterceptorSelector>>,
    /// Generation-time interception policy
    pub hook: Option<Arc<dyn GenerationHook>>,
    /// Extra attributes for the generated type
    pub additional_attributes: Vec<AttributeSpec>,
}

impl GenerationOptions {
    /// Default options: no mixins, no selector, intercept everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base class for interface proxies
    pub fn with_base_type(mut self, base: Arc<TypeDescriptor>) -> Self {
        self.base_type_for_interface_proxy = Some(base);
        self
    }

    /// Add a mixin instance
    pub fn with_mixin(mut self, mixin: Arc<dyn ProxyTarget>) -> Self {
        self.mixins.push(mixin);
        self
    }

    /// Set the interceptor selector
    pub fn with_selector(mut self, selector: Arc<dyn InterceptorSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Set the generation hook
    pub fn with_hook(mut self, hook: Arc<dyn GenerationHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Add a type-level attribute
    pub fn with_attribute(mut self, attribute: AttributeSpec) -> Self {
        self.additional_attributes.push(attribute);
        self
    }

    /// Snapshot the mixins
    pub fn mixin_data(&self) -> Result<MixinData, ConfigurationError> {
        MixinData::new(&self.mixins)
    }
}

impl fmt::Debug for GenerationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationOptions")
            .field(
                "base_type_for_interface_proxy",
                &self.base_type_for_interface_proxy.as_ref().map(|b| b.to_string()),
            )
            .field("mixins", &self.mixins.len())
            .field("selector", &self.selector.is_some())
            .field("hook", &self.hook.is_some())
            .field("additional_attributes", &self.additional_attributes)
            .finish()
    }
}
