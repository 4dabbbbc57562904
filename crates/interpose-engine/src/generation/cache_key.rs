//! Cache keys for generated proxy types
//!
//! A [`CacheKey`] captures everything that influences the shape of a
//! generated type. Two requests with equal keys would produce behaviorally
//! identical types, so they share one.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use interpose_types::{TypeDescriptor, TypeRef};

use crate::generation::mixin::MixinData;
use crate::generation::options::{AttributeSpec, GenerationOptions};
use crate::proxy::interceptor::{GenerationHook, InterceptorSelector};

/// The access pattern a proxy type implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// Derives from a class; base members are the implementation
    Class,
    /// Forwards to a fixed target object
    InterfaceWithTarget,
    /// Forwards to a target that interceptors may swap per call
    InterfaceWithTargetInterface,
    /// No backing object; interceptors or mixins supply behavior
    InterfaceWithoutTarget,
}

impl ProxyKind {
    /// Whether instances of this kind require a target object
    pub fn requires_target(self) -> bool {
        !matches!(self, ProxyKind::InterfaceWithoutTarget)
    }

    /// Whether the proxied type is an interface
    pub fn is_interface_proxy(self) -> bool {
        !matches!(self, ProxyKind::Class)
    }
}

impl fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Class => write!(f, "class"),
            ProxyKind::InterfaceWithTarget => write!(f, "interface-with-target"),
            ProxyKind::InterfaceWithTargetInterface => write!(f, "interface-with-target-interface"),
            ProxyKind::InterfaceWithoutTarget => write!(f, "interface-without-target"),
        }
    }
}

/// Shared policy compared by reference
pub struct PolicyRef<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> PolicyRef<T> {
    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }
}

impl<T: ?Sized> Clone for PolicyRef<T> {
    fn clone(&self) -> Self {
        PolicyRef(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for PolicyRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<T: ?Sized> Eq for PolicyRef<T> {}

impl<T: ?Sized> Hash for PolicyRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.addr() as usize).hash(state);
    }
}

impl<T: ?Sized> fmt::Debug for PolicyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PolicyRef({:p})", self.addr())
    }
}

/// The parts of [`GenerationOptions`] that affect the generated type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionsFingerprint {
    /// Base class override
    pub base_type: Option<TypeRef>,
    /// Mixin interfaces, sorted
    pub mixin_interfaces: Vec<TypeRef>,
    /// Selector identity
    pub selector: Option<PolicyRef<dyn InterceptorSelector>>,
    /// Hook identity
    pub hook: Option<PolicyRef<dyn GenerationHook>>,
    /// Attributes, sorted; duplicates kept
    pub attributes: Vec<AttributeSpec>,
}

impl OptionsFingerprint {
    /// Fingerprint options whose mixins were already snapshotted
    pub fn new(options: &GenerationOptions, mixins: &MixinData) -> Self {
        let mut attributes = options.additional_attributes.clone();
        attributes.sort();
        Self {
            base_type: options
                .base_type_for_interface_proxy
                .as_ref()
                .map(|b| b.type_ref()),
            mixin_interfaces: mixins.layout().interfaces.clone(),
            selector: options.selector.clone().map(PolicyRef),
            hook: options.hook.clone().map(PolicyRef),
            attributes,
        }
    }
}

/// Structural identity of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Access pattern
    pub kind: ProxyKind,
    /// Proxied class or interface
    pub target: TypeRef,
    /// Concrete target type, for interface proxies with a fixed target
    pub target_impl: Option<TypeRef>,
    /// Additional interfaces, sorted and deduplicated
    pub interfaces: Vec<TypeRef>,
    /// Option fingerprint
    pub options: OptionsFingerprint,
}

impl CacheKey {
    /// Build a key; interface order and duplicates are normalized away
    pub fn new(
        kind: ProxyKind,
        target: &TypeDescriptor,
        target_impl: Option<&TypeDescriptor>,
        interfaces: &[Arc<TypeDescriptor>],
        options: OptionsFingerprint,
    ) -> Self {
        let mut interfaces: Vec<TypeRef> = interfaces.iter().map(|i| i.type_ref()).collect();
        interfaces.sort();
        interfaces.dedup();
        Self {
            kind,
            target: target.type_ref(),
            target_impl: target_impl.map(TypeDescriptor::type_ref),
            interfaces,
            options,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} proxy of {}", self.kind, self.target)?;
        if let Some(target_impl) = &self.target_impl {
            write!(f, " (target {})", target_impl)?;
        }
        if !self.interfaces.is_empty() {
            let names: Vec<String> = self.interfaces.iter().map(|i| i.to_string()).collect();
            write!(f, " + [{}]", names.join(", "))?;
        }
        Ok(())
    }
}
