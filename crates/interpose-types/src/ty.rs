//! Core type descriptors

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::method::{MethodDescriptor, MethodSignature};

/// Accessibility of a type or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible to subtypes
    Protected,
    /// Visible inside the declaring module only
    Internal,
    /// Visible inside the declaring type only
    Private,
}

impl Visibility {
    /// Whether a generated proxy may reference a type with this visibility
    pub fn is_type_accessible(self) -> bool {
        matches!(self, Visibility::Public)
    }

    /// Whether a generated proxy may override a member with this visibility
    pub fn is_member_accessible(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Internal => write!(f, "internal"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Reference to a named type with optional generic arguments
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamedType {
    /// Full type name
    pub name: String,
    /// Generic arguments (empty for non-generic types)
    pub args: Vec<TypeRef>,
    /// Accessibility of the named type
    pub visibility: Visibility,
}

/// A type as it appears in a signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    /// Named type, possibly generic
    Named(NamedType),
    /// Generic parameter declared by the enclosing type, by position
    TypeParam(usize),
    /// Generic parameter declared by the enclosing method, by position
    MethodParam(usize),
}

impl TypeRef {
    /// Public, non-generic named type
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(NamedType {
            name: name.into(),
            args: Vec::new(),
            visibility: Visibility::Public,
        })
    }

    /// Public generic type closed (or partially closed) over `args`
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named(NamedType {
            name: name.into(),
            args,
            visibility: Visibility::Public,
        })
    }

    /// Type parameter of the enclosing type
    pub fn type_param(index: usize) -> Self {
        TypeRef::TypeParam(index)
    }

    /// Type parameter of the enclosing method
    pub fn method_param(index: usize) -> Self {
        TypeRef::MethodParam(index)
    }

    /// The `void` return type
    pub fn void() -> Self {
        Self::named("void")
    }

    /// 64-bit integer
    pub fn int() -> Self {
        Self::named("i64")
    }

    /// 64-bit float
    pub fn float() -> Self {
        Self::named("f64")
    }

    /// Boolean
    pub fn bool() -> Self {
        Self::named("bool")
    }

    /// String
    pub fn string() -> Self {
        Self::named("string")
    }

    /// Root object type
    pub fn object() -> Self {
        Self::named("object")
    }

    /// Replace the visibility of a named type; parameters are returned unchanged
    pub fn with_visibility(self, visibility: Visibility) -> Self {
        match self {
            TypeRef::Named(mut named) => {
                named.visibility = visibility;
                TypeRef::Named(named)
            }
            other => other,
        }
    }

    /// Name of the referenced type, if it is a named type
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(named) => Some(&named.name),
            _ => None,
        }
    }

    /// Check if this is the `void` type
    pub fn is_void(&self) -> bool {
        self.name() == Some("void")
    }

    /// Check if this reference mentions any generic parameter
    pub fn is_open(&self) -> bool {
        match self {
            TypeRef::Named(named) => named.args.iter().any(TypeRef::is_open),
            TypeRef::TypeParam(_) | TypeRef::MethodParam(_) => true,
        }
    }

    /// Check if this reference mentions a method-level generic parameter
    pub fn mentions_method_params(&self) -> bool {
        match self {
            TypeRef::Named(named) => named.args.iter().any(TypeRef::mentions_method_params),
            TypeRef::MethodParam(_) => true,
            TypeRef::TypeParam(_) => false,
        }
    }

    /// First non-public named type found in this reference (depth-first)
    pub fn first_inaccessible(&self) -> Option<&NamedType> {
        match self {
            TypeRef::Named(named) => {
                if !named.visibility.is_type_accessible() {
                    return Some(named);
                }
                named.args.iter().find_map(TypeRef::first_inaccessible)
            }
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(named) => {
                write!(f, "{}", named.name)?;
                if !named.args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in named.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::TypeParam(index) => write!(f, "!{}", index),
            TypeRef::MethodParam(index) => write!(f, "!!{}", index),
        }
    }
}

/// Whether a descriptor describes a class or an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Concrete or abstract class
    Class,
    /// Interface (all members abstract)
    Interface,
}

/// Property on a type, backed by accessor methods
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Property name
    pub name: String,
    /// Property type
    pub ty: TypeRef,
    /// Getter accessor
    pub getter: Option<Arc<MethodDescriptor>>,
    /// Setter accessor
    pub setter: Option<Arc<MethodDescriptor>>,
}

/// Event on a type, backed by add/remove accessor methods
#[derive(Debug, Clone)]
pub struct EventDescriptor {
    /// Event name
    pub name: String,
    /// Handler type
    pub handler_type: TypeRef,
    /// Add accessor
    pub add: Option<Arc<MethodDescriptor>>,
    /// Remove accessor
    pub remove: Option<Arc<MethodDescriptor>>,
}

/// Description of a class or interface
///
/// Two descriptors are equal when their [`TypeRef`]s are equal, i.e. they
/// share a name and generic arguments. Descriptors are expected to be
/// canonical: one descriptor per distinct type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Full type name
    pub name: String,
    /// Class or interface
    pub kind: TypeKind,
    /// Type accessibility
    pub visibility: Visibility,
    /// Whether the type can be derived from
    pub is_sealed: bool,
    /// Declared generic parameter names
    pub type_params: Vec<String>,
    /// Generic arguments, once closed
    pub type_args: Vec<TypeRef>,
    /// Base class
    pub base: Option<Arc<TypeDescriptor>>,
    /// Directly implemented (or, for interfaces, extended) interfaces
    pub interfaces: Vec<Arc<TypeDescriptor>>,
    /// Declared methods, including property and event accessors
    pub methods: Vec<Arc<MethodDescriptor>>,
    /// Declared properties
    pub properties: Vec<PropertyDescriptor>,
    /// Declared events
    pub events: Vec<EventDescriptor>,
}

impl TypeDescriptor {
    /// Reference identifying this type
    pub fn type_ref(&self) -> TypeRef {
        let args = if self.type_args.is_empty() {
            (0..self.type_params.len()).map(TypeRef::TypeParam).collect()
        } else {
            self.type_args.clone()
        };
        TypeRef::Named(NamedType {
            name: self.name.clone(),
            args,
            visibility: self.visibility,
        })
    }

    /// Name without namespace qualification
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Check if this is an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Check if this is a class
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Check if the type declares generic parameters
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Check if this is an unclosed generic definition (e.g. `List<>`)
    pub fn is_generic_definition(&self) -> bool {
        self.is_generic() && self.type_args.is_empty()
    }

    /// Check if the type still mentions unbound generic parameters
    pub fn is_open(&self) -> bool {
        self.is_generic_definition() || self.type_args.iter().any(TypeRef::is_open)
    }

    /// Check if generated code may reference this type
    pub fn is_accessible(&self) -> bool {
        self.visibility.is_type_accessible()
    }

    /// First generic argument that generated code could not reference
    pub fn first_inaccessible_argument(&self) -> Option<&NamedType> {
        self.type_args.iter().find_map(TypeRef::first_inaccessible)
    }

    /// All interfaces reachable from this type: its own, those of its base
    /// chain and those extended by them, deduplicated in discovery order.
    /// An interface does not list itself.
    pub fn all_interfaces(&self) -> Vec<Arc<TypeDescriptor>> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for iface in &ty.interfaces {
                collect_interfaces(iface, &mut seen, &mut out);
            }
            current = ty.base.as_deref();
        }
        out
    }

    /// Check if this type is, or implements, `iface`
    pub fn implements(&self, iface: &TypeDescriptor) -> bool {
        if self == iface {
            return true;
        }
        self.all_interfaces().iter().any(|i| **i == *iface)
    }

    /// Check if this type implements an interface identified by reference
    pub fn implements_ref(&self, iface: &TypeRef) -> bool {
        if self.type_ref() == *iface {
            return true;
        }
        self.all_interfaces().iter().any(|i| i.type_ref() == *iface)
    }

    /// Check if this type is `class` or has it in its base chain
    pub fn derives_from(&self, class: &TypeDescriptor) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == class {
                return true;
            }
            current = ty.base.as_deref();
        }
        false
    }

    /// Non-static methods reachable on an instance: declared methods first,
    /// then base-chain methods not hidden by a more derived signature
    pub fn instance_methods(&self) -> Vec<Arc<MethodDescriptor>> {
        let mut seen: FxHashSet<MethodSignature> = FxHashSet::default();
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(ty) = current {
            for method in &ty.methods {
                if method.modifiers.is_static {
                    continue;
                }
                if seen.insert(method.signature()) {
                    out.push(Arc::clone(method));
                }
            }
            current = ty.base.as_deref();
        }
        out
    }

    /// Find an instance method by signature
    pub fn find_method(&self, signature: &MethodSignature) -> Option<Arc<MethodDescriptor>> {
        self.instance_methods()
            .into_iter()
            .find(|m| m.signature() == *signature)
    }

    /// Map an interface method onto this type's implementation of it.
    ///
    /// Returns `None` when this type does not implement the declaring
    /// interface or has no member with a matching signature.
    pub fn find_implementation(&self, method: &MethodDescriptor) -> Option<Arc<MethodDescriptor>> {
        if !self.implements_ref(&method.declaring_type) {
            return None;
        }
        self.find_method(&method.signature())
    }

    /// Declared methods with the given name
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<MethodDescriptor>> + 'a {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// Find a property by name, searching the base chain
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(prop) = ty.properties.iter().find(|p| p.name == name) {
                return Some(prop);
            }
            current = ty.base.as_deref();
        }
        None
    }

    /// Find an event by name, searching the base chain
    pub fn event(&self, name: &str) -> Option<&EventDescriptor> {
        let mut current = Some(self);
        while let Some(ty) = current {
            if let Some(event) = ty.events.iter().find(|e| e.name == name) {
                return Some(event);
            }
            current = ty.base.as_deref();
        }
        None
    }
}

fn collect_interfaces(
    iface: &Arc<TypeDescriptor>,
    seen: &mut FxHashSet<TypeRef>,
    out: &mut Vec<Arc<TypeDescriptor>>,
) {
    if !seen.insert(iface.type_ref()) {
        return;
    }
    out.push(Arc::clone(iface));
    for parent in &iface.interfaces {
        collect_interfaces(parent, seen, out);
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.type_params.len() == other.type_params.len()
            && self.type_args == other.type_args
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.type_params.len().hash(state);
        self.type_args.hash(state);
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_ref())
    }
}
