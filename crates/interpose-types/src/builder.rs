//! Fluent builders for type descriptors
//!
//! Builders are the usual way to describe a type to the engine:
//!
//! ```
//! use interpose_types::{MethodBuilder, PropertyBuilder, TypeBuilder, TypeRef};
//!
//! let foo = TypeBuilder::interface("IFoo")
//!     .method(MethodBuilder::new("Sum").param("a", TypeRef::int()).param("b", TypeRef::int()).returns(TypeRef::int()))
//!     .property(PropertyBuilder::new("Name", TypeRef::string()))
//!     .build();
//! assert_eq!(foo.methods.len(), 3);
//! ```
//!
//! Property and event accessors are materialized as ordinary methods
//! (`get_Name`, `set_Name`, `add_Changed`, `remove_Changed`) listed ahead of
//! the plain methods.

use std::sync::Arc;

use crate::method::{MemberKind, MethodDescriptor, MethodModifiers, ParameterDescriptor, PassingMode};
use crate::ty::{EventDescriptor, PropertyDescriptor, TypeDescriptor, TypeKind, TypeRef, Visibility};

/// Builder for [`TypeDescriptor`]
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    name: String,
    kind: TypeKind,
    visibility: Visibility,
    is_sealed: bool,
    type_params: Vec<String>,
    base: Option<Arc<TypeDescriptor>>,
    interfaces: Vec<Arc<TypeDescriptor>>,
    methods: Vec<MethodBuilder>,
    properties: Vec<PropertyBuilder>,
    events: Vec<EventBuilder>,
}

impl TypeBuilder {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            is_sealed: false,
            type_params: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Start describing a class
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Start describing an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Set type visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the class as sealed
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Declare generic parameters
    pub fn generic_params(mut self, names: &[&str]) -> Self {
        self.type_params = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Set the base class
    pub fn extends(mut self, base: Arc<TypeDescriptor>) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented (or extended) interface
    pub fn implements(mut self, iface: Arc<TypeDescriptor>) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    /// Add an event
    pub fn event(mut self, event: EventBuilder) -> Self {
        self.events.push(event);
        self
    }

    /// Finish the descriptor
    pub fn build(self) -> Arc<TypeDescriptor> {
        let is_interface = self.kind == TypeKind::Interface;
        let declaring = TypeDescriptor {
            name: self.name.clone(),
            kind: self.kind,
            visibility: self.visibility,
            is_sealed: self.is_sealed,
            type_params: self.type_params.clone(),
            type_args: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            events: Vec::new(),
        }
        .type_ref();

        let finish = |mut method: MethodDescriptor| -> Arc<MethodDescriptor> {
            method.declaring_type = declaring.clone();
            if is_interface {
                method.modifiers.is_abstract = true;
                method.modifiers.is_virtual = true;
            }
            Arc::new(method)
        };

        let mut methods = Vec::new();

        let mut properties = Vec::with_capacity(self.properties.len());
        for prop in self.properties {
            let getter = prop.readable.then(|| finish(prop.accessor(
                format!("get_{}", prop.name),
                Vec::new(),
                prop.ty.clone(),
                MemberKind::PropertyGet(prop.name.clone()),
            )));
            let setter = prop.writable.then(|| finish(prop.accessor(
                format!("set_{}", prop.name),
                vec![ParameterDescriptor {
                    name: "value".to_string(),
                    ty: prop.ty.clone(),
                    mode: PassingMode::In,
                }],
                TypeRef::void(),
                MemberKind::PropertySet(prop.name.clone()),
            )));
            methods.extend(getter.iter().cloned());
            methods.extend(setter.iter().cloned());
            properties.push(PropertyDescriptor {
                name: prop.name,
                ty: prop.ty,
                getter,
                setter,
            });
        }

        let mut events = Vec::with_capacity(self.events.len());
        for event in self.events {
            let handler = vec![ParameterDescriptor {
                name: "handler".to_string(),
                ty: event.handler_type.clone(),
                mode: PassingMode::In,
            }];
            let add = finish(event.accessor(
                format!("add_{}", event.name),
                handler.clone(),
                MemberKind::EventAdd(event.name.clone()),
            ));
            let remove = finish(event.accessor(
                format!("remove_{}", event.name),
                handler,
                MemberKind::EventRemove(event.name.clone()),
            ));
            methods.push(Arc::clone(&add));
            methods.push(Arc::clone(&remove));
            events.push(EventDescriptor {
                name: event.name,
                handler_type: event.handler_type,
                add: Some(add),
                remove: Some(remove),
            });
        }

        methods.extend(self.methods.into_iter().map(|m| finish(m.descriptor)));

        Arc::new(TypeDescriptor {
            name: self.name,
            kind: self.kind,
            visibility: self.visibility,
            is_sealed: self.is_sealed,
            type_params: self.type_params,
            type_args: Vec::new(),
            base: self.base,
            interfaces: self.interfaces,
            methods,
            properties,
            events,
        })
    }
}

/// Builder for [`MethodDescriptor`]
///
/// The declaring type is filled in by [`TypeBuilder::build`].
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    descriptor: MethodDescriptor,
}

impl MethodBuilder {
    /// Start a public, non-virtual method returning `void`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            descriptor: MethodDescriptor {
                name: name.into(),
                declaring_type: TypeRef::object(),
                parameters: Vec::new(),
                return_type: TypeRef::void(),
                generic_params: Vec::new(),
                generic_args: Vec::new(),
                visibility: Visibility::Public,
                modifiers: MethodModifiers::default(),
                kind: MemberKind::Method,
            },
        }
    }

    fn with_param(mut self, name: &str, ty: TypeRef, mode: PassingMode) -> Self {
        self.descriptor.parameters.push(ParameterDescriptor {
            name: name.to_string(),
            ty,
            mode,
        });
        self
    }

    /// Add a by-value parameter
    pub fn param(self, name: &str, ty: TypeRef) -> Self {
        self.with_param(name, ty, PassingMode::In)
    }

    /// Add an `out` parameter
    pub fn out_param(self, name: &str, ty: TypeRef) -> Self {
        self.with_param(name, ty, PassingMode::Out)
    }

    /// Add a `ref` parameter
    pub fn ref_param(self, name: &str, ty: TypeRef) -> Self {
        self.with_param(name, ty, PassingMode::Ref)
    }

    /// Set the return type
    pub fn returns(mut self, ty: TypeRef) -> Self {
        self.descriptor.return_type = ty;
        self
    }

    /// Declare method-level generic parameters
    pub fn generic_params(mut self, names: &[&str]) -> Self {
        self.descriptor.generic_params = names.iter().map(|n| n.to_string()).collect();
        self
    }

    /// Set visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.descriptor.visibility = visibility;
        self
    }

    /// Mark as virtual
    pub fn as_virtual(mut self) -> Self {
        self.descriptor.modifiers.is_virtual = true;
        self
    }

    /// Mark as abstract (implies virtual)
    pub fn as_abstract(mut self) -> Self {
        self.descriptor.modifiers.is_abstract = true;
        self.descriptor.modifiers.is_virtual = true;
        self
    }

    /// Mark as a sealed override
    pub fn as_sealed(mut self) -> Self {
        self.descriptor.modifiers.is_sealed = true;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.descriptor.modifiers.is_static = true;
        self
    }

    /// Mark as the finalizer
    pub fn as_finalizer(mut self) -> Self {
        self.descriptor.modifiers.is_finalizer = true;
        self.descriptor.modifiers.is_virtual = true;
        self
    }
}

/// Builder for a property and its accessors
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    name: String,
    ty: TypeRef,
    readable: bool,
    writable: bool,
    visibility: Visibility,
    modifiers: MethodModifiers,
}

impl PropertyBuilder {
    /// Start a public read/write property
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            readable: true,
            writable: true,
            visibility: Visibility::Public,
            modifiers: MethodModifiers::default(),
        }
    }

    /// Omit the setter
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Set accessor visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Make accessors virtual
    pub fn as_virtual(mut self) -> Self {
        self.modifiers.is_virtual = true;
        self
    }

    /// Make accessors abstract
    pub fn as_abstract(mut self) -> Self {
        self.modifiers.is_abstract = true;
        self.modifiers.is_virtual = true;
        self
    }

    fn accessor(
        &self,
        name: String,
        parameters: Vec<ParameterDescriptor>,
        return_type: TypeRef,
        kind: MemberKind,
    ) -> MethodDescriptor {
        MethodDescriptor {
            name,
            declaring_type: TypeRef::object(),
            parameters,
            return_type,
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            visibility: self.visibility,
            modifiers: self.modifiers,
            kind,
        }
    }
}

/// Builder for an event and its accessors
#[derive(Debug, Clone)]
pub struct EventBuilder {
    name: String,
    handler_type: TypeRef,
    visibility: Visibility,
    modifiers: MethodModifiers,
}

impl EventBuilder {
    /// Start a public event
    pub fn new(name: impl Into<String>, handler_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            handler_type,
            visibility: Visibility::Public,
            modifiers: MethodModifiers::default(),
        }
    }

    /// Make accessors virtual
    pub fn as_virtual(mut self) -> Self {
        self.modifiers.is_virtual = true;
        self
    }

    /// Set accessor visibility
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    fn accessor(
        &self,
        name: String,
        parameters: Vec<ParameterDescriptor>,
        kind: MemberKind,
    ) -> MethodDescriptor {
        MethodDescriptor {
            name,
            declaring_type: TypeRef::object(),
            parameters,
            return_type: TypeRef::void(),
            generic_params: Vec::new(),
            generic_args: Vec::new(),
            visibility: self.visibility,
            modifiers: self.modifiers,
            kind,
        }
    }
}
