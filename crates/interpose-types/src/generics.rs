//! Generic substitution
//!
//! Closing replaces generic parameters with concrete arguments throughout a
//! descriptor. Type parameters and method parameters are tracked separately
//! so a generic method on a generic type can be closed in two steps.

use std::sync::Arc;

use crate::error::TypeError;
use crate::method::{MethodDescriptor, ParameterDescriptor};
use crate::ty::{EventDescriptor, NamedType, PropertyDescriptor, TypeDescriptor, TypeRef};

/// Mapping from generic parameter positions to arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// Arguments for type-level parameters
    pub type_args: Vec<TypeRef>,
    /// Arguments for method-level parameters
    pub method_args: Vec<TypeRef>,
}

impl Substitution {
    /// Substitution for the parameters of a generic type
    pub fn for_type(args: &[TypeRef]) -> Self {
        Self {
            type_args: args.to_vec(),
            method_args: Vec::new(),
        }
    }

    /// Substitution for the parameters of a generic method
    pub fn for_method(args: &[TypeRef]) -> Self {
        Self {
            type_args: Vec::new(),
            method_args: args.to_vec(),
        }
    }

    /// Apply to a type reference; unmapped parameters are left in place
    pub fn apply(&self, ty: &TypeRef) -> TypeRef {
        match ty {
            TypeRef::Named(named) => TypeRef::Named(NamedType {
                name: named.name.clone(),
                args: named.args.iter().map(|a| self.apply(a)).collect(),
                visibility: named.visibility,
            }),
            TypeRef::TypeParam(index) => self
                .type_args
                .get(*index)
                .cloned()
                .unwrap_or(TypeRef::TypeParam(*index)),
            TypeRef::MethodParam(index) => self
                .method_args
                .get(*index)
                .cloned()
                .unwrap_or(TypeRef::MethodParam(*index)),
        }
    }

    /// Apply to every type mentioned by a method signature
    pub fn apply_method(&self, method: &MethodDescriptor) -> MethodDescriptor {
        MethodDescriptor {
            name: method.name.clone(),
            declaring_type: self.apply(&method.declaring_type),
            parameters: method
                .parameters
                .iter()
                .map(|p| ParameterDescriptor {
                    name: p.name.clone(),
                    ty: self.apply(&p.ty),
                    mode: p.mode,
                })
                .collect(),
            return_type: self.apply(&method.return_type),
            generic_params: method.generic_params.clone(),
            generic_args: method.generic_args.iter().map(|a| self.apply(a)).collect(),
            visibility: method.visibility,
            modifiers: method.modifiers,
            kind: method.kind.clone(),
        }
    }

    fn apply_descriptor(&self, ty: &TypeDescriptor) -> TypeDescriptor {
        let methods: Vec<Arc<MethodDescriptor>> = ty
            .methods
            .iter()
            .map(|m| Arc::new(self.apply_method(m)))
            .collect();
        // accessors share the rewritten method entries
        let rewritten = |accessor: &Option<Arc<MethodDescriptor>>| {
            accessor.as_ref().and_then(|old| {
                let id = self.apply_method(old).id();
                methods.iter().find(|m| m.id() == id).cloned()
            })
        };
        TypeDescriptor {
            name: ty.name.clone(),
            kind: ty.kind,
            visibility: ty.visibility,
            is_sealed: ty.is_sealed,
            type_params: ty.type_params.clone(),
            type_args: ty.type_args.iter().map(|a| self.apply(a)).collect(),
            base: ty.base.as_ref().map(|b| Arc::new(self.apply_descriptor(b))),
            interfaces: ty
                .interfaces
                .iter()
                .map(|i| Arc::new(self.apply_descriptor(i)))
                .collect(),
            properties: ty
                .properties
                .iter()
                .map(|p| PropertyDescriptor {
                    name: p.name.clone(),
                    ty: self.apply(&p.ty),
                    getter: rewritten(&p.getter),
                    setter: rewritten(&p.setter),
                })
                .collect(),
            events: ty
                .events
                .iter()
                .map(|e| EventDescriptor {
                    name: e.name.clone(),
                    handler_type: self.apply(&e.handler_type),
                    add: rewritten(&e.add),
                    remove: rewritten(&e.remove),
                })
                .collect(),
            methods,
        }
    }
}

impl MethodDescriptor {
    /// Close a generic method definition over concrete type arguments
    pub fn close_method(&self, type_args: &[TypeRef]) -> Result<MethodDescriptor, TypeError> {
        if !self.is_generic_method_definition() {
            return Err(TypeError::NotGenericDefinition {
                name: self.to_string(),
            });
        }
        if type_args.len() != self.generic_params.len() {
            return Err(TypeError::InvalidTypeArgCount {
                name: self.to_string(),
                expected: self.generic_params.len(),
                actual: type_args.len(),
            });
        }
        if let Some(open) = type_args.iter().find(|a| a.is_open()) {
            return Err(TypeError::OpenTypeArgument {
                name: self.to_string(),
                argument: open.to_string(),
            });
        }

        let mut closed = Substitution::for_method(type_args).apply_method(self);
        closed.generic_args = type_args.to_vec();
        Ok(closed)
    }
}

impl TypeDescriptor {
    /// Close a generic type definition over type arguments.
    ///
    /// Arguments may themselves mention type parameters (for example when a
    /// generic interface extends another generic interface); the result is
    /// then still open.
    pub fn close(self: &Arc<Self>, type_args: &[TypeRef]) -> Result<Arc<TypeDescriptor>, TypeError> {
        if !self.is_generic_definition() {
            return Err(TypeError::NotGenericDefinition {
                name: self.name.clone(),
            });
        }
        if type_args.len() != self.type_params.len() {
            return Err(TypeError::InvalidTypeArgCount {
                name: self.name.clone(),
                expected: self.type_params.len(),
                actual: type_args.len(),
            });
        }

        let mut closed = Substitution::for_type(type_args).apply_descriptor(self);
        closed.type_args = type_args.to_vec();
        Ok(Arc::new(closed))
    }
}
