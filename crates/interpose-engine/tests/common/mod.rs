//! Shared fixtures for proxy integration tests

#![allow(dead_code)]

use std::any::Any;
use std::sync::Arc;

use interpose_engine::types::{MethodBuilder, MethodDescriptor, TypeBuilder, TypeDescriptor, TypeRef};
use interpose_engine::{Arguments, InvocationError, ProxyTarget, Value};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

type Handler = Arc<dyn Fn(&MethodDescriptor, &mut Arguments) -> Result<Value, InvocationError> + Send + Sync>;

/// Target whose members are closures keyed by method name
pub struct ScriptedTarget {
    ty: Arc<TypeDescriptor>,
    handlers: FxHashMap<String, Handler>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTarget {
    pub fn new(ty: Arc<TypeDescriptor>) -> Self {
        Self {
            ty,
            handlers: FxHashMap::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&MethodDescriptor, &mut Arguments) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        self.handlers.insert(name.to_string(), Arc::new(handler));
        self
    }

    /// Method descriptors seen by `invoke`, rendered
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn shared(self) -> Arc<ScriptedTarget> {
        Arc::new(self)
    }
}

impl ProxyTarget for ScriptedTarget {
    fn type_descriptor(&self) -> Arc<TypeDescriptor> {
        Arc::clone(&self.ty)
    }

    fn invoke(&self, method: &MethodDescriptor, args: &mut Arguments) -> Result<Value, InvocationError> {
        self.calls.lock().push(method.to_string());
        match self.handlers.get(&method.name) {
            Some(handler) => handler(method, args),
            None => Ok(Value::Null),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn as_target(target: Arc<ScriptedTarget>) -> Arc<dyn ProxyTarget> {
    target
}

// ============================================================================
// Fixture types
// ============================================================================

pub fn calculator_iface() -> Arc<TypeDescriptor> {
    TypeBuilder::interface("ICalculator")
        .method(
            MethodBuilder::new("Sum")
                .param("a", TypeRef::int())
                .param("b", TypeRef::int())
                .returns(TypeRef::int()),
        )
        .build()
}

pub fn calculator_class(iface: &Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
    TypeBuilder::class("Calculator")
        .implements(Arc::clone(iface))
        .method(
            MethodBuilder::new("Sum")
                .param("a", TypeRef::int())
                .param("b", TypeRef::int())
                .returns(TypeRef::int())
                .as_virtual(),
        )
        .build()
}

/// `Calculator` whose `Sum` adds its two arguments
pub fn calculator(iface: &Arc<TypeDescriptor>) -> Arc<ScriptedTarget> {
    ScriptedTarget::new(calculator_class(iface))
        .on("Sum", |_, args| {
            let a = args.get(0)?.as_int().unwrap_or_default();
            let b = args.get(1)?.as_int().unwrap_or_default();
            Ok(Value::int(a + b))
        })
        .shared()
}

pub fn simple_iface(name: &str, method: &str) -> Arc<TypeDescriptor> {
    TypeBuilder::interface(name)
        .method(MethodBuilder::new(method).returns(TypeRef::int()))
        .build()
}

/// Class implementing `ifaces` whose methods return `value`
pub fn constant_impl(class: &str, ifaces: &[&Arc<TypeDescriptor>], value: i64) -> Arc<dyn ProxyTarget> {
    let mut builder = TypeBuilder::class(class);
    let mut names = Vec::new();
    for iface in ifaces {
        builder = builder.implements(Arc::clone(iface));
        for method in &iface.methods {
            names.push(method.name.clone());
            builder = builder.method(MethodBuilder::new(method.name.clone()).returns(TypeRef::int()));
        }
    }
    let mut target = ScriptedTarget::new(builder.build());
    for name in names {
        target = target.on(&name, move |_, _| Ok(Value::int(value)));
    }
    Arc::new(target)
}
