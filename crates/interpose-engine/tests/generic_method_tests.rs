//! Integration tests for generic methods and generic interfaces

mod common;

use std::sync::Arc;

use common::ScriptedTarget;
use interpose_engine::types::{MethodBuilder, TypeBuilder, TypeDescriptor, TypeError, TypeRef};
use interpose_engine::{FnInterceptor, GenerationOptions, InvocationError, ProxyGenerator, ProxyTarget, Value};
use parking_lot::Mutex;

fn converter_iface() -> Arc<TypeDescriptor> {
    TypeBuilder::interface("IConverter")
        .method(
            MethodBuilder::new("Convert")
                .generic_params(&["T"])
                .param("value", TypeRef::object())
                .returns(TypeRef::method_param(0)),
        )
        .build()
}

/// `Converter.Convert<T>` parses its argument into `T`
fn converter(iface: &Arc<TypeDescriptor>) -> Arc<dyn ProxyTarget> {
    let class = TypeBuilder::class("Converter")
        .implements(Arc::clone(iface))
        .method(
            MethodBuilder::new("Convert")
                .generic_params(&["T"])
                .param("value", TypeRef::object())
                .returns(TypeRef::method_param(0)),
        )
        .build();
    Arc::new(ScriptedTarget::new(class).on("Convert", |method, args| {
        let text = args.get(0)?.as_str().unwrap_or_default().to_string();
        match method.generic_args.first() {
            Some(t) if *t == TypeRef::int() => Ok(Value::int(text.parse().unwrap_or_default())),
            _ => Ok(Value::str(text)),
        }
    }))
}

#[test]
fn test_generic_call_closes_method() {
    let iface = converter_iface();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let observer = {
        let seen = Arc::clone(&seen);
        FnInterceptor::shared("observe", move |inv| {
            let on_target = inv.method_invocation_target().cloned();
            seen.lock().push((
                inv.method().clone(),
                on_target,
                inv.generic_arguments().to_vec(),
            ));
            inv.proceed()
        })
    };

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            converter(&iface),
            GenerationOptions::default(),
            vec![observer],
        )
        .unwrap();

    let result = proxy
        .call_generic("Convert", &[TypeRef::int()], vec![Value::str("42")])
        .unwrap();
    assert_eq!(result, Value::int(42));
    let result = proxy
        .call_generic("Convert", &[TypeRef::string()], vec![Value::str("42")])
        .unwrap();
    assert_eq!(result, Value::str("42"));

    let seen = seen.lock();
    let (method, on_target, type_args) = &seen[0];
    assert_eq!(type_args, &vec![TypeRef::int()]);
    assert_eq!(method.generic_args, vec![TypeRef::int()]);
    assert_eq!(method.return_type, TypeRef::int());
    assert_eq!(method.declaring_type.name(), Some("IConverter"));
    assert_ne!(method.id(), iface.methods[0].id());

    let on_target = on_target.as_ref().unwrap();
    assert_eq!(on_target.declaring_type.name(), Some("Converter"));
    assert_eq!(on_target.generic_args, vec![TypeRef::int()]);

    assert_eq!(seen[1].0.return_type, TypeRef::string());
}

#[test]
fn test_closed_methods_are_memoized_per_type() {
    let iface = converter_iface();
    let generator = ProxyGenerator::new();
    let proxy = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            converter(&iface),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    let ty = Arc::clone(proxy.proxy_type());

    proxy.call_generic("Convert", &[TypeRef::int()], vec![Value::str("1")]).unwrap();
    // proxied and target members, each closed once
    assert_eq!(ty.closed_method_count(), 2);
    proxy.call_generic("Convert", &[TypeRef::int()], vec![Value::str("2")]).unwrap();
    assert_eq!(ty.closed_method_count(), 2);

    let first = ty.close_method(&iface.methods[0], &[TypeRef::int()]).unwrap();
    let second = ty.close_method(&iface.methods[0], &[TypeRef::int()]).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // a second instance of the same type shares the memo
    let other = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            converter(&iface),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    other.call_generic("Convert", &[TypeRef::string()], vec![Value::str("x")]).unwrap();
    assert_eq!(ty.closed_method_count(), 4);
}

#[test]
fn test_bad_type_arguments_rejected() {
    let iface = converter_iface();
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            converter(&iface),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    let convert = &iface.methods[0];

    let err = proxy
        .invoke(convert, &[TypeRef::int(), TypeRef::string()], vec![Value::Null])
        .unwrap_err();
    assert!(matches!(
        err,
        InvocationError::TypeArguments(TypeError::InvalidTypeArgCount {
            expected: 1,
            actual: 2,
            ..
        })
    ));

    let err = proxy
        .invoke(convert, &[TypeRef::type_param(0)], vec![Value::Null])
        .unwrap_err();
    assert!(matches!(
        err,
        InvocationError::TypeArguments(TypeError::OpenTypeArgument { .. })
    ));

    let err = proxy.call("Convert", vec![Value::Null]).unwrap_err();
    assert!(matches!(err, InvocationError::MethodNotFound { .. }));
}

#[test]
fn test_generic_call_through_nested_proxy() {
    let iface = converter_iface();
    let generator = ProxyGenerator::new();
    let inner: Arc<dyn ProxyTarget> = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            converter(&iface),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    let outer = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            inner,
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();

    let result = outer
        .call_generic("Convert", &[TypeRef::int()], vec![Value::str("7")])
        .unwrap();
    assert_eq!(result, Value::int(7));
}

#[test]
fn test_closed_generic_interface() {
    let repository = TypeBuilder::interface("IRepository")
        .generic_params(&["T"])
        .method(MethodBuilder::new("Add").param("item", TypeRef::type_param(0)))
        .build()
        .close(&[TypeRef::string()])
        .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let capture = {
        let seen = Arc::clone(&seen);
        FnInterceptor::shared("capture", move |inv| {
            seen.lock().push(inv.method().parameter_types());
            Ok(())
        })
    };
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_without_target(
            &repository,
            &[],
            GenerationOptions::default(),
            vec![capture],
        )
        .unwrap();

    proxy.call("Add", vec![Value::str("item")]).unwrap();
    assert_eq!(*seen.lock(), vec![vec![TypeRef::string()]]);
    assert!(proxy.proxy_type().name().starts_with("Interpose.Proxies.IRepository_"));
}
