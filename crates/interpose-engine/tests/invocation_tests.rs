//! Integration tests for call dispatch through interceptor chains

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use common::{as_target, calculator, calculator_class, calculator_iface, ScriptedTarget};
use interpose_engine::proxy::util::PROXY_TARGET_ACCESSOR;
use interpose_engine::proxy::{is_proxy, same_target, unproxied_target, unproxied_target_deep};
use interpose_engine::types::{
    EventBuilder, MethodBuilder, MethodDescriptor, PropertyBuilder, TypeBuilder, TypeDescriptor, TypeRef,
};
use interpose_engine::{
    Arguments, ConfigurationError, FnInterceptor, GenerationHook, GenerationOptions, Interceptor, InvocationError,
    InvocationState, MixinData, ProxyGenerator, ProxyRequest, ProxyTarget, Value,
};
use parking_lot::Mutex;

#[derive(Debug, thiserror::Error)]
#[error("insufficient funds: {0}")]
struct InsufficientFunds(i64);

fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> Arc<dyn Interceptor> {
    let log = Arc::clone(log);
    FnInterceptor::shared(label, move |inv| {
        log.lock().push(format!("{label}:{}", inv.method().name));
        inv.proceed()
    })
}

// ============================================================================
// Forwarding and the chain
// ============================================================================

#[test]
fn test_sum_reaches_target_through_chain() {
    let iface = calculator_iface();
    let target = calculator(&iface);
    let log = Arc::new(Mutex::new(Vec::new()));

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            as_target(Arc::clone(&target)),
            GenerationOptions::default(),
            vec![recorder(&log, "outer"), recorder(&log, "inner")],
        )
        .unwrap();

    let result = proxy.call("Sum", vec![2.into(), 3.into()]).unwrap();
    assert_eq!(result, Value::int(5));
    assert_eq!(*log.lock(), vec!["outer:Sum", "inner:Sum"]);

    let calls = target.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("Calculator.Sum"), "{}", calls[0]);
}

#[test]
fn test_targetless_call_without_interceptors_fails() {
    let iface = calculator_iface();
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_without_target(&iface, &[], GenerationOptions::default(), Vec::new())
        .unwrap();

    let err = proxy.call("Sum", vec![1.into(), 2.into()]).unwrap_err();
    assert!(matches!(err, InvocationError::NoImplementation { .. }));
    let message = err.to_string();
    assert!(message.contains("ICalculator.Sum"), "{message}");
    assert!(message.contains("mimic"), "{message}");
}

#[test]
fn test_interceptor_short_circuits() {
    let iface = calculator_iface();
    let answer = FnInterceptor::shared("answer", |inv| {
        assert_eq!(inv.state(), InvocationState::Dispatching);
        assert!(inv.invocation_target().is_none());
        inv.set_return_value(Value::int(42));
        Ok(())
    });
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_without_target(&iface, &[], GenerationOptions::default(), vec![answer])
        .unwrap();

    assert_eq!(proxy.call("Sum", vec![1.into(), 1.into()]).unwrap(), Value::int(42));
}

#[test]
fn test_interceptor_may_proceed_twice() {
    let iface = calculator_iface();
    let target = calculator(&iface);
    let retry = FnInterceptor::shared("retry", |inv| {
        assert_eq!(inv.chain_position(), 1);
        inv.proceed()?;
        let first = inv.return_value().clone();
        inv.proceed()?;
        assert_eq!(inv.chain_position(), 1);
        assert_eq!(*inv.return_value(), first);
        Ok(())
    });

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            as_target(Arc::clone(&target)),
            GenerationOptions::default(),
            vec![retry],
        )
        .unwrap();

    assert_eq!(proxy.call("Sum", vec![2.into(), 3.into()]).unwrap(), Value::int(5));
    assert_eq!(target.calls().len(), 2);
}

#[test]
fn test_interceptor_rewrites_arguments() {
    let iface = calculator_iface();
    let target = calculator(&iface);
    let double_first = FnInterceptor::shared("double", |inv| {
        let a = inv.argument(0)?.as_int().unwrap_or_default();
        inv.set_argument(0, Value::int(a * 2))?;
        inv.proceed()
    });

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            as_target(target),
            GenerationOptions::default(),
            vec![double_first],
        )
        .unwrap();

    assert_eq!(proxy.call("Sum", vec![2.into(), 3.into()]).unwrap(), Value::int(7));
}

// ============================================================================
// By-ref parameters
// ============================================================================

fn parser_iface() -> Arc<TypeDescriptor> {
    TypeBuilder::interface("IParser")
        .method(
            MethodBuilder::new("TryParse")
                .param("text", TypeRef::string())
                .out_param("result", TypeRef::int())
                .returns(TypeRef::bool()),
        )
        .method(MethodBuilder::new("Increment").ref_param("counter", TypeRef::int()))
        .build()
}

fn parser(iface: &Arc<TypeDescriptor>) -> Arc<dyn ProxyTarget> {
    let class = TypeBuilder::class("Parser")
        .implements(Arc::clone(iface))
        .method(
            MethodBuilder::new("TryParse")
                .param("text", TypeRef::string())
                .out_param("result", TypeRef::int())
                .returns(TypeRef::bool()),
        )
        .method(MethodBuilder::new("Increment").ref_param("counter", TypeRef::int()))
        .build();
    Arc::new(
        ScriptedTarget::new(class)
            .on("TryParse", |_, args| {
                let parsed = args.get(0)?.as_str().and_then(|s| s.parse::<i64>().ok());
                args.set(1, Value::int(parsed.unwrap_or_default()))?;
                Ok(Value::bool(parsed.is_some()))
            })
            .on("Increment", |_, args| {
                let current = args.get(0)?.as_int().unwrap_or_default();
                args.set(0, Value::int(current + 1))?;
                Ok(Value::Null)
            }),
    )
}

#[test]
fn test_out_and_ref_arguments_flow_back() {
    let iface = parser_iface();
    let seen_after_proceed = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&seen_after_proceed);
    let observe = FnInterceptor::shared("observe", move |inv| {
        inv.proceed()?;
        seen.lock().push(inv.arguments().as_slice().to_vec());
        Ok(())
    });

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            parser(&iface),
            GenerationOptions::default(),
            vec![observe],
        )
        .unwrap();

    let try_parse = &iface.methods[0];
    assert!(try_parse.has_by_ref_parameters());
    let outcome = proxy
        .invoke(try_parse, &[], vec![Value::str("17"), Value::Null])
        .unwrap();
    assert_eq!(outcome.return_value, Value::bool(true));
    assert_eq!(outcome.arguments.get(1).unwrap(), &Value::int(17));

    let outcome = proxy.invoke(&iface.methods[1], &[], vec![Value::int(9)]).unwrap();
    assert_eq!(outcome.arguments.as_slice(), &[Value::int(10)]);

    let seen = seen_after_proceed.lock();
    assert_eq!(seen[0][1], Value::int(17));
    assert_eq!(seen[1][0], Value::int(10));
}

#[test]
fn test_interceptor_fills_out_argument_without_target() {
    let iface = parser_iface();
    let fake = FnInterceptor::shared("fake", |inv| {
        if inv.method().name == "TryParse" {
            inv.set_argument(1, Value::int(-1))?;
            inv.set_return_value(Value::bool(false));
        }
        Ok(())
    });
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_without_target(&iface, &[], GenerationOptions::default(), vec![fake])
        .unwrap();

    let mut args = Arguments::new(vec![Value::str("x"), Value::Null]);
    let method: &MethodDescriptor = &iface.methods[0];
    let result = ProxyTarget::invoke(proxy.as_ref(), method, &mut args).unwrap();
    assert_eq!(result, Value::bool(false));
    assert_eq!(args.get(1).unwrap(), &Value::int(-1));
}

// ============================================================================
// Target changes
// ============================================================================

fn multiplier(iface: &Arc<TypeDescriptor>) -> Arc<dyn ProxyTarget> {
    let class = TypeBuilder::class("Multiplier")
        .implements(Arc::clone(iface))
        .method(
            MethodBuilder::new("Sum")
                .param("a", TypeRef::int())
                .param("b", TypeRef::int())
                .returns(TypeRef::int()),
        )
        .build();
    Arc::new(ScriptedTarget::new(class).on("Sum", |_, args| {
        let a = args.get(0)?.as_int().unwrap_or_default();
        let b = args.get(1)?.as_int().unwrap_or_default();
        Ok(Value::int(a * b))
    }))
}

#[test]
fn test_target_change_applies_to_one_call() {
    let iface = calculator_iface();
    let original = as_target(calculator(&iface));
    let replacement = multiplier(&iface);
    let switch_once = Arc::new(AtomicBool::new(true));

    let swap = {
        let replacement = Arc::clone(&replacement);
        let switch_once = Arc::clone(&switch_once);
        FnInterceptor::shared("swap", move |inv| {
            if switch_once.swap(false, Ordering::SeqCst) {
                inv.change_invocation_target(Arc::clone(&replacement))?;
            }
            inv.proceed()
        })
    };

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target_interface(
            &iface,
            &[],
            Arc::clone(&original),
            GenerationOptions::default(),
            vec![swap],
        )
        .unwrap();

    assert_eq!(proxy.call("Sum", vec![2.into(), 3.into()]).unwrap(), Value::int(6));
    assert_eq!(proxy.call("Sum", vec![2.into(), 3.into()]).unwrap(), Value::int(5));
    assert!(same_target(proxy.target().unwrap(), &original));
}

#[test]
fn test_target_change_rejected_for_fixed_target() {
    let iface = calculator_iface();
    let replacement = multiplier(&iface);
    let swap = FnInterceptor::shared("swap", move |inv| {
        inv.change_invocation_target(Arc::clone(&replacement))?;
        inv.proceed()
    });

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            as_target(calculator(&iface)),
            GenerationOptions::default(),
            vec![swap],
        )
        .unwrap();

    let err = proxy.call("Sum", vec![1.into(), 1.into()]).unwrap_err();
    assert!(matches!(err, InvocationError::TargetChangeNotSupported { .. }));
}

#[test]
fn test_target_change_rejects_incompatible_target() {
    let iface = calculator_iface();
    let stranger: Arc<dyn ProxyTarget> = Arc::new(ScriptedTarget::new(TypeBuilder::class("Stranger").build()));
    let swap = FnInterceptor::shared("swap", move |inv| {
        inv.change_invocation_target(Arc::clone(&stranger))?;
        inv.proceed()
    });

    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target_interface(
            &iface,
            &[],
            as_target(calculator(&iface)),
            GenerationOptions::default(),
            vec![swap],
        )
        .unwrap();

    let err = proxy.call("Sum", vec![1.into(), 1.into()]).unwrap_err();
    match err {
        InvocationError::IncompatibleTarget { target, interface } => {
            assert_eq!(target, "Stranger");
            assert_eq!(interface, "ICalculator");
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Errors
// ============================================================================

fn account_iface() -> Arc<TypeDescriptor> {
    TypeBuilder::interface("IAccount")
        .method(MethodBuilder::new("Withdraw").param("amount", TypeRef::int()))
        .build()
}

fn failing_account(iface: &Arc<TypeDescriptor>) -> Arc<dyn ProxyTarget> {
    let class = TypeBuilder::class("Account")
        .implements(Arc::clone(iface))
        .method(MethodBuilder::new("Withdraw").param("amount", TypeRef::int()))
        .build();
    Arc::new(ScriptedTarget::new(class).on("Withdraw", |_, args| {
        let amount = args.get(0)?.as_int().unwrap_or_default();
        Err(InvocationError::raised(InsufficientFunds(amount)))
    }))
}

#[test]
fn test_target_error_propagates_unchanged() {
    let iface = account_iface();
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            failing_account(&iface),
            GenerationOptions::default(),
            vec![FnInterceptor::shared("pass", |inv| inv.proceed())],
        )
        .unwrap();

    let err = proxy.call("Withdraw", vec![100.into()]).unwrap_err();
    let raised = err.downcast_raised::<InsufficientFunds>().unwrap();
    assert_eq!(raised.0, 100);
    assert_eq!(err.to_string(), "insufficient funds: 100");
}

#[test]
fn test_interceptor_can_swallow_error() {
    let iface = account_iface();
    let swallow = FnInterceptor::shared("swallow", |inv| match inv.proceed() {
        Err(err) if err.downcast_raised::<InsufficientFunds>().is_some() => {
            inv.set_return_value(Value::bool(false));
            Ok(())
        }
        other => other,
    });
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            failing_account(&iface),
            GenerationOptions::default(),
            vec![swallow],
        )
        .unwrap();

    assert_eq!(proxy.call("Withdraw", vec![5.into()]).unwrap(), Value::bool(false));
}

#[test]
fn test_retry_after_nested_proxy_fault_keeps_arguments() {
    let iface = calculator_iface();
    let generator = ProxyGenerator::new();
    let fail_once = Arc::new(AtomicBool::new(true));

    let flaky = {
        let fail_once = Arc::clone(&fail_once);
        FnInterceptor::shared("flaky", move |inv| {
            if fail_once.swap(false, Ordering::SeqCst) {
                return Err(InvocationError::raised("transient failure"));
            }
            inv.proceed()
        })
    };
    let inner: Arc<dyn ProxyTarget> = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            as_target(calculator(&iface)),
            GenerationOptions::default(),
            vec![flaky],
        )
        .unwrap();

    let seen_after_fault = Arc::new(Mutex::new(None));
    let retry = {
        let seen_after_fault = Arc::clone(&seen_after_fault);
        FnInterceptor::shared("retry", move |inv| match inv.proceed() {
            Ok(()) => Ok(()),
            Err(_) => {
                *seen_after_fault.lock() = Some(inv.arguments().clone());
                inv.proceed()
            }
        })
    };
    let outer = generator
        .create_interface_proxy_with_target(&iface, &[], inner, GenerationOptions::default(), vec![retry])
        .unwrap();

    assert_eq!(outer.call("Sum", vec![2.into(), 3.into()]).unwrap(), Value::int(5));
    let seen = seen_after_fault.lock().take().unwrap();
    assert_eq!(seen, Arguments::new(vec![Value::int(2), Value::int(3)]));
}

// ============================================================================
// Instantiation
// ============================================================================

#[test]
fn test_instantiate_rejects_target_of_another_type() {
    let iface = calculator_iface();
    let ty = ProxyGenerator::new()
        .proxy_type(&ProxyRequest::interface_with_target(
            Arc::clone(&iface),
            calculator_class(&iface),
        ))
        .unwrap();

    let err = ty
        .instantiate(Some(multiplier(&iface)), MixinData::empty(), Vec::new())
        .unwrap_err();
    match err {
        ConfigurationError::TargetTypeMismatch { expected, actual, .. } => {
            assert_eq!(expected, "Calculator");
            assert_eq!(actual, "Multiplier");
        }
        other => panic!("unexpected error: {other}"),
    }

    let proxy = ty
        .instantiate(Some(as_target(calculator(&iface))), MixinData::empty(), Vec::new())
        .unwrap();
    assert_eq!(proxy.call("Sum", vec![2.into(), 2.into()]).unwrap(), Value::int(4));
}

#[test]
fn test_instantiate_checks_class_proxy_base() {
    let class = service_class();
    let ty = ProxyGenerator::new()
        .proxy_type(&ProxyRequest::class(Arc::clone(&class)))
        .unwrap();

    let stranger: Arc<dyn ProxyTarget> = Arc::new(ScriptedTarget::new(TypeBuilder::class("Stranger").build()));
    let err = ty.instantiate(Some(stranger), MixinData::empty(), Vec::new()).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::BaseTypeMismatch {
            class: "Service".to_string(),
            actual: "Stranger".to_string(),
        }
    );

    let derived = TypeBuilder::class("SpecialService").extends(Arc::clone(&class)).build();
    let base = ScriptedTarget::new(derived).on("Run", |_, _| Ok(Value::int(3))).shared();
    let proxy = ty.instantiate(Some(as_target(base)), MixinData::empty(), Vec::new()).unwrap();
    assert_eq!(proxy.call("Run", Vec::new()).unwrap(), Value::int(3));
}

// ============================================================================
// Class proxies
// ============================================================================

fn service_class() -> Arc<TypeDescriptor> {
    TypeBuilder::class("Service")
        .method(MethodBuilder::new("Run").returns(TypeRef::int()).as_virtual())
        .method(MethodBuilder::new("Fixed").returns(TypeRef::int()))
        .method(MethodBuilder::new("Compute").returns(TypeRef::int()).as_abstract())
        .build()
}

fn service_base(class: &Arc<TypeDescriptor>) -> Arc<ScriptedTarget> {
    ScriptedTarget::new(Arc::clone(class))
        .on("Run", |_, _| Ok(Value::int(1)))
        .on("Fixed", |_, _| Ok(Value::int(2)))
        .shared()
}

fn counting(counter: &Arc<AtomicUsize>) -> Arc<dyn Interceptor> {
    let counter = Arc::clone(counter);
    FnInterceptor::shared("count", move |inv| {
        counter.fetch_add(1, Ordering::SeqCst);
        if inv.method().name == "Compute" {
            inv.set_return_value(Value::int(99));
            return Ok(());
        }
        inv.proceed()
    })
}

#[test]
fn test_class_proxy_intercepts_virtual_members_only() {
    let class = service_class();
    let base = service_base(&class);
    let counter = Arc::new(AtomicUsize::new(0));

    let proxy = ProxyGenerator::new()
        .create_class_proxy(
            &class,
            &[],
            GenerationOptions::default(),
            as_target(Arc::clone(&base)),
            vec![counting(&counter)],
        )
        .unwrap();

    assert_eq!(proxy.call("Run", Vec::new()).unwrap(), Value::int(1));
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    assert_eq!(proxy.call("Fixed", Vec::new()).unwrap(), Value::int(2));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(base.calls().len(), 2);

    assert_eq!(proxy.call("Compute", Vec::new()).unwrap(), Value::int(99));
    assert!(proxy.proxy_type().descriptor().base.is_some());
}

#[test]
fn test_abstract_member_without_interceptor_fails() {
    let class = service_class();
    let proxy = ProxyGenerator::new()
        .create_class_proxy(
            &class,
            &[],
            GenerationOptions::default(),
            as_target(service_base(&class)),
            Vec::new(),
        )
        .unwrap();

    let err = proxy.call("Compute", Vec::new()).unwrap_err();
    assert!(matches!(err, InvocationError::NoImplementation { .. }));
}

struct SkipRun;

impl GenerationHook for SkipRun {
    fn should_intercept(&self, _ty: &TypeDescriptor, method: &MethodDescriptor) -> bool {
        method.name != "Run"
    }
}

#[test]
fn test_hook_veto_passes_member_through() {
    let class = service_class();
    let counter = Arc::new(AtomicUsize::new(0));
    let proxy = ProxyGenerator::new()
        .create_class_proxy(
            &class,
            &[],
            GenerationOptions::new().with_hook(Arc::new(SkipRun)),
            as_target(service_base(&class)),
            vec![counting(&counter)],
        )
        .unwrap();

    assert_eq!(proxy.call("Run", Vec::new()).unwrap(), Value::int(1));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Properties and events
// ============================================================================

fn widget_iface() -> Arc<TypeDescriptor> {
    TypeBuilder::interface("IWidget")
        .property(PropertyBuilder::new("Title", TypeRef::string()))
        .event(EventBuilder::new("Changed", TypeRef::named("EventHandler")))
        .build()
}

#[test]
fn test_property_and_event_accessors_are_intercepted() {
    let iface = widget_iface();
    let class = TypeBuilder::class("Widget")
        .implements(Arc::clone(&iface))
        .property(PropertyBuilder::new("Title", TypeRef::string()))
        .event(EventBuilder::new("Changed", TypeRef::named("EventHandler")))
        .build();

    let title = Arc::new(Mutex::new(Value::Null));
    let handlers = Arc::new(AtomicUsize::new(0));
    let target = {
        let (get, set) = (Arc::clone(&title), Arc::clone(&title));
        let (add, remove) = (Arc::clone(&handlers), Arc::clone(&handlers));
        ScriptedTarget::new(class)
            .on("get_Title", move |_, _| Ok(get.lock().clone()))
            .on("set_Title", move |_, args| {
                *set.lock() = args.get(0)?.clone();
                Ok(Value::Null)
            })
            .on("add_Changed", move |_, _| {
                add.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            })
            .on("remove_Changed", move |_, _| {
                remove.fetch_sub(1, Ordering::SeqCst);
                Ok(Value::Null)
            })
    };

    let log = Arc::new(Mutex::new(Vec::new()));
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            Arc::new(target),
            GenerationOptions::default(),
            vec![recorder(&log, "log")],
        )
        .unwrap();

    proxy.set_property("Title", Value::str("Hello")).unwrap();
    assert_eq!(proxy.get_property("Title").unwrap(), Value::str("Hello"));
    proxy.add_event_handler("Changed", Value::str("handler")).unwrap();
    proxy.add_event_handler("Changed", Value::str("handler")).unwrap();
    proxy.remove_event_handler("Changed", Value::str("handler")).unwrap();

    assert_eq!(handlers.load(Ordering::SeqCst), 1);
    assert_eq!(
        *log.lock(),
        vec![
            "log:set_Title",
            "log:get_Title",
            "log:add_Changed",
            "log:add_Changed",
            "log:remove_Changed"
        ]
    );
    assert!(matches!(
        proxy.get_property("Missing"),
        Err(InvocationError::MethodNotFound { .. })
    ));
}

// ============================================================================
// Introspection
// ============================================================================

#[test]
fn test_unproxied_target_unwraps_layers() {
    let iface = calculator_iface();
    let calc = as_target(calculator(&iface));
    let generator = ProxyGenerator::new();

    let inner = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            Arc::clone(&calc),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    let inner: Arc<dyn ProxyTarget> = inner;
    let outer = generator
        .create_interface_proxy_with_target(
            &iface,
            &[],
            Arc::clone(&inner),
            GenerationOptions::default(),
            Vec::new(),
        )
        .unwrap();
    let outer_target: Arc<dyn ProxyTarget> = outer.clone();

    assert!(is_proxy(outer_target.as_ref()));
    assert!(!is_proxy(calc.as_ref()));
    assert!(same_target(&unproxied_target(&outer_target), &inner));
    assert!(same_target(&unproxied_target_deep(&outer_target), &calc));
    assert!(same_target(&unproxied_target(&calc), &calc));

    assert_eq!(outer.call("Sum", vec![4.into(), 5.into()]).unwrap(), Value::int(9));
}

#[test]
fn test_accessor_interface_answers_without_interception() {
    let iface = calculator_iface();
    let calc = as_target(calculator(&iface));
    let counter = Arc::new(AtomicUsize::new(0));
    let proxy = ProxyGenerator::new()
        .create_interface_proxy_with_target(
            &iface,
            &[],
            Arc::clone(&calc),
            GenerationOptions::default(),
            vec![counting(&counter)],
        )
        .unwrap();

    assert!(proxy.proxy_type().descriptor().implements(&PROXY_TARGET_ACCESSOR));

    let get_target = &PROXY_TARGET_ACCESSOR.methods[0];
    let value = ProxyTarget::invoke(proxy.as_ref(), get_target, &mut Arguments::default()).unwrap();
    let returned = value.downcast::<Arc<dyn ProxyTarget>>().unwrap();
    assert!(same_target(&returned, &calc));

    let get_interceptors = &PROXY_TARGET_ACCESSOR.methods[1];
    let value = ProxyTarget::invoke(proxy.as_ref(), get_interceptors, &mut Arguments::default()).unwrap();
    let interceptors = value.downcast::<Vec<Arc<dyn Interceptor>>>().unwrap();
    assert_eq!(interceptors.len(), 1);
    assert_eq!(interceptors[0].name(), "count");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}
