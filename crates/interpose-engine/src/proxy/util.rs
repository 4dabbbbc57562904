//! Proxy introspection helpers

use std::sync::Arc;

use interpose_types::{MethodBuilder, TypeBuilder, TypeDescriptor, TypeRef};
use once_cell::sync::Lazy;

use crate::proxy::instance::ProxyInstance;
use crate::proxy::target::ProxyTarget;

/// Name of the infrastructure interface every proxy implements
pub const PROXY_TARGET_ACCESSOR_NAME: &str = "interpose.IProxyTargetAccessor";

/// The infrastructure interface every proxy implements.
///
/// Members are answered by the proxy itself and never intercepted.
pub static PROXY_TARGET_ACCESSOR: Lazy<Arc<TypeDescriptor>> = Lazy::new(|| {
    TypeBuilder::interface(PROXY_TARGET_ACCESSOR_NAME)
        .method(MethodBuilder::new("DynProxyGetTarget").returns(TypeRef::object()))
        .method(MethodBuilder::new("GetInterceptors").returns(TypeRef::object()))
        .build()
});

/// Check whether an object is a proxy generated by this engine
pub fn is_proxy(target: &dyn ProxyTarget) -> bool {
    target.as_any().is::<ProxyInstance>()
}

/// View an object as a proxy instance
pub fn as_proxy(target: &dyn ProxyTarget) -> Option<&ProxyInstance> {
    target.as_any().downcast_ref::<ProxyInstance>()
}

/// Object behind one layer of proxying; non-proxies and targetless proxies
/// return the object itself
pub fn unproxied_target(target: &Arc<dyn ProxyTarget>) -> Arc<dyn ProxyTarget> {
    match as_proxy(target.as_ref()).and_then(|proxy| proxy.target()) {
        Some(inner) => Arc::clone(inner),
        None => Arc::clone(target),
    }
}

/// Object behind every layer of proxying
pub fn unproxied_target_deep(target: &Arc<dyn ProxyTarget>) -> Arc<dyn ProxyTarget> {
    let mut current = Arc::clone(target);
    loop {
        let next = match as_proxy(current.as_ref()).and_then(|proxy| proxy.target()) {
            Some(inner) => Arc::clone(inner),
            None => return current,
        };
        current = next;
    }
}
