//! Proxy runtime
//!
//! Generated types, their instances and the per-call invocation that walks
//! the interceptor chain.

pub mod instance;
pub mod interceptor;
pub mod invocation;
pub mod proxy_type;
pub mod target;
pub mod util;

pub use instance::{CallOutcome, ProxyInstance};
pub use interceptor::{
    AllMethodsHook, FnInterceptor, GenerationHook, Interceptor, InterceptorSelector, TypeFilterSelector,
};
pub use invocation::{Invocation, InvocationState};
pub use proxy_type::{ProxyType, ProxyTypeId};
pub use target::{same_target, ProxyTarget};
pub use util::{as_proxy, is_proxy, unproxied_target, unproxied_target_deep};
