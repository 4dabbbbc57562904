//! Interpose Proxy Engine
//!
//! Runtime proxy generation with method interception. A proxy stands in
//! for a class or interface; every call is turned into an [`Invocation`]
//! that passes through an ordered chain of [`Interceptor`]s before
//! reaching the target, a mixin, or nothing at all.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use interpose_engine::{FnInterceptor, GenerationOptions, ProxyGenerator};
//!
//! let generator = ProxyGenerator::new();
//! let logger = FnInterceptor::shared("logger", |inv| {
//!     tracing::info!(method = %inv.method(), "call");
//!     inv.proceed()
//! });
//! let proxy = generator.create_interface_proxy_with_target(
//!     &calculator_iface,
//!     &[],
//!     calculator,
//!     GenerationOptions::default(),
//!     vec![logger],
//! )?;
//! assert_eq!(proxy.call("Sum", vec![2.into(), 3.into()])?.as_int(), Some(5));
//! ```
//!
//! Generated types are cached per [`ModuleScope`]: two requests with the
//! same target, interfaces and options share one [`ProxyType`].

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod generation;
pub mod generator;
pub mod proxy;
pub mod value;

pub use config::{ConfigError, ScopeConfig};
pub use error::{
    BoxError, ConfigurationError, GenerationError, InvocationError, ProxyError, ProxyResult,
};
pub use generation::{
    AttributeSpec, GenerationOptions, MixinData, ModuleScope, ProxyKind, ProxyTypeBuilder,
};
pub use generator::{ProxyGenerator, ProxyRequest};
pub use proxy::{
    AllMethodsHook, CallOutcome, FnInterceptor, GenerationHook, Interceptor, InterceptorSelector,
    Invocation, InvocationState, ProxyInstance, ProxyTarget, ProxyType, TypeFilterSelector,
};
pub use value::{Arguments, Value};

pub use interpose_types as types;
