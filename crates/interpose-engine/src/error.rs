//! Error types for the proxy engine

use std::error::Error as StdError;

use interpose_types::TypeError;
use thiserror::Error;

/// Boxed error raised by an interceptor or a target implementation
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Caller-fixable problems detected while a request is being prepared
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Two mixins implement the same interface
    #[error("Duplicate mixin interface {interface}: implemented by both {first} and {second}")]
    DuplicateMixinInterface {
        /// Shared interface
        interface: String,
        /// Type of the first mixin
        first: String,
        /// Type of the second mixin
        second: String,
    },

    /// A mixin exposes the proxy infrastructure interface (it is itself a proxy)
    #[error("Mixin {mixin} implements {interface}; proxies cannot be used as mixins")]
    InfrastructureInterfaceMixin {
        /// Type of the offending mixin
        mixin: String,
        /// Infrastructure interface name
        interface: String,
    },

    /// The supplied target does not implement the proxied interface
    #[error("Target type {target} does not implement interface {interface}")]
    TargetDoesNotImplementInterface {
        /// Target type
        target: String,
        /// Proxied interface
        interface: String,
    },

    /// The supplied target is not the type the proxy type was generated for
    #[error("Proxy type {proxy} was generated for target type {expected}, got {actual}")]
    TargetTypeMismatch {
        /// Proxy type name
        proxy: String,
        /// Target type baked into the proxy type
        expected: String,
        /// Type of the supplied target
        actual: String,
    },

    /// The base implementation of a class proxy does not derive from the proxied class
    #[error("Base implementation {actual} does not derive from proxied class {class}")]
    BaseTypeMismatch {
        /// Proxied class
        class: String,
        /// Type of the supplied base implementation
        actual: String,
    },

    /// The proxy infrastructure interface was requested explicitly
    #[error("{interface} is implemented by every proxy and cannot be requested as an additional interface")]
    InfrastructureInterface {
        /// Offending interface
        interface: String,
    },

    /// Mixins supplied at instantiation do not match the proxy type's layout
    #[error("Mixin layout mismatch for {proxy}: expected [{expected}], got [{actual}]")]
    MixinLayoutMismatch {
        /// Proxy type name
        proxy: String,
        /// Interfaces the proxy type was generated for
        expected: String,
        /// Interfaces of the supplied mixins
        actual: String,
    },

    /// A proxy kind that forwards to a target was instantiated without one
    #[error("Proxy type {proxy} requires a target instance")]
    MissingTarget {
        /// Proxy type name
        proxy: String,
    },
}

/// Failures that prevent a proxy type from being generated
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Target, interface, or base type is not public
    #[error("Cannot create proxy for type {name} because it is not accessible ({visibility})")]
    InaccessibleType {
        /// Type name
        name: String,
        /// Declared visibility
        visibility: String,
    },

    /// Generic type without (or with unbound) arguments
    #[error("Cannot create proxy for open generic type {name}")]
    OpenGenericType {
        /// Type name
        name: String,
    },

    /// Closed generic type whose argument is not accessible
    #[error("Cannot create proxy for {name} because its generic argument {argument} is not accessible")]
    InaccessibleGenericArgument {
        /// Closed type
        name: String,
        /// Offending argument
        argument: String,
    },

    /// Class target cannot be derived from
    #[error("Cannot create class proxy for sealed type {name}")]
    SealedType {
        /// Type name
        name: String,
    },

    /// Something other than an interface was passed where an interface is required
    #[error("{name} is not an interface")]
    NotAnInterface {
        /// Type name
        name: String,
    },

    /// Something other than a class was passed where a class is required
    #[error("{name} is not a class")]
    NotAClass {
        /// Type name
        name: String,
    },

    /// Base type override for an interface proxy is unusable
    #[error("Invalid base type {name} for interface proxy: {reason}")]
    InvalidBaseType {
        /// Base type name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Backend-specific build failure
    #[error("Proxy type builder failed: {0}")]
    Backend(String),
}

/// Errors raised while a proxied call is dispatched
#[derive(Debug, Error)]
pub enum InvocationError {
    /// `proceed()` reached the end of the chain with nothing to call
    #[error(
        "This is an interception protocol error: the interceptor attempted to proceed for method \
         '{method}', which has no target. When calling a method without a target there is no \
         implementation to proceed to and it is the interceptor's responsibility to mimic the \
         implementation (set the return value and out arguments)"
    )]
    NoImplementation {
        /// Method being invoked
        method: String,
    },

    /// Target swap requested on a proxy kind that does not support it
    #[error("Changing the invocation target is not supported for {method} on this proxy kind")]
    TargetChangeNotSupported {
        /// Method being invoked
        method: String,
    },

    /// Replacement target does not implement the proxied interface
    #[error("New invocation target {target} does not implement {interface}")]
    IncompatibleTarget {
        /// Replacement target type
        target: String,
        /// Interface declaring the invoked method
        interface: String,
    },

    /// No proxied member matches the call
    #[error("Method {name} not found on proxy {proxy}")]
    MethodNotFound {
        /// Proxy type name
        proxy: String,
        /// Requested member
        name: String,
    },

    /// Several proxied members match the call
    #[error("Call to {name} on proxy {proxy} is ambiguous ({candidates} candidates)")]
    AmbiguousMethod {
        /// Proxy type name
        proxy: String,
        /// Requested member
        name: String,
        /// Number of matches
        candidates: usize,
    },

    /// Argument slot out of range
    #[error("Argument index {index} out of range (call has {count} arguments)")]
    ArgumentIndex {
        /// Requested slot
        index: usize,
        /// Slot count
        count: usize,
    },

    /// Generic method could not be closed over the supplied arguments
    #[error(transparent)]
    TypeArguments(#[from] TypeError),

    /// Error raised by an interceptor or implementation, passed through untouched
    #[error(transparent)]
    Raised(BoxError),
}

impl InvocationError {
    /// Wrap an application error so it can travel through the chain
    pub fn raised<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        InvocationError::Raised(err.into())
    }

    /// The application error, if this wraps one
    pub fn raised_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            InvocationError::Raised(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Downcast the application error to a concrete type
    pub fn downcast_raised<E: StdError + 'static>(&self) -> Option<&E> {
        self.raised_error().and_then(|err| err.downcast_ref::<E>())
    }
}

/// Umbrella error returned by the generator facade
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Bad request
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Type generation failed
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Call dispatch failed
    #[error(transparent)]
    Invocation(#[from] InvocationError),

    /// Descriptor manipulation failed
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias used across the engine
pub type ProxyResult<T> = Result<T, ProxyError>;
