//! Proxy type generation
//!
//! Everything that runs once per distinct proxy type: request
//! fingerprinting, the type cache, member collection, mixin layout,
//! naming and the builder seam.

pub mod builder;
pub mod cache;
pub mod cache_key;
pub mod catalog;
pub mod closing;
pub mod mixin;
pub mod naming;
pub mod options;
pub mod scope;

pub use builder::{BuildRequest, DispatchTableBuilder, ProxyTypeBuilder};
pub use cache::TypeCache;
pub use cache_key::{CacheKey, OptionsFingerprint, PolicyRef, ProxyKind};
pub use catalog::{CatalogEntry, MethodCatalog, Provider};
pub use closing::GenericMethodCache;
pub use mixin::{MixinData, MixinLayout};
pub use naming::NamingScope;
pub use options::{AttributeSpec, GenerationOptions};
pub use scope::ModuleScope;
