//! Module scope
//!
//! Owns the state shared by every proxy type generated through one
//! generator: the type cache, the naming scope and the configuration.

use interpose_types::TypeDescriptor;

use crate::config::ScopeConfig;
use crate::generation::cache::TypeCache;
use crate::generation::naming::{flatten_type_name, NamingScope};

/// Shared generation state
#[derive(Debug, Default)]
pub struct ModuleScope {
    config: ScopeConfig,
    cache: TypeCache,
    naming: NamingScope,
}

impl ModuleScope {
    /// Scope with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope with the given configuration
    pub fn with_config(config: ScopeConfig) -> Self {
        Self {
            config,
            cache: TypeCache::new(),
            naming: NamingScope::new(),
        }
    }

    /// Configuration
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Type cache
    pub fn cache(&self) -> &TypeCache {
        &self.cache
    }

    /// Naming scope
    pub fn naming(&self) -> &NamingScope {
        &self.naming
    }

    /// Reserve a unique name for a proxy of `target`:
    /// `{namespace}.{SimpleName}[_{Arg}...]{suffix}`
    pub fn proxy_type_name(&self, target: &TypeDescriptor) -> String {
        let mut simple = target.simple_name().to_string();
        for arg in &target.type_args {
            simple.push('_');
            simple.push_str(&flatten_type_name(&arg.to_string()).replace('.', "_"));
        }
        let base = format!("{}.{}{}", self.config.namespace, simple, self.config.type_suffix);
        self.naming.unique_name(&base)
    }
}
