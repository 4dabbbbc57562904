//! Module scope configuration
//!
//! Controls how generated proxy types are named. Can be built in code or
//! loaded from JSON:
//!
//! ```json
//! { "namespace": "App.Proxies", "type_suffix": "Proxy" }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Settings for a [`ModuleScope`](crate::generation::ModuleScope)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Namespace prefixed to every generated type name
    pub namespace: String,

    /// Suffix appended to the target's simple name
    pub type_suffix: String,
}

impl ScopeConfig {
    /// Default namespace for generated types
    pub const DEFAULT_NAMESPACE: &'static str = "Interpose.Proxies";

    /// Default suffix for generated types
    pub const DEFAULT_TYPE_SUFFIX: &'static str = "Proxy";

    /// Parse configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ScopeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the type suffix
    pub fn with_type_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.type_suffix = suffix.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.split('.').any(|part| part.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "namespace",
                reason: format!("'{}' contains an empty segment", self.namespace),
            });
        }
        if self.type_suffix.contains('.') {
            return Err(ConfigError::InvalidValue {
                field: "type_suffix",
                reason: "must not contain '.'".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            namespace: Self::DEFAULT_NAMESPACE.to_string(),
            type_suffix: Self::DEFAULT_TYPE_SUFFIX.to_string(),
        }
    }
}
