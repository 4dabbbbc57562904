//! Type model errors

use thiserror::Error;

/// Errors raised while manipulating descriptors (closing generics, mapping members)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    /// Wrong number of generic arguments supplied
    #[error("Invalid type argument count for {name}: expected {expected}, got {actual}")]
    InvalidTypeArgCount {
        /// Type or method being closed
        name: String,
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// Attempted to close something that is not a generic definition
    #[error("{name} is not a generic definition")]
    NotGenericDefinition {
        /// Type or method name
        name: String,
    },

    /// A type argument still refers to unbound generic parameters
    #[error("Type argument {argument} for {name} is not a closed type")]
    OpenTypeArgument {
        /// Type or method being closed
        name: String,
        /// Offending argument
        argument: String,
    },
}
