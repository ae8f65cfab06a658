//! Error types for pressroom-core.

use thiserror::Error;

/// Errors reading or writing the manifest document.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The stored manifest is not valid manifest JSON.
    #[error("failed to parse manifest: {0}")]
    Parse(#[source] serde_json::Error),

    /// Serialization failed (write path).
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Configuration problems. Always raised before any I/O happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was not provided (or was empty).
    #[error("missing required setting {name}")]
    Missing { name: &'static str },

    /// A setting was provided but cannot be used.
    #[error("invalid value for {name} ('{value}'): {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
