//! Error types for entry encoding and encoder configuration.

use thiserror::Error;

/// Errors reported by nested marshaling and reflected encoding.
///
/// Scalar writes never fail: the destination is an in-memory growable
/// buffer, so codec write errors are discarded on those paths.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A `Serialize` implementation failed while encoding a reflected value
    #[error("reflected value could not be encoded: {0}")]
    Reflect(#[from] rmp_serde::encode::Error),

    /// A caller-supplied object or array marshaler reported a failure
    #[error("{0}")]
    Marshal(String),

    /// Any other error raised from inside a marshaler
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EncodeError {
    /// Convenience constructor for marshaler failures
    pub fn marshal(msg: impl Into<String>) -> Self {
        EncodeError::Marshal(msg.into())
    }
}

/// Errors raised while loading [`EncoderSettings`](crate::config::EncoderSettings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid encoder settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type alias for encoding operations
pub type Result<T> = std::result::Result<T, EncodeError>;
