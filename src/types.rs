//! Crate-wide error type and result alias.

/// Errors surfaced by the engine outside the submission pipeline's
/// user-correctable validation path.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No schema registered under the requested module id. Registry
    /// misconfiguration, fatal to the page that asked.
    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    /// A field key was used that the active schema does not define.
    /// Programmer error, fatal.
    #[error("unknown field '{field}' in schema '{schema}'")]
    UnknownField { schema: String, field: String },

    /// A schema definition failed load-time validation.
    #[error("invalid schema '{schema}': {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// Backend rejected the request (4xx/5xx). `detail` carries the
    /// backend's own message when the body had one.
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// Transport-level failure (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response arrived but did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    /// Startup configuration problem.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
