//! Error types for the firerules compilation pipeline.
//!
//! Every fallible operation returns `FireRulesResult<T>`. No error is
//! recoverable: the first one aborts the whole compilation and no partial
//! output is produced.

use thiserror::Error;

/// The unified error type for the firerules crates.
#[derive(Debug, Error)]
pub enum FireRulesError {
    /// An input file could not be read or parsed, or a setting is invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The input document does not conform to the policy model JSON Schema.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// The document is structurally wrong: a required field is missing, a
    /// value has the wrong type, or an enum token is unknown.
    #[error("invalid policy model: {reason}")]
    InvalidModel { reason: String },

    /// A structure rule names a type outside the supported Firestore types.
    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },

    /// The renderer could not assemble the rules text.
    #[error("render failed: {reason}")]
    RenderFailed { reason: String },

    /// The generated rules could not be written to their destination.
    #[error("failed to write rules output: {reason}")]
    OutputWriteFailed { reason: String },
}

/// Convenience alias used throughout the firerules crates.
pub type FireRulesResult<T> = Result<T, FireRulesError>;
