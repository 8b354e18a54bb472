use thiserror::Error;

/// Failure taxonomy for the analysis core.
///
/// Only the input-validation variants (`MissingField`, `InvalidField`) are
/// ever surfaced to a client. Everything else is a downstream failure that
/// the orchestrator absorbs into the operation's fallback response.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("invalid value for field '{0}': {1}")]
    InvalidField(String, String),

    #[error("model capability not configured")]
    CapabilityUnavailable,

    #[error("model request failed: {0}")]
    ModelRequest(String),

    #[error("model response is not valid JSON: {0}")]
    MalformedResponse(String),

    #[error("model response failed schema validation: {0}")]
    SchemaViolation(String),
}
