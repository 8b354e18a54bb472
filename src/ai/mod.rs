pub mod gemini;

use async_trait::async_trait;

use crate::error::CoreError;

/// A decoded image handed to the model alongside a prompt.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImagePart {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime_type: "image/png".to_string(),
            data,
        }
    }
}

/// The external model, reduced to the one thing this service needs from it:
/// submit a prompt (plus an optional image) and get text back.
///
/// The orchestrator is written against this trait so tests can swap in a
/// deterministic stub for the live Gemini client.
#[async_trait]
pub trait ModelCapability: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String, CoreError>;

    /// Whether a credential is present. Reported by the health endpoint;
    /// `generate` on an unconfigured capability fails with
    /// [`CoreError::CapabilityUnavailable`].
    fn is_configured(&self) -> bool;
}
