use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ImagePart, ModelCapability};
use crate::config::AppConfig;
use crate::error::CoreError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini client over the Google AI REST API.
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ModelCapability for GeminiClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str, image: Option<&ImagePart>) -> Result<String, CoreError> {
        if self.api_key.is_empty() {
            return Err(CoreError::CapabilityUnavailable);
        }

        let mut parts = vec![GeminiPart {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];
        if let Some(img) = image {
            parts.push(GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type: img.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&img.data),
                }),
            });
        }

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
        };

        let url = format!(
            "{}/{}:generateContent?key={}",
            BASE_URL, self.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::ModelRequest(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::ModelRequest(format!(
                "Gemini API error ({}): {}",
                status, body
            )));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| CoreError::ModelRequest(format!("Failed to parse Gemini response: {}", e)))?;

        body.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.clone())
            .ok_or_else(|| CoreError::ModelRequest("no content in Gemini response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}
