use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.0-flash".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment. Read once at startup; the
    /// resulting value is immutable for the life of the process.
    ///
    /// A missing `GEMINI_API_KEY` is not an error: the server still starts,
    /// reports `capabilityConfigured: false` from the health endpoint, and
    /// serves fallback bodies from the analysis endpoints.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.gemini_api_key = key;
            }
        }
        if let Ok(model) = std::env::var("RELAY_MODEL") {
            if !model.is_empty() {
                config.gemini_model = model;
            }
        }
        if let Ok(addr) = std::env::var("RELAY_BIND_ADDR") {
            if !addr.is_empty() {
                config.bind_addr = addr;
            }
        }

        config
    }
}
