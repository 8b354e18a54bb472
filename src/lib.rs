//! Relay screenshot-analysis API.
//!
//! Takes screenshots captured during a user session, asks Gemini for OCR and
//! structured-entity extraction, and reconciles the results across the
//! session: duplicate entities are merged, consolidation is recomputed after
//! deletions, and a model hiccup degrades to a fixed fallback body instead
//! of an error.

pub mod ai;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod schema;
pub mod server;
pub mod session;

pub use config::AppConfig;
pub use error::CoreError;
pub use orchestrator::Orchestrator;
