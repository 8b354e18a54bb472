//! Sequencing of the three operations against the model capability.
//!
//! Each operation is one blocking call to the model, then parse → validate →
//! (match | consolidate). Any failure past input validation — missing
//! credential, transport error, unparsable text, schema violation — is
//! absorbed into the operation's fixed fallback object so the capture
//! pipeline upstream never has to special-case an AI outage. Absorbed
//! failures are logged with the operation and session id.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::ai::{ImagePart, ModelCapability};
use crate::error::CoreError;
use crate::parse::parse_model_json;
use crate::prompts;
use crate::schema::{
    self, ConsolidatedEntity, MergeAnalysis, SessionSummary, SimpleAnalysis,
};
use crate::session::{matcher, ExistingEntity, Screenshot, ScreenshotData, Session};

/// The two analyze response families. Which one a request gets is decided by
/// the request itself: callers that supply session context (a non-empty
/// `existingEntities`) get the merge-decision shape, callers that do not get
/// the flat shape. They are distinct calling styles, not one schema.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalyzeResponse {
    Simple(SimpleAnalysis),
    Merge(MergeAnalysis),
}

pub struct Orchestrator {
    capability: Arc<dyn ModelCapability>,
}

impl Orchestrator {
    pub fn new(capability: Arc<dyn ModelCapability>) -> Self {
        Self { capability }
    }

    pub fn capability_configured(&self) -> bool {
        self.capability.is_configured()
    }

    /// Analyze one screenshot. Never fails: downstream problems produce the
    /// family's fixed fallback.
    pub async fn analyze(
        &self,
        image: ImagePart,
        session_id: &str,
        existing: &[ExistingEntity],
    ) -> AnalyzeResponse {
        if existing.is_empty() {
            match self.try_simple_analyze(&image).await {
                Ok(analysis) => AnalyzeResponse::Simple(analysis),
                Err(e) => {
                    log::error!("analyze failed for session '{}': {}", session_id, e);
                    AnalyzeResponse::Simple(SimpleAnalysis::fallback())
                }
            }
        } else {
            match self.try_session_analyze(&image, existing).await {
                Ok(analysis) => AnalyzeResponse::Merge(analysis),
                Err(e) => {
                    log::error!("analyze failed for session '{}': {}", session_id, e);
                    AnalyzeResponse::Merge(MergeAnalysis::fallback())
                }
            }
        }
    }

    async fn try_simple_analyze(&self, image: &ImagePart) -> Result<SimpleAnalysis, CoreError> {
        let prompt = prompts::simple_analyze_prompt();
        let text = self.capability.generate(&prompt, Some(image)).await?;
        schema::validate_simple_analysis(&parse_model_json(&text)?)
    }

    async fn try_session_analyze(
        &self,
        image: &ImagePart,
        existing: &[ExistingEntity],
    ) -> Result<MergeAnalysis, CoreError> {
        let prompt = prompts::session_analyze_prompt(existing);
        let text = self.capability.generate(&prompt, Some(image)).await?;
        let mut analysis = schema::validate_merge_analysis(&parse_model_json(&text)?)?;
        analysis.entity = matcher::validate_match(analysis.entity, existing);
        Ok(analysis)
    }

    /// Re-consolidate a session after deletions. Only the surviving
    /// screenshots go to the model; the result is acceptance-tested so no
    /// consolidated entity references anything outside the surviving set.
    /// Fallback is an empty consolidation.
    pub async fn regenerate(
        &self,
        session_id: &str,
        deleted_ids: &[String],
        remaining: &[ScreenshotData],
        previous_summary: Option<&str>,
    ) -> Vec<ConsolidatedEntity> {
        match self
            .try_regenerate(deleted_ids, remaining, previous_summary)
            .await
        {
            Ok(entities) => entities,
            Err(e) => {
                log::error!("regenerate failed for session '{}': {}", session_id, e);
                Vec::new()
            }
        }
    }

    async fn try_regenerate(
        &self,
        deleted_ids: &[String],
        remaining: &[ScreenshotData],
        previous_summary: Option<&str>,
    ) -> Result<Vec<ConsolidatedEntity>, CoreError> {
        let prompt = prompts::regenerate_prompt(remaining, deleted_ids, previous_summary);
        let text = self.capability.generate(&prompt, None).await?;
        let entities = schema::validate_consolidation_payload(&parse_model_json(&text)?)?;

        let remaining_ids: HashSet<String> = remaining.iter().map(|s| s.id.clone()).collect();
        Ok(crate::session::validate_consolidation(
            entities,
            &remaining_ids,
        ))
    }

    /// Summarize a whole session. Fallback is the fixed empty-shaped summary.
    pub async fn summarize(
        &self,
        session_id: &str,
        session_name: &str,
        entities: &[Value],
    ) -> SessionSummary {
        match self.try_summarize(session_name, entities).await {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("summarize failed for session '{}': {}", session_id, e);
                SessionSummary::fallback()
            }
        }
    }

    async fn try_summarize(
        &self,
        session_name: &str,
        entities: &[Value],
    ) -> Result<SessionSummary, CoreError> {
        let prompt = prompts::summarize_prompt(session_name, entities);
        let text = self.capability.generate(&prompt, None).await?;
        schema::validate_session_summary(&parse_model_json(&text)?)
    }

    /// Session-level analyze: records the screenshot on the session and
    /// applies the validated merge decision. This (together with
    /// [`Orchestrator::reconsolidate`] and `Session::delete_screenshot`) is
    /// the only write path a session has. Returns the new screenshot's id.
    pub async fn analyze_into(&self, session: &mut Session, image: ImagePart) -> String {
        let existing = session.existing_entities();
        let screenshot_id = uuid::Uuid::new_v4().to_string();

        match self.try_session_analyze(&image, &existing).await {
            Ok(analysis) => {
                let extracted = serde_json::to_value(&analysis).unwrap_or(Value::Null);
                session.record_screenshot(Screenshot {
                    id: screenshot_id.clone(),
                    raw_text: analysis.raw_text,
                    extracted_data: extracted,
                    created_at: chrono::Utc::now(),
                    deleted: false,
                });
                session.apply_match(
                    &screenshot_id,
                    analysis.entity.entity_type,
                    analysis.entity.data,
                    analysis.entity.merge_with_id.as_deref(),
                    analysis.entity.confidence,
                );
            }
            Err(e) => {
                log::error!("analyze failed for session '{}': {}", session.id, e);
                // The capture is still recorded; it just contributes no
                // entity until a later regenerate picks it up.
                session.record_screenshot(Screenshot {
                    id: screenshot_id.clone(),
                    raw_text: String::new(),
                    extracted_data: Value::Null,
                    created_at: chrono::Utc::now(),
                    deleted: false,
                });
            }
        }

        screenshot_id
    }

    /// Session-level regenerate: re-runs consolidation over the surviving
    /// screenshots and replaces the session's entity set with the validated
    /// result.
    pub async fn reconsolidate(&self, session: &mut Session) {
        let remaining: Vec<ScreenshotData> = session
            .remaining_screenshots()
            .map(|s| ScreenshotData {
                id: s.id.clone(),
                raw_text: s.raw_text.clone(),
                data: s.extracted_data.as_object().cloned().unwrap_or_default(),
            })
            .collect();
        let deleted_ids: Vec<String> = session
            .screenshots()
            .iter()
            .filter(|s| s.deleted)
            .map(|s| s.id.clone())
            .collect();
        let previous_summary = if session.summary.is_empty() {
            None
        } else {
            Some(session.summary.clone())
        };

        let consolidated = self
            .regenerate(
                &session.id.clone(),
                &deleted_ids,
                &remaining,
                previous_summary.as_deref(),
            )
            .await;

        session.apply_consolidation(
            consolidated
                .into_iter()
                .map(|c| (c.entity_type, c.source_screenshot_ids, c.data))
                .collect(),
        );
    }
}
