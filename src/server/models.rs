//! Request parsing with field-level validation.
//!
//! Requests are taken as raw JSON and checked field by field so a 400 can
//! name exactly what was missing or malformed, rather than surfacing a
//! generic deserialization error.

use base64::Engine;
use serde::Serialize;
use serde_json::Value;

use crate::ai::ImagePart;
use crate::error::CoreError;
use crate::schema::ConsolidatedEntity;
use crate::session::{ExistingEntity, ScreenshotData};

#[derive(Debug)]
pub struct AnalyzeRequest {
    pub image: ImagePart,
    pub session_id: String,
    pub existing_entities: Vec<ExistingEntity>,
}

impl AnalyzeRequest {
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let obj = require_object(value)?;

        let image_raw = obj
            .get("image")
            .ok_or_else(|| CoreError::MissingField("image".to_string()))?
            .as_str()
            .ok_or_else(|| {
                CoreError::InvalidField("image".to_string(), "expected a base64 string".to_string())
            })?;
        let image = decode_image(image_raw)?;

        let session_id = obj
            .get("sessionId")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let existing_entities = match obj.get("existingEntities") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                CoreError::InvalidField("existingEntities".to_string(), e.to_string())
            })?,
        };

        Ok(Self {
            image,
            session_id,
            existing_entities,
        })
    }
}

#[derive(Debug)]
pub struct RegenerateRequest {
    pub session_id: String,
    pub deleted_ids: Vec<String>,
    pub remaining_screenshots: Vec<ScreenshotData>,
    pub previous_summary: Option<String>,
}

impl RegenerateRequest {
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let obj = require_object(value)?;

        let session_id = obj
            .get("sessionId")
            .ok_or_else(|| CoreError::MissingField("sessionId".to_string()))?
            .as_str()
            .ok_or_else(|| {
                CoreError::InvalidField("sessionId".to_string(), "expected a string".to_string())
            })?
            .to_string();

        let remaining_screenshots = obj
            .get("remainingScreenshots")
            .ok_or_else(|| CoreError::MissingField("remainingScreenshots".to_string()))
            .and_then(|v| {
                serde_json::from_value(v.clone()).map_err(|e| {
                    CoreError::InvalidField("remainingScreenshots".to_string(), e.to_string())
                })
            })?;

        let deleted_ids = match obj.get("deletedIds") {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| CoreError::InvalidField("deletedIds".to_string(), e.to_string()))?,
        };

        let previous_summary = obj
            .get("previousSummary")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            session_id,
            deleted_ids,
            remaining_screenshots,
            previous_summary,
        })
    }
}

#[derive(Debug)]
pub struct SummarizeRequest {
    pub session_id: String,
    pub session_name: String,
    pub entities: Vec<Value>,
}

impl SummarizeRequest {
    pub fn from_value(value: &Value) -> Result<Self, CoreError> {
        let obj = require_object(value)?;

        let session_id = required_string(obj, "sessionId")?;
        let session_name = required_string(obj, "sessionName")?;
        let entities = obj
            .get("entities")
            .ok_or_else(|| CoreError::MissingField("entities".to_string()))?
            .as_array()
            .ok_or_else(|| {
                CoreError::InvalidField("entities".to_string(), "expected an array".to_string())
            })?
            .clone();

        Ok(Self {
            session_id,
            session_name,
            entities,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub summary: Vec<ConsolidatedEntity>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub capability_configured: bool,
}

fn require_object(value: &Value) -> Result<&serde_json::Map<String, Value>, CoreError> {
    value.as_object().ok_or_else(|| {
        CoreError::InvalidField("body".to_string(), "expected a JSON object".to_string())
    })
}

fn required_string(obj: &serde_json::Map<String, Value>, field: &str) -> Result<String, CoreError> {
    obj.get(field)
        .ok_or_else(|| CoreError::MissingField(field.to_string()))?
        .as_str()
        .ok_or_else(|| CoreError::InvalidField(field.to_string(), "expected a string".to_string()))
        .map(str::to_string)
}

/// Decode a base64 image, tolerating a `data:` URL prefix.
fn decode_image(raw: &str) -> Result<ImagePart, CoreError> {
    let payload = if raw.starts_with("data:") {
        raw.splitn(2, ',').nth(1).ok_or_else(|| {
            CoreError::InvalidField("image".to_string(), "malformed data URL".to_string())
        })?
    } else {
        raw
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| {
            CoreError::InvalidField("image".to_string(), "invalid base64 image data".to_string())
        })?;

    Ok(ImagePart::png(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analyze_request_requires_image() {
        let err = AnalyzeRequest::from_value(&json!({"sessionId": "s1"})).unwrap_err();
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "image"));
    }

    #[test]
    fn analyze_request_rejects_bad_base64() {
        let err = AnalyzeRequest::from_value(&json!({"image": "not base64!!!"})).unwrap_err();
        assert!(matches!(err, CoreError::InvalidField(ref f, _) if f == "image"));
    }

    #[test]
    fn analyze_request_strips_data_url_prefix() {
        let body = json!({"image": "data:image/png;base64,aGVsbG8=", "sessionId": "s1"});
        let req = AnalyzeRequest::from_value(&body).unwrap();
        assert_eq!(req.image.data, b"hello");
        assert_eq!(req.session_id, "s1");
        assert!(req.existing_entities.is_empty());
    }

    #[test]
    fn analyze_request_parses_existing_entities() {
        let body = json!({
            "image": "aGVsbG8=",
            "sessionId": "s1",
            "existingEntities": [{"id": "e1", "type": "hotel", "data": {"name": "Grand"}}]
        });
        let req = AnalyzeRequest::from_value(&body).unwrap();
        assert_eq!(req.existing_entities.len(), 1);
        assert_eq!(req.existing_entities[0].id, "e1");
    }

    #[test]
    fn regenerate_request_requires_session_id_and_screenshots() {
        let err = RegenerateRequest::from_value(&json!({"deletedIds": []})).unwrap_err();
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "sessionId"));

        let err =
            RegenerateRequest::from_value(&json!({"sessionId": "s1"})).unwrap_err();
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "remainingScreenshots"));
    }

    #[test]
    fn regenerate_request_defaults_deleted_ids() {
        let body = json!({
            "sessionId": "s1",
            "remainingScreenshots": [{"id": "shot-1", "rawText": "", "data": {}}]
        });
        let req = RegenerateRequest::from_value(&body).unwrap();
        assert!(req.deleted_ids.is_empty());
        assert_eq!(req.remaining_screenshots.len(), 1);
    }

    #[test]
    fn summarize_request_requires_all_fields() {
        let err = SummarizeRequest::from_value(&json!({"sessionId": "s1"})).unwrap_err();
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "sessionName"));

        let err = SummarizeRequest::from_value(
            &json!({"sessionId": "s1", "sessionName": "Paris"}),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::MissingField(ref f) if f == "entities"));
    }
}
