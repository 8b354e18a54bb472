//! Shape validation for parsed model output.
//!
//! Each operation has a fixed required-field set. Missing fields and wrong
//! types are reported as `SchemaViolation` naming the offending fields;
//! unknown extra fields are ignored so newer model output stays compatible.
//! Values outside the closed `category` / entity `type` sets are normalized
//! to `other` (with a logged downgrade) instead of failing the request.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::session::{Category, EntityType};

/// Analyze response for the simple calling style: no session context in,
/// flat entity array out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleAnalysis {
    pub raw_text: String,
    pub summary: String,
    pub category: Category,
    pub entities: Vec<SimpleEntity>,
    pub suggested_notebook_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimpleEntity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub title: String,
    pub attributes: Map<String, Value>,
}

impl SimpleAnalysis {
    /// Fixed fallback for the simple family. Held constant so callers can
    /// rely on the exact shape during model outages.
    pub fn fallback() -> Self {
        Self {
            raw_text: String::new(),
            summary: String::new(),
            category: Category::Other,
            entities: Vec::new(),
            suggested_notebook_title: None,
        }
    }
}

/// Analyze response for the session-aware calling style: one entity plus the
/// model's same-entity decision against the supplied session context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeAnalysis {
    pub raw_text: String,
    pub entity: MergeDecision,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDecision {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub is_new: bool,
    pub merge_with_id: Option<String>,
    pub confidence: f64,
    pub data: Map<String, Value>,
}

impl MergeAnalysis {
    /// Fixed fallback for the merge family.
    pub fn fallback() -> Self {
        Self {
            raw_text: String::new(),
            entity: MergeDecision {
                entity_type: EntityType::Other,
                is_new: true,
                merge_with_id: None,
                confidence: 0.0,
                data: Map::new(),
            },
        }
    }
}

/// One consolidated entity from a regenerate call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedEntity {
    pub entity_type: EntityType,
    pub source_screenshot_ids: Vec<String>,
    pub data: Map<String, Value>,
}

/// Whole-session summary from a summarize call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub condensed_summary: String,
    pub key_highlights: Vec<String>,
    pub recommendations: Vec<String>,
    pub merged_entities: Vec<Value>,
    pub suggested_title: String,
    pub suggested_queries: Vec<String>,
    pub keywords: Vec<String>,
}

impl SessionSummary {
    pub fn fallback() -> Self {
        Self {
            condensed_summary: String::new(),
            key_highlights: Vec::new(),
            recommendations: Vec::new(),
            merged_entities: Vec::new(),
            suggested_title: String::new(),
            suggested_queries: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

pub fn validate_simple_analysis(value: &Value) -> Result<SimpleAnalysis, CoreError> {
    let obj = as_object(value)?;
    require_fields(
        obj,
        &[
            "rawText",
            "summary",
            "category",
            "entities",
            "suggestedNotebookTitle",
        ],
    )?;

    let entities = array_field(obj, "entities")?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let entity = item.as_object().ok_or_else(|| {
                CoreError::SchemaViolation(format!("entities[{}] is not an object", i))
            })?;
            Ok(SimpleEntity {
                entity_type: EntityType::normalize(string_field(entity, "type").unwrap_or("other")),
                title: string_field(entity, "title").unwrap_or_default().to_string(),
                attributes: object_field(entity, "attributes"),
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    Ok(SimpleAnalysis {
        raw_text: required_string(obj, "rawText")?,
        summary: required_string(obj, "summary")?,
        category: Category::normalize(&required_string(obj, "category")?),
        entities,
        suggested_notebook_title: optional_string(obj, "suggestedNotebookTitle"),
    })
}

pub fn validate_merge_analysis(value: &Value) -> Result<MergeAnalysis, CoreError> {
    let obj = as_object(value)?;
    require_fields(obj, &["rawText", "entity"])?;

    let entity = obj
        .get("entity")
        .and_then(Value::as_object)
        .ok_or_else(|| CoreError::SchemaViolation("field 'entity' is not an object".to_string()))?;
    require_fields(entity, &["type", "isNew", "confidence"])?;

    let is_new = entity
        .get("isNew")
        .and_then(Value::as_bool)
        .ok_or_else(|| CoreError::SchemaViolation("field 'isNew' is not a boolean".to_string()))?;

    let confidence = entity
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            CoreError::SchemaViolation("field 'confidence' is not a number".to_string())
        })?;
    let confidence = if (0.0..=1.0).contains(&confidence) {
        confidence
    } else {
        log::warn!("confidence {} out of range, clamping", confidence);
        confidence.clamp(0.0, 1.0)
    };

    Ok(MergeAnalysis {
        raw_text: required_string(obj, "rawText")?,
        entity: MergeDecision {
            entity_type: EntityType::normalize(&required_string(entity, "type")?),
            is_new,
            merge_with_id: optional_string(entity, "mergeWithId"),
            confidence,
            data: object_field(entity, "data"),
        },
    })
}

/// Regenerate output is a bare array of consolidated entities.
pub fn validate_consolidation_payload(value: &Value) -> Result<Vec<ConsolidatedEntity>, CoreError> {
    let items = value.as_array().ok_or_else(|| {
        CoreError::SchemaViolation("consolidation response is not an array".to_string())
    })?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let entity = item.as_object().ok_or_else(|| {
                CoreError::SchemaViolation(format!("summary[{}] is not an object", i))
            })?;
            require_fields(entity, &["entityType", "sourceScreenshotIds"])?;

            let source_ids = array_field(entity, "sourceScreenshotIds")?
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();

            Ok(ConsolidatedEntity {
                entity_type: EntityType::normalize(&required_string(entity, "entityType")?),
                source_screenshot_ids: source_ids,
                data: object_field(entity, "data"),
            })
        })
        .collect()
}

pub fn validate_session_summary(value: &Value) -> Result<SessionSummary, CoreError> {
    let obj = as_object(value)?;
    require_fields(
        obj,
        &[
            "condensedSummary",
            "keyHighlights",
            "recommendations",
            "mergedEntities",
            "suggestedTitle",
            "suggestedQueries",
            "keywords",
        ],
    )?;

    Ok(SessionSummary {
        condensed_summary: required_string(obj, "condensedSummary")?,
        key_highlights: string_array(obj, "keyHighlights")?,
        recommendations: string_array(obj, "recommendations")?,
        merged_entities: array_field(obj, "mergedEntities")?.clone(),
        suggested_title: optional_string(obj, "suggestedTitle").unwrap_or_default(),
        suggested_queries: string_array(obj, "suggestedQueries")?,
        keywords: string_array(obj, "keywords")?,
    })
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, CoreError> {
    value
        .as_object()
        .ok_or_else(|| CoreError::SchemaViolation("response is not a JSON object".to_string()))
}

fn require_fields(obj: &Map<String, Value>, fields: &[&str]) -> Result<(), CoreError> {
    let missing: Vec<&str> = fields
        .iter()
        .copied()
        .filter(|f| !obj.contains_key(*f))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::SchemaViolation(format!(
            "missing fields: {}",
            missing.join(", ")
        )))
    }
}

fn string_field<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    obj.get(field).and_then(Value::as_str)
}

fn required_string(obj: &Map<String, Value>, field: &str) -> Result<String, CoreError> {
    string_field(obj, field)
        .map(str::to_string)
        .ok_or_else(|| CoreError::SchemaViolation(format!("field '{}' is not a string", field)))
}

/// A string field that may also be null or absent.
fn optional_string(obj: &Map<String, Value>, field: &str) -> Option<String> {
    string_field(obj, field).map(str::to_string)
}

fn array_field<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>, CoreError> {
    obj.get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| CoreError::SchemaViolation(format!("field '{}' is not an array", field)))
}

fn string_array(obj: &Map<String, Value>, field: &str) -> Result<Vec<String>, CoreError> {
    Ok(array_field(obj, field)?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}

/// An object-valued field, tolerating absence or null.
fn object_field(obj: &Map<String, Value>, field: &str) -> Map<String, Value> {
    obj.get(field)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
