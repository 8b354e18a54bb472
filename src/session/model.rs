use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed set of entity kinds the extraction prompt asks for. Anything the
/// model invents outside this set is downgraded to `Other` rather than
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Hotel,
    Restaurant,
    Job,
    Product,
    Flight,
    Article,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Hotel => "hotel",
            EntityType::Restaurant => "restaurant",
            EntityType::Job => "job",
            EntityType::Product => "product",
            EntityType::Flight => "flight",
            EntityType::Article => "article",
            EntityType::Other => "other",
        }
    }

    pub fn normalize(raw: &str) -> Self {
        match raw {
            "hotel" => EntityType::Hotel,
            "restaurant" => EntityType::Restaurant,
            "job" => EntityType::Job,
            "product" => EntityType::Product,
            "flight" => EntityType::Flight,
            "article" => EntityType::Article,
            "other" => EntityType::Other,
            unknown => {
                log::warn!("unknown entity type '{}', downgrading to 'other'", unknown);
                EntityType::Other
            }
        }
    }
}

/// Session categories the analyze prompt offers the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    TripPlanning,
    Shopping,
    JobSearch,
    Research,
    ContentWriting,
    Productivity,
    Other,
}

impl Category {
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "trip-planning" => Category::TripPlanning,
            "shopping" => Category::Shopping,
            "job-search" => Category::JobSearch,
            "research" => Category::Research,
            "content-writing" => Category::ContentWriting,
            "productivity" => Category::Productivity,
            "other" => Category::Other,
            unknown => {
                log::warn!("unknown category '{}', downgrading to 'other'", unknown);
                Category::Other
            }
        }
    }
}

/// An entity already known in the session, as supplied by the caller with an
/// analyze request. This is what the model compares a fresh extraction
/// against when making its same-entity decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingEntity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// One surviving screenshot's extraction payload, as supplied with a
/// regenerate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotData {
    pub id: String,
    #[serde(default)]
    pub raw_text: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// A real-world object recognized in one or more screenshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub data: Map<String, Value>,
    pub source_screenshot_ids: Vec<String>,
    pub confidence: f64,
}

/// One captured image plus its extraction result. Immutable after creation
/// except for the `deleted` flag; deleted records stay on the session for
/// audit but are excluded from consolidation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: String,
    pub raw_text: String,
    pub extracted_data: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub deleted: bool,
}

/// The reconciliation scope: an ordered run of screenshots and the entities
/// derived from them. Sessions exclusively own their screenshots and
/// entities, and are mutated only through the orchestrator's
/// `pub(crate)` apply functions below.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    screenshots: Vec<Screenshot>,
    entities: Vec<Entity>,
    pub category: Category,
    pub summary: String,
    pub notebook_title: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            screenshots: Vec::new(),
            entities: Vec::new(),
            category: Category::Other,
            summary: String::new(),
            notebook_title: None,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn screenshots(&self) -> &[Screenshot] {
        &self.screenshots
    }

    /// Screenshots still contributing to consolidation.
    pub fn remaining_screenshots(&self) -> impl Iterator<Item = &Screenshot> {
        self.screenshots.iter().filter(|s| !s.deleted)
    }

    pub fn existing_entities(&self) -> Vec<ExistingEntity> {
        self.entities
            .iter()
            .map(|e| ExistingEntity {
                id: e.id.clone(),
                entity_type: e.entity_type.as_str().to_string(),
                data: e.data.clone(),
            })
            .collect()
    }

    /// Mark a screenshot deleted. The record is retained for audit; any
    /// entity left without a surviving source screenshot is removed with it.
    pub fn delete_screenshot(&mut self, screenshot_id: &str) {
        let Some(shot) = self.screenshots.iter_mut().find(|s| s.id == screenshot_id) else {
            return;
        };
        shot.deleted = true;

        for entity in &mut self.entities {
            entity.source_screenshot_ids.retain(|id| id != screenshot_id);
        }
        self.entities.retain(|e| {
            if e.source_screenshot_ids.is_empty() {
                log::info!(
                    "entity '{}' lost its last source screenshot, removing",
                    e.id
                );
                false
            } else {
                true
            }
        });
    }

    pub(crate) fn record_screenshot(&mut self, screenshot: Screenshot) {
        self.screenshots.push(screenshot);
    }

    /// Apply a validated merge decision from an analyze call. Returns the id
    /// of the entity the screenshot was attributed to.
    pub(crate) fn apply_match(
        &mut self,
        screenshot_id: &str,
        entity_type: EntityType,
        data: Map<String, Value>,
        merge_with_id: Option<&str>,
        confidence: f64,
    ) -> String {
        let target_idx =
            merge_with_id.and_then(|id| self.entities.iter().position(|e| e.id == id));
        if let Some(idx) = target_idx {
            let target = &mut self.entities[idx];
            // Newer screenshot values win field-by-field.
            for (key, value) in data {
                target.data.insert(key, value);
            }
            if !target
                .source_screenshot_ids
                .iter()
                .any(|id| id == screenshot_id)
            {
                target.source_screenshot_ids.push(screenshot_id.to_string());
            }
            target.confidence = confidence;
            return target.id.clone();
        }

        let entity = Entity {
            id: uuid::Uuid::new_v4().to_string(),
            entity_type,
            data,
            source_screenshot_ids: vec![screenshot_id.to_string()],
            confidence,
        };
        let id = entity.id.clone();
        self.entities.push(entity);
        id
    }

    /// Replace the entity set with a validated consolidation result. An
    /// existing entity keeps its id (ids are stable, never reused) when the
    /// consolidated record matches its type and shares a source screenshot;
    /// otherwise a fresh id is minted. Each prior entity can hand its id to
    /// at most one consolidated record, so a merged entity that the model
    /// splits back apart yields one carried id and one fresh one.
    pub(crate) fn apply_consolidation(
        &mut self,
        consolidated: Vec<(EntityType, Vec<String>, Map<String, Value>)>,
    ) {
        let mut previous = std::mem::take(&mut self.entities);

        for (entity_type, source_ids, data) in consolidated {
            let carried = previous
                .iter()
                .position(|e| {
                    e.entity_type == entity_type
                        && e.source_screenshot_ids
                            .iter()
                            .any(|id| source_ids.contains(id))
                })
                .map(|idx| previous.remove(idx));

            self.entities.push(Entity {
                id: carried
                    .as_ref()
                    .map(|e| e.id.clone())
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                entity_type,
                data,
                source_screenshot_ids: source_ids,
                confidence: carried.as_ref().map(|e| e.confidence).unwrap_or(1.0),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn shot(id: &str) -> Screenshot {
        Screenshot {
            id: id.to_string(),
            raw_text: String::new(),
            extracted_data: Value::Null,
            created_at: chrono::Utc::now(),
            deleted: false,
        }
    }

    #[test]
    fn unknown_enum_values_downgrade_to_other() {
        assert_eq!(EntityType::normalize("spaceship"), EntityType::Other);
        assert_eq!(Category::normalize("time-travel"), Category::Other);
        assert_eq!(EntityType::normalize("hotel"), EntityType::Hotel);
        assert_eq!(Category::normalize("trip-planning"), Category::TripPlanning);
    }

    #[test]
    fn new_entity_created_when_no_merge_target() {
        let mut session = Session::new("s1");
        session.record_screenshot(shot("shot-1"));

        let id = session.apply_match(
            "shot-1",
            EntityType::Hotel,
            map(json!({"name": "Grand Hotel"})),
            None,
            0.9,
        );

        assert_eq!(session.entities().len(), 1);
        assert_eq!(session.entities()[0].id, id);
        assert_eq!(session.entities()[0].source_screenshot_ids, vec!["shot-1"]);
    }

    #[test]
    fn merge_overwrites_fields_and_appends_source() {
        let mut session = Session::new("s1");
        session.record_screenshot(shot("shot-1"));
        let id = session.apply_match(
            "shot-1",
            EntityType::Hotel,
            map(json!({"name": "Grand Hotel", "price": "$120"})),
            None,
            0.9,
        );

        session.record_screenshot(shot("shot-2"));
        let merged = session.apply_match(
            "shot-2",
            EntityType::Hotel,
            map(json!({"price": "$140", "rating": "4.8"})),
            Some(&id),
            0.8,
        );

        assert_eq!(merged, id);
        let entity = &session.entities()[0];
        assert_eq!(entity.data["name"], "Grand Hotel");
        assert_eq!(entity.data["price"], "$140");
        assert_eq!(entity.data["rating"], "4.8");
        assert_eq!(entity.source_screenshot_ids, vec!["shot-1", "shot-2"]);
        assert_eq!(entity.confidence, 0.8);
    }

    #[test]
    fn deleting_only_source_removes_entity_but_keeps_screenshot_record() {
        let mut session = Session::new("s1");
        session.record_screenshot(shot("shot-1"));
        session.apply_match("shot-1", EntityType::Job, map(json!({})), None, 1.0);

        session.delete_screenshot("shot-1");

        assert!(session.entities().is_empty());
        assert_eq!(session.screenshots().len(), 1);
        assert!(session.screenshots()[0].deleted);
        assert_eq!(session.remaining_screenshots().count(), 0);
    }

    #[test]
    fn consolidation_keeps_ids_for_overlapping_entities() {
        let mut session = Session::new("s1");
        session.record_screenshot(shot("shot-1"));
        let kept_id = session.apply_match(
            "shot-1",
            EntityType::Hotel,
            map(json!({"name": "Grand Hotel"})),
            None,
            0.7,
        );

        session.apply_consolidation(vec![
            (
                EntityType::Hotel,
                vec!["shot-1".to_string()],
                map(json!({"name": "Grand Hotel", "rating": "4.8"})),
            ),
            (
                EntityType::Job,
                vec!["shot-2".to_string()],
                map(json!({"title": "Engineer"})),
            ),
        ]);

        assert_eq!(session.entities().len(), 2);
        assert_eq!(session.entities()[0].id, kept_id);
        assert_eq!(session.entities()[0].confidence, 0.7);
        assert_ne!(session.entities()[1].id, kept_id);
    }

    #[test]
    fn splitting_a_merged_entity_yields_distinct_ids() {
        // Two screenshots merged into one hotel, then consolidation decides
        // they were two different hotels after all. Only one record may
        // carry the original id forward.
        let mut session = Session::new("s1");
        session.record_screenshot(shot("shot-1"));
        let merged_id = session.apply_match(
            "shot-1",
            EntityType::Hotel,
            map(json!({"name": "Grand Hotel"})),
            None,
            0.9,
        );
        session.record_screenshot(shot("shot-2"));
        session.apply_match(
            "shot-2",
            EntityType::Hotel,
            map(json!({"name": "Grand Hotel Berlin"})),
            Some(&merged_id),
            0.8,
        );

        session.apply_consolidation(vec![
            (
                EntityType::Hotel,
                vec!["shot-1".to_string()],
                map(json!({"name": "Grand Hotel"})),
            ),
            (
                EntityType::Hotel,
                vec!["shot-2".to_string()],
                map(json!({"name": "Grand Hotel Berlin"})),
            ),
        ]);

        assert_eq!(session.entities().len(), 2);
        assert_ne!(session.entities()[0].id, session.entities()[1].id);
        assert_eq!(session.entities()[0].id, merged_id);
    }
}
