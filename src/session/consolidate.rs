//! Post-condition enforcement for consolidation output.
//!
//! The merge itself (including the prefer-most-recent field policy) is done
//! by the model from the regenerate prompt. Locally we only accept or repair
//! the result: no consolidated entity may reference a screenshot that is not
//! part of the surviving set.

use std::collections::HashSet;

use crate::schema::ConsolidatedEntity;

/// Strip references to screenshots outside `remaining_ids` and drop any
/// entity left without a source. The returned list is safe to hand back to
/// the caller: every `sourceScreenshotIds` entry is a surviving screenshot.
pub fn validate_consolidation(
    entities: Vec<ConsolidatedEntity>,
    remaining_ids: &HashSet<String>,
) -> Vec<ConsolidatedEntity> {
    entities
        .into_iter()
        .filter_map(|mut entity| {
            let before = entity.source_screenshot_ids.len();
            entity
                .source_screenshot_ids
                .retain(|id| remaining_ids.contains(id));

            let stripped = before - entity.source_screenshot_ids.len();
            if stripped > 0 {
                log::warn!(
                    "stripped {} stale screenshot reference(s) from a consolidated {:?} entity",
                    stripped,
                    entity.entity_type
                );
            }

            if entity.source_screenshot_ids.is_empty() {
                log::warn!(
                    "consolidated {:?} entity has no surviving sources, dropping",
                    entity.entity_type
                );
                None
            } else {
                Some(entity)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EntityType;
    use serde_json::Map;

    fn entity(entity_type: EntityType, sources: &[&str]) -> ConsolidatedEntity {
        ConsolidatedEntity {
            entity_type,
            source_screenshot_ids: sources.iter().map(|s| s.to_string()).collect(),
            data: Map::new(),
        }
    }

    fn ids(values: &[&str]) -> HashSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn passes_through_valid_references() {
        let result = validate_consolidation(
            vec![entity(EntityType::Hotel, &["shot-1", "shot-2"])],
            &ids(&["shot-1", "shot-2", "shot-3"]),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source_screenshot_ids, vec!["shot-1", "shot-2"]);
    }

    #[test]
    fn strips_deleted_references() {
        let result = validate_consolidation(
            vec![entity(EntityType::Hotel, &["shot-1", "shot-2"])],
            &ids(&["shot-1"]),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].source_screenshot_ids, vec!["shot-1"]);
    }

    #[test]
    fn drops_entity_sourced_only_from_deleted_screenshots() {
        let result = validate_consolidation(
            vec![
                entity(EntityType::Hotel, &["shot-2"]),
                entity(EntityType::Job, &["shot-1"]),
            ],
            &ids(&["shot-1"]),
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].entity_type, EntityType::Job);
    }

    #[test]
    fn unknown_references_are_also_stripped() {
        // Not only deleted ids: anything outside the surviving set goes.
        let result = validate_consolidation(
            vec![entity(EntityType::Article, &["shot-1", "never-existed"])],
            &ids(&["shot-1"]),
        );
        assert_eq!(result[0].source_screenshot_ids, vec!["shot-1"]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(validate_consolidation(Vec::new(), &ids(&["shot-1"])).is_empty());
    }
}
