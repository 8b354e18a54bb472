//! Validation of the model's same-entity decision.
//!
//! The matching itself is delegated to the extraction call: the model sees
//! the session's existing entities and emits its own `isNew` /
//! `mergeWithId` verdict. The local job is reference integrity — the service
//! must never hand the caller a merge target that does not exist.

use crate::schema::MergeDecision;
use crate::session::ExistingEntity;

/// Check the model's merge decision against the entities the caller actually
/// supplied. A `mergeWithId` that references nothing is dropped and the
/// decision downgraded to "new entity"; confidence is left as the model
/// reported it. A claimed duplicate with no target id gets the same
/// treatment.
pub fn validate_match(mut decision: MergeDecision, existing: &[ExistingEntity]) -> MergeDecision {
    if let Some(target) = decision.merge_with_id.as_deref() {
        if !existing.iter().any(|e| e.id == target) {
            log::warn!(
                "merge target '{}' not found among {} existing entities, treating as new",
                target,
                existing.len()
            );
            decision.merge_with_id = None;
            decision.is_new = true;
        }
    }

    if !decision.is_new && decision.merge_with_id.is_none() {
        log::warn!("duplicate claimed without a merge target, treating as new");
        decision.is_new = true;
    }

    decision
}
