pub mod consolidate;
pub mod matcher;
pub mod model;

pub use consolidate::validate_consolidation;
pub use matcher::validate_match;
pub use model::{Category, Entity, EntityType, ExistingEntity, Screenshot, ScreenshotData, Session};
