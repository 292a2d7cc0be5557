//! Entity classification snapshot.

use nst_model::{AccountingEvent, EntityClassification};

/// Snapshot prefix for entity classifications.
pub const CLASSIFICATION_PREFIX: &str = "virksomhet";

/// Classification of every deduplicated event that carries one.
pub fn classify_events(events: &[AccountingEvent]) -> Vec<EntityClassification> {
    events
        .iter()
        .filter_map(EntityClassification::from_event)
        .collect()
}
