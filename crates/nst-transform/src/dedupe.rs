//! Latest-event-wins deduplication.
//!
//! Within a batch several events may exist for the same entity and fiscal
//! year. Only the one with the newest registration timestamp is kept; when
//! timestamps tie, the event that appears first in the batch wins.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use nst_model::{AccountingEvent, EventKey};
use tracing::debug;

/// Counters describing one deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupeStats {
    pub input: usize,
    /// Events without entity identifier or fiscal year.
    pub missing_keys: usize,
    /// Older events replaced by a newer one for the same key.
    pub duplicates_dropped: usize,
    pub output: usize,
}

/// Keep the latest event per (entity, fiscal year), ordered by key.
pub fn latest_per_entity_year(events: Vec<AccountingEvent>) -> Vec<AccountingEvent> {
    latest_per_entity_year_with_stats(events).0
}

/// As [`latest_per_entity_year`], also returning counters.
pub fn latest_per_entity_year_with_stats(
    events: Vec<AccountingEvent>,
) -> (Vec<AccountingEvent>, DedupeStats) {
    let mut stats = DedupeStats {
        input: events.len(),
        ..DedupeStats::default()
    };
    let mut latest: BTreeMap<EventKey, AccountingEvent> = BTreeMap::new();

    for event in events {
        let Some(key) = event.key() else {
            stats.missing_keys += 1;
            debug!(
                position = event.position,
                "skipping event without entity identifier or fiscal year"
            );
            continue;
        };
        match latest.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                stats.duplicates_dropped += 1;
                if supersedes(&event, slot.get()) {
                    slot.insert(event);
                }
            }
        }
    }

    let kept: Vec<AccountingEvent> = latest.into_values().collect();
    stats.output = kept.len();
    (kept, stats)
}

fn supersedes(candidate: &AccountingEvent, current: &AccountingEvent) -> bool {
    match candidate
        .registration_timestamp
        .cmp(&current.registration_timestamp)
    {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => candidate.position < current.position,
        std::cmp::Ordering::Less => false,
    }
}
