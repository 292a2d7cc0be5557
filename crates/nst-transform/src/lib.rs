//! Næringsspesifikasjon transformation.
//!
//! - **dedupe**: latest event per entity and fiscal year
//! - **rules**: the declarative extraction rule table
//! - **flatten**: rule-driven flattening into field records
//! - **topics**: topic catalogue and projection
//! - **forestry**: forestry account and fund unpivot
//! - **classification**: entity classification snapshot
//! - **frame**: snapshot DataFrame builders

pub mod classification;
pub mod dedupe;
pub mod flatten;
pub mod forestry;
pub mod frame;
pub mod rules;
pub mod topics;

pub use classification::{CLASSIFICATION_PREFIX, classify_events};
pub use dedupe::{DedupeStats, latest_per_entity_year, latest_per_entity_year_with_stats};
pub use flatten::{flatten_event, flatten_events};
pub use forestry::{
    ACCOUNTS_PREFIX, FUNDS_PREFIX, flatten_forestry_accounts, flatten_forestry_funds,
};
pub use frame::{
    ORIGINAL_STRUCTURE_PREFIX, SnapshotFrame, amount_to_f64, classification_frame,
    flat_fields_frame, forestry_frame, original_structure_frame,
};
pub use rules::{ExtractionRule, RULES, RuleKey, Source};
pub use topics::{Topic, TopicKind, project};
