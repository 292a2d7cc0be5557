//! Rule-driven flattening of specifications into field records.

use nst_model::{AccountingEvent, FlatField};

use crate::rules::ExtractionRule;

/// Flatten one event with the given rules, in rule order.
///
/// Null and zero amounts are dropped. Events without entity identifier or
/// fiscal year produce nothing.
pub fn flatten_event(event: &AccountingEvent, rules: &[ExtractionRule]) -> Vec<FlatField> {
    let Some(provenance) = event.provenance() else {
        return Vec::new();
    };
    rules
        .iter()
        .flat_map(|rule| rule.extract(&event.specification))
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(field_name, amount)| FlatField::new(&provenance, field_name, amount))
        .collect()
}

/// Flatten every event of a deduplicated set.
pub fn flatten_events(events: &[AccountingEvent], rules: &[ExtractionRule]) -> Vec<FlatField> {
    events
        .iter()
        .flat_map(|event| flatten_event(event, rules))
        .collect()
}
