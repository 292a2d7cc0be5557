//! Legal-entity and accounting-obligation filter.

use nst_model::EntityClassification;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENTITY_TYPES: [&str; 3] = [
    "enkeltpersonforetak",
    "selskapMedDeltakerfastsetting",
    "samvirkeforetak",
];

pub const DEFAULT_OBLIGATION_TYPES: [&str; 2] = ["ingenRegnskapsplikt", "begrensetRegnskapsplikt"];

/// Which classified entities a derivation includes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFilter {
    pub entity_types: Vec<String>,
    pub obligation_types: Vec<String>,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            entity_types: DEFAULT_ENTITY_TYPES.map(str::to_string).to_vec(),
            obligation_types: DEFAULT_OBLIGATION_TYPES.map(str::to_string).to_vec(),
        }
    }
}

impl CategoryFilter {
    /// Both categories must be present and listed.
    pub fn allows(&self, classification: &EntityClassification) -> bool {
        let listed = |wanted: &[String], value: Option<&str>| {
            value.is_some_and(|value| wanted.iter().any(|w| w == value))
        };
        listed(&self.entity_types, classification.entity_type.as_deref())
            && listed(
                &self.obligation_types,
                classification.obligation_type.as_deref(),
            )
    }
}
