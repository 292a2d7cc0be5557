//! Flat output records produced by the flattening stage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::event::{AccountingEvent, Provenance};

/// One (entity, year, field, amount) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatField {
    pub entity_id: String,
    pub fiscal_year: i32,
    /// Raw type code such as `"3000"` or a synthetic label such as
    /// `"sumDriftsinntekt"`.
    pub field_name: String,
    pub amount: Decimal,
    pub registration_timestamp: DateTime<Utc>,
    pub sequence_number: i64,
}

impl FlatField {
    pub fn new(provenance: &Provenance, field_name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            entity_id: provenance.entity_id.clone(),
            fiscal_year: provenance.fiscal_year,
            field_name: field_name.into(),
            amount,
            registration_timestamp: provenance.registration_timestamp,
            sequence_number: provenance.sequence_number,
        }
    }

    /// The (entity, year, field) triple.
    pub fn triple(&self) -> (&str, i32, &str) {
        (&self.entity_id, self.fiscal_year, &self.field_name)
    }
}

/// Where a forestry amount came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ForestryOrigin {
    Account {
        account_id: Option<String>,
        operating_unit: Option<String>,
    },
    Fund {
        account_id: Option<String>,
        fund_id: Option<String>,
        municipality: Option<String>,
    },
}

/// One unpivoted forestry amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestryField {
    pub entity_id: String,
    pub fiscal_year: i32,
    pub origin: ForestryOrigin,
    pub field_name: String,
    pub amount: Decimal,
    pub registration_timestamp: DateTime<Utc>,
    pub sequence_number: i64,
}

/// Entity classification for one (entity, year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityClassification {
    pub entity_id: String,
    pub fiscal_year: i32,
    pub entity_type: Option<String>,
    pub obligation_type: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl EntityClassification {
    /// Classification of an event; `None` when keys or `virksomhet` are missing.
    pub fn from_event(event: &AccountingEvent) -> Option<Self> {
        let key = event.key()?;
        let virksomhet = event.specification.virksomhet.as_ref()?;
        Some(Self {
            entity_id: key.entity_id,
            fiscal_year: key.fiscal_year,
            entity_type: virksomhet.virksomhetstype.clone(),
            obligation_type: virksomhet.regnskapspliktstype.clone(),
            start: virksomhet.start.clone(),
            end: virksomhet.slutt.clone(),
        })
    }
}
