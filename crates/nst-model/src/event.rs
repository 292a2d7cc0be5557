use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::specification::Naeringsspesifikasjon;

/// Grouping key for deduplication: (entity identifier, fiscal year).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventKey {
    pub entity_id: String,
    pub fiscal_year: i32,
}

/// Raw JSON payloads exactly as they arrived in the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    pub header: String,
    pub specification: String,
}

/// One decoded accounting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountingEvent {
    pub entity_id: Option<String>,
    pub fiscal_year: Option<i32>,
    pub registration_timestamp: DateTime<Utc>,
    /// Monotonic per submission, not globally unique.
    pub sequence_number: i64,
    /// Zero-based position in the source batch.
    pub position: usize,
    pub specification: Naeringsspesifikasjon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawPayload>,
}

impl AccountingEvent {
    /// Build an event, taking the key fields from the specification body.
    pub fn new(
        specification: Naeringsspesifikasjon,
        registration_timestamp: DateTime<Utc>,
        sequence_number: i64,
        position: usize,
    ) -> Self {
        Self {
            entity_id: specification.norsk_identifikator.clone(),
            fiscal_year: specification.inntektsaar,
            registration_timestamp,
            sequence_number,
            position,
            specification,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: RawPayload) -> Self {
        self.raw = Some(raw);
        self
    }

    /// `None` when either key component is missing.
    pub fn key(&self) -> Option<EventKey> {
        let entity_id = self.entity_id.as_ref()?;
        Some(EventKey {
            entity_id: entity_id.clone(),
            fiscal_year: self.fiscal_year?,
        })
    }

    /// Provenance columns shared by every record derived from this event.
    pub fn provenance(&self) -> Option<Provenance> {
        let key = self.key()?;
        Some(Provenance {
            entity_id: key.entity_id,
            fiscal_year: key.fiscal_year,
            registration_timestamp: self.registration_timestamp,
            sequence_number: self.sequence_number,
        })
    }
}

/// Identifying columns carried onto every flattened record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub entity_id: String,
    pub fiscal_year: i32,
    pub registration_timestamp: DateTime<Utc>,
    pub sequence_number: i64,
}
