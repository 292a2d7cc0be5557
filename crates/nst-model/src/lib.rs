pub mod columns;
pub mod de;
pub mod error;
pub mod event;
pub mod record;
pub mod specification;

pub use error::{NstError, Result};
pub use event::{AccountingEvent, EventKey, Provenance, RawPayload};
pub use record::{EntityClassification, FlatField, ForestryField, ForestryOrigin};
pub use specification::{
    Naeringsspesifikasjon, Post, SkogOgToemmerkonto, Skogfond, Virksomhet, json_decimal,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[test]
    fn event_key_requires_both_components() {
        let ts = Utc.with_ymd_and_hms(2024, 4, 18, 10, 35, 24).unwrap();
        let mut spec = Naeringsspesifikasjon {
            norsk_identifikator: Some("12345678901".to_string()),
            inntektsaar: None,
            ..Default::default()
        };
        let event = AccountingEvent::new(spec.clone(), ts, 1, 0);
        assert!(event.key().is_none());

        spec.inntektsaar = Some(2023);
        let event = AccountingEvent::new(spec, ts, 1, 0);
        assert_eq!(
            event.key(),
            Some(EventKey {
                entity_id: "12345678901".to_string(),
                fiscal_year: 2023,
            })
        );
    }

    #[test]
    fn flat_field_copies_provenance() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let provenance = Provenance {
            entity_id: "999".to_string(),
            fiscal_year: 2022,
            registration_timestamp: ts,
            sequence_number: 7,
        };
        let field = FlatField::new(&provenance, "3000", Decimal::new(10005, 1));
        assert_eq!(field.triple(), ("999", 2022, "3000"));
        assert_eq!(field.amount.to_string(), "1000.5");
        assert_eq!(field.sequence_number, 7);
    }

    #[test]
    fn classification_needs_virksomhet() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let spec = Naeringsspesifikasjon::from_json(
            r#"{"norskIdentifikator":"1","inntektsaar":2023,
                "virksomhet":{"virksomhetstype":"enkeltpersonforetak",
                              "regnskapspliktstype":"ingenRegnskapsplikt"}}"#,
        )
        .unwrap();
        let event = AccountingEvent::new(spec, ts, 1, 0);
        let classification = EntityClassification::from_event(&event).unwrap();
        assert_eq!(
            classification.entity_type.as_deref(),
            Some("enkeltpersonforetak")
        );
        assert_eq!(
            classification.obligation_type.as_deref(),
            Some("ingenRegnskapsplikt")
        );
        assert!(classification.end.is_none());
    }
}
