//! Snapshot frames.
//!
//! [`SnapshotFrame`] wraps a Polars DataFrame with the file prefix it is
//! written under. The builders below turn flattened records into frames
//! with the snapshot column layout.

use nst_model::columns;
use nst_model::{AccountingEvent, EntityClassification, FlatField, ForestryField, ForestryOrigin};
use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Snapshot prefix for the decoded batch with its raw payloads.
pub const ORIGINAL_STRUCTURE_PREFIX: &str = "opprinnelig-struktur";

/// A snapshot ready to be written.
#[derive(Debug, Clone)]
pub struct SnapshotFrame {
    /// File name prefix, e.g. `driftsinntekt`.
    pub prefix: String,
    pub data: DataFrame,
}

impl SnapshotFrame {
    pub fn new(prefix: impl Into<String>, data: DataFrame) -> Self {
        Self {
            prefix: prefix.into(),
            data,
        }
    }

    /// Returns the number of records in the frame.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }
}

/// Exact amounts are stored as Float64 in the snapshots.
pub fn amount_to_f64(amount: Decimal) -> Option<f64> {
    amount.to_f64()
}

fn datetime_column(name: &str, micros: Vec<i64>) -> PolarsResult<Column> {
    let series = Series::new(name.into(), micros)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    Ok(series.into())
}

/// Frame with the stage-1 field layout.
pub fn flat_fields_frame(records: &[FlatField]) -> PolarsResult<DataFrame> {
    let entity: Vec<&str> = records.iter().map(|r| r.entity_id.as_str()).collect();
    let year: Vec<i32> = records.iter().map(|r| r.fiscal_year).collect();
    let field: Vec<&str> = records.iter().map(|r| r.field_name.as_str()).collect();
    let amount: Vec<Option<f64>> = records.iter().map(|r| amount_to_f64(r.amount)).collect();
    let registered: Vec<i64> = records
        .iter()
        .map(|r| r.registration_timestamp.timestamp_micros())
        .collect();
    let sequence: Vec<i64> = records.iter().map(|r| r.sequence_number).collect();

    DataFrame::new(vec![
        Series::new(columns::ENTITY_ID.into(), entity).into(),
        Series::new(columns::FISCAL_YEAR.into(), year).into(),
        Series::new(columns::FIELD_NAME.into(), field).into(),
        Series::new(columns::AMOUNT.into(), amount).into(),
        datetime_column(columns::REGISTRATION_TIMESTAMP, registered)?,
        Series::new(columns::SEQUENCE_NUMBER.into(), sequence).into(),
    ])
}

/// Frame for forestry accounts or funds.
///
/// Fund records get account, fund and municipality columns; account
/// records get account and operating unit columns.
pub fn forestry_frame(records: &[ForestryField], funds: bool) -> PolarsResult<DataFrame> {
    let mut account_ids: Vec<Option<&str>> = Vec::with_capacity(records.len());
    let mut second: Vec<Option<&str>> = Vec::with_capacity(records.len());
    let mut municipalities: Vec<Option<&str>> = Vec::with_capacity(records.len());
    for record in records {
        match &record.origin {
            ForestryOrigin::Account {
                account_id,
                operating_unit,
            } => {
                account_ids.push(account_id.as_deref());
                second.push(operating_unit.as_deref());
                municipalities.push(None);
            }
            ForestryOrigin::Fund {
                account_id,
                fund_id,
                municipality,
            } => {
                account_ids.push(account_id.as_deref());
                second.push(fund_id.as_deref());
                municipalities.push(municipality.as_deref());
            }
        }
    }

    let mut cols: Vec<Column> = vec![
        Series::new(
            columns::ENTITY_ID.into(),
            records.iter().map(|r| r.entity_id.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            columns::FISCAL_YEAR.into(),
            records.iter().map(|r| r.fiscal_year).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(columns::ACCOUNT_ID.into(), account_ids).into(),
    ];
    if funds {
        cols.push(Series::new(columns::FUND_ID.into(), second).into());
        cols.push(Series::new(columns::MUNICIPALITY.into(), municipalities).into());
    } else {
        cols.push(Series::new(columns::OPERATING_UNIT.into(), second).into());
    }
    cols.push(
        Series::new(
            columns::FIELD_NAME.into(),
            records
                .iter()
                .map(|r| r.field_name.as_str())
                .collect::<Vec<_>>(),
        )
        .into(),
    );
    cols.push(
        Series::new(
            columns::AMOUNT.into(),
            records
                .iter()
                .map(|r| amount_to_f64(r.amount))
                .collect::<Vec<_>>(),
        )
        .into(),
    );
    cols.push(datetime_column(
        columns::REGISTRATION_TIMESTAMP,
        records
            .iter()
            .map(|r| r.registration_timestamp.timestamp_micros())
            .collect(),
    )?);
    cols.push(
        Series::new(
            columns::SEQUENCE_NUMBER.into(),
            records.iter().map(|r| r.sequence_number).collect::<Vec<_>>(),
        )
        .into(),
    );
    DataFrame::new(cols)
}

/// Frame of entity classifications.
pub fn classification_frame(records: &[EntityClassification]) -> PolarsResult<DataFrame> {
    fn text<'a>(
        records: &'a [EntityClassification],
        pick: impl Fn(&'a EntityClassification) -> Option<&'a str>,
    ) -> Vec<Option<&'a str>> {
        records.iter().map(pick).collect()
    }

    DataFrame::new(vec![
        Series::new(
            columns::ENTITY_ID.into(),
            records.iter().map(|r| r.entity_id.as_str()).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            columns::FISCAL_YEAR.into(),
            records.iter().map(|r| r.fiscal_year).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            columns::ENTITY_TYPE.into(),
            text(records, |r| r.entity_type.as_deref()),
        )
        .into(),
        Series::new(
            columns::OBLIGATION_TYPE.into(),
            text(records, |r| r.obligation_type.as_deref()),
        )
        .into(),
        Series::new(columns::START.into(), text(records, |r| r.start.as_deref())).into(),
        Series::new(columns::END.into(), text(records, |r| r.end.as_deref())).into(),
    ])
}

/// Frame of every decoded event with its raw JSON payloads.
///
/// Events decoded without raw payloads get the re-serialized specification
/// and a null header.
pub fn original_structure_frame(events: &[AccountingEvent]) -> PolarsResult<DataFrame> {
    let mut headers: Vec<Option<&str>> = Vec::with_capacity(events.len());
    let mut bodies: Vec<Option<String>> = Vec::with_capacity(events.len());
    for event in events {
        match &event.raw {
            Some(raw) => {
                headers.push(Some(raw.header.as_str()));
                bodies.push(Some(raw.specification.clone()));
            }
            None => {
                headers.push(None);
                bodies.push(serde_json::to_string(&event.specification).ok());
            }
        }
    }

    DataFrame::new(vec![
        Series::new(
            columns::POSITION.into(),
            events
                .iter()
                .map(|e| u64::try_from(e.position).unwrap_or(u64::MAX))
                .collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            columns::ENTITY_ID.into(),
            events
                .iter()
                .map(|e| e.entity_id.as_deref())
                .collect::<Vec<_>>(),
        )
        .into(),
        Series::new(
            columns::FISCAL_YEAR.into(),
            events.iter().map(|e| e.fiscal_year).collect::<Vec<_>>(),
        )
        .into(),
        datetime_column(
            columns::REGISTRATION_TIMESTAMP,
            events
                .iter()
                .map(|e| e.registration_timestamp.timestamp_micros())
                .collect(),
        )?,
        Series::new(
            columns::SEQUENCE_NUMBER.into(),
            events.iter().map(|e| e.sequence_number).collect::<Vec<_>>(),
        )
        .into(),
        Series::new(columns::RAW_HEADER.into(), headers).into(),
        Series::new(columns::RAW_SPECIFICATION.into(), bodies).into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nst_model::Provenance;

    #[test]
    fn flat_frame_has_snapshot_layout() {
        let provenance = Provenance {
            entity_id: "1".to_string(),
            fiscal_year: 2023,
            registration_timestamp: Utc.with_ymd_and_hms(2024, 4, 18, 10, 35, 24).unwrap(),
            sequence_number: 3,
        };
        let records = vec![
            FlatField::new(&provenance, "3000", Decimal::new(10005, 1)),
            FlatField::new(&provenance, "sumDriftsinntekt", Decimal::new(10005, 1)),
        ];
        let df = flat_fields_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "norskIdentifikator",
                "inntektsaar",
                "felt",
                "beloep",
                "registreringstidspunkt",
                "sekvensnummer"
            ]
        );
        assert_eq!(
            df.column("registreringstidspunkt").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        let amount = df.column("beloep").unwrap().f64().unwrap().get(0);
        assert_eq!(amount, Some(1000.5));
    }

    #[test]
    fn empty_records_build_empty_frame() {
        let df = flat_fields_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 6);
    }
}
