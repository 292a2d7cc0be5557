//! Tests for RF-1175 derivation.

use chrono::{TimeZone, Utc};
use nst_derive::rf1175::{
    ANNEN_DRIFTSINNTEKT, LANGSIKTIG_GJELD, SALGSINNTEKT, SUM_BALANSEREGNSKAP,
    SUM_RESULTATREGNSKAP,
};
use nst_derive::{
    ACTIVITY_TABLE, CategoryFilter, DeriveError, END_VARIABLE, START_VARIABLE, derive,
    derive_activity,
};
use nst_model::{EntityClassification, FlatField, Provenance};
use polars::prelude::DataType;
use rust_decimal::Decimal;

fn field(entity: &str, year: i32, name: &str, amount: i64) -> FlatField {
    let provenance = Provenance {
        entity_id: entity.to_string(),
        fiscal_year: year,
        registration_timestamp: Utc.with_ymd_and_hms(2024, 4, 18, 10, 0, 0).unwrap(),
        sequence_number: 1,
    };
    FlatField::new(&provenance, name, Decimal::new(amount, 0))
}

fn sole_proprietor(entity: &str, year: i32) -> EntityClassification {
    classified(entity, year, "enkeltpersonforetak", "ingenRegnskapsplikt")
}

fn classified(entity: &str, year: i32, kind: &str, obligation: &str) -> EntityClassification {
    EntityClassification {
        entity_id: entity.to_string(),
        fiscal_year: year,
        entity_type: Some(kind.to_string()),
        obligation_type: Some(obligation.to_string()),
        start: None,
        end: None,
    }
}

fn active(
    entity: &str,
    year: i32,
    kind: &str,
    start: &str,
    end: Option<&str>,
) -> EntityClassification {
    EntityClassification {
        start: Some(start.to_string()),
        end: end.map(str::to_string),
        ..classified(entity, year, kind, "begrensetRegnskapsplikt")
    }
}

#[test]
fn direct_copy_and_aggregation_per_entity() {
    let records = vec![
        field("A", 2023, "3000", 100),
        field("A", 2023, "3000", 50),
        field("A", 2023, "3100", 7),
        field("B", 2023, "3200", 3),
    ];
    let classes = vec![sole_proprietor("A", 2023), sole_proprietor("B", 2023)];
    let table = derive(&SALGSINNTEKT, &records, &classes, &CategoryFilter::default()).unwrap();

    assert_eq!(table.entity_count(), 2);
    assert_eq!(table.value("A", "O_7360"), Some(Decimal::new(150, 0)));
    assert_eq!(table.value("A", "O_7362"), Some(Decimal::new(7, 0)));
    assert_eq!(table.value("A", "O_15843"), Some(Decimal::ZERO));
    assert_eq!(table.value("B", "O_7364"), Some(Decimal::new(3, 0)));
}

#[test]
fn multi_term_sum_combines_codes() {
    let records = vec![
        field("A", 2023, "3910", 40),
        field("A", 2023, "7911", 2),
    ];
    let classes = vec![sole_proprietor("A", 2023)];
    let table = derive(
        &ANNEN_DRIFTSINNTEKT,
        &records,
        &classes,
        &CategoryFilter::default(),
    )
    .unwrap();
    assert_eq!(table.value("A", "O_37279"), Some(Decimal::new(42, 0)));

    let debt = derive(
        &LANGSIKTIG_GJELD,
        &[field("A", 2023, "2280", 1), field("A", 2023, "2289", 2), field("A", 2023, "2290", 4)],
        &classes,
        &CategoryFilter::default(),
    )
    .unwrap();
    assert_eq!(debt.value("A", "O_7487"), Some(Decimal::new(3, 0)));
    assert_eq!(debt.value("A", "O_7327"), Some(Decimal::new(4, 0)));
    assert_eq!(debt.value("A", "O_38947"), Some(Decimal::new(4, 0)));
}

#[test]
fn differences_and_control_totals() {
    let classes = vec![sole_proprietor("A", 2023)];
    let income = derive(
        &SUM_RESULTATREGNSKAP,
        &[
            field("A", 2023, "sumDriftsinntekt", 1000),
            field("A", 2023, "sumDriftskostnad", 300),
        ],
        &classes,
        &CategoryFilter::default(),
    )
    .unwrap();
    assert_eq!(income.value("A", "O_6686"), Some(Decimal::new(700, 0)));
    assert_eq!(income.value("A", "O_15799"), Some(Decimal::new(1000, 0)));

    let balance = derive(
        &SUM_BALANSEREGNSKAP,
        &[
            field("A", 2023, "sumBalanseverdiForEiendel", 500),
            field("A", 2023, "sumGjeldOgEgenkapital", 480),
        ],
        &classes,
        &CategoryFilter::default(),
    )
    .unwrap();
    assert_eq!(balance.value("A", "kontroll"), Some(Decimal::new(20, 0)));
}

#[test]
fn unknown_codes_are_dropped() {
    let records = vec![field("A", 2023, "9999", 5), field("A", 2023, "3000", 1)];
    let table = derive(
        &SALGSINNTEKT,
        &records,
        &[sole_proprietor("A", 2023)],
        &CategoryFilter::default(),
    )
    .unwrap();
    assert_eq!(table.stats.unrecognized, 1);
    assert_eq!(table.stats.used, 1);
    assert_eq!(table.value("A", "O_7360"), Some(Decimal::new(1, 0)));
}

#[test]
fn category_filter_excludes_entities() {
    let records = vec![
        field("A", 2023, "3000", 1),
        field("AS", 2023, "3000", 1),
        field("X", 2023, "3000", 1),
        field("A", 2022, "3000", 1),
    ];
    let classes = vec![
        sole_proprietor("A", 2023),
        classified("AS", 2023, "aksjeselskap", "fullRegnskapsplikt"),
    ];
    let table = derive(&SALGSINNTEKT, &records, &classes, &CategoryFilter::default()).unwrap();
    assert_eq!(table.rows.keys().collect::<Vec<_>>(), vec!["A"]);
    assert_eq!(table.stats.filtered_out, 3);

    let widened = CategoryFilter {
        entity_types: vec!["aksjeselskap".to_string()],
        obligation_types: vec!["fullRegnskapsplikt".to_string()],
    };
    let table = derive(&SALGSINNTEKT, &records, &classes, &widened).unwrap();
    assert_eq!(table.rows.keys().collect::<Vec<_>>(), vec!["AS"]);
}

#[test]
fn frame_has_orgnr_and_variable_columns() {
    let table = derive(
        &SALGSINNTEKT,
        &[field("A", 2023, "3000", 10)],
        &[sole_proprietor("A", 2023)],
        &CategoryFilter::default(),
    )
    .unwrap();
    let df = table.to_frame().unwrap();
    assert_eq!(df.height(), 1);
    assert_eq!(df.width(), 5);
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["orgnr", "O_7360", "O_7362", "O_7364", "O_15843"]);
}

#[test]
fn no_matching_rows_gives_empty_table() {
    let table = derive(&SALGSINNTEKT, &[], &[], &CategoryFilter::default()).unwrap();
    assert_eq!(table.entity_count(), 0);
    assert_eq!(table.to_frame().unwrap().height(), 0);
}

#[test]
fn overflowing_sum_is_an_error() {
    let mut huge = field("A", 2023, "3000", 0);
    huge.amount = Decimal::MAX;
    let records = vec![huge.clone(), huge];
    let error = derive(
        &SALGSINNTEKT,
        &records,
        &[sole_proprietor("A", 2023)],
        &CategoryFilter::default(),
    )
    .unwrap_err();
    assert!(matches!(
        error,
        DeriveError::Overflow {
            table: "salgsinntekt",
            variable: "O_7360"
        }
    ));
    assert_eq!(error.to_string(), "salgsinntekt.O_7360: amount overflow");
}

#[test]
fn overflowing_difference_is_an_error() {
    let mut cost = field("A", 2023, "sumDriftskostnad", 0);
    cost.amount = Decimal::MAX;
    let records = vec![field("A", 2023, "sumDriftsinntekt", -1), cost];
    let error = derive(
        &SUM_RESULTATREGNSKAP,
        &records,
        &[sole_proprietor("A", 2023)],
        &CategoryFilter::default(),
    )
    .unwrap_err();
    assert!(matches!(error, DeriveError::Overflow { .. }));
}

#[test]
fn activity_copies_start_and_end_for_allowed_entities() {
    let classes = vec![
        active("B", 2023, "samvirkeforetak", "2021-03-01", None),
        active("A", 2023, "enkeltpersonforetak", "2019-01-01", Some("2023-06-30")),
        active("AS", 2023, "aksjeselskap", "2015-01-01", None),
        classified("C", 2023, "enkeltpersonforetak", "fullRegnskapsplikt"),
    ];
    let table = derive_activity(&classes, &CategoryFilter::default());

    assert_eq!(table.stats.input, 4);
    assert_eq!(table.stats.filtered_out, 2);
    assert_eq!(table.stats.used, 2);
    assert_eq!(table.entity_count(), 2);
    assert_eq!(table.rows[0].entity_id, "A");
    assert_eq!(table.rows[0].start.as_deref(), Some("2019-01-01"));
    assert_eq!(table.rows[0].end.as_deref(), Some("2023-06-30"));
    assert_eq!(table.rows[1].entity_id, "B");
    assert_eq!(table.rows[1].end, None);
}

#[test]
fn activity_frame_has_text_columns() {
    let classes = vec![active("A", 2023, "enkeltpersonforetak", "2019-01-01", None)];
    let table = derive_activity(&classes, &CategoryFilter::default());
    assert_eq!(ACTIVITY_TABLE, "virksomhet");
    assert_eq!(table.variables(), [START_VARIABLE, END_VARIABLE]);

    let df = table.to_frame().unwrap();
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    assert_eq!(names, vec!["orgnr", "O_15805", "O_15806"]);
    for name in &names {
        assert_eq!(df.column(name).unwrap().dtype(), &DataType::String);
    }
    let start = df.column("O_15805").unwrap().str().unwrap().get(0);
    assert_eq!(start, Some("2019-01-01"));
    assert_eq!(df.column("O_15806").unwrap().null_count(), 1);
}
