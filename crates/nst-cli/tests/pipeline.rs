//! Integration tests for the flatten and derive pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use apache_avro::{Schema, Writer};
use chrono::{DateTime, TimeZone, Utc};

use nst_cli::pipeline::{
    DeriveRequest, FlattenRequest, SnapshotKind, run_derive, run_flatten, select_snapshots,
};
use nst_derive::{CategoryFilter, TABLES};
use nst_ingest::{ENVELOPE_SCHEMA, Envelope};
use nst_output::{any_to_f64, any_to_string, read_snapshot};
use nst_transform::{CLASSIFICATION_PREFIX, Topic};

fn run_at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

fn event(entity: &str, timestamp: &str, entity_type: &str, sales: &str) -> Envelope {
    Envelope::new(
        format!(r#"{{"registreringstidspunkt":"{timestamp}","sekvensnummer":1}}"#),
        format!(
            r#"{{"norskIdentifikator":"{entity}","inntektsaar":2023,
                "virksomhet":{{"virksomhetstype":"{entity_type}",
                               "regnskapspliktstype":"ingenRegnskapsplikt",
                               "start":"2020-01-01","slutt":null}},
                "resultatregnskap":{{
                    "driftsinntekt":{{
                        "salgsinntekt":{{"inntekt":[{{"type":"3000","beloep":{sales}}}]}},
                        "sumDriftsinntekt":{sales}}}}},
                "balanseregnskap":{{"sumBalanseverdiForEiendel":null}}}}"#
        ),
    )
}

fn write_batch(dir: &Path, envelopes: &[Envelope]) -> PathBuf {
    let schema = Schema::parse_str(ENVELOPE_SCHEMA).unwrap();
    let mut writer = Writer::new(&schema, Vec::new());
    for envelope in envelopes {
        writer.append_ser(envelope).unwrap();
    }
    let path = dir.join("batch.avro");
    fs::write(&path, writer.into_inner().unwrap()).unwrap();
    path
}

fn sample_batch(dir: &Path) -> PathBuf {
    write_batch(
        dir,
        &[
            event("111", "2024-04-18T10:35:24.6Z", "enkeltpersonforetak", "1000"),
            event("111", "2024-04-19T08:00:00Z", "enkeltpersonforetak", "2000"),
            event("222", "2024-04-18T09:00:00Z", "aksjeselskap", "500"),
        ],
    )
}

fn flatten_request(batch: PathBuf, output_dir: &Path, topics: &[&str]) -> FlattenRequest {
    let topics: Vec<String> = topics.iter().map(|t| (*t).to_string()).collect();
    FlattenRequest {
        batch,
        output_dir: output_dir.to_path_buf(),
        snapshots: select_snapshots(&topics).unwrap(),
        dry_run: false,
        run_timestamp: run_at(8),
    }
}

fn derive_request(snapshot_dir: &Path, output_dir: &Path) -> DeriveRequest {
    DeriveRequest {
        snapshot_dir: snapshot_dir.to_path_buf(),
        classification: None,
        output_dir: output_dir.to_path_buf(),
        label: "2023_1".to_string(),
        tables: TABLES.to_vec(),
        activity: true,
        filter: CategoryFilter::default(),
    }
}

#[test]
fn empty_selection_means_every_snapshot() {
    let all = select_snapshots(&[]).unwrap();
    assert_eq!(all.len(), Topic::ALL.len() + 4);
    assert_eq!(all.last(), Some(&SnapshotKind::OriginalStructure));
}

#[test]
fn selection_follows_run_order() {
    let picked = select_snapshots(&[
        "virksomhet".to_string(),
        "Driftsinntekt".to_string(),
    ])
    .unwrap();
    assert_eq!(
        picked,
        vec![
            SnapshotKind::Topic(Topic::Driftsinntekt),
            SnapshotKind::Classification
        ]
    );
}

#[test]
fn unknown_topic_is_rejected() {
    let error = select_snapshots(&["driftsinntekter".to_string()]).unwrap_err();
    assert!(error.to_string().contains("driftsinntekter"));
}

#[test]
fn flatten_writes_one_file_per_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch(dir.path());
    let out = dir.path().join("out");

    let result = run_flatten(&flatten_request(batch, &out, &[])).unwrap();

    assert_eq!(result.events_decoded, 3);
    assert_eq!(result.dedupe.output, 2);
    assert_eq!(result.dedupe.duplicates_dropped, 1);
    assert_eq!(result.snapshots.len(), SnapshotKind::all().len());
    for summary in &result.snapshots {
        let path = summary.path.as_ref().unwrap();
        assert!(path.exists(), "{} missing", path.display());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("-2024-05-01_08-00-00.parquet")
        );
    }

    let sales = result
        .snapshots
        .iter()
        .find(|s| s.prefix == "driftsinntekt")
        .unwrap();
    // One 3000 line per entity; sums live in sum_resultatregnskap.
    assert_eq!(sales.records, 2);

    let sums = result
        .snapshots
        .iter()
        .find(|s| s.prefix == "sum_resultatregnskap")
        .unwrap();
    assert_eq!(sums.records, 2);

    let original = result.snapshots.last().unwrap();
    assert_eq!(original.prefix, "opprinnelig-struktur");
    assert_eq!(original.records, 3);

    let balance = result
        .snapshots
        .iter()
        .find(|s| s.prefix == "sum-balanseverdi-for-eiendel")
        .unwrap();
    assert_eq!(balance.records, 0);
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch(dir.path());
    let out = dir.path().join("out");
    let mut request = flatten_request(batch, &out, &["driftsinntekt"]);
    request.dry_run = true;

    let result = run_flatten(&request).unwrap();

    assert_eq!(result.snapshots.len(), 1);
    assert_eq!(result.snapshots[0].records, 2);
    assert!(result.snapshots[0].path.is_none());
    assert!(!out.exists());
}

#[test]
fn empty_batch_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let batch = write_batch(dir.path(), &[]);
    let out = dir.path().join("out");

    let result = run_flatten(&flatten_request(batch, &out, &[])).unwrap();

    assert_eq!(result.events_decoded, 0);
    assert!(result.snapshots.is_empty());
    assert!(!out.exists());
}

#[test]
fn missing_batch_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let error = run_flatten(&flatten_request(
        dir.path().join("absent.avro"),
        dir.path(),
        &[],
    ))
    .unwrap_err();
    assert!(format!("{error:#}").contains("absent.avro"));
}

#[test]
fn derive_reads_latest_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch(dir.path());
    let snapshots = dir.path().join("snapshots");
    run_flatten(&flatten_request(batch, &snapshots, &[])).unwrap();

    let result = run_derive(&derive_request(&snapshots, dir.path())).unwrap();

    assert_eq!(result.tables.len(), TABLES.len() + 1);
    assert!(result.tables.iter().all(|t| !t.is_skipped()));

    let mut written: Vec<String> = fs::read_dir(dir.path().join("RF1175_2023_1"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    insta::assert_snapshot!(written.join("\n"), @r"
    Egenkapital.parquet
    KortsiktigGjeld.parquet
    LangsiktigGjeld.parquet
    annenDriftsinntekt.parquet
    annenDriftskostnad.parquet
    balanseverdiForAnleggsmiddel.parquet
    balanseverdiForOmloepsmiddel.parquet
    finansinntekt.parquet
    finanskostnad.parquet
    loennskostnad.parquet
    salgsinntekt.parquet
    sum_balanseregnskap.parquet
    sum_resultatregnskap.parquet
    varekostnad.parquet
    virksomhet.parquet
    ");

    let activity = result
        .tables
        .iter()
        .find(|t| t.name == "virksomhet")
        .unwrap();
    assert_eq!(activity.entities, 1);
    assert_eq!(activity.stats.filtered_out, 1);
    let df = read_snapshot(activity.path.as_ref().unwrap()).unwrap();
    let start = df.column("O_15805").unwrap().get(0).unwrap();
    assert_eq!(any_to_string(start), "2020-01-01");
    assert!(
        result
            .classification
            .to_string_lossy()
            .contains(CLASSIFICATION_PREFIX)
    );

    let sales = result
        .tables
        .iter()
        .find(|t| t.name == "salgsinntekt")
        .unwrap();
    // The aksjeselskap is outside the default filter.
    assert_eq!(sales.entities, 1);
    assert_eq!(sales.stats.used, 1);

    let path = sales.path.as_ref().unwrap();
    assert!(path.starts_with(dir.path().join("RF1175_2023_1")));
    let df = read_snapshot(path).unwrap();
    assert_eq!(df.height(), 1);
    let orgnr = df.column("orgnr").unwrap().get(0).unwrap();
    assert_eq!(any_to_string(orgnr), "111");
    let value = df.column("O_7360").unwrap().get(0).unwrap();
    assert_eq!(any_to_f64(value), Some(2000.0));
}

#[test]
fn derive_skips_tables_without_source_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch(dir.path());
    let snapshots = dir.path().join("snapshots");
    run_flatten(&flatten_request(
        batch,
        &snapshots,
        &["driftsinntekt", "virksomhet"],
    ))
    .unwrap();

    let result = run_derive(&derive_request(&snapshots, dir.path())).unwrap();

    let sales = result
        .tables
        .iter()
        .find(|t| t.name == "salgsinntekt")
        .unwrap();
    assert!(sales.path.is_some());

    let annen = result
        .tables
        .iter()
        .find(|t| t.name == "annenDriftsinntekt")
        .unwrap();
    assert_eq!(annen.missing_sources, vec!["driftskostnad"]);
    assert!(annen.path.is_none());
}

#[test]
fn derive_without_classification_fails() {
    let dir = tempfile::tempdir().unwrap();
    let batch = sample_batch(dir.path());
    let snapshots = dir.path().join("snapshots");
    run_flatten(&flatten_request(batch, &snapshots, &["driftsinntekt"])).unwrap();

    let error = run_derive(&derive_request(&snapshots, dir.path())).unwrap_err();
    assert!(error.to_string().contains(CLASSIFICATION_PREFIX));
}
