use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::Utc;
use comfy_table::Table;
use tracing::info_span;

use nst_cli::config::RunConfig;
use nst_cli::pipeline::{
    DeriveRequest, FlattenRequest, SnapshotKind, run_derive as derive_pipeline,
    run_flatten as flatten_pipeline, select_snapshots,
};
use nst_cli::types::{DeriveResult, FlattenResult};
use nst_derive::{
    ACTIVITY_TABLE, DerivationTable, END_VARIABLE, START_VARIABLE, TABLES, table_by_name,
};
use nst_transform::{CLASSIFICATION_PREFIX, TopicKind};

use crate::cli::{DeriveArgs, FlattenArgs};
use crate::summary::apply_table_style;

pub fn run_topics() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Snapshot", "Kind", "Fields"]);
    apply_table_style(&mut table);
    for kind in SnapshotKind::all() {
        let (label, fields) = match kind {
            SnapshotKind::Topic(topic) => {
                let label = match topic.kind() {
                    TopicKind::Detail => "topic",
                    TopicKind::Composite => "composite topic",
                };
                let paths: Vec<&str> = topic.rules().iter().map(|rule| rule.path).collect();
                (label, paths.join("\n"))
            }
            SnapshotKind::Classification => ("classification", "virksomhet".to_string()),
            SnapshotKind::ForestryAccounts => ("forestry", "skogOgToemmerkonto".to_string()),
            SnapshotKind::ForestryFunds => ("forestry", "skogOgToemmerkonto.skogfond".to_string()),
            SnapshotKind::OriginalStructure => ("raw", "hendelse, naeringsspesifikasjon".to_string()),
        };
        table.add_row(vec![kind.prefix().to_string(), label.to_string(), fields]);
    }
    println!("{table}");

    let mut table = Table::new();
    table.set_header(vec!["Derivation", "Reads", "Variables"]);
    apply_table_style(&mut table);
    table.add_row(vec![
        ACTIVITY_TABLE.to_string(),
        CLASSIFICATION_PREFIX.to_string(),
        [START_VARIABLE, END_VARIABLE].len().to_string(),
    ]);
    for derivation in TABLES {
        let sources: Vec<&str> = derivation
            .source_topics
            .iter()
            .map(|topic| topic.file_prefix())
            .collect();
        table.add_row(vec![
            derivation.name.to_string(),
            sources.join(", "),
            derivation.derivations.len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_flatten(args: &FlattenArgs, config: &RunConfig) -> Result<FlattenResult> {
    let span = info_span!("command", name = "flatten");
    let _guard = span.enter();
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let request = FlattenRequest {
        batch: args.batch.clone(),
        output_dir,
        snapshots: select_snapshots(&args.topics)?,
        dry_run: args.dry_run,
        run_timestamp: Utc::now(),
    };
    flatten_pipeline(&request)
}

pub fn run_derive(args: &DeriveArgs, config: &RunConfig) -> Result<DeriveResult> {
    let span = info_span!("command", name = "derive");
    let _guard = span.enter();
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| args.snapshot_dir.clone());
    let (tables, activity) = select_tables(&args.tables)?;
    let request = DeriveRequest {
        snapshot_dir: args.snapshot_dir.clone(),
        classification: args.classification.clone(),
        output_dir,
        label: config.label_or_default(args.label.as_deref()),
        tables,
        activity,
        filter: config.filter_with(&args.entity_types, &args.obligation_types),
    };
    derive_pipeline(&request)
}

/// Amount tables to derive, and whether the `virksomhet` table is wanted.
fn select_tables(names: &[String]) -> Result<(Vec<&'static DerivationTable>, bool)> {
    if names.is_empty() {
        return Ok((TABLES.to_vec(), true));
    }
    let mut tables = Vec::with_capacity(names.len());
    let mut activity = false;
    for name in names {
        if name.eq_ignore_ascii_case(ACTIVITY_TABLE) {
            activity = true;
            continue;
        }
        let Some(table) = table_by_name(name) else {
            bail!("unknown derivation table '{name}' (see `nst topics`)");
        };
        tables.push(table);
    }
    Ok((tables, activity))
}
