use std::path::PathBuf;

use chrono::{DateTime, Utc};
use nst_derive::DeriveStats;
use nst_transform::DedupeStats;

#[derive(Debug)]
pub struct FlattenResult {
    pub batch: PathBuf,
    pub output_dir: PathBuf,
    pub run_timestamp: DateTime<Utc>,
    pub events_decoded: usize,
    pub dedupe: DedupeStats,
    pub snapshots: Vec<SnapshotSummary>,
    pub dry_run: bool,
}

impl FlattenResult {
    pub fn total_records(&self) -> usize {
        self.snapshots.iter().map(|s| s.records).sum()
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub prefix: String,
    pub records: usize,
    /// None on dry runs.
    pub path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct DeriveResult {
    pub output_dir: PathBuf,
    pub classification: PathBuf,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone)]
pub struct TableSummary {
    pub name: &'static str,
    pub variables: usize,
    pub entities: usize,
    pub stats: DeriveStats,
    pub path: Option<PathBuf>,
    /// Source snapshots that were not found.
    pub missing_sources: Vec<&'static str>,
}

impl TableSummary {
    pub fn is_skipped(&self) -> bool {
        !self.missing_sources.is_empty()
    }
}
