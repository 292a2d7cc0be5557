//! Batch processing pipeline with explicit stages.
//!
//! Flattening runs these stages in order:
//! 1. **Ingest**: decode the Avro batch into accounting events
//! 2. **Dedupe**: keep the latest event per entity and fiscal year
//! 3. **Project**: build one snapshot frame per selected topic
//! 4. **Output**: write the frames as timestamped Parquet snapshots
//!
//! Derivation reads the newest snapshots back and writes one RF-1175 table
//! per derivation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info, info_span, trace, warn};

use nst_derive::{ACTIVITY_TABLE, CategoryFilter, DerivationTable, derive, derive_activity};
use nst_ingest::{Batch, read_batch};
use nst_model::{AccountingEvent, FlatField};
use nst_output::{
    DerivationWriter, SnapshotWriter, latest_snapshot, read_classifications, read_flat_fields,
};
use nst_transform::{
    ACCOUNTS_PREFIX, CLASSIFICATION_PREFIX, DedupeStats, FUNDS_PREFIX, ORIGINAL_STRUCTURE_PREFIX,
    SnapshotFrame, Topic, classification_frame, classify_events, flat_fields_frame,
    flatten_forestry_accounts, flatten_forestry_funds, forestry_frame,
    latest_per_entity_year_with_stats, original_structure_frame, project,
};

use crate::logging::redact_value;
use crate::types::{DeriveResult, FlattenResult, SnapshotSummary, TableSummary};

/// One snapshot a flatten run can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Topic(Topic),
    Classification,
    ForestryAccounts,
    ForestryFunds,
    /// Every decoded event before deduplication, with raw payloads.
    OriginalStructure,
}

impl SnapshotKind {
    /// Every snapshot, in run order.
    pub fn all() -> Vec<SnapshotKind> {
        Topic::ALL
            .into_iter()
            .map(SnapshotKind::Topic)
            .chain([
                SnapshotKind::Classification,
                SnapshotKind::ForestryAccounts,
                SnapshotKind::ForestryFunds,
                SnapshotKind::OriginalStructure,
            ])
            .collect()
    }

    pub fn prefix(self) -> &'static str {
        match self {
            SnapshotKind::Topic(topic) => topic.file_prefix(),
            SnapshotKind::Classification => CLASSIFICATION_PREFIX,
            SnapshotKind::ForestryAccounts => ACCOUNTS_PREFIX,
            SnapshotKind::ForestryFunds => FUNDS_PREFIX,
            SnapshotKind::OriginalStructure => ORIGINAL_STRUCTURE_PREFIX,
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        let wanted = prefix.trim();
        Self::all()
            .into_iter()
            .find(|kind| kind.prefix().eq_ignore_ascii_case(wanted))
    }
}

/// Resolve `--topic` values; an empty list selects everything.
///
/// The result follows run order regardless of the order given.
pub fn select_snapshots(prefixes: &[String]) -> Result<Vec<SnapshotKind>> {
    if prefixes.is_empty() {
        return Ok(SnapshotKind::all());
    }
    let mut wanted = Vec::with_capacity(prefixes.len());
    for prefix in prefixes {
        let Some(kind) = SnapshotKind::from_prefix(prefix) else {
            bail!("unknown topic '{prefix}' (see `nst topics`)");
        };
        wanted.push(kind);
    }
    Ok(SnapshotKind::all()
        .into_iter()
        .filter(|kind| wanted.contains(kind))
        .collect())
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Decode the batch file.
pub fn ingest(batch_path: &Path) -> Result<Batch> {
    let span = info_span!("ingest", path = %batch_path.display());
    let _guard = span.enter();
    let batch = read_batch(batch_path)
        .with_context(|| format!("decode batch {}", batch_path.display()))?;
    for event in &batch.events {
        trace!(
            position = event.position,
            entity = redact_value(event.entity_id.as_deref().unwrap_or_default()),
            fiscal_year = event.fiscal_year,
            sequence_number = event.sequence_number,
            "event decoded"
        );
    }
    Ok(batch)
}

// ============================================================================
// Stage 2: Dedupe
// ============================================================================

/// Keep the latest event per entity and fiscal year.
pub fn dedupe(events: Vec<AccountingEvent>) -> (Vec<AccountingEvent>, DedupeStats) {
    let span = info_span!("dedupe");
    let _guard = span.enter();
    let started = Instant::now();
    let (latest, stats) = latest_per_entity_year_with_stats(events);
    info!(
        input = stats.input,
        missing_keys = stats.missing_keys,
        duplicates_dropped = stats.duplicates_dropped,
        output = stats.output,
        duration_ms = started.elapsed().as_millis(),
        "deduplication complete"
    );
    (latest, stats)
}

// ============================================================================
// Stage 3: Project
// ============================================================================

/// Build the frame for one snapshot from the deduplicated events.
///
/// [`SnapshotKind::OriginalStructure`] reads the batch before deduplication
/// and is built by [`original_snapshot`] instead.
pub fn build_snapshot(kind: SnapshotKind, latest: &[AccountingEvent]) -> Result<Option<SnapshotFrame>> {
    let data = match kind {
        SnapshotKind::Topic(topic) => flat_fields_frame(&project(latest, topic)),
        SnapshotKind::Classification => classification_frame(&classify_events(latest)),
        SnapshotKind::ForestryAccounts => {
            forestry_frame(&flatten_forestry_accounts(latest), false)
        }
        SnapshotKind::ForestryFunds => forestry_frame(&flatten_forestry_funds(latest), true),
        SnapshotKind::OriginalStructure => return Ok(None),
    }
    .with_context(|| format!("build {} frame", kind.prefix()))?;
    Ok(Some(SnapshotFrame::new(kind.prefix(), data)))
}

/// Snapshot of every decoded event with its raw payloads.
pub fn original_snapshot(events: &[AccountingEvent]) -> Result<SnapshotFrame> {
    let data = original_structure_frame(events)
        .with_context(|| format!("build {ORIGINAL_STRUCTURE_PREFIX} frame"))?;
    Ok(SnapshotFrame::new(ORIGINAL_STRUCTURE_PREFIX, data))
}

/// Build every selected snapshot except the original structure.
pub fn project_snapshots(
    latest: &[AccountingEvent],
    kinds: &[SnapshotKind],
) -> Result<Vec<SnapshotFrame>> {
    let span = info_span!("project", snapshot_count = kinds.len());
    let _guard = span.enter();
    let started = Instant::now();
    let mut frames = Vec::with_capacity(kinds.len());
    for kind in kinds {
        if let Some(frame) = build_snapshot(*kind, latest)? {
            debug!(
                prefix = %frame.prefix,
                records = frame.record_count(),
                "snapshot projected"
            );
            frames.push(frame);
        }
    }
    info!(
        snapshot_count = frames.len(),
        record_count = frames.iter().map(SnapshotFrame::record_count).sum::<usize>(),
        duration_ms = started.elapsed().as_millis(),
        "projection complete"
    );
    Ok(frames)
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Write the frames, or only count them on a dry run.
pub fn output(
    writer: &SnapshotWriter,
    frames: Vec<SnapshotFrame>,
    dry_run: bool,
) -> Result<Vec<SnapshotSummary>> {
    let span = info_span!("output", root = %writer.root().display());
    let _guard = span.enter();
    let started = Instant::now();
    let mut summaries = Vec::with_capacity(frames.len());
    for mut frame in frames {
        let records = frame.record_count();
        let path = if dry_run {
            None
        } else {
            let path = writer
                .write_frame(&frame.prefix, &mut frame.data)
                .with_context(|| format!("write {} snapshot", frame.prefix))?;
            Some(path)
        };
        summaries.push(SnapshotSummary {
            prefix: frame.prefix,
            records,
            path,
        });
    }
    if dry_run {
        info!(
            snapshot_count = summaries.len(),
            duration_ms = started.elapsed().as_millis(),
            "output skipped (dry run)"
        );
    } else {
        info!(
            snapshot_count = summaries.len(),
            duration_ms = started.elapsed().as_millis(),
            "snapshots written"
        );
    }
    Ok(summaries)
}

/// Inputs for a flatten run.
#[derive(Debug, Clone)]
pub struct FlattenRequest {
    pub batch: PathBuf,
    pub output_dir: PathBuf,
    pub snapshots: Vec<SnapshotKind>,
    pub dry_run: bool,
    /// Shared by every file of the run.
    pub run_timestamp: DateTime<Utc>,
}

/// Run all flatten stages.
///
/// An empty batch is not an error: nothing is written.
pub fn run_flatten(request: &FlattenRequest) -> Result<FlattenResult> {
    let span = info_span!("flatten", batch = %request.batch.display());
    let _guard = span.enter();
    let started = Instant::now();

    let batch = ingest(&request.batch)?;
    let events_decoded = batch.len();
    let mut result = FlattenResult {
        batch: request.batch.clone(),
        output_dir: request.output_dir.clone(),
        run_timestamp: request.run_timestamp,
        events_decoded,
        dedupe: DedupeStats::default(),
        snapshots: Vec::new(),
        dry_run: request.dry_run,
    };
    if batch.is_empty() {
        warn!("batch contains no events; nothing written");
        return Ok(result);
    }

    let original = if request.snapshots.contains(&SnapshotKind::OriginalStructure) {
        Some(original_snapshot(&batch.events)?)
    } else {
        None
    };
    let (latest, stats) = dedupe(batch.events);
    result.dedupe = stats;

    let mut frames = project_snapshots(&latest, &request.snapshots)?;
    frames.extend(original);

    let writer = SnapshotWriter::new(&request.output_dir, request.run_timestamp);
    result.snapshots = output(&writer, frames, request.dry_run)?;

    info!(
        events = events_decoded,
        snapshot_count = result.snapshots.len(),
        record_count = result.total_records(),
        duration_ms = started.elapsed().as_millis(),
        "flatten complete"
    );
    Ok(result)
}

// ============================================================================
// Derivation
// ============================================================================

/// Inputs for a derivation run.
#[derive(Debug, Clone)]
pub struct DeriveRequest {
    pub snapshot_dir: PathBuf,
    /// Defaults to the newest classification snapshot in `snapshot_dir`.
    pub classification: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub label: String,
    pub tables: Vec<&'static DerivationTable>,
    /// Also write the `virksomhet` start/end table.
    pub activity: bool,
    pub filter: CategoryFilter,
}

/// Newest snapshot records per topic, read at most once per run.
struct SnapshotCache<'a> {
    dir: &'a Path,
    loaded: BTreeMap<Topic, Option<Vec<FlatField>>>,
}

impl<'a> SnapshotCache<'a> {
    fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            loaded: BTreeMap::new(),
        }
    }

    fn records(&mut self, topic: Topic) -> Result<Option<&[FlatField]>> {
        if !self.loaded.contains_key(&topic) {
            let records = match latest_snapshot(self.dir, topic.file_prefix())
                .with_context(|| format!("list snapshots in {}", self.dir.display()))?
            {
                Some(path) => {
                    let records = read_flat_fields(&path)
                        .with_context(|| format!("read snapshot {}", path.display()))?;
                    debug!(
                        topic = %topic,
                        path = %path.display(),
                        records = records.len(),
                        "snapshot loaded"
                    );
                    Some(records)
                }
                None => None,
            };
            self.loaded.insert(topic, records);
        }
        Ok(self
            .loaded
            .get(&topic)
            .and_then(|records| records.as_deref()))
    }
}

/// Derive and write every requested RF-1175 table.
///
/// A table whose source snapshot is missing is skipped with a warning.
pub fn run_derive(request: &DeriveRequest) -> Result<DeriveResult> {
    let span = info_span!("derive", label = %request.label);
    let _guard = span.enter();
    let started = Instant::now();

    let classification = match &request.classification {
        Some(path) => path.clone(),
        None => latest_snapshot(&request.snapshot_dir, CLASSIFICATION_PREFIX)
            .with_context(|| format!("list snapshots in {}", request.snapshot_dir.display()))?
            .with_context(|| {
                format!(
                    "no {CLASSIFICATION_PREFIX} snapshot in {}",
                    request.snapshot_dir.display()
                )
            })?,
    };
    let classifications = read_classifications(&classification)
        .with_context(|| format!("read classifications {}", classification.display()))?;
    info!(
        path = %classification.display(),
        classification_count = classifications.len(),
        "classifications loaded"
    );

    let writer = DerivationWriter::new(&request.output_dir, &request.label);
    let mut cache = SnapshotCache::new(&request.snapshot_dir);
    let mut tables = Vec::with_capacity(request.tables.len() + 1);

    if request.activity {
        let activity = derive_activity(&classifications, &request.filter);
        let mut df = activity
            .to_frame()
            .with_context(|| format!("build {ACTIVITY_TABLE} frame"))?;
        let path = writer
            .write_table(ACTIVITY_TABLE, &mut df)
            .with_context(|| format!("write {ACTIVITY_TABLE} table"))?;
        info!(
            table = ACTIVITY_TABLE,
            rows = activity.rows.len(),
            filtered_out = activity.stats.filtered_out,
            "derivation table written"
        );
        tables.push(TableSummary {
            name: ACTIVITY_TABLE,
            variables: activity.variables().len(),
            entities: activity.entity_count(),
            stats: activity.stats,
            path: Some(path),
            missing_sources: Vec::new(),
        });
    }

    for table in &request.tables {
        let mut records: Vec<FlatField> = Vec::new();
        let mut missing_sources = Vec::new();
        for topic in table.source_topics {
            match cache.records(*topic)? {
                Some(found) => records.extend_from_slice(found),
                None => missing_sources.push(topic.file_prefix()),
            }
        }
        if !missing_sources.is_empty() {
            warn!(
                table = table.name,
                missing = ?missing_sources,
                "source snapshot missing; table skipped"
            );
            tables.push(TableSummary {
                name: table.name,
                variables: table.derivations.len(),
                entities: 0,
                stats: Default::default(),
                path: None,
                missing_sources,
            });
            continue;
        }

        let derived = derive(table, &records, &classifications, &request.filter)
            .with_context(|| format!("derive {} table", table.name))?;
        let mut df = derived
            .to_frame()
            .with_context(|| format!("build {} frame", table.name))?;
        let path = writer
            .write_table(table.name, &mut df)
            .with_context(|| format!("write {} table", table.name))?;
        info!(
            table = table.name,
            entities = derived.entity_count(),
            used = derived.stats.used,
            filtered_out = derived.stats.filtered_out,
            "derivation table written"
        );
        tables.push(TableSummary {
            name: table.name,
            variables: derived.variables.len(),
            entities: derived.entity_count(),
            stats: derived.stats,
            path: Some(path),
            missing_sources,
        });
    }

    info!(
        table_count = tables.len(),
        output_dir = %writer.dir().display(),
        duration_ms = started.elapsed().as_millis(),
        "derivation complete"
    );
    Ok(DeriveResult {
        output_dir: writer.dir().to_path_buf(),
        classification,
        tables,
    })
}
