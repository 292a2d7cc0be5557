//! Parquet snapshot writing.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;
use tracing::debug;

use crate::error::{OutputError, Result};

/// Timestamp format of snapshot file names.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Snapshot file extension.
pub const EXTENSION: &str = "parquet";

/// Writes one run's snapshots; every file shares the run timestamp.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    root: PathBuf,
    run_timestamp: DateTime<Utc>,
}

impl SnapshotWriter {
    pub fn new(root: impl Into<PathBuf>, run_timestamp: DateTime<Utc>) -> Self {
        Self {
            root: root.into(),
            run_timestamp,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_timestamp(&self) -> DateTime<Utc> {
        self.run_timestamp
    }

    /// `<prefix>-<YYYY-MM-DD_HH-MM-SS>.parquet`
    pub fn file_name(&self, prefix: &str) -> String {
        format!(
            "{prefix}-{}.{EXTENSION}",
            self.run_timestamp.format(RUN_TIMESTAMP_FORMAT)
        )
    }

    pub fn path_for(&self, prefix: &str) -> PathBuf {
        self.root.join(self.file_name(prefix))
    }

    /// Write `df` as the snapshot for `prefix`.
    pub fn write_frame(&self, prefix: &str, df: &mut DataFrame) -> Result<PathBuf> {
        let path = self.path_for(prefix);
        write_parquet(&path, df)?;
        Ok(path)
    }
}

/// Writes derivation tables under `<root>/RF1175_<label>/`.
#[derive(Debug, Clone)]
pub struct DerivationWriter {
    dir: PathBuf,
}

impl DerivationWriter {
    pub fn new(root: impl AsRef<Path>, label: &str) -> Self {
        Self {
            dir: root.as_ref().join(format!("RF1175_{label}")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.{EXTENSION}"))
    }

    pub fn write_table(&self, table: &str, df: &mut DataFrame) -> Result<PathBuf> {
        let path = self.path_for(table);
        write_parquet(&path, df)?;
        Ok(path)
    }
}

/// Write a frame as Snappy-compressed Parquet, creating parent directories.
pub fn write_parquet(path: &Path, df: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| OutputError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let stats_options = StatisticsOptions {
        min_value: true,
        max_value: true,
        null_count: true,
        distinct_count: false,
    };
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .with_statistics(stats_options)
        .finish(df)
        .map_err(|err| OutputError::Parquet {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    debug!(path = %path.display(), rows = df.height(), "snapshot written");
    Ok(())
}

/// Run timestamp encoded in a snapshot file name for `prefix`, if it is one.
pub fn snapshot_timestamp(file_name: &str, prefix: &str) -> Option<NaiveDateTime> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('-')?;
    let stamp = rest.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok()
}

/// The newest snapshot for `prefix` in `dir`.
pub fn latest_snapshot(dir: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut newest: Option<(NaiveDateTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(stamp) = name
            .to_str()
            .and_then(|name| snapshot_timestamp(name, prefix))
        else {
            continue;
        };
        if newest.as_ref().is_none_or(|(current, _)| stamp > *current) {
            newest = Some((stamp, entry.path()));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_own_file_names_only() {
        let stamp = snapshot_timestamp("egenkapital-2024-04-18_10-35-24.parquet", "egenkapital");
        assert!(stamp.is_some());
        assert!(
            snapshot_timestamp("sum-egenkapital-2024-04-18_10-35-24.parquet", "egenkapital")
                .is_none()
        );
        assert!(snapshot_timestamp("egenkapital-latest.parquet", "egenkapital").is_none());
    }

    #[test]
    fn derivation_paths_use_label_directory() {
        let writer = DerivationWriter::new("/out", "2023_v1");
        assert_eq!(
            writer.path_for("salgsinntekt"),
            PathBuf::from("/out/RF1175_2023_v1/salgsinntekt.parquet")
        );
        let run = SnapshotWriter::new("/out", Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(
            run.path_for("naering"),
            PathBuf::from("/out/naering-2024-01-02_03-04-05.parquet")
        );
    }
}
