//! Snapshot output for the næringsspesifikasjon pipeline.
//!
//! - **writer**: timestamped Parquet snapshots and RF-1175 table directories
//! - **reader**: snapshot reading for the derivation stage
//! - **polars_utils**: `AnyValue` cell conversions used by the reader

pub mod error;
pub mod polars_utils;
pub mod reader;
pub mod writer;

pub use error::{OutputError, Result};
pub use polars_utils::{
    any_to_datetime, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty,
    format_numeric, parse_f64, parse_i64,
};
pub use reader::{read_classifications, read_flat_fields, read_snapshot};
pub use writer::{
    DerivationWriter, EXTENSION, RUN_TIMESTAMP_FORMAT, SnapshotWriter, latest_snapshot,
    snapshot_timestamp, write_parquet,
};
