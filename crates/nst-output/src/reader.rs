//! Snapshot reading for the derivation stage.

use std::fs::File;
use std::path::Path;

use nst_model::columns;
use nst_model::{EntityClassification, FlatField};
use polars::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::{OutputError, Result};
use crate::polars_utils::{any_to_datetime, any_to_f64, any_to_i64, any_to_string_non_empty};

/// Read a Parquet snapshot.
pub fn read_snapshot(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetReader::new(file)
        .finish()
        .map_err(|err| OutputError::Parquet {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

struct Cells<'a> {
    df: &'a DataFrame,
    path: &'a Path,
}

impl<'a> Cells<'a> {
    fn column(&self, name: &str) -> Result<&'a Column> {
        self.df
            .column(name)
            .map_err(|_| OutputError::MissingColumn {
                column: name.to_string(),
                path: self.path.to_path_buf(),
            })
    }

    fn invalid(&self, column: &str, row: usize) -> OutputError {
        OutputError::InvalidValue {
            column: column.to_string(),
            row,
            path: self.path.to_path_buf(),
        }
    }

    fn get(&self, column: &'a Column, row: usize) -> Result<AnyValue<'a>> {
        column
            .get(row)
            .map_err(|_| self.invalid(column.name().as_str(), row))
    }

    fn text(&self, column: &'a Column, row: usize) -> Result<Option<String>> {
        Ok(any_to_string_non_empty(self.get(column, row)?))
    }

    fn required_text(&self, column: &'a Column, row: usize) -> Result<String> {
        self.text(column, row)?
            .ok_or_else(|| self.invalid(column.name().as_str(), row))
    }

    fn year(&self, column: &'a Column, row: usize) -> Result<i32> {
        any_to_i64(self.get(column, row)?)
            .and_then(|year| i32::try_from(year).ok())
            .ok_or_else(|| self.invalid(column.name().as_str(), row))
    }
}

/// Read a stage-1 topic snapshot back into field records.
///
/// Null amounts are skipped.
pub fn read_flat_fields(path: &Path) -> Result<Vec<FlatField>> {
    let df = read_snapshot(path)?;
    let cells = Cells { df: &df, path };
    let entity = cells.column(columns::ENTITY_ID)?;
    let year = cells.column(columns::FISCAL_YEAR)?;
    let field = cells.column(columns::FIELD_NAME)?;
    let amount = cells.column(columns::AMOUNT)?;
    let registered = cells.column(columns::REGISTRATION_TIMESTAMP)?;
    let sequence = cells.column(columns::SEQUENCE_NUMBER)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(value) = any_to_f64(cells.get(amount, row)?) else {
            continue;
        };
        let amount = Decimal::from_f64(value).ok_or_else(|| cells.invalid(columns::AMOUNT, row))?;
        let registration_timestamp = any_to_datetime(cells.get(registered, row)?)
            .ok_or_else(|| cells.invalid(columns::REGISTRATION_TIMESTAMP, row))?;
        records.push(FlatField {
            entity_id: cells.required_text(entity, row)?,
            fiscal_year: cells.year(year, row)?,
            field_name: cells.required_text(field, row)?,
            amount,
            registration_timestamp,
            sequence_number: any_to_i64(cells.get(sequence, row)?).unwrap_or_default(),
        });
    }
    Ok(records)
}

/// Read an entity classification snapshot.
pub fn read_classifications(path: &Path) -> Result<Vec<EntityClassification>> {
    let df = read_snapshot(path)?;
    let cells = Cells { df: &df, path };
    let entity = cells.column(columns::ENTITY_ID)?;
    let year = cells.column(columns::FISCAL_YEAR)?;
    let entity_type = cells.column(columns::ENTITY_TYPE)?;
    let obligation = cells.column(columns::OBLIGATION_TYPE)?;
    let start = cells.column(columns::START)?;
    let end = cells.column(columns::END)?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        records.push(EntityClassification {
            entity_id: cells.required_text(entity, row)?,
            fiscal_year: cells.year(year, row)?,
            entity_type: cells.text(entity_type, row)?,
            obligation_type: cells.text(obligation, row)?,
            start: cells.text(start, row)?,
            end: cells.text(end, row)?,
        });
    }
    Ok(records)
}
