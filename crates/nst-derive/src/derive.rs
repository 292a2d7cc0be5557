//! Table-driven derivation of RF-1175 variables.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use nst_model::columns;
use nst_model::{EntityClassification, FlatField};
use nst_transform::amount_to_f64;
use polars::prelude::*;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{DeriveError, Result};
use crate::filter::CategoryFilter;
use crate::table::{DerivationTable, Sign};

/// Counters describing one derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveStats {
    pub input: usize,
    /// Records whose entity and year are unclassified or filtered out.
    pub filtered_out: usize,
    /// Records whose field name no derivation reads.
    pub unrecognized: usize,
    pub used: usize,
}

/// Derived variables per entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub name: &'static str,
    pub variables: Vec<&'static str>,
    /// Entity identifier to one value per variable.
    pub rows: BTreeMap<String, Vec<Decimal>>,
    pub stats: DeriveStats,
}

impl DerivedTable {
    pub fn entity_count(&self) -> usize {
        self.rows.len()
    }

    pub fn value(&self, entity_id: &str, variable: &str) -> Option<Decimal> {
        let index = self.variables.iter().position(|v| *v == variable)?;
        self.rows.get(entity_id).map(|row| row[index])
    }

    /// `orgnr` followed by one Float64 column per variable.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut cols: Vec<Column> = Vec::with_capacity(self.variables.len() + 1);
        cols.push(
            Series::new(
                columns::ORGNR.into(),
                self.rows.keys().map(String::as_str).collect::<Vec<_>>(),
            )
            .into(),
        );
        for (index, variable) in self.variables.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .values()
                .map(|row| amount_to_f64(row[index]))
                .collect();
            cols.push(Series::new((*variable).into(), values).into());
        }
        DataFrame::new(cols)
    }
}

/// Map, filter and aggregate flattened records through one table.
///
/// Records are kept only when their (entity, year) classification passes
/// `filter`. Field names no derivation reads are dropped. Values are summed
/// per entity; variables without input stay zero.
///
/// # Errors
///
/// Returns [`DeriveError::Overflow`] when a sum leaves the decimal range.
pub fn derive(
    table: &DerivationTable,
    records: &[FlatField],
    classifications: &[EntityClassification],
    filter: &CategoryFilter,
) -> Result<DerivedTable> {
    let allowed: BTreeSet<(&str, i32)> = classifications
        .iter()
        .filter(|c| filter.allows(c))
        .map(|c| (c.entity_id.as_str(), c.fiscal_year))
        .collect();

    let mut by_code: HashMap<&str, Vec<(usize, Sign)>> = HashMap::new();
    for (index, derivation) in table.derivations.iter().enumerate() {
        for term in derivation.terms {
            by_code.entry(term.code).or_default().push((index, term.sign));
        }
    }

    let width = table.derivations.len();
    let mut rows: BTreeMap<String, Vec<Decimal>> = BTreeMap::new();
    let mut stats = DeriveStats {
        input: records.len(),
        ..DeriveStats::default()
    };

    for record in records {
        if !allowed.contains(&(record.entity_id.as_str(), record.fiscal_year)) {
            stats.filtered_out += 1;
            continue;
        }
        let Some(targets) = by_code.get(record.field_name.as_str()) else {
            stats.unrecognized += 1;
            continue;
        };
        stats.used += 1;
        let row = rows
            .entry(record.entity_id.clone())
            .or_insert_with(|| vec![Decimal::ZERO; width]);
        for (index, sign) in targets {
            let current = row[*index];
            let next = match sign {
                Sign::Plus => current.checked_add(record.amount),
                Sign::Minus => current.checked_sub(record.amount),
            };
            row[*index] = next.ok_or(DeriveError::Overflow {
                table: table.name,
                variable: table.derivations[*index].variable,
            })?;
        }
    }

    debug!(
        table = table.name,
        input = stats.input,
        filtered_out = stats.filtered_out,
        unrecognized = stats.unrecognized,
        entities = rows.len(),
        "derivation complete"
    );

    Ok(DerivedTable {
        name: table.name,
        variables: table.variables(),
        rows,
        stats,
    })
}
