//! The `virksomhet` table: activity start and end per classified entity.
//!
//! Unlike the amount tables this one copies text straight from the
//! classification snapshot, one row per (entity, fiscal year).

use std::collections::BTreeSet;

use nst_model::EntityClassification;
use nst_model::columns;
use polars::prelude::*;
use tracing::debug;

use crate::derive::DeriveStats;
use crate::filter::CategoryFilter;

pub const ACTIVITY_TABLE: &str = "virksomhet";
/// Activity start date.
pub const START_VARIABLE: &str = "O_15805";
/// Activity end date.
pub const END_VARIABLE: &str = "O_15806";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    pub entity_id: String,
    pub fiscal_year: i32,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityTable {
    /// Ordered by entity, then fiscal year.
    pub rows: Vec<ActivityRow>,
    pub stats: DeriveStats,
}

impl ActivityTable {
    pub fn variables(&self) -> [&'static str; 2] {
        [START_VARIABLE, END_VARIABLE]
    }

    pub fn entity_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.entity_id.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// `orgnr`, `O_15805` and `O_15806`, all text.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new(
                columns::ORGNR.into(),
                self.rows
                    .iter()
                    .map(|row| row.entity_id.as_str())
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                START_VARIABLE.into(),
                self.rows
                    .iter()
                    .map(|row| row.start.as_deref())
                    .collect::<Vec<_>>(),
            )
            .into(),
            Series::new(
                END_VARIABLE.into(),
                self.rows
                    .iter()
                    .map(|row| row.end.as_deref())
                    .collect::<Vec<_>>(),
            )
            .into(),
        ])
    }
}

/// Start and end of every classification that passes `filter`.
pub fn derive_activity(
    classifications: &[EntityClassification],
    filter: &CategoryFilter,
) -> ActivityTable {
    let mut stats = DeriveStats {
        input: classifications.len(),
        ..DeriveStats::default()
    };
    let mut rows: Vec<ActivityRow> = classifications
        .iter()
        .filter(|c| {
            let allowed = filter.allows(c);
            if !allowed {
                stats.filtered_out += 1;
            }
            allowed
        })
        .map(|c| ActivityRow {
            entity_id: c.entity_id.clone(),
            fiscal_year: c.fiscal_year,
            start: c.start.clone(),
            end: c.end.clone(),
        })
        .collect();
    rows.sort_by(|a, b| {
        (a.entity_id.as_str(), a.fiscal_year).cmp(&(b.entity_id.as_str(), b.fiscal_year))
    });
    stats.used = rows.len();

    debug!(
        table = ACTIVITY_TABLE,
        input = stats.input,
        filtered_out = stats.filtered_out,
        rows = rows.len(),
        "derivation complete"
    );
    ActivityTable { rows, stats }
}
