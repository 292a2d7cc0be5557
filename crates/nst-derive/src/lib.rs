//! RF-1175 field derivation from flattened næringsspesifikasjon snapshots.

pub mod activity;
pub mod derive;
pub mod error;
pub mod filter;
pub mod rf1175;
pub mod table;

pub use activity::{
    ACTIVITY_TABLE, ActivityRow, ActivityTable, END_VARIABLE, START_VARIABLE, derive_activity,
};
pub use derive::{DeriveStats, DerivedTable, derive};
pub use error::{DeriveError, Result};
pub use filter::{CategoryFilter, DEFAULT_ENTITY_TYPES, DEFAULT_OBLIGATION_TYPES};
pub use rf1175::{TABLES, table_by_name};
pub use table::{Derivation, DerivationTable, Sign, Term, minus, plus};
