//! CLI library components for the næringsspesifikasjon pipeline.

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
