//! Run configuration loaded from an optional TOML file.
//!
//! ```toml
//! output_dir = "/data/naeringsspesifikasjon"
//! label = "2023_1"
//!
//! [filter]
//! entity_types = ["enkeltpersonforetak"]
//! obligation_types = ["ingenRegnskapsplikt"]
//! ```
//!
//! Every key is optional. Command line flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use nst_derive::CategoryFilter;
use serde::{Deserialize, Serialize};

/// Label used for derivation output when neither flag nor file sets one.
pub const DEFAULT_LABEL: &str = "latest";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Root directory for snapshots and derivation tables.
    pub output_dir: Option<PathBuf>,
    /// Suffix of the `RF1175_<label>` directory.
    pub label: Option<String>,
    pub filter: CategoryFilter,
}

impl RunConfig {
    /// Parse a configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse configuration")
    }

    /// Load `path` when given, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("load configuration {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Category filter with non-empty command line lists taking precedence.
    pub fn filter_with(&self, entity_types: &[String], obligation_types: &[String]) -> CategoryFilter {
        let pick = |flags: &[String], configured: &[String]| {
            if flags.is_empty() {
                configured.to_vec()
            } else {
                flags.to_vec()
            }
        };
        CategoryFilter {
            entity_types: pick(entity_types, &self.filter.entity_types),
            obligation_types: pick(obligation_types, &self.filter.obligation_types),
        }
    }

    pub fn label_or_default(&self, flag: Option<&str>) -> String {
        flag.or(self.label.as_deref())
            .unwrap_or(DEFAULT_LABEL)
            .to_string()
    }
}
