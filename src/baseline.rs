//! Recorded per-OS baselines
//!
//! Layout: `<root>/{linux|windows|macos}/{am_bench.json,cluster_bench.json}`.
//! Each document maps a stringified key (`"[name, dim_bits, capacity, size]"`)
//! to the aggregates recorded for that configuration. Keys are decoded into
//! structural [`ConfigKey`]s on load so lookups never depend on how the
//! baseline writer happened to format them.

use crate::aggregate::ConfigKey;
use crate::error::GateError;
use crate::regression::Aggregate;
use crate::schema::MetricFamily;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Recorded aggregates of one configuration, keyed by metric field
pub type BaselineGroup = HashMap<String, Aggregate>;

/// Map a runner identifier to its baseline subdirectory
///
/// Only the three `*-latest` runner labels are translated; anything else is
/// used as the directory name unchanged.
pub fn baseline_subdir(os: &str) -> &str {
    match os {
        "ubuntu-latest" => "linux",
        "windows-latest" => "windows",
        "macos-latest" => "macos",
        other => other,
    }
}

/// One family's baseline, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaselineTable {
    groups: Vec<(ConfigKey, BaselineGroup)>,
}

impl BaselineTable {
    pub fn new(groups: Vec<(ConfigKey, BaselineGroup)>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[(ConfigKey, BaselineGroup)] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Parse a baseline document for `family`
    ///
    /// Every group must record each metric the family tracks.
    pub fn from_json(text: &str, family: MetricFamily, path: &Path) -> Result<Self, GateError> {
        let invalid = |reason: String| GateError::InvalidBaseline {
            path: path.to_path_buf(),
            reason,
        };

        let document: Map<String, Value> =
            serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?;

        let mut groups = Vec::with_capacity(document.len());
        for (raw_key, value) in document {
            let key = serde_json::from_str::<Value>(&raw_key)
                .ok()
                .and_then(|v| ConfigKey::from_json_array(&v))
                .ok_or_else(|| invalid(format!("cannot decode group key {}", raw_key)))?;

            let group: BaselineGroup = serde_json::from_value(value)
                .map_err(|e| invalid(format!("group {}: {}", raw_key, e)))?;

            if let Some(metric) = family
                .metrics()
                .iter()
                .find(|m| !group.contains_key(m.field))
            {
                return Err(invalid(format!(
                    "group {} has no '{}' entry",
                    raw_key, metric.field
                )));
            }

            groups.push((key, group));
        }

        Ok(Self { groups })
    }

    /// Read the family's baseline document from `dir`
    pub fn load(dir: &Path, family: MetricFamily) -> Result<Self, GateError> {
        let path = dir.join(family.baseline_file());
        let text = fs::read_to_string(&path).map_err(|e| GateError::io(&path, e))?;
        let table = Self::from_json(&text, family, &path)?;
        tracing::debug!(
            family = family.tag(),
            path = %path.display(),
            groups = table.len(),
            "loaded baseline"
        );
        Ok(table)
    }
}

/// Both baseline tables for one OS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    pub am: BaselineTable,
    pub cluster: BaselineTable,
}

impl Baseline {
    /// Directory holding the baselines for `os`
    pub fn dir_for(root: &Path, os: &str) -> PathBuf {
        root.join(baseline_subdir(os))
    }

    /// Load both tables; a missing or unreadable file is fatal
    pub fn load(root: &Path, os: &str) -> Result<Self, GateError> {
        let dir = Self::dir_for(root, os);
        tracing::info!(dir = %dir.display(), os, "using baseline directory");

        Ok(Self {
            am: BaselineTable::load(&dir, MetricFamily::Am)?,
            cluster: BaselineTable::load(&dir, MetricFamily::Cluster)?,
        })
    }

    pub fn table(&self, family: MetricFamily) -> &BaselineTable {
        match family {
            MetricFamily::Am => &self.am,
            MetricFamily::Cluster => &self.cluster,
        }
    }
}
