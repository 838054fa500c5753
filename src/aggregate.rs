//! Grouping of repeated trials by benchmark configuration
//!
//! Trials sharing a [`ConfigKey`] are repeats of one configuration. Groups are
//! kept in first-encounter order so the artifact and console summary are
//! stable for a given log, while the per-group statistics do not depend on
//! arrival order at all.

use crate::error::GateError;
use crate::ndjson::Record;
use crate::regression::Aggregate;
use crate::schema::MetricFamily;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// `(name, dim_bits, capacity, size_or_updates)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    pub name: String,
    pub dim_bits: i64,
    pub capacity: i64,
    /// `size` for AM, `updates` for Cluster
    pub size: i64,
}

impl ConfigKey {
    pub fn new(name: impl Into<String>, dim_bits: i64, capacity: i64, size: i64) -> Self {
        Self {
            name: name.into(),
            dim_bits,
            capacity,
            size,
        }
    }

    /// Build the key of a record for the given family
    pub fn from_record(record: &Record, family: MetricFamily) -> Result<Self, GateError> {
        let line = record.line();
        let field = |name: &str| {
            record.get(name).ok_or_else(|| GateError::MissingFields {
                family: family.tag(),
                row: line,
                missing: vec![name.to_string()],
            })
        };

        Ok(Self {
            name: coerce_name(field("name")?, "name", line)?,
            dim_bits: coerce_int(field("dim_bits")?, "dim_bits", line)?,
            capacity: coerce_int(field("capacity")?, "capacity", line)?,
            size: coerce_int(field(family.size_field())?, family.size_field(), line)?,
        })
    }

    /// Decode the array form `[name, dim_bits, capacity, size]`
    pub fn from_json_array(value: &Value) -> Option<Self> {
        let Value::Array(parts) = value else {
            return None;
        };
        let [name, dim_bits, capacity, size] = parts.as_slice() else {
            return None;
        };

        Some(Self {
            name: coerce_name(name, "name", 0).ok()?,
            dim_bits: coerce_int(dim_bits, "dim_bits", 0).ok()?,
            capacity: coerce_int(capacity, "capacity", 0).ok()?,
            size: coerce_int(size, "size", 0).ok()?,
        })
    }

    pub fn to_json_array(&self) -> Value {
        serde_json::json!([self.name, self.dim_bits, self.capacity, self.size])
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {}, {}, {})",
            self.name, self.dim_bits, self.capacity, self.size
        )
    }
}

fn invalid(field: &str, line: usize, expected: &'static str, value: &Value) -> GateError {
    GateError::InvalidField {
        field: field.to_string(),
        line,
        expected,
        value: value.to_string(),
    }
}

fn coerce_name(value: &Value, field: &str, line: usize) -> Result<String, GateError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(field, line, "string", value))
}

/// Integers, finite floats (truncated toward zero) and numeric strings
pub(crate) fn coerce_int(value: &Value, field: &str, line: usize) -> Result<i64, GateError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, line, "integer", value))
}

/// JSON numbers and numeric strings
pub(crate) fn coerce_float(value: &Value, field: &str, line: usize) -> Result<f64, GateError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    };
    parsed.ok_or_else(|| invalid(field, line, "number", value))
}

/// Aggregates of one tracked metric within a group
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAggregate {
    pub field: &'static str,
    pub stats: Aggregate,
}

/// All trials of one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub key: ConfigKey,
    /// Number of raw trials folded into this group
    pub trials: usize,
    /// One entry per family metric, in family order
    pub metrics: Vec<MetricAggregate>,
}

impl GroupAggregate {
    pub fn metric(&self, field: &str) -> Option<&Aggregate> {
        self.metrics
            .iter()
            .find(|m| m.field == field)
            .map(|m| &m.stats)
    }
}

/// Per-configuration aggregates for one family, in first-encounter order
#[derive(Debug, Clone)]
pub struct FamilyAggregates {
    family: MetricFamily,
    groups: Vec<GroupAggregate>,
    index: HashMap<ConfigKey, usize>,
}

impl FamilyAggregates {
    pub fn family(&self) -> MetricFamily {
        self.family
    }

    pub fn groups(&self) -> &[GroupAggregate] {
        &self.groups
    }

    pub fn get(&self, key: &ConfigKey) -> Option<&GroupAggregate> {
        self.index.get(key).map(|&i| &self.groups[i])
    }

    /// Raw trials recorded for `key` (0 when the group does not exist)
    pub fn trial_count(&self, key: &ConfigKey) -> usize {
        self.get(key).map_or(0, |g| g.trials)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group `records` by configuration key and aggregate each tracked metric
///
/// Records must already be filtered to `family`.
pub fn aggregate(records: &[Record], family: MetricFamily) -> Result<FamilyAggregates, GateError> {
    let metrics = family.metrics();
    let mut order: Vec<(ConfigKey, Vec<Vec<f64>>)> = Vec::new();
    let mut index: HashMap<ConfigKey, usize> = HashMap::new();

    for record in records {
        let key = ConfigKey::from_record(record, family)?;
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, vec![Vec::new(); metrics.len()]));
                order.len() - 1
            }
        };

        for (values, metric) in order[slot].1.iter_mut().zip(metrics) {
            let raw = record.get(metric.field).ok_or_else(|| GateError::MissingFields {
                family: family.tag(),
                row: record.line(),
                missing: vec![metric.field.to_string()],
            })?;
            values.push(coerce_float(raw, metric.field, record.line())?);
        }
    }

    let groups = order
        .into_iter()
        .map(|(key, series)| GroupAggregate {
            key,
            trials: series.first().map_or(0, Vec::len),
            metrics: metrics
                .iter()
                .zip(series)
                .map(|(metric, values)| MetricAggregate {
                    field: metric.field,
                    stats: Aggregate::from_values(&values),
                })
                .collect(),
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        family = family.tag(),
        records = records.len(),
        groups = groups.len(),
        "aggregated trials"
    );

    Ok(FamilyAggregates {
        family,
        groups,
        index,
    })
}
