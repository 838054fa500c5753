//! NDJSON aggregate artifact and console summary
//!
//! One compact JSON object per configuration group:
//! `{"kind":"AM","key":[name,dim_bits,capacity,size],<metric>:{mean,median,stdev},...,<provenance>}`

use crate::aggregate::{FamilyAggregates, GroupAggregate};
use crate::provenance::Provenance;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Default artifact path, relative to the working directory
pub const DEFAULT_ARTIFACT: &str = "perf_agg.ndjson";

/// A single artifact line
#[derive(Debug, Clone, Serialize)]
pub struct JsonAggregateLine<'a> {
    /// Family tag ("AM" or "Cluster")
    pub kind: &'static str,
    /// Configuration key in array form
    pub key: Value,
    /// Metric field -> {mean, median, stdev}
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
    #[serde(flatten)]
    pub provenance: &'a Provenance,
}

impl<'a> JsonAggregateLine<'a> {
    pub fn new(kind: &'static str, group: &GroupAggregate, provenance: &'a Provenance) -> Self {
        Self {
            kind,
            key: group.key.to_json_array(),
            metrics: metric_map(group),
            provenance,
        }
    }
}

fn metric_map(group: &GroupAggregate) -> Map<String, Value> {
    group
        .metrics
        .iter()
        .map(|m| {
            (
                m.field.to_string(),
                json!({"mean": m.stats.mean, "median": m.stats.median, "stdev": m.stats.stdev}),
            )
        })
        .collect()
}

/// Console summary line: key plus metric aggregates
pub fn summary_line(group: &GroupAggregate) -> String {
    let mut line = Map::new();
    line.insert("key".to_string(), group.key.to_json_array());
    line.extend(metric_map(group));
    Value::Object(line).to_string()
}

/// Console summary for all families, one banner per family
pub fn summary_report(families: &[&FamilyAggregates]) -> String {
    let mut report = String::new();
    for aggregates in families {
        report.push_str(&format!("=== Aggregates ({}) ===\n", aggregates.family()));
        for group in aggregates.groups() {
            report.push_str(&summary_line(group));
            report.push('\n');
        }
    }
    report
}

/// Write every group of every family to `out`, families in the given order
pub fn write_aggregates<W: Write>(
    out: &mut W,
    families: &[&FamilyAggregates],
    provenance: &Provenance,
) -> io::Result<()> {
    for aggregates in families {
        let kind = aggregates.family().tag();
        for group in aggregates.groups() {
            serde_json::to_writer(&mut *out, &JsonAggregateLine::new(kind, group, provenance))?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()
}

/// Write the artifact file at `path`, replacing any previous one
pub fn write_aggregates_ndjson(
    path: &Path,
    families: &[&FamilyAggregates],
    provenance: &Provenance,
) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_aggregates(&mut out, families, provenance)
}
