//! Benchmark metric families and required-field checks
//!
//! AM and Cluster harnesses may write into the same log. Records are told
//! apart by which required-field set they carry rather than by a tag.

use crate::error::GateError;
use crate::ndjson::Record;
use std::fmt;

/// Fields every AM (associative memory) record must carry
pub const AM_REQUIRED_FIELDS: [&str; 11] = [
    "name",
    "dim_bits",
    "capacity",
    "size",
    "iters",
    "secs",
    "queries_per_sec",
    "eff_gb_per_sec",
    "sample_index",
    "warmup_ms",
    "measure_ms",
];

/// Fields every Cluster record must carry
pub const CLUSTER_REQUIRED_FIELDS: [&str; 13] = [
    "name",
    "dim_bits",
    "capacity",
    "updates",
    "update_iters",
    "update_secs",
    "updates_per_sec",
    "finalize_iters",
    "finalize_secs",
    "finalizes_per_sec",
    "sample_index",
    "warmup_ms",
    "measure_ms",
];

/// Which tolerance flag governs a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToleranceKind {
    /// `--tol-qps`
    Throughput,
    /// `--tol-gbps`
    Bandwidth,
}

/// A metric tracked for a family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSpec {
    /// Record field holding the per-trial value
    pub field: &'static str,
    /// Short label used in failure messages
    pub label: &'static str,
    pub tolerance: ToleranceKind,
}

const AM_METRICS: [MetricSpec; 2] = [
    MetricSpec {
        field: "queries_per_sec",
        label: "AM qps",
        tolerance: ToleranceKind::Throughput,
    },
    MetricSpec {
        field: "eff_gb_per_sec",
        label: "AM gbps",
        tolerance: ToleranceKind::Bandwidth,
    },
];

// Cluster has no bandwidth metric; both reuse the throughput tolerance.
const CLUSTER_METRICS: [MetricSpec; 2] = [
    MetricSpec {
        field: "updates_per_sec",
        label: "Cluster updates",
        tolerance: ToleranceKind::Throughput,
    },
    MetricSpec {
        field: "finalizes_per_sec",
        label: "Cluster finalizes",
        tolerance: ToleranceKind::Throughput,
    },
];

/// Benchmark workload family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Am,
    Cluster,
}

impl MetricFamily {
    /// Literal tag used in the artifact's `kind` field
    pub fn tag(self) -> &'static str {
        match self {
            MetricFamily::Am => "AM",
            MetricFamily::Cluster => "Cluster",
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            MetricFamily::Am => &AM_REQUIRED_FIELDS,
            MetricFamily::Cluster => &CLUSTER_REQUIRED_FIELDS,
        }
    }

    /// Fourth component of the configuration key
    pub fn size_field(self) -> &'static str {
        match self {
            MetricFamily::Am => "size",
            MetricFamily::Cluster => "updates",
        }
    }

    pub fn metrics(self) -> &'static [MetricSpec] {
        match self {
            MetricFamily::Am => &AM_METRICS,
            MetricFamily::Cluster => &CLUSTER_METRICS,
        }
    }

    /// Baseline document name inside the per-OS directory
    pub fn baseline_file(self) -> &'static str {
        match self {
            MetricFamily::Am => "am_bench.json",
            MetricFamily::Cluster => "cluster_bench.json",
        }
    }

    fn other(self) -> MetricFamily {
        match self {
            MetricFamily::Am => MetricFamily::Cluster,
            MetricFamily::Cluster => MetricFamily::Am,
        }
    }

    /// Required fields absent from `record`, in declaration order
    pub fn missing_fields(self, record: &Record) -> Vec<String> {
        self.required_fields()
            .iter()
            .filter(|field| !record.has_field(field))
            .map(|field| field.to_string())
            .collect()
    }

    pub fn matches(self, record: &Record) -> bool {
        self.required_fields()
            .iter()
            .all(|field| record.has_field(field))
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Keep the records carrying every field `family` requires
///
/// Records of the other family and stray objects are dropped silently. A
/// record satisfying both families at once cannot be attributed and is
/// rejected.
pub fn filter(records: Vec<Record>, family: MetricFamily) -> Result<Vec<Record>, GateError> {
    let total = records.len();
    let mut kept = Vec::with_capacity(total);

    for record in records {
        if !family.matches(&record) {
            continue;
        }
        if family.other().matches(&record) {
            return Err(GateError::AmbiguousRecord {
                line: record.line(),
            });
        }
        kept.push(record);
    }

    tracing::debug!(
        family = family.tag(),
        kept = kept.len(),
        dropped = total - kept.len(),
        "filtered records"
    );
    Ok(kept)
}

/// Re-check that every record carries the family's required fields
///
/// After [`filter`] this never fails; it guards against the two drifting
/// apart.
pub fn require(records: &[Record], family: MetricFamily) -> Result<(), GateError> {
    for (row, record) in records.iter().enumerate() {
        let missing = family.missing_fields(record);
        if !missing.is_empty() {
            return Err(GateError::MissingFields {
                family: family.tag(),
                row,
                missing,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(line: usize, value: Value) -> Record {
        let Value::Object(fields) = value else {
            panic!("test record must be an object");
        };
        Record::new(line, fields)
    }

    fn am(line: usize) -> Record {
        record(
            line,
            json!({
                "name": "am/linear", "dim_bits": 256, "capacity": 1000, "size": 10000,
                "iters": 5000, "secs": 0.5, "queries_per_sec": 10000.0,
                "eff_gb_per_sec": 1.25, "sample_index": 0, "warmup_ms": 50, "measure_ms": 200
            }),
        )
    }

    fn cluster(line: usize) -> Record {
        record(
            line,
            json!({
                "name": "cluster/default", "dim_bits": 10000, "capacity": 16, "updates": 100,
                "update_iters": 400, "update_secs": 0.2, "updates_per_sec": 2000.0,
                "finalize_iters": 50, "finalize_secs": 0.2, "finalizes_per_sec": 250.0,
                "sample_index": 0, "warmup_ms": 50, "measure_ms": 200
            }),
        )
    }

    #[test]
    fn test_required_field_counts() {
        assert_eq!(MetricFamily::Am.required_fields().len(), 11);
        assert_eq!(MetricFamily::Cluster.required_fields().len(), 13);
    }

    #[test]
    fn test_filter_separates_families() {
        let records = vec![am(1), cluster(2), am(3), record(4, json!({"note": "x"}))];

        let am_rows = filter(records.clone(), MetricFamily::Am).unwrap();
        let cl_rows = filter(records, MetricFamily::Cluster).unwrap();

        assert_eq!(am_rows.iter().map(Record::line).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(cl_rows.iter().map(Record::line).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_filter_drops_record_missing_one_field() {
        let mut fields = am(1).fields().clone();
        fields.remove("measure_ms");
        let partial = Record::new(1, fields);

        assert!(filter(vec![partial], MetricFamily::Am).unwrap().is_empty());
    }

    #[test]
    fn test_filter_rejects_ambiguous_record() {
        let mut fields = am(7).fields().clone();
        fields.extend(cluster(7).fields().clone());
        let both = Record::new(7, fields);

        let err = filter(vec![both], MetricFamily::Cluster).unwrap_err();
        assert!(matches!(err, GateError::AmbiguousRecord { line: 7 }));
    }

    #[test]
    fn test_require_passes_after_filter() {
        let rows = filter(vec![am(1), cluster(2)], MetricFamily::Am).unwrap();
        assert!(require(&rows, MetricFamily::Am).is_ok());
    }

    #[test]
    fn test_require_reports_row_and_missing_fields() {
        let rows = vec![am(1), cluster(2)];
        let err = require(&rows, MetricFamily::Am).unwrap_err();
        match err {
            GateError::MissingFields { family, row, ref missing } => {
                assert_eq!(family, "AM");
                assert_eq!(row, 1);
                assert_eq!(missing, &vec!["size", "iters", "secs", "queries_per_sec", "eff_gb_per_sec"]);
            }
            other => panic!("Expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_metric_tolerance_assignment() {
        let am_kinds: Vec<_> = MetricFamily::Am.metrics().iter().map(|m| m.tolerance).collect();
        assert_eq!(am_kinds, vec![ToleranceKind::Throughput, ToleranceKind::Bandwidth]);
        assert!(MetricFamily::Cluster
            .metrics()
            .iter()
            .all(|m| m.tolerance == ToleranceKind::Throughput));
    }
}
