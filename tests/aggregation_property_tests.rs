//! Property-based tests for the aggregation engine and tolerance comparator
//!
//! Properties covered:
//! 1. median/stdev match their textbook definitions
//! 2. grouping is independent of record arrival order
//! 3. tolerance boundary and non-positive baselines

use benchgate::aggregate::{aggregate, ConfigKey};
use benchgate::ndjson::Record;
use benchgate::regression::{compare_metric, median, stdev, Aggregate};
use benchgate::schema::MetricFamily;
use proptest::prelude::*;
use serde_json::{json, Value};

fn cluster_record(line: usize, name: &str, updates: i64, ups: f64, fps: f64) -> Record {
    let Value::Object(fields) = json!({
        "name": name, "dim_bits": 4096, "capacity": 32, "updates": updates,
        "update_iters": 1, "update_secs": 1.0, "updates_per_sec": ups,
        "finalize_iters": 1, "finalize_secs": 1.0, "finalizes_per_sec": fps,
        "sample_index": line, "warmup_ms": 0, "measure_ms": 0
    }) else {
        unreachable!()
    };
    Record::new(line, fields)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_median_matches_definition(values in prop::collection::vec(0.0f64..1e9, 1..50)) {
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let n = sorted.len();
        let expected = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        prop_assert_eq!(median(&values), expected);
    }

    #[test]
    fn prop_stdev_is_population_stdev(values in prop::collection::vec(0.0f64..1e6, 1..50)) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let expected = (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt();

        let sd = stdev(&values);
        prop_assert!((sd - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(sd >= 0.0);
    }

    #[test]
    fn prop_aggregate_bounds(values in prop::collection::vec(1.0f64..1e6, 1..30)) {
        let agg = Aggregate::from_values(&values);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        prop_assert!(agg.mean >= min - 1e-6 && agg.mean <= max + 1e-6);
        prop_assert!(agg.median >= min && agg.median <= max);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_grouping_is_order_independent(
        trials in prop::collection::vec((0usize..4, 0i64..3, 1.0f64..1e5, 1.0f64..1e3), 1..40),
        seed in any::<u64>(),
    ) {
        let names = ["alpha", "beta", "gamma", "delta"];
        let records: Vec<Record> = trials
            .iter()
            .enumerate()
            .map(|(i, (name, updates, ups, fps))| {
                cluster_record(i + 1, names[*name], 100 * updates, *ups, *fps)
            })
            .collect();

        // Deterministic shuffle driven by the seed
        let mut shuffled = records.clone();
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let original = aggregate(&records, MetricFamily::Cluster).unwrap();
        let permuted = aggregate(&shuffled, MetricFamily::Cluster).unwrap();

        prop_assert_eq!(original.len(), permuted.len());
        for group in original.groups() {
            let other = permuted.get(&group.key).unwrap();
            prop_assert_eq!(group.trials, other.trials);
            for metric in &group.metrics {
                let a = metric.stats;
                let b = *other.metric(metric.field).unwrap();
                prop_assert_eq!(a.median, b.median);
                prop_assert!((a.mean - b.mean).abs() <= 1e-9 * a.mean.abs().max(1.0));
                prop_assert!((a.stdev - b.stdev).abs() <= 1e-6 * a.mean.abs().max(1.0));
            }
        }
    }

    #[test]
    fn prop_emission_order_is_first_encounter(
        names in prop::collection::vec(0usize..5, 1..30),
    ) {
        let labels = ["a", "b", "c", "d", "e"];
        let records: Vec<Record> = names
            .iter()
            .enumerate()
            .map(|(i, n)| cluster_record(i + 1, labels[*n], 100, 10.0, 1.0))
            .collect();

        let mut expected: Vec<ConfigKey> = Vec::new();
        for n in &names {
            let key = ConfigKey::new(labels[*n], 4096, 32, 100);
            if !expected.contains(&key) {
                expected.push(key);
            }
        }

        let aggs = aggregate(&records, MetricFamily::Cluster).unwrap();
        let actual: Vec<ConfigKey> = aggs.groups().iter().map(|g| g.key.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_tolerance_floor_passes(baseline in 1.0f64..1e9, tol in 0.0f64..100.0) {
        let floor = baseline * (1.0 - tol / 100.0);
        prop_assert!(compare_metric(floor, baseline, tol).passed);
        prop_assert!(compare_metric(baseline * 2.0, baseline, tol).passed);
    }

    #[test]
    fn prop_non_positive_baseline_always_passes(
        baseline in -1e6f64..=0.0,
        current in -1e9f64..1e9,
        tol in 0.0f64..100.0,
    ) {
        prop_assert!(compare_metric(current, baseline, tol).passed);
    }
}
