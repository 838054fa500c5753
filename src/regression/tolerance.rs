// Baseline comparison with one-sided relative tolerance
//
// Only a drop larger than the tolerance is a regression. Improvements always
// pass, and a non-positive baseline mean cannot anchor a relative tolerance,
// so comparisons against it pass unconditionally.

use crate::aggregate::FamilyAggregates;
use crate::baseline::BaselineTable;
use crate::regression::config::GateConfig;
use crate::regression::verdict::Failure;

/// Outcome of comparing one metric mean against its baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricComparison {
    pub current: f64,
    pub baseline: f64,
    /// Smallest passing current mean; `None` when the baseline is non-positive
    pub allowed: Option<f64>,
    pub tolerance_pct: f64,
    pub passed: bool,
}

/// Compare `current` against `baseline` allowing a `tolerance_pct` drop
///
/// The boundary is inclusive: a current mean exactly at the allowed floor
/// passes.
pub fn compare_metric(current: f64, baseline: f64, tolerance_pct: f64) -> MetricComparison {
    if baseline <= 0.0 {
        return MetricComparison {
            current,
            baseline,
            allowed: None,
            tolerance_pct,
            passed: true,
        };
    }

    let allowed = baseline * (1.0 - tolerance_pct / 100.0);
    MetricComparison {
        current,
        baseline,
        allowed: Some(allowed),
        tolerance_pct,
        passed: current >= allowed,
    }
}

/// Compare every baseline group of a family against the current run
///
/// Groups present in the current run but absent from the baseline are not
/// compared. Returns the number of baseline groups examined.
pub fn compare_family(
    current: &FamilyAggregates,
    baseline: &BaselineTable,
    config: &GateConfig,
    failures: &mut Vec<Failure>,
) -> usize {
    let family = current.family();

    for (key, base_group) in baseline.groups() {
        let Some(group) = current.get(key) else {
            failures.push(Failure::MissingGroup {
                family,
                key: key.clone(),
            });
            continue;
        };

        for metric in family.metrics() {
            let (Some(cur), Some(base)) = (group.metric(metric.field), base_group.get(metric.field))
            else {
                continue;
            };

            let comparison =
                compare_metric(cur.mean, base.mean, config.tolerance_pct(metric.tolerance));
            tracing::trace!(
                family = family.tag(),
                key = %key,
                metric = metric.field,
                current = comparison.current,
                baseline = comparison.baseline,
                passed = comparison.passed,
                "tolerance check"
            );

            if let (false, Some(allowed)) = (comparison.passed, comparison.allowed) {
                failures.push(Failure::Tolerance {
                    label: metric.label,
                    key: key.clone(),
                    current: comparison.current,
                    baseline: comparison.baseline,
                    allowed,
                    tolerance_pct: comparison.tolerance_pct,
                });
            }
        }
    }

    baseline.len()
}
