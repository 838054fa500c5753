// Variance admissibility for repeated trials
//
// A mean is only worth comparing if the trials behind it agree with each
// other. Groups with enough trials whose coefficient of variation exceeds
// the OS threshold are rejected outright.

use crate::aggregate::{FamilyAggregates, GroupAggregate};
use crate::regression::config::GateConfig;
use crate::regression::verdict::Failure;
use crate::schema::MetricSpec;

/// Check one group against the variance bound
pub fn check_group(
    group: &GroupAggregate,
    metrics: &[MetricSpec],
    config: &GateConfig,
) -> Vec<Failure> {
    if group.trials < config.min_variance_trials {
        return Vec::new();
    }

    metrics
        .iter()
        .filter_map(|metric| {
            let cv = group.metric(metric.field)?.coefficient_of_variation()?;
            (cv > config.variance_threshold).then(|| Failure::Variance {
                label: metric.label,
                key: group.key.clone(),
                cv,
                threshold: config.variance_threshold,
            })
        })
        .collect()
}

/// Enforce the variance bound on every current-run group of a family
pub fn enforce_variance_bounds(
    current: &FamilyAggregates,
    config: &GateConfig,
    failures: &mut Vec<Failure>,
) {
    let metrics = current.family().metrics();
    let mut exempt = 0usize;

    for group in current.groups() {
        if group.trials < config.min_variance_trials {
            exempt += 1;
            continue;
        }
        failures.extend(check_group(group, metrics, config));
    }

    if exempt > 0 {
        tracing::debug!(
            family = current.family().tag(),
            exempt,
            min_trials = config.min_variance_trials,
            "groups exempt from variance bound"
        );
    }
}
