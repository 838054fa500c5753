// Gate verdict assessment
//
// Failures are accumulated, never raised: a single run reports every
// regressed, missing and noisy group at once. The verdict is purely a
// function of whether anything was accumulated.

use crate::aggregate::{ConfigKey, FamilyAggregates};
use crate::baseline::Baseline;
use crate::error::GateError;
use crate::regression::config::GateConfig;
use crate::regression::tolerance::compare_family;
use crate::regression::variance::enforce_variance_bounds;
use crate::schema::MetricFamily;
use std::fmt;

/// Process exit status for a clean pass
pub const EXIT_PASS: u8 = 0;
/// Process exit status when any failure was accumulated
pub const EXIT_REGRESSION: u8 = 2;

/// One violated contract found during comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// A baseline group has no trials in the current run
    MissingGroup { family: MetricFamily, key: ConfigKey },

    /// A current mean dropped below the allowed floor
    Tolerance {
        label: &'static str,
        key: ConfigKey,
        current: f64,
        baseline: f64,
        allowed: f64,
        tolerance_pct: f64,
    },

    /// Trials of a group disagree beyond the OS variance threshold
    Variance {
        label: &'static str,
        key: ConfigKey,
        cv: f64,
        threshold: f64,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::MissingGroup { family, key } => {
                write!(f, "Missing {} group in current run: {}", family, key)
            }
            Failure::Tolerance {
                label,
                key,
                current,
                baseline,
                allowed,
                tolerance_pct,
            } => write!(
                f,
                "{}: current={:.2}, baseline={:.2}, allowed>= {:.2} (tol={:?}%) key={}",
                label, current, baseline, allowed, tolerance_pct, key
            ),
            Failure::Variance {
                label,
                key,
                cv,
                threshold,
            } => write!(
                f,
                "{} variance too high: stdev/mean={:.3} > {:.3} key={}",
                label, cv, threshold, key
            ),
        }
    }
}

/// Final gate verdict
#[derive(Debug, Clone, PartialEq)]
pub enum GateVerdict {
    Pass,
    Fail { failures: Vec<Failure> },
}

impl GateVerdict {
    pub fn from_failures(failures: Vec<Failure>) -> Self {
        if failures.is_empty() {
            GateVerdict::Pass
        } else {
            GateVerdict::Fail { failures }
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, GateVerdict::Pass)
    }

    pub fn failures(&self) -> &[Failure] {
        match self {
            GateVerdict::Pass => &[],
            GateVerdict::Fail { failures } => failures,
        }
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_pass() {
            EXIT_PASS
        } else {
            EXIT_REGRESSION
        }
    }
}

/// Detailed gate assessment
#[derive(Debug, Clone)]
pub struct GateAssessment {
    pub verdict: GateVerdict,

    /// Baseline groups compared, summed over both families
    pub baseline_groups: usize,
}

impl GateAssessment {
    /// Failure banner and enumerated failures; empty on a pass
    pub fn to_report_string(&self) -> String {
        let failures = self.verdict.failures();
        if failures.is_empty() {
            return String::new();
        }

        let mut report = String::from("\nPERF REGRESSION DETECTED:\n");
        for failure in failures {
            report.push_str(&format!(" -  {}\n", failure));
        }
        report
    }
}

/// Run the tolerance comparison and the variance bound for both families
///
/// Failure order: AM tolerance, Cluster tolerance, AM variance, Cluster
/// variance.
///
/// # Example
/// ```
/// use benchgate::aggregate::aggregate;
/// use benchgate::baseline::{Baseline, BaselineTable};
/// use benchgate::regression::{assess_gate, GateConfig};
/// use benchgate::schema::MetricFamily;
///
/// let am = aggregate(&[], MetricFamily::Am).unwrap();
/// let cluster = aggregate(&[], MetricFamily::Cluster).unwrap();
/// let baseline = Baseline {
///     am: BaselineTable::default(),
///     cluster: BaselineTable::default(),
/// };
///
/// let assessment = assess_gate(&am, &cluster, &baseline, &GateConfig::default()).unwrap();
/// assert!(assessment.verdict.is_pass());
/// ```
pub fn assess_gate(
    am: &FamilyAggregates,
    cluster: &FamilyAggregates,
    baseline: &Baseline,
    config: &GateConfig,
) -> Result<GateAssessment, GateError> {
    config.validate().map_err(GateError::InvalidConfig)?;

    let mut failures = Vec::new();
    let mut baseline_groups = 0;

    for current in [am, cluster] {
        let table = baseline.table(current.family());
        baseline_groups += compare_family(current, table, config, &mut failures);
    }
    let after_tolerance = failures.len();

    enforce_variance_bounds(am, config, &mut failures);
    enforce_variance_bounds(cluster, config, &mut failures);

    tracing::info!(
        baseline_groups,
        tolerance_failures = after_tolerance,
        variance_failures = failures.len() - after_tolerance,
        "gate assessed"
    );

    Ok(GateAssessment {
        verdict: GateVerdict::from_failures(failures),
        baseline_groups,
    })
}
