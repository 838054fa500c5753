// Configuration for the benchmark regression gate
//
// Tolerances are relative drops in percent. The variance threshold is a
// coefficient of variation chosen per OS category.

use crate::schema::ToleranceKind;
use serde::{Deserialize, Serialize};

/// Variance category of the runner OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsCategory {
    Linux,
    Macos,
    /// Windows and anything unrecognised
    Other,
}

impl OsCategory {
    /// Classify a runner identifier, ignoring case
    ///
    /// Only the known identifiers are recognised. Pinned images such as
    /// `ubuntu-22.04` or `macos-13` fall into [`OsCategory::Other`].
    pub fn from_identifier(os: &str) -> Self {
        match os.to_ascii_lowercase().as_str() {
            "ubuntu-latest" | "linux" => OsCategory::Linux,
            "macos-14" | "macos" | "macos-latest" => OsCategory::Macos,
            _ => OsCategory::Other,
        }
    }

    /// Largest admissible stdev/mean for groups with enough trials
    pub fn variance_threshold(self) -> f64 {
        match self {
            OsCategory::Linux => 0.10,
            OsCategory::Macos => 0.20,
            OsCategory::Other => 0.25,
        }
    }
}

/// Configuration for one gate run
///
/// # Example
/// ```
/// use benchgate::regression::GateConfig;
///
/// let config = GateConfig::for_os("ubuntu-latest", 10.0, 15.0);
/// assert_eq!(config.variance_threshold, 0.10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Allowed relative drop (percent) for throughput metrics
    pub tol_qps_pct: f64,

    /// Allowed relative drop (percent) for effective bandwidth
    pub tol_gbps_pct: f64,

    /// Maximum coefficient of variation before a group is rejected as noisy
    pub variance_threshold: f64,

    /// Groups with fewer trials are exempt from the variance bound
    pub min_variance_trials: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            tol_qps_pct: 10.0,
            tol_gbps_pct: 10.0,
            variance_threshold: OsCategory::Other.variance_threshold(),
            min_variance_trials: 3,
        }
    }
}

impl GateConfig {
    pub fn for_os(os: &str, tol_qps_pct: f64, tol_gbps_pct: f64) -> Self {
        Self {
            tol_qps_pct,
            tol_gbps_pct,
            variance_threshold: OsCategory::from_identifier(os).variance_threshold(),
            ..Self::default()
        }
    }

    /// Tolerance percentage governing a metric
    pub fn tolerance_pct(&self, kind: ToleranceKind) -> f64 {
        match kind {
            ToleranceKind::Throughput => self.tol_qps_pct,
            ToleranceKind::Bandwidth => self.tol_gbps_pct,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        for (flag, value) in [("tol-qps", self.tol_qps_pct), ("tol-gbps", self.tol_gbps_pct)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "{} must be a non-negative percentage, got {}",
                    flag, value
                ));
            }
        }

        if !(self.variance_threshold.is_finite() && self.variance_threshold > 0.0) {
            return Err(format!(
                "variance_threshold must be positive, got {}",
                self.variance_threshold
            ));
        }

        if self.min_variance_trials < 2 {
            return Err(format!(
                "min_variance_trials must be >= 2, got {}",
                self.min_variance_trials
            ));
        }

        Ok(())
    }
}
