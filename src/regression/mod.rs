// Benchmark regression gate
//
// Compares per-configuration aggregates of the current run against a
// recorded per-OS baseline. Two independent checks feed one verdict:
//
// - Tolerance: a current mean may drop at most `tol%` below the baseline
//   mean. Improvements always pass.
// - Variance: with at least three trials, stdev/mean must stay under an OS
//   dependent threshold, otherwise the mean itself is not trustworthy.
//
// Findings are accumulated and reported together; only malformed input is
// fatal.

mod config;
mod statistics;
mod tolerance;
mod variance;
mod verdict;

pub use config::{GateConfig, OsCategory};
pub use statistics::{mean, median, stdev, Aggregate};
pub use tolerance::{compare_family, compare_metric, MetricComparison};
pub use variance::{check_group, enforce_variance_bounds};
pub use verdict::{
    assess_gate, Failure, GateAssessment, GateVerdict, EXIT_PASS, EXIT_REGRESSION,
};
