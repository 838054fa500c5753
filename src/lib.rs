//! benchgate - benchmark regression gate for CI
//!
//! Ingests repeated micro-benchmark trials (AM and Cluster workloads),
//! aggregates them per configuration, compares the aggregates against a
//! recorded per-OS baseline with one-sided tolerances, and rejects groups
//! whose trial-to-trial variance is too high to trust.

pub mod aggregate;
pub mod baseline;
pub mod cli;
pub mod error;
pub mod json_output;
pub mod ndjson;
pub mod provenance;
pub mod regression;
pub mod schema;
