//! CLI argument parsing for benchgate

use crate::json_output::DEFAULT_ARTIFACT;
use crate::provenance::DEFAULT_CMAKE_CACHE;
use crate::regression::GateConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "benchgate")]
#[command(version)]
#[command(
    about = "Gate CI runs on benchmark regressions against a recorded per-OS baseline",
    long_about = None
)]
pub struct Cli {
    /// NDJSON log of AM (associative memory) benchmark trials
    #[arg(long = "am", value_name = "PATH")]
    pub am: PathBuf,

    /// NDJSON log of Cluster benchmark trials
    #[arg(long = "cluster", value_name = "PATH")]
    pub cluster: PathBuf,

    /// AM record schema (informational; required fields are checked directly)
    #[arg(long = "am-schema", value_name = "PATH")]
    pub am_schema: PathBuf,

    /// Cluster record schema (informational; required fields are checked directly)
    #[arg(long = "cluster-schema", value_name = "PATH")]
    pub cluster_schema: PathBuf,

    /// Root of the baseline store (contains linux/, windows/, macos/)
    #[arg(long = "baseline-dir", value_name = "DIR")]
    pub baseline_dir: PathBuf,

    /// Runner OS identifier (e.g. ubuntu-latest, windows-latest, macos-latest)
    #[arg(long = "os", value_name = "OS")]
    pub os: String,

    /// Allowed throughput drop in percent (AM qps, Cluster updates/finalizes)
    #[arg(long = "tol-qps", value_name = "PCT", allow_negative_numbers = true)]
    pub tol_qps: f64,

    /// Allowed AM effective bandwidth drop in percent
    #[arg(long = "tol-gbps", value_name = "PCT", allow_negative_numbers = true)]
    pub tol_gbps: f64,

    /// Where to write the aggregate artifact
    #[arg(long = "output", value_name = "PATH", default_value = DEFAULT_ARTIFACT)]
    pub output: PathBuf,

    /// CMake cache probed for compiler provenance
    #[arg(long = "cmake-cache", value_name = "PATH", default_value = DEFAULT_CMAKE_CACHE)]
    pub cmake_cache: PathBuf,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    pub fn gate_config(&self) -> GateConfig {
        GateConfig::for_os(&self.os, self.tol_qps, self.tol_gbps)
    }
}
