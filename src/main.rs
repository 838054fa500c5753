use anyhow::{Context, Result};
use benchgate::aggregate::{aggregate, FamilyAggregates};
use benchgate::baseline::Baseline;
use benchgate::cli::Cli;
use benchgate::json_output::{summary_report, write_aggregates_ndjson};
use benchgate::ndjson::{load_records, Record};
use benchgate::provenance::Provenance;
use benchgate::regression::assess_gate;
use benchgate::schema::{self, MetricFamily};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; warnings always, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load a benchmark log and keep the trials of `family`
fn load_family(path: &Path, family: MetricFamily) -> Result<Vec<Record>> {
    let records = load_records(path)
        .with_context(|| format!("Failed to load {} benchmark log", family))?;
    let rows = schema::filter(records, family)
        .with_context(|| format!("Failed to filter {} records", family))?;
    schema::require(&rows, family)?;
    Ok(rows)
}

fn aggregate_family(rows: &[Record], family: MetricFamily) -> Result<FamilyAggregates> {
    aggregate(rows, family).with_context(|| format!("Failed to aggregate {} trials", family))
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.gate_config();

    // Schemas are not validated structurally; required fields are checked per record
    tracing::info!(
        am_schema = %args.am_schema.display(),
        cluster_schema = %args.cluster_schema.display(),
        "schema paths accepted"
    );

    let am_rows = load_family(&args.am, MetricFamily::Am)?;
    let cluster_rows = load_family(&args.cluster, MetricFamily::Cluster)?;

    let am = aggregate_family(&am_rows, MetricFamily::Am)?;
    let cluster = aggregate_family(&cluster_rows, MetricFamily::Cluster)?;

    let baseline = Baseline::load(&args.baseline_dir, &args.os)
        .with_context(|| format!("Failed to load baseline for OS '{}'", args.os))?;

    let assessment = assess_gate(&am, &cluster, &baseline, &config)?;

    let provenance = Provenance::collect(&args.cmake_cache);
    if let Err(e) = write_aggregates_ndjson(&args.output, &[&am, &cluster], &provenance) {
        tracing::warn!(
            path = %args.output.display(),
            error = %e,
            "failed to write aggregates NDJSON"
        );
    }

    print!("{}", summary_report(&[&am, &cluster]));
    print!("{}", assessment.to_report_string());

    Ok(ExitCode::from(assessment.verdict.exit_code()))
}
