//! Load-test results summarizer
//!
//! Reads a Locust-style stats CSV (per-endpoint request/failure counts,
//! latency columns and percentiles) plus an optional failures CSV, prints
//! per-endpoint and aggregate summaries, and flags endpoints breaching a
//! p95 threshold.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Name of the roll-up row Locust appends to its stats CSV
const AGGREGATED_ROW: &str = "Aggregated";

#[derive(Debug, clap::Parser)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "Load-test results summarizer")]
struct Cli {
    /// Stats CSV with per-endpoint rows
    stats: PathBuf,

    /// Failures CSV (per-error occurrence counts)
    #[clap(long)]
    failures: Option<PathBuf>,

    /// Flag endpoints whose p95 exceeds this many milliseconds
    #[clap(long)]
    p95_threshold_ms: Option<f64>,

    /// Write the summary as CSV to this path
    #[clap(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Request Count")]
    request_count: u64,
    #[serde(rename = "Failure Count")]
    failure_count: u64,
    #[serde(rename = "Average Response Time")]
    average_response_time: f64,
    #[serde(rename = "Min Response Time", default)]
    min_response_time: f64,
    #[serde(rename = "Max Response Time", default)]
    max_response_time: f64,
    #[serde(rename = "50%")]
    p50: f64,
    #[serde(rename = "95%")]
    p95: f64,
    #[serde(rename = "99%")]
    p99: f64,
}

#[derive(Debug, Deserialize)]
struct FailureRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Error")]
    error: String,
    #[serde(rename = "Occurrences")]
    occurrences: u64,
}

#[derive(Debug, Clone, Serialize)]
struct EndpointSummary {
    name: String,
    requests: u64,
    failures: u64,
    failure_rate_pct: f64,
    avg_ms: f64,
    min_ms: f64,
    max_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
}

impl From<&StatsRow> for EndpointSummary {
    fn from(row: &StatsRow) -> Self {
        let failure_rate_pct = if row.request_count > 0 {
            row.failure_count as f64 / row.request_count as f64 * 100.0
        } else {
            0.0
        };
        Self {
            name: row.name.clone(),
            requests: row.request_count,
            failures: row.failure_count,
            failure_rate_pct,
            avg_ms: row.average_response_time,
            min_ms: row.min_response_time,
            max_ms: row.max_response_time,
            p50_ms: row.p50,
            p95_ms: row.p95,
            p99_ms: row.p99,
        }
    }
}

fn read_stats<R: std::io::Read>(reader: R) -> Result<Vec<StatsRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: StatsRow = record.context("malformed stats row")?;
        if row.name != AGGREGATED_ROW {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn read_failures<R: std::io::Read>(reader: R) -> Result<Vec<FailureRow>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        rows.push(record.context("malformed failures row")?);
    }
    Ok(rows)
}

/// Request-weighted roll-up of the endpoint summaries
///
/// Percentiles cannot be combined exactly across endpoints, so the aggregate
/// carries the request-weighted average of each percentile column.
fn aggregate(summaries: &[EndpointSummary]) -> Option<EndpointSummary> {
    let total_requests: u64 = summaries.iter().map(|s| s.requests).sum();
    if total_requests == 0 {
        return None;
    }
    let total_failures: u64 = summaries.iter().map(|s| s.failures).sum();

    let weighted = |select: fn(&EndpointSummary) -> f64| {
        summaries
            .iter()
            .map(|s| select(s) * s.requests as f64)
            .sum::<f64>()
            / total_requests as f64
    };

    Some(EndpointSummary {
        name: AGGREGATED_ROW.to_string(),
        requests: total_requests,
        failures: total_failures,
        failure_rate_pct: total_failures as f64 / total_requests as f64 * 100.0,
        avg_ms: weighted(|s| s.avg_ms),
        min_ms: summaries
            .iter()
            .map(|s| s.min_ms)
            .fold(f64::INFINITY, f64::min),
        max_ms: summaries.iter().map(|s| s.max_ms).fold(0.0, f64::max),
        p50_ms: weighted(|s| s.p50_ms),
        p95_ms: weighted(|s| s.p95_ms),
        p99_ms: weighted(|s| s.p99_ms),
    })
}

fn breaching<'a>(
    summaries: &'a [EndpointSummary],
    threshold_ms: f64,
) -> Vec<&'a EndpointSummary> {
    summaries
        .iter()
        .filter(|s| s.p95_ms > threshold_ms)
        .collect()
}

fn print_summary(summary: &EndpointSummary) {
    println!(
        "{:<40} {:>9} {:>9} {:>7.2}% {:>9.1} {:>9.1} {:>9.1} {:>9.1}",
        summary.name,
        summary.requests,
        summary.failures,
        summary.failure_rate_pct,
        summary.avg_ms,
        summary.p50_ms,
        summary.p95_ms,
        summary.p99_ms,
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let stats_file = File::open(&cli.stats)
        .with_context(|| format!("cannot open stats file {}", cli.stats.display()))?;
    let rows = read_stats(stats_file)?;
    if rows.is_empty() {
        println!("No endpoint rows found in {}", cli.stats.display());
        return Ok(());
    }

    let summaries: Vec<EndpointSummary> = rows.iter().map(Into::into).collect();

    println!("===== Load Test Results =====");
    println!(
        "{:<40} {:>9} {:>9} {:>8} {:>9} {:>9} {:>9} {:>9}",
        "Endpoint", "Requests", "Failures", "Fail%", "Avg(ms)", "p50(ms)", "p95(ms)", "p99(ms)"
    );
    for summary in &summaries {
        print_summary(summary);
    }

    let rollup = aggregate(&summaries);
    if let Some(rollup) = &rollup {
        println!();
        print_summary(rollup);
    }

    if let Some(threshold_ms) = cli.p95_threshold_ms {
        let slow = breaching(&summaries, threshold_ms);
        println!();
        if slow.is_empty() {
            println!("All endpoints under the p95 threshold of {} ms", threshold_ms);
        } else {
            println!("Endpoints over the p95 threshold of {} ms:", threshold_ms);
            for summary in slow {
                println!("  {} (p95 {:.1} ms)", summary.name, summary.p95_ms);
            }
        }
    }

    if let Some(failures_path) = &cli.failures {
        let failures_file = File::open(failures_path)
            .with_context(|| format!("cannot open failures file {}", failures_path.display()))?;
        let failure_rows = read_failures(failures_file)?;

        let mut by_error: BTreeMap<String, u64> = BTreeMap::new();
        for row in &failure_rows {
            *by_error
                .entry(format!("{}: {}", row.name, row.error))
                .or_insert(0) += row.occurrences;
        }

        println!();
        if by_error.is_empty() {
            println!("No failures recorded.");
        } else {
            println!("Failures:");
            let mut entries: Vec<_> = by_error.into_iter().collect();
            entries.sort_by(|a, b| b.1.cmp(&a.1));
            for (error, occurrences) in entries {
                println!("  {:>7}  {}", occurrences, error);
            }
        }
    }

    if let Some(out_path) = &cli.out {
        let mut writer = csv::Writer::from_path(out_path)
            .with_context(|| format!("cannot write {}", out_path.display()))?;
        for summary in &summaries {
            writer.serialize(summary)?;
        }
        if let Some(rollup) = &rollup {
            writer.serialize(rollup)?;
        }
        writer.flush()?;
        println!("\nSummary written to {}", out_path.display());
    }

    Ok(())
}
