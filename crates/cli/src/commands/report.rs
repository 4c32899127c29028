//! Report command.

use anyhow::{Context, Result};
use betedge_core::Settlement;
use betedge_performance::{PerformanceReport, PerformanceSummary, PerformanceTracker};
use clap::Args;
use std::path::PathBuf;

use super::{parse_time, read_json, write_json};

/// Arguments for the report command.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Settlements JSON written by `grade`
    #[arg(long)]
    pub settlements: PathBuf,

    /// First settlement time counted toward the season (RFC 3339)
    #[arg(long)]
    pub season_start: Option<String>,

    /// Output report JSON (default: print to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Runs the report command.
///
/// # Errors
/// Returns error if the settlements file cannot be read or the report cannot
/// be written.
pub fn run_report(args: &ReportArgs) -> Result<PerformanceReport> {
    let settlements: Vec<Settlement> = read_json(&args.settlements)?;

    let tracker = match &args.season_start {
        Some(raw) => PerformanceTracker::with_season_start(parse_time(Some(raw))?),
        None => PerformanceTracker::new(),
    };
    let report = tracker.report(&settlements, parse_time(None)?);

    match &args.output {
        Some(path) => {
            write_json(path, &report)?;
            print_window("Last 10", &report.last_10);
            print_window("Last 30", &report.last_30);
            print_window("Season", &report.season);
            for (market, summary) in &report.by_market {
                print_window(market.as_str(), summary);
            }
        }
        None => {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize performance report")?;
            println!("{json}");
        }
    }

    Ok(report)
}

fn print_window(label: &str, summary: &PerformanceSummary) {
    let clv = summary
        .avg_clv
        .map_or_else(|| "-".to_string(), |c| format!("{}%", c.round_dp(2)));
    println!(
        "{:<10} bets {:>4}  W-L-P {}-{}-{}  win {:>6}%  ROI {:>7}%  yield {:>7}%  CLV {:>8}  maxDD {}",
        label,
        summary.bets,
        summary.wins,
        summary.losses,
        summary.pushes,
        summary.win_rate.round_dp(1),
        summary.roi.round_dp(2),
        summary.yield_pct.round_dp(2),
        clv,
        summary.max_drawdown.round_dp(2),
    );
}
