//! Grade command.
//!
//! Restores evaluated picks into a pick book exactly as they were decided,
//! settles them against a results file and writes the settlements. Results
//! for unknown picks are logged and skipped; a pick listed twice is settled
//! once.

use anyhow::Result;
use betedge_core::Pick;
use betedge_data::{CsvStorage, PickBook};
use clap::Args;
use std::path::PathBuf;

use super::{load_config, parse_time, read_json, write_json};

/// Arguments for the grade command.
#[derive(Args, Debug, Clone)]
pub struct GradeArgs {
    /// Picks JSON written by `evaluate`
    #[arg(long)]
    pub picks: PathBuf,

    /// Game results CSV
    #[arg(long)]
    pub results: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "config/Betedge.toml")]
    pub config: PathBuf,

    /// Config profile overlay (reads Betedge.<profile>.toml)
    #[arg(long)]
    pub profile: Option<String>,

    /// Settlement time (RFC 3339, default: now)
    #[arg(long)]
    pub settled_at: Option<String>,

    /// Output settlements JSON
    #[arg(short, long, default_value = "settlements.json")]
    pub output: PathBuf,

    /// Also write settlements as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Counts from one grading run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GradeStats {
    pub settled: usize,
    pub skipped: usize,
}

/// Runs the grade command.
///
/// # Errors
/// Returns error if config or input files cannot be read or outputs cannot
/// be written.
pub fn run_grade(args: &GradeArgs) -> Result<GradeStats> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    let settled_at = parse_time(args.settled_at.as_deref())?;

    let picks: Vec<Pick> = read_json(&args.picks)?;
    let results = CsvStorage::read_game_results(&args.results)?;

    let book = PickBook::new(config.bankroll.initial_state());
    book.restore_all(picks);

    let mut stats = GradeStats::default();
    for record in &results {
        let closing = book
            .get(record.pick_id)
            .and_then(|pick| record.closing_line(&pick, settled_at));

        match book.settle(record.pick_id, record.result, closing.as_ref(), settled_at) {
            Ok(_) => stats.settled += 1,
            Err(err) => {
                tracing::warn!(pick_id = %record.pick_id, error = %err, "Could not settle pick");
                stats.skipped += 1;
            }
        }
    }

    let settlements = book.settlements();
    write_json(&args.output, &settlements)?;
    if let Some(csv) = &args.csv {
        CsvStorage::write_settlements(csv, &settlements)?;
    }

    let bankroll = book.bankroll();
    println!(
        "Settled {} picks ({} skipped). Balance: {} (exposure {})",
        settlements.len(),
        stats.skipped,
        bankroll.current_balance.round_dp(2),
        bankroll.active_exposure.round_dp(2)
    );

    tracing::info!(
        output = %args.output.display(),
        settled = stats.settled,
        skipped = stats.skipped,
        "Wrote settlements"
    );
    Ok(stats)
}
