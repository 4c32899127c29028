//! Evaluate command.
//!
//! Joins a market line feed with model estimates, records the resulting picks
//! against a fresh bankroll and prints the value board.

use anyhow::Result;
use betedge_core::{Pick, PickEvaluator};
use betedge_data::{CsvStorage, PickBook};
use chrono::{DateTime, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::{load_config, parse_time, write_json};

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Market lines CSV
    #[arg(long)]
    pub lines: PathBuf,

    /// Model estimates CSV
    #[arg(long)]
    pub estimates: PathBuf,

    /// Config file path
    #[arg(short, long, default_value = "config/Betedge.toml")]
    pub config: PathBuf,

    /// Config profile overlay (reads Betedge.<profile>.toml)
    #[arg(long)]
    pub profile: Option<String>,

    /// Evaluation time (RFC 3339, default: now)
    #[arg(long)]
    pub now: Option<String>,

    /// Output picks JSON
    #[arg(short, long, default_value = "picks.json")]
    pub output: PathBuf,

    /// Also write picks as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

/// Runs the evaluate command.
///
/// # Errors
/// Returns error if config or input files cannot be read or outputs cannot
/// be written. Lines with invalid odds are logged and skipped.
pub fn run_evaluate(args: &EvaluateArgs) -> Result<()> {
    let config = load_config(&args.config, args.profile.as_deref())?;
    let now = parse_time(args.now.as_deref())?;

    let lines = CsvStorage::read_market_lines(&args.lines)?;
    let estimates = CsvStorage::read_model_estimates(&args.estimates)?;
    tracing::info!(
        lines = lines.len(),
        estimates = estimates.len(),
        "Loaded feeds"
    );

    let evaluator = PickEvaluator::new(&config);
    let book = PickBook::new(config.bankroll.initial_state());
    let batch = evaluator.evaluate_batch(&lines, &estimates, &book.bankroll(), now);
    let picks = book.record_all(batch.picks);

    write_json(&args.output, &picks)?;
    if let Some(csv) = &args.csv {
        CsvStorage::write_picks(csv, &picks)?;
    }

    print_summary(&book, now, batch.rejected.len(), batch.missing_estimates);
    print_value_board(&book.value_board());

    tracing::info!(output = %args.output.display(), picks = picks.len(), "Wrote picks");
    Ok(())
}

fn print_summary(book: &PickBook, now: DateTime<Utc>, rejected: usize, missing: usize) {
    let today = book.picks_on(now.date_naive());
    let bets = today.iter().filter(|p| p.is_bet()).count();
    let bankroll = book.bankroll();

    println!(
        "Picks on {}: {} ({} BET, {} PASS)",
        now.date_naive(),
        today.len(),
        bets,
        today.len() - bets
    );
    println!("Rejected lines: {rejected}, lines without estimate: {missing}");
    println!(
        "Exposure: {} / {} (available {})",
        bankroll.active_exposure.round_dp(2),
        bankroll.daily_limit().round_dp(2),
        bankroll.available_exposure().round_dp(2)
    );
}

fn print_value_board(board: &[Pick]) {
    if board.is_empty() {
        println!("\nNo bets on the value board.");
        return;
    }

    println!("\n=== Value Board ===");
    println!(
        "{:<4} {:<24} {:<10} {:<14} {:>7} {:>8} {:>8} {:>12} {:>8} {:>6}",
        "#", "Game", "Market", "Selection", "Odds", "Edge%", "EV/100", "Tier", "Stake", "Risk"
    );
    for (rank, pick) in board.iter().enumerate() {
        println!(
            "{:<4} {:<24} {:<10} {:<14} {:>7} {:>8} {:>8} {:>12} {:>8} {:>6}",
            rank + 1,
            pick.game_id,
            pick.market_type.as_str(),
            pick.selection,
            pick.odds.round_dp(3),
            (pick.edge * Decimal::ONE_HUNDRED).round_dp(2),
            pick.ev_per_100.round_dp(2),
            pick.recommendation.as_str(),
            pick.stake_amount.round_dp(2),
            pick.risk_level.as_str(),
        );
        for warning in &pick.warnings {
            println!("     ! {warning}");
        }
    }
}
