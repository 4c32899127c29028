//! CSV feeds in and out of the engine.
//!
//! Input files carry a header row. Numbers are read as strings and parsed to
//! `Decimal` so prices keep their exact quoted value.

use anyhow::{anyhow, bail, Context, Result};
use betedge_core::odds::american_to_decimal;
use betedge_core::{GameResult, MarketLine, MarketType, ModelEstimate, Pick, Settlement};
use chrono::{DateTime, Utc};
use csv::{Reader, Writer};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

/// Columns: `game_id,bookmaker,market_type,selection,price,american,point,observed_at`.
/// Either `price` (decimal odds) or `american` must be set.
#[derive(Debug, Deserialize)]
struct MarketLineRow {
    game_id: String,
    bookmaker: String,
    market_type: String,
    selection: String,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    american: Option<i64>,
    #[serde(default)]
    point: Option<String>,
    observed_at: DateTime<Utc>,
}

/// Columns: `game_id,market_type,selection,probability,confidence`.
#[derive(Debug, Deserialize)]
struct ModelEstimateRow {
    game_id: String,
    market_type: String,
    selection: String,
    probability: String,
    confidence: String,
}

/// Columns: `pick_id,result,closing_price,closing_point,closing_observed_at`.
#[derive(Debug, Deserialize)]
struct GameResultRow {
    pick_id: Uuid,
    result: String,
    #[serde(default)]
    closing_price: Option<String>,
    #[serde(default)]
    closing_point: Option<String>,
    #[serde(default)]
    closing_observed_at: Option<DateTime<Utc>>,
}

/// A graded outcome for one pick, with the closing price if it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResultRecord {
    pub pick_id: Uuid,
    pub result: GameResult,
    pub closing_price: Option<Decimal>,
    pub closing_point: Option<Decimal>,
    pub closing_observed_at: Option<DateTime<Utc>>,
}

impl GameResultRecord {
    /// Closing line for the pick's selection, if a closing price was given.
    #[must_use]
    pub fn closing_line(&self, pick: &Pick, settled_at: DateTime<Utc>) -> Option<MarketLine> {
        self.closing_price.map(|price| MarketLine {
            game_id: pick.game_id.clone(),
            bookmaker: pick.bookmaker.clone(),
            market_type: pick.market_type,
            selection: pick.selection.clone(),
            price,
            point: self.closing_point,
            observed_at: self.closing_observed_at.unwrap_or(settled_at),
        })
    }
}

pub struct CsvStorage;

impl CsvStorage {
    /// Reads market snapshots.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or a row is malformed.
    /// Price validity is left to the evaluator so one bad quote does not
    /// reject the whole feed.
    pub fn read_market_lines(path: impl AsRef<Path>) -> Result<Vec<MarketLine>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        let mut lines = Vec::new();

        for (row_no, row) in reader.deserialize::<MarketLineRow>().enumerate() {
            let row = row.with_context(|| row_context(path, row_no))?;
            let price = match (&row.price, row.american) {
                (Some(price), _) => parse_decimal(price, "price"),
                (None, Some(american)) => american_to_decimal(american).map_err(Into::into),
                (None, None) => Err(anyhow!("either price or american must be set")),
            }
            .with_context(|| row_context(path, row_no))?;

            lines.push(MarketLine {
                market_type: parse_market_type(&row.market_type)
                    .with_context(|| row_context(path, row_no))?,
                game_id: row.game_id,
                bookmaker: row.bookmaker,
                selection: row.selection,
                price,
                point: row
                    .point
                    .as_deref()
                    .map(|p| parse_decimal(p, "point"))
                    .transpose()
                    .with_context(|| row_context(path, row_no))?,
                observed_at: row.observed_at,
            });
        }

        tracing::debug!(path = %path.display(), rows = lines.len(), "Read market lines");
        Ok(lines)
    }

    /// Reads model estimates.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or a row is malformed.
    pub fn read_model_estimates(path: impl AsRef<Path>) -> Result<Vec<ModelEstimate>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        let mut estimates = Vec::new();

        for (row_no, row) in reader.deserialize::<ModelEstimateRow>().enumerate() {
            let row = row.with_context(|| row_context(path, row_no))?;
            let estimate = ModelEstimate {
                market_type: parse_market_type(&row.market_type)
                    .with_context(|| row_context(path, row_no))?,
                probability: parse_decimal(&row.probability, "probability")
                    .with_context(|| row_context(path, row_no))?,
                confidence: parse_decimal(&row.confidence, "confidence")
                    .with_context(|| row_context(path, row_no))?,
                game_id: row.game_id,
                selection: row.selection,
            };
            estimates.push(estimate);
        }

        tracing::debug!(path = %path.display(), rows = estimates.len(), "Read model estimates");
        Ok(estimates)
    }

    /// Reads game results keyed by pick id.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, a row is malformed or a
    /// result is not one of win/loss/push.
    pub fn read_game_results(path: impl AsRef<Path>) -> Result<Vec<GameResultRecord>> {
        let path = path.as_ref();
        let mut reader = open_reader(path)?;
        let mut results = Vec::new();

        for (row_no, row) in reader.deserialize::<GameResultRow>().enumerate() {
            let row = row.with_context(|| row_context(path, row_no))?;
            let Some(result) = GameResult::parse(&row.result) else {
                bail!("{}: unknown result '{}'", row_context(path, row_no), row.result);
            };
            results.push(GameResultRecord {
                pick_id: row.pick_id,
                result,
                closing_price: row
                    .closing_price
                    .as_deref()
                    .map(|p| parse_decimal(p, "closing_price"))
                    .transpose()
                    .with_context(|| row_context(path, row_no))?,
                closing_point: row
                    .closing_point
                    .as_deref()
                    .map(|p| parse_decimal(p, "closing_point"))
                    .transpose()
                    .with_context(|| row_context(path, row_no))?,
                closing_observed_at: row.closing_observed_at,
            });
        }

        Ok(results)
    }

    /// Writes picks, one row each, in the order given.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_picks(path: impl AsRef<Path>, picks: &[Pick]) -> Result<()> {
        let path = path.as_ref();
        let mut writer = create_writer(path)?;

        writer.write_record([
            "pick_id",
            "game_id",
            "bookmaker",
            "market_type",
            "selection",
            "odds",
            "point",
            "implied_prob",
            "model_prob",
            "confidence",
            "edge",
            "ev",
            "ev_per_100",
            "recommendation",
            "stake_fraction",
            "stake_amount",
            "risk_level",
            "decision",
            "status",
            "reasons",
            "warnings",
            "observed_at",
            "evaluated_at",
        ])?;

        for pick in picks {
            writer.write_record(&[
                pick.id.to_string(),
                pick.game_id.clone(),
                pick.bookmaker.clone(),
                pick.market_type.as_str().to_string(),
                pick.selection.clone(),
                pick.odds.to_string(),
                opt_to_string(pick.point),
                pick.implied_prob.round_dp(6).to_string(),
                pick.model_prob.to_string(),
                pick.confidence.to_string(),
                pick.edge.round_dp(6).to_string(),
                pick.ev.round_dp(6).to_string(),
                pick.ev_per_100.round_dp(2).to_string(),
                pick.recommendation.as_str().to_string(),
                pick.stake_fraction.round_dp(6).to_string(),
                pick.stake_amount.round_dp(2).to_string(),
                pick.risk_level.as_str().to_string(),
                pick.decision.as_str().to_string(),
                pick.status.as_str().to_string(),
                pick.reason_strings().join("; "),
                pick.warnings.join("; "),
                pick.observed_at.to_rfc3339(),
                pick.evaluated_at.to_rfc3339(),
            ])?;
        }

        writer.flush()?;
        tracing::debug!(path = %path.display(), rows = picks.len(), "Wrote picks");
        Ok(())
    }

    /// Writes settlements, one row each.
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_settlements(path: impl AsRef<Path>, settlements: &[Settlement]) -> Result<()> {
        let path = path.as_ref();
        let mut writer = create_writer(path)?;

        writer.write_record([
            "pick_id",
            "result",
            "market_type",
            "stake",
            "odds",
            "profit",
            "closing_odds",
            "closing_point",
            "clv",
            "settled_at",
        ])?;

        for s in settlements {
            writer.write_record(&[
                s.pick_id.to_string(),
                s.result.as_str().to_string(),
                s.market_type.as_str().to_string(),
                s.stake.round_dp(2).to_string(),
                s.odds.to_string(),
                s.profit.round_dp(2).to_string(),
                opt_to_string(s.closing_odds),
                opt_to_string(s.closing_point),
                opt_to_string(s.clv.map(|c| c.round_dp(2))),
                s.settled_at.to_rfc3339(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn open_reader(path: &Path) -> Result<Reader<File>> {
    Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))
}

fn create_writer(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    Ok(Writer::from_writer(file))
}

fn row_context(path: &Path, row_no: usize) -> String {
    // +2: header line, 1-based
    format!("{} line {}", path.display(), row_no + 2)
}

fn parse_decimal(raw: &str, field: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).with_context(|| format!("invalid {field} '{raw}'"))
}

fn parse_market_type(raw: &str) -> Result<MarketType> {
    MarketType::parse(raw.trim()).ok_or_else(|| anyhow!("unknown market type '{raw}'"))
}

fn opt_to_string(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
