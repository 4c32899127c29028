//! Market snapshots and model estimates consumed by the engine.
//!
//! Both types are supplied by external feeds. A [`MarketLine`] is an immutable
//! snapshot: newer snapshots supersede older ones, nothing mutates them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EngineError, Result};
use crate::odds;

/// Kind of market a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Straight winner market.
    Moneyline,
    /// Point spread / handicap market.
    Spread,
    /// Over/under market.
    Total,
}

impl MarketType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Moneyline => "moneyline",
            Self::Spread => "spread",
            Self::Total => "total",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moneyline" | "h2h" => Some(Self::Moneyline),
            "spread" | "spreads" => Some(Self::Spread),
            "total" | "totals" => Some(Self::Total),
            _ => None,
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one side of one market of one game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub game_id: String,
    pub market_type: MarketType,
    pub selection: String,
}

/// A bookmaker price snapshot for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketLine {
    /// Game the line belongs to.
    pub game_id: String,
    /// Bookmaker quoting the price.
    pub bookmaker: String,
    /// Market kind.
    pub market_type: MarketType,
    /// Side being priced (team name, "over", "under", ...).
    pub selection: String,
    /// Decimal odds in `(1, MAX_DECIMAL_PRICE]`.
    pub price: Decimal,
    /// Spread or total line; absent for moneylines.
    pub point: Option<Decimal>,
    /// When the snapshot was taken.
    pub observed_at: DateTime<Utc>,
}

impl MarketLine {
    /// Key used to join this line with a model estimate.
    #[must_use]
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            game_id: self.game_id.clone(),
            market_type: self.market_type,
            selection: self.selection.clone(),
        }
    }

    /// Validates the price.
    ///
    /// # Errors
    /// Returns `InvalidOdds` if the price is outside `(1, MAX_DECIMAL_PRICE]`.
    pub fn validate(&self) -> Result<()> {
        odds::ensure_valid_price(self.price)
    }

    /// Market-implied probability of this selection.
    #[must_use]
    pub fn implied_probability(&self) -> Decimal {
        odds::decimal_to_implied_probability(self.price)
    }
}

/// Externally supplied win-probability estimate for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    pub game_id: String,
    pub market_type: MarketType,
    pub selection: String,
    /// Estimated probability that the selection wins, in [0, 1].
    pub probability: Decimal,
    /// Model confidence in the estimate, in [0, 1].
    pub confidence: Decimal,
}

impl ModelEstimate {
    /// Key used to join this estimate with a market line.
    #[must_use]
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            game_id: self.game_id.clone(),
            market_type: self.market_type,
            selection: self.selection.clone(),
        }
    }

    /// Validates probability and confidence ranges.
    ///
    /// # Errors
    /// Returns `InvalidProbability` naming the first field outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("probability", self.probability)?;
        ensure_unit_interval("confidence", self.confidence)
    }
}

fn ensure_unit_interval(field: &'static str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(EngineError::InvalidProbability { field, value });
    }
    Ok(())
}

/// Returns the newest snapshot for `key` observed at or before `as_of`.
///
/// Ties on `observed_at` resolve to the later element in `lines`.
#[must_use]
pub fn latest_snapshot<'a>(
    lines: &'a [MarketLine],
    key: &SelectionKey,
    as_of: DateTime<Utc>,
) -> Option<&'a MarketLine> {
    lines
        .iter()
        .filter(|l| l.observed_at <= as_of)
        .filter(|l| {
            l.game_id == key.game_id
                && l.market_type == key.market_type
                && l.selection == key.selection
        })
        .max_by_key(|l| l.observed_at)
}
