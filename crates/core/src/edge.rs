//! Edge, expected value and recommendation tiering.
//!
//! ```text
//! edge     = model_prob - implied_prob
//! EV(s)    = p * (d - 1) * s - (1 - p) * s
//! ```
//!
//! Tiers are an ordered rule table evaluated top to bottom, first match wins.
//! A non-positive edge is always `NoPlay` regardless of the table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::odds;

/// Qualitative recommendation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongPlay,
    Play,
    Lean,
    NoPlay,
}

impl Recommendation {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongPlay => "STRONG_PLAY",
            Self::Play => "PLAY",
            Self::Lean => "LEAN",
            Self::NoPlay => "NO_PLAY",
        }
    }

    /// Whether this tier asks for a stake at all.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::NoPlay)
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the tier table. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRule {
    pub tier: Recommendation,
    pub min_edge: Decimal,
    pub min_confidence: Decimal,
}

impl TierRule {
    #[must_use]
    pub fn matches(&self, edge: Decimal, confidence: Decimal) -> bool {
        edge >= self.min_edge && confidence >= self.min_confidence
    }
}

/// Default tier table, strongest first.
#[must_use]
pub fn default_tiers() -> Vec<TierRule> {
    vec![
        TierRule {
            tier: Recommendation::StrongPlay,
            min_edge: Decimal::new(7, 2),
            min_confidence: Decimal::new(80, 2),
        },
        TierRule {
            tier: Recommendation::Play,
            min_edge: Decimal::new(5, 2),
            min_confidence: Decimal::new(70, 2),
        },
        TierRule {
            tier: Recommendation::Lean,
            min_edge: Decimal::new(3, 2),
            min_confidence: Decimal::new(60, 2),
        },
    ]
}

/// Edge and EV figures for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAnalysis {
    pub implied_prob: Decimal,
    pub model_prob: Decimal,
    pub edge: Decimal,
    /// Expected profit per unit staked.
    pub ev: Decimal,
    /// Expected profit per 100 units staked.
    pub ev_per_100: Decimal,
    pub recommendation: Recommendation,
}

/// Computes edge, EV and the recommendation tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeCalculator {
    tiers: Vec<TierRule>,
}

impl Default for EdgeCalculator {
    fn default() -> Self {
        Self::new(default_tiers())
    }
}

impl EdgeCalculator {
    /// Creates a calculator over an ordered tier table.
    #[must_use]
    pub fn new(tiers: Vec<TierRule>) -> Self {
        Self { tiers }
    }

    #[must_use]
    pub fn tiers(&self) -> &[TierRule] {
        &self.tiers
    }

    /// `model_prob - implied_prob`; may be negative.
    #[must_use]
    pub fn edge(model_prob: Decimal, implied_prob: Decimal) -> Decimal {
        model_prob - implied_prob
    }

    /// Expected profit of staking `stake` at `decimal_odds`.
    #[must_use]
    pub fn expected_value(model_prob: Decimal, decimal_odds: Decimal, stake: Decimal) -> Decimal {
        let win = model_prob * (decimal_odds - Decimal::ONE) * stake;
        let loss = (Decimal::ONE - model_prob) * stake;
        win - loss
    }

    /// Expected profit per 100 units staked.
    #[must_use]
    pub fn ev_per_100(model_prob: Decimal, decimal_odds: Decimal) -> Decimal {
        Self::expected_value(model_prob, decimal_odds, Decimal::ONE_HUNDRED)
    }

    /// Looks up the tier for an edge and confidence.
    #[must_use]
    pub fn recommend(&self, edge: Decimal, confidence: Decimal) -> Recommendation {
        if edge <= Decimal::ZERO {
            return Recommendation::NoPlay;
        }

        self.tiers
            .iter()
            .find(|rule| rule.matches(edge, confidence))
            .map_or(Recommendation::NoPlay, |rule| rule.tier)
    }

    /// Full analysis of one priced selection.
    ///
    /// # Errors
    /// Returns `InvalidOdds` if `decimal_odds` is not a valid price.
    pub fn analyze(
        &self,
        model_prob: Decimal,
        confidence: Decimal,
        decimal_odds: Decimal,
    ) -> Result<EdgeAnalysis> {
        odds::ensure_valid_price(decimal_odds)?;

        let implied_prob = odds::decimal_to_implied_probability(decimal_odds);
        let edge = Self::edge(model_prob, implied_prob);

        Ok(EdgeAnalysis {
            implied_prob,
            model_prob,
            edge,
            ev: Self::expected_value(model_prob, decimal_odds, Decimal::ONE),
            ev_per_100: Self::ev_per_100(model_prob, decimal_odds),
            recommendation: self.recommend(edge, confidence),
        })
    }
}
