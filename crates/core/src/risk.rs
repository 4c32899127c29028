//! Per-bet and portfolio exposure guards.
//!
//! `should_skip_bet` walks an ordered rule table; the first rule that fires
//! decides the skip reason. `assess_risk_level` grades a stake relative to the
//! bankroll.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RiskConfig;
use crate::percent;

/// Risk grade of a stake. Ordered so `max` escalates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Why a bet should be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoEdge,
    EdgeTooSmall { min_edge: Decimal },
    ConfidenceTooLow { min_confidence: Decimal },
    ExceedsDailyLimit,
    StakeTooLarge { max_stake_pct: Decimal },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEdge => f.write_str("No edge or negative expectation"),
            Self::EdgeTooSmall { min_edge } => {
                write!(f, "Edge too small (<{}%)", percent(*min_edge))
            }
            Self::ConfidenceTooLow { min_confidence } => {
                write!(f, "Confidence too low (<{}%)", percent(*min_confidence))
            }
            Self::ExceedsDailyLimit => f.write_str("Would exceed daily exposure limit"),
            Self::StakeTooLarge { max_stake_pct } => {
                write!(f, "Stake >{}% of bankroll - too risky", percent(*max_stake_pct))
            }
        }
    }
}

/// Outcome of the skip check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkipDecision {
    pub skip: bool,
    pub reason: Option<SkipReason>,
}

impl SkipDecision {
    fn proceed() -> Self {
        Self {
            skip: false,
            reason: None,
        }
    }

    fn skip(reason: SkipReason) -> Self {
        Self {
            skip: true,
            reason: Some(reason),
        }
    }
}

/// Inputs to the skip check for one candidate bet.
#[derive(Debug, Clone, Copy)]
pub struct ExposureCheck {
    pub edge: Decimal,
    pub confidence: Decimal,
    pub stake: Decimal,
    pub bankroll: Decimal,
    pub active_exposure: Decimal,
    pub daily_limit: Decimal,
}

type SkipRule = fn(&RiskConfig, &ExposureCheck) -> Option<SkipReason>;

/// Skip rules in priority order.
const SKIP_RULES: [SkipRule; 5] = [
    no_edge,
    edge_too_small,
    confidence_too_low,
    exceeds_daily_limit,
    stake_too_large,
];

fn no_edge(_: &RiskConfig, c: &ExposureCheck) -> Option<SkipReason> {
    (c.edge <= Decimal::ZERO).then_some(SkipReason::NoEdge)
}

fn edge_too_small(cfg: &RiskConfig, c: &ExposureCheck) -> Option<SkipReason> {
    (c.edge < cfg.skip_min_edge).then_some(SkipReason::EdgeTooSmall {
        min_edge: cfg.skip_min_edge,
    })
}

fn confidence_too_low(cfg: &RiskConfig, c: &ExposureCheck) -> Option<SkipReason> {
    (c.confidence < cfg.skip_min_confidence).then_some(SkipReason::ConfidenceTooLow {
        min_confidence: cfg.skip_min_confidence,
    })
}

fn exceeds_daily_limit(_: &RiskConfig, c: &ExposureCheck) -> Option<SkipReason> {
    (c.active_exposure + c.stake > c.daily_limit).then_some(SkipReason::ExceedsDailyLimit)
}

fn stake_too_large(cfg: &RiskConfig, c: &ExposureCheck) -> Option<SkipReason> {
    (c.stake > c.bankroll * cfg.skip_max_stake_pct).then_some(SkipReason::StakeTooLarge {
        max_stake_pct: cfg.skip_max_stake_pct,
    })
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAssessor {
    config: RiskConfig,
}

impl RiskAssessor {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Decides whether a bet should be skipped. First matching rule wins.
    #[must_use]
    pub fn should_skip_bet(
        &self,
        edge: Decimal,
        confidence: Decimal,
        stake: Decimal,
        bankroll: Decimal,
        active_exposure: Decimal,
        daily_limit: Decimal,
    ) -> SkipDecision {
        self.check(&ExposureCheck {
            edge,
            confidence,
            stake,
            bankroll,
            active_exposure,
            daily_limit,
        })
    }

    /// Same as [`Self::should_skip_bet`] over a prepared input.
    #[must_use]
    pub fn check(&self, input: &ExposureCheck) -> SkipDecision {
        SKIP_RULES
            .iter()
            .find_map(|rule| rule(&self.config, input))
            .map_or_else(SkipDecision::proceed, SkipDecision::skip)
    }

    /// Grades a stake relative to the bankroll.
    ///
    /// A non-positive bankroll makes any positive stake `High`.
    #[must_use]
    pub fn assess_risk_level(
        &self,
        stake: Decimal,
        bankroll: Decimal,
        confidence: Decimal,
        edge: Decimal,
    ) -> RiskLevel {
        if bankroll <= Decimal::ZERO {
            return if stake > Decimal::ZERO {
                RiskLevel::High
            } else {
                RiskLevel::Low
            };
        }

        let pct = stake / bankroll;
        let cfg = &self.config;

        if pct > cfg.level_stake_pct_high && confidence < cfg.level_confidence_high {
            RiskLevel::High
        } else if pct > cfg.level_stake_pct_high {
            RiskLevel::Medium
        } else if pct > cfg.level_stake_pct_medium && edge < cfg.level_edge_medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}
