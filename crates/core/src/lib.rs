//! Betting analytics and quality-gate engine.
//!
//! This crate provides:
//! - Odds conversion and implied probabilities
//! - Edge, EV and recommendation tiers
//! - Tier-driven fractional Kelly stake sizing
//! - Quality gate and exposure guards
//! - Pick evaluation and settlement grading

pub mod bankroll;
pub mod config;
pub mod config_loader;
pub mod edge;
pub mod error;
pub mod evaluator;
pub mod kelly;
pub mod market;
pub mod odds;
pub mod pick;
pub mod quality_gate;
pub mod risk;
pub mod settlement;

use rust_decimal::Decimal;

pub use bankroll::BankrollState;
pub use config::{BankrollConfig, EngineConfig, QualityGateConfig, RiskConfig, StakingConfig};
pub use config_loader::ConfigLoader;
pub use edge::{EdgeAnalysis, EdgeCalculator, Recommendation, TierRule};
pub use error::{EngineError, Result};
pub use evaluator::{BatchEvaluation, PickEvaluator, RejectedLine};
pub use kelly::{StakeRecommendation, StakeSizer};
pub use market::{latest_snapshot, MarketLine, MarketType, ModelEstimate, SelectionKey};
pub use pick::{value_board, Decision, Pick, PickReason, PickStatus};
pub use quality_gate::{GateCandidate, GateFailure, GateOutcome, QualityGateFilter};
pub use risk::{RiskAssessor, RiskLevel, SkipDecision, SkipReason};
pub use settlement::{closing_line_value, GameResult, Settlement};

/// Fraction as a trimmed percentage, e.g. `0.025` -> `2.5`.
pub(crate) fn percent(fraction: Decimal) -> Decimal {
    (fraction * Decimal::ONE_HUNDRED).normalize()
}
