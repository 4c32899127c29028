//! The engine's primary output: an evaluated pick.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::edge::Recommendation;
use crate::error::{EngineError, Result};
use crate::market::{MarketType, SelectionKey};
use crate::quality_gate::GateFailure;
use crate::risk::{RiskLevel, SkipReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Bet,
    Pass,
}

impl Decision {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bet => "BET",
            Self::Pass => "PASS",
        }
    }
}

/// Lifecycle of a pick. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickStatus {
    Pending,
    Won,
    Lost,
    Push,
}

impl PickStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Won => "won",
            Self::Lost => "lost",
            Self::Push => "push",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Why a pick was passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickReason {
    Gate(GateFailure),
    NoPlay,
    RiskSkip(SkipReason),
}

impl fmt::Display for PickReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gate(failure) => write!(f, "{failure}"),
            Self::NoPlay => f.write_str("no_play"),
            Self::RiskSkip(reason) => write!(f, "risk_skip: {reason}"),
        }
    }
}

impl From<GateFailure> for PickReason {
    fn from(failure: GateFailure) -> Self {
        Self::Gate(failure)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pick {
    pub id: Uuid,
    pub game_id: String,
    pub bookmaker: String,
    pub market_type: MarketType,
    pub selection: String,
    /// Decimal odds taken.
    pub odds: Decimal,
    pub point: Option<Decimal>,
    pub implied_prob: Decimal,
    pub model_prob: Decimal,
    pub confidence: Decimal,
    pub edge: Decimal,
    /// EV per unit staked.
    pub ev: Decimal,
    pub ev_per_100: Decimal,
    pub recommendation: Recommendation,
    /// Bankroll fraction staked; zero for passed picks.
    pub stake_fraction: Decimal,
    pub stake_amount: Decimal,
    pub risk_level: RiskLevel,
    pub decision: Decision,
    pub status: PickStatus,
    pub reasons: Vec<PickReason>,
    pub warnings: Vec<String>,
    pub observed_at: DateTime<Utc>,
    pub evaluated_at: DateTime<Utc>,
}

impl Pick {
    #[must_use]
    pub fn key(&self) -> SelectionKey {
        SelectionKey {
            game_id: self.game_id.clone(),
            market_type: self.market_type,
            selection: self.selection.clone(),
        }
    }

    #[must_use]
    pub fn is_bet(&self) -> bool {
        self.decision == Decision::Bet
    }

    /// Reasons as display strings.
    #[must_use]
    pub fn reason_strings(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    /// Demotes a bet to a pass, releasing its stake.
    pub fn demote(&mut self, reason: PickReason) {
        self.decision = Decision::Pass;
        self.stake_fraction = Decimal::ZERO;
        self.stake_amount = Decimal::ZERO;
        self.reasons.push(reason);
    }

    /// Moves a pending pick to a terminal status.
    ///
    /// # Errors
    /// Returns `InvalidTransition` unless the pick is pending and `to` is
    /// terminal.
    pub fn transition(&mut self, to: PickStatus) -> Result<()> {
        if self.status.is_terminal() || !to.is_terminal() {
            return Err(EngineError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// BET picks ranked by EV, then edge, both descending.
#[must_use]
pub fn value_board(picks: &[Pick]) -> Vec<&Pick> {
    let mut board: Vec<&Pick> = picks.iter().filter(|p| p.is_bet()).collect();
    board.sort_by(|a, b| b.ev.cmp(&a.ev).then_with(|| b.edge.cmp(&a.edge)));
    board
}


#[cfg(test)]
mod tests {
    use super::fixtures::pick;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pending_moves_to_terminal_once() {
        let mut p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        p.transition(PickStatus::Won).unwrap();
        assert_eq!(p.status, PickStatus::Won);

        let err = p.transition(PickStatus::Lost).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                from: PickStatus::Won,
                to: PickStatus::Lost
            }
        );
        assert_eq!(p.status, PickStatus::Won);
    }

    #[test]
    fn cannot_transition_back_to_pending() {
        let mut p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        assert!(p.transition(PickStatus::Pending).is_err());
    }

    #[test]
    fn demote_zeroes_stake() {
        let mut p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        p.demote(PickReason::RiskSkip(SkipReason::ExceedsDailyLimit));
        assert_eq!(p.decision, Decision::Pass);
        assert_eq!(p.stake_amount, dec!(0));
        assert_eq!(
            p.reason_strings(),
            vec!["risk_skip: Would exceed daily exposure limit".to_string()]
        );
    }

    #[test]
    fn value_board_ranks_bets_only() {
        let picks = vec![
            pick(Decision::Bet, dec!(0.04), dec!(0.05)),
            pick(Decision::Pass, dec!(0.30), dec!(0.10)),
            pick(Decision::Bet, dec!(0.09), dec!(0.03)),
            pick(Decision::Bet, dec!(0.04), dec!(0.06)),
        ];
        let board = value_board(&picks);

        assert_eq!(board.len(), 3);
        assert_eq!(board[0].ev, dec!(0.09));
        assert_eq!(board[1].edge, dec!(0.06));
        assert_eq!(board[2].edge, dec!(0.05));
    }

    #[test]
    fn reasons_serialize_as_snake_case() {
        let json = serde_json::to_string(&PickReason::Gate(GateFailure::StaleOdds)).unwrap();
        assert_eq!(json, r#"{"gate":"stale_odds"}"#);
    }
}
