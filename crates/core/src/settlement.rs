//! Grading of picks against game results.
//!
//! # Settlement Logic
//! - Win: profit = stake * (odds - 1)
//! - Loss: profit = -stake
//! - Push: profit = 0, stake returned
//!
//! CLV compares the implied probability at bet time with the closing line:
//! ```text
//! CLV = (closing_implied - bet_implied) / bet_implied * 100
//! ```
//! Positive CLV means the bet beat the closing price.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::market::{MarketLine, MarketType};
use crate::odds;
use crate::pick::{Pick, PickStatus};

/// Outcome of the selection a pick was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Win,
    Loss,
    Push,
}

impl GameResult {
    /// Terminal pick status this result maps to.
    #[must_use]
    pub fn status(&self) -> PickStatus {
        match self {
            Self::Win => PickStatus::Won,
            Self::Loss => PickStatus::Lost,
            Self::Push => PickStatus::Push,
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "win" | "won" => Some(Self::Win),
            "loss" | "lost" => Some(Self::Loss),
            "push" | "void" => Some(Self::Push),
            _ => None,
        }
    }
}

/// Recorded settlement of one pick. At most one exists per pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub pick_id: Uuid,
    pub result: PickStatus,
    pub market_type: MarketType,
    pub stake: Decimal,
    /// Decimal odds the pick was taken at.
    pub odds: Decimal,
    pub profit: Decimal,
    pub closing_odds: Option<Decimal>,
    pub closing_point: Option<Decimal>,
    /// Percent; `None` when no closing line was available.
    pub clv: Option<Decimal>,
    pub settled_at: DateTime<Utc>,
}

impl Settlement {
    /// Grades `pick` without touching it.
    ///
    /// A closing line for a different selection is ignored and CLV is left
    /// empty.
    ///
    /// # Errors
    /// Returns `InvalidOdds` if the closing line carries an invalid price.
    pub fn grade(
        pick: &Pick,
        result: GameResult,
        closing: Option<&MarketLine>,
        settled_at: DateTime<Utc>,
    ) -> Result<Self> {
        let closing = match closing {
            Some(line) if line.key() != pick.key() => {
                tracing::warn!(
                    pick_id = %pick.id,
                    closing_game = %line.game_id,
                    closing_selection = %line.selection,
                    "Closing line does not match pick selection, CLV not recorded"
                );
                None
            }
            other => other,
        };

        if let Some(line) = closing {
            line.validate()?;
        }

        Ok(Self {
            pick_id: pick.id,
            result: result.status(),
            market_type: pick.market_type,
            stake: pick.stake_amount,
            odds: pick.odds,
            profit: profit(result, pick.stake_amount, pick.odds),
            closing_odds: closing.map(|l| l.price),
            closing_point: closing.and_then(|l| l.point),
            clv: closing.map(|l| closing_line_value(pick.odds, l.price)),
            settled_at,
        })
    }

    #[must_use]
    pub fn is_push(&self) -> bool {
        self.result == PickStatus::Push
    }
}

/// Profit of a settled stake at decimal `odds`.
#[must_use]
pub fn profit(result: GameResult, stake: Decimal, odds: Decimal) -> Decimal {
    match result {
        GameResult::Win => stake * (odds - Decimal::ONE),
        GameResult::Loss => -stake,
        GameResult::Push => Decimal::ZERO,
    }
}

/// Closing line value in percent. Zero if the bet price is invalid.
#[must_use]
pub fn closing_line_value(bet_odds: Decimal, closing_odds: Decimal) -> Decimal {
    let bet_implied = odds::decimal_to_implied_probability(bet_odds);
    if bet_implied.is_zero() {
        return Decimal::ZERO;
    }
    let closing_implied = odds::decimal_to_implied_probability(closing_odds);

    (closing_implied - bet_implied) / bet_implied * Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pick::fixtures::pick;
    use crate::pick::Decision;
    use crate::error::EngineError;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 4, 2, 0, 0).unwrap()
    }

    fn closing(price: Decimal) -> MarketLine {
        let p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        MarketLine {
            game_id: p.game_id,
            bookmaker: "pinnacle".to_string(),
            market_type: p.market_type,
            selection: p.selection,
            price,
            point: Some(dec!(7.5)),
            observed_at: at(),
        }
    }

    #[test]
    fn win_pays_net_odds() {
        assert_eq!(profit(GameResult::Win, dec!(100), dec!(2.5)), dec!(150));
        assert_eq!(profit(GameResult::Loss, dec!(100), dec!(2.5)), dec!(-100));
        assert_eq!(profit(GameResult::Push, dec!(100), dec!(2.5)), dec!(0));
    }

    #[test]
    fn clv_positive_when_line_shortens() {
        // bet at 2.10, closed at 2.00: 0.5 vs 0.47619
        let clv = closing_line_value(dec!(2.10), dec!(2.00));
        assert_eq!(clv.round_dp(2), dec!(5.00));
    }

    #[test]
    fn clv_negative_when_line_drifts() {
        let clv = closing_line_value(dec!(2.00), dec!(2.20));
        assert!(clv < Decimal::ZERO);
        assert_eq!(clv.round_dp(2), dec!(-9.09));
    }

    #[test]
    fn grade_records_closing_line() {
        let p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        let s = Settlement::grade(&p, GameResult::Win, Some(&closing(dec!(1.80))), at()).unwrap();

        assert_eq!(s.pick_id, p.id);
        assert_eq!(s.result, PickStatus::Won);
        assert_eq!(s.stake, dec!(29.50));
        assert_eq!(s.profit, dec!(29.50) * dec!(0.9091));
        assert_eq!(s.closing_odds, Some(dec!(1.80)));
        assert_eq!(s.closing_point, Some(dec!(7.5)));
        assert!(s.clv.unwrap() > Decimal::ZERO);
    }

    #[test]
    fn grade_without_closing_line_leaves_clv_empty() {
        let p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        let s = Settlement::grade(&p, GameResult::Loss, None, at()).unwrap();
        assert_eq!(s.profit, dec!(-29.50));
        assert!(s.clv.is_none());
        assert!(s.closing_odds.is_none());
    }

    #[test]
    fn grade_ignores_mismatched_closing_line() {
        let p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        let mut other = closing(dec!(1.80));
        other.selection = "KC".to_string();

        let s = Settlement::grade(&p, GameResult::Push, Some(&other), at()).unwrap();
        assert!(s.clv.is_none());
        assert_eq!(s.profit, dec!(0));
    }

    #[test]
    fn grade_rejects_invalid_closing_price() {
        let p = pick(Decision::Bet, dec!(0.1), dec!(0.05));
        let err = Settlement::grade(&p, GameResult::Win, Some(&closing(dec!(0.95))), at()).unwrap_err();
        assert_eq!(err, EngineError::InvalidOdds { price: dec!(0.95) });
    }

    #[test]
    fn result_parses_aliases() {
        assert_eq!(GameResult::parse("WON"), Some(GameResult::Win));
        assert_eq!(GameResult::parse("void"), Some(GameResult::Push));
        assert_eq!(GameResult::parse("cancelled"), None);
    }
}
