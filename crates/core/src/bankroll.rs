//! Bankroll and exposure state.
//!
//! `BankrollState` is a plain value. Operations return the next state instead
//! of mutating in place; callers that share a bankroll serialize access
//! themselves (see `betedge-data::PickBook`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankrollState {
    /// Reference bankroll that percentage limits are measured against.
    pub total_bankroll: Decimal,
    /// Balance after settled profit and loss.
    pub current_balance: Decimal,
    /// Sum of stakes on pending picks.
    pub active_exposure: Decimal,
    /// Daily exposure limit as a fraction of `total_bankroll`.
    pub daily_limit_pct: Decimal,
    /// Largest single stake as a fraction of `total_bankroll`.
    pub max_bet_pct: Decimal,
}

impl BankrollState {
    /// Fresh bankroll with no exposure.
    #[must_use]
    pub fn new(total_bankroll: Decimal, daily_limit_pct: Decimal, max_bet_pct: Decimal) -> Self {
        Self {
            total_bankroll,
            current_balance: total_bankroll,
            active_exposure: Decimal::ZERO,
            daily_limit_pct,
            max_bet_pct,
        }
    }

    /// Daily exposure limit in currency units.
    #[must_use]
    pub fn daily_limit(&self) -> Decimal {
        self.total_bankroll * self.daily_limit_pct
    }

    /// Largest permitted single stake in currency units.
    #[must_use]
    pub fn max_bet(&self) -> Decimal {
        self.total_bankroll * self.max_bet_pct
    }

    /// Remaining exposure headroom for today, never negative.
    #[must_use]
    pub fn available_exposure(&self) -> Decimal {
        (self.daily_limit() - self.active_exposure).max(Decimal::ZERO)
    }

    /// Balance that stake fractions are applied to.
    #[must_use]
    pub fn sizing_base(&self) -> Decimal {
        self.current_balance.max(Decimal::ZERO)
    }

    /// State after placing `stake` on a pending pick.
    ///
    /// # Errors
    /// Returns `ExposureLimitExceeded` if the stake would push active exposure
    /// past the daily limit.
    pub fn with_stake_placed(&self, stake: Decimal) -> Result<Self> {
        if self.active_exposure + stake > self.daily_limit() {
            return Err(EngineError::ExposureLimitExceeded {
                requested: stake,
                available: self.available_exposure(),
            });
        }

        Ok(Self {
            active_exposure: self.active_exposure + stake,
            ..self.clone()
        })
    }

    /// State with `stake` added to active exposure without the daily-limit
    /// check. Used when reloading bets that were already placed.
    #[must_use]
    pub fn with_exposure_restored(&self, stake: Decimal) -> Self {
        Self {
            active_exposure: self.active_exposure + stake,
            ..self.clone()
        }
    }

    /// State after a staked pick settles with `profit` (negative for a loss).
    #[must_use]
    pub fn with_settlement(&self, stake: Decimal, profit: Decimal) -> Self {
        Self {
            current_balance: self.current_balance + profit,
            active_exposure: (self.active_exposure - stake).max(Decimal::ZERO),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bankroll() -> BankrollState {
        BankrollState::new(dec!(1000), dec!(0.10), dec!(0.05))
    }

    #[test]
    fn limits_scale_with_total() {
        let b = bankroll();
        assert_eq!(b.daily_limit(), dec!(100));
        assert_eq!(b.max_bet(), dec!(50));
        assert_eq!(b.available_exposure(), dec!(100));
    }

    #[test]
    fn placing_stake_adds_exposure_without_touching_balance() {
        let b = bankroll().with_stake_placed(dec!(40)).unwrap();
        assert_eq!(b.active_exposure, dec!(40));
        assert_eq!(b.current_balance, dec!(1000));
        assert_eq!(b.available_exposure(), dec!(60));
    }

    #[test]
    fn placing_up_to_limit_is_allowed() {
        let b = bankroll().with_stake_placed(dec!(100)).unwrap();
        assert_eq!(b.available_exposure(), dec!(0));
    }

    #[test]
    fn restored_exposure_skips_the_limit() {
        let b = bankroll().with_exposure_restored(dec!(150));
        assert_eq!(b.active_exposure, dec!(150));
        assert_eq!(b.available_exposure(), dec!(0));
        assert_eq!(b.current_balance, dec!(1000));
    }

    #[test]
    fn placing_past_limit_fails() {
        let b = bankroll().with_stake_placed(dec!(95)).unwrap();
        assert_eq!(
            b.with_stake_placed(dec!(10)).unwrap_err(),
            EngineError::ExposureLimitExceeded {
                requested: dec!(10),
                available: dec!(5)
            }
        );
    }

    #[test]
    fn settlement_releases_exposure_and_books_profit() {
        let b = bankroll().with_stake_placed(dec!(40)).unwrap();
        let won = b.with_settlement(dec!(40), dec!(36.36));
        assert_eq!(won.active_exposure, dec!(0));
        assert_eq!(won.current_balance, dec!(1036.36));

        let lost = b.with_settlement(dec!(40), dec!(-40));
        assert_eq!(lost.current_balance, dec!(960));
    }
}
