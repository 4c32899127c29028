//! Summary statistics over a set of settlements.
//!
//! ```text
//! ROI      = total_profit / total_wagered * 100
//! Yield    = total_profit / total_risked  * 100   (risked excludes pushes)
//! WinRate  = wins / (wins + losses) * 100
//! ```

use betedge_core::{PickStatus, Settlement};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::significance::{wilson_ci, Z_95};

/// Aggregated performance of a group of staked settlements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    // Counts
    pub bets: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,

    // Money
    /// Sum of all stakes, pushes included.
    pub total_wagered: Decimal,
    /// Sum of stakes on decided bets.
    pub total_risked: Decimal,
    pub total_profit: Decimal,
    /// Percent of wagered.
    pub roi: Decimal,
    /// Percent of risked.
    pub yield_pct: Decimal,

    // Win rate
    /// Percent, pushes excluded.
    pub win_rate: Decimal,
    /// Wilson 95% bounds on the win rate, as fractions.
    pub wilson_ci_lower: f64,
    pub wilson_ci_upper: f64,

    // Closing line value
    /// Mean CLV in percent over settlements that recorded one.
    pub avg_clv: Option<Decimal>,
    /// Percent of CLV samples that beat the close.
    pub positive_clv_rate: Option<Decimal>,
    pub clv_samples: u32,

    // Risk
    /// Largest peak-to-trough fall of cumulative profit.
    pub max_drawdown: Decimal,
    pub max_consecutive_losses: u32,
}

impl PerformanceSummary {
    /// Summarizes `settlements`, assumed to be in settlement order.
    ///
    /// Settlements without a stake (graded PASS picks) are ignored.
    #[must_use]
    pub fn from_settlements<'a, I>(settlements: I) -> Self
    where
        I: IntoIterator<Item = &'a Settlement>,
    {
        let staked: Vec<&Settlement> = settlements
            .into_iter()
            .filter(|s| s.stake > Decimal::ZERO)
            .collect();
        if staked.is_empty() {
            return Self::empty();
        }

        let count =
            |status: PickStatus| staked.iter().filter(|s| s.result == status).count() as u32;
        let wins = count(PickStatus::Won);
        let losses = count(PickStatus::Lost);
        let pushes = count(PickStatus::Push);

        let total_wagered: Decimal = staked.iter().map(|s| s.stake).sum();
        let total_risked: Decimal = staked.iter().filter(|s| !s.is_push()).map(|s| s.stake).sum();
        let total_profit: Decimal = staked.iter().map(|s| s.profit).sum();

        let decided = wins + losses;
        let (wilson_ci_lower, wilson_ci_upper) = wilson_ci(wins, decided, Z_95);

        let clvs: Vec<Decimal> = staked.iter().filter_map(|s| s.clv).collect();
        let clv_samples = clvs.len() as u32;
        let (avg_clv, positive_clv_rate) = if clvs.is_empty() {
            (None, None)
        } else {
            let n = Decimal::from(clv_samples);
            let positive = clvs.iter().filter(|c| **c > Decimal::ZERO).count();
            (
                Some(clvs.iter().copied().sum::<Decimal>() / n),
                Some(Decimal::from(positive) / n * Decimal::ONE_HUNDRED),
            )
        };

        Self {
            bets: staked.len() as u32,
            wins,
            losses,
            pushes,
            total_wagered,
            total_risked,
            total_profit,
            roi: percent_of(total_profit, total_wagered),
            yield_pct: percent_of(total_profit, total_risked),
            win_rate: percent_of(Decimal::from(wins), Decimal::from(decided)),
            wilson_ci_lower,
            wilson_ci_upper,
            avg_clv,
            positive_clv_rate,
            clv_samples,
            max_drawdown: max_drawdown(&staked),
            max_consecutive_losses: max_consecutive_losses(&staked),
        }
    }

    /// Summary of no bets.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bets: 0,
            wins: 0,
            losses: 0,
            pushes: 0,
            total_wagered: Decimal::ZERO,
            total_risked: Decimal::ZERO,
            total_profit: Decimal::ZERO,
            roi: Decimal::ZERO,
            yield_pct: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            wilson_ci_lower: 0.0,
            wilson_ci_upper: 0.0,
            avg_clv: None,
            positive_clv_rate: None,
            clv_samples: 0,
            max_drawdown: Decimal::ZERO,
            max_consecutive_losses: 0,
        }
    }
}

impl Default for PerformanceSummary {
    fn default() -> Self {
        Self::empty()
    }
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

fn max_drawdown(settlements: &[&Settlement]) -> Decimal {
    let mut peak = Decimal::ZERO;
    let mut equity = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;

    for s in settlements {
        equity += s.profit;
        peak = peak.max(equity);
        max_dd = max_dd.max(peak - equity);
    }

    max_dd
}

// Pushes do not break a losing streak.
fn max_consecutive_losses(settlements: &[&Settlement]) -> u32 {
    let mut current = 0u32;
    let mut longest = 0u32;

    for s in settlements {
        match s.result {
            PickStatus::Lost => {
                current += 1;
                longest = longest.max(current);
            }
            PickStatus::Won => current = 0,
            PickStatus::Push | PickStatus::Pending => {}
        }
    }

    longest
}
