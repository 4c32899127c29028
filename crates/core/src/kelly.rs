//! Fractional Kelly stake sizing for decimal-odds bets.
//!
//! For decimal odds `d` and win probability `p`:
//! ```text
//! b  = d - 1            (net odds)
//! f* = (b*p - q) / b    where q = 1 - p
//! ```
//!
//! The recommended fraction is picked by recommendation tier (half Kelly,
//! quarter Kelly or a flat fraction), then passed through the safety clamps.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bankroll::BankrollState;
use crate::config::StakingConfig;
use crate::edge::Recommendation;
use crate::percent;
use crate::risk::RiskLevel;

/// Sizing output for one candidate bet. Fractions are of the bankroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRecommendation {
    /// Full Kelly fraction.
    pub kelly_stake: Decimal,
    pub quarter_kelly: Decimal,
    pub half_kelly: Decimal,
    /// Tier-independent flat fraction.
    pub flat_stake: Decimal,
    /// Fraction chosen for this tier after clamps.
    pub recommended: Decimal,
    /// `recommended` applied to the bankroll, capped at the max bet.
    pub recommended_amount: Decimal,
    pub risk_level: RiskLevel,
    pub warnings: Vec<String>,
}

/// Tier-driven fractional Kelly sizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StakeSizer {
    config: StakingConfig,
}

impl StakeSizer {
    #[must_use]
    pub fn new(config: StakingConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Full Kelly fraction, clamped to `[0, 1]`.
    ///
    /// Returns zero for non-positive net odds or a non-positive edge.
    ///
    /// # Examples
    /// ```
    /// use betedge_core::kelly::StakeSizer;
    /// use rust_decimal::Decimal;
    ///
    /// // even money at 60%: f* = (1 * 0.6 - 0.4) / 1 = 0.2
    /// let f = StakeSizer::kelly_fraction(Decimal::TWO, Decimal::new(6, 1));
    /// assert_eq!(f, Decimal::new(2, 1));
    /// ```
    #[must_use]
    pub fn kelly_fraction(decimal_odds: Decimal, model_prob: Decimal) -> Decimal {
        let b = decimal_odds - Decimal::ONE;
        if b <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let p = model_prob;
        let q = Decimal::ONE - p;
        let kelly = (b * p - q) / b;

        kelly.clamp(Decimal::ZERO, Decimal::ONE)
    }

    /// Sizes a bet for the given tier against `bankroll`.
    #[must_use]
    pub fn size(
        &self,
        decimal_odds: Decimal,
        model_prob: Decimal,
        confidence: Decimal,
        tier: Recommendation,
        bankroll: &BankrollState,
    ) -> StakeRecommendation {
        let cfg = &self.config;
        let kelly = Self::kelly_fraction(decimal_odds, model_prob);
        let mut warnings = Vec::new();
        let mut risk_level = RiskLevel::Low;

        let mut recommended = if kelly <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            match tier {
                Recommendation::StrongPlay => kelly * cfg.strong_kelly_fraction,
                Recommendation::Play => kelly * cfg.kelly_fraction_default,
                Recommendation::Lean => cfg.flat_stake_pct,
                Recommendation::NoPlay => Decimal::ZERO,
            }
        };

        if recommended.is_zero() {
            warnings.push("Edge too low - consider skipping this bet".to_string());
        }

        if recommended > cfg.high_risk_stake_pct {
            risk_level = risk_level.max(RiskLevel::High);
            warnings.push(format!(
                "Stake exceeds {}% of bankroll - high risk",
                percent(cfg.high_risk_stake_pct)
            ));
        }

        if recommended > bankroll.max_bet_pct {
            recommended = bankroll.max_bet_pct;
            warnings.push(format!(
                "Stake capped at {}% of bankroll",
                percent(bankroll.max_bet_pct)
            ));
        }

        if confidence < cfg.high_risk_confidence {
            risk_level = risk_level.max(RiskLevel::High);
            warnings.push(format!(
                "Low confidence (<{}%) - high risk",
                percent(cfg.high_risk_confidence)
            ));
        }

        // Max bet is measured against the total bankroll; rescale the
        // fraction when it caps the amount.
        let base = bankroll.sizing_base();
        let mut recommended_amount = recommended * base;
        if recommended_amount > bankroll.max_bet() {
            recommended_amount = bankroll.max_bet();
            recommended = recommended_amount / base;
        }

        StakeRecommendation {
            kelly_stake: kelly,
            quarter_kelly: kelly * Decimal::new(25, 2),
            half_kelly: kelly * Decimal::new(5, 1),
            flat_stake: cfg.flat_stake_pct,
            recommended,
            recommended_amount,
            risk_level,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odds::american_to_decimal;
    use rust_decimal_macros::dec;

    fn bankroll() -> BankrollState {
        BankrollState::new(dec!(1000), dec!(0.20), dec!(0.05))
    }

    fn roomy_bankroll() -> BankrollState {
        BankrollState::new(dec!(1000), dec!(1), dec!(1))
    }

    // ============================================
    // Kelly formula
    // ============================================

    #[test]
    fn kelly_at_minus_110() {
        let d = american_to_decimal(-110).unwrap();
        let f = StakeSizer::kelly_fraction(d, dec!(0.58));
        assert_eq!(f.round_dp(4), dec!(0.1180));
        assert_eq!((f * dec!(0.25)).round_dp(4), dec!(0.0295));
    }

    #[test]
    fn kelly_zero_at_fair_price() {
        assert_eq!(StakeSizer::kelly_fraction(dec!(2.5), dec!(0.4)), dec!(0));
    }

    #[test]
    fn kelly_clamped_to_zero_for_negative_edge() {
        assert_eq!(StakeSizer::kelly_fraction(dec!(2.0), dec!(0.3)), dec!(0));
    }

    #[test]
    fn kelly_bounded_for_all_probabilities() {
        for odds_cents in (101..=1000).step_by(7) {
            let d = Decimal::new(odds_cents, 2);
            for p_pct in 1..100 {
                let f = StakeSizer::kelly_fraction(d, Decimal::new(p_pct, 2));
                assert!(f >= Decimal::ZERO && f <= Decimal::ONE, "d={d} p={p_pct}% f={f}");
            }
        }
    }

    #[test]
    fn kelly_certain_win_is_one() {
        assert_eq!(StakeSizer::kelly_fraction(dec!(1.5), dec!(1)), dec!(1));
    }

    // ============================================
    // Tier selection
    // ============================================

    #[test]
    fn play_tier_uses_quarter_kelly() {
        let d = american_to_decimal(-110).unwrap();
        let rec = StakeSizer::default().size(d, dec!(0.58), dec!(0.75), Recommendation::Play, &bankroll());

        assert_eq!(rec.recommended, rec.quarter_kelly);
        assert_eq!(rec.recommended.round_dp(4), dec!(0.0295));
        assert_eq!(rec.recommended_amount.round_dp(2), dec!(29.50));
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert!(rec.warnings.is_empty());
    }

    #[test]
    fn strong_play_tier_uses_half_kelly() {
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.6), dec!(0.85), Recommendation::StrongPlay, &roomy_bankroll());
        assert_eq!(rec.kelly_stake, dec!(0.2));
        assert_eq!(rec.recommended, dec!(0.1));
        assert_eq!(rec.recommended, rec.half_kelly);
    }

    #[test]
    fn lean_tier_uses_flat_stake() {
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.54), dec!(0.65), Recommendation::Lean, &bankroll());
        assert_eq!(rec.recommended, dec!(0.02));
        assert_eq!(rec.recommended_amount, dec!(20));
    }

    #[test]
    fn no_play_is_zero_with_warning() {
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.6), dec!(0.9), Recommendation::NoPlay, &bankroll());
        assert_eq!(rec.recommended, dec!(0));
        assert_eq!(rec.recommended_amount, dec!(0));
        assert_eq!(rec.warnings, vec!["Edge too low - consider skipping this bet".to_string()]);
    }

    #[test]
    fn non_positive_kelly_is_zero_regardless_of_tier() {
        let rec = StakeSizer::default().size(dec!(2.5), dec!(0.4), dec!(0.9), Recommendation::Lean, &bankroll());
        assert_eq!(rec.recommended, dec!(0));
    }

    // ============================================
    // Safety clamps
    // ============================================

    #[test]
    fn stake_above_ten_percent_flags_high_risk() {
        // full Kelly 0.4, half Kelly 0.2
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.7), dec!(0.9), Recommendation::StrongPlay, &roomy_bankroll());
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert!(rec.warnings.iter().any(|w| w == "Stake exceeds 10% of bankroll - high risk"));
    }

    #[test]
    fn stake_capped_at_max_bet_pct() {
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.7), dec!(0.9), Recommendation::StrongPlay, &bankroll());
        assert_eq!(rec.recommended, dec!(0.05));
        assert_eq!(rec.recommended_amount, dec!(50));
        assert!(rec.warnings.iter().any(|w| w == "Stake capped at 5% of bankroll"));
    }

    #[test]
    fn low_confidence_flags_high_risk_regardless_of_size() {
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.54), dec!(0.59), Recommendation::Lean, &bankroll());
        assert_eq!(rec.recommended, dec!(0.02));
        assert_eq!(rec.risk_level, RiskLevel::High);
        assert_eq!(rec.warnings, vec!["Low confidence (<60%) - high risk".to_string()]);
    }

    #[test]
    fn amount_never_exceeds_max_bet() {
        let tiers = [
            Recommendation::StrongPlay,
            Recommendation::Play,
            Recommendation::Lean,
            Recommendation::NoPlay,
        ];
        let b = bankroll();
        for tier in tiers {
            for p_pct in 1..100 {
                let rec = StakeSizer::default().size(dec!(3.0), Decimal::new(p_pct, 2), dec!(0.9), tier, &b);
                assert!(rec.recommended <= b.max_bet_pct);
                assert!(rec.recommended_amount <= b.max_bet());
            }
        }
    }

    #[test]
    fn fraction_follows_amount_cap_on_a_grown_balance() {
        let mut b = bankroll();
        b.current_balance = dec!(5000);
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.54), dec!(0.65), Recommendation::Lean, &b);
        assert_eq!(rec.recommended_amount, dec!(50));
        assert_eq!(rec.recommended, dec!(0.01));
        assert_eq!(rec.recommended * b.current_balance, rec.recommended_amount);
    }

    #[test]
    fn amount_sized_against_current_balance() {
        let mut b = bankroll();
        b.current_balance = dec!(500);
        let rec = StakeSizer::default().size(dec!(2.0), dec!(0.54), dec!(0.65), Recommendation::Lean, &b);
        assert_eq!(rec.recommended_amount, dec!(10));
    }
}
