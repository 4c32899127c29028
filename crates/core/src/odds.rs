//! Odds format conversion.
//!
//! Decimal odds are the canonical representation inside the engine. American
//! odds are accepted at the edges and converted on the way in and out.
//!
//! ```text
//! american > 0:  decimal = american / 100 + 1
//! american < 0:  decimal = 100 / |american| + 1
//! implied        = 1 / decimal
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, Result};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest accepted decimal price (American +999900).
pub const MAX_DECIMAL_PRICE: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Converts American odds to decimal odds.
///
/// # Errors
/// Returns `InvalidAmericanOdds` if `american` is zero.
///
/// # Examples
/// ```
/// use betedge_core::odds::american_to_decimal;
/// use rust_decimal::Decimal;
///
/// assert_eq!(american_to_decimal(150).unwrap(), Decimal::new(25, 1));
/// assert_eq!(american_to_decimal(-200).unwrap(), Decimal::new(15, 1));
/// ```
pub fn american_to_decimal(american: i64) -> Result<Decimal> {
    if american == 0 {
        return Err(EngineError::InvalidAmericanOdds);
    }

    let a = Decimal::from(american);
    if american > 0 {
        Ok(a / HUNDRED + Decimal::ONE)
    } else {
        Ok(HUNDRED / a.abs() + Decimal::ONE)
    }
}

/// Converts decimal odds to American odds, rounded to the nearest integer
/// (midpoints away from zero).
///
/// # Errors
/// Returns `InvalidOdds` if the price is out of range or has no American
/// equivalent representable as `i64`.
pub fn decimal_to_american(decimal: Decimal) -> Result<i64> {
    ensure_valid_price(decimal)?;

    let net = decimal - Decimal::ONE;
    let raw = if decimal >= Decimal::TWO {
        net.checked_mul(HUNDRED)
    } else {
        (-HUNDRED).checked_div(net)
    };

    raw.and_then(|r| {
        r.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    })
    .ok_or(EngineError::InvalidOdds { price: decimal })
}

/// Implied probability of decimal odds: `1 / decimal`, or zero when the
/// price is not a valid decimal price.
#[must_use]
pub fn decimal_to_implied_probability(decimal: Decimal) -> Decimal {
    if decimal > Decimal::ONE {
        Decimal::ONE / decimal
    } else {
        Decimal::ZERO
    }
}

/// Rejects decimal prices outside `(1, MAX_DECIMAL_PRICE]`.
///
/// # Errors
/// Returns `InvalidOdds` carrying the offending price.
pub fn ensure_valid_price(decimal: Decimal) -> Result<()> {
    if decimal > Decimal::ONE && decimal <= MAX_DECIMAL_PRICE {
        Ok(())
    } else {
        Err(EngineError::InvalidOdds { price: decimal })
    }
}

/// Sum of implied probabilities across every outcome of one market.
///
/// A value above 1 is the bookmaker's margin (the "vig").
///
/// # Errors
/// Returns `InvalidOdds` if any price is `<= 1`.
pub fn overround(prices: &[Decimal]) -> Result<Decimal> {
    prices.iter().try_fold(Decimal::ZERO, |acc, &price| {
        ensure_valid_price(price)?;
        Ok(acc + decimal_to_implied_probability(price))
    })
}

/// Implied probabilities with the margin removed, normalized to sum to 1.
///
/// Returned in the same order as `prices`. An empty slice yields an empty vec.
///
/// # Errors
/// Returns `InvalidOdds` if any price is `<= 1`.
pub fn no_vig_probabilities(prices: &[Decimal]) -> Result<Vec<Decimal>> {
    let total = overround(prices)?;
    if total.is_zero() {
        return Ok(Vec::new());
    }

    Ok(prices
        .iter()
        .map(|&price| decimal_to_implied_probability(price) / total)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // ============================================
    // American -> Decimal
    // ============================================

    #[test]
    fn american_positive_converts() {
        assert_eq!(american_to_decimal(150).unwrap(), dec!(2.5));
        assert_eq!(american_to_decimal(100).unwrap(), dec!(2));
    }

    #[test]
    fn american_negative_converts() {
        assert_eq!(american_to_decimal(-200).unwrap(), dec!(1.5));
        assert_eq!(
            american_to_decimal(-110).unwrap().round_dp(4),
            dec!(1.9091)
        );
    }

    #[test]
    fn american_zero_is_rejected() {
        assert_eq!(
            american_to_decimal(0).unwrap_err(),
            EngineError::InvalidAmericanOdds
        );
    }

    // ============================================
    // Decimal -> American
    // ============================================

    #[test]
    fn decimal_underdog_converts() {
        assert_eq!(decimal_to_american(dec!(2.5)).unwrap(), 150);
        assert_eq!(decimal_to_american(dec!(2.0)).unwrap(), 100);
    }

    #[test]
    fn decimal_favourite_converts() {
        assert_eq!(decimal_to_american(dec!(1.5)).unwrap(), -200);
        assert_eq!(decimal_to_american(dec!(1.9091)).unwrap(), -110);
    }

    #[test]
    fn decimal_at_or_below_one_is_rejected() {
        assert_eq!(
            decimal_to_american(dec!(1)).unwrap_err(),
            EngineError::InvalidOdds { price: dec!(1) }
        );
        assert!(decimal_to_american(dec!(0.5)).is_err());
    }

    #[test]
    fn price_a_hair_above_one_is_rejected_not_overflowed() {
        let d = dec!(1.0000000000000000000000000001);
        assert_eq!(
            decimal_to_american(d).unwrap_err(),
            EngineError::InvalidOdds { price: d }
        );
        assert_eq!(decimal_to_american(dec!(1.0001)).unwrap(), -1_000_000);
    }

    #[test]
    fn price_above_maximum_is_rejected() {
        assert!(ensure_valid_price(MAX_DECIMAL_PRICE).is_ok());
        assert_eq!(decimal_to_american(MAX_DECIMAL_PRICE).unwrap(), 999_900);

        let huge = dec!(5000000000000000000000000000);
        assert_eq!(
            ensure_valid_price(huge).unwrap_err(),
            EngineError::InvalidOdds { price: huge }
        );
        assert!(ensure_valid_price(MAX_DECIMAL_PRICE + dec!(0.01)).is_err());
    }

    #[test]
    fn american_round_trips_within_one() {
        for a in (100..=5000).chain(-5000..=-101) {
            let d = american_to_decimal(a).unwrap();
            let back = decimal_to_american(d).unwrap();
            assert!((back - a).abs() <= 1, "{a} -> {d} -> {back}");
        }
    }

    #[test]
    fn decimal_round_trips_within_american_granularity() {
        let mut d = dec!(1.01);
        while d <= dec!(10) {
            let back = american_to_decimal(decimal_to_american(d).unwrap()).unwrap();
            // half an American point, expressed in decimal odds
            let net = d - dec!(1);
            let tolerance = if d >= dec!(2) {
                dec!(0.005)
            } else {
                net * net / dec!(200) + dec!(0.0000001)
            };
            assert!((back - d).abs() <= tolerance, "{d} -> {back}");
            d += dec!(0.01);
        }
    }

    // ============================================
    // Implied probability
    // ============================================

    #[test]
    fn implied_probability_is_inverse() {
        assert_eq!(decimal_to_implied_probability(dec!(2.5)), dec!(0.4));
        assert_eq!(decimal_to_implied_probability(dec!(2)), dec!(0.5));
    }

    #[test]
    fn implied_probability_strictly_inside_unit_interval() {
        let mut d = dec!(1.001);
        while d < dec!(100) {
            let p = decimal_to_implied_probability(d);
            assert!(p > Decimal::ZERO && p < Decimal::ONE, "{d} -> {p}");
            d += dec!(0.37);
        }
    }

    #[test]
    fn implied_probability_zero_for_invalid_price() {
        assert_eq!(decimal_to_implied_probability(dec!(1)), Decimal::ZERO);
        assert_eq!(decimal_to_implied_probability(dec!(0)), Decimal::ZERO);
    }

    // ============================================
    // Overround
    // ============================================

    #[test]
    fn standard_juice_overround() {
        let o = overround(&[dec!(1.9091), dec!(1.9091)]).unwrap();
        assert_eq!(o.round_dp(4), dec!(1.0476));
    }

    #[test]
    fn no_vig_probabilities_sum_to_one() {
        let fair = no_vig_probabilities(&[dec!(1.8), dec!(2.1)]).unwrap();
        let total: Decimal = fair.iter().sum();
        assert!((total - Decimal::ONE).abs() < dec!(0.0000000001));
        assert!(fair[0] > fair[1]);
    }

    #[test]
    fn no_vig_rejects_invalid_price() {
        assert!(no_vig_probabilities(&[dec!(1.9), dec!(1.0)]).is_err());
    }
}
