//! Confidence intervals for win rates.

/// z-score for a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

/// Wilson score interval for `wins` out of `n` decided bets.
///
/// ```text
/// center = p + z²/2n
/// spread = z * sqrt(p(1-p)/n + z²/4n²)
/// (center ± spread) / (1 + z²/n)
/// ```
///
/// Returns `(0.0, 0.0)` when `n == 0`. Bounds are clamped to [0, 1].
#[must_use]
pub fn wilson_ci(wins: u32, n: u32, z: f64) -> (f64, f64) {
    if n == 0 {
        return (0.0, 0.0);
    }

    let n_f = f64::from(n);
    let p = f64::from(wins) / n_f;
    let z_sq = z * z;

    let denominator = 1.0 + z_sq / n_f;
    let center = p + z_sq / (2.0 * n_f);
    let spread = z * (p * (1.0 - p) / n_f + z_sq / (4.0 * n_f * n_f)).sqrt();

    let lower = (center - spread) / denominator;
    let upper = (center + spread) / denominator;

    (lower.max(0.0), upper.min(1.0))
}
