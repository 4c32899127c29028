//! Windowed performance reports.

use betedge_core::{MarketType, Settlement};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::metrics::PerformanceSummary;

/// Size of the short rolling window.
pub const SHORT_WINDOW: usize = 10;
/// Size of the long rolling window.
pub const LONG_WINDOW: usize = 30;

/// Performance over each aggregation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// Ten most recent staked settlements.
    pub last_10: PerformanceSummary,
    /// Thirty most recent staked settlements.
    pub last_30: PerformanceSummary,
    /// Every staked settlement since the season start.
    pub season: PerformanceSummary,
    /// Season settlements split by market type.
    pub by_market: BTreeMap<MarketType, PerformanceSummary>,
    pub generated_at: DateTime<Utc>,
}

/// Builds [`PerformanceReport`]s from a settlement set.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    season_start: Option<DateTime<Utc>>,
}

impl PerformanceTracker {
    /// Tracker counting every settlement toward the season.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker whose season window starts at `start`.
    #[must_use]
    pub fn with_season_start(start: DateTime<Utc>) -> Self {
        Self {
            season_start: Some(start),
        }
    }

    /// Recomputes every window from `settlements`. Input order does not
    /// matter; settlements are ordered by `settled_at` (then pick id) first.
    #[must_use]
    pub fn report(&self, settlements: &[Settlement], now: DateTime<Utc>) -> PerformanceReport {
        let mut ordered: Vec<&Settlement> = settlements
            .iter()
            .filter(|s| s.stake > Decimal::ZERO)
            .collect();
        ordered.sort_by(|a, b| {
            a.settled_at
                .cmp(&b.settled_at)
                .then(a.pick_id.cmp(&b.pick_id))
        });

        let season: Vec<&Settlement> = match self.season_start {
            Some(start) => ordered
                .iter()
                .copied()
                .filter(|s| s.settled_at >= start)
                .collect(),
            None => ordered.clone(),
        };

        let mut by_market: BTreeMap<MarketType, Vec<&Settlement>> = BTreeMap::new();
        for s in &season {
            by_market.entry(s.market_type).or_default().push(*s);
        }

        let report = PerformanceReport {
            last_10: PerformanceSummary::from_settlements(
                tail(&ordered, SHORT_WINDOW).iter().copied(),
            ),
            last_30: PerformanceSummary::from_settlements(
                tail(&ordered, LONG_WINDOW).iter().copied(),
            ),
            season: PerformanceSummary::from_settlements(season.iter().copied()),
            by_market: by_market
                .into_iter()
                .map(|(market, group)| {
                    (market, PerformanceSummary::from_settlements(group))
                })
                .collect(),
            generated_at: now,
        };

        tracing::info!(
            settlements = settlements.len(),
            season_bets = report.season.bets,
            season_roi = %report.season.roi.round_dp(2),
            last_10_roi = %report.last_10.roi.round_dp(2),
            "Performance report built"
        );

        report
    }
}

fn tail<'a, 'b>(ordered: &'b [&'a Settlement], n: usize) -> &'b [&'a Settlement] {
    &ordered[ordered.len().saturating_sub(n)..]
}
