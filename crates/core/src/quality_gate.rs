//! Quality gate applied before a candidate becomes an actionable pick.
//!
//! All checks run; every failing check is reported. A candidate passes only
//! when the failure list is empty.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::QualityGateConfig;

// chrono durations are bounded by i64 milliseconds
const MAX_AGE_SECS: i64 = i64::MAX / 1000;

/// A single failed gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateFailure {
    EvBelowThreshold,
    EdgeBelowThreshold,
    ConfidenceBelowThreshold,
    StaleOdds,
}

impl GateFailure {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EvBelowThreshold => "ev_below_threshold",
            Self::EdgeBelowThreshold => "edge_below_threshold",
            Self::ConfidenceBelowThreshold => "confidence_below_threshold",
            Self::StaleOdds => "stale_odds",
        }
    }
}

impl fmt::Display for GateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Figures the gate inspects.
#[derive(Debug, Clone, Copy)]
pub struct GateCandidate {
    /// EV per unit staked.
    pub ev: Decimal,
    pub edge: Decimal,
    pub confidence: Decimal,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub failures: Vec<GateFailure>,
}

impl GateOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityGateFilter {
    config: QualityGateConfig,
}

impl QualityGateFilter {
    #[must_use]
    pub fn new(config: QualityGateConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &QualityGateConfig {
        &self.config
    }

    /// Longest permitted gap between `observed_at` and evaluation time.
    #[must_use]
    pub fn max_snapshot_age(&self) -> Duration {
        let hours = self.config.odds_max_snapshot_age_hours;
        let seconds = hours
            .checked_mul(Decimal::from(3600))
            .and_then(|s| s.trunc().to_i64())
            .unwrap_or(if hours.is_sign_negative() {
                -MAX_AGE_SECS
            } else {
                MAX_AGE_SECS
            })
            .clamp(-MAX_AGE_SECS, MAX_AGE_SECS);
        Duration::seconds(seconds)
    }

    /// Whether a snapshot observed at `observed_at` is still usable at `now`.
    /// Snapshots stamped in the future count as fresh.
    #[must_use]
    pub fn is_fresh(&self, observed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - observed_at <= self.max_snapshot_age()
    }

    /// Runs every check and collects the failures in a fixed order.
    #[must_use]
    pub fn evaluate(&self, candidate: &GateCandidate, now: DateTime<Utc>) -> GateOutcome {
        let cfg = &self.config;
        let checks = [
            (candidate.ev >= cfg.min_ev, GateFailure::EvBelowThreshold),
            (candidate.edge >= cfg.min_edge_prob, GateFailure::EdgeBelowThreshold),
            (
                candidate.confidence >= cfg.min_confidence,
                GateFailure::ConfidenceBelowThreshold,
            ),
            (
                self.is_fresh(candidate.observed_at, now),
                GateFailure::StaleOdds,
            ),
        ];

        GateOutcome {
            failures: checks
                .into_iter()
                .filter_map(|(ok, failure)| (!ok).then_some(failure))
                .collect(),
        }
    }
}
