//! Evaluation pipeline: market line + model estimate -> pick.
//!
//! ```text
//! MarketLine + ModelEstimate
//!   -> odds / edge / EV / tier
//!   -> quality gate            (failures pass the pick, nothing else runs)
//!   -> stake sizing + risk     (NO_PLAY or a risk skip pass the pick)
//!   -> Pick { decision: BET | PASS }
//! ```
//!
//! Evaluation is pure. It reads a bankroll snapshot but never changes it;
//! placing the stake is the caller's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::bankroll::BankrollState;
use crate::config::EngineConfig;
use crate::edge::EdgeCalculator;
use crate::error::{EngineError, Result};
use crate::kelly::StakeSizer;
use crate::market::{MarketLine, ModelEstimate, SelectionKey};
use crate::pick::{Decision, Pick, PickReason, PickStatus};
use crate::quality_gate::{GateCandidate, QualityGateFilter};
use crate::risk::{ExposureCheck, RiskAssessor};

/// A line that could not be evaluated.
#[derive(Debug, Clone)]
pub struct RejectedLine {
    pub line: MarketLine,
    pub error: EngineError,
}

/// Result of evaluating a feed of lines.
#[derive(Debug, Clone, Default)]
pub struct BatchEvaluation {
    /// Picks in input order.
    pub picks: Vec<Pick>,
    pub rejected: Vec<RejectedLine>,
    /// Lines skipped because no estimate matched them.
    pub missing_estimates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PickEvaluator {
    edge: EdgeCalculator,
    gate: QualityGateFilter,
    sizer: StakeSizer,
    risk: RiskAssessor,
}

impl PickEvaluator {
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            edge: EdgeCalculator::new(config.tiers.clone()),
            gate: QualityGateFilter::new(config.gate.clone()),
            sizer: StakeSizer::new(config.staking.clone()),
            risk: RiskAssessor::new(config.risk.clone()),
        }
    }

    #[must_use]
    pub fn risk(&self) -> &RiskAssessor {
        &self.risk
    }

    /// Evaluates one line against its estimate.
    ///
    /// Returns `Ok(None)` when there is no estimate for the line.
    ///
    /// # Errors
    /// Returns `InvalidOdds` for a price `<= 1` and `InvalidProbability` for an
    /// estimate outside [0, 1].
    pub fn evaluate(
        &self,
        line: &MarketLine,
        estimate: Option<&ModelEstimate>,
        bankroll: &BankrollState,
        now: DateTime<Utc>,
    ) -> Result<Option<Pick>> {
        line.validate()?;

        let Some(estimate) = estimate else {
            tracing::debug!(
                game_id = %line.game_id,
                selection = %line.selection,
                "No model estimate, skipping line"
            );
            return Ok(None);
        };
        if estimate.key() != line.key() {
            tracing::warn!(
                game_id = %line.game_id,
                selection = %line.selection,
                estimate_selection = %estimate.selection,
                "Estimate does not match line, skipping"
            );
            return Ok(None);
        }
        estimate.validate()?;

        let analysis = self
            .edge
            .analyze(estimate.probability, estimate.confidence, line.price)?;

        let gate = self.gate.evaluate(
            &GateCandidate {
                ev: analysis.ev,
                edge: analysis.edge,
                confidence: estimate.confidence,
                observed_at: line.observed_at,
            },
            now,
        );

        let sizing = self.sizer.size(
            line.price,
            estimate.probability,
            estimate.confidence,
            analysis.recommendation,
            bankroll,
        );

        let mut reasons: Vec<PickReason> =
            gate.failures.iter().copied().map(PickReason::from).collect();

        if gate.passed() {
            let stakeable = analysis.recommendation.is_actionable()
                && sizing.recommended_amount > Decimal::ZERO;
            if !stakeable {
                reasons.push(PickReason::NoPlay);
            } else {
                let skip = self.risk.check(&ExposureCheck {
                    edge: analysis.edge,
                    confidence: estimate.confidence,
                    stake: sizing.recommended_amount,
                    bankroll: bankroll.sizing_base(),
                    active_exposure: bankroll.active_exposure,
                    daily_limit: bankroll.daily_limit(),
                });
                if let Some(reason) = skip.reason {
                    reasons.push(PickReason::RiskSkip(reason));
                }
            }
        }

        let decision = if reasons.is_empty() {
            Decision::Bet
        } else {
            Decision::Pass
        };
        let (stake_fraction, stake_amount) = match decision {
            Decision::Bet => (sizing.recommended, sizing.recommended_amount),
            Decision::Pass => (Decimal::ZERO, Decimal::ZERO),
        };

        let risk_level = sizing.risk_level.max(self.risk.assess_risk_level(
            stake_amount,
            bankroll.sizing_base(),
            estimate.confidence,
            analysis.edge,
        ));

        let pick = Pick {
            id: Uuid::new_v4(),
            game_id: line.game_id.clone(),
            bookmaker: line.bookmaker.clone(),
            market_type: line.market_type,
            selection: line.selection.clone(),
            odds: line.price,
            point: line.point,
            implied_prob: analysis.implied_prob,
            model_prob: analysis.model_prob,
            confidence: estimate.confidence,
            edge: analysis.edge,
            ev: analysis.ev,
            ev_per_100: analysis.ev_per_100,
            recommendation: analysis.recommendation,
            stake_fraction,
            stake_amount,
            risk_level,
            decision,
            status: PickStatus::Pending,
            reasons,
            warnings: sizing.warnings,
            observed_at: line.observed_at,
            evaluated_at: now,
        };

        tracing::debug!(
            pick_id = %pick.id,
            game_id = %pick.game_id,
            selection = %pick.selection,
            edge = %pick.edge,
            ev = %pick.ev,
            tier = %pick.recommendation,
            decision = ?pick.decision,
            reasons = ?pick.reason_strings(),
            "Evaluated line"
        );

        Ok(Some(pick))
    }

    /// Evaluates every line of a feed against the estimates that match it.
    ///
    /// Lines with invalid numbers are collected in `rejected` instead of
    /// aborting the batch. All picks see the same bankroll snapshot.
    #[must_use]
    pub fn evaluate_batch(
        &self,
        lines: &[MarketLine],
        estimates: &[ModelEstimate],
        bankroll: &BankrollState,
        now: DateTime<Utc>,
    ) -> BatchEvaluation {
        let by_key: HashMap<SelectionKey, &ModelEstimate> =
            estimates.iter().map(|e| (e.key(), e)).collect();

        let mut batch = BatchEvaluation::default();
        for line in lines {
            match self.evaluate(line, by_key.get(&line.key()).copied(), bankroll, now) {
                Ok(Some(pick)) => batch.picks.push(pick),
                Ok(None) => batch.missing_estimates += 1,
                Err(error) => {
                    tracing::warn!(
                        game_id = %line.game_id,
                        bookmaker = %line.bookmaker,
                        selection = %line.selection,
                        error = %error,
                        "Rejected market line"
                    );
                    batch.rejected.push(RejectedLine {
                        line: line.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            lines = lines.len(),
            picks = batch.picks.len(),
            bets = batch.picks.iter().filter(|p| p.is_bet()).count(),
            rejected = batch.rejected.len(),
            missing_estimates = batch.missing_estimates,
            "Batch evaluation complete"
        );

        batch
    }
}
