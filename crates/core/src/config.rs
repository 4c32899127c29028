use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::bankroll::BankrollState;
use crate::edge::{default_tiers, TierRule};

/// Engine configuration. Every threshold the engine compares against lives
/// here; the components themselves carry no business constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gate: QualityGateConfig,
    pub staking: StakingConfig,
    pub risk: RiskConfig,
    pub tiers: Vec<TierRule>,
    pub bankroll: BankrollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateConfig {
    /// Minimum EV per unit staked.
    pub min_ev: Decimal,
    /// Minimum edge in probability points.
    pub min_edge_prob: Decimal,
    pub min_confidence: Decimal,
    /// Oldest acceptable odds snapshot, in hours.
    pub odds_max_snapshot_age_hours: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Kelly multiplier for the PLAY tier.
    pub kelly_fraction_default: Decimal,
    /// Kelly multiplier for the STRONG_PLAY tier.
    pub strong_kelly_fraction: Decimal,
    /// Flat bankroll fraction for the LEAN tier.
    pub flat_stake_pct: Decimal,
    /// Stakes above this bankroll fraction are flagged high risk.
    pub high_risk_stake_pct: Decimal,
    /// Confidence below this is flagged high risk.
    pub high_risk_confidence: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub skip_min_edge: Decimal,
    /// Independent of `StakingConfig::high_risk_confidence`.
    pub skip_min_confidence: Decimal,
    pub skip_max_stake_pct: Decimal,
    pub level_stake_pct_high: Decimal,
    pub level_confidence_high: Decimal,
    pub level_stake_pct_medium: Decimal,
    pub level_edge_medium: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankrollConfig {
    pub total_bankroll: Decimal,
    /// Daily exposure limit as a fraction of the total bankroll.
    pub daily_exposure_limit: Decimal,
    pub max_bet_pct: Decimal,
}

impl BankrollConfig {
    /// Fresh bankroll state from this configuration.
    #[must_use]
    pub fn initial_state(&self) -> BankrollState {
        BankrollState::new(self.total_bankroll, self.daily_exposure_limit, self.max_bet_pct)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gate: QualityGateConfig::default(),
            staking: StakingConfig::default(),
            risk: RiskConfig::default(),
            tiers: default_tiers(),
            bankroll: BankrollConfig::default(),
        }
    }
}

impl Default for QualityGateConfig {
    fn default() -> Self {
        Self {
            min_ev: Decimal::new(2, 2),        // 0.02
            min_edge_prob: Decimal::new(3, 2), // 0.03
            min_confidence: Decimal::new(60, 2),
            odds_max_snapshot_age_hours: Decimal::new(6, 0),
        }
    }
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            kelly_fraction_default: Decimal::new(25, 2), // quarter Kelly
            strong_kelly_fraction: Decimal::new(50, 2),  // half Kelly
            flat_stake_pct: Decimal::new(2, 2),
            high_risk_stake_pct: Decimal::new(10, 2),
            high_risk_confidence: Decimal::new(60, 2),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            skip_min_edge: Decimal::new(25, 3), // 0.025
            skip_min_confidence: Decimal::new(55, 2),
            skip_max_stake_pct: Decimal::new(15, 2),
            level_stake_pct_high: Decimal::new(5, 2),
            level_confidence_high: Decimal::new(70, 2),
            level_stake_pct_medium: Decimal::new(3, 2),
            level_edge_medium: Decimal::new(5, 2),
        }
    }
}

impl Default for BankrollConfig {
    fn default() -> Self {
        Self {
            total_bankroll: Decimal::new(1000, 0),
            daily_exposure_limit: Decimal::new(20, 2),
            max_bet_pct: Decimal::new(5, 2),
        }
    }
}
