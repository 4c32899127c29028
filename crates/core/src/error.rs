//! Error type for the betting analytics engine.
//!
//! Only malformed numeric inputs and references to unknown picks are hard
//! errors. Threshold and gate failures are recorded on the pick as reasons.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::pick::PickStatus;

/// Errors surfaced by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Decimal odds must be strictly greater than 1 and at most
    /// `odds::MAX_DECIMAL_PRICE`.
    #[error("Invalid decimal odds {price}: must be greater than 1 and at most 10000")]
    InvalidOdds {
        /// Offending decimal price.
        price: Decimal,
    },

    /// American odds of zero have no meaning.
    #[error("Invalid American odds: 0")]
    InvalidAmericanOdds,

    /// A probability or confidence fell outside [0, 1].
    #[error("Invalid {field} {value}: must be within [0, 1]")]
    InvalidProbability {
        /// Name of the offending field.
        field: &'static str,
        /// Offending value.
        value: Decimal,
    },

    /// Settlement referenced a pick that was never recorded.
    #[error("Unknown pick {0}")]
    UnknownPick(Uuid),

    /// Pick status may only move from pending to a terminal state.
    #[error("Invalid pick status transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// Current status.
        from: PickStatus,
        /// Requested status.
        to: PickStatus,
    },

    /// Placing the stake would breach the daily exposure limit.
    #[error("Stake {requested} exceeds available daily exposure {available}")]
    ExposureLimitExceeded {
        /// Requested stake.
        requested: Decimal,
        /// Remaining exposure headroom.
        available: Decimal,
    },
}

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;
