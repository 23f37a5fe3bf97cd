//! Error types for the combat core.
//!
//! Nothing in the combat core is fatal. [`CombatError`] describes why a single
//! attack, AI decision or collision query was skipped; the tick pipeline logs it
//! and moves on to the next event. [`ConfigError`] is returned to callers that
//! load a [`CombatConfig`](crate::config::CombatConfig) from JSON.

use thiserror::Error;

use crate::entity::ActorId;

/// Why a per-event operation was skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// The actor is not (or no longer) in the roster.
    #[error("unknown actor: {0}")]
    UnknownActor(ActorId),
    /// The actor is still in the roster but died earlier this tick.
    #[error("actor {0} is dead")]
    ActorDead(ActorId),
    /// The attack had no qualifying target.
    #[error("no target in reach")]
    NoTarget,
    /// The engaged target was out of reach of the swing.
    #[error("target out of range: distance {distance}, range {range}")]
    OutOfRange {
        /// Distance from the attack origin to the target
        distance: f32,
        /// Reach of the attack
        range: f32,
    },
    /// The attacker is not part of the current engagement.
    #[error("actor {0} is not engaged")]
    NotEngaged(ActorId),
}

impl CombatError {
    /// Returns `true` for missing-reference failures that deserve a warning.
    ///
    /// Everything else is an ordinary miss and is only logged at debug level.
    #[must_use]
    pub const fn is_missing_reference(&self) -> bool {
        matches!(self, Self::UnknownActor(_) | Self::ActorDead(_))
    }
}

/// Result type for per-event combat operations.
pub type CombatResult<T> = Result<T, CombatError>;

/// Errors raised while loading or validating a combat configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse combat config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but is out of its allowed domain.
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// Human-readable constraint that was violated
        reason: &'static str,
    },
}
