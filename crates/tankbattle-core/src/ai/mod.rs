//! Enemy decision making.
//!
//! Each tick an enemy reclassifies its state from the distance to the
//! tracked player, then runs that state's behaviour. Classification holds
//! no memory: whatever ran last tick has no bearing on the next state.

pub mod enemy;

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::host::TankSnapshot;

pub use enemy::EnemyTank;

/// Behaviour an enemy runs this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiState {
    /// Spawn default. Never selected again once ticking begins.
    #[default]
    Idle,
    /// Wander between random points around the spawn location.
    Patrolling,
    /// Close in on the player while tracking it with the turret.
    Chasing,
    /// Hold position and fire when the line of sight is clear.
    Attacking,
}

impl fmt::Display for AiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Patrolling => write!(f, "Patrolling"),
            Self::Chasing => write!(f, "Chasing"),
            Self::Attacking => write!(f, "Attacking"),
        }
    }
}

/// Picks the state for an enemy at `position`.
///
/// A missing or destroyed player always yields [`AiState::Patrolling`].
/// Both range checks are inclusive.
#[must_use]
pub fn classify(
    position: Vec3,
    player: Option<TankSnapshot>,
    detection_range: f32,
    attack_range: f32,
) -> AiState {
    let Some(player) = player.filter(|player| !player.destroyed) else {
        return AiState::Patrolling;
    };

    let distance = position.distance(player.position);
    if distance <= attack_range {
        AiState::Attacking
    } else if distance <= detection_range {
        AiState::Chasing
    } else {
        AiState::Patrolling
    }
}
