//! Telemetry log for the reference world.
//!
//! The log only records what happened during a step; it never feeds back
//! into simulation state. Drain it with [`EventLog::take_events`] after
//! each step for replays, statistics or presentation cues.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ai::AiState;
use crate::entity::{EntityId, EntityTag};
use crate::host::EffectKind;

/// Something observable that happened during a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A cosmetic effect was requested.
    EffectPlayed {
        /// Tick it happened on.
        tick: u64,
        /// Effect requested.
        kind: EffectKind,
        /// Where it plays.
        position: Vec3,
    },
    /// A tank fired and the shell was spawned.
    ProjectileSpawned {
        /// Tick it happened on.
        tick: u64,
        /// New shell.
        projectile: EntityId,
        /// Tank that fired.
        owner: Option<EntityId>,
    },
    /// A shell spawn was refused.
    ProjectileSpawnFailed {
        /// Tick it happened on.
        tick: u64,
        /// Tank that tried to fire.
        owner: Option<EntityId>,
    },
    /// A shell delivered damage.
    ProjectileImpact {
        /// Tick it happened on.
        tick: u64,
        /// The shell.
        projectile: EntityId,
        /// What it hit.
        target: EntityId,
        /// Damage the target accepted.
        damage: f32,
    },
    /// A shell ran out its lifespan without hitting anything.
    ProjectileExpired {
        /// Tick it happened on.
        tick: u64,
        /// The shell.
        projectile: EntityId,
    },
    /// An entity was removed from the world.
    EntityRemoved {
        /// Tick it happened on.
        tick: u64,
        /// Removed entity.
        entity: EntityId,
        /// Its kind.
        tag: EntityTag,
    },
    /// An enemy's behaviour state changed.
    AiStateChanged {
        /// Tick it happened on.
        tick: u64,
        /// The enemy.
        entity: EntityId,
        /// Previous state.
        from: AiState,
        /// New state.
        to: AiState,
    },
}

impl SimEvent {
    /// Tick the event happened on.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::EffectPlayed { tick, .. }
            | Self::ProjectileSpawned { tick, .. }
            | Self::ProjectileSpawnFailed { tick, .. }
            | Self::ProjectileImpact { tick, .. }
            | Self::ProjectileExpired { tick, .. }
            | Self::EntityRemoved { tick, .. }
            | Self::AiStateChanged { tick, .. } => *tick,
        }
    }
}

/// Append-only event buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<SimEvent>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Appends an event.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Drains and returns every recorded event in record order.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards every recorded event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
