//! Fire-rate gate.
//!
//! A tank may fire when at least `1 / fire_rate` seconds have passed since
//! its last successful shot. A tank that has never fired is ready
//! immediately. The shot timestamp only moves when the host actually
//! spawned a projectile, so a failed spawn leaves the gate open for an
//! immediate retry.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// Cooldown state for one weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireControl {
    fire_rate: f32,
    last_fire_time: Option<f32>,
}

impl FireControl {
    /// A weapon firing `fire_rate` shots per second that has never fired.
    #[must_use]
    pub const fn new(fire_rate: f32) -> Self {
        Self {
            fire_rate,
            last_fire_time: None,
        }
    }

    /// Shots per second.
    #[must_use]
    pub const fn fire_rate(&self) -> f32 {
        self.fire_rate
    }

    /// Minimum seconds between shots.
    #[must_use]
    pub fn interval(&self) -> f32 {
        1.0 / self.fire_rate
    }

    /// Clock time of the last successful shot.
    #[must_use]
    pub const fn last_fire_time(&self) -> Option<f32> {
        self.last_fire_time
    }

    /// Earliest clock time at which the gate opens again.
    #[must_use]
    pub fn ready_at(&self) -> f32 {
        self.last_fire_time
            .map_or(f32::NEG_INFINITY, |last| last + self.interval())
    }

    /// Whether the cooldown has elapsed at `now`.
    #[must_use]
    pub fn is_ready(&self, now: f32) -> bool {
        self.last_fire_time
            .map_or(true, |last| now - last >= self.interval())
    }

    /// Fires through `spawn` if the cooldown allows it.
    ///
    /// `spawn` is only called when the gate is open. Returns the spawned
    /// projectile, or `None` when gated or when `spawn` failed.
    pub fn try_fire(
        &mut self,
        now: f32,
        spawn: impl FnOnce() -> Option<EntityId>,
    ) -> Option<EntityId> {
        if !self.is_ready(now) {
            return None;
        }
        let projectile = spawn()?;
        self.last_fire_time = Some(now);
        Some(projectile)
    }
}
