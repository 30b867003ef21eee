//! Player-controlled tank.
//!
//! Input arrives as a [`PlayerInput`] snapshot that the input layer
//! refreshes between steps. Axis values persist until replaced; the fire
//! trigger is consumed by the tick that acts on it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::{Placement, TankConfig};
use crate::entity::EntityId;
use crate::health::{DamageEvent, Damageable, Health};
use crate::host::{Host, TickContext};
use crate::math::Rotator;
use crate::tank::{Combatant, TankCore};

/// Control state for one player tank.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Forward/backward axis in `[-1, 1]`.
    pub move_forward: f32,
    /// Left/right turn axis in `[-1, 1]`.
    pub turn: f32,
    /// One-shot fire trigger.
    pub fire: bool,
    /// World point under the cursor, if the cursor hit anything.
    pub aim_point: Option<Vec3>,
}

impl PlayerInput {
    /// Copy of this input with both axes clamped to `[-1, 1]`. NaN axes
    /// read as zero.
    #[must_use]
    pub fn clamped(self) -> Self {
        let axis = |value: f32| if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
        Self {
            move_forward: axis(self.move_forward),
            turn: axis(self.turn),
            ..self
        }
    }
}

/// The tank the player drives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTank {
    tank: TankCore,
    input: PlayerInput,
}

impl PlayerTank {
    /// A player tank at `placement` with no input.
    #[must_use]
    pub const fn new(config: TankConfig, placement: Placement) -> Self {
        Self {
            tank: TankCore::new(config, placement),
            input: PlayerInput {
                move_forward: 0.0,
                turn: 0.0,
                fire: false,
                aim_point: None,
            },
        }
    }

    /// Latest input snapshot.
    #[must_use]
    pub const fn input(&self) -> &PlayerInput {
        &self.input
    }

    /// Replaces the input snapshot.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input.clamped();
    }

    /// Turns, moves, aims and fires from the current input, in that order.
    pub fn tick(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        if self.tank.is_destroyed() {
            return;
        }

        let input = self.input;
        self.turn(input.turn, ctx.delta_time);
        self.move_forward(ctx.entity_id, input.move_forward, ctx.delta_time, &*host);
        if let Some(aim_point) = input.aim_point {
            self.tank.rotate_turret_towards(aim_point, ctx.delta_time);
        }
        if input.fire {
            self.input.fire = false;
            self.tank.try_fire(ctx.entity_id, ctx.now, host);
        }
    }

    /// Rotates the hull by `value * turn_rate * delta_time` degrees.
    pub fn turn(&mut self, value: f32, delta_time: f32) {
        if self.tank.is_destroyed() {
            return;
        }
        let rotation = self.tank.rotation();
        let yaw = rotation.yaw + value * self.tank.config().turn_rate * delta_time;
        self.tank.set_rotation(Rotator::new(
            rotation.pitch,
            Rotator::normalize_axis(yaw),
            rotation.roll,
        ));
    }

    /// Drives along the hull's forward vector.
    ///
    /// The move is swept with a trace covering the hull radius and cancelled
    /// if anything is in the way. Returns whether the tank moved.
    pub fn move_forward(&mut self, id: EntityId, value: f32, delta_time: f32, host: &dyn Host) -> bool {
        if self.tank.is_destroyed() {
            return false;
        }

        let distance = value * self.tank.config().move_speed * delta_time;
        if distance == 0.0 {
            return false;
        }

        let direction = self.tank.rotation().forward_vector() * distance.signum();
        let start = self.tank.position();
        let offset = direction * distance.abs();
        let sweep_end = start + offset + direction * self.tank.config().collision_radius;

        if let Some(blocker) = host.line_trace(start, sweep_end, Some(id)) {
            trace!(player = %id, %blocker, "move blocked");
            return false;
        }
        self.tank.set_position(start + offset);
        true
    }
}

impl Combatant for PlayerTank {
    fn tank(&self) -> &TankCore {
        &self.tank
    }

    fn tank_mut(&mut self) -> &mut TankCore {
        &mut self.tank
    }
}

impl Damageable for PlayerTank {
    fn health(&self) -> &Health {
        self.tank.health()
    }

    // The wreck stays in the world; only the base tank hook runs.
    fn apply_damage(&mut self, id: EntityId, event: &DamageEvent, host: &mut dyn Host) -> f32 {
        self.tank.apply_damage(id, event, host, |_| {})
    }
}
