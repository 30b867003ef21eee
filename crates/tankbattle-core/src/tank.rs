//! State and behaviour shared by player and enemy tanks.
//!
//! [`TankCore`] holds the hull transform, turret, weapon and health of one
//! tank. Player and enemy tanks wrap it and add their own control layer;
//! both expose it through [`Combatant`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{Placement, TankConfig};
use crate::entity::components::{StatusFlags, TransformState};
use crate::entity::EntityId;
use crate::fire_control::FireControl;
use crate::health::{DamageEvent, Health};
use crate::host::{EffectKind, Host, SpawnKind, SpawnRequest, TickContext};
use crate::math::Rotator;
use crate::turret::Turret;

/// Hull, turret, weapon and health of one tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankCore {
    config: TankConfig,
    transform: TransformState,
    turret: Turret,
    fire_control: FireControl,
    health: Health,
    flags: StatusFlags,
}

impl TankCore {
    /// A full-health tank at `placement` with its turret facing forward.
    #[must_use]
    pub const fn new(config: TankConfig, placement: Placement) -> Self {
        Self {
            config,
            transform: TransformState::new(placement.position, placement.yaw),
            turret: Turret::new(placement.yaw, config.turret_rotation_speed),
            fire_control: FireControl::new(config.fire_rate),
            health: Health::new(config.max_health),
            flags: StatusFlags::empty(),
        }
    }

    /// Tuning this tank was built with.
    #[must_use]
    pub const fn config(&self) -> &TankConfig {
        &self.config
    }

    /// Hull position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Hull rotation.
    #[must_use]
    pub const fn rotation(&self) -> Rotator {
        self.transform.rotation
    }

    /// Moves the hull. Used by locomotion.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Turns the hull. Used by locomotion.
    pub fn set_rotation(&mut self, rotation: Rotator) {
        self.transform.rotation = rotation;
    }

    /// Turret world rotation.
    #[must_use]
    pub const fn turret_rotation(&self) -> Rotator {
        self.turret.rotation()
    }

    /// Weapon cooldown state.
    #[must_use]
    pub const fn fire_control(&self) -> &FireControl {
        &self.fire_control
    }

    /// Health pool.
    #[must_use]
    pub const fn health(&self) -> &Health {
        &self.health
    }

    /// Presentation flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Whether the tank has been destroyed.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.health.is_destroyed()
    }

    /// Whether the tank still takes part in the per-step tick loop.
    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        !self.flags.contains(StatusFlags::TICK_DISABLED)
    }

    /// Projectile spawn point and orientation at the end of the barrel.
    #[must_use]
    pub fn muzzle(&self) -> (Vec3, Rotator) {
        let rotation = self.turret.rotation();
        let position = self.transform.position + rotation.forward_vector() * self.config.muzzle_offset;
        (position, rotation)
    }

    /// Eases the turret toward `target`. Does nothing once destroyed.
    pub fn rotate_turret_towards(&mut self, target: Vec3, delta_time: f32) -> Rotator {
        if self.is_destroyed() {
            return self.turret.rotation();
        }
        self.turret.aim(self.transform.position, target, delta_time)
    }

    /// Fires a projectile from the muzzle if alive and off cooldown.
    ///
    /// Returns `true` only when the host actually spawned the projectile.
    pub fn try_fire(&mut self, id: EntityId, now: f32, host: &mut dyn Host) -> bool {
        if self.is_destroyed() {
            return false;
        }

        let (position, rotation) = self.muzzle();
        let fired = self.fire_control.try_fire(now, || {
            host.spawn_entity(SpawnRequest {
                kind: SpawnKind::Projectile,
                position,
                rotation,
                owner: Some(id),
            })
        });

        match fired {
            Some(projectile) => {
                trace!(tank = %id, %projectile, "fired");
                true
            }
            None => false,
        }
    }

    /// Applies damage and runs the tank destruction hook on a fatal hit.
    ///
    /// The base hook hides the tank, stops it ticking and plays an
    /// explosion at the hull. `on_destroyed` then runs for the wrapper's
    /// own cleanup.
    pub fn apply_damage(
        &mut self,
        id: EntityId,
        event: &DamageEvent,
        host: &mut dyn Host,
        on_destroyed: impl FnOnce(&mut dyn Host),
    ) -> f32 {
        let flags = &mut self.flags;
        let position = self.transform.position;

        self.health.apply_damage(event.amount, || {
            flags.insert(StatusFlags::HIDDEN | StatusFlags::TICK_DISABLED);
            host.play_effect(EffectKind::Explosion, position);
            debug!(tank = %id, instigator = ?event.instigator, "tank destroyed");
            on_destroyed(&mut *host);
        })
    }
}

/// Shared surface of anything built on a [`TankCore`].
pub trait Combatant {
    /// The underlying tank.
    fn tank(&self) -> &TankCore;

    /// Mutable access to the underlying tank.
    fn tank_mut(&mut self) -> &mut TankCore;

    /// Fires if alive and off cooldown. See [`TankCore::try_fire`].
    fn try_fire(&mut self, ctx: &TickContext, host: &mut dyn Host) -> bool {
        self.tank_mut().try_fire(ctx.entity_id, ctx.now, host)
    }

    /// Eases the turret toward `target`.
    fn rotate_turret_towards(&mut self, target: Vec3, delta_time: f32) -> Rotator {
        self.tank_mut().rotate_turret_towards(target, delta_time)
    }
}
