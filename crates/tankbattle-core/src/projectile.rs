//! Tank shells and impact resolution.
//!
//! A shell flies straight along its spawn orientation and ends in exactly
//! one of two ways: it touches something other than itself or its owner
//! (impact: damage, effects, removal), or its lifespan runs out (expiry:
//! removal only). Touching its owner or itself changes nothing.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProjectileConfig;
use crate::entity::components::TransformState;
use crate::entity::EntityId;
use crate::health::DamageEvent;
use crate::host::{EffectKind, Host, TickContext};
use crate::math::Rotator;

/// Result of one contact notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactOutcome {
    /// The shell has no owner and ignores contacts.
    Unowned,
    /// Contact with the shell itself or the tank that fired it.
    Ignored,
    /// The shell already hit something or expired.
    Spent,
    /// Damage was routed to `target`, which accepted `damage`.
    Impact {
        /// Entity that was hit.
        target: EntityId,
        /// Damage the target accepted.
        damage: f32,
    },
}

/// A shell in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    config: ProjectileConfig,
    transform: TransformState,
    velocity: Vec3,
    owner: Option<EntityId>,
    age: f32,
    spent: bool,
}

impl Projectile {
    /// A shell at `position` flying along `rotation`.
    #[must_use]
    pub fn new(config: ProjectileConfig, position: Vec3, rotation: Rotator, owner: Option<EntityId>) -> Self {
        Self {
            config,
            transform: TransformState { position, rotation },
            velocity: rotation.forward_vector() * config.speed,
            owner,
            age: 0.0,
            spent: false,
        }
    }

    /// Shell tuning.
    #[must_use]
    pub const fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Flight orientation.
    #[must_use]
    pub const fn rotation(&self) -> Rotator {
        self.transform.rotation
    }

    /// Velocity in units per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Tank that fired the shell.
    #[must_use]
    pub const fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Seconds since spawn.
    #[must_use]
    pub const fn age(&self) -> f32 {
        self.age
    }

    /// Whether the shell has outlived its lifespan.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.age >= self.config.life_span
    }

    /// Whether the shell already hit something or expired.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.spent
    }

    /// Ages the shell, expiring it or advancing it along its velocity.
    pub fn tick(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        if self.spent {
            return;
        }

        self.age += ctx.delta_time;
        if self.is_expired() {
            self.spent = true;
            debug!(projectile = %ctx.entity_id, age = self.age, "projectile expired");
            host.destroy_entity(ctx.entity_id);
            return;
        }

        self.transform.position += self.velocity * ctx.delta_time;
    }

    /// Handles contact between shell `id` and `other`.
    ///
    /// On a valid hit the target receives point damage attributed to the
    /// owner, an explosion and its sound play at the shell, and the shell
    /// asks to be destroyed.
    pub fn on_contact(&mut self, id: EntityId, other: EntityId, host: &mut dyn Host) -> ContactOutcome {
        if self.spent {
            return ContactOutcome::Spent;
        }
        let Some(owner) = self.owner else {
            return ContactOutcome::Unowned;
        };
        if other == id || other == owner {
            return ContactOutcome::Ignored;
        }

        let position = self.transform.position;
        let event = DamageEvent::new(self.config.damage)
            .with_instigator(owner)
            .at_point(position, id);
        let damage = host.apply_damage(other, &event);

        host.play_effect(EffectKind::Explosion, position);
        host.play_effect(EffectKind::ExplosionSound, position);
        self.spent = true;
        host.destroy_entity(id);

        debug!(projectile = %id, target = %other, damage, "projectile impact");
        ContactOutcome::Impact {
            target: other,
            damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{HostCall, ScriptedHost};

    const SHELL: EntityId = EntityId::new(10);
    const OWNER: EntityId = EntityId::new(1);
    const TARGET: EntityId = EntityId::new(2);

    fn shell(owner: Option<EntityId>) -> Projectile {
        Projectile::new(ProjectileConfig::default(), Vec3::ZERO, Rotator::ZERO, owner)
    }

    fn ctx(delta_time: f32) -> TickContext {
        TickContext::new(SHELL, 0, 0.0, delta_time)
    }

    mod contact_tests {
        use super::*;

        #[test]
        fn hit_applies_point_damage_and_effects() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(Some(OWNER));

            let outcome = projectile.on_contact(SHELL, TARGET, &mut host);

            assert_eq!(
                outcome,
                ContactOutcome::Impact {
                    target: TARGET,
                    damage: 25.0,
                }
            );
            assert_eq!(
                host.calls(),
                vec![
                    HostCall::ApplyDamage {
                        target: TARGET,
                        event: DamageEvent::new(25.0)
                            .with_instigator(OWNER)
                            .at_point(Vec3::ZERO, SHELL),
                    },
                    HostCall::Effect {
                        kind: EffectKind::Explosion,
                        position: Vec3::ZERO,
                    },
                    HostCall::Effect {
                        kind: EffectKind::ExplosionSound,
                        position: Vec3::ZERO,
                    },
                    HostCall::Destroy(SHELL),
                ]
            );
        }

        #[test]
        fn owner_contact_is_ignored() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(Some(OWNER));

            assert_eq!(projectile.on_contact(SHELL, OWNER, &mut host), ContactOutcome::Ignored);
            assert_eq!(projectile.on_contact(SHELL, SHELL, &mut host), ContactOutcome::Ignored);
            assert!(host.calls().is_empty());
            assert!(!projectile.is_spent());
        }

        #[test]
        fn unowned_shell_ignores_everything() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(None);

            assert_eq!(projectile.on_contact(SHELL, TARGET, &mut host), ContactOutcome::Unowned);
            assert!(host.calls().is_empty());
        }

        #[test]
        fn only_first_hit_counts() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(Some(OWNER));

            projectile.on_contact(SHELL, TARGET, &mut host);
            let second = projectile.on_contact(SHELL, EntityId::new(3), &mut host);

            assert_eq!(second, ContactOutcome::Spent);
            assert_eq!(host.destroyed(), vec![SHELL]);
        }

        #[test]
        fn owner_contact_still_expires_later() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(Some(OWNER));
            projectile.on_contact(SHELL, OWNER, &mut host);

            for _ in 0..4 {
                projectile.tick(&ctx(1.0), &mut host);
            }

            assert_eq!(host.destroyed(), vec![SHELL]);
            assert!(host.effects().is_empty());
        }
    }

    mod flight_tests {
        use super::*;

        #[test]
        fn flies_along_spawn_rotation() {
            let mut host = ScriptedHost::new();
            let mut projectile = Projectile::new(
                ProjectileConfig::default(),
                Vec3::ZERO,
                Rotator::from_yaw(90.0),
                Some(OWNER),
            );

            projectile.tick(&ctx(0.5), &mut host);

            assert!((projectile.position() - Vec3::new(0.0, 1000.0, 0.0)).length() < 1.0e-2);
            assert!(host.calls().is_empty());
        }

        #[test]
        fn expires_at_life_span_without_damage() {
            let mut host = ScriptedHost::new();
            let mut projectile = shell(Some(OWNER));

            projectile.tick(&ctx(2.0), &mut host);
            assert!(!projectile.is_expired());
            projectile.tick(&ctx(1.0), &mut host);

            assert!(projectile.is_expired());
            assert!(projectile.is_spent());
            assert_eq!(host.calls(), vec![HostCall::Destroy(SHELL)]);
        }
    }
}
