//! Health depletion and the one-way destruction latch.
//!
//! [`Health`] is shared by every damageable entity. It clamps health into
//! `[0, max]`, refuses damage once destroyed (or when built indestructible),
//! and runs the caller's destruction hook exactly once, on the hit that
//! empties it. Each entity kind supplies its own hook: tanks hide and stop
//! ticking, enemies also cancel their fire timer and leave the world,
//! obstacles play their effects and leave the world.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::host::Host;

/// A single damage application.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Requested damage. Negative and NaN amounts are treated as zero.
    pub amount: f32,
    /// Impact point for point damage.
    pub location: Option<Vec3>,
    /// Tank responsible for the damage.
    pub instigator: Option<EntityId>,
    /// Actor that delivered it (e.g. the projectile).
    pub causer: Option<EntityId>,
}

impl DamageEvent {
    /// Plain damage with no attribution.
    #[must_use]
    pub const fn new(amount: f32) -> Self {
        Self {
            amount,
            location: None,
            instigator: None,
            causer: None,
        }
    }

    /// Sets the responsible tank.
    #[must_use]
    pub const fn with_instigator(mut self, instigator: EntityId) -> Self {
        self.instigator = Some(instigator);
        self
    }

    /// Marks this as point damage delivered by `causer` at `location`.
    #[must_use]
    pub const fn at_point(mut self, location: Vec3, causer: EntityId) -> Self {
        self.location = Some(location);
        self.causer = Some(causer);
        self
    }
}

/// Health pool with a destruction latch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    max: f32,
    current: f32,
    destructible: bool,
    destroyed: bool,
}

impl Health {
    /// Full health pool of `max` points.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self {
            max,
            current: max,
            destructible: true,
            destroyed: false,
        }
    }

    /// Health pool that ignores all damage.
    #[must_use]
    pub const fn indestructible(max: f32) -> Self {
        Self {
            destructible: false,
            ..Self::new(max)
        }
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Current health, always within `[0, max]`.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Current health as a fraction of the maximum.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current / self.max
    }

    /// Whether damage can change this pool at all.
    #[must_use]
    pub const fn is_destructible(&self) -> bool {
        self.destructible
    }

    /// Whether the destruction latch has fired.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Drains `amount` points and runs `on_destroyed` if this hit empties
    /// the pool.
    ///
    /// Returns the amount accepted: zero when already destroyed or
    /// indestructible, otherwise the requested amount with negative and NaN
    /// values read as zero. Overkill is not subtracted from the result.
    pub fn apply_damage(&mut self, amount: f32, on_destroyed: impl FnOnce()) -> f32 {
        if self.destroyed || !self.destructible {
            return 0.0;
        }

        // f32::max drops NaN in favour of the other operand
        let amount = amount.max(0.0);
        self.current = (self.current - amount).clamp(0.0, self.max);

        if self.current <= 0.0 {
            self.destroyed = true;
            on_destroyed();
        }
        amount
    }
}

/// Capability shared by every entity that can take damage.
pub trait Damageable {
    /// The entity's health pool.
    fn health(&self) -> &Health;

    /// Applies damage to the entity with id `id`, running its destruction
    /// hook through `host` if the hit is fatal.
    ///
    /// Returns the amount accepted (see [`Health::apply_damage`]).
    fn apply_damage(&mut self, id: EntityId, event: &DamageEvent, host: &mut dyn Host) -> f32;

    /// Whether the entity has been destroyed.
    fn is_destroyed(&self) -> bool {
        self.health().is_destroyed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod apply_damage_tests {
        use super::*;

        #[test]
        fn damage_reduces_health() {
            let mut health = Health::new(100.0);
            let applied = health.apply_damage(30.0, || panic!("not fatal"));

            assert_eq!(applied, 30.0);
            assert!((health.current() - 70.0).abs() < 0.0001);
            assert!(!health.is_destroyed());
        }

        #[test]
        fn fatal_hit_runs_hook_once() {
            let mut health = Health::new(50.0);
            let mut hooks = 0;

            health.apply_damage(50.0, || hooks += 1);
            health.apply_damage(10.0, || hooks += 1);

            assert_eq!(hooks, 1);
            assert!(health.is_destroyed());
            assert_eq!(health.current(), 0.0);
        }

        #[test]
        fn overkill_clamps_to_zero_and_reports_requested() {
            let mut health = Health::new(100.0);
            let applied = health.apply_damage(150.0, || {});

            assert_eq!(applied, 150.0);
            assert_eq!(health.current(), 0.0);
        }

        #[test]
        fn destroyed_pool_accepts_nothing() {
            let mut health = Health::new(10.0);
            health.apply_damage(10.0, || {});

            let applied = health.apply_damage(5.0, || panic!("latched"));
            assert_eq!(applied, 0.0);
            assert_eq!(health.current(), 0.0);
        }

        #[test]
        fn indestructible_pool_ignores_damage() {
            let mut health = Health::indestructible(50.0);
            let applied = health.apply_damage(1000.0, || panic!("indestructible"));

            assert_eq!(applied, 0.0);
            assert_eq!(health.current(), 50.0);
            assert!(!health.is_destroyed());
        }

        #[test]
        fn negative_and_nan_read_as_zero() {
            let mut health = Health::new(100.0);

            assert_eq!(health.apply_damage(-20.0, || {}), 0.0);
            assert_eq!(health.apply_damage(f32::NAN, || {}), 0.0);
            assert_eq!(health.current(), 100.0);
        }
    }

    #[test]
    fn damage_event_builders() {
        let event = DamageEvent::new(25.0)
            .with_instigator(EntityId::new(1))
            .at_point(Vec3::X, EntityId::new(9));

        assert_eq!(event.instigator, Some(EntityId::new(1)));
        assert_eq!(event.causer, Some(EntityId::new(9)));
        assert_eq!(event.location, Some(Vec3::X));
    }

    proptest! {
        #[test]
        fn health_stays_clamped(
            max in 1.0f32..1000.0,
            hits in prop::collection::vec(0.0f32..200.0, 0..40),
        ) {
            let mut health = Health::new(max);
            for amount in hits {
                health.apply_damage(amount, || {});
                prop_assert!(health.current() >= 0.0);
                prop_assert!(health.current() <= health.max());
            }
        }

        #[test]
        fn destruction_is_idempotent(
            max in 1.0f32..500.0,
            extra in prop::collection::vec(0.0f32..200.0, 1..20),
        ) {
            let mut health = Health::new(max);
            let mut hooks = 0u32;
            health.apply_damage(max, || hooks += 1);
            let settled = health;

            for amount in extra {
                prop_assert_eq!(health.apply_damage(amount, || hooks += 1), 0.0);
                prop_assert_eq!(health, settled);
            }
            prop_assert_eq!(hooks, 1);
        }
    }
}
