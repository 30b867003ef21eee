//! Entity types stored in the arena.
//!
//! - [`EntityId`]: unique, ordered identifier
//! - [`EntityTag`]: kind classification
//! - [`EntityInner`]: the kind's own state
//! - [`Entity`]: id plus state, with dispatch for the per-step callbacks
//!
//! # Example
//!
//! ```
//! use tankbattle_core::config::ObstacleConfig;
//! use tankbattle_core::entity::{Entity, EntityId, EntityInner, EntityTag};
//! use tankbattle_core::obstacle::Obstacle;
//! use glam::Vec3;
//!
//! let wall = Entity::new(
//!     EntityId::new(42),
//!     EntityInner::Obstacle(Obstacle::new(ObstacleConfig::default(), Vec3::ZERO)),
//! );
//!
//! assert_eq!(wall.id().as_u64(), 42);
//! assert_eq!(wall.tag(), EntityTag::Obstacle);
//! ```

pub mod components;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ai::{AiState, EnemyTank};
use crate::health::{DamageEvent, Damageable, Health};
use crate::host::{Host, TickContext};
use crate::obstacle::Obstacle;
use crate::player::PlayerTank;
use crate::projectile::Projectile;
use crate::tank::{Combatant, TankCore};
use crate::timer::TimerKind;

/// Unique identifier for an entity.
///
/// Ids are ordered by their numeric value; the arena iterates in that order
/// so every step visits entities deterministically.
///
/// ```
/// use tankbattle_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an id from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// The player's tank.
    PlayerTank,
    /// An AI-controlled tank.
    EnemyTank,
    /// A shell in flight.
    Projectile,
    /// A static obstacle.
    Obstacle,
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerTank => write!(f, "PlayerTank"),
            Self::EnemyTank => write!(f, "EnemyTank"),
            Self::Projectile => write!(f, "Projectile"),
            Self::Obstacle => write!(f, "Obstacle"),
        }
    }
}

/// Per-kind entity state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Player tank state.
    PlayerTank(PlayerTank),
    /// Enemy tank state.
    EnemyTank(EnemyTank),
    /// Shell state.
    Projectile(Projectile),
    /// Obstacle state.
    Obstacle(Obstacle),
}

impl EntityInner {
    /// Tag matching this variant.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::PlayerTank(_) => EntityTag::PlayerTank,
            Self::EnemyTank(_) => EntityTag::EnemyTank,
            Self::Projectile(_) => EntityTag::Projectile,
            Self::Obstacle(_) => EntityTag::Obstacle,
        }
    }

    /// Player tank state, if this is the player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerTank> {
        match self {
            Self::PlayerTank(player) => Some(player),
            _ => None,
        }
    }

    /// Mutable player tank state, if this is the player.
    #[must_use]
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerTank> {
        match self {
            Self::PlayerTank(player) => Some(player),
            _ => None,
        }
    }

    /// Enemy state, if this is an enemy.
    #[must_use]
    pub const fn as_enemy(&self) -> Option<&EnemyTank> {
        match self {
            Self::EnemyTank(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Mutable enemy state, if this is an enemy.
    #[must_use]
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyTank> {
        match self {
            Self::EnemyTank(enemy) => Some(enemy),
            _ => None,
        }
    }

    /// Shell state, if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&Projectile> {
        match self {
            Self::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Mutable shell state, if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut Projectile> {
        match self {
            Self::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    /// Obstacle state, if this is an obstacle.
    #[must_use]
    pub const fn as_obstacle(&self) -> Option<&Obstacle> {
        match self {
            Self::Obstacle(obstacle) => Some(obstacle),
            _ => None,
        }
    }
}

/// An entity in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Wraps `inner` under `id`.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// The entity's id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// The entity's kind.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Per-kind state.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Mutable per-kind state.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Returns `true` for player and enemy tanks.
    #[must_use]
    pub const fn is_tank(&self) -> bool {
        matches!(self.inner, EntityInner::PlayerTank(_) | EntityInner::EnemyTank(_))
    }

    /// Returns `true` for shells.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.inner, EntityInner::Projectile(_))
    }

    /// Shared tank state for either tank kind.
    #[must_use]
    pub fn tank(&self) -> Option<&TankCore> {
        match &self.inner {
            EntityInner::PlayerTank(player) => Some(player.tank()),
            EntityInner::EnemyTank(enemy) => Some(enemy.tank()),
            _ => None,
        }
    }

    /// Mutable shared tank state for either tank kind.
    #[must_use]
    pub fn tank_mut(&mut self) -> Option<&mut TankCore> {
        match &mut self.inner {
            EntityInner::PlayerTank(player) => Some(player.tank_mut()),
            EntityInner::EnemyTank(enemy) => Some(enemy.tank_mut()),
            _ => None,
        }
    }

    /// Health pool, for kinds that have one.
    #[must_use]
    pub fn health(&self) -> Option<&Health> {
        match &self.inner {
            EntityInner::PlayerTank(player) => Some(player.health()),
            EntityInner::EnemyTank(enemy) => Some(enemy.health()),
            EntityInner::Obstacle(obstacle) => Some(obstacle.health()),
            EntityInner::Projectile(_) => None,
        }
    }

    /// Current world position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        match &self.inner {
            EntityInner::PlayerTank(player) => player.tank().position(),
            EntityInner::EnemyTank(enemy) => enemy.tank().position(),
            EntityInner::Projectile(projectile) => projectile.position(),
            EntityInner::Obstacle(obstacle) => obstacle.position(),
        }
    }

    /// Radius of the collision sphere.
    #[must_use]
    pub fn collision_radius(&self) -> f32 {
        match &self.inner {
            EntityInner::PlayerTank(player) => player.tank().config().collision_radius,
            EntityInner::EnemyTank(enemy) => enemy.tank().config().collision_radius,
            EntityInner::Projectile(projectile) => projectile.config().collision_radius,
            EntityInner::Obstacle(obstacle) => obstacle.config().collision_radius,
        }
    }

    /// Whether the entity's destruction latch has fired (shells: spent).
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        match &self.inner {
            EntityInner::Projectile(projectile) => projectile.is_spent(),
            _ => self.health().is_some_and(Health::is_destroyed),
        }
    }

    /// Current AI state, for enemies.
    #[must_use]
    pub fn ai_state(&self) -> Option<AiState> {
        self.inner.as_enemy().map(EnemyTank::state)
    }

    /// Whether the per-step loop should tick this entity.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        match &self.inner {
            EntityInner::PlayerTank(player) => player.tank().is_ticking(),
            EntityInner::EnemyTank(enemy) => enemy.tank().is_ticking(),
            EntityInner::Projectile(projectile) => !projectile.is_spent(),
            EntityInner::Obstacle(_) => false,
        }
    }

    /// Runs this entity's per-step behaviour.
    pub fn tick(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        match &mut self.inner {
            EntityInner::PlayerTank(player) => player.tick(ctx, host),
            EntityInner::EnemyTank(enemy) => enemy.tick(ctx, host),
            EntityInner::Projectile(projectile) => projectile.tick(ctx, host),
            EntityInner::Obstacle(_) => {}
        }
    }

    /// Delivers a timer callback.
    pub fn on_timer(&mut self, kind: TimerKind, ctx: &TickContext, host: &mut dyn Host) {
        if let EntityInner::EnemyTank(enemy) = &mut self.inner {
            enemy.on_timer(kind, ctx, host);
        }
    }

    /// Routes damage to the entity's health model. Shells have none and
    /// accept nothing.
    pub fn apply_damage(&mut self, event: &DamageEvent, host: &mut dyn Host) -> f32 {
        let id = self.id;
        match &mut self.inner {
            EntityInner::PlayerTank(player) => player.apply_damage(id, event, host),
            EntityInner::EnemyTank(enemy) => enemy.apply_damage(id, event, host),
            EntityInner::Obstacle(obstacle) => obstacle.apply_damage(id, event, host),
            EntityInner::Projectile(_) => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnemyConfig, ObstacleConfig, Placement, ProjectileConfig, TankConfig};
    use crate::math::Rotator;
    use crate::tests::ScriptedHost;

    fn player(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityInner::PlayerTank(PlayerTank::new(TankConfig::default(), Placement::default())),
        )
    }

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_value() {
            assert!(EntityId::new(1) < EntityId::new(2));
        }

        #[test]
        fn formatting() {
            assert_eq!(format!("{:?}", EntityId::new(42)), "EntityId(42)");
            assert_eq!(format!("{}", EntityId::new(42)), "42");
        }

        #[test]
        fn conversions() {
            let id: EntityId = 7u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 7);
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn tag_follows_inner() {
            let shell = Entity::new(
                EntityId::new(3),
                EntityInner::Projectile(Projectile::new(
                    ProjectileConfig::default(),
                    Vec3::ZERO,
                    Rotator::ZERO,
                    None,
                )),
            );
            assert_eq!(shell.tag(), EntityTag::Projectile);
            assert!(shell.is_projectile());
            assert!(shell.tank().is_none());
            assert!(shell.health().is_none());
        }

        #[test]
        fn tanks_expose_core() {
            let enemy = Entity::new(
                EntityId::new(2),
                EntityInner::EnemyTank(EnemyTank::new(
                    EnemyConfig::default(),
                    Placement::new(Vec3::X, 0.0),
                )),
            );
            assert!(enemy.is_tank());
            assert_eq!(enemy.position(), Vec3::X);
            assert_eq!(enemy.ai_state(), Some(AiState::Idle));
            assert_eq!(enemy.collision_radius(), 90.0);
        }

        #[test]
        fn obstacles_never_tick() {
            let wall = Entity::new(
                EntityId::new(5),
                EntityInner::Obstacle(Obstacle::new(ObstacleConfig::default(), Vec3::ZERO)),
            );
            assert!(!wall.is_ticking());
        }

        #[test]
        fn projectile_rejects_damage() {
            let mut host = ScriptedHost::new();
            let mut shell = Entity::new(
                EntityId::new(3),
                EntityInner::Projectile(Projectile::new(
                    ProjectileConfig::default(),
                    Vec3::ZERO,
                    Rotator::ZERO,
                    None,
                )),
            );
            assert_eq!(shell.apply_damage(&DamageEvent::new(10.0), &mut host), 0.0);
        }

        #[test]
        fn damage_dispatch_uses_entity_id() {
            let mut host = ScriptedHost::new();
            let mut tank = player(9);

            assert_eq!(tank.apply_damage(&DamageEvent::new(100.0), &mut host), 100.0);
            assert!(tank.is_destroyed());
            assert!(!tank.is_ticking());
        }

        #[test]
        fn serde_roundtrip() {
            let tank = player(1);
            let json = serde_json::to_string(&tank).unwrap();
            let back: Entity = serde_json::from_str(&json).unwrap();
            assert_eq!(tank, back);
        }
    }
}
