//! Static obstacles. They never act, only absorb damage.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ObstacleConfig, ObstacleKind};
use crate::entity::EntityId;
use crate::health::{DamageEvent, Damageable, Health};
use crate::host::{EffectKind, Host};

/// A wall, barricade, building or rock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    config: ObstacleConfig,
    position: Vec3,
    health: Health,
}

impl Obstacle {
    /// An obstacle at `position`. Non-destructible obstacles get a pool
    /// that ignores damage.
    #[must_use]
    pub const fn new(config: ObstacleConfig, position: Vec3) -> Self {
        let health = if config.destructible {
            Health::new(config.max_health)
        } else {
            Health::indestructible(config.max_health)
        };
        Self {
            config,
            position,
            health,
        }
    }

    /// Obstacle tuning.
    #[must_use]
    pub const fn config(&self) -> &ObstacleConfig {
        &self.config
    }

    /// Presentation category.
    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.config.kind
    }

    /// World position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }
}

impl Damageable for Obstacle {
    fn health(&self) -> &Health {
        &self.health
    }

    fn apply_damage(&mut self, id: EntityId, event: &DamageEvent, host: &mut dyn Host) -> f32 {
        let position = self.position;
        let kind = self.config.kind;
        self.health.apply_damage(event.amount, || {
            host.play_effect(EffectKind::Explosion, position);
            host.play_effect(EffectKind::ExplosionSound, position);
            host.destroy_entity(id);
            debug!(obstacle = %id, ?kind, "obstacle destroyed");
        })
    }
}
