//! Tuning configuration for tanks, projectiles, obstacles and scenarios.
//!
//! Every struct deserializes with `#[serde(default)]`, so a scenario file
//! only has to name the values it overrides. Defaults carry the game's
//! shipped tuning.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, ConfigError, Result};

// =============================================================================
// Tank
// =============================================================================

/// Tuning shared by player and enemy tanks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Health at spawn.
    pub max_health: f32,
    /// Forward speed in units per second.
    pub move_speed: f32,
    /// Body turn rate in degrees per second.
    pub turn_rate: f32,
    /// Turret interpolation speed (fraction of remaining delta per second).
    pub turret_rotation_speed: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Radius of the collision sphere used by traces and contacts.
    pub collision_radius: f32,
    /// Distance from the hull origin to the barrel's projectile spawn point.
    pub muzzle_offset: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 400.0,
            turn_rate: 100.0,
            turret_rotation_speed: 5.0,
            fire_rate: 2.0,
            collision_radius: 90.0,
            muzzle_offset: 120.0,
        }
    }
}

impl TankConfig {
    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("max_health", self.max_health)?;
        ensure_non_negative("move_speed", self.move_speed)?;
        ensure_non_negative("turn_rate", self.turn_rate)?;
        ensure_non_negative("turret_rotation_speed", self.turret_rotation_speed)?;
        ensure_positive("fire_rate", self.fire_rate)?;
        ensure_positive("collision_radius", self.collision_radius)?;
        ensure_non_negative("muzzle_offset", self.muzzle_offset)
    }
}

// =============================================================================
// Enemy AI
// =============================================================================

/// Tuning for AI-controlled tanks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    /// Hull, turret and gun tuning.
    pub tank: TankConfig,
    /// Distance within which the player is chased.
    pub detection_range: f32,
    /// Distance within which the tank stops and shoots.
    pub attack_range: f32,
    /// Radius around the spawn location that patrol points are drawn from.
    pub patrol_radius: f32,
    /// Distance to the patrol target that counts as "arrived".
    pub patrol_arrival_distance: f32,
    /// Acceptance radius passed with every move request.
    pub acceptance_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            tank: TankConfig::default(),
            detection_range: 1500.0,
            attack_range: 800.0,
            patrol_radius: 1000.0,
            patrol_arrival_distance: 100.0,
            acceptance_radius: 50.0,
        }
    }
}

impl EnemyConfig {
    /// Validates the tank tuning, the ranges and their ordering.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RangeOrder`] when the attack range reaches past
    /// the detection range, or the first out-of-range field.
    pub fn validate(&self) -> Result<()> {
        self.tank.validate()?;
        ensure_non_negative("detection_range", self.detection_range)?;
        ensure_non_negative("attack_range", self.attack_range)?;
        ensure_non_negative("patrol_radius", self.patrol_radius)?;
        ensure_non_negative("patrol_arrival_distance", self.patrol_arrival_distance)?;
        ensure_non_negative("acceptance_radius", self.acceptance_radius)?;
        if self.attack_range > self.detection_range {
            return Err(ConfigError::RangeOrder {
                attack_range: self.attack_range,
                detection_range: self.detection_range,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Projectile
// =============================================================================

/// Tuning for fired shells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Damage dealt on impact.
    pub damage: f32,
    /// Seconds before the shell expires on its own.
    pub life_span: f32,
    /// Flight speed in units per second.
    pub speed: f32,
    /// Radius of the shell's collision sphere.
    pub collision_radius: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            damage: 25.0,
            life_span: 3.0,
            speed: 2000.0,
            collision_radius: 10.0,
        }
    }
}

impl ProjectileConfig {
    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("damage", self.damage)?;
        ensure_positive("life_span", self.life_span)?;
        ensure_positive("speed", self.speed)?;
        ensure_positive("projectile collision_radius", self.collision_radius)
    }
}

// =============================================================================
// Obstacle
// =============================================================================

/// Presentation category of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Straight wall segment.
    #[default]
    Wall,
    /// Low barricade.
    Barricade,
    /// Building block.
    Building,
    /// Boulder.
    Rock,
}

/// Tuning for static obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    /// Presentation category.
    pub kind: ObstacleKind,
    /// When false, damage never changes health.
    pub destructible: bool,
    /// Health at spawn.
    pub max_health: f32,
    /// Radius of the collision sphere.
    pub collision_radius: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            kind: ObstacleKind::Wall,
            destructible: true,
            max_health: 50.0,
            collision_radius: 100.0,
        }
    }
}

impl ObstacleConfig {
    /// Validates every field.
    ///
    /// # Errors
    ///
    /// Returns the first field that is out of range.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("obstacle max_health", self.max_health)?;
        ensure_positive("obstacle collision_radius", self.collision_radius)
    }
}

// =============================================================================
// World
// =============================================================================

/// Axis-aligned walkable rectangle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Bounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Square bounds of the given half extent centered on the origin.
    #[must_use]
    pub fn centered(half_extent: f32) -> Self {
        Self::new(Vec2::splat(-half_extent), Vec2::splat(half_extent))
    }

    /// Returns true if the point's XY position lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::centered(5000.0)
    }
}

/// Settings for the reference world that hosts the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for patrol-point sampling.
    pub seed: u64,
    /// Walkable area; patrol samples and projectile spawns outside it fail.
    pub bounds: Bounds,
    /// Projectile spawns fail once this many shells are in flight.
    pub max_live_projectiles: usize,
    /// Tuning applied to every spawned shell.
    pub projectile: ProjectileConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            bounds: Bounds::default(),
            max_live_projectiles: 256,
            projectile: ProjectileConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Validates the bounds and projectile tuning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBounds`] for an inverted rectangle, or the
    /// first invalid projectile field.
    pub fn validate(&self) -> Result<()> {
        let Bounds { min, max } = self.bounds;
        if !(min.x < max.x && min.y < max.y) {
            return Err(ConfigError::EmptyBounds {
                min: min.to_array(),
                max: max.to_array(),
            });
        }
        self.projectile.validate()
    }
}

// =============================================================================
// Scenario
// =============================================================================

/// Spawn placement on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// World position.
    pub position: Vec3,
    /// Initial body yaw in degrees.
    pub yaw: f32,
}

impl Placement {
    /// Placement at `position` facing `yaw`.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

/// Player tank spawn entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSpawn {
    /// Where the tank starts.
    pub placement: Placement,
    /// Tank tuning.
    pub tank: TankConfig,
}

/// Enemy tank spawn entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySpawn {
    /// Where the tank starts; also the patrol anchor.
    pub placement: Placement,
    /// AI and tank tuning.
    pub enemy: EnemyConfig,
}

/// Obstacle spawn entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSpawn {
    /// Obstacle position.
    pub position: Vec3,
    /// Obstacle tuning.
    pub obstacle: ObstacleConfig,
}

/// A complete battle setup: world settings plus everything spawned in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Human-readable scenario name.
    pub name: String,
    /// Fixed step length in seconds.
    pub fixed_delta: f32,
    /// World settings.
    pub world: WorldConfig,
    /// The player tank, if any.
    pub player: Option<PlayerSpawn>,
    /// Enemy tanks.
    pub enemies: Vec<EnemySpawn>,
    /// Obstacles.
    pub obstacles: Vec<ObstacleSpawn>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "skirmish".to_string(),
            fixed_delta: 1.0 / 60.0,
            world: WorldConfig::default(),
            player: Some(PlayerSpawn::default()),
            enemies: vec![
                EnemySpawn {
                    placement: Placement::new(Vec3::new(1200.0, 0.0, 0.0), 180.0),
                    enemy: EnemyConfig::default(),
                },
                EnemySpawn {
                    placement: Placement::new(Vec3::new(-2500.0, 1500.0, 0.0), 0.0),
                    enemy: EnemyConfig::default(),
                },
            ],
            obstacles: vec![
                ObstacleSpawn {
                    position: Vec3::new(600.0, 400.0, 0.0),
                    obstacle: ObstacleConfig::default(),
                },
                ObstacleSpawn {
                    position: Vec3::new(-800.0, -600.0, 0.0),
                    obstacle: ObstacleConfig {
                        kind: ObstacleKind::Rock,
                        destructible: false,
                        ..ObstacleConfig::default()
                    },
                },
            ],
        }
    }
}

impl ScenarioConfig {
    /// Parses and validates a scenario from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or the first
    /// validation failure.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Serializes the scenario as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the step length and every spawn entry.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("fixed_delta", self.fixed_delta)?;
        self.world.validate()?;
        if let Some(player) = &self.player {
            player.tank.validate()?;
        }
        for spawn in &self.enemies {
            spawn.enemy.validate()?;
        }
        for spawn in &self.obstacles {
            spawn.obstacle.validate()?;
        }
        Ok(())
    }
}
