//! Collaborator traits the gameplay core calls into.
//!
//! The core owns combat and decision logic but none of the engine services
//! it leans on. Pathfinding, traces, spawning, damage routing, effects and
//! timers all sit behind the traits here. A game engine adapter, the
//! reference [`World`](crate::simulation::World) and the scripted test host
//! each implement them.
//!
//! Every entity callback receives a [`TickContext`] and `&mut dyn Host`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::health::DamageEvent;
use crate::math::Rotator;
use crate::timer::{TimerHandle, TimerKind};

/// Per-callback context handed to an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    /// The entity being called.
    pub entity_id: EntityId,
    /// Current simulation tick.
    pub tick: u64,
    /// Simulation clock in seconds.
    pub now: f32,
    /// Seconds elapsed since the previous step.
    pub delta_time: f32,
}

impl TickContext {
    /// Creates a context.
    #[must_use]
    pub const fn new(entity_id: EntityId, tick: u64, now: f32, delta_time: f32) -> Self {
        Self {
            entity_id,
            tick,
            now,
            delta_time,
        }
    }
}

/// Read-only view of a tank another entity is tracking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    /// Hull position.
    pub position: Vec3,
    /// Whether the tank's destruction latch has fired.
    pub destroyed: bool,
}

/// Kinds of actor the core asks its host to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    /// A tank shell.
    Projectile,
}

/// A spawn request with initial transform and owner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    /// What to spawn.
    pub kind: SpawnKind,
    /// Spawn position.
    pub position: Vec3,
    /// Spawn orientation.
    pub rotation: Rotator,
    /// Entity credited with whatever the spawned actor does.
    pub owner: Option<EntityId>,
}

/// Cosmetic effects. The core only requests them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Explosion particle burst.
    Explosion,
    /// Explosion sound cue.
    ExplosionSound,
}

/// Pathfinding and locomotion for AI-driven tanks.
pub trait Navigation {
    /// Asks `agent` to path toward `target` and stop within `acceptance_radius`.
    ///
    /// Replaces any move request the agent already has.
    fn move_to(&mut self, agent: EntityId, target: Vec3, acceptance_radius: f32);

    /// Cancels the agent's active move request.
    fn stop_movement(&mut self, agent: EntityId);

    /// Samples a reachable point within `radius` of `center`.
    ///
    /// Returns `None` when no reachable point was found.
    fn find_random_reachable_point(&mut self, center: Vec3, radius: f32) -> Option<Vec3>;
}

/// Synchronous world queries.
pub trait WorldQueries {
    /// Traces a visibility segment and returns the first entity it hits,
    /// skipping `ignore` (normally the tracing entity itself).
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<EntityId>) -> Option<EntityId>;

    /// Looks up a live tank. Returns `None` for ids that no longer refer to
    /// a tank in the world.
    fn tank_snapshot(&self, id: EntityId) -> Option<TankSnapshot>;

    /// The player's tank, if one exists.
    fn player_tank(&self) -> Option<EntityId>;
}

/// Actor lifetime and damage routing.
pub trait Lifecycle {
    /// Spawns an actor. Returns `None` if the spawn failed.
    fn spawn_entity(&mut self, request: SpawnRequest) -> Option<EntityId>;

    /// Requests removal of `id` from the world.
    fn destroy_entity(&mut self, id: EntityId);

    /// Routes damage to `target`'s damage handler. Returns the amount it
    /// accepted.
    fn apply_damage(&mut self, target: EntityId, event: &DamageEvent) -> f32;
}

/// Fire-and-forget cosmetics.
pub trait Effects {
    /// Plays `kind` at `position`.
    fn play_effect(&mut self, kind: EffectKind, position: Vec3);
}

/// One-shot timers.
pub trait Scheduler {
    /// Arms a timer that calls `owner` back with `kind` after `delay` seconds.
    fn set_timer(&mut self, owner: EntityId, kind: TimerKind, delay: f32) -> TimerHandle;

    /// Cancels the timer and invalidates `handle`. Safe on any handle.
    fn clear_timer(&mut self, handle: &mut TimerHandle);
}

/// Everything an entity may call during a callback.
pub trait Host: Navigation + WorldQueries + Lifecycle + Effects + Scheduler {}

impl<T: Navigation + WorldQueries + Lifecycle + Effects + Scheduler> Host for T {}
