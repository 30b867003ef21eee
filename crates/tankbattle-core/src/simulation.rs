//! Reference host and the fixed-step loop that drives it.
//!
//! [`World`] implements every collaborator trait against an [`Arena`], so
//! the gameplay core can run headless. [`Simulation`] advances it one step
//! at a time:
//!
//! 1. **TIMERS**: deliver every timer due at the new clock time
//! 2. **TICK**: tick each entity in id order
//! 3. **NAVIGATION**: move agents toward their requested goals
//! 4. **CONTACTS**: resolve shell contacts, shells in id order
//! 5. **ADVANCE**: bump the tick counter
//!
//! Each entity callback runs with the entity checked out of the arena, and
//! removals it requests are flushed once the callback returns. An entity
//! queued for removal is invisible to every query from that point on.
//!
//! # Determinism
//!
//! Entities, timers and contacts are all visited in a fixed order and the
//! only randomness (patrol sampling) comes from a seeded `ChaCha8Rng`, so
//! the same scenario, seed and inputs always produce the same run.
//!
//! # Example
//!
//! ```
//! use tankbattle_core::config::ScenarioConfig;
//! use tankbattle_core::simulation::Simulation;
//!
//! let scenario = ScenarioConfig::default();
//! let mut sim = Simulation::from_scenario(&scenario).unwrap();
//!
//! for _ in 0..10 {
//!     sim.step(scenario.fixed_delta);
//! }
//!
//! assert_eq!(sim.tick(), 10);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::ai::{AiState, EnemyTank};
use crate::arena::Arena;
use crate::config::{
    EnemyConfig, ObstacleConfig, Placement, ScenarioConfig, TankConfig, WorldConfig,
};
use crate::entity::{Entity, EntityId, EntityInner, EntityTag};
use crate::error::Result;
use crate::event::{EventLog, SimEvent};
use crate::health::DamageEvent;
use crate::host::{
    EffectKind, Effects, Lifecycle, Navigation, Scheduler, SpawnKind, SpawnRequest, TankSnapshot,
    TickContext, WorldQueries,
};
use crate::math::Rotator;
use crate::obstacle::Obstacle;
use crate::player::{PlayerInput, PlayerTank};
use crate::projectile::{ContactOutcome, Projectile};
use crate::tank::TankCore;
use crate::timer::{TimerHandle, TimerKind, TimerManager};

/// Disc samples tried before a random-point query gives up.
const RANDOM_POINT_ATTEMPTS: usize = 8;

// =============================================================================
// Geometry
// =============================================================================

/// Parameter in `[0, 1]` at which the segment first touches the sphere.
fn segment_sphere_hit(start: Vec3, end: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let offset = start - center;
    let c = offset.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let direction = end - start;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }

    let half_b = offset.dot(direction);
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let t = (-half_b - discriminant.sqrt()) / a;
    (0.0..=1.0).contains(&t).then_some(t)
}

// =============================================================================
// World
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct MoveRequest {
    goal: Vec3,
    acceptance_radius: f32,
}

/// Headless implementation of every collaborator trait.
///
/// Navigation drives agents in a straight line toward their goal at the
/// tank's move speed. Collision is sphere based. Effects and other
/// observable outcomes go to an [`EventLog`].
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    arena: Arena,
    timers: TimerManager,
    moves: BTreeMap<EntityId, MoveRequest>,
    pending_removal: BTreeSet<EntityId>,
    events: EventLog,
    rng: ChaCha8Rng,
    player: Option<EntityId>,
    now: f32,
}

impl World {
    /// Empty world at time zero.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            arena: Arena::new(),
            timers: TimerManager::new(),
            moves: BTreeMap::new(),
            pending_removal: BTreeSet::new(),
            events: EventLog::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            player: None,
            now: 0.0,
        }
    }

    /// World settings.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Entity store.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Pending timers.
    #[must_use]
    pub const fn timers(&self) -> &TimerManager {
        &self.timers
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub const fn events(&self) -> &EventLog {
        &self.events
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.now
    }

    /// Whether `id` has an active move request.
    #[must_use]
    pub fn is_moving(&self, id: EntityId) -> bool {
        self.moves.contains_key(&id)
    }

    /// Number of shells in flight.
    #[must_use]
    pub fn live_projectiles(&self) -> usize {
        self.arena
            .entities_sorted()
            .filter(|entity| entity.is_projectile() && !self.pending_removal.contains(&entity.id()))
            .count()
    }

    /// Runs `f` with entity `id` checked out, then flushes removals.
    ///
    /// Returns `None` without calling `f` when the entity does not exist or
    /// is already queued for removal.
    fn with_entity<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Entity, &mut Self) -> R,
    ) -> Option<R> {
        if self.pending_removal.contains(&id) {
            return None;
        }
        let mut entity = self.arena.take(id)?;
        let result = f(&mut entity, self);
        self.arena.restore(entity);
        self.flush_removals();
        Some(result)
    }

    fn flush_removals(&mut self) {
        let tick = self.arena.current_tick();
        for id in std::mem::take(&mut self.pending_removal) {
            self.moves.remove(&id);
            self.timers.clear_all_for(id);

            let Some(entity) = self.arena.despawn(id) else {
                trace!(entity = %id, "removal of unknown entity ignored");
                continue;
            };
            let event = match entity.inner().as_projectile() {
                Some(projectile) if projectile.is_expired() => SimEvent::ProjectileExpired {
                    tick,
                    projectile: id,
                },
                _ => SimEvent::EntityRemoved {
                    tick,
                    entity: id,
                    tag: entity.tag(),
                },
            };
            debug!(entity = %id, tag = %entity.tag(), "entity removed");
            self.events.push(event);
        }
    }

    fn spawn(&mut self, inner: EntityInner) -> EntityId {
        self.arena.spawn(inner)
    }

    // =========================================================================
    // Step phases
    // =========================================================================

    fn fire_due_timers(&mut self, tick: u64, delta_time: f32) {
        let now = self.now;
        for fired in self.timers.drain_due(now) {
            let ctx = TickContext::new(fired.owner, tick, now, delta_time);
            trace!(owner = %fired.owner, kind = ?fired.kind, "timer fired");
            self.with_entity(fired.owner, |entity, world| {
                entity.on_timer(fired.kind, &ctx, world);
            });
        }
    }

    fn tick_entity(&mut self, id: EntityId, tick: u64, delta_time: f32) {
        let ctx = TickContext::new(id, tick, self.now, delta_time);
        self.with_entity(id, |entity, world| {
            if !entity.is_ticking() {
                return;
            }
            let before = entity.ai_state();
            entity.tick(&ctx, world);
            if let (Some(from), Some(to)) = (before, entity.ai_state()) {
                if from != to {
                    world.events.push(SimEvent::AiStateChanged {
                        tick,
                        entity: id,
                        from,
                        to,
                    });
                }
            }
        });
    }

    fn integrate_navigation(&mut self, delta_time: f32) {
        let requests: Vec<(EntityId, MoveRequest)> =
            self.moves.iter().map(|(id, request)| (*id, *request)).collect();

        for (id, request) in requests {
            let arrived = match self.arena.get_mut(id).and_then(Entity::tank_mut) {
                Some(tank) if !tank.is_destroyed() => advance_agent(tank, request, delta_time),
                _ => true,
            };
            self.arena.update_spatial(id);
            if arrived {
                self.moves.remove(&id);
            }
        }
    }

    fn resolve_contacts(&mut self, tick: u64) {
        let shells: Vec<EntityId> = self
            .arena
            .entities_sorted()
            .filter(|entity| entity.is_projectile())
            .map(Entity::id)
            .collect();
        let reach = self.max_collision_radius();

        for id in shells {
            self.with_entity(id, |entity, world| {
                let Some(projectile) = entity.inner_mut().as_projectile_mut() else {
                    return;
                };
                if projectile.is_spent() {
                    return;
                }

                let touching = world.touching(
                    id,
                    projectile.position(),
                    projectile.config().collision_radius,
                    reach,
                );
                for other in touching {
                    let outcome = projectile.on_contact(id, other, world);
                    if let ContactOutcome::Impact { target, damage } = outcome {
                        world.events.push(SimEvent::ProjectileImpact {
                            tick,
                            projectile: id,
                            target,
                            damage,
                        });
                    }
                    if projectile.is_spent() {
                        break;
                    }
                }
            });
        }
    }

    /// Non-shell entities whose collision sphere overlaps the given sphere,
    /// in id order.
    fn touching(&self, source: EntityId, center: Vec3, radius: f32, reach: f32) -> Vec<EntityId> {
        self.arena
            .spatial()
            .query_radius(center, radius + reach)
            .into_iter()
            .filter(|other| *other != source && !self.pending_removal.contains(other))
            .filter(|other| {
                self.arena.get(*other).is_some_and(|entity| {
                    !entity.is_projectile()
                        && entity.position().distance(center) <= radius + entity.collision_radius()
                })
            })
            .collect()
    }

    fn max_collision_radius(&self) -> f32 {
        self.arena
            .entities_sorted()
            .filter(|entity| !entity.is_projectile())
            .map(Entity::collision_radius)
            .fold(0.0, f32::max)
    }
}

/// Steps one agent toward its goal. Returns `true` once it is within the
/// acceptance radius.
fn advance_agent(tank: &mut TankCore, request: MoveRequest, delta_time: f32) -> bool {
    let position = tank.position();
    let to_goal = request.goal - position;
    let distance = to_goal.length();
    if distance <= request.acceptance_radius {
        return true;
    }

    let step = (tank.config().move_speed * delta_time).min(distance - request.acceptance_radius);
    if let Some(yaw) = Rotator::yaw_towards(position, request.goal) {
        tank.set_rotation(Rotator::from_yaw(yaw));
    }
    tank.set_position(position + to_goal / distance * step);
    distance - step <= request.acceptance_radius
}

impl Navigation for World {
    fn move_to(&mut self, agent: EntityId, target: Vec3, acceptance_radius: f32) {
        self.moves.insert(
            agent,
            MoveRequest {
                goal: target,
                acceptance_radius,
            },
        );
    }

    fn stop_movement(&mut self, agent: EntityId) {
        self.moves.remove(&agent);
    }

    fn find_random_reachable_point(&mut self, center: Vec3, radius: f32) -> Option<Vec3> {
        let bounds = self.config.bounds;
        if radius <= 0.0 {
            return bounds.contains(center).then_some(center);
        }

        for _ in 0..RANDOM_POINT_ATTEMPTS {
            let distance = radius * self.rng.gen::<f32>().sqrt();
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let point = center + Vec3::new(angle.cos() * distance, angle.sin() * distance, 0.0);
            if bounds.contains(point) {
                return Some(point);
            }
        }
        debug!(?center, radius, "no reachable point found");
        None
    }
}

impl WorldQueries for World {
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<EntityId>) -> Option<EntityId> {
        let mut nearest: Option<(f32, EntityId)> = None;
        for entity in self.arena.entities_sorted() {
            let id = entity.id();
            if Some(id) == ignore || entity.is_projectile() || self.pending_removal.contains(&id) {
                continue;
            }
            let hit = segment_sphere_hit(start, end, entity.position(), entity.collision_radius());
            let Some(t) = hit else {
                continue;
            };
            if nearest.map_or(true, |(best, _)| t < best) {
                nearest = Some((t, id));
            }
        }
        nearest.map(|(_, id)| id)
    }

    fn tank_snapshot(&self, id: EntityId) -> Option<TankSnapshot> {
        if self.pending_removal.contains(&id) {
            return None;
        }
        let tank = self.arena.get(id)?.tank()?;
        Some(TankSnapshot {
            position: tank.position(),
            destroyed: tank.is_destroyed(),
        })
    }

    fn player_tank(&self) -> Option<EntityId> {
        self.player
    }
}

impl Lifecycle for World {
    fn spawn_entity(&mut self, request: SpawnRequest) -> Option<EntityId> {
        let tick = self.arena.current_tick();
        match request.kind {
            SpawnKind::Projectile => {
                let in_bounds = self.config.bounds.contains(request.position);
                if !in_bounds || self.live_projectiles() >= self.config.max_live_projectiles {
                    debug!(owner = ?request.owner, in_bounds, "projectile spawn refused");
                    self.events.push(SimEvent::ProjectileSpawnFailed {
                        tick,
                        owner: request.owner,
                    });
                    return None;
                }

                let projectile = Projectile::new(
                    self.config.projectile,
                    request.position,
                    request.rotation,
                    request.owner,
                );
                let id = self.spawn(EntityInner::Projectile(projectile));
                debug!(projectile = %id, owner = ?request.owner, "projectile spawned");
                self.events.push(SimEvent::ProjectileSpawned {
                    tick,
                    projectile: id,
                    owner: request.owner,
                });
                Some(id)
            }
        }
    }

    fn destroy_entity(&mut self, id: EntityId) {
        if !self.pending_removal.insert(id) {
            warn!(entity = %id, "duplicate destroy request");
        }
    }

    fn apply_damage(&mut self, target: EntityId, event: &DamageEvent) -> f32 {
        if self.pending_removal.contains(&target) {
            return 0.0;
        }
        let Some(mut entity) = self.arena.take(target) else {
            warn!(%target, "damage routed to unknown entity");
            return 0.0;
        };
        let damage = entity.apply_damage(event, self);
        self.arena.restore(entity);
        damage
    }
}

impl Effects for World {
    fn play_effect(&mut self, kind: EffectKind, position: Vec3) {
        self.events.push(SimEvent::EffectPlayed {
            tick: self.arena.current_tick(),
            kind,
            position,
        });
    }
}

impl Scheduler for World {
    fn set_timer(&mut self, owner: EntityId, kind: TimerKind, delay: f32) -> TimerHandle {
        let handle = self.timers.set_timer(owner, kind, self.now, delay);
        debug!(%owner, ?kind, delay, ?handle, "timer set");
        handle
    }

    fn clear_timer(&mut self, handle: &mut TimerHandle) {
        if self.timers.clear_timer(handle) {
            debug!("timer cleared");
        }
    }
}

// =============================================================================
// Simulation
// =============================================================================

/// Observable state of one entity, for determinism checks and summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity id.
    pub id: EntityId,
    /// Entity kind.
    pub tag: EntityTag,
    /// World position.
    pub position: Vec3,
    /// Current health, for kinds that have it.
    pub health: Option<f32>,
    /// Destruction latch (shells: spent).
    pub destroyed: bool,
    /// Behaviour state, for enemies.
    pub ai_state: Option<AiState>,
}

/// Fixed-step driver for a [`World`].
#[derive(Debug, Clone)]
pub struct Simulation {
    world: World,
}

impl Simulation {
    /// Empty simulation.
    ///
    /// ```
    /// use tankbattle_core::config::WorldConfig;
    /// use tankbattle_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(WorldConfig::default());
    /// assert_eq!(sim.tick(), 0);
    /// assert!(sim.arena().is_empty());
    /// ```
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        Self {
            world: World::new(config),
        }
    }

    /// Builds a simulation populated from `scenario`.
    ///
    /// The player spawns first so enemies can find it when they start.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure in the scenario.
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self> {
        scenario.validate()?;

        let mut sim = Self::new(scenario.world);
        if let Some(player) = &scenario.player {
            sim.spawn_player(player.tank, player.placement);
        }
        for spawn in &scenario.enemies {
            sim.spawn_enemy(spawn.enemy, spawn.placement);
        }
        for spawn in &scenario.obstacles {
            sim.spawn_obstacle(spawn.obstacle, spawn.position);
        }
        debug!(
            scenario = %scenario.name,
            entities = sim.arena().entity_count(),
            "scenario loaded"
        );
        Ok(sim)
    }

    /// Spawns the player tank and makes it the one enemies track.
    pub fn spawn_player(&mut self, config: TankConfig, placement: Placement) -> EntityId {
        let id = self
            .world
            .spawn(EntityInner::PlayerTank(PlayerTank::new(config, placement)));
        if let Some(previous) = self.world.player.replace(id) {
            warn!(%previous, player = %id, "player tank replaced");
        }
        id
    }

    /// Spawns an enemy tank and runs its start-of-play setup.
    pub fn spawn_enemy(&mut self, config: EnemyConfig, placement: Placement) -> EntityId {
        let id = self
            .world
            .spawn(EntityInner::EnemyTank(EnemyTank::new(config, placement)));
        let ctx = TickContext::new(id, self.tick(), self.now(), 0.0);
        self.world.with_entity(id, |entity, world| {
            if let Some(enemy) = entity.inner_mut().as_enemy_mut() {
                enemy.begin_play(&ctx, world);
            }
        });
        id
    }

    /// Spawns an obstacle.
    pub fn spawn_obstacle(&mut self, config: ObstacleConfig, position: Vec3) -> EntityId {
        self.world
            .spawn(EntityInner::Obstacle(Obstacle::new(config, position)))
    }

    /// Replaces the player's input. Returns `false` when there is no player
    /// tank to receive it.
    pub fn set_player_input(&mut self, input: PlayerInput) -> bool {
        let player = self
            .world
            .player
            .and_then(|id| self.world.arena.get_mut(id))
            .and_then(|entity| entity.inner_mut().as_player_mut());
        match player {
            Some(player) => {
                player.set_input(input);
                true
            }
            None => false,
        }
    }

    /// Routes damage from outside the step loop. Returns the amount the
    /// target accepted.
    pub fn apply_damage(&mut self, target: EntityId, event: &DamageEvent) -> f32 {
        let damage = Lifecycle::apply_damage(&mut self.world, target, event);
        self.world.flush_removals();
        damage
    }

    /// Advances the world by `delta_time` seconds.
    pub fn step(&mut self, delta_time: f32) {
        let tick = self.world.arena.current_tick();
        self.world.now += delta_time;

        // PHASE 1: TIMERS
        self.world.fire_due_timers(tick, delta_time);

        // PHASE 2: TICK - ids collected up front; shells spawned this step
        // start ticking next step
        let ids: Vec<EntityId> = self.world.arena.entity_ids_sorted().collect();
        for id in ids {
            self.world.tick_entity(id, tick, delta_time);
        }

        // PHASE 3: NAVIGATION
        self.world.integrate_navigation(delta_time);

        // PHASE 4: CONTACTS
        self.world.resolve_contacts(tick);

        // PHASE 5: ADVANCE
        self.world.arena.advance_tick();
    }

    /// The hosting world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Entity store.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.world.arena
    }

    /// Ticks completed so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.world.arena.current_tick()
    }

    /// Simulation clock in seconds.
    #[must_use]
    pub const fn now(&self) -> f32 {
        self.world.now
    }

    /// The player tank, if one was spawned.
    #[must_use]
    pub const fn player(&self) -> Option<EntityId> {
        self.world.player
    }

    /// Drains the event log.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        self.world.events.take_events()
    }

    /// Per-entity state in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.world
            .arena
            .entities_sorted()
            .map(|entity| EntitySnapshot {
                id: entity.id(),
                tag: entity.tag(),
                position: entity.position(),
                health: entity.health().map(|health| health.current()),
                destroyed: entity.is_destroyed(),
                ai_state: entity.ai_state(),
            })
            .collect()
    }
}
