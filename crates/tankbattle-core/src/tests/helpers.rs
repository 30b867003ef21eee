//! Test doubles and scenario builders.
//!
//! [`ScriptedHost`] stands in for the engine in unit tests: every query
//! answers from a public field the test sets up, and every command is
//! recorded as a [`HostCall`] so tests can assert the exact sequence an
//! entity produced.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;

use crate::config::{
    EnemyConfig, EnemySpawn, ObstacleConfig, ObstacleSpawn, Placement, PlayerSpawn, ScenarioConfig,
};
use crate::entity::EntityId;
use crate::health::DamageEvent;
use crate::host::{
    EffectKind, Effects, Lifecycle, Navigation, Scheduler, SpawnRequest, TankSnapshot,
    WorldQueries,
};
use crate::simulation::Simulation;
use crate::timer::{TimerHandle, TimerKind, TimerManager};

// =============================================================================
// Scripted Host
// =============================================================================

/// A call an entity made on its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    MoveTo {
        agent: EntityId,
        target: Vec3,
        acceptance_radius: f32,
    },
    StopMovement {
        agent: EntityId,
    },
    RandomPoint {
        center: Vec3,
        radius: f32,
    },
    LineTrace {
        start: Vec3,
        end: Vec3,
        ignore: Option<EntityId>,
    },
    Spawn(SpawnRequest),
    Destroy(EntityId),
    ApplyDamage {
        target: EntityId,
        event: DamageEvent,
    },
    Effect {
        kind: EffectKind,
        position: Vec3,
    },
    SetTimer {
        owner: EntityId,
        kind: TimerKind,
        delay: f32,
    },
    /// Carries the handle as the caller passed it.
    ClearTimer(TimerHandle),
}

/// Host whose answers are scripted through public fields.
///
/// Tank snapshot and player lookups are not recorded; everything else is.
#[derive(Debug)]
pub struct ScriptedHost {
    /// Clock used when arming timers.
    pub now: f32,
    /// What every line trace reports as its first blocking hit.
    pub trace_hit: Option<EntityId>,
    /// Answer for random-point queries once `random_points` is empty.
    pub random_point: Option<Vec3>,
    /// Queued answers for random-point queries, consumed front first.
    pub random_points: VecDeque<Option<Vec3>>,
    /// Whether spawn requests succeed.
    pub spawn_succeeds: bool,
    /// Tanks visible to snapshot queries.
    pub tanks: BTreeMap<EntityId, TankSnapshot>,
    /// Answer for player lookups.
    pub player: Option<EntityId>,
    calls: RefCell<Vec<HostCall>>,
    next_spawn: u64,
    timers: TimerManager,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            trace_hit: None,
            random_point: None,
            random_points: VecDeque::new(),
            spawn_succeeds: true,
            tanks: BTreeMap::new(),
            player: None,
            calls: RefCell::new(Vec::new()),
            next_spawn: 1000,
            timers: TimerManager::new(),
        }
    }

    /// Registers a live tank at `position`.
    pub fn add_tank(&mut self, id: EntityId, position: Vec3) {
        self.tanks.insert(
            id,
            TankSnapshot {
                position,
                destroyed: false,
            },
        );
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&mut self) {
        self.calls.get_mut().clear();
    }

    pub fn spawns(&self) -> Vec<SpawnRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Spawn(request) => Some(*request),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<EntityId> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Destroy(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn effects(&self) -> Vec<(EffectKind, Vec3)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::Effect { kind, position } => Some((*kind, *position)),
                _ => None,
            })
            .collect()
    }

    pub fn move_targets(&self) -> Vec<Vec3> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                HostCall::MoveTo { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Default for ScriptedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigation for ScriptedHost {
    fn move_to(&mut self, agent: EntityId, target: Vec3, acceptance_radius: f32) {
        self.record(HostCall::MoveTo {
            agent,
            target,
            acceptance_radius,
        });
    }

    fn stop_movement(&mut self, agent: EntityId) {
        self.record(HostCall::StopMovement { agent });
    }

    fn find_random_reachable_point(&mut self, center: Vec3, radius: f32) -> Option<Vec3> {
        self.record(HostCall::RandomPoint { center, radius });
        self.random_points.pop_front().unwrap_or(self.random_point)
    }
}

impl WorldQueries for ScriptedHost {
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<EntityId>) -> Option<EntityId> {
        self.record(HostCall::LineTrace { start, end, ignore });
        self.trace_hit
    }

    fn tank_snapshot(&self, id: EntityId) -> Option<TankSnapshot> {
        self.tanks.get(&id).copied()
    }

    fn player_tank(&self) -> Option<EntityId> {
        self.player
    }
}

impl Lifecycle for ScriptedHost {
    fn spawn_entity(&mut self, request: SpawnRequest) -> Option<EntityId> {
        self.record(HostCall::Spawn(request));
        if !self.spawn_succeeds {
            return None;
        }
        let id = EntityId::new(self.next_spawn);
        self.next_spawn += 1;
        Some(id)
    }

    fn destroy_entity(&mut self, id: EntityId) {
        self.record(HostCall::Destroy(id));
    }

    fn apply_damage(&mut self, target: EntityId, event: &DamageEvent) -> f32 {
        self.record(HostCall::ApplyDamage {
            target,
            event: *event,
        });
        event.amount
    }
}

impl Effects for ScriptedHost {
    fn play_effect(&mut self, kind: EffectKind, position: Vec3) {
        self.record(HostCall::Effect { kind, position });
    }
}

impl Scheduler for ScriptedHost {
    fn set_timer(&mut self, owner: EntityId, kind: TimerKind, delay: f32) -> TimerHandle {
        self.record(HostCall::SetTimer { owner, kind, delay });
        self.timers.set_timer(owner, kind, self.now, delay)
    }

    fn clear_timer(&mut self, handle: &mut TimerHandle) {
        self.record(HostCall::ClearTimer(*handle));
        self.timers.clear_timer(handle);
    }
}

// =============================================================================
// Scenario Builders
// =============================================================================

/// Scenario with only a player tank at the origin facing +X.
pub fn empty_scenario() -> ScenarioConfig {
    ScenarioConfig {
        name: "test".to_string(),
        player: Some(PlayerSpawn::default()),
        enemies: Vec::new(),
        obstacles: Vec::new(),
        ..ScenarioConfig::default()
    }
}

/// Player at the origin and one enemy on the X axis facing it.
pub fn duel_scenario(enemy_x: f32) -> ScenarioConfig {
    let mut scenario = empty_scenario();
    scenario.enemies.push(EnemySpawn {
        placement: Placement::new(Vec3::new(enemy_x, 0.0, 0.0), 180.0),
        enemy: EnemyConfig::default(),
    });
    scenario
}

/// Adds an obstacle to a scenario.
pub fn with_obstacle(
    mut scenario: ScenarioConfig,
    position: Vec3,
    obstacle: ObstacleConfig,
) -> ScenarioConfig {
    scenario.obstacles.push(ObstacleSpawn { position, obstacle });
    scenario
}

/// Builds a simulation, panicking on an invalid scenario.
pub fn build(scenario: &ScenarioConfig) -> Simulation {
    Simulation::from_scenario(scenario).expect("test scenario is valid")
}

/// Steps `sim` `steps` times at 60 Hz.
pub fn run_steps(sim: &mut Simulation, steps: usize) {
    for _ in 0..steps {
        sim.step(1.0 / 60.0);
    }
}

/// Current health of `id`, if it exists and has health.
pub fn health_of(sim: &Simulation, id: EntityId) -> Option<f32> {
    sim.arena()
        .get(id)
        .and_then(|entity| entity.health())
        .map(|health| health.current())
}
