//! End-to-end scenarios through the reference world.

use glam::Vec3;

use crate::ai::AiState;
use crate::config::{ObstacleConfig, ObstacleKind};
use crate::entity::{EntityId, EntityTag};
use crate::event::SimEvent;
use crate::health::DamageEvent;
use crate::host::EffectKind;
use crate::player::PlayerInput;
use crate::simulation::Simulation;

use super::helpers::{build, duel_scenario, empty_scenario, health_of, run_steps, with_obstacle};

const PLAYER: EntityId = EntityId::new(0);
const ENEMY: EntityId = EntityId::new(1);

fn ai_state(sim: &Simulation, id: EntityId) -> Option<AiState> {
    sim.arena().get(id).and_then(|entity| entity.ai_state())
}

fn fire(sim: &mut Simulation) {
    sim.set_player_input(PlayerInput {
        fire: true,
        ..PlayerInput::default()
    });
}

// =============================================================================
// Enemy Combat
// =============================================================================

#[test]
fn enemy_in_range_shoots_player() {
    let mut sim = build(&duel_scenario(700.0));

    run_steps(&mut sim, 20);

    assert_eq!(ai_state(&sim, ENEMY), Some(AiState::Attacking));
    assert_eq!(health_of(&sim, PLAYER), Some(75.0));

    let events = sim.take_events();
    assert!(events.contains(&SimEvent::AiStateChanged {
        tick: 0,
        entity: ENEMY,
        from: AiState::Idle,
        to: AiState::Attacking,
    }));
    assert!(events.iter().any(|event| matches!(
        event,
        SimEvent::ProjectileImpact { target, damage, .. } if *target == PLAYER && *damage == 25.0
    )));
}

#[test]
fn enemy_keeps_firing_at_fire_rate() {
    let mut sim = build(&duel_scenario(700.0));

    // two seconds at 2 shots per second
    run_steps(&mut sim, 120);

    let shots = sim
        .take_events()
        .iter()
        .filter(|event| {
            matches!(event, SimEvent::ProjectileSpawned { owner: Some(owner), .. } if *owner == ENEMY)
        })
        .count();
    assert!((4..=5).contains(&shots), "fired {shots} shots");
}

#[test]
fn obstacle_blocks_line_of_sight() {
    let scenario = with_obstacle(
        duel_scenario(700.0),
        Vec3::new(350.0, 0.0, 0.0),
        ObstacleConfig {
            kind: ObstacleKind::Rock,
            destructible: false,
            ..ObstacleConfig::default()
        },
    );
    let mut sim = build(&scenario);

    run_steps(&mut sim, 60);

    assert_eq!(ai_state(&sim, ENEMY), Some(AiState::Attacking));
    assert_eq!(health_of(&sim, PLAYER), Some(100.0));
    assert!(!sim
        .take_events()
        .iter()
        .any(|event| matches!(event, SimEvent::ProjectileSpawned { .. })));
}

#[test]
fn distant_enemy_closes_in_then_attacks() {
    let mut sim = build(&duel_scenario(1200.0));

    sim.step(1.0 / 60.0);
    assert_eq!(ai_state(&sim, ENEMY), Some(AiState::Chasing));
    assert!(sim.world().is_moving(ENEMY));

    run_steps(&mut sim, 90);

    assert_eq!(ai_state(&sim, ENEMY), Some(AiState::Attacking));
    let position = sim.arena().get(ENEMY).map(|entity| entity.position()).unwrap();
    assert!(position.x <= 800.0 + 1.0e-3);
    assert!(!sim.world().is_moving(ENEMY));
}

// =============================================================================
// Destruction
// =============================================================================

#[test]
fn destroyed_enemy_leaves_and_cancels_retry() {
    let mut sim = build(&duel_scenario(700.0));
    run_steps(&mut sim, 2);
    assert_eq!(sim.world().timers().len(), 1);
    sim.take_events();

    let applied = sim.apply_damage(ENEMY, &DamageEvent::new(100.0));

    assert_eq!(applied, 100.0);
    assert!(sim.arena().get(ENEMY).is_none());
    assert!(sim.world().timers().is_empty());
    assert_eq!(
        sim.take_events(),
        vec![
            SimEvent::EffectPlayed {
                tick: 2,
                kind: EffectKind::Explosion,
                position: Vec3::new(700.0, 0.0, 0.0),
            },
            SimEvent::EntityRemoved {
                tick: 2,
                entity: ENEMY,
                tag: EntityTag::EnemyTank,
            },
        ]
    );

    // its shell is still in flight and keeps going without an owner
    run_steps(&mut sim, 5);
    assert!(sim.arena().entities_sorted().any(|entity| entity.is_projectile()));
}

#[test]
fn dead_player_stays_and_enemies_patrol() {
    let mut sim = build(&duel_scenario(700.0));
    sim.step(1.0 / 60.0);

    sim.apply_damage(PLAYER, &DamageEvent::new(1000.0));
    sim.step(1.0 / 60.0);

    let player = sim.arena().get(PLAYER).unwrap();
    assert!(player.is_destroyed());
    assert!(!player.is_ticking());
    assert_eq!(ai_state(&sim, ENEMY), Some(AiState::Patrolling));
}

#[test]
fn player_destroys_obstacle_in_two_hits() {
    let scenario = with_obstacle(
        empty_scenario(),
        Vec3::new(600.0, 0.0, 0.0),
        ObstacleConfig::default(),
    );
    let mut sim = build(&scenario);
    let wall = EntityId::new(1);

    fire(&mut sim);
    run_steps(&mut sim, 40);
    assert_eq!(health_of(&sim, wall), Some(25.0));

    fire(&mut sim);
    run_steps(&mut sim, 40);

    assert!(sim.arena().get(wall).is_none());
    let events = sim.take_events();
    assert!(events.iter().any(|event| matches!(
        event,
        SimEvent::EntityRemoved { entity, tag: EntityTag::Obstacle, .. } if *entity == wall
    )));
    assert!(events.contains(&SimEvent::EffectPlayed {
        tick: events
            .iter()
            .find_map(|event| match event {
                SimEvent::EntityRemoved { tick, entity, .. } if *entity == wall => Some(*tick),
                _ => None,
            })
            .unwrap(),
        kind: EffectKind::ExplosionSound,
        position: Vec3::new(600.0, 0.0, 0.0),
    }));
}

#[test]
fn unanswered_shell_expires() {
    let mut sim = build(&empty_scenario());

    fire(&mut sim);
    run_steps(&mut sim, 200);

    assert_eq!(sim.arena().entity_count(), 1);
    let events = sim.take_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, SimEvent::ProjectileExpired { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, SimEvent::ProjectileImpact { .. })));
}

// =============================================================================
// Player Movement
// =============================================================================

#[test]
fn player_stops_short_of_obstacle() {
    let scenario = with_obstacle(
        empty_scenario(),
        Vec3::new(300.0, 0.0, 0.0),
        ObstacleConfig::default(),
    );
    let mut sim = build(&scenario);

    sim.set_player_input(PlayerInput {
        move_forward: 1.0,
        ..PlayerInput::default()
    });
    run_steps(&mut sim, 60);

    let x = sim.arena().get(PLAYER).map(|entity| entity.position().x).unwrap();
    assert!(x > 90.0 && x < 110.1, "stopped at {x}");
}
