//! Headless Tank Battle runner.
//!
//! Loads a scenario, drives it for a fixed number of steps with a scripted
//! player, and prints a JSON summary on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in skirmish for ten seconds of game time
//! cargo run -p tankbattle-headless -- run --steps 600
//!
//! # Run a scenario file with a different seed and an aggressive player
//! cargo run -p tankbattle-headless -- run --scenario duel.json --seed 7 --script advance
//!
//! # Dump the default scenario as a starting point for new files
//! cargo run -p tankbattle-headless -- defaults > skirmish.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tankbattle_core::entity::{EntityId, EntityTag};
use tankbattle_core::event::SimEvent;
use tankbattle_core::player::PlayerInput;
use tankbattle_core::simulation::{EntitySnapshot, Simulation};
use tankbattle_core::{AiState, ScenarioConfig};

#[derive(Parser)]
#[command(name = "tankbattle-headless")]
#[command(about = "Headless Tank Battle scenario runner")]
#[command(version)]
struct Cli {
    /// Enable debug logging for the simulation core
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print a JSON summary
    Run {
        /// Scenario JSON file (built-in skirmish when omitted)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Number of fixed steps to run
        #[arg(long, default_value = "600")]
        steps: u64,

        /// Override the scenario's world seed
        #[arg(long)]
        seed: Option<u64>,

        /// Player behaviour
        #[arg(long, value_enum, default_value_t = Script::Idle)]
        script: Script,
    },

    /// Print the built-in scenario as JSON
    Defaults,
}

/// Scripted player behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Script {
    /// No input at all.
    Idle,
    /// Drive at the nearest enemy, aiming and firing continuously.
    Advance,
    /// Circle in place while aiming and firing at the nearest enemy.
    Strafe,
}

impl Script {
    fn input(self, player: Option<&EntitySnapshot>, snapshot: &[EntitySnapshot]) -> PlayerInput {
        let target = player.and_then(|player| nearest_enemy(player.position, snapshot));
        match self {
            Self::Idle => PlayerInput::default(),
            Self::Advance => PlayerInput {
                move_forward: 1.0,
                turn: 0.0,
                fire: target.is_some(),
                aim_point: target,
            },
            Self::Strafe => PlayerInput {
                move_forward: 1.0,
                turn: 1.0,
                fire: target.is_some(),
                aim_point: target,
            },
        }
    }
}

fn nearest_enemy(from: Vec3, snapshot: &[EntitySnapshot]) -> Option<Vec3> {
    snapshot
        .iter()
        .filter(|entity| entity.tag == EntityTag::EnemyTank && !entity.destroyed)
        .map(|entity| entity.position)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

/// What `run` prints on stdout.
#[derive(Debug, Serialize)]
struct RunSummary {
    scenario: String,
    seed: u64,
    steps: u64,
    elapsed: f32,
    player_health: Option<f32>,
    survivors: Vec<EntitySnapshot>,
    shots_fired: usize,
    impacts: usize,
    destroyed: Vec<EntityId>,
    final_states: BTreeMap<EntityId, AiState>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the summary, so logs go to stderr
    let default_filter = if cli.verbose {
        "info,tankbattle_core=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            steps,
            seed,
            script,
        } => cmd_run(scenario.as_deref(), steps, seed, script),
        Commands::Defaults => cmd_defaults(),
    }
}

fn load_scenario(path: Option<&Path>) -> Result<ScenarioConfig> {
    let Some(path) = path else {
        return Ok(ScenarioConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    ScenarioConfig::from_json_str(&json)
        .with_context(|| format!("invalid scenario {}", path.display()))
}

fn cmd_run(path: Option<&Path>, steps: u64, seed: Option<u64>, script: Script) -> Result<()> {
    let mut scenario = load_scenario(path)?;
    if let Some(seed) = seed {
        scenario.world.seed = seed;
    }

    let mut sim = Simulation::from_scenario(&scenario)
        .with_context(|| format!("failed to build scenario {}", scenario.name))?;
    info!(
        scenario = %scenario.name,
        seed = scenario.world.seed,
        steps,
        ?script,
        "starting run"
    );

    let mut shots_fired = 0;
    let mut impacts = 0;
    let mut destroyed = Vec::new();

    for _ in 0..steps {
        let snapshot = sim.snapshot();
        let player = sim
            .player()
            .and_then(|id| snapshot.iter().find(|entity| entity.id == id));
        sim.set_player_input(script.input(player, &snapshot));
        sim.step(scenario.fixed_delta);

        for event in sim.take_events() {
            match event {
                SimEvent::ProjectileSpawned { .. } => shots_fired += 1,
                SimEvent::ProjectileImpact { .. } => impacts += 1,
                SimEvent::EntityRemoved { entity, tag, .. } if tag != EntityTag::Projectile => {
                    destroyed.push(entity);
                }
                SimEvent::AiStateChanged { entity, from, to, .. } => {
                    debug!(%entity, %from, %to, "ai transition");
                }
                _ => {}
            }
        }
    }

    let survivors: Vec<EntitySnapshot> = sim
        .snapshot()
        .into_iter()
        .filter(|entity| entity.tag != EntityTag::Projectile)
        .collect();
    let player_health = sim
        .player()
        .and_then(|id| survivors.iter().find(|entity| entity.id == id))
        .and_then(|player| player.health);
    let final_states = survivors
        .iter()
        .filter_map(|entity| entity.ai_state.map(|state| (entity.id, state)))
        .collect();

    let summary = RunSummary {
        scenario: scenario.name.clone(),
        seed: scenario.world.seed,
        steps,
        elapsed: sim.now(),
        player_health,
        survivors,
        shots_fired,
        impacts,
        destroyed,
        final_states,
    };
    info!(shots_fired, impacts, destroyed = summary.destroyed.len(), "run complete");

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
    );
    Ok(())
}

fn cmd_defaults() -> Result<()> {
    let json = ScenarioConfig::default()
        .to_json_string()
        .context("failed to serialize default scenario")?;
    println!("{json}");
    Ok(())
}
