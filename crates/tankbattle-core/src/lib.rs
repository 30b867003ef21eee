//! # Tank Battle Core
//!
//! Combat and AI core for Tank Battle.
//!
//! The gameplay types never own the world they live in. Each callback
//! receives a [`Host`](host::Host) that provides navigation, world queries,
//! spawning, effects and timers, so the same logic runs inside an engine
//! adapter or inside the headless [`Simulation`](simulation::Simulation)
//! shipped here.
//!
//! ## Layout
//!
//! - **Components**: [`health`], [`fire_control`], [`turret`]
//! - **Tanks**: [`tank`] (shared hull), [`player`], [`ai`] (enemy state machine)
//! - **World objects**: [`projectile`], [`obstacle`]
//! - **Reference host**: [`arena`], [`timer`], [`event`], [`simulation`]
//!
//! ## Usage
//!
//! ```rust
//! use tankbattle_core::config::ScenarioConfig;
//! use tankbattle_core::player::PlayerInput;
//! use tankbattle_core::simulation::Simulation;
//!
//! let scenario = ScenarioConfig::default();
//! let mut sim = Simulation::from_scenario(&scenario)?;
//!
//! sim.set_player_input(PlayerInput {
//!     move_forward: 1.0,
//!     ..PlayerInput::default()
//! });
//! sim.step(scenario.fixed_delta);
//!
//! for event in sim.take_events() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), tankbattle_core::error::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ai;
pub mod arena;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod fire_control;
pub mod health;
pub mod host;
pub mod math;
pub mod obstacle;
pub mod player;
pub mod projectile;
pub mod simulation;
pub mod tank;
pub mod timer;
pub mod turret;

#[cfg(test)]
mod tests;

pub use ai::{AiState, EnemyTank};
pub use arena::Arena;
pub use config::{ScenarioConfig, WorldConfig};
pub use entity::{Entity, EntityId, EntityTag};
pub use error::{ConfigError, Result};
pub use event::SimEvent;
pub use health::{DamageEvent, Damageable, Health};
pub use host::Host;
pub use player::{PlayerInput, PlayerTank};
pub use simulation::{EntitySnapshot, Simulation};
