//! AI-controlled tank.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{classify, AiState};
use crate::config::{EnemyConfig, Placement};
use crate::entity::EntityId;
use crate::health::{DamageEvent, Damageable, Health};
use crate::host::{Host, TankSnapshot, TickContext};
use crate::tank::{Combatant, TankCore};
use crate::timer::{TimerHandle, TimerKind};

/// A tank that patrols around its spawn point and engages the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTank {
    tank: TankCore,
    config: EnemyConfig,
    state: AiState,
    initial_location: Vec3,
    current_patrol_target: Vec3,
    tracked_player: Option<EntityId>,
    fire_timer: TimerHandle,
}

impl EnemyTank {
    /// An idle enemy at `placement`.
    ///
    /// The patrol target starts at the spawn location; [`begin_play`]
    /// resolves the player and samples the first real patrol point.
    ///
    /// [`begin_play`]: EnemyTank::begin_play
    #[must_use]
    pub const fn new(config: EnemyConfig, placement: Placement) -> Self {
        Self {
            tank: TankCore::new(config.tank, placement),
            config,
            state: AiState::Idle,
            initial_location: placement.position,
            current_patrol_target: placement.position,
            tracked_player: None,
            fire_timer: TimerHandle::INVALID,
        }
    }

    /// Records the spawn location, looks up the player and picks the first
    /// patrol point.
    pub fn begin_play(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        self.initial_location = self.tank.position();
        self.tracked_player = host.player_tank();
        self.current_patrol_target = self.random_patrol_point(host);
        debug!(
            enemy = %ctx.entity_id,
            player = ?self.tracked_player,
            target = ?self.current_patrol_target,
            "enemy ready"
        );
    }

    /// Current behaviour state.
    #[must_use]
    pub const fn state(&self) -> AiState {
        self.state
    }

    /// AI tuning.
    #[must_use]
    pub const fn config(&self) -> &EnemyConfig {
        &self.config
    }

    /// Location patrols are sampled around.
    #[must_use]
    pub const fn initial_location(&self) -> Vec3 {
        self.initial_location
    }

    /// Point the enemy is patrolling toward.
    #[must_use]
    pub const fn current_patrol_target(&self) -> Vec3 {
        self.current_patrol_target
    }

    /// Player reference the enemy is tracking. May no longer be valid.
    #[must_use]
    pub const fn tracked_player(&self) -> Option<EntityId> {
        self.tracked_player
    }

    /// Replaces the tracked player reference.
    pub fn set_tracked_player(&mut self, player: Option<EntityId>) {
        self.tracked_player = player;
    }

    /// Handle of the pending fire-retry timer, if one is armed.
    #[must_use]
    pub const fn fire_timer(&self) -> TimerHandle {
        self.fire_timer
    }

    /// Classifies, then runs the chosen behaviour. Does nothing once
    /// destroyed.
    pub fn tick(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        if self.tank.is_destroyed() {
            return;
        }
        self.update_state(ctx, &*host);
        self.execute_behavior(ctx, host);
    }

    /// Reclassifies from the player's current distance and returns the new
    /// state.
    pub fn update_state(&mut self, ctx: &TickContext, host: &dyn Host) -> AiState {
        let player = self.tracked_player.and_then(|id| host.tank_snapshot(id));
        let next = classify(
            self.tank.position(),
            player,
            self.config.detection_range,
            self.config.attack_range,
        );

        if next != self.state {
            debug!(enemy = %ctx.entity_id, from = %self.state, to = %next, "ai state changed");
        } else {
            trace!(enemy = %ctx.entity_id, state = %next, "ai state held");
        }
        self.state = next;
        next
    }

    /// Runs the behaviour for the current state.
    pub fn execute_behavior(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        match self.state {
            AiState::Idle => {}
            AiState::Patrolling => self.handle_patrolling(ctx, host),
            AiState::Chasing => self.handle_chasing(ctx, host),
            AiState::Attacking => self.handle_attacking(ctx, host),
        }
    }

    /// Fire-retry callback. Re-checks line of sight before trying again.
    pub fn on_timer(&mut self, kind: TimerKind, ctx: &TickContext, host: &mut dyn Host) {
        match kind {
            TimerKind::Fire => {
                self.fire_timer.invalidate();
                if self.tank.is_destroyed() || self.state != AiState::Attacking {
                    return;
                }
                if let Some((player, snapshot)) = self.live_player(&*host) {
                    self.engage(ctx, player, snapshot.position, host);
                }
            }
        }
    }

    // =========================================================================
    // Behaviours
    // =========================================================================

    fn handle_patrolling(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        let position = self.tank.position();
        if position.distance(self.current_patrol_target) < self.config.patrol_arrival_distance {
            self.current_patrol_target = self.random_patrol_point(host);
            trace!(enemy = %ctx.entity_id, target = ?self.current_patrol_target, "new patrol target");
        }
        host.move_to(
            ctx.entity_id,
            self.current_patrol_target,
            self.config.acceptance_radius,
        );
    }

    fn handle_chasing(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        let Some((_, player)) = self.live_player(&*host) else {
            return;
        };
        host.move_to(ctx.entity_id, player.position, self.config.acceptance_radius);
        self.tank.rotate_turret_towards(player.position, ctx.delta_time);
    }

    fn handle_attacking(&mut self, ctx: &TickContext, host: &mut dyn Host) {
        let Some((player_id, player)) = self.live_player(&*host) else {
            return;
        };
        host.stop_movement(ctx.entity_id);
        self.tank.rotate_turret_towards(player.position, ctx.delta_time);
        self.engage(ctx, player_id, player.position, host);
    }

    /// Fires if the line of sight to the player is clear.
    ///
    /// When the sight line is clear but the gate holds the shot back, a
    /// single fire-retry timer is armed for the moment the gate reopens.
    fn engage(
        &mut self,
        ctx: &TickContext,
        player: EntityId,
        player_position: Vec3,
        host: &mut dyn Host,
    ) -> bool {
        let first_hit = host.line_trace(self.tank.position(), player_position, Some(ctx.entity_id));
        if first_hit != Some(player) {
            trace!(enemy = %ctx.entity_id, blocker = ?first_hit, "shot occluded");
            return false;
        }

        if self.tank.try_fire(ctx.entity_id, ctx.now, host) {
            return true;
        }

        trace!(enemy = %ctx.entity_id, ready_at = self.tank.fire_control().ready_at(), "fire gated");
        if !self.fire_timer.is_valid() {
            let delay = (self.tank.fire_control().ready_at() - ctx.now).max(0.0);
            self.fire_timer = host.set_timer(ctx.entity_id, TimerKind::Fire, delay);
            debug!(enemy = %ctx.entity_id, delay, "fire retry scheduled");
        }
        false
    }

    /// Re-resolves the tracked player. `None` when the reference no longer
    /// resolves or the player is destroyed.
    fn live_player(&self, host: &dyn Host) -> Option<(EntityId, TankSnapshot)> {
        let id = self.tracked_player?;
        host.tank_snapshot(id)
            .filter(|snapshot| !snapshot.destroyed)
            .map(|snapshot| (id, snapshot))
    }

    fn random_patrol_point(&self, host: &mut dyn Host) -> Vec3 {
        host.find_random_reachable_point(self.initial_location, self.config.patrol_radius)
            .unwrap_or(self.initial_location)
    }
}

impl Combatant for EnemyTank {
    fn tank(&self) -> &TankCore {
        &self.tank
    }

    fn tank_mut(&mut self) -> &mut TankCore {
        &mut self.tank
    }
}

impl Damageable for EnemyTank {
    fn health(&self) -> &Health {
        self.tank.health()
    }

    fn apply_damage(&mut self, id: EntityId, event: &DamageEvent, host: &mut dyn Host) -> f32 {
        let fire_timer = &mut self.fire_timer;
        self.tank.apply_damage(id, event, host, |host| {
            host.clear_timer(fire_timer);
            host.destroy_entity(id);
        })
    }
}
