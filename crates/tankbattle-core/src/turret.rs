//! Yaw-only turret aiming.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Rotator;

/// Eases a turret toward the horizontal bearing of `target`.
///
/// The bearing is measured from `turret_position` with height ignored, so
/// the result never pitches or rolls. When `target` sits directly above or
/// below the turret there is no bearing and the current yaw is kept.
#[must_use]
pub fn rotate_towards(
    turret_position: Vec3,
    target: Vec3,
    current: Rotator,
    delta_time: f32,
    rotation_speed: f32,
) -> Rotator {
    let current = Rotator::from_yaw(current.yaw);
    match Rotator::yaw_towards(turret_position, target) {
        Some(yaw) => {
            let eased = current.interp_to(Rotator::from_yaw(yaw), delta_time, rotation_speed);
            Rotator::from_yaw(eased.yaw)
        }
        None => current,
    }
}

/// A turret's world rotation and interpolation speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    rotation: Rotator,
    rotation_speed: f32,
}

impl Turret {
    /// A turret facing `yaw` degrees.
    #[must_use]
    pub const fn new(yaw: f32, rotation_speed: f32) -> Self {
        Self {
            rotation: Rotator::from_yaw(yaw),
            rotation_speed,
        }
    }

    /// Current world rotation.
    #[must_use]
    pub const fn rotation(&self) -> Rotator {
        self.rotation
    }

    /// Interpolation speed.
    #[must_use]
    pub const fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Steps the turret toward `target` and returns the new rotation.
    pub fn aim(&mut self, turret_position: Vec3, target: Vec3, delta_time: f32) -> Rotator {
        self.rotation = rotate_towards(
            turret_position,
            target,
            self.rotation,
            delta_time,
            self.rotation_speed,
        );
        self.rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn eases_toward_bearing() {
        // bearing 90, 0.1s at speed 5 covers half the gap
        let result = rotate_towards(Vec3::ZERO, Vec3::new(0.0, 500.0, 0.0), Rotator::ZERO, 0.1, 5.0);
        assert!((result.yaw - 45.0).abs() < 1.0e-3);
    }

    #[test]
    fn converges_over_many_steps() {
        let mut turret = Turret::new(0.0, 5.0);
        for _ in 0..200 {
            turret.aim(Vec3::ZERO, Vec3::new(-300.0, 0.0, 0.0), 1.0 / 60.0);
        }
        assert!((turret.rotation().yaw.abs() - 180.0).abs() < 0.5);
    }

    #[test]
    fn overhead_target_keeps_yaw() {
        let current = Rotator::from_yaw(30.0);
        let result = rotate_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, 400.0), current, 0.1, 5.0);
        assert_eq!(result, current);
    }

    #[test]
    fn zero_delta_time_is_stationary() {
        let current = Rotator::from_yaw(-20.0);
        let result = rotate_towards(Vec3::ZERO, Vec3::new(100.0, 100.0, 0.0), current, 0.0, 5.0);
        assert_eq!(result, current);
    }

    proptest! {
        #[test]
        fn aiming_never_pitches_or_rolls(
            x in -5000.0f32..5000.0,
            y in -5000.0f32..5000.0,
            z in -2000.0f32..2000.0,
            yaw in -180.0f32..180.0,
            dt in 0.0f32..0.5,
        ) {
            let result = rotate_towards(
                Vec3::new(10.0, -20.0, 0.0),
                Vec3::new(x, y, z),
                Rotator::new(12.0, yaw, -7.0),
                dt,
                5.0,
            );
            prop_assert_eq!(result.pitch, 0.0);
            prop_assert_eq!(result.roll, 0.0);
        }
    }
}
