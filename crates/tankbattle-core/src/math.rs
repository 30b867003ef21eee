//! Orientation math shared by tank bodies, turrets and projectiles.
//!
//! Angles are in degrees, matching the host engine's rotator convention:
//! yaw turns about +Z with 0 pointing along +X, pitch raises the nose
//! toward +Z, roll spins about the forward axis.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tolerance below which an angular delta counts as "already there".
const NEARLY_ZERO: f32 = 1.0e-4;

/// Pitch/yaw/roll orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotator {
    /// Rotation about the right axis (nose up is positive).
    pub pitch: f32,
    /// Rotation about the up axis.
    pub yaw: f32,
    /// Rotation about the forward axis.
    pub roll: f32,
}

impl Rotator {
    /// The identity rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a rotator from its three components.
    #[must_use]
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Creates a yaw-only rotator.
    #[must_use]
    pub const fn from_yaw(yaw: f32) -> Self {
        Self::new(0.0, yaw, 0.0)
    }

    /// Wraps an angle into `(-180, 180]`.
    #[must_use]
    pub fn normalize_axis(angle: f32) -> f32 {
        let wrapped = angle.rem_euclid(360.0);
        if wrapped > 180.0 {
            wrapped - 360.0
        } else {
            wrapped
        }
    }

    /// Returns this rotator with every axis wrapped into `(-180, 180]`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(
            Self::normalize_axis(self.pitch),
            Self::normalize_axis(self.yaw),
            Self::normalize_axis(self.roll),
        )
    }

    /// Unit vector pointing along this orientation.
    #[must_use]
    pub fn forward_vector(self) -> Vec3 {
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        Vec3::new(cp * cy, cp * sy, sp)
    }

    /// Returns true when every axis is within `tolerance` of zero.
    #[must_use]
    pub fn is_nearly_zero(self, tolerance: f32) -> bool {
        self.pitch.abs() <= tolerance && self.yaw.abs() <= tolerance && self.roll.abs() <= tolerance
    }

    /// Horizontal bearing in degrees from `from` toward `to`.
    ///
    /// Vertical displacement is projected out. Returns `None` when the two
    /// points share the same XY position and no bearing exists.
    #[must_use]
    pub fn yaw_towards(from: Vec3, to: Vec3) -> Option<f32> {
        let mut direction = to - from;
        direction.z = 0.0;
        if direction.length_squared() <= NEARLY_ZERO * NEARLY_ZERO {
            return None;
        }
        Some(direction.y.atan2(direction.x).to_degrees())
    }

    /// Moves toward `target` along the shortest angular path.
    ///
    /// The step covers `clamp(delta_time * speed, 0, 1)` of the remaining
    /// delta, so repeated calls ease in rather than snapping. A non-positive
    /// `speed` snaps straight to the target; a zero `delta_time` leaves the
    /// rotation unchanged.
    #[must_use]
    pub fn interp_to(self, target: Self, delta_time: f32, speed: f32) -> Self {
        if delta_time == 0.0 || self == target {
            return self;
        }
        if speed <= 0.0 {
            return target;
        }

        let delta = Self::new(
            target.pitch - self.pitch,
            target.yaw - self.yaw,
            target.roll - self.roll,
        )
        .normalized();
        if delta.is_nearly_zero(NEARLY_ZERO) {
            return target;
        }

        let alpha = (delta_time * speed).clamp(0.0, 1.0);
        Self::new(
            self.pitch + delta.pitch * alpha,
            self.yaw + delta.yaw * alpha,
            self.roll + delta.roll * alpha,
        )
        .normalized()
    }
}
