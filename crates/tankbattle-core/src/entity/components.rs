//! Small state components shared by several entity kinds.

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::Rotator;

/// World placement of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec3,
    /// World orientation.
    pub rotation: Rotator,
}

impl TransformState {
    /// Creates a transform at `position` facing `yaw` degrees.
    #[must_use]
    pub const fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Rotator::from_yaw(yaw),
        }
    }
}

bitflags! {
    /// Presentation and scheduling flags toggled by destruction hooks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Not rendered.
        const HIDDEN = 1 << 0;
        /// Skipped by the per-step tick loop.
        const TICK_DISABLED = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_new_is_yaw_only() {
        let transform = TransformState::new(Vec3::new(1.0, 2.0, 3.0), 45.0);
        assert_eq!(transform.rotation, Rotator::new(0.0, 45.0, 0.0));
    }

    #[test]
    fn flags_default_empty() {
        let flags = StatusFlags::default();
        assert!(!flags.contains(StatusFlags::HIDDEN));
        assert!(!flags.contains(StatusFlags::TICK_DISABLED));
    }
}
