//! Movement input for one tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// World-space directions the movement keys map to.
///
/// Supplied by the camera each tick. Neither vector needs to be
/// perpendicular to gravity; the integrator projects them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl Default for InputBasis {
    fn default() -> Self {
        Self {
            forward: Vec3::X,
            right: Vec3::Z,
        }
    }
}

/// Key state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub basis: InputBasis,
}

impl MoveInput {
    /// Input with only the jump key held.
    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::default()
        }
    }

    /// Unnormalized world-space wish direction.
    pub fn direction(&self) -> Vec3 {
        let mut direction = Vec3::ZERO;
        if self.forward {
            direction += self.basis.forward;
        }
        if self.backward {
            direction -= self.basis.forward;
        }
        if self.right {
            direction += self.basis.right;
        }
        if self.left {
            direction -= self.basis.right;
        }
        direction
    }

    /// Whether any movement key is held.
    pub fn has_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}
