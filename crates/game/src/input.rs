//! Player input handling.
//!
//! Converts key state plus the camera heading into the physics input.

use flipball_physics::{InputBasis, MoveInput};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Raw player input for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementKeys,

    /// Jump key held.
    pub jump: bool,

    /// Camera heading around the vertical axis, in radians. Zero looks
    /// down +X, positive turns toward +Z.
    pub camera_yaw: f32,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl PlayerInput {
    /// World-space forward and right for the current camera heading.
    pub fn basis(&self) -> InputBasis {
        let (sin, cos) = self.camera_yaw.sin_cos();
        InputBasis {
            forward: Vec3::new(cos, 0.0, sin),
            right: Vec3::new(-sin, 0.0, cos),
        }
    }

    /// Convert to the physics input.
    pub fn to_move_input(&self) -> MoveInput {
        MoveInput {
            forward: self.movement.forward,
            backward: self.movement.backward,
            left: self.movement.left,
            right: self.movement.right,
            jump: self.jump,
            basis: self.basis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_yaw_matches_default_basis() {
        let input = PlayerInput::default();
        let basis = input.basis();

        assert!((basis.forward - Vec3::X).length() < 1e-6);
        assert!((basis.right - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_yaw_turns_forward() {
        let input = PlayerInput {
            camera_yaw: std::f32::consts::FRAC_PI_2,
            ..Default::default()
        };
        let basis = input.basis();

        assert!((basis.forward - Vec3::Z).length() < 1e-6);
        assert!((basis.right - Vec3::NEG_X).length() < 1e-6);
        assert!(basis.forward.dot(basis.right).abs() < 1e-6);
    }

    #[test]
    fn test_keys_carry_over() {
        let input = PlayerInput {
            movement: MovementKeys {
                forward: true,
                left: true,
                ..Default::default()
            },
            jump: true,
            camera_yaw: 0.0,
        };
        let command = input.to_move_input();

        assert!(command.forward && command.left && command.jump);
        assert!(!command.backward && !command.right);
        assert!(command.has_movement());
        assert!((command.direction() - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
    }
}
