//! The kinematic body.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::jump::{JumpContext, JumpState};
use crate::probe::Contact;

/// Coarse movement classification, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementState {
    #[default]
    Idle,
    Rolling,
    Jumping,
    Falling,
    Airborne,
}

impl MovementState {
    /// Speed below which the ball counts as still along an axis.
    const THRESHOLD: f32 = 0.1;

    /// Classify from velocity alone. `up` is opposite to gravity.
    pub fn classify(velocity: Vec3, up: Vec3, grounded: bool) -> Self {
        let vertical = velocity.dot(up);
        if grounded {
            let horizontal = velocity - up * vertical;
            if horizontal.length() > Self::THRESHOLD {
                MovementState::Rolling
            } else {
                MovementState::Idle
            }
        } else if vertical > Self::THRESHOLD {
            MovementState::Jumping
        } else if vertical < -Self::THRESHOLD {
            MovementState::Falling
        } else {
            MovementState::Airborne
        }
    }
}

/// Ground contact state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Footing {
    /// No valid ground contact.
    #[default]
    Airborne,
    /// Resting on `contact`. `can_jump` is only set when the contact is
    /// within jump reach.
    Grounded { contact: Contact, can_jump: bool },
}

/// The player ball.
///
/// Created at level load, advanced by the integrator every tick and reset
/// to a spawn pose on respawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KinematicBody {
    /// Centre of the ball in world space.
    pub position: Vec3,

    /// Velocity (units/second).
    pub velocity: Vec3,

    /// Acceleration applied during the last tick.
    pub acceleration: Vec3,

    /// Ground contact.
    pub footing: Footing,

    /// Normal of the most recent valid contact.
    pub ground_normal: Vec3,

    /// Jump buffer, coyote timer and jump phase.
    pub jump: JumpState,

    /// Seconds since last grounded.
    pub air_time: f32,

    /// Classification from the last tick.
    pub movement_state: MovementState,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl KinematicBody {
    /// Create a body at rest at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            footing: Footing::Airborne,
            ground_normal: Vec3::Y,
            jump: JumpState::new(),
            air_time: 0.0,
            movement_state: MovementState::Idle,
        }
    }

    /// Move to a spawn pose: at rest, airborne, no pending jump.
    pub fn reset_to(&mut self, position: Vec3) {
        *self = Self::new(position);
    }

    /// Stop all motion and drop contact, keeping the position.
    pub fn clear_motion(&mut self) {
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
        self.footing = Footing::Airborne;
        self.air_time = 0.0;
        self.jump.reset();
    }

    /// Mark the body as resting on `contact`.
    pub fn ground_on(&mut self, contact: Contact, can_jump: bool) {
        self.footing = Footing::Grounded { contact, can_jump };
        self.ground_normal = contact.normal;
        self.air_time = 0.0;
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self.footing, Footing::Grounded { .. })
    }

    pub fn can_jump(&self) -> bool {
        matches!(self.footing, Footing::Grounded { can_jump: true, .. })
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_jumping()
    }

    /// Current ground contact, if grounded.
    pub fn ground_contact(&self) -> Option<&Contact> {
        match &self.footing {
            Footing::Grounded { contact, .. } => Some(contact),
            Footing::Airborne => None,
        }
    }

    /// Distance to the ground contact; infinite when airborne.
    pub fn ground_distance(&self) -> f32 {
        self.ground_contact().map_or(f32::INFINITY, |c| c.distance)
    }

    pub fn coyote_timer(&self) -> f32 {
        self.jump.coyote_timer()
    }

    pub fn jump_buffer_timer(&self) -> f32 {
        self.jump.buffer_timer()
    }

    /// Whether position and velocity are free of NaN and infinity.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }

    pub(crate) fn jump_context(&self, up: Vec3) -> JumpContext {
        JumpContext {
            is_grounded: self.is_grounded(),
            can_jump: self.can_jump(),
            ground_distance: self.ground_distance(),
            vertical_speed: self.velocity.dot(up),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(MovementState::classify(Vec3::ZERO, Vec3::Y, true), MovementState::Idle);
        assert_eq!(MovementState::classify(Vec3::X, Vec3::Y, true), MovementState::Rolling);
        assert_eq!(MovementState::classify(Vec3::Y, Vec3::Y, false), MovementState::Jumping);
        assert_eq!(MovementState::classify(-Vec3::Y, Vec3::Y, false), MovementState::Falling);
        assert_eq!(MovementState::classify(Vec3::X, Vec3::Y, false), MovementState::Airborne);

        // Under inverted gravity "up" is -Y
        assert_eq!(MovementState::classify(-Vec3::Y, -Vec3::Y, false), MovementState::Jumping);
    }

    #[test]
    fn test_footing_accessors() {
        let mut body = KinematicBody::new(Vec3::new(0.0, 0.5, 0.0));
        assert!(!body.is_grounded());
        assert!(!body.can_jump());
        assert_eq!(body.ground_distance(), f32::INFINITY);
        assert_eq!(body.ground_normal, Vec3::Y);

        let contact = Contact {
            point: Vec3::ZERO,
            normal: Vec3::new(0.0, 0.8, 0.6),
            distance: 0.5,
        };
        body.air_time = 2.0;
        body.ground_on(contact, true);

        assert!(body.is_grounded());
        assert!(body.can_jump());
        assert_eq!(body.ground_distance(), 0.5);
        assert_eq!(body.ground_normal, contact.normal);
        assert_eq!(body.air_time, 0.0);
    }

    #[test]
    fn test_reset_and_finite() {
        let mut body = KinematicBody::new(Vec3::ZERO);
        body.velocity = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(!body.is_finite());

        body.jump.fire();
        body.reset_to(Vec3::new(1.0, 2.0, 3.0));
        assert!(body.is_finite());
        assert_eq!(body.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(body.velocity, Vec3::ZERO);
        assert!(!body.is_jumping());
    }
}
