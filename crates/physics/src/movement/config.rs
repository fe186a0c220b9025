//! Movement configuration constants.
//!
//! All ball-handling parameters are grouped here for easy tuning. Rates
//! marked "per tick" assume the default 60 Hz step.

use serde::{Deserialize, Serialize};

/// Configuration for the rolling ball.
///
/// All values use world units (meters, seconds) unless otherwise noted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    // ========================================================================
    // Ball and Ground Probe
    // ========================================================================
    /// Ball radius.
    pub radius: f32,

    /// Extra reach past the radius within which a contact counts as ground.
    pub ground_check_distance: f32,

    /// Tolerance used for jump gating and the grounded offset window.
    pub snap_distance: f32,

    /// Rays cast around the probe circle (the centred ray is extra).
    pub probe_ray_count: u32,

    /// Radius of the probe circle. Clamped to the ball radius.
    pub probe_spread: f32,

    /// Longest distance a ground probe looks.
    pub probe_max_distance: f32,

    /// Fraction of the grounded offset removed per tick.
    pub ground_correction_rate: f32,

    /// Offsets at or below this are left alone.
    pub ground_correction_deadband: f32,

    /// Moving away from the surface faster than this never counts as grounded.
    pub rising_ground_tolerance: f32,

    /// Reach past the radius for the single-ray validation pass.
    pub ground_validation_distance: f32,

    /// Largest offset the validation pass accepts.
    pub ground_validation_offset: f32,

    /// Deepest sink that is resolved by lifting the ball straight out.
    /// Anything deeper is treated as a wall or ceiling, not ground.
    pub max_penetration: f32,

    // ========================================================================
    // Rolling
    // ========================================================================
    /// Input acceleration (units/second²).
    pub acceleration: f32,

    /// Acceleration multiplier while grounded with active input.
    pub grounded_acceleration_scale: f32,

    /// Horizontal speed cap.
    pub max_velocity: f32,

    /// Horizontal velocity multiplier per tick on the ground.
    pub ground_friction: f32,

    /// Horizontal velocity multiplier per tick in the air.
    pub air_friction: f32,

    /// Speed removed per tick while rolling.
    pub rolling_resistance: f32,

    /// Rolling resistance never removes more than this fraction of speed.
    pub rolling_resistance_cap: f32,

    /// Speed cap along the gravity axis, both directions.
    pub terminal_velocity: f32,

    // ========================================================================
    // Jumping
    // ========================================================================
    /// Gravity multiplier while falling.
    pub fall_multiplier: f32,

    /// Gravity multiplier while rising with jump released.
    pub low_jump_multiplier: f32,

    /// Launch speed along "up".
    pub jump_force: f32,

    /// Share of horizontal speed carried into the jump.
    pub momentum_preservation: f32,

    /// Scale applied to the momentum bonus.
    pub momentum_jump_factor: f32,

    /// A jump only fires while the vertical speed is below this.
    pub jump_vertical_speed_limit: f32,

    /// Residual vertical speed tolerated on landing.
    pub landing_tolerance: f32,

    /// Grace window after leaving the ground (seconds).
    pub coyote_time: f32,

    /// How long a jump press stays buffered (seconds).
    pub jump_buffer_time: f32,

    /// Let an ungrounded jump fire while the coyote timer is alive.
    pub allow_coyote_jump: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            // Ball and ground probe
            radius: 0.5,
            ground_check_distance: 0.15,
            snap_distance: 0.1,
            probe_ray_count: 4,
            probe_spread: 0.35,
            probe_max_distance: 2.0,
            ground_correction_rate: 0.03,
            ground_correction_deadband: 0.1,
            rising_ground_tolerance: 0.1,
            ground_validation_distance: 0.3,
            ground_validation_offset: 0.1,
            max_penetration: 0.3,

            // Rolling
            acceleration: 30.0,
            grounded_acceleration_scale: 1.2,
            max_velocity: 10.0,
            ground_friction: 0.95,
            air_friction: 0.99,
            rolling_resistance: 0.02,
            rolling_resistance_cap: 0.08,
            terminal_velocity: 30.0,

            // Jumping
            fall_multiplier: 2.5,
            low_jump_multiplier: 2.0,
            jump_force: 9.0,
            momentum_preservation: 0.5,
            momentum_jump_factor: 0.3,
            jump_vertical_speed_limit: 0.5,
            landing_tolerance: 0.05,
            coyote_time: 0.15,
            jump_buffer_time: 0.1,
            allow_coyote_jump: false,
        }
    }
}

impl MovementConfig {
    /// Forgiving handling: coyote jumps on, longer buffer, more grip.
    pub fn arcade() -> Self {
        Self {
            jump_buffer_time: 0.15,
            coyote_time: 0.2,
            allow_coyote_jump: true,
            ground_friction: 0.9,
            ..Self::default()
        }
    }

    /// Tight handling: short windows, heavier fall.
    pub fn precise() -> Self {
        Self {
            jump_buffer_time: 0.05,
            coyote_time: 0.08,
            fall_multiplier: 3.0,
            air_friction: 0.995,
            ..Self::default()
        }
    }

    /// Distance within which a contact allows jumping.
    pub fn jump_reach(&self) -> f32 {
        self.radius + self.snap_distance
    }

    /// Distance within which a contact counts as ground.
    pub fn ground_reach(&self) -> f32 {
        self.radius + self.ground_check_distance
    }
}
