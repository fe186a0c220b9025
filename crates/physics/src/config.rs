//! Physics configuration.
//!
//! [`PhysicsConfig`] bundles every tunable in the crate. It is validated once
//! when a [`PhysicsWorld`](crate::PhysicsWorld) is built; the tick itself
//! never checks configuration again.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::movement::MovementConfig;

/// Errors from [`PhysicsConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick rate must be positive")]
    ZeroTickRate,

    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("probe needs at least one ray around the circle")]
    NoProbeRays,

    #[error("{name} gravity must be finite and non-zero, got {value}")]
    InvalidGravity { name: &'static str, value: Vec3 },

    #[error("transition cooldown {cooldown}s is shorter than the transition itself ({duration}s)")]
    CooldownShorterThanTransition { cooldown: f32, duration: f32 },

    #[error("max fall count must be at least 1")]
    ZeroMaxFallCount,
}

// ============================================================================
// Gravity World
// ============================================================================

/// Configuration for the Normal/Inverted gravity world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GravityWorldConfig {
    /// Gravity in the normal world.
    pub normal_gravity: Vec3,

    /// Gravity in the inverted world.
    pub inverted_gravity: Vec3,

    /// Distance between normal geometry and its mirrored copy.
    pub mirror_offset: f32,

    /// Minimum time between two world transitions (seconds).
    pub transition_cooldown: f32,

    /// Minimum time after any gravity change before a transition (seconds).
    pub gravity_flip_cooldown: f32,

    /// How long a transition stays in progress (seconds).
    pub transition_duration: f32,

    /// How far the destination probe looks for ground.
    pub transition_search_radius: f32,
}

impl Default for GravityWorldConfig {
    fn default() -> Self {
        Self {
            normal_gravity: Vec3::new(0.0, -20.0, 0.0),
            inverted_gravity: Vec3::new(0.0, 20.0, 0.0),
            mirror_offset: 40.0,
            transition_cooldown: 2.0,
            gravity_flip_cooldown: 1.5,
            transition_duration: 1.0,
            transition_search_radius: 60.0,
        }
    }
}

// ============================================================================
// Fall Safety
// ============================================================================

/// Configuration for the fall-safety net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallSafetyConfig {
    /// Height of the warning band above the level's fall threshold.
    pub warning_height: f32,

    /// Fall speed that counts as "falling fast".
    pub velocity_threshold: f32,

    /// Recoveries allowed before the ball goes back to spawn.
    pub max_fall_count: u32,

    /// How long recovery blocks re-entry (seconds).
    pub settle_delay: f32,

    /// A safe point needs ground within this distance.
    pub safe_position_radius: f32,

    /// Minimum time between safe-position updates (seconds).
    pub safe_update_interval: f32,

    /// Absolute world-space height below which the ball is teleported home.
    pub emergency_floor: f32,

    /// Lift above spawn after an emergency teleport.
    pub emergency_lift: f32,

    /// Longest allowed time in the air (seconds).
    pub max_airborne_time: f32,

    /// Reach of the probe used by the airborne failsafe.
    pub airborne_probe_distance: f32,

    /// Rings searched around the last safe position (radius 1..=N).
    pub search_rings: u32,

    /// Sample points per ring.
    pub search_angles: u32,
}

impl Default for FallSafetyConfig {
    fn default() -> Self {
        Self {
            warning_height: 5.0,
            velocity_threshold: 5.0,
            max_fall_count: 3,
            settle_delay: 0.5,
            safe_position_radius: 3.0,
            safe_update_interval: 1.0,
            emergency_floor: -100.0,
            emergency_lift: 1.0,
            max_airborne_time: 5.0,
            airborne_probe_distance: 200.0,
            search_rings: 10,
            search_angles: 8,
        }
    }
}

// ============================================================================
// Physics
// ============================================================================

/// Everything the physics world needs to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Fixed simulation rate (ticks per second).
    pub tick_rate: u32,

    /// Ball handling.
    pub movement: MovementConfig,

    /// Gravity world.
    pub gravity: GravityWorldConfig,

    /// Fall safety.
    pub fall_safety: FallSafetyConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            movement: MovementConfig::default(),
            gravity: GravityWorldConfig::default(),
            fall_safety: FallSafetyConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Check every tunable the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }

        let m = &self.movement;
        positive("radius", m.radius)?;
        positive("probe_max_distance", m.probe_max_distance)?;
        positive("max_penetration", m.max_penetration)?;
        positive("max_velocity", m.max_velocity)?;
        positive("terminal_velocity", m.terminal_velocity)?;
        positive("jump_force", m.jump_force)?;
        positive("jump_buffer_time", m.jump_buffer_time)?;
        if m.probe_ray_count == 0 {
            return Err(ConfigError::NoProbeRays);
        }

        let g = &self.gravity;
        gravity("normal", g.normal_gravity)?;
        gravity("inverted", g.inverted_gravity)?;
        positive("mirror_offset", g.mirror_offset)?;
        positive("transition_duration", g.transition_duration)?;
        positive("transition_search_radius", g.transition_search_radius)?;
        if g.transition_cooldown < g.transition_duration {
            return Err(ConfigError::CooldownShorterThanTransition {
                cooldown: g.transition_cooldown,
                duration: g.transition_duration,
            });
        }

        let f = &self.fall_safety;
        positive("safe_position_radius", f.safe_position_radius)?;
        positive("max_airborne_time", f.max_airborne_time)?;
        positive("airborne_probe_distance", f.airborne_probe_distance)?;
        if f.max_fall_count == 0 {
            return Err(ConfigError::ZeroMaxFallCount);
        }

        Ok(())
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn gravity(name: &'static str, value: Vec3) -> Result<(), ConfigError> {
    if value.is_finite() && value.length_squared() > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidGravity { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert_eq!(config.tick_rate, 60);
        assert!((config.delta_time() - 1.0 / 60.0).abs() < 1e-7);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        let config = PhysicsConfig {
            tick_rate: 0,
            ..PhysicsConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroTickRate));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = PhysicsConfig::default();
        config.movement.radius = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { name: "radius", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.gravity.normal_gravity = Vec3::new(0.0, f32::NAN, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGravity { name: "normal", .. })
        ));

        let mut config = PhysicsConfig::default();
        config.gravity.transition_cooldown = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CooldownShorterThanTransition { .. })
        ));

        let mut config = PhysicsConfig::default();
        config.fall_safety.max_fall_count = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxFallCount));
    }
}
