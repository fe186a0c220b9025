//! Events raised during a tick.
//!
//! Collaborators (audio, UI, network sync) read these after each step
//! instead of registering callbacks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::gravity::GravityMode;

/// Why the ball was sent to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnCause {
    /// The fall counter hit its limit.
    TooManyFalls,
    /// No validated ground near the last safe position.
    NoSafeGround,
}

/// Why the ball was moved by the safety net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RespawnReason {
    /// Back to the last safe position.
    SafePosition,
    /// To validated ground found near the last safe position.
    NearSafePosition,
    /// Back to the level spawn.
    Spawn(SpawnCause),
    /// Explicit level restart.
    LevelRestart,
    /// Fell through the absolute world floor.
    Emergency,
    /// Position or velocity went NaN or infinite.
    NumericCorruption,
    /// In the air too long; dropped onto the ground below.
    AirborneTimeout,
}

/// Something a collaborator may want to react to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PhysicsEvent {
    /// A jump fired.
    Jumped { position: Vec3 },

    /// The ball touched down, with its speed along gravity.
    Landed { position: Vec3, impact_speed: f32 },

    /// The gravity world flipped.
    WorldTransition { from: GravityMode, to: GravityMode },

    /// The ball was teleported.
    Respawned { reason: RespawnReason, position: Vec3 },

    /// Falling fast just above the level's fall threshold.
    FallWarning { height: f32 },
}

impl PhysicsEvent {
    /// Whether the ball was teleported by this event.
    pub fn is_teleport(&self) -> bool {
        matches!(
            self,
            PhysicsEvent::Respawned { .. } | PhysicsEvent::WorldTransition { .. }
        )
    }
}
