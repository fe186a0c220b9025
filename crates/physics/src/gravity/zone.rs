//! Gravity-changer volumes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// A box that temporarily replaces gravity while the ball is inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityZone {
    pub center: Vec3,
    pub half_extents: Vec3,
    /// Gravity applied on entry.
    pub gravity: Vec3,
    /// How long the override lasts (seconds).
    pub duration: f32,
}

impl GravityZone {
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).abs().cmple(self.half_extents).all()
    }

    /// Whether the zone's gravity can be applied at all.
    pub fn is_usable(&self) -> bool {
        self.gravity.is_finite() && self.gravity.length_squared() > 0.0 && self.duration > 0.0
    }
}

/// An active gravity override.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityOverride {
    pub gravity: Vec3,
    /// Gravity to restore on expiry.
    pub previous: Vec3,
    pub expires_at: Timestamp,
}
