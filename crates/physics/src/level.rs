//! Level descriptor contract.
//!
//! Levels are built elsewhere; the physics core only reads these few
//! properties from them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::gravity::GravityZone;

/// Axis-aligned box a level's playable area fits in.
///
/// Bounds are given in normal-world coordinates; the inverted world is
/// checked against their mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl LevelBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Whether a point lies inside, edges included.
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Default for LevelBounds {
    fn default() -> Self {
        Self::new(Vec3::splat(-1000.0), Vec3::splat(1000.0))
    }
}

/// Read-only view of a level.
pub trait LevelDescriptor {
    /// Whether falling off this level flips the world instead of
    /// restarting.
    fn supports_inverted_world(&self) -> bool;

    /// Playable area.
    fn bounds(&self) -> LevelBounds;

    /// World-relative height at or below which the ball has fallen off.
    fn fall_threshold(&self) -> f32;

    /// Safe spawn points. The first one is used for respawns.
    fn spawn_points(&self) -> &[Vec3];

    /// Gravity-changer volumes.
    fn gravity_zones(&self) -> &[GravityZone] {
        &[]
    }

    /// Where respawns land.
    fn primary_spawn(&self) -> Vec3 {
        self.spawn_points().first().copied().unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let bounds = LevelBounds::new(Vec3::new(10.0, 5.0, 10.0), Vec3::new(-10.0, -5.0, -10.0));

        assert!(bounds.contains(Vec3::ZERO));
        assert!(bounds.contains(Vec3::new(10.0, 5.0, 10.0)));
        assert!(!bounds.contains(Vec3::new(0.0, 6.0, 0.0)));
    }
}
