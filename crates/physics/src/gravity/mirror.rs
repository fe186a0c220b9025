//! Reflection between the normal and inverted worlds.

use glam::{Quat, Vec3};

use super::GravityMode;
use crate::surface::{Surface, SurfaceFlags};

/// Reflection across the plane halfway between the two worlds.
///
/// `axis` is the normal world's "up". A point at height `h` along it maps to
/// height `-offset - h`, so the top of the normal floor becomes the
/// underside of the inverted floor at `-offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mirror {
    axis: Vec3,
    offset: f32,
}

impl Mirror {
    pub fn new(axis: Vec3, offset: f32) -> Self {
        Self {
            axis: axis.normalize_or_zero(),
            offset,
        }
    }

    /// Normal-world "up".
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Height of the reflection plane along the axis.
    pub fn plane_height(&self) -> f32 {
        -self.offset * 0.5
    }

    /// Reflect a point.
    pub fn point(&self, point: Vec3) -> Vec3 {
        let distance = point.dot(self.axis) - self.plane_height();
        point - self.axis * (2.0 * distance)
    }

    /// Reflect an orientation.
    ///
    /// For a shape symmetric about its local XZ plane, reflecting the shape
    /// equals rotating it by `u * q * u`, with `u` the axis as a pure
    /// quaternion.
    pub fn rotation(&self, rotation: Quat) -> Quat {
        let u = Quat::from_xyzw(self.axis.x, self.axis.y, self.axis.z, 0.0);
        (u * rotation * u).normalize()
    }

    /// Inverted-world copy of a normal surface. Starts hidden.
    pub fn surface(&self, surface: &Surface) -> Surface {
        Surface {
            shape: surface.shape,
            position: self.point(surface.position),
            rotation: self.rotation(surface.rotation),
            flags: surface.flags | SurfaceFlags::MIRRORED,
            visible: false,
        }
    }

    /// Height of a point measured in the given world's own frame.
    pub fn height(&self, point: Vec3, mode: GravityMode) -> f32 {
        match mode {
            GravityMode::Normal => point.dot(self.axis),
            GravityMode::Inverted => self.point(point).dot(self.axis),
        }
    }

    /// Map a point into normal-world coordinates.
    pub fn to_normal_frame(&self, point: Vec3, mode: GravityMode) -> Vec3 {
        match mode {
            GravityMode::Normal => point,
            GravityMode::Inverted => self.point(point),
        }
    }
}
