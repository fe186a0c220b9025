//! Surface shapes and poses.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Real};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::shape::SharedShape;
use serde::{Deserialize, Serialize};

use super::flags::SurfaceFlags;

/// Shape of a surface in its local frame.
///
/// Every variant is symmetric about its local XZ plane, which lets the
/// gravity world mirror it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SurfaceShape {
    /// Box with the given half-size on each axis.
    Cuboid { half_extents: Vec3 },
    /// Sphere.
    Ball { radius: f32 },
    /// Y-aligned cylinder.
    Cylinder { half_height: f32, radius: f32 },
}

impl SurfaceShape {
    /// Build the parry3d shape used for ray casts.
    pub fn to_shared_shape(self) -> SharedShape {
        match self {
            SurfaceShape::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            SurfaceShape::Ball { radius } => SharedShape::ball(radius),
            SurfaceShape::Cylinder { half_height, radius } => {
                SharedShape::cylinder(half_height, radius)
            }
        }
    }
}

/// A piece of level geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Local shape.
    pub shape: SurfaceShape,
    /// Center in world space.
    pub position: Vec3,
    /// Orientation in world space.
    pub rotation: Quat,
    /// Collision and membership flags.
    pub flags: SurfaceFlags,
    /// Whether the renderer should draw it.
    pub visible: bool,
}

impl Surface {
    /// Create a visible solid surface with no rotation.
    pub fn new(shape: SurfaceShape, position: Vec3) -> Self {
        Self {
            shape,
            position,
            rotation: Quat::IDENTITY,
            flags: SurfaceFlags::SOLID,
            visible: true,
        }
    }

    /// Axis-aligned solid box.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(SurfaceShape::Cuboid { half_extents }, center)
    }

    /// Solid sphere.
    pub fn ball(center: Vec3, radius: f32) -> Self {
        Self::new(SurfaceShape::Ball { radius }, center)
    }

    /// Solid Y-aligned cylinder.
    pub fn cylinder(center: Vec3, half_height: f32, radius: f32) -> Self {
        Self::new(SurfaceShape::Cylinder { half_height, radius }, center)
    }

    /// Replace the orientation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add flags on top of the current ones.
    pub fn with_flags(mut self, flags: SurfaceFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    /// Whether this surface belongs to the inverted world.
    pub fn is_mirrored(&self) -> bool {
        self.flags.contains(SurfaceFlags::MIRRORED)
    }

    /// World transform in parry3d terms.
    pub fn isometry(&self) -> Isometry<Real> {
        to_isometry(self.position, self.rotation)
    }
}

pub(crate) fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = rotation.normalize();
    Isometry::from_parts(
        Translation3::new(position.x, position.y, position.z),
        UnitQuaternion::from_quaternion(Quaternion::new(
            rotation.w, rotation.x, rotation.y, rotation.z,
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isometry_matches_pose() {
        let surface = Surface::cuboid(Vec3::new(1.0, 2.0, 3.0), Vec3::ONE)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let iso = surface.isometry();

        assert_eq!(iso.translation.vector.x, 1.0);
        assert_eq!(iso.translation.vector.y, 2.0);
        assert_eq!(iso.translation.vector.z, 3.0);

        // +X rotated a quarter turn about Y lands on -Z
        let rotated = iso.rotation * parry3d::na::Vector3::new(1.0, 0.0, 0.0);
        assert!(rotated.x.abs() < 1e-5);
        assert!((rotated.z + 1.0).abs() < 1e-5, "got {:?}", rotated);
    }

    #[test]
    fn test_builders_default_to_visible_solid() {
        let surface = Surface::ball(Vec3::ZERO, 2.0).with_flags(SurfaceFlags::ANIMATED);

        assert!(surface.visible);
        assert!(surface.flags.contains(SurfaceFlags::SOLID | SurfaceFlags::ANIMATED));
        assert!(!surface.is_mirrored());
    }
}
