//! Surface flags for ray filtering and world membership.

use serde::{Deserialize, Serialize};

/// Properties of a surface.
///
/// Ray queries take a mask and only consider surfaces whose flags intersect
/// it. The `MIRRORED` bit marks geometry that belongs to the inverted world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SurfaceFlags(pub u32);

impl SurfaceFlags {
    /// No properties. Never hit by any query.
    pub const NONE: Self = Self(0);

    /// Collidable geometry - floors, platforms, ramps.
    pub const SOLID: Self = Self(1 << 0);

    /// Inverted-world copy of a normal surface.
    pub const MIRRORED: Self = Self(1 << 1);

    /// Surface that may be re-posed between frames.
    pub const ANIMATED: Self = Self(1 << 2);

    /// Mask for ground probes.
    pub const MASK_GROUND: Self = Self::SOLID;

    /// Check if these flags contain a specific flag.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any of the given flags are set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }
}

impl std::ops::BitOr for SurfaceFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
