//! Surface registry and ray queries.
//!
//! The registry is mutated only between ticks. Entries are kept ordered by
//! id so iteration and tie-breaking never depend on hashing.

use glam::{Quat, Vec3};
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::SharedShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::flags::SurfaceFlags;
use super::shape::Surface;

/// Stable handle to a registered surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// Errors from registry updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("surface {0:?} is already registered")]
    AlreadyRegistered(SurfaceId),

    #[error("surface {0:?} is not registered")]
    UnknownSurface(SurfaceId),
}

/// One ray intersection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Surface that was hit.
    pub surface: SurfaceId,
    /// World-space hit point.
    pub point: Vec3,
    /// Outward surface normal at the hit point.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

#[derive(Debug, Clone)]
struct Entry {
    id: SurfaceId,
    surface: Surface,
    shape: SharedShape,
    transform: Isometry<Real>,
}

impl Entry {
    fn new(id: SurfaceId, surface: Surface) -> Self {
        Self {
            id,
            shape: surface.shape.to_shared_shape(),
            transform: surface.isometry(),
            surface,
        }
    }
}

/// The set of collidable surfaces.
#[derive(Debug, Clone, Default)]
pub struct SurfaceRegistry {
    /// Registered surfaces, sorted by id.
    entries: Vec<Entry>,
    /// Next id to hand out.
    next_id: u32,
}

impl SurfaceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a surface and return its id.
    pub fn add(&mut self, surface: Surface) -> SurfaceId {
        let id = self.reserve_id();
        self.entries.push(Entry::new(id, surface));
        id
    }

    /// Allocate an id without registering anything under it.
    ///
    /// Used for geometry that lives outside the registry until it is
    /// [`reinsert`](Self::reinsert)ed.
    pub fn reserve_id(&mut self) -> SurfaceId {
        let id = SurfaceId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Unregister a surface, returning it.
    pub fn remove(&mut self, id: SurfaceId) -> Option<Surface> {
        let index = self.index_of(id).ok()?;
        Some(self.entries.remove(index).surface)
    }

    /// Register a surface under an id handed out earlier.
    pub fn reinsert(&mut self, id: SurfaceId, surface: Surface) -> Result<(), RegistryError> {
        match self.index_of(id) {
            Ok(_) => Err(RegistryError::AlreadyRegistered(id)),
            Err(index) => {
                self.entries.insert(index, Entry::new(id, surface));
                self.next_id = self.next_id.max(id.0 + 1);
                Ok(())
            }
        }
    }

    /// Move an animated surface. Only call between ticks.
    pub fn set_pose(
        &mut self,
        id: SurfaceId,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), RegistryError> {
        let index = self
            .index_of(id)
            .map_err(|_| RegistryError::UnknownSurface(id))?;
        let entry = &mut self.entries[index];
        entry.surface.position = position;
        entry.surface.rotation = rotation;
        entry.transform = entry.surface.isometry();
        Ok(())
    }

    /// Toggle renderer visibility.
    pub fn set_visible(&mut self, id: SurfaceId, visible: bool) -> Result<(), RegistryError> {
        let index = self
            .index_of(id)
            .map_err(|_| RegistryError::UnknownSurface(id))?;
        self.entries[index].surface.visible = visible;
        Ok(())
    }

    /// Look up a registered surface.
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        self.index_of(id).ok().map(|i| &self.entries[i].surface)
    }

    /// Whether a surface is currently registered.
    pub fn contains(&self, id: SurfaceId) -> bool {
        self.index_of(id).is_ok()
    }

    /// Iterate over all registered surfaces in id order.
    pub fn all(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        self.entries.iter().map(|e| (e.id, &e.surface))
    }

    /// Number of registered surfaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every surface. Ids are not reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Intersect a ray with every surface matching `mask`.
    ///
    /// Hits are sorted by distance. The sort is stable, so equal distances
    /// keep id order.
    pub fn intersect_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceFlags,
    ) -> Vec<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() < 0.5 || max_distance.is_nan() || max_distance <= 0.0 {
            return Vec::new();
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut hits: Vec<RayHit> = self
            .entries
            .iter()
            .filter(|entry| mask.intersects(entry.surface.flags))
            .filter_map(|entry| {
                let intersection =
                    entry
                        .shape
                        .cast_ray_and_get_normal(&entry.transform, &ray, max_distance, true)?;
                let distance = intersection.time_of_impact;
                if distance > max_distance {
                    return None;
                }

                let normal = Vec3::new(
                    intersection.normal.x,
                    intersection.normal.y,
                    intersection.normal.z,
                );
                // Rays starting inside a solid report a zero normal
                let normal = if normal.length_squared() > 0.5 {
                    normal
                } else {
                    -dir
                };

                Some(RayHit {
                    surface: entry.id,
                    point: origin + dir * distance,
                    normal,
                    distance,
                })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit along a ray, if any.
    pub fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: SurfaceFlags,
    ) -> Option<RayHit> {
        self.intersect_ray(origin, direction, max_distance, mask)
            .into_iter()
            .next()
    }

    fn index_of(&self, id: SurfaceId) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&id, |e| e.id)
    }
}

// ============================================================================
// Tests
// ============================================================================
