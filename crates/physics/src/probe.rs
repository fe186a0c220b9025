//! Ground probe.
//!
//! Casts one centred ray plus a ring of parallel rays along the gravity
//! direction and keeps the closest hit. Rays are enumerated centre first,
//! then around the ring; a later ray only wins with a strictly smaller
//! distance, so ties always go to the earliest ray.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::movement::MovementConfig;
use crate::surface::{SurfaceFlags, SurfaceRegistry};

/// Nearest ground contact found by a probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// World-space hit point.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Distance from the ray origin to the hit, along gravity.
    pub distance: f32,
}

/// Probe a ball position for ground.
///
/// Returns `None` when no ray hits anything within `max_distance`.
pub fn probe(
    position: Vec3,
    gravity_direction: Vec3,
    surfaces: &SurfaceRegistry,
    radius: f32,
    ray_count: u32,
    spread: f32,
    max_distance: f32,
) -> Option<Contact> {
    let mut closest: Option<Contact> = None;

    for origin in ray_origins(position, gravity_direction, ray_count, spread.min(radius)) {
        let Some(hit) =
            surfaces.cast_ray(origin, gravity_direction, max_distance, SurfaceFlags::MASK_GROUND)
        else {
            continue;
        };

        let is_closer = closest
            .as_ref()
            .map_or(true, |c| hit.distance < c.distance);

        if is_closer {
            closest = Some(Contact {
                point: hit.point,
                normal: hit.normal,
                distance: hit.distance,
            });
        }
    }

    closest
}

/// Ray origins in evaluation order: centre, then the ring.
pub fn ray_origins(position: Vec3, gravity_direction: Vec3, ray_count: u32, spread: f32) -> Vec<Vec3> {
    let mut origins = Vec::with_capacity(ray_count as usize + 1);
    origins.push(position);

    if spread <= 0.0 || ray_count == 0 {
        return origins;
    }

    let (e1, e2) = gravity_direction.normalize_or_zero().any_orthonormal_pair();
    for k in 0..ray_count {
        let angle = std::f32::consts::TAU * k as f32 / ray_count as f32;
        let (sin, cos) = angle.sin_cos();
        origins.push(position + (e1 * cos + e2 * sin) * spread);
    }

    origins
}

/// Signed gap between the bottom of the ball and the contact.
///
/// Positive above the surface, negative when sunk into it.
#[inline]
pub fn ground_offset(contact: &Contact, radius: f32) -> f32 {
    contact.distance - radius
}

/// Whether a contact is close enough, and level enough with the ball, to
/// count as ground.
pub fn is_ground_contact(contact: &Contact, config: &MovementConfig) -> bool {
    contact.distance <= config.ground_reach()
        && ground_offset(contact, config.radius).abs() <= config.snap_distance * 2.0
}

/// Whether a contact is close enough to jump from.
pub fn is_jump_contact(contact: &Contact, config: &MovementConfig) -> bool {
    contact.distance <= config.jump_reach()
}

/// Probe shape shared by every caller that does not own a config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Ball radius.
    pub radius: f32,
    /// Rays around the ring.
    pub ray_count: u32,
    /// Ring radius.
    pub spread: f32,
}

impl ProbeSettings {
    /// Take the probe shape from a movement config.
    pub fn from_config(config: &MovementConfig) -> Self {
        Self {
            radius: config.radius,
            ray_count: config.probe_ray_count,
            spread: config.probe_spread,
        }
    }

    /// Probe with this shape.
    pub fn cast(
        &self,
        position: Vec3,
        gravity_direction: Vec3,
        surfaces: &SurfaceRegistry,
        max_distance: f32,
    ) -> Option<Contact> {
        probe(
            position,
            gravity_direction,
            surfaces,
            self.radius,
            self.ray_count,
            self.spread,
            max_distance,
        )
    }

    /// Centre of a ball resting on `contact`, keeping the horizontal position.
    pub fn resting_position(&self, position: Vec3, gravity_direction: Vec3, contact: &Contact) -> Vec3 {
        position + gravity_direction * ground_offset(contact, self.radius)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    const DOWN: Vec3 = Vec3::NEG_Y;

    fn flat_floor() -> SurfaceRegistry {
        let mut registry = SurfaceRegistry::new();
        // Top face at y=0
        registry.add(Surface::cuboid(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(50.0, 0.5, 50.0),
        ));
        registry
    }

    fn default_probe(position: Vec3, registry: &SurfaceRegistry) -> Option<Contact> {
        let config = MovementConfig::default();
        ProbeSettings::from_config(&config).cast(position, DOWN, registry, config.probe_max_distance)
    }

    #[test]
    fn test_ray_origins_order() {
        let origins = ray_origins(Vec3::new(1.0, 2.0, 3.0), DOWN, 4, 0.35);

        assert_eq!(origins.len(), 5);
        assert_eq!(origins[0], Vec3::new(1.0, 2.0, 3.0), "centre ray comes first");
        for origin in &origins[1..] {
            let offset = *origin - origins[0];
            assert!(offset.y.abs() < 1e-6, "ring lies across gravity");
            assert!((offset.length() - 0.35).abs() < 1e-5);
        }
    }

    #[test]
    fn test_flat_floor_contact() {
        let registry = flat_floor();

        let contact = default_probe(Vec3::new(0.0, 0.5, 0.0), &registry).expect("floor is below");
        assert!((contact.distance - 0.5).abs() < 1e-4);
        assert!((contact.normal - Vec3::Y).length() < 1e-4);

        // All rays tie on a flat floor, so the centre ray wins
        assert!(contact.point.x.abs() < 1e-6);
        assert!(contact.point.z.abs() < 1e-6);
    }

    #[test]
    fn test_probe_is_deterministic() {
        let mut registry = flat_floor();
        registry.add(Surface::cuboid(Vec3::new(0.3, 0.1, 0.0), Vec3::new(0.1, 0.1, 0.1)));
        let position = Vec3::new(0.1, 1.0, 0.05);

        let first = default_probe(position, &registry);
        for _ in 0..10 {
            assert_eq!(default_probe(position, &registry), first);
        }
    }

    #[test]
    fn test_closest_ray_wins() {
        let mut registry = flat_floor();
        // Small block under the edge of the ring, top face at y=0.2
        registry.add(Surface::cuboid(Vec3::new(0.3, 0.1, 0.0), Vec3::new(0.1, 0.1, 0.4)));
        let position = Vec3::new(0.0, 1.0, 0.0);

        let contact = default_probe(position, &registry).expect("ground is below");

        let config = MovementConfig::default();
        let expected = ray_origins(position, DOWN, config.probe_ray_count, config.probe_spread)
            .into_iter()
            .filter_map(|o| registry.cast_ray(o, DOWN, config.probe_max_distance, SurfaceFlags::MASK_GROUND))
            .map(|hit| hit.distance)
            .fold(f32::INFINITY, f32::min);

        assert_eq!(contact.distance, expected);
        assert!(contact.distance < 1.0, "block is closer than the floor");
    }

    #[test]
    fn test_probe_misses_beyond_max_distance() {
        let registry = flat_floor();
        assert!(default_probe(Vec3::new(0.0, 5.0, 0.0), &registry).is_none());
    }

    #[test]
    fn test_probe_follows_gravity_direction() {
        let mut registry = SurfaceRegistry::new();
        // Ceiling with its bottom face at y=10
        registry.add(Surface::cuboid(Vec3::new(0.0, 10.5, 0.0), Vec3::new(50.0, 0.5, 50.0)));

        let config = MovementConfig::default();
        let settings = ProbeSettings::from_config(&config);
        let contact = settings
            .cast(Vec3::new(0.0, 9.5, 0.0), Vec3::Y, &registry, 2.0)
            .expect("ceiling is 'below' under inverted gravity");

        assert!((contact.distance - 0.5).abs() < 1e-4);
        assert!((contact.normal + Vec3::Y).length() < 1e-4);
        assert!(default_probe(Vec3::new(0.0, 9.5, 0.0), &registry).is_none());
    }

    #[test]
    fn test_grounded_threshold_on_flat_floor() {
        let registry = flat_floor();
        let config = MovementConfig::default();

        // Two units up the contact is 2.0 away, well outside ground reach
        let far = default_probe(Vec3::new(0.0, 2.0, 0.0), &registry).expect("floor is below");
        assert!((far.distance - 2.0).abs() < 1e-4);
        assert!(!is_ground_contact(&far, &config));

        // Grounded while the ball centre sits within radius + ground_check_distance
        let resting = default_probe(Vec3::new(0.0, 0.5, 0.0), &registry).expect("floor is below");
        assert!(is_ground_contact(&resting, &config));
        assert!(is_jump_contact(&resting, &config));

        let hovering = default_probe(Vec3::new(0.0, 0.64, 0.0), &registry).expect("floor is below");
        assert!(is_ground_contact(&hovering, &config));
        assert!(!is_jump_contact(&hovering, &config), "0.64 > radius + snap_distance");

        let above = default_probe(Vec3::new(0.0, 0.66, 0.0), &registry).expect("floor is below");
        assert!(!is_ground_contact(&above, &config));

        // Sunk too deep for the offset window
        let sunk = default_probe(Vec3::new(0.0, 0.25, 0.0), &registry).expect("floor is below");
        assert!(!is_ground_contact(&sunk, &config));
    }

    #[test]
    fn test_resting_position() {
        let registry = flat_floor();
        let settings = ProbeSettings::from_config(&MovementConfig::default());
        let position = Vec3::new(3.0, 1.2, -2.0);

        let contact = settings.cast(position, DOWN, &registry, 2.0).expect("floor is below");
        let rest = settings.resting_position(position, DOWN, &contact);

        assert!((rest - Vec3::new(3.0, 0.5, -2.0)).length() < 1e-4);
    }
}
