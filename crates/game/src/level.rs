//! Levels and their geometry.

use flipball_physics::{
    GravityZone, LevelBounds, LevelDescriptor, Surface, SurfaceFlags, SurfaceRegistry,
};
use glam::{Quat, Vec3};

/// A playable level.
#[derive(Debug, Clone)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Static geometry.
    pub platforms: Vec<Surface>,

    /// Spawn points; the first is where the ball respawns.
    pub spawn_points: Vec<Vec3>,

    /// Playable area in normal-world coordinates.
    pub bounds: LevelBounds,

    /// Height at or below which the ball has fallen off.
    pub fall_threshold: f32,

    /// Whether falling off flips into the mirrored world.
    pub inverted_world: bool,

    /// Gravity-changer volumes.
    pub gravity_zones: Vec<GravityZone>,
}

impl Level {
    /// Create an empty level.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            platforms: Vec::new(),
            spawn_points: Vec::new(),
            bounds: LevelBounds::default(),
            fall_threshold: -20.0,
            inverted_world: false,
            gravity_zones: Vec::new(),
        }
    }

    /// A short course for development: a start pad, a ramp up to a raised
    /// deck, a gap, a landing pad and a low-gravity zone.
    pub fn test_course() -> Self {
        let mut level = Self::new("test_course", "Test Course");
        level.inverted_world = true;
        level.bounds = LevelBounds::new(Vec3::new(-60.0, -60.0, -60.0), Vec3::new(60.0, 60.0, 60.0));

        // Start pad, top face at y=0
        level.add_box(Vec3::new(0.0, -0.5, 0.0), Vec3::new(10.0, 0.5, 10.0));

        // Ramp rising toward -Z onto the deck
        level.platforms.push(
            Surface::cuboid(Vec3::new(0.0, 0.5, -13.0), Vec3::new(3.0, 0.25, 4.0))
                .with_rotation(Quat::from_rotation_x(0.2)),
        );
        level.add_box(Vec3::new(0.0, 1.0, -22.0), Vec3::new(5.0, 0.5, 5.0));

        // Landing pad across a 6 m gap along +X
        level.add_box(Vec3::new(21.0, -0.5, 0.0), Vec3::new(5.0, 0.5, 5.0));

        // Bumper on the landing pad
        level.platforms.push(Surface::cylinder(Vec3::new(23.0, 0.5, 3.0), 0.5, 1.0));

        level.gravity_zones.push(GravityZone {
            center: Vec3::new(21.0, 2.0, -3.0),
            half_extents: Vec3::new(1.5, 2.0, 1.5),
            gravity: Vec3::new(0.0, -6.0, 0.0),
            duration: 3.0,
        });

        level.spawn_points.push(Vec3::new(0.0, 0.5, 0.0));
        level
    }

    /// Add an axis-aligned solid box.
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3) {
        self.platforms
            .push(Surface::cuboid(center, half_extents).with_flags(SurfaceFlags::SOLID));
    }

    /// Register every platform in a fresh registry.
    pub fn build_registry(&self) -> SurfaceRegistry {
        let mut registry = SurfaceRegistry::new();
        for platform in &self.platforms {
            registry.add(platform.clone());
        }
        registry
    }
}

impl LevelDescriptor for Level {
    fn supports_inverted_world(&self) -> bool {
        self.inverted_world
    }

    fn bounds(&self) -> LevelBounds {
        self.bounds
    }

    fn fall_threshold(&self) -> f32 {
        self.fall_threshold
    }

    fn spawn_points(&self) -> &[Vec3] {
        &self.spawn_points
    }

    fn gravity_zones(&self) -> &[GravityZone] {
        &self.gravity_zones
    }
}
