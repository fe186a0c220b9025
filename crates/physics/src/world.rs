//! The physics context object.
//!
//! Owns every piece of mutable physics state and runs the subsystems in a
//! fixed order once per tick. There are no globals; two worlds never share
//! anything.

use glam::{Quat, Vec3};

use crate::config::{ConfigError, PhysicsConfig};
use crate::events::{PhysicsEvent, RespawnReason};
use crate::gravity::{GravityWorld, Transition, TransitionCause};
use crate::level::LevelDescriptor;
use crate::movement::{Integrator, KinematicBody, MoveInput};
use crate::safety::{FallRecoveryState, FallSafetyNet};
use crate::surface::{RegistryError, Surface, SurfaceId, SurfaceRegistry};
use crate::Timestamp;

/// One ball, its gravity world and the geometry it rolls on.
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    integrator: Integrator,
    gravity: GravityWorld,
    safety: FallSafetyNet,
    registry: SurfaceRegistry,
    body: KinematicBody,
    now: Timestamp,
    /// Events not yet drained.
    events: Vec<PhysicsEvent>,
}

impl PhysicsWorld {
    /// Build a world with the ball resting at `spawn`.
    ///
    /// Mirrored geometry is not built here; call [`Self::build_mirror`]
    /// once the level's surfaces are registered.
    pub fn new(
        config: PhysicsConfig,
        registry: SurfaceRegistry,
        spawn: Vec3,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let integrator = Integrator::new(config.movement.clone());
        let safety = FallSafetyNet::new(
            config.fall_safety.clone(),
            integrator.probe_settings(),
            spawn,
        );

        log::info!(
            "physics world created: {} Hz, {} surfaces, spawn {:?}",
            config.tick_rate,
            registry.len(),
            spawn
        );

        Ok(Self {
            gravity: GravityWorld::new(config.gravity.clone()),
            config,
            integrator,
            safety,
            registry,
            body: KinematicBody::new(spawn),
            now: 0.0,
            events: Vec::new(),
        })
    }

    /// Advance one fixed tick.
    ///
    /// Returns the events raised by this tick. They also stay queued until
    /// [`Self::drain_events`] is called.
    pub fn step(&mut self, input: &MoveInput, level: &dyn LevelDescriptor) -> &[PhysicsEvent] {
        let first = self.events.len();
        let delta_time = self.config.delta_time();
        self.now += f64::from(delta_time);

        self.gravity.update(self.now);
        if self
            .gravity
            .apply_zones(self.body.position, level.gravity_zones(), self.now)
        {
            log::debug!("gravity zone entered at {:?}", self.body.position);
        }

        // A corrupt body skips integration and goes straight to the safety net
        if self.body.is_finite() {
            let report = self.integrator.step(
                &mut self.body,
                self.gravity.gravity(),
                input,
                &self.registry,
                delta_time,
            );

            if report.jumped {
                self.events.push(PhysicsEvent::Jumped {
                    position: self.body.position,
                });
            }
            if let Some(impact_speed) = report.landed {
                log::debug!("landed at {:?} ({:.2} m/s)", self.body.position, impact_speed);
                self.events.push(PhysicsEvent::Landed {
                    position: self.body.position,
                    impact_speed,
                });
            }
        }

        let raised = self.safety.evaluate(
            &mut self.body,
            &mut self.gravity,
            &mut self.registry,
            level,
            self.now,
        );
        self.events.extend(raised);

        self.safety
            .track_safe_position(&self.body, &self.gravity, level, self.now);

        &self.events[first..]
    }

    /// Ask for a world flip outside a fall (a switch or a trigger).
    ///
    /// Refused silently when the level has no inverted world or the
    /// transition guard blocks it.
    pub fn request_transition(&mut self, level: &dyn LevelDescriptor) -> Option<Transition> {
        if !level.supports_inverted_world() {
            log::debug!("world transition requested on a level without an inverted world");
            return None;
        }

        let transition = self.gravity.try_transition(
            &mut self.body,
            &mut self.registry,
            self.config.movement.radius,
            TransitionCause::Request,
            self.now,
        )?;
        self.events.push(PhysicsEvent::WorldTransition {
            from: transition.from,
            to: transition.to,
        });
        Some(transition)
    }

    /// Put the ball back at spawn in the normal world.
    pub fn restart_level(&mut self, level: &dyn LevelDescriptor) {
        self.safety.restart(
            &mut self.body,
            &mut self.gravity,
            &mut self.registry,
            level,
        );
        log::info!("level restarted at {:?}", self.body.position);
        self.events.push(PhysicsEvent::Respawned {
            reason: RespawnReason::LevelRestart,
            position: self.body.position,
        });
    }

    /// Build the inverted world from the registered geometry.
    pub fn build_mirror(&mut self) -> usize {
        self.gravity.build_mirror(&mut self.registry)
    }

    /// Swap in another level's geometry and start it from its spawn.
    ///
    /// The gravity world returns to `Normal` and the safety net forgets
    /// everything it knew about the old level. Returns how many surfaces
    /// were mirrored.
    pub fn load_level(
        &mut self,
        surfaces: impl IntoIterator<Item = Surface>,
        level: &dyn LevelDescriptor,
    ) -> usize {
        self.gravity.reset_to_normal(&mut self.registry);
        self.registry.clear();
        for surface in surfaces {
            self.registry.add(surface);
        }

        // Copies stay parked on levels without an inverted world
        let mirrored = self.build_mirror();
        self.safety = FallSafetyNet::new(
            self.config.fall_safety.clone(),
            self.integrator.probe_settings(),
            level.primary_spawn(),
        );
        log::info!("level loaded: {} surfaces, {} mirrored", self.registry.len(), mirrored);

        self.restart_level(level);
        mirrored
    }

    /// Move an animated surface between ticks, along with its mirrored copy.
    pub fn set_surface_pose(
        &mut self,
        id: SurfaceId,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), RegistryError> {
        self.gravity.set_pose(&mut self.registry, id, position, rotation)
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    pub fn gravity_world(&self) -> &GravityWorld {
        &self.gravity
    }

    pub fn recovery(&self) -> &FallRecoveryState {
        self.safety.state()
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SurfaceRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Simulation clock in seconds.
    pub fn now(&self) -> Timestamp {
        self.now
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{GravityMode, GravityZone};
    use crate::level::LevelBounds;
    use crate::surface::Surface;

    struct TestLevel {
        inverted: bool,
        spawns: Vec<Vec3>,
        zones: Vec<GravityZone>,
    }

    impl TestLevel {
        fn new(inverted: bool) -> Self {
            Self {
                inverted,
                spawns: vec![Vec3::new(0.0, 0.5, 0.0)],
                zones: Vec::new(),
            }
        }
    }

    impl LevelDescriptor for TestLevel {
        fn supports_inverted_world(&self) -> bool {
            self.inverted
        }

        fn bounds(&self) -> LevelBounds {
            LevelBounds::default()
        }

        fn fall_threshold(&self) -> f32 {
            -20.0
        }

        fn spawn_points(&self) -> &[Vec3] {
            &self.spawns
        }

        fn gravity_zones(&self) -> &[GravityZone] {
            &self.zones
        }
    }

    /// 20x20 floor with its top face at y=0.
    fn world_at(spawn: Vec3) -> PhysicsWorld {
        let mut registry = SurfaceRegistry::new();
        registry.add(Surface::cuboid(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(10.0, 0.5, 10.0),
        ));
        let mut world = PhysicsWorld::new(PhysicsConfig::default(), registry, spawn).unwrap();
        world.build_mirror();
        world
    }

    fn run(world: &mut PhysicsWorld, level: &TestLevel, input: MoveInput, ticks: usize) -> Vec<PhysicsEvent> {
        for _ in 0..ticks {
            world.step(&input, level);
        }
        world.drain_events()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PhysicsConfig {
            tick_rate: 0,
            ..PhysicsConfig::default()
        };
        let result = PhysicsWorld::new(config, SurfaceRegistry::new(), Vec3::ZERO);
        assert!(matches!(result, Err(ConfigError::ZeroTickRate)));
    }

    #[test]
    fn test_clock_advances_by_fixed_step() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        run(&mut world, &level, MoveInput::default(), 60);
        assert!((world.now() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_ball_settles_on_floor() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 3.0, 0.0));

        let events = run(&mut world, &level, MoveInput::default(), 120);

        assert!(world.body().is_grounded());
        assert!((world.body().position.y - 0.5).abs() < 0.11);
        let landings = events
            .iter()
            .filter(|e| matches!(e, PhysicsEvent::Landed { .. }))
            .count();
        assert_eq!(landings, 1);
        assert!(world.recovery().last_safe_time.is_some());
    }

    #[test]
    fn test_jump_raises_event() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        run(&mut world, &level, MoveInput::default(), 10);

        let events = world.step(&MoveInput::jump(), &level).to_vec();

        assert!(matches!(events.as_slice(), [PhysicsEvent::Jumped { .. }]));
        assert!(world.body().velocity.y > 0.0);
    }

    #[test]
    fn test_rolling_off_the_edge_recovers() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        let input = MoveInput {
            forward: true,
            ..MoveInput::default()
        };

        let mut respawn = None;
        for _ in 0..600 {
            let events = world.step(&input, &level);
            respawn = events.iter().find_map(|e| match e {
                PhysicsEvent::Respawned { reason, position } => Some((*reason, *position)),
                _ => None,
            });
            if respawn.is_some() {
                break;
            }
        }

        let (reason, position) = respawn.expect("ball should have been recovered");
        assert!(matches!(
            reason,
            RespawnReason::SafePosition | RespawnReason::NearSafePosition
        ));
        assert!(position.y > 0.0 && position.x <= 10.5, "recovered to {:?}", position);
        assert_eq!(world.recovery().fall_count, 1);
        assert_eq!(world.gravity_world().mode(), GravityMode::Normal);
    }

    #[test]
    fn test_fall_through_the_mirror() {
        let level = TestLevel::new(true);
        // Under the floor, already falling
        let mut world = world_at(Vec3::new(0.0, -15.0, 0.0));

        let events = run(&mut world, &level, MoveInput::default(), 120);

        assert!(events.contains(&PhysicsEvent::WorldTransition {
            from: GravityMode::Normal,
            to: GravityMode::Inverted,
        }));
        assert_eq!(world.gravity_world().mode(), GravityMode::Inverted);
        assert!(world.body().is_grounded(), "hanging from the mirrored floor");
        assert!((world.body().position.y + 40.5).abs() < 0.11);
        assert_eq!(world.recovery().fall_count, 0);
    }

    #[test]
    fn test_second_request_within_cooldown_is_noop() {
        let level = TestLevel::new(true);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        run(&mut world, &level, MoveInput::default(), 30);

        let first = world.request_transition(&level).expect("guard is clear");
        assert_eq!(first.cause, TransitionCause::Request);
        let stamped = world.gravity_world().last_transition_time();

        run(&mut world, &level, MoveInput::default(), 60);
        let mode = world.gravity_world().mode();
        assert!(world.request_transition(&level).is_none());

        assert_eq!(world.gravity_world().mode(), mode);
        assert_eq!(world.gravity_world().last_transition_time(), stamped);
        assert!(world.body().is_grounded(), "hanging under the mirrored floor");
        assert!((world.body().position.y + 40.5).abs() < 0.11);
    }

    #[test]
    fn test_transition_refused_without_inverted_world() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));

        assert!(world.request_transition(&level).is_none());
        assert_eq!(world.gravity_world().mode(), GravityMode::Normal);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_restart_level_returns_to_normal_spawn() {
        let level = TestLevel::new(true);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        world.request_transition(&level);
        world.drain_events();

        world.restart_level(&level);

        assert_eq!(world.gravity_world().mode(), GravityMode::Normal);
        assert_eq!(world.body().position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(
            world.drain_events(),
            vec![PhysicsEvent::Respawned {
                reason: RespawnReason::LevelRestart,
                position: Vec3::new(0.0, 0.5, 0.0),
            }]
        );
    }

    #[test]
    fn test_corrupt_velocity_triggers_emergency() {
        let level = TestLevel::new(false);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        world.body_mut().velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);

        let events = world.step(&MoveInput::default(), &level).to_vec();

        assert!(events.iter().any(|e| matches!(
            e,
            PhysicsEvent::Respawned {
                reason: RespawnReason::NumericCorruption,
                ..
            }
        )));
        assert!(world.body().is_finite());
    }

    #[test]
    fn test_gravity_zone_overrides_then_restores() {
        let mut level = TestLevel::new(false);
        level.zones.push(GravityZone {
            center: Vec3::new(0.0, 1.0, 0.0),
            half_extents: Vec3::splat(2.0),
            gravity: Vec3::new(0.0, -5.0, 0.0),
            duration: 0.5,
        });
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));

        world.step(&MoveInput::default(), &level);
        assert_eq!(world.gravity_world().gravity(), Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(world.gravity_world().mode(), GravityMode::Normal);

        run(&mut world, &level, MoveInput::default(), 40);
        assert!(world.gravity_world().active_override().is_none());
    }

    #[test]
    fn test_moved_platform_carries_its_mirror() {
        let level = TestLevel::new(true);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        let (floor, _) = world.registry().all().next().expect("floor is registered");

        // Raise the floor so its top sits at y=5
        world
            .set_surface_pose(floor, Vec3::new(0.0, 4.5, 0.0), Quat::IDENTITY)
            .unwrap();
        world.body_mut().reset_to(Vec3::new(0.0, 5.5, 0.0));

        let transition = world.request_transition(&level).expect("guard is clear");

        let copy = world.gravity_world().mirrored_copy(floor).expect("floor is mirrored");
        let mirrored = world.registry().get(copy).expect("copy registered while inverted");
        assert!((mirrored.position.y + 44.5).abs() < 1e-4, "copy at {:?}", mirrored.position);
        assert!(
            (transition.destination.y + 45.5).abs() < 0.11,
            "placed at {:?}",
            transition.destination
        );
    }

    #[test]
    fn test_load_level_replaces_geometry() {
        let level = TestLevel::new(true);
        let mut world = world_at(Vec3::new(0.0, 0.5, 0.0));
        world.request_transition(&level).expect("guard is clear");
        world.drain_events();

        let mirrored = world.load_level(
            [Surface::cuboid(Vec3::new(0.0, -0.5, 0.0), Vec3::new(3.0, 0.5, 3.0))],
            &level,
        );

        assert_eq!(mirrored, 1);
        assert_eq!(world.gravity_world().mode(), GravityMode::Normal);
        assert_eq!(world.registry().len(), 1, "mirrored copy is parked in Normal");
        assert_eq!(world.body().position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(world.recovery().fall_count, 0);
        assert!(world.drain_events().iter().any(|e| matches!(
            e,
            PhysicsEvent::Respawned {
                reason: RespawnReason::LevelRestart,
                ..
            }
        )));

        run(&mut world, &level, MoveInput::default(), 30);
        assert!(world.body().is_grounded());
    }
}
