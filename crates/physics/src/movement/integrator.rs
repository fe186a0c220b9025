//! Fixed-step movement integrator.
//!
//! This is the main entry point for ball movement. It takes one tick of
//! input and advances the body through the surface registry. The stages run
//! in a fixed order; later stages read what earlier ones wrote.

use glam::Vec3;

use crate::probe::{self, Contact, ProbeSettings};
use crate::surface::{SurfaceFlags, SurfaceRegistry};

use super::body::{Footing, KinematicBody, MovementState};
use super::config::MovementConfig;
use super::input::MoveInput;

/// What happened during one integrator step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// A jump fired this tick.
    pub jumped: bool,
    /// The ball touched down this tick, with its speed along gravity.
    pub landed: Option<f32>,
}

/// Ball movement integrator.
///
/// # Example
///
/// ```ignore
/// let integrator = Integrator::new(MovementConfig::default());
/// let mut body = KinematicBody::new(spawn);
///
/// // Each tick:
/// integrator.step(&mut body, gravity, &input, &registry, 1.0 / 60.0);
/// ```
#[derive(Debug, Clone)]
pub struct Integrator {
    /// Movement configuration.
    pub config: MovementConfig,
}

impl Integrator {
    /// Create an integrator with the given configuration.
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Create an integrator with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    /// Probe shape for this configuration.
    pub fn probe_settings(&self) -> ProbeSettings {
        ProbeSettings::from_config(&self.config)
    }

    /// Advance the body by one fixed step.
    ///
    /// `gravity` is the full gravity vector; its direction is recomputed
    /// here and never stored separately.
    pub fn step(
        &self,
        body: &mut KinematicBody,
        gravity: Vec3,
        input: &MoveInput,
        surfaces: &SurfaceRegistry,
        delta_time: f32,
    ) -> StepReport {
        let gravity_direction = gravity.normalize_or_zero();
        let up = -gravity_direction;
        let mut report = StepReport::default();

        let was_grounded = body.is_grounded();

        // Timers
        body.jump.tick_timers(was_grounded, &self.config, delta_time);
        body.jump.register_input(input.jump, &self.config);
        if !was_grounded {
            body.air_time += delta_time;
        }

        let input_force = self.input_force(input, up, was_grounded);

        // Jump before gravity so the launch is not eaten this tick
        if body.jump.should_fire(body.jump_context(up), &self.config) {
            self.do_jump(body, up);
            report.jumped = true;
        }

        let multiplier = self.gravity_multiplier(body, gravity_direction, input);
        body.acceleration = gravity * multiplier + input_force;
        body.velocity += body.acceleration * delta_time;

        self.apply_friction(body, up);
        self.clamp_velocity(body, gravity_direction);

        let fall_speed = body.velocity.dot(gravity_direction).max(0.0);
        if self.follow_ground(body, up) {
            body.position += body.velocity * delta_time;
        } else {
            self.advance(body, gravity_direction, surfaces, delta_time);
        }

        if self.check_ground(body, gravity_direction, surfaces) && !was_grounded {
            report.landed = Some(fall_speed);
            self.land(body, up);
        }

        body.movement_state = MovementState::classify(body.velocity, up, body.is_grounded());
        report
    }

    /// Re-evaluate ground contact without integrating.
    ///
    /// Returns whether the body ends up grounded.
    pub fn check_ground(
        &self,
        body: &mut KinematicBody,
        gravity_direction: Vec3,
        surfaces: &SurfaceRegistry,
    ) -> bool {
        let config = &self.config;
        let up = -gravity_direction;

        // Don't detect ground while moving away from it (just jumped).
        // A grounded ball measures against its contact plane so slopes count.
        let reference = if body.is_grounded() {
            body.ground_normal
        } else {
            up
        };
        if body.velocity.dot(reference) > config.rising_ground_tolerance {
            body.footing = Footing::Airborne;
            return false;
        }

        let contact = self
            .probe_settings()
            .cast(body.position, gravity_direction, surfaces, config.probe_max_distance)
            .map(|c| self.resolve_penetration(body, c, up))
            .filter(|c| probe::is_ground_contact(c, config))
            .or_else(|| self.validate_ground(body.position, gravity_direction, surfaces));

        let Some(contact) = contact else {
            body.footing = Footing::Airborne;
            return false;
        };

        body.ground_on(contact, probe::is_jump_contact(&contact, config));

        // Ease toward the resting height instead of snapping
        let offset = probe::ground_offset(&contact, config.radius);
        if !body.is_jumping() && offset.abs() > config.ground_correction_deadband {
            body.position -= up * offset * config.ground_correction_rate;
        }

        true
    }

    // ========================================================================
    // Forces
    // ========================================================================

    fn input_force(&self, input: &MoveInput, up: Vec3, was_grounded: bool) -> Vec3 {
        let wish = input.direction();
        let direction = (wish - up * wish.dot(up)).normalize_or_zero();
        if direction == Vec3::ZERO {
            return Vec3::ZERO;
        }

        let scale = if was_grounded && input.has_movement() {
            self.config.grounded_acceleration_scale
        } else {
            1.0
        };
        direction * self.config.acceleration * scale
    }

    fn gravity_multiplier(&self, body: &KinematicBody, gravity_direction: Vec3, input: &MoveInput) -> f32 {
        let along_gravity = body.velocity.dot(gravity_direction);

        if along_gravity > 0.0 {
            self.config.fall_multiplier
        } else if along_gravity < 0.0 && body.is_jumping() && !input.jump {
            self.config.low_jump_multiplier
        } else {
            1.0
        }
    }

    // ========================================================================
    // Jumping
    // ========================================================================

    fn do_jump(&self, body: &mut KinematicBody, up: Vec3) {
        let vertical = body.velocity.dot(up);
        let horizontal = body.velocity - up * vertical;
        let bonus =
            horizontal.length() * self.config.momentum_preservation * self.config.momentum_jump_factor;

        body.velocity = horizontal + up * (self.config.jump_force + bonus);
        body.jump.fire();
        body.footing = Footing::Airborne;

        log::debug!(
            "jump fired at {:?}: launch speed {:.2} (bonus {:.2})",
            body.position,
            self.config.jump_force + bonus,
            bonus
        );
    }

    fn land(&self, body: &mut KinematicBody, up: Vec3) {
        let ended_jump = body.jump.land();

        let vertical = body.velocity.dot(up);
        if vertical.abs() > self.config.landing_tolerance {
            body.velocity -= up * vertical;
        }

        log::debug!("landed at {:?} (from jump: {})", body.position, ended_jump);
    }

    // ========================================================================
    // Friction and Clamps
    // ========================================================================

    fn apply_friction(&self, body: &mut KinematicBody, up: Vec3) {
        let vertical = body.velocity.dot(up);
        let mut horizontal = body.velocity - up * vertical;

        if body.is_grounded() {
            horizontal *= self.config.ground_friction;

            let speed = horizontal.length();
            if speed > 0.0 {
                let drop = self
                    .config
                    .rolling_resistance
                    .min(speed * self.config.rolling_resistance_cap);
                horizontal *= (speed - drop) / speed;
            }
        } else {
            horizontal *= self.config.air_friction;
        }

        body.velocity = horizontal + up * vertical;
    }

    fn clamp_velocity(&self, body: &mut KinematicBody, gravity_direction: Vec3) {
        let terminal = self.config.terminal_velocity;
        let along = body.velocity.dot(gravity_direction);
        let mut horizontal = body.velocity - gravity_direction * along;

        let speed = horizontal.length();
        if speed > self.config.max_velocity {
            horizontal *= self.config.max_velocity / speed;
        }

        body.velocity = horizontal + gravity_direction * along.clamp(-terminal, terminal);
    }

    // ========================================================================
    // Position
    // ========================================================================

    /// Keep a grounded ball on its contact plane.
    ///
    /// Velocity into or away from the surface is dropped, so rolling onto a
    /// rising surface climbs it and gravity only pulls along the slope.
    /// Returns false when the ball has no floor under it to follow.
    fn follow_ground(&self, body: &mut KinematicBody, up: Vec3) -> bool {
        let normal = body.ground_normal;
        if !body.is_grounded() || normal.dot(up) <= 0.0 {
            return false;
        }
        body.velocity -= normal * body.velocity.dot(normal);
        true
    }

    /// Lift the ball out of a surface it has sunk into past the grounded
    /// window. Shallower sinks are left to the gentle correction.
    fn resolve_penetration(&self, body: &mut KinematicBody, contact: Contact, up: Vec3) -> Contact {
        let config = &self.config;
        let offset = probe::ground_offset(&contact, config.radius);
        if offset >= -config.snap_distance * 2.0 || offset < -config.max_penetration {
            return contact;
        }

        body.position -= up * offset;
        log::debug!("lifted ball {:.3} out of a surface at {:?}", -offset, contact.point);
        Contact {
            distance: config.radius,
            ..contact
        }
    }

    /// Move by one step of velocity, stopping on any floor crossed on the way.
    fn advance(
        &self,
        body: &mut KinematicBody,
        gravity_direction: Vec3,
        surfaces: &SurfaceRegistry,
        delta_time: f32,
    ) {
        let mut delta = body.velocity * delta_time;

        let along = body.velocity.dot(gravity_direction);
        if along > 0.0 {
            let travel = along * delta_time;
            let radius = self.config.radius;
            let landing = self
                .probe_settings()
                .cast(body.position, gravity_direction, surfaces, radius + travel)
                .map(|c| probe::ground_offset(&c, radius))
                // Contacts far inside the ball are not floors we can land on
                .filter(|gap| *gap >= -self.config.snap_distance * 2.0 && *gap < travel);

            if let Some(gap) = landing {
                delta += gravity_direction * (gap.max(0.0) - travel);
                body.velocity -= gravity_direction * along;
            }
        }

        body.position += delta;
    }

    /// Single centred ray catching probe false negatives from jitter.
    fn validate_ground(
        &self,
        position: Vec3,
        gravity_direction: Vec3,
        surfaces: &SurfaceRegistry,
    ) -> Option<Contact> {
        let radius = self.config.radius;
        let hit = surfaces.cast_ray(
            position,
            gravity_direction,
            radius + self.config.ground_validation_distance,
            SurfaceFlags::MASK_GROUND,
        )?;

        let contact = Contact {
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance,
        };
        (probe::ground_offset(&contact, radius).abs() <= self.config.ground_validation_offset)
            .then_some(contact)
    }
}

// ============================================================================
// Tests
// ============================================================================
