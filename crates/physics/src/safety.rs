//! Fall-safety net.
//!
//! Runs after every integrator step and escalates through:
//!
//! 1. **Warning**: falling fast just above the fall threshold. Advisory only.
//! 2. **Recovery**: at or below the threshold. Flip the world if the level
//!    allows it, otherwise put the ball back on known-good ground, going
//!    to spawn after too many falls.
//! 3. **Emergency**: below an absolute world floor, or numerically
//!    corrupt. Straight to spawn, no guard applies.
//!
//! An airborne-timeout failsafe catches balls stuck falling through gaps
//! the height tiers never see.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::FallSafetyConfig;
use crate::events::{PhysicsEvent, RespawnReason, SpawnCause};
use crate::gravity::{GravityMode, GravityWorld, TransitionCause};
use crate::level::LevelDescriptor;
use crate::movement::KinematicBody;
use crate::probe::{Contact, ProbeSettings};
use crate::surface::SurfaceRegistry;
use crate::Timestamp;

/// Recovery bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallRecoveryState {
    /// Last grounded position that passed validation.
    pub last_safe_position: Vec3,
    /// When it was recorded; `None` until the first grounded tick.
    pub last_safe_time: Option<Timestamp>,
    /// World the safe position belongs to.
    pub last_safe_mode: GravityMode,
    /// Recoveries since the last spawn, `0..=max_fall_count`.
    pub fall_count: u32,
    /// Re-entry guard held for the settle delay after a recovery.
    pub is_recovering: bool,
    /// When the guard drops.
    pub settle_until: Timestamp,
    /// A warning was already raised for the current fall.
    pub warned: bool,
}

impl FallRecoveryState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            last_safe_position: spawn,
            last_safe_time: None,
            last_safe_mode: GravityMode::Normal,
            fall_count: 0,
            is_recovering: false,
            settle_until: 0.0,
            warned: false,
        }
    }
}

/// Watches the ball and puts it back when it falls out of the level.
#[derive(Debug, Clone)]
pub struct FallSafetyNet {
    config: FallSafetyConfig,
    probe: ProbeSettings,
    state: FallRecoveryState,
}

impl FallSafetyNet {
    pub fn new(config: FallSafetyConfig, probe: ProbeSettings, spawn: Vec3) -> Self {
        Self {
            config,
            probe,
            state: FallRecoveryState::new(spawn),
        }
    }

    pub fn state(&self) -> &FallRecoveryState {
        &self.state
    }

    pub fn config(&self) -> &FallSafetyConfig {
        &self.config
    }

    /// Run every tier once. Call after the integrator, once per tick.
    pub fn evaluate(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
        now: Timestamp,
    ) -> Vec<PhysicsEvent> {
        let mut events = Vec::new();

        if !body.is_finite() {
            log::warn!("ball state is not finite ({:?}, {:?})", body.position, body.velocity);
            self.emergency(body, gravity, registry, level, RespawnReason::NumericCorruption, &mut events);
            return events;
        }

        if self.state.is_recovering && now >= self.state.settle_until {
            self.state.is_recovering = false;
        }
        if body.is_grounded() {
            self.state.warned = false;
        }

        let guarded = self.state.is_recovering || gravity.is_transitioning();
        let height = gravity.height_of(body.position);
        let threshold = level.fall_threshold();
        let fall_speed = body.velocity.dot(gravity.gravity_direction());
        let falling_fast = fall_speed >= self.config.velocity_threshold;

        // Warning
        if !guarded
            && !self.state.warned
            && falling_fast
            && height > threshold
            && height < threshold + self.config.warning_height
        {
            log::warn!("falling fast at height {:.1} (threshold {:.1})", height, threshold);
            self.state.warned = true;
            events.push(PhysicsEvent::FallWarning { height });
        }

        // Recovery, or a fall into the other world
        if !guarded && height <= threshold {
            let world_fall = level.supports_inverted_world() && falling_fast && !body.is_grounded();
            let transition = if world_fall {
                gravity.try_transition(body, registry, self.probe.radius, TransitionCause::Fall, now)
            } else {
                None
            };

            match transition {
                Some(t) => events.push(PhysicsEvent::WorldTransition { from: t.from, to: t.to }),
                None => self.recover(body, gravity, registry, level, now, &mut events),
            }
        }

        // Emergency floor, measured in absolute world space
        if body.position.dot(gravity.mirror().axis()) < self.config.emergency_floor {
            log::warn!("ball passed the emergency floor at {:?}", body.position);
            self.emergency(body, gravity, registry, level, RespawnReason::Emergency, &mut events);
        }

        if !body.is_grounded() && body.air_time > self.config.max_airborne_time {
            self.airborne_timeout(body, gravity, registry, level, now, &mut events);
        }

        events
    }

    /// Record the current position as safe if it qualifies.
    ///
    /// Rate-limited to one write per `safe_update_interval`, except right
    /// after changing worlds.
    pub fn track_safe_position(
        &mut self,
        body: &KinematicBody,
        gravity: &GravityWorld,
        level: &dyn LevelDescriptor,
        now: Timestamp,
    ) {
        if !body.is_grounded() || self.state.is_recovering || gravity.is_transitioning() {
            return;
        }

        let due = self.state.last_safe_mode != gravity.mode()
            || self.state.last_safe_time.map_or(true, |t| {
                now - t >= f64::from(self.config.safe_update_interval)
            });
        if !due || !level.bounds().contains(gravity.to_normal_frame(body.position)) {
            return;
        }

        self.state.last_safe_position = body.position;
        self.state.last_safe_time = Some(now);
        self.state.last_safe_mode = gravity.mode();
    }

    /// Send the ball to spawn and forget all falls.
    pub fn restart(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
    ) {
        self.send_to_spawn(body, gravity, registry, level);
        self.state.fall_count = 0;
        self.state.is_recovering = false;
        self.state.warned = false;
    }

    // ========================================================================
    // Tiers
    // ========================================================================

    fn recover(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
        now: Timestamp,
        events: &mut Vec<PhysicsEvent>,
    ) {
        self.state.is_recovering = true;
        self.state.settle_until = now + f64::from(self.config.settle_delay);
        self.state.fall_count += 1;
        let safe = self.safe_position_in(gravity);

        let reason = if self.state.fall_count >= self.config.max_fall_count {
            self.state.fall_count = 0;
            RespawnReason::Spawn(SpawnCause::TooManyFalls)
        } else if self.is_safe(safe, gravity, registry, level) {
            RespawnReason::SafePosition
        } else if let Some(point) = self.search_near_safe(safe, gravity, registry, level) {
            body.position = point;
            RespawnReason::NearSafePosition
        } else {
            RespawnReason::Spawn(SpawnCause::NoSafeGround)
        };

        match reason {
            RespawnReason::Spawn(_) => self.send_to_spawn(body, gravity, registry, level),
            RespawnReason::SafePosition => {
                body.position = safe;
                body.clear_motion();
            }
            _ => body.clear_motion(),
        }

        log::info!(
            "recovered to {:?} ({:?}), fall {}/{}",
            body.position,
            reason,
            self.state.fall_count,
            self.config.max_fall_count
        );
        events.push(PhysicsEvent::Respawned {
            reason,
            position: body.position,
        });
    }

    fn emergency(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
        reason: RespawnReason,
        events: &mut Vec<PhysicsEvent>,
    ) {
        self.send_to_spawn(body, gravity, registry, level);
        body.position += gravity.up() * self.config.emergency_lift;
        self.state.fall_count = 0;
        self.state.is_recovering = false;

        events.push(PhysicsEvent::Respawned {
            reason,
            position: body.position,
        });
    }

    fn airborne_timeout(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
        now: Timestamp,
        events: &mut Vec<PhysicsEvent>,
    ) {
        log::warn!("airborne for {:.1}s at {:?}", body.air_time, body.position);

        let gravity_direction = gravity.gravity_direction();
        let Some(contact) = self.probe.cast(
            body.position,
            gravity_direction,
            registry,
            self.config.airborne_probe_distance,
        ) else {
            self.recover(body, gravity, registry, level, now, events);
            return;
        };

        body.position = self.probe.resting_position(body.position, gravity_direction, &contact);
        body.clear_motion();
        body.ground_on(
            Contact {
                distance: self.probe.radius,
                ..contact
            },
            true,
        );

        events.push(PhysicsEvent::Respawned {
            reason: RespawnReason::AirborneTimeout,
            position: body.position,
        });
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn send_to_spawn(
        &mut self,
        body: &mut KinematicBody,
        gravity: &mut GravityWorld,
        registry: &mut SurfaceRegistry,
        level: &dyn LevelDescriptor,
    ) {
        gravity.reset_to_normal(registry);
        body.reset_to(level.primary_spawn());
    }

    /// Last safe position, carried into the active world if it was recorded
    /// in the other one.
    fn safe_position_in(&self, gravity: &GravityWorld) -> Vec3 {
        if self.state.last_safe_mode == gravity.mode() {
            self.state.last_safe_position
        } else {
            gravity.mirror().point(self.state.last_safe_position)
        }
    }

    /// Ground within `safe_position_radius` along gravity, inside the level.
    fn is_safe(
        &self,
        candidate: Vec3,
        gravity: &GravityWorld,
        registry: &SurfaceRegistry,
        level: &dyn LevelDescriptor,
    ) -> bool {
        level.bounds().contains(gravity.to_normal_frame(candidate))
            && self
                .probe
                .cast(
                    candidate,
                    gravity.gravity_direction(),
                    registry,
                    self.config.safe_position_radius,
                )
                .is_some()
    }

    /// First safe point on rings of radius 1..=N around `center`.
    fn search_near_safe(
        &self,
        center: Vec3,
        gravity: &GravityWorld,
        registry: &SurfaceRegistry,
        level: &dyn LevelDescriptor,
    ) -> Option<Vec3> {
        let (e1, e2) = gravity.gravity_direction().any_orthonormal_pair();
        let angles = self.config.search_angles.max(1);

        (1..=self.config.search_rings)
            .flat_map(|ring| {
                (0..angles).map(move |k| {
                    let angle = std::f32::consts::TAU * k as f32 / angles as f32;
                    let (sin, cos) = angle.sin_cos();
                    center + (e1 * cos + e2 * sin) * ring as f32
                })
            })
            .find(|&candidate| self.is_safe(candidate, gravity, registry, level))
    }
}

// ============================================================================
// Tests
// ============================================================================
