//! Game simulation - the fixed-rate loop.
//!
//! Deterministic: the same level, config and input sequence always give
//! bit-identical snapshots, so a run can be replayed or verified remotely.

use flipball_physics::{ConfigError, LevelDescriptor, PhysicsConfig, PhysicsEvent, PhysicsWorld};
use serde::{Deserialize, Serialize};

use crate::input::PlayerInput;
use crate::level::Level;
use crate::snapshot::{BodySnapshot, SnapshotThrottle};

/// Game simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Physics configuration, tick rate included.
    pub physics: PhysicsConfig,

    /// Frames between regular snapshots.
    pub snapshot_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            snapshot_interval: 6,
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        self.physics.delta_time()
    }
}

/// What one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutput {
    /// Events raised during the tick, oldest first.
    pub events: Vec<PhysicsEvent>,

    /// Present on frames the throttle lets through.
    pub snapshot: Option<BodySnapshot>,
}

/// The main game simulation.
#[derive(Debug)]
pub struct Simulation {
    /// Frames completed so far.
    pub frame: u64,

    /// Simulation configuration.
    pub config: SimulationConfig,

    /// Current level.
    pub level: Level,

    world: PhysicsWorld,
    throttle: SnapshotThrottle,
}

impl Simulation {
    /// Create a simulation on `level` with the ball at its first spawn.
    pub fn new(config: SimulationConfig, level: Level) -> Result<Self, ConfigError> {
        let mut world = PhysicsWorld::new(
            config.physics.clone(),
            level.build_registry(),
            level.primary_spawn(),
        )?;
        if level.supports_inverted_world() {
            world.build_mirror();
        }

        log::info!("simulation started on '{}' ({})", level.name, level.id);

        Ok(Self {
            frame: 0,
            throttle: SnapshotThrottle::new(config.snapshot_interval),
            config,
            level,
            world,
        })
    }

    /// Default configuration on the test course.
    pub fn test_course() -> Result<Self, ConfigError> {
        Self::new(SimulationConfig::default(), Level::test_course())
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self, input: &PlayerInput) -> TickOutput {
        self.world.step(&input.to_move_input(), &self.level);
        self.frame += 1;

        let events = self.world.drain_events();
        for event in &events {
            log::debug!("frame {}: {:?}", self.frame, event);
        }

        let body = self.world.body();
        let snapshot = self
            .throttle
            .should_emit(self.frame, body.is_grounded())
            .then(|| BodySnapshot::capture(self.frame, body, self.world.gravity_world().mode()));

        TickOutput { events, snapshot }
    }

    /// Flip worlds on demand (a switch, a trigger). Refused silently if
    /// the level or the cooldowns do not allow it.
    pub fn request_transition(&mut self) -> bool {
        self.world.request_transition(&self.level).is_some()
    }

    /// Back to spawn in the normal world.
    pub fn restart(&mut self) {
        self.world.restart_level(&self.level);
        self.throttle.reset();
    }

    /// Move on to another level. The frame counter keeps running.
    pub fn load_level(&mut self, level: Level) {
        let mirrored = self.world.load_level(level.platforms.iter().cloned(), &level);
        log::info!("loaded '{}' ({}), {} mirrored surfaces", level.name, level.id, mirrored);
        self.level = level;
        self.throttle.reset();
    }

    /// Snapshot of the current frame, bypassing the throttle.
    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot::capture(self.frame, self.world.body(), self.world.gravity_world().mode())
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================
