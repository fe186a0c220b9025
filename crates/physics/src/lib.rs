//! Flipball Physics
//!
//! A deterministic kinematic controller for a single rolling ball, plus the
//! two-state gravity world it lives in.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! - **Surface**: the registry of collidable geometry and ray queries against it
//! - **Probe**: multi-ray ground detection along the current gravity axis
//! - **Movement**: the body, its jump timers and the fixed-step integrator
//! - **Gravity**: the Normal/Inverted world, mirrored geometry and gravity zones
//! - **Safety**: fall warnings, bounded recovery and the emergency floor
//!
//! [`PhysicsWorld`] owns all of the above and runs them in a fixed order
//! once per tick.
//!
//! # Design Principles
//!
//! 1. **Determinism**: same inputs and same tick count always give the same state
//! 2. **No globals**: every piece of state lives in an explicit struct
//! 3. **No failing steps**: faults become state changes and events, never errors

pub mod config;
pub mod events;
pub mod gravity;
pub mod level;
pub mod movement;
pub mod probe;
pub mod safety;
pub mod surface;
pub mod world;

/// Simulation time in seconds since the world was created.
pub type Timestamp = f64;

// Re-export commonly used types
pub use config::{ConfigError, FallSafetyConfig, GravityWorldConfig, PhysicsConfig};
pub use events::{PhysicsEvent, RespawnReason, SpawnCause};
pub use gravity::{GravityMode, GravityWorld, GravityZone, TransitionCause};
pub use level::{LevelBounds, LevelDescriptor};
pub use movement::{
    Footing, InputBasis, Integrator, KinematicBody, MoveInput, MovementConfig, MovementState,
};
pub use probe::{probe, Contact, ProbeSettings};
pub use safety::{FallRecoveryState, FallSafetyNet};
pub use surface::{
    RayHit, RegistryError, Surface, SurfaceFlags, SurfaceId, SurfaceRegistry, SurfaceShape,
};
pub use world::PhysicsWorld;
