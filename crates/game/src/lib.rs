//! Flipball Game Logic
//!
//! The thin layer between a client and the physics core:
//!
//! - Levels and the geometry they register
//! - Key and camera input mapped onto the physics input
//! - The fixed-rate simulation loop
//! - Throttled body snapshots for a renderer or remote peer
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       Simulation                          │
//! │  ┌─────────────┐    ┌──────────────┐    ┌─────────────┐   │
//! │  │ PlayerInput │───►│ PhysicsWorld │───►│ Snapshots + │   │
//! │  │ (keys, yaw) │    │ (one tick)   │    │ events      │   │
//! │  └─────────────┘    └──────────────┘    └─────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod input;
pub mod level;
pub mod simulation;
pub mod snapshot;

// Re-export main types
pub use input::PlayerInput;
pub use level::Level;
pub use simulation::{Simulation, SimulationConfig, TickOutput};
pub use snapshot::{BodySnapshot, CodecError, SnapshotThrottle};

// Re-export physics types for convenience
pub use flipball_physics::{
    GravityMode, MovementConfig, MovementState, PhysicsConfig, PhysicsEvent, RespawnReason,
};
