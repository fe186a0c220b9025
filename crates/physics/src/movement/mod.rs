//! Rolling-ball movement.
//!
//! This module implements the per-tick ball physics:
//!
//! - Input forces resolved against a camera-supplied basis
//! - Gravity with fall and low-jump multipliers
//! - Ground and air friction, terminal velocity and speed caps
//! - Swept landing so fast falls never pass through floors
//! - Buffered, strictly grounded jumping
//!
//! # Design
//!
//! The [`Integrator`] takes a [`MoveInput`] and advances a [`KinematicBody`]
//! by one fixed step against the surface registry. It never fails; anything
//! that goes numerically wrong is caught by the fall-safety net afterwards.

mod body;
mod config;
mod input;
mod integrator;
mod jump;

pub use body::{Footing, KinematicBody, MovementState};
pub use config::MovementConfig;
pub use input::{InputBasis, MoveInput};
pub use integrator::{Integrator, StepReport};
pub use jump::{JumpContext, JumpPhase, JumpState};
