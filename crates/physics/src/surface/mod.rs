//! Collidable level geometry.
//!
//! Surfaces are simple convex shapes placed in the world. The registry owns
//! them and answers ray queries; nothing else in the crate talks to parry3d.
//!
//! # Key Types
//!
//! - [`SurfaceRegistry`]: the set of surfaces the ball may touch
//! - [`Surface`]: one shape with a pose and [`SurfaceFlags`]
//! - [`RayHit`]: one intersection returned by a ray query

mod flags;
mod registry;
mod shape;

pub use flags::SurfaceFlags;
pub use registry::{RayHit, RegistryError, SurfaceId, SurfaceRegistry};
pub use shape::{Surface, SurfaceShape};
