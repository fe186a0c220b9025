//! The two-state gravity world.
//!
//! The level exists twice: the normal geometry, and a mirror image of it
//! hanging below, reflected across a plane `mirror_offset / 2` under the
//! origin. Falling off one world drops the ball into the other with gravity
//! reversed.
//!
//! Gravity-changer volumes are a separate, temporary override on top of
//! the current world. The two mechanisms never overlap: a transition is
//! refused while an override is active, and a volume cannot trigger while
//! a transition is in progress.

mod mirror;
mod world;
mod zone;

use serde::{Deserialize, Serialize};

pub use mirror::Mirror;
pub use world::{GravityWorld, Transition, TransitionBlock, TransitionCause};
pub use zone::{GravityOverride, GravityZone};

/// Which copy of the level is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GravityMode {
    #[default]
    Normal,
    Inverted,
}

impl GravityMode {
    /// The other world.
    pub fn opposite(self) -> Self {
        match self {
            GravityMode::Normal => GravityMode::Inverted,
            GravityMode::Inverted => GravityMode::Normal,
        }
    }
}
