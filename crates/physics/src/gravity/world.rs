//! Gravity-world state machine.
//!
//! `Normal ⇄ Inverted`, gated by two cooldowns and a fixed-duration
//! in-progress window. Gravity and its direction are only ever written
//! together through [`GravityWorld::set_gravity`].

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::mirror::Mirror;
use super::zone::{GravityOverride, GravityZone};
use super::GravityMode;
use crate::config::GravityWorldConfig;
use crate::movement::KinematicBody;
use crate::surface::{RegistryError, Surface, SurfaceFlags, SurfaceId, SurfaceRegistry};
use crate::Timestamp;

/// What set off a world transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// The ball fell out of its world and keeps falling into the other
    /// one from its sky.
    Fall,
    /// Requested while the ball is in play; it reappears at its mirror
    /// image.
    Request,
}

/// Why a transition request was refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionBlock {
    /// A transition is still running.
    InProgress,
    /// A gravity-changer override is active.
    OverrideActive,
    /// Too soon after the last transition.
    TransitionCooldown { remaining: f64 },
    /// Too soon after the last gravity change.
    GravityFlipCooldown { remaining: f64 },
}

/// An accepted transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: GravityMode,
    pub to: GravityMode,
    pub cause: TransitionCause,
    /// Where the ball was placed.
    pub destination: Vec3,
}

/// Gravity, world mode and mirrored geometry.
#[derive(Debug, Clone)]
pub struct GravityWorld {
    config: GravityWorldConfig,

    gravity: Vec3,
    gravity_direction: Vec3,
    mode: GravityMode,

    transition_in_progress: bool,
    transition_ends_at: Timestamp,
    last_transition_time: Option<Timestamp>,
    last_gravity_flip_time: Option<Timestamp>,

    /// Ids of every inverted-world surface, registered or not.
    mirrored_surfaces: BTreeSet<SurfaceId>,
    /// Mirrored surfaces held out of the registry while in `Normal`.
    parked: BTreeMap<SurfaceId, Surface>,
    /// Normal surface id to the id of its mirrored copy.
    copies: BTreeMap<SurfaceId, SurfaceId>,

    gravity_override: Option<GravityOverride>,
}

impl GravityWorld {
    /// Start in the normal world.
    pub fn new(config: GravityWorldConfig) -> Self {
        let mut world = Self {
            gravity: Vec3::ZERO,
            gravity_direction: Vec3::ZERO,
            mode: GravityMode::Normal,
            transition_in_progress: false,
            transition_ends_at: 0.0,
            last_transition_time: None,
            last_gravity_flip_time: None,
            mirrored_surfaces: BTreeSet::new(),
            parked: BTreeMap::new(),
            copies: BTreeMap::new(),
            gravity_override: None,
            config,
        };
        world.set_gravity(world.config.normal_gravity);
        world
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Unit vector along gravity; rays and "down" point this way.
    pub fn gravity_direction(&self) -> Vec3 {
        self.gravity_direction
    }

    /// Opposite of gravity.
    pub fn up(&self) -> Vec3 {
        -self.gravity_direction
    }

    pub fn mode(&self) -> GravityMode {
        self.mode
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_in_progress
    }

    pub fn last_transition_time(&self) -> Option<Timestamp> {
        self.last_transition_time
    }

    pub fn last_gravity_flip_time(&self) -> Option<Timestamp> {
        self.last_gravity_flip_time
    }

    pub fn active_override(&self) -> Option<&GravityOverride> {
        self.gravity_override.as_ref()
    }

    pub fn mirrored_surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.mirrored_surfaces.iter().copied()
    }

    pub fn config(&self) -> &GravityWorldConfig {
        &self.config
    }

    /// Reflection between the two worlds.
    pub fn mirror(&self) -> Mirror {
        Mirror::new(-self.config.normal_gravity, self.config.mirror_offset)
    }

    /// Height of a point in the active world's own frame.
    pub fn height_of(&self, point: Vec3) -> f32 {
        self.mirror().height(point, self.mode)
    }

    /// Map a point into normal-world coordinates.
    pub fn to_normal_frame(&self, point: Vec3) -> Vec3 {
        self.mirror().to_normal_frame(point, self.mode)
    }

    // ========================================================================
    // Mirrored Geometry
    // ========================================================================

    /// Rebuild the inverted-world copy of every normal solid surface.
    ///
    /// Returns how many surfaces were mirrored.
    pub fn build_mirror(&mut self, registry: &mut SurfaceRegistry) -> usize {
        for id in std::mem::take(&mut self.mirrored_surfaces) {
            registry.remove(id);
        }
        self.parked.clear();
        self.copies.clear();

        let mirror = self.mirror();
        let copies: Vec<(SurfaceId, Surface)> = registry
            .all()
            .filter(|(_, s)| s.flags.contains(SurfaceFlags::SOLID) && !s.is_mirrored())
            .map(|(source, s)| (source, mirror.surface(s)))
            .collect();

        for (source, copy) in copies {
            let id = registry.reserve_id();
            self.mirrored_surfaces.insert(id);
            self.parked.insert(id, copy);
            self.copies.insert(source, id);
        }

        self.sync_mirrored(registry);
        log::debug!("mirrored {} surfaces", self.mirrored_surfaces.len());
        self.mirrored_surfaces.len()
    }

    /// Move a surface and keep its mirrored copy in step.
    ///
    /// Animated geometry must go through here rather than
    /// [`SurfaceRegistry::set_pose`] once the mirror is built, or the two
    /// worlds drift apart. Only call between ticks.
    pub fn set_pose(
        &mut self,
        registry: &mut SurfaceRegistry,
        id: SurfaceId,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), RegistryError> {
        registry.set_pose(id, position, rotation)?;

        let Some(&copy) = self.copies.get(&id) else {
            return Ok(());
        };
        let mirror = self.mirror();
        let mirrored_position = mirror.point(position);
        let mirrored_rotation = mirror.rotation(rotation);

        match self.parked.get_mut(&copy) {
            Some(parked) => {
                parked.position = mirrored_position;
                parked.rotation = mirrored_rotation;
                Ok(())
            }
            None => registry.set_pose(copy, mirrored_position, mirrored_rotation),
        }
    }

    /// Id of the mirrored copy of a normal surface.
    pub fn mirrored_copy(&self, source: SurfaceId) -> Option<SurfaceId> {
        self.copies.get(&source).copied()
    }

    /// Register mirrored surfaces in `Inverted`, park them in `Normal`.
    fn sync_mirrored(&mut self, registry: &mut SurfaceRegistry) {
        match self.mode {
            GravityMode::Inverted => {
                for (id, surface) in std::mem::take(&mut self.parked) {
                    let restored = registry
                        .reinsert(id, surface)
                        .and_then(|()| registry.set_visible(id, true));
                    if let Err(err) = restored {
                        log::warn!("mirrored surface not restored: {}", err);
                    }
                }
            }
            GravityMode::Normal => {
                for &id in &self.mirrored_surfaces {
                    if let Some(mut surface) = registry.remove(id) {
                        surface.visible = false;
                        self.parked.insert(id, surface);
                    }
                }
            }
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Check the transition guard without changing anything.
    pub fn check_transition(&self, now: Timestamp) -> Result<(), TransitionBlock> {
        if self.transition_in_progress {
            return Err(TransitionBlock::InProgress);
        }
        if self.gravity_override.is_some() {
            return Err(TransitionBlock::OverrideActive);
        }
        if let Some(remaining) = remaining(self.last_transition_time, self.config.transition_cooldown, now) {
            return Err(TransitionBlock::TransitionCooldown { remaining });
        }
        if let Some(remaining) = remaining(self.last_gravity_flip_time, self.config.gravity_flip_cooldown, now) {
            return Err(TransitionBlock::GravityFlipCooldown { remaining });
        }
        Ok(())
    }

    /// Flip to the other world if the guard allows it.
    ///
    /// A refused request changes nothing and returns `None`; the caller may
    /// retry on a later tick.
    pub fn try_transition(
        &mut self,
        body: &mut KinematicBody,
        registry: &mut SurfaceRegistry,
        radius: f32,
        cause: TransitionCause,
        now: Timestamp,
    ) -> Option<Transition> {
        if let Err(block) = self.check_transition(now) {
            log::debug!("world transition refused: {:?}", block);
            return None;
        }

        let from = self.mode;
        let to = from.opposite();

        let carried = match cause {
            // Continue along the fall into the other world's sky
            TransitionCause::Fall => body.position + self.gravity_direction * self.config.mirror_offset,
            TransitionCause::Request => self.mirror().point(body.position),
        };

        self.mode = to;
        self.set_gravity(self.world_gravity(to));
        self.sync_mirrored(registry);

        let destination = self.find_destination(carried, registry, radius);
        body.position = destination;
        body.clear_motion();

        self.transition_in_progress = true;
        self.transition_ends_at = now + f64::from(self.config.transition_duration);
        self.last_transition_time = Some(now);
        self.last_gravity_flip_time = Some(now);

        log::info!("world transition {:?} -> {:?} ({:?}), ball at {:?}", from, to, cause, destination);
        Some(Transition {
            from,
            to,
            cause,
            destination,
        })
    }

    /// Return to `Normal` outside the state machine (level restart).
    ///
    /// Skips the cooldowns and stamps nothing.
    pub fn reset_to_normal(&mut self, registry: &mut SurfaceRegistry) {
        self.mode = GravityMode::Normal;
        self.set_gravity(self.config.normal_gravity);
        self.gravity_override = None;
        self.transition_in_progress = false;
        self.sync_mirrored(registry);
    }

    /// Advance deadlines: finish transitions and expire overrides.
    pub fn update(&mut self, now: Timestamp) {
        if self.transition_in_progress && now >= self.transition_ends_at {
            self.transition_in_progress = false;
            log::debug!("world transition settled in {:?}", self.mode);
        }

        if let Some(over) = self.gravity_override {
            if now >= over.expires_at {
                self.set_gravity(over.previous);
                self.gravity_override = None;
                self.last_gravity_flip_time = Some(now);
                log::info!("gravity restored to {:?}", over.previous);
            }
        }
    }

    /// Apply the first gravity zone containing `position`.
    ///
    /// Returns whether an override started.
    pub fn apply_zones(&mut self, position: Vec3, zones: &[GravityZone], now: Timestamp) -> bool {
        if self.gravity_override.is_some() || self.transition_in_progress {
            return false;
        }
        if remaining(self.last_gravity_flip_time, self.config.gravity_flip_cooldown, now).is_some() {
            return false;
        }

        let Some(zone) = zones
            .iter()
            .find(|z| z.is_usable() && z.contains(position) && z.gravity != self.gravity)
        else {
            return false;
        };

        let previous = self.gravity;
        self.set_gravity(zone.gravity);
        self.gravity_override = Some(GravityOverride {
            gravity: zone.gravity,
            previous,
            expires_at: now + f64::from(zone.duration),
        });
        self.last_gravity_flip_time = Some(now);

        log::info!("gravity zone at {:?} set gravity {:?} for {}s", zone.center, zone.gravity, zone.duration);
        true
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
        self.gravity_direction = gravity.normalize_or_zero();
    }

    fn world_gravity(&self, mode: GravityMode) -> Vec3 {
        match mode {
            GravityMode::Normal => self.config.normal_gravity,
            GravityMode::Inverted => self.config.inverted_gravity,
        }
    }

    /// Ground under `carried` in the active world, or `carried` itself.
    fn find_destination(&self, carried: Vec3, registry: &SurfaceRegistry, radius: f32) -> Vec3 {
        let up = self.up();
        let inverted = self.mode == GravityMode::Inverted;

        registry
            .intersect_ray(
                carried,
                self.gravity_direction,
                self.config.transition_search_radius,
                SurfaceFlags::MASK_GROUND,
            )
            .into_iter()
            .find(|hit| {
                hit.normal.dot(up) > 0.5
                    && registry
                        .get(hit.surface)
                        .is_some_and(|s| s.is_mirrored() == inverted)
            })
            .map_or(carried, |hit| hit.point + up * radius)
    }
}

/// Time left on a cooldown, if it is still running.
fn remaining(since: Option<Timestamp>, cooldown: f32, now: Timestamp) -> Option<f64> {
    let elapsed = now - since?;
    let cooldown = f64::from(cooldown);
    (elapsed < cooldown).then(|| cooldown - elapsed)
}

// ============================================================================
// Tests
// ============================================================================
