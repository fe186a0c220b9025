//! Jump timing.
//!
//! Handles jump buffering and coyote time. A press is latched into a short
//! buffer and fires as soon as the ball is properly grounded; if the buffer
//! runs out first the press is dropped. Jumping is grounded-only unless
//! [`MovementConfig::allow_coyote_jump`] is set.

use serde::{Deserialize, Serialize};

use super::config::MovementConfig;

/// Whether the ball is mid-jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JumpPhase {
    /// On the ground, or in the air without having jumped.
    #[default]
    Ready,
    /// Launched by a jump and not yet landed.
    Jumping,
}

/// What the arbiter needs to know about the body this tick.
#[derive(Debug, Clone, Copy)]
pub struct JumpContext {
    pub is_grounded: bool,
    pub can_jump: bool,
    pub ground_distance: f32,
    /// Speed along "up". Positive when rising.
    pub vertical_speed: f32,
}

/// Jump counters.
///
/// Timers count down to zero and never go below it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JumpState {
    /// Time left on a buffered press (seconds).
    buffer_timer: f32,

    /// Time left in the post-ground grace window (seconds).
    coyote_timer: f32,

    /// Jump key held since the last press edge.
    intent_latched: bool,

    phase: JumpPhase,
}

impl JumpState {
    /// Create a new jump state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decay timers for this tick.
    ///
    /// The coyote timer is refreshed on every tick that begins grounded.
    pub fn tick_timers(&mut self, was_grounded: bool, config: &MovementConfig, delta_time: f32) {
        self.buffer_timer = (self.buffer_timer - delta_time).max(0.0);
        self.coyote_timer = if was_grounded {
            config.coyote_time
        } else {
            (self.coyote_timer - delta_time).max(0.0)
        };
    }

    /// Feed this tick's jump key.
    ///
    /// A press edge fills the buffer. Releasing the key only drops the latch;
    /// a buffered press still fires after release.
    pub fn register_input(&mut self, jump_pressed: bool, config: &MovementConfig) {
        if jump_pressed && !self.intent_latched {
            self.buffer_timer = config.jump_buffer_time;
            self.intent_latched = true;
        } else if !jump_pressed {
            self.intent_latched = false;
        }
    }

    /// Whether a jump fires this tick.
    pub fn should_fire(&self, ctx: JumpContext, config: &MovementConfig) -> bool {
        if self.buffer_timer <= 0.0 || self.phase == JumpPhase::Jumping {
            return false;
        }

        let grounded = ctx.is_grounded && ctx.can_jump && ctx.ground_distance <= config.jump_reach();
        let coyote = config.allow_coyote_jump && !ctx.is_grounded && self.coyote_timer > 0.0;

        (grounded || coyote) && ctx.vertical_speed.abs() < config.jump_vertical_speed_limit
    }

    /// Consume the buffered press and enter the jumping phase.
    pub fn fire(&mut self) {
        self.buffer_timer = 0.0;
        self.coyote_timer = 0.0;
        self.phase = JumpPhase::Jumping;
    }

    /// Return to `Ready` on touchdown. Returns whether a jump just ended.
    pub fn land(&mut self) -> bool {
        std::mem::replace(&mut self.phase, JumpPhase::Ready) == JumpPhase::Jumping
    }

    /// Forget everything, e.g. on respawn.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_jumping(&self) -> bool {
        self.phase == JumpPhase::Jumping
    }

    pub fn phase(&self) -> JumpPhase {
        self.phase
    }

    pub fn buffer_timer(&self) -> f32 {
        self.buffer_timer
    }

    pub fn coyote_timer(&self) -> f32 {
        self.coyote_timer
    }

    pub fn is_latched(&self) -> bool {
        self.intent_latched
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn grounded() -> JumpContext {
        JumpContext {
            is_grounded: true,
            can_jump: true,
            ground_distance: 0.5,
            vertical_speed: 0.0,
        }
    }

    fn airborne() -> JumpContext {
        JumpContext {
            is_grounded: false,
            can_jump: false,
            ground_distance: f32::INFINITY,
            vertical_speed: -3.0,
        }
    }

    #[test]
    fn test_press_fires_when_grounded() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();

        jump.tick_timers(true, &config, DT);
        jump.register_input(true, &config);
        assert!(jump.should_fire(grounded(), &config));

        jump.fire();
        assert!(jump.is_jumping());
        assert_eq!(jump.buffer_timer(), 0.0);
        assert_eq!(jump.coyote_timer(), 0.0);
        assert!(!jump.should_fire(grounded(), &config), "already jumping");
    }

    #[test]
    fn test_holding_does_not_rebuffer() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();

        jump.register_input(true, &config);
        for _ in 0..20 {
            jump.tick_timers(false, &config, DT);
            jump.register_input(true, &config);
        }

        assert_eq!(jump.buffer_timer(), 0.0, "held key must not refill the buffer");
        assert!(jump.is_latched());

        jump.register_input(false, &config);
        jump.register_input(true, &config);
        assert!(jump.buffer_timer() > 0.0, "new edge after release buffers again");
    }

    #[test]
    fn test_buffer_survives_release() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();

        jump.register_input(true, &config);
        jump.tick_timers(false, &config, DT);
        jump.register_input(false, &config);

        assert!(!jump.is_latched());
        assert!(jump.buffer_timer() > 0.0);
        assert!(jump.should_fire(grounded(), &config));
    }

    #[test]
    fn test_buffer_expires_while_airborne() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();

        jump.register_input(true, &config);
        for _ in 0..12 {
            assert!(!jump.should_fire(airborne(), &config));
            jump.tick_timers(false, &config, DT);
            jump.register_input(true, &config);
        }

        assert_eq!(jump.buffer_timer(), 0.0);
        assert!(!jump.should_fire(grounded(), &config), "expired press never fires");
    }

    #[test]
    fn test_fire_requires_jump_reach_and_low_vertical_speed() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();
        jump.register_input(true, &config);

        let far = JumpContext {
            ground_distance: config.jump_reach() + 0.01,
            ..grounded()
        };
        assert!(!jump.should_fire(far, &config));

        let bouncing = JumpContext {
            vertical_speed: 0.6,
            ..grounded()
        };
        assert!(!jump.should_fire(bouncing, &config));

        let no_jump = JumpContext {
            can_jump: false,
            ..grounded()
        };
        assert!(!jump.should_fire(no_jump, &config));
    }

    #[test]
    fn test_coyote_timer_tracks_but_does_not_fire_by_default() {
        let config = MovementConfig::default();
        let mut jump = JumpState::new();

        jump.tick_timers(true, &config, DT);
        assert_eq!(jump.coyote_timer(), config.coyote_time);

        jump.tick_timers(false, &config, DT);
        jump.register_input(true, &config);
        let just_left = JumpContext {
            vertical_speed: -0.2,
            ..airborne()
        };
        assert!(jump.coyote_timer() > 0.0);
        assert!(!jump.should_fire(just_left, &config));

        let coyote_config = MovementConfig {
            allow_coyote_jump: true,
            ..MovementConfig::default()
        };
        assert!(jump.should_fire(just_left, &coyote_config));

        for _ in 0..20 {
            jump.tick_timers(false, &config, DT);
        }
        assert_eq!(jump.coyote_timer(), 0.0);
    }

    #[test]
    fn test_land_clears_jumping() {
        let mut jump = JumpState::new();
        assert!(!jump.land());

        jump.fire();
        assert!(jump.land());
        assert_eq!(jump.phase(), JumpPhase::Ready);
    }
}
