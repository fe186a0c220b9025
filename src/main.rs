//! Flipball - headless run of the test course.
//!
//! Drives the simulation through a fixed script and logs every physics
//! event. Set `RUST_LOG=info` (or `debug`) to see them.

use std::f32::consts::FRAC_PI_2;

use flipball_game::input::MovementKeys;
use flipball_game::{PlayerInput, PhysicsEvent, Simulation};

/// One leg of the script.
struct Phase {
    name: &'static str,
    frames: u64,
    input: PlayerInput,
    /// Ask for a world flip on the first frame of the phase.
    flip: bool,
}

impl Phase {
    fn new(name: &'static str, frames: u64, input: PlayerInput) -> Self {
        Self {
            name,
            frames,
            input,
            flip: false,
        }
    }

    fn with_flip(mut self) -> Self {
        self.flip = true;
        self
    }
}

fn roll(camera_yaw: f32, jump: bool) -> PlayerInput {
    PlayerInput {
        movement: MovementKeys {
            forward: true,
            ..Default::default()
        },
        jump,
        camera_yaw,
    }
}

fn script() -> Vec<Phase> {
    let idle = PlayerInput::default();
    vec![
        Phase::new("settle", 30, idle),
        Phase::new("roll toward the ramp", 90, roll(-FRAC_PI_2, false)),
        Phase::new("jump", 45, roll(-FRAC_PI_2, true)),
        Phase::new("roll back", 120, roll(FRAC_PI_2, false)),
        Phase::new("roll off the edge", 300, roll(FRAC_PI_2, false)),
        Phase::new("idle in the other world", 180, idle),
        Phase::new("flip back", 120, idle).with_flip(),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut simulation = Simulation::test_course()?;
    let mut snapshots = 0usize;

    for phase in script() {
        log::info!("phase: {} ({} frames)", phase.name, phase.frames);
        if phase.flip && !simulation.request_transition() {
            log::info!("world flip refused");
        }

        for _ in 0..phase.frames {
            let output = simulation.tick(&phase.input);
            snapshots += usize::from(output.snapshot.is_some());

            for event in &output.events {
                match event {
                    PhysicsEvent::FallWarning { height } => {
                        log::warn!("frame {}: falling at height {:.1}", simulation.frame, height)
                    }
                    other => log::info!("frame {}: {:?}", simulation.frame, other),
                }
            }
        }
    }

    let last = simulation.snapshot();
    log::info!(
        "finished after {} frames ({} snapshots): ball at {:?} in {:?}, grounded: {}",
        simulation.frame,
        snapshots,
        last.position,
        last.mode,
        last.is_grounded
    );
    Ok(())
}
