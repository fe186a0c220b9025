//! Body snapshots for renderers and remote peers.
//!
//! A snapshot is the minimum a consumer needs to draw the ball. Snapshots
//! go out at a throttled rate plus once on every grounded-flag change.

use flipball_physics::{GravityMode, KinematicBody};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Ball state at the end of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub frame: u64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub is_grounded: bool,
    pub mode: GravityMode,
}

impl BodySnapshot {
    pub fn capture(frame: u64, body: &KinematicBody, mode: GravityMode) -> Self {
        Self {
            frame,
            position: body.position,
            velocity: body.velocity,
            is_grounded: body.is_grounded(),
            mode,
        }
    }
}

/// Encode a snapshot to bytes.
pub fn encode_snapshot(snapshot: &BodySnapshot) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serde::encode_to_vec(snapshot, bincode::config::standard())?)
}

/// Decode a snapshot from bytes.
pub fn decode_snapshot(data: &[u8]) -> Result<BodySnapshot, CodecError> {
    let (snapshot, _) = bincode::serde::decode_from_slice(data, bincode::config::standard())?;
    Ok(snapshot)
}

/// Decides which frames publish a snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotThrottle {
    interval_frames: u64,
    last_emitted: Option<u64>,
    last_grounded: Option<bool>,
}

impl SnapshotThrottle {
    /// An interval of 0 is treated as 1 (every frame).
    pub fn new(interval_frames: u64) -> Self {
        Self {
            interval_frames: interval_frames.max(1),
            last_emitted: None,
            last_grounded: None,
        }
    }

    /// Whether `frame` should publish, recording it if so.
    pub fn should_emit(&mut self, frame: u64, is_grounded: bool) -> bool {
        let grounded_changed = self.last_grounded != Some(is_grounded);
        let due = self
            .last_emitted
            .map_or(true, |last| frame.saturating_sub(last) >= self.interval_frames);

        self.last_grounded = Some(is_grounded);
        if due || grounded_changed {
            self.last_emitted = Some(frame);
            true
        } else {
            false
        }
    }

    /// Forget history so the next frame always publishes.
    pub fn reset(&mut self) {
        self.last_emitted = None;
        self.last_grounded = None;
    }
}
