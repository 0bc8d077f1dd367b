use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::core::{DEFAULT_DROP_OUT_FRAMES, DEFAULT_LOCK_FRAMES, MAX_POLICY_FRAMES};
use crate::time::FrameRate;

/// Lock and drop-out tolerances of a receiver, in frames
///
/// Both counts are clamped to 0..=100 on construction, including when
/// deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PolicyFields")]
pub struct SyncPolicy {
    lock_frames: u32,
    drop_out_frames: u32,
}

#[derive(Deserialize)]
struct PolicyFields {
    #[serde(default = "default_lock_frames")]
    lock_frames: i64,
    #[serde(default = "default_drop_out_frames")]
    drop_out_frames: i64,
}

fn default_lock_frames() -> i64 {
    DEFAULT_LOCK_FRAMES as i64
}

fn default_drop_out_frames() -> i64 {
    DEFAULT_DROP_OUT_FRAMES as i64
}

impl From<PolicyFields> for SyncPolicy {
    fn from(fields: PolicyFields) -> Self {
        SyncPolicy::new(clamp_frames(fields.lock_frames), clamp_frames(fields.drop_out_frames))
    }
}

fn clamp_frames(frames: i64) -> i32 {
    frames.clamp(0, MAX_POLICY_FRAMES as i64) as i32
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy::new(DEFAULT_LOCK_FRAMES, DEFAULT_DROP_OUT_FRAMES)
    }
}

impl SyncPolicy {
    /// Creates a policy, clamping both counts to 0..=100
    pub fn new(lock_frames: i32, drop_out_frames: i32) -> Self {
        SyncPolicy {
            lock_frames: lock_frames.clamp(0, MAX_POLICY_FRAMES) as u32,
            drop_out_frames: drop_out_frames.clamp(0, MAX_POLICY_FRAMES) as u32,
        }
    }

    /// Frames of continuous timecode required before lock
    pub fn lock_frames(&self) -> u32 {
        self.lock_frames
    }

    /// Frames without timecode tolerated before dropping out
    pub fn drop_out_frames(&self) -> u32 {
        self.drop_out_frames
    }

    /// Wall-clock duration of the lock preroll at `rate`
    pub fn lock_duration(&self, rate: FrameRate) -> Duration {
        frames_to_duration(self.lock_frames, rate)
    }

    /// Wall-clock duration of the drop-out tolerance at `rate`
    pub fn drop_out_duration(&self, rate: FrameRate) -> Duration {
        frames_to_duration(self.drop_out_frames, rate)
    }
}

fn frames_to_duration(frames: u32, rate: FrameRate) -> Duration {
    Duration::from_secs_f64(frames as f64 / rate.fps())
}
