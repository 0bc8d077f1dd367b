use std::fmt;
use std::time::Duration;

use serde::{Serialize, Deserialize};

use crate::sync::SyncPolicy;
use crate::time::FrameRate;
use super::{Error, Result};

/// Direction of quarter-frame transmission, derived from consecutive piece indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Pieces arriving in ascending order (playback)
    Forwards,
    /// Pieces arriving in descending order (reverse playback or scrub)
    Backwards,
    /// Not enough information, or a jump between non-adjacent pieces
    Ambiguous,
}

impl Direction {
    /// Derives the direction from the previously received piece and the new one.
    ///
    /// `None` for the previous piece means nothing has been received since the
    /// last reset, which is always ambiguous.
    pub fn from_pieces(previous: Option<u8>, new: u8) -> Self {
        let Some(previous) = previous else {
            return Direction::Ambiguous;
        };
        let (previous, new) = (previous & 0b111, new & 0b111);

        if (previous + 1) % 8 == new {
            Direction::Forwards
        } else if (previous + 7) % 8 == new {
            Direction::Backwards
        } else {
            Direction::Ambiguous
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forwards => write!(f, "forwards"),
            Direction::Backwards => write!(f, "backwards"),
            Direction::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// Which decode path produced a timecode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Complete timecode carried in one SysEx message
    FullFrame,
    /// Timecode assembled from the running quarter-frame stream
    QuarterFrame,
}

/// Configuration for an MTC receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Receiver name, used in log output
    pub name: String,
    /// Frame rate incoming timecode is scaled to, if any
    pub local_frame_rate: Option<FrameRate>,
    /// Lock and drop-out tolerances
    pub sync_policy: SyncPolicy,
    /// Silence after which the quarter-frame buffer is flushed
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub quarter_frame_timeout: Duration,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            name: "default".to_string(),
            local_frame_rate: None,
            sync_policy: SyncPolicy::default(),
            quarter_frame_timeout: Duration::from_millis(super::DEFAULT_QUARTER_FRAME_TIMEOUT_MS),
        }
    }
}

impl ReceiverConfig {
    /// Checks the configuration for values the receiver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.quarter_frame_timeout.is_zero() {
            return Err(Error::config("quarter_frame_timeout must be greater than zero"));
        }
        Ok(())
    }
}
