//! Core types for MTC decoding and synchronization
//!
//! This module contains the error type, the shared value types used by both
//! the decoder and the receiver, and the receiver configuration.

pub mod error;
pub mod types;
pub mod serde;

pub use self::error::{Error, Result};
pub use self::types::{
    Direction,
    MessageKind,
    ReceiverConfig,
};

/// Default lock preroll in frames
pub const DEFAULT_LOCK_FRAMES: i32 = 16;

/// Default drop-out tolerance in frames
pub const DEFAULT_DROP_OUT_FRAMES: i32 = 10;

/// Upper bound for both sync policy frame counts
pub const MAX_POLICY_FRAMES: i32 = 100;

/// Quarter-frame silence (ms) after which the assembly buffer is flushed
pub const DEFAULT_QUARTER_FRAME_TIMEOUT_MS: u64 = 50;

/// Messages a receiver queues before `consume` reports it as busy
pub const COMMAND_QUEUE_LEN: usize = 256;
