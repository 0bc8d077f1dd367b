//! MTC protocol implementation module
//!
//! This module defines the MTC messages, the byte-stream codec that extracts
//! them from raw MIDI, and the decoder that turns them into timecode.

pub mod codec;
pub mod decoder;
pub mod message;

pub use self::codec::MtcCodec;
pub use self::decoder::{DecodeOutcome, MtcDecoder, TimecodeEvent};
pub use self::message::{FullFrame, MtcMessage, QuarterFrame};

// Constants
/// MIDI quarter-frame status byte
pub const QUARTER_FRAME_STATUS: u8 = 0xF1;

/// SysEx start byte
pub const SYSEX_START: u8 = 0xF0;

/// SysEx end byte
pub const SYSEX_END: u8 = 0xF7;

/// Universal real-time SysEx id
pub const SYSEX_REALTIME: u8 = 0x7F;

/// MTC sub-id #1
pub const MTC_SUB_ID_1: u8 = 0x01;

/// Full-frame sub-id #2
pub const MTC_SUB_ID_2: u8 = 0x01;

/// Length of a full-frame message in bytes
pub const FULL_FRAME_LEN: usize = 10;

/// SysEx bytes buffered while waiting for a terminator before giving up on it
pub const MAX_SYSEX_SCAN: usize = 32;
