//! MTC Sync: MIDI Timecode decoding and synchronization
//!
//! This library decodes MIDI Timecode (quarter-frame and full-frame messages)
//! into timecode at a chosen local frame rate, and tracks whether an incoming
//! stream is stable enough to lock to.
//!
//! ```no_run
//! use mtc_sync::{Receiver, ReceiverConfig, FrameRate};
//!
//! # async fn run() -> mtc_sync::Result<()> {
//! let receiver = Receiver::new(
//!     ReceiverConfig {
//!         local_frame_rate: Some(FrameRate::Fps48),
//!         ..Default::default()
//!     },
//!     None,
//! )?;
//! receiver.consume_bytes(&[0xF1, 0x06])?;
//! # Ok(())
//! # }
//! ```
pub mod core;
pub mod protocol;
pub mod sync;
pub mod time;
mod util;

// Re-export commonly used items
pub use core::{Direction, Error, MessageKind, ReceiverConfig, Result};
pub use protocol::{MtcCodec, MtcDecoder, MtcMessage, TimecodeEvent};
pub use sync::{Receiver, ReceiverDelegate, ReceiverState, SyncPolicy};
pub use time::{Components, FrameRate, MtcFrameRate, Timecode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
