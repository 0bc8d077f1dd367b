//! Frame rates, timecode values and MTC frame scaling
//!
//! This module provides the rate model shared by the decoder and receiver:
//!
//! - [`FrameRate`]: the real transport rates a local system can run at
//! - [`MtcFrameRate`]: the four rates the MTC protocol can carry
//! - [`Timecode`]: an HH:MM:SS:FF value at a real rate, drop-frame aware
//!
//! Rates faster than 30 fps are carried as their base MTC rate and scaled on
//! receipt (see [`MtcFrameRate::scaled_frames`]).
//!
//! # Examples
//!
//! ```
//! use mtc_sync::time::{FrameRate, MtcFrameRate, Timecode};
//!
//! assert_eq!(FrameRate::Fps48.mtc_frame_rate(), MtcFrameRate::Mtc24);
//! assert_eq!(MtcFrameRate::Mtc24.scaled_frames(12, 2, FrameRate::Fps48), Some(25.0));
//!
//! let tc = Timecode::from_hmsf(2, 3, 4, 8, FrameRate::Fps24);
//! assert_eq!(tc.advanced(16).to_string(), "02:03:05:00");
//! ```

mod frame_rate;
mod mtc_rate;
mod scaling;
mod timecode;

pub use self::frame_rate::{CompatibleGroup, FrameRate};
pub use self::mtc_rate::MtcFrameRate;
pub use self::timecode::{Components, Timecode};
