use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::Error;
use super::FrameRate;

/// Frame rate encoded in the MTC stream itself
///
/// Carried as two bits in quarter-frame piece 7 and in the hour byte of a
/// full-frame message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MtcFrameRate {
    Mtc24,
    Mtc25,
    Mtc2997d,
    Mtc30,
}

impl MtcFrameRate {
    /// Decodes the two rate bits (`rr` in `0rrhhhhh`); higher bits are ignored
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => MtcFrameRate::Mtc24,
            0b01 => MtcFrameRate::Mtc25,
            0b10 => MtcFrameRate::Mtc2997d,
            _ => MtcFrameRate::Mtc30,
        }
    }

    /// Two-bit wire code
    pub fn bits(&self) -> u8 {
        match self {
            MtcFrameRate::Mtc24 => 0b00,
            MtcFrameRate::Mtc25 => 0b01,
            MtcFrameRate::Mtc2997d => 0b10,
            MtcFrameRate::Mtc30 => 0b11,
        }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, MtcFrameRate::Mtc2997d)
    }

    /// Nominal frames per second of the raw frame numbers
    pub fn fps_for_scaling(&self) -> u32 {
        match self {
            MtcFrameRate::Mtc24 => 24,
            MtcFrameRate::Mtc25 => 25,
            MtcFrameRate::Mtc2997d | MtcFrameRate::Mtc30 => 30,
        }
    }

    /// The real rate whose frame numbers match the raw MTC frame numbers one to one
    pub fn direct_equivalent_frame_rate(&self) -> FrameRate {
        match self {
            MtcFrameRate::Mtc24 => FrameRate::Fps24,
            MtcFrameRate::Mtc25 => FrameRate::Fps25,
            MtcFrameRate::Mtc2997d => FrameRate::Fps29_97d,
            MtcFrameRate::Mtc30 => FrameRate::Fps30,
        }
    }

    /// All real rates carried over the wire as this MTC rate
    pub fn derived_frame_rates(&self) -> Vec<FrameRate> {
        FrameRate::ALL
            .iter()
            .copied()
            .filter(|rate| rate.mtc_frame_rate() == *self)
            .collect()
    }

    /// Whether `rate` is carried over the wire as this MTC rate
    pub fn is_derived(&self, rate: FrameRate) -> bool {
        rate.mtc_frame_rate() == *self
    }
}

impl fmt::Display for MtcFrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MtcFrameRate::Mtc24 => write!(f, "SMPTE-24"),
            MtcFrameRate::Mtc25 => write!(f, "SMPTE-25"),
            MtcFrameRate::Mtc2997d => write!(f, "SMPTE-29.97d"),
            MtcFrameRate::Mtc30 => write!(f, "SMPTE-30"),
        }
    }
}

impl FromStr for MtcFrameRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rate = trimmed.strip_prefix("SMPTE-").unwrap_or(trimmed);
        match rate {
            "24" => Ok(MtcFrameRate::Mtc24),
            "25" => Ok(MtcFrameRate::Mtc25),
            "29.97d" => Ok(MtcFrameRate::Mtc2997d),
            "30" => Ok(MtcFrameRate::Mtc30),
            _ => Err(Error::config(format!("Unknown MTC frame rate: {}", s))),
        }
    }
}
