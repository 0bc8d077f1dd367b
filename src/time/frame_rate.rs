use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::core::Error;
use super::MtcFrameRate;

/// Real transport frame rate
///
/// These are the rates a local system can run at. Each maps onto exactly one
/// of the four rates MTC can carry, see [`FrameRate::mtc_frame_rate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FrameRate {
    Fps23_976,
    Fps24,
    Fps24_98,
    Fps25,
    Fps29_97,
    Fps29_97d,
    Fps30,
    Fps30d,
    Fps47_952,
    Fps48,
    Fps50,
    Fps59_94,
    Fps59_94d,
    Fps60,
    Fps60d,
    Fps95_904,
    Fps96,
    Fps100,
    Fps119_88,
    Fps119_88d,
    Fps120,
    Fps120d,
}

/// Families of rates that share the same timecode to wall-clock relation
///
/// Timecode can be rescaled between rates of one group without drifting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompatibleGroup {
    Ntsc,
    NtscDrop,
    Whole,
    WholeDrop,
}

impl FrameRate {
    /// Every supported rate, slowest first
    pub const ALL: [FrameRate; 22] = [
        FrameRate::Fps23_976,
        FrameRate::Fps24,
        FrameRate::Fps24_98,
        FrameRate::Fps25,
        FrameRate::Fps29_97,
        FrameRate::Fps29_97d,
        FrameRate::Fps30,
        FrameRate::Fps30d,
        FrameRate::Fps47_952,
        FrameRate::Fps48,
        FrameRate::Fps50,
        FrameRate::Fps59_94,
        FrameRate::Fps59_94d,
        FrameRate::Fps60,
        FrameRate::Fps60d,
        FrameRate::Fps95_904,
        FrameRate::Fps96,
        FrameRate::Fps100,
        FrameRate::Fps119_88,
        FrameRate::Fps119_88d,
        FrameRate::Fps120,
        FrameRate::Fps120d,
    ];

    /// Short string form, e.g. `"29.97d"`
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameRate::Fps23_976 => "23.976",
            FrameRate::Fps24 => "24",
            FrameRate::Fps24_98 => "24.98",
            FrameRate::Fps25 => "25",
            FrameRate::Fps29_97 => "29.97",
            FrameRate::Fps29_97d => "29.97d",
            FrameRate::Fps30 => "30",
            FrameRate::Fps30d => "30d",
            FrameRate::Fps47_952 => "47.952",
            FrameRate::Fps48 => "48",
            FrameRate::Fps50 => "50",
            FrameRate::Fps59_94 => "59.94",
            FrameRate::Fps59_94d => "59.94d",
            FrameRate::Fps60 => "60",
            FrameRate::Fps60d => "60d",
            FrameRate::Fps95_904 => "95.904",
            FrameRate::Fps96 => "96",
            FrameRate::Fps100 => "100",
            FrameRate::Fps119_88 => "119.88",
            FrameRate::Fps119_88d => "119.88d",
            FrameRate::Fps120 => "120",
            FrameRate::Fps120d => "120d",
        }
    }

    /// Number of frame labels per second (the timecode "base")
    pub fn nominal_fps(&self) -> u32 {
        match self {
            FrameRate::Fps23_976 | FrameRate::Fps24 => 24,
            FrameRate::Fps24_98 | FrameRate::Fps25 => 25,
            FrameRate::Fps29_97
            | FrameRate::Fps29_97d
            | FrameRate::Fps30
            | FrameRate::Fps30d => 30,
            FrameRate::Fps47_952 | FrameRate::Fps48 => 48,
            FrameRate::Fps50 => 50,
            FrameRate::Fps59_94
            | FrameRate::Fps59_94d
            | FrameRate::Fps60
            | FrameRate::Fps60d => 60,
            FrameRate::Fps95_904 | FrameRate::Fps96 => 96,
            FrameRate::Fps100 => 100,
            FrameRate::Fps119_88
            | FrameRate::Fps119_88d
            | FrameRate::Fps120
            | FrameRate::Fps120d => 120,
        }
    }

    /// Actual frames per second of wall-clock time
    pub fn fps(&self) -> f64 {
        let nominal = self.nominal_fps() as f64;
        match self.compatible_group() {
            CompatibleGroup::Ntsc | CompatibleGroup::NtscDrop => nominal * 1000.0 / 1001.0,
            CompatibleGroup::Whole | CompatibleGroup::WholeDrop => nominal,
        }
    }

    /// Highest valid frame number within one second
    pub fn max_frame_number(&self) -> u16 {
        (self.nominal_fps() - 1) as u16
    }

    /// Whether this is a drop-frame counting rate
    pub fn is_drop(&self) -> bool {
        self.drop_frames_per_minute() > 0
    }

    /// Frame labels skipped at the start of each minute not divisible by ten
    pub fn drop_frames_per_minute(&self) -> u32 {
        match self {
            FrameRate::Fps29_97d | FrameRate::Fps30d => 2,
            FrameRate::Fps59_94d | FrameRate::Fps60d => 4,
            FrameRate::Fps119_88d | FrameRate::Fps120d => 8,
            _ => 0,
        }
    }

    /// The MTC rate used to carry this rate over the wire
    pub fn mtc_frame_rate(&self) -> MtcFrameRate {
        match self {
            FrameRate::Fps23_976
            | FrameRate::Fps24
            | FrameRate::Fps24_98
            | FrameRate::Fps47_952
            | FrameRate::Fps48
            | FrameRate::Fps95_904
            | FrameRate::Fps96 => MtcFrameRate::Mtc24,

            FrameRate::Fps25 | FrameRate::Fps50 | FrameRate::Fps100 => MtcFrameRate::Mtc25,

            FrameRate::Fps29_97
            | FrameRate::Fps30
            | FrameRate::Fps59_94
            | FrameRate::Fps60
            | FrameRate::Fps119_88
            | FrameRate::Fps120 => MtcFrameRate::Mtc30,

            FrameRate::Fps29_97d
            | FrameRate::Fps30d
            | FrameRate::Fps59_94d
            | FrameRate::Fps60d
            | FrameRate::Fps119_88d
            | FrameRate::Fps120d => MtcFrameRate::Mtc2997d,
        }
    }

    pub fn compatible_group(&self) -> CompatibleGroup {
        match self {
            FrameRate::Fps23_976
            | FrameRate::Fps24_98
            | FrameRate::Fps29_97
            | FrameRate::Fps47_952
            | FrameRate::Fps59_94
            | FrameRate::Fps95_904
            | FrameRate::Fps119_88 => CompatibleGroup::Ntsc,

            FrameRate::Fps29_97d | FrameRate::Fps59_94d | FrameRate::Fps119_88d => {
                CompatibleGroup::NtscDrop
            }

            FrameRate::Fps24
            | FrameRate::Fps25
            | FrameRate::Fps30
            | FrameRate::Fps48
            | FrameRate::Fps50
            | FrameRate::Fps60
            | FrameRate::Fps96
            | FrameRate::Fps100
            | FrameRate::Fps120 => CompatibleGroup::Whole,

            FrameRate::Fps30d | FrameRate::Fps60d | FrameRate::Fps120d => CompatibleGroup::WholeDrop,
        }
    }

    /// Whether timecode at `other` can be related to timecode at this rate
    pub fn is_compatible_with(&self, other: FrameRate) -> bool {
        self.compatible_group() == other.compatible_group()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FrameRate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_suffix("fps").unwrap_or(trimmed).trim_end();
        FrameRate::ALL
            .iter()
            .copied()
            .find(|rate| rate.as_str() == trimmed)
            .ok_or_else(|| Error::config(format!("Unknown frame rate: {}", s)))
    }
}

impl TryFrom<String> for FrameRate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        rate.as_str().to_string()
    }
}
