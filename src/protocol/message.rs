use serde::{Serialize, Deserialize};

use crate::core::{Error, MessageKind, Result};
use crate::time::MtcFrameRate;
use super::{
    FULL_FRAME_LEN, MTC_SUB_ID_1, MTC_SUB_ID_2, QUARTER_FRAME_STATUS, SYSEX_END, SYSEX_REALTIME,
    SYSEX_START,
};

/// A single quarter-frame data byte (`0nnn dddd`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuarterFrame(u8);

impl QuarterFrame {
    /// Wraps a raw data byte; the status bit is masked off
    pub fn from_data_byte(data: u8) -> Self {
        QuarterFrame(data & 0x7F)
    }

    /// Builds a quarter-frame from its piece index and nibble
    pub fn new(piece: u8, nibble: u8) -> Self {
        QuarterFrame(((piece & 0b111) << 4) | (nibble & 0x0F))
    }

    /// Piece index (0-7)
    pub fn piece(&self) -> u8 {
        (self.0 >> 4) & 0b111
    }

    /// The four data bits
    pub fn nibble(&self) -> u8 {
        self.0 & 0x0F
    }

    pub fn data_byte(&self) -> u8 {
        self.0
    }
}

/// A complete timecode from a full-frame SysEx message
///
/// Fields are raw wire values; the decoder validates them against the rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullFrame {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u8,
    pub rate: MtcFrameRate,
}

impl FullFrame {
    /// Decodes the `0rrhhhhh` hour byte along with the remaining fields
    pub fn from_fields(hour_byte: u8, minutes: u8, seconds: u8, frames: u8) -> Self {
        FullFrame {
            hours: hour_byte & 0b0001_1111,
            minutes,
            seconds,
            frames,
            rate: MtcFrameRate::from_bits((hour_byte & 0b0110_0000) >> 5),
        }
    }

    /// The `0rrhhhhh` hour byte as sent on the wire
    pub fn hour_byte(&self) -> u8 {
        (self.rate.bits() << 5) | (self.hours & 0b0001_1111)
    }
}

/// An MTC message as delivered by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MtcMessage {
    /// Full-frame locate message
    FullFrame(FullFrame),
    /// One piece of the running quarter-frame stream
    QuarterFrame(QuarterFrame),
}

impl MtcMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            MtcMessage::FullFrame(_) => MessageKind::FullFrame,
            MtcMessage::QuarterFrame(_) => MessageKind::QuarterFrame,
        }
    }

    /// Parses one complete MIDI message.
    ///
    /// Accepts `F1 dd` quarter-frames and `F0 7F <device> 01 01 hh mm ss ff F7`
    /// full-frames addressed to any device.
    pub fn from_midi_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [QUARTER_FRAME_STATUS, data] => {
                if *data > 0x7F {
                    return Err(Error::message(format!(
                        "Quarter-frame data byte has status bit set: {:#04x}",
                        data
                    )));
                }
                Ok(MtcMessage::QuarterFrame(QuarterFrame::from_data_byte(*data)))
            }
            [SYSEX_START, ..] => parse_full_frame(bytes),
            [] => Err(Error::message("Empty message")),
            [status, ..] => Err(Error::message(format!(
                "Not an MTC message (status {:#04x}, {} bytes)",
                status,
                bytes.len()
            ))),
        }
    }
}

impl From<QuarterFrame> for MtcMessage {
    fn from(quarter_frame: QuarterFrame) -> Self {
        MtcMessage::QuarterFrame(quarter_frame)
    }
}

impl From<FullFrame> for MtcMessage {
    fn from(full_frame: FullFrame) -> Self {
        MtcMessage::FullFrame(full_frame)
    }
}

fn parse_full_frame(bytes: &[u8]) -> Result<MtcMessage> {
    if bytes.len() != FULL_FRAME_LEN {
        return Err(Error::message(format!(
            "Full-frame message must be {} bytes, got {}",
            FULL_FRAME_LEN,
            bytes.len()
        )));
    }

    if bytes[1] != SYSEX_REALTIME
        || bytes[3] != MTC_SUB_ID_1
        || bytes[4] != MTC_SUB_ID_2
        || bytes[9] != SYSEX_END
    {
        return Err(Error::message("SysEx is not an MTC full-frame message"));
    }

    if bytes[1..9].iter().any(|b| *b > 0x7F) {
        return Err(Error::message("Full-frame message contains a status byte"));
    }

    Ok(MtcMessage::FullFrame(FullFrame::from_fields(
        bytes[5], bytes[6], bytes[7], bytes[8],
    )))
}
