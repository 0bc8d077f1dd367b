use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;

use crate::core::Error;
use super::message::{MtcMessage, QuarterFrame};
use super::{FULL_FRAME_LEN, MAX_SYSEX_SCAN, QUARTER_FRAME_STATUS, SYSEX_END, SYSEX_START};

/// Extracts MTC messages from a raw MIDI byte stream
///
/// Everything that is not a quarter-frame or an MTC full-frame SysEx is
/// skipped. System real-time bytes interleaved inside a SysEx are dropped.
#[derive(Debug, Clone, Default)]
pub struct MtcCodec;

impl MtcCodec {
    /// Creates a new MTC codec
    pub fn new() -> Self {
        MtcCodec
    }
}

fn is_realtime(byte: u8) -> bool {
    byte >= 0xF8
}

impl Decoder for MtcCodec {
    type Item = MtcMessage;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let start = src
                .iter()
                .position(|b| *b == QUARTER_FRAME_STATUS || *b == SYSEX_START);

            let Some(start) = start else {
                if !src.is_empty() {
                    tracing::trace!("Skipping {} non-MTC bytes", src.len());
                    src.clear();
                }
                return Ok(None);
            };

            if start > 0 {
                tracing::trace!("Skipping {} non-MTC bytes", start);
                src.advance(start);
            }

            if src[0] == QUARTER_FRAME_STATUS {
                if src.len() < 2 {
                    // Need the data byte
                    return Ok(None);
                }

                let data = src[1];
                if data > 0x7F {
                    tracing::warn!("Quarter-frame status followed by {:#04x}, dropping", data);
                    src.advance(1);
                    continue;
                }

                src.advance(2);
                return Ok(Some(MtcMessage::QuarterFrame(QuarterFrame::from_data_byte(data))));
            }

            // SysEx: runs until F7 or until another non-real-time status byte
            let end = src[1..]
                .iter()
                .position(|b| *b > 0x7F && !is_realtime(*b))
                .map(|i| i + 1);

            match end {
                None => {
                    if src.len() > MAX_SYSEX_SCAN {
                        tracing::trace!("Skipping long SysEx");
                        src.advance(1);
                        continue;
                    }
                    // Need more data to finish the SysEx
                    return Ok(None);
                }
                Some(end) if src[end] == SYSEX_END => {
                    let sysex = src.split_to(end + 1);
                    let message: Vec<u8> = sysex.iter().copied().filter(|b| !is_realtime(*b)).collect();

                    if message.len() == FULL_FRAME_LEN {
                        if let Ok(message) = MtcMessage::from_midi_bytes(&message) {
                            return Ok(Some(message));
                        }
                    }
                    tracing::trace!("Skipping non-MTC SysEx of {} bytes", message.len());
                }
                Some(end) => {
                    tracing::warn!("SysEx interrupted by status byte {:#04x}", src[end]);
                    src.advance(end);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(message) => Ok(Some(message)),
            None => {
                if !buf.is_empty() {
                    tracing::warn!("Discarding {} trailing bytes at end of stream", buf.len());
                    buf.clear();
                }
                Ok(None)
            }
        }
    }
}
