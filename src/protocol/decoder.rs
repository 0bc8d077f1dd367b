//! Quarter-frame assembly and full-frame decoding
//!
//! The decoder is a synchronous state machine with no notion of time. Feed it
//! messages in arrival order; each call reports the resulting timecode (once
//! enough of the stream has been seen) and any change of the MTC rate.

use serde::{Serialize, Deserialize};

use crate::core::{Direction, MessageKind};
use crate::time::{Components, FrameRate, MtcFrameRate, Timecode};
use super::message::{FullFrame, MtcMessage, QuarterFrame};

/// Frames between the coded instant of a group and its assembly
const ASSEMBLY_OFFSET_FRAMES: i64 = 2;

/// Quarter-frames in one complete group
const GROUP_LEN: i32 = 8;

/// A decoded timecode, as reported for every message once synced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimecodeEvent {
    pub timecode: Timecode,
    pub kind: MessageKind,
    pub direction: Direction,
    /// False when the value is the same as the previously reported one
    pub display_needs_update: bool,
}

/// Result of consuming one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOutcome {
    /// Set when the message produced a timecode
    pub event: Option<TimecodeEvent>,
    /// Set when the message changed the MTC rate
    pub mtc_frame_rate_changed: Option<MtcFrameRate>,
}

/// The eight quarter-frame nibbles and their bookkeeping
#[derive(Debug, Clone, Default)]
struct QuarterFrameBuffer {
    nibbles: [u8; 8],
    received: [bool; 8],
    complete: bool,
    last_piece: Option<u8>,
    /// Piece 0 seen since the buffer became complete
    synced: bool,
}

impl QuarterFrameBuffer {
    fn store(&mut self, piece: u8, nibble: u8) {
        let mask = match piece {
            1 | 7 => 0b0001,
            3 | 5 => 0b0011,
            _ => 0b1111,
        };
        self.nibbles[piece as usize] = nibble & mask;
        self.received[piece as usize] = true;
        if !self.complete {
            self.complete = self.received.iter().all(|r| *r);
        }
    }

    fn flush(&mut self) {
        self.received = [false; 8];
        self.complete = false;
        self.synced = false;
        self.last_piece = Some(0);
    }

    /// Combines the lsb/msb nibble pair of the field a piece belongs to
    fn field(&self, piece: u8) -> u8 {
        let lsb = (piece & !1) as usize;
        self.nibbles[lsb] | (self.nibbles[lsb + 1] << 4)
    }
}

/// MTC stream decoder
///
/// Tracks exactly one incoming stream. Output is expressed at the local frame
/// rate when one is set and can be scaled from the incoming MTC rate,
/// otherwise at the MTC rate's direct real-rate equivalent.
#[derive(Debug, Clone)]
pub struct MtcDecoder {
    timecode: Timecode,
    mtc_frame_rate: MtcFrameRate,
    local_frame_rate: Option<FrameRate>,
    direction: Direction,

    buffer: QuarterFrameBuffer,
    /// Last field values assembled from the buffer
    raw: Components,

    last_captured: Components,
    last_captured_direction: Direction,
    /// Quarter-frames moved since the last capture
    delta_quarter_frames: Option<i32>,
    last_sent: Components,
}

impl Default for MtcDecoder {
    fn default() -> Self {
        MtcDecoder::new(None)
    }
}

impl MtcDecoder {
    /// Creates a decoder with an optional local frame rate
    pub fn new(local_frame_rate: Option<FrameRate>) -> Self {
        MtcDecoder {
            timecode: Timecode::zero(FrameRate::Fps30),
            mtc_frame_rate: MtcFrameRate::Mtc30,
            local_frame_rate,
            direction: Direction::Forwards,
            buffer: QuarterFrameBuffer::default(),
            raw: Components::default(),
            last_captured: Components::default(),
            last_captured_direction: Direction::Ambiguous,
            delta_quarter_frames: None,
            last_sent: Components::default(),
        }
    }

    /// Last timecode formed from incoming MTC data
    pub fn timecode(&self) -> Timecode {
        self.timecode
    }

    /// MTC rate last received
    pub fn mtc_frame_rate(&self) -> MtcFrameRate {
        self.mtc_frame_rate
    }

    /// Direction derived from the last quarter-frame
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn local_frame_rate(&self) -> Option<FrameRate> {
        self.local_frame_rate
    }

    /// Sets the rate output is scaled to; applies from the next message
    pub fn set_local_frame_rate(&mut self, rate: Option<FrameRate>) {
        self.local_frame_rate = rate;
    }

    /// Whether all eight pieces have been received at least once
    pub fn quarter_frame_buffer_complete(&self) -> bool {
        self.buffer.complete
    }

    /// Consumes one MTC message
    pub fn consume(&mut self, message: MtcMessage) -> DecodeOutcome {
        match message {
            MtcMessage::FullFrame(full_frame) => self.consume_full_frame(full_frame),
            MtcMessage::QuarterFrame(quarter_frame) => self.consume_quarter_frame(quarter_frame),
        }
    }

    /// Flushes the quarter-frame buffer so the next quarter-frame starts a new stream
    ///
    /// Nibble values are kept; all eight pieces must arrive again before the
    /// buffer is complete. Tracking restarts as if piece 0 was the last one
    /// received, so a stream resuming at piece 1 reads as forwards.
    pub fn reset_quarter_frame_buffer(&mut self) {
        self.buffer.flush();
        self.last_captured = Components::default();
        self.last_captured_direction = Direction::Ambiguous;
        self.delta_quarter_frames = None;
        self.last_sent = Components::default();
    }

    /// Resets the timecode to 00:00:00:00
    pub fn reset_timecode_values(&mut self) {
        self.raw = Components::default();
        let rate = self
            .local_frame_rate
            .unwrap_or_else(|| self.mtc_frame_rate.direct_equivalent_frame_rate());
        self.timecode = Timecode::zero(rate);
    }

    fn set_mtc_frame_rate(&mut self, rate: MtcFrameRate) -> Option<MtcFrameRate> {
        if rate == self.mtc_frame_rate {
            return None;
        }
        tracing::debug!("MTC frame rate changed from {} to {}", self.mtc_frame_rate, rate);
        self.mtc_frame_rate = rate;
        Some(rate)
    }

    /// Scales `components` to the local rate if possible.
    ///
    /// Returns `None` when there is no local rate or it is not carried as
    /// the current MTC rate.
    fn scale_to_local(&self, components: Components, quarter_frames: u8) -> Option<Timecode> {
        let local = self.local_frame_rate?;
        let scaled = self
            .mtc_frame_rate
            .scaled_frames(components.frames as i64, quarter_frames, local)?;

        let scaled = Components {
            frames: scaled as u16,
            ..components
        };
        Some(Timecode::new(scaled, local))
    }

    fn emit(&mut self, timecode: Timecode, kind: MessageKind) -> TimecodeEvent {
        self.timecode = timecode;
        let display_needs_update = self.last_sent != timecode.components();
        self.last_sent = timecode.components();

        TimecodeEvent {
            timecode,
            kind,
            direction: self.direction,
            display_needs_update,
        }
    }

    fn consume_full_frame(&mut self, full_frame: FullFrame) -> DecodeOutcome {
        let mtc_frame_rate_changed = self.set_mtc_frame_rate(full_frame.rate);

        self.raw = Components::new(
            full_frame.hours,
            full_frame.minutes,
            full_frame.seconds,
            full_frame.frames as u16,
        );

        let timecode = self.scale_to_local(self.raw, 0).unwrap_or_else(|| {
            Timecode::new(self.raw, self.mtc_frame_rate.direct_equivalent_frame_rate())
        });

        self.direction = Direction::Forwards;
        self.buffer.last_piece = None;

        tracing::trace!("Full-frame {} at {}", timecode, self.mtc_frame_rate);

        DecodeOutcome {
            event: Some(self.emit(timecode, MessageKind::FullFrame)),
            mtc_frame_rate_changed,
        }
    }

    fn consume_quarter_frame(&mut self, quarter_frame: QuarterFrame) -> DecodeOutcome {
        let piece = quarter_frame.piece();
        let nibble = quarter_frame.nibble();
        let mut outcome = DecodeOutcome::default();

        self.direction = Direction::from_pieces(self.buffer.last_piece, piece);
        tracing::trace!("Quarter-frame piece {} nibble {:#03x} ({})", piece, nibble, self.direction);

        // Movement only counts once a capture has happened
        if self.buffer.synced {
            let delta = self.delta_quarter_frames.get_or_insert(0);
            match self.direction {
                Direction::Forwards => *delta += 1,
                Direction::Backwards => *delta -= 1,
                Direction::Ambiguous => {}
            }
        }

        self.buffer.store(piece, nibble);

        // A field is complete on its msb piece going forwards, on its lsb piece going backwards
        let is_msb_piece = piece % 2 == 1;
        let completes_field = match self.direction {
            Direction::Forwards => is_msb_piece,
            Direction::Backwards => !is_msb_piece,
            Direction::Ambiguous => false,
        };
        if completes_field {
            let value = self.buffer.field(piece);
            match piece / 2 {
                0 => self.raw.frames = value as u16,
                1 => self.raw.seconds = value,
                2 => self.raw.minutes = value,
                _ => self.raw.hours = value,
            }
        }

        if piece == 7 {
            outcome.mtc_frame_rate_changed =
                self.set_mtc_frame_rate(MtcFrameRate::from_bits((nibble & 0b0110) >> 1));
        }

        if piece == 0 && self.buffer.complete {
            self.buffer.synced = true;

            let full_cycle = match self.delta_quarter_frames {
                None => true,
                Some(delta) => delta.abs() == GROUP_LEN,
            };
            if full_cycle {
                self.last_captured = self.raw;
                self.last_captured_direction = self.direction;
            }
            self.delta_quarter_frames = Some(0);
        }

        self.buffer.last_piece = Some(piece);

        if self.buffer.complete && self.buffer.synced {
            let timecode = self.assemble(piece);
            outcome.event = Some(self.emit(timecode, MessageKind::QuarterFrame));
        }

        outcome
    }

    /// Builds the output timecode from the last capture and the current piece
    fn assemble(&self, piece: u8) -> Timecode {
        let direct_rate = self.mtc_frame_rate.direct_equivalent_frame_rate();
        let delta = self.delta_quarter_frames.unwrap_or(0);
        let captured = Timecode::new(self.last_captured, direct_rate);

        let offset = if delta >= 0 && self.last_captured_direction != Direction::Backwards {
            ASSEMBLY_OFFSET_FRAMES
        } else if delta < 0 && self.last_captured_direction == Direction::Backwards {
            -ASSEMBLY_OFFSET_FRAMES
        } else {
            0
        };
        let components = captured.advanced(offset).components();

        if let Some(scaled) = self.scale_to_local(components, piece) {
            return scaled;
        }

        // Interpolate the second frame of the group
        let timecode = Timecode::new(components, direct_rate);
        if piece >= 4 {
            timecode.advanced(1)
        } else {
            timecode
        }
    }
}
