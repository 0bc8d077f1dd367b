use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::{Direction, MessageKind};
use crate::protocol::{MtcDecoder, MtcMessage, TimecodeEvent};
use crate::time::{FrameRate, MtcFrameRate, Timecode};
use super::SyncPolicy;

/// Largest frame step between consecutive quarter-frame timecodes still
/// treated as continuous playback
const MAX_CONTINUOUS_STEP: i64 = 2;

/// Synchronization state of a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    /// No quarter-frame stream being followed
    Idle,

    /// Stream is running; lock is predicted to occur
    PreSync {
        /// Instant at which the receiver will lock if the stream continues
        predicted_lock_time: Instant,
        /// Timecode expected at that instant
        lock_timecode: Timecode,
    },

    /// Following a continuous stream
    Locked,

    /// Incoming rate cannot be related to the local frame rate
    IncompatibleFrameRate,
}

impl fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverState::Idle => write!(f, "idle"),
            ReceiverState::PreSync { lock_timecode, .. } => write!(f, "pre-sync (lock at {})", lock_timecode),
            ReceiverState::Locked => write!(f, "locked"),
            ReceiverState::IncompatibleFrameRate => write!(f, "incompatible frame rate"),
        }
    }
}

/// Something a receiver reports to its delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Timecode(TimecodeEvent),
    StateChanged(ReceiverState),
    MtcFrameRateChanged(MtcFrameRate),
}

/// Values of a receiver that can be read at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverSnapshot {
    pub state: ReceiverState,
    pub timecode: Timecode,
    pub direction: Direction,
    pub mtc_frame_rate: MtcFrameRate,
    pub local_frame_rate: Option<FrameRate>,
    pub sync_policy: SyncPolicy,
}

/// Lock/drop-out state machine on top of a decoder
///
/// Time is passed in explicitly so the machine can be driven by any clock.
/// The owner is expected to call [`SyncEngine::poll_timers`] no later than
/// [`SyncEngine::next_deadline`].
#[derive(Debug, Clone)]
pub struct SyncEngine {
    decoder: MtcDecoder,
    policy: SyncPolicy,
    quarter_frame_timeout: Duration,
    state: ReceiverState,
    timecode: Timecode,
    /// Last timecode produced by the quarter-frame path
    previous_timecode: Option<Timecode>,
    /// Arrival of the last quarter-frame message
    last_quarter_frame_at: Option<Instant>,
    /// Arrival of the last quarter-frame timecode event
    last_event_at: Option<Instant>,
}

impl SyncEngine {
    pub fn new(
        local_frame_rate: Option<FrameRate>,
        policy: SyncPolicy,
        quarter_frame_timeout: Duration,
    ) -> Self {
        let decoder = MtcDecoder::new(local_frame_rate);
        SyncEngine {
            timecode: decoder.timecode(),
            decoder,
            policy,
            quarter_frame_timeout,
            state: ReceiverState::Idle,
            previous_timecode: None,
            last_quarter_frame_at: None,
            last_event_at: None,
        }
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    pub fn timecode(&self) -> Timecode {
        self.timecode
    }

    pub fn decoder(&self) -> &MtcDecoder {
        &self.decoder
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn local_frame_rate(&self) -> Option<FrameRate> {
        self.decoder.local_frame_rate()
    }

    pub fn set_local_frame_rate(&mut self, rate: Option<FrameRate>) {
        self.decoder.set_local_frame_rate(rate);
    }

    /// Replaces the policy; a pending lock keeps its original prediction
    pub fn set_sync_policy(&mut self, policy: SyncPolicy) {
        self.policy = policy;
    }

    pub fn snapshot(&self) -> ReceiverSnapshot {
        ReceiverSnapshot {
            state: self.state,
            timecode: self.timecode,
            direction: self.decoder.direction(),
            mtc_frame_rate: self.decoder.mtc_frame_rate(),
            local_frame_rate: self.decoder.local_frame_rate(),
            sync_policy: self.policy,
        }
    }

    /// Consumes one message received at `now`
    pub fn consume(&mut self, message: MtcMessage, now: Instant) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if matches!(message, MtcMessage::QuarterFrame(_)) {
            self.last_quarter_frame_at = Some(now);
        }

        let outcome = self.decoder.consume(message);

        if let Some(rate) = outcome.mtc_frame_rate_changed {
            notifications.push(Notification::MtcFrameRateChanged(rate));
        }
        if let Some(event) = outcome.event {
            self.handle_timecode_event(event, now, &mut notifications);
        }

        notifications
    }

    /// Earliest instant at which [`SyncEngine::poll_timers`] has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let flush = self
            .last_quarter_frame_at
            .map(|at| at + self.quarter_frame_timeout);
        let lock = match self.state {
            ReceiverState::PreSync { predicted_lock_time, .. } => Some(predicted_lock_time),
            _ => None,
        };

        [flush, self.drop_out_deadline(), lock]
            .into_iter()
            .flatten()
            .min()
    }

    /// Applies every timer that has expired at `now`
    pub fn poll_timers(&mut self, now: Instant) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if let Some(at) = self.last_quarter_frame_at {
            if now >= at + self.quarter_frame_timeout {
                tracing::debug!("Quarter-frame stream interrupted, flushing buffer");
                self.decoder.reset_quarter_frame_buffer();
                self.last_quarter_frame_at = None;
            }
        }

        if let Some(deadline) = self.drop_out_deadline() {
            if now >= deadline {
                tracing::debug!("No timecode for {} frames, dropping out", self.policy.drop_out_frames());
                self.last_event_at = None;
                self.previous_timecode = None;
                self.transition(ReceiverState::Idle, &mut notifications);
            }
        }

        if let ReceiverState::PreSync { predicted_lock_time, .. } = self.state {
            if now >= predicted_lock_time {
                self.transition(ReceiverState::Locked, &mut notifications);
            }
        }

        notifications
    }

    fn drop_out_deadline(&self) -> Option<Instant> {
        if self.state == ReceiverState::Idle {
            return None;
        }
        let at = self.last_event_at?;
        let rate = self.duration_rate(self.previous_timecode?);
        Some(at + self.policy.drop_out_duration(rate))
    }

    /// Rate used to turn policy frames into wall-clock time
    fn duration_rate(&self, timecode: Timecode) -> FrameRate {
        self.decoder
            .local_frame_rate()
            .unwrap_or_else(|| timecode.frame_rate())
    }

    fn handle_timecode_event(
        &mut self,
        event: TimecodeEvent,
        now: Instant,
        notifications: &mut Vec<Notification>,
    ) {
        // Compatible only when the stream can be expressed at the local rate
        let mtc_frame_rate = self.decoder.mtc_frame_rate();
        let compatible = self
            .decoder
            .local_frame_rate()
            .map_or(true, |local| mtc_frame_rate.is_derived(local));

        if event.kind == MessageKind::FullFrame && !compatible {
            tracing::debug!(
                "Ignoring full-frame at {}, incompatible with local rate",
                event.timecode.frame_rate()
            );
            return;
        }

        self.timecode = event.timecode;
        notifications.push(Notification::Timecode(event));

        // Only the quarter-frame stream drives sync
        if event.kind == MessageKind::FullFrame {
            return;
        }

        self.last_event_at = Some(now);

        if !compatible {
            self.transition(ReceiverState::IncompatibleFrameRate, notifications);
        } else {
            if self.state == ReceiverState::IncompatibleFrameRate {
                self.transition(ReceiverState::Idle, notifications);
            }

            let enter_pre_sync = match self.state {
                ReceiverState::Idle => event.direction != Direction::Ambiguous,
                ReceiverState::PreSync { .. } | ReceiverState::Locked => {
                    self.is_discontinuous(&event.timecode)
                }
                ReceiverState::IncompatibleFrameRate => false,
            };
            if enter_pre_sync {
                self.enter_pre_sync(event.timecode, now, notifications);
            }
        }

        self.previous_timecode = Some(event.timecode);
    }

    fn is_discontinuous(&self, timecode: &Timecode) -> bool {
        match self.previous_timecode {
            Some(previous) => {
                previous.frame_rate() != timecode.frame_rate()
                    || timecode.frames_since(&previous).abs() > MAX_CONTINUOUS_STEP
            }
            None => true,
        }
    }

    fn enter_pre_sync(&mut self, timecode: Timecode, now: Instant, notifications: &mut Vec<Notification>) {
        let rate = self.duration_rate(timecode);
        let state = ReceiverState::PreSync {
            predicted_lock_time: now + self.policy.lock_duration(rate),
            lock_timecode: timecode.advanced(self.policy.lock_frames() as i64),
        };
        self.transition(state, notifications);
    }

    fn transition(&mut self, state: ReceiverState, notifications: &mut Vec<Notification>) {
        if state == self.state {
            return;
        }
        tracing::debug!("Receiver state {} -> {}", self.state, state);
        self.state = state;
        notifications.push(Notification::StateChanged(state));
    }
}
