use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::core::{Direction, Error, ReceiverConfig, Result, COMMAND_QUEUE_LEN};
use crate::protocol::{MtcMessage, TimecodeEvent};
use crate::time::{FrameRate, MtcFrameRate, Timecode};
use crate::util::sleep_until_opt;
use super::state::{Notification, ReceiverSnapshot, ReceiverState, SyncEngine};
use super::SyncPolicy;

/// Callbacks from a [`Receiver`]
///
/// Called from the receiver's task, in the order events occur. Implementations
/// should return quickly.
pub trait ReceiverDelegate: Send + Sync {
    /// Called for every decoded timecode
    fn on_timecode_event(&self, event: &TimecodeEvent);

    /// Called when the receiver state changes
    fn on_state_changed(&self, state: &ReceiverState);

    /// Called when the incoming stream changes its MTC rate
    fn on_mtc_frame_rate_changed(&self, _rate: MtcFrameRate) {}
}

enum Command {
    Consume(MtcMessage),
    SetLocalFrameRate(Option<FrameRate>),
    SetSyncPolicy(SyncPolicy),
    Shutdown,
}

/// MTC receiver with lock and drop-out tracking
///
/// Messages are handed to a spawned task and processed in order; callbacks
/// fire shortly after [`Receiver::consume`] returns. Property reads return the
/// latest published values and never wait on the task.
pub struct Receiver {
    name: String,
    commands: mpsc::Sender<Command>,
    snapshot: Arc<watch::Sender<ReceiverSnapshot>>,
}

impl Receiver {
    /// Creates a receiver and spawns its task on the current tokio runtime
    pub fn new(config: ReceiverConfig, delegate: Option<Arc<dyn ReceiverDelegate>>) -> Result<Self> {
        config.validate()?;

        let engine = SyncEngine::new(
            config.local_frame_rate,
            config.sync_policy,
            config.quarter_frame_timeout,
        );
        let (snapshot_tx, _) = watch::channel(engine.snapshot());
        let snapshot = Arc::new(snapshot_tx);
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_LEN);

        let executor = Executor {
            name: config.name.clone(),
            engine,
            commands: command_rx,
            snapshot: snapshot.clone(),
            delegate,
        };
        tokio::spawn(executor.run());

        Ok(Receiver {
            name: config.name,
            commands,
            snapshot,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queues a message for processing
    ///
    /// Never waits: if the receiver's task has fallen behind by
    /// `COMMAND_QUEUE_LEN` messages, returns [`Error::ReceiverBusy`] and the
    /// message is dropped.
    pub fn consume(&self, message: MtcMessage) -> Result<()> {
        self.send(Command::Consume(message))
    }

    /// Parses one complete MIDI message and queues it
    pub fn consume_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.consume(MtcMessage::from_midi_bytes(bytes)?)
    }

    pub fn state(&self) -> ReceiverState {
        self.snapshot.borrow().state
    }

    pub fn timecode(&self) -> Timecode {
        self.snapshot.borrow().timecode
    }

    pub fn direction(&self) -> Direction {
        self.snapshot.borrow().direction
    }

    pub fn mtc_frame_rate(&self) -> MtcFrameRate {
        self.snapshot.borrow().mtc_frame_rate
    }

    pub fn local_frame_rate(&self) -> Option<FrameRate> {
        self.snapshot.borrow().local_frame_rate
    }

    pub fn sync_policy(&self) -> SyncPolicy {
        self.snapshot.borrow().sync_policy
    }

    /// All readable values at once
    pub fn snapshot(&self) -> ReceiverSnapshot {
        *self.snapshot.borrow()
    }

    /// Watches published values; use `changed().await` to wait for processing
    pub fn subscribe(&self) -> watch::Receiver<ReceiverSnapshot> {
        self.snapshot.subscribe()
    }

    /// Sets the frame rate incoming timecode is scaled to
    pub fn set_local_frame_rate(&self, rate: Option<FrameRate>) -> Result<()> {
        self.send(Command::SetLocalFrameRate(rate))?;
        self.snapshot.send_modify(|s| s.local_frame_rate = rate);
        Ok(())
    }

    /// Replaces the sync policy
    pub fn set_sync_policy(&self, policy: SyncPolicy) -> Result<()> {
        self.send(Command::SetSyncPolicy(policy))?;
        self.snapshot.send_modify(|s| s.sync_policy = policy);
        Ok(())
    }

    /// Stops the receiver task after already queued messages
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => {
                tracing::warn!(receiver = %self.name, "Command queue full, dropping message");
                Error::receiver_busy(format!("receiver '{}' has {} messages pending", self.name, COMMAND_QUEUE_LEN))
            }
            TrySendError::Closed(_) => {
                tracing::warn!(receiver = %self.name, "Message sent to a stopped receiver");
                Error::receiver_closed(format!("receiver '{}' is no longer running", self.name))
            }
        })
    }
}

/// The receiver's task: owns the engine and serializes all work on it
struct Executor {
    name: String,
    engine: SyncEngine,
    commands: mpsc::Receiver<Command>,
    snapshot: Arc<watch::Sender<ReceiverSnapshot>>,
    delegate: Option<Arc<dyn ReceiverDelegate>>,
}

impl Executor {
    async fn run(mut self) {
        tracing::debug!(receiver = %self.name, "MTC receiver started");

        loop {
            let deadline = self.engine.next_deadline();

            tokio::select! {
                command = self.commands.recv() => {
                    match command {
                        Some(Command::Consume(message)) => {
                            let notifications = self.engine.consume(message, Instant::now());
                            self.publish(notifications);
                        }
                        Some(Command::SetLocalFrameRate(rate)) => {
                            tracing::debug!(receiver = %self.name, "Local frame rate set to {:?}", rate);
                            self.engine.set_local_frame_rate(rate);
                        }
                        Some(Command::SetSyncPolicy(policy)) => {
                            self.engine.set_sync_policy(policy);
                        }
                        Some(Command::Shutdown) | None => break,
                    }
                }

                _ = sleep_until_opt(deadline) => {
                    let notifications = self.engine.poll_timers(Instant::now());
                    self.publish(notifications);
                }
            }
        }

        tracing::debug!(receiver = %self.name, "MTC receiver stopped");
    }

    /// Publishes new values, then notifies the delegate
    fn publish(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }

        let current = self.engine.snapshot();
        self.snapshot.send_modify(|s| {
            s.state = current.state;
            s.timecode = current.timecode;
            s.direction = current.direction;
            s.mtc_frame_rate = current.mtc_frame_rate;
        });

        let Some(delegate) = &self.delegate else {
            return;
        };
        for notification in notifications {
            match notification {
                Notification::Timecode(event) => delegate.on_timecode_event(&event),
                Notification::StateChanged(state) => delegate.on_state_changed(&state),
                Notification::MtcFrameRateChanged(rate) => delegate.on_mtc_frame_rate_changed(rate),
            }
        }
    }
}
