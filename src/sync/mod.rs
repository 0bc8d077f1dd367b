//! Synchronization module
//!
//! This module tracks whether an incoming quarter-frame stream is stable
//! enough to follow: the lock/drop-out policy, the state machine, and the
//! asynchronous receiver built on top of it.

pub mod policy;
pub mod receiver;
pub mod state;

pub use self::policy::SyncPolicy;
pub use self::receiver::{Receiver, ReceiverDelegate};
pub use self::state::{Notification, ReceiverSnapshot, ReceiverState, SyncEngine};
