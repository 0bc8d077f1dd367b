//! Utility module
//!
//! This module provides common utilities and helper functions used
//! throughout the library.

use tokio::time::Instant;

/// Sleeps until `deadline`, or forever when there is none
pub async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
