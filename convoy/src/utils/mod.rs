//! Utility functions for context id generation and wire timestamps.
//!
//! Wire timestamps are producer-supplied epoch milliseconds; uptime
//! measurements use a monotonic clock and never go through here.

use chrono::Utc;
use uuid::Uuid;

/// Generates a fresh context id.
///
/// Ids are UUID v4 strings; uniqueness within one process lineage is
/// all the consumer side relies on.
#[must_use]
pub fn generate_context_id() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current UTC time as epoch milliseconds.
///
/// This is the `timestamp` value stamped onto outgoing scope records.
#[must_use]
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}
