//! Wall-clock helper for document timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix time in milliseconds.
///
/// Used only to stamp `created_at`/`updated_at` on documents — never inside
/// turn resolution, which must stay a pure function of its inputs.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
