use std::time;

use crate::encoding::to_base64;

fn now_ns() -> u128 {
    time::SystemTime::now()
        .duration_since(time::UNIX_EPOCH)
        .expect("Time went backwards")
        .as_nanos()
}

/// Compact, filesystem-safe id derived from the current time.
///
/// Used as a filename fallback when a post id sanitizes to nothing.
#[must_use]
pub fn time_id() -> String {
    to_base64(now_ns().to_string())
}
