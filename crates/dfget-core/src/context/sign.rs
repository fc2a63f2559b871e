//! Run identifier derived from the process id and start time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Builds `<pid>-<seconds>.<millis>` from `time`, truncated to milliseconds.
///
/// The fraction always has three digits, so two signs from the same process
/// compare in time order as plain strings.
pub fn generate_sign(pid: u32, time: SystemTime) -> String {
    let millis = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}.{:03}", pid, millis / 1000, millis % 1000)
}
