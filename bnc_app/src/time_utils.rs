use std::time::SystemTime;
use std::time::UNIX_EPOCH;

#[inline]
/// Returns the current Unix timestamp in milliseconds
pub fn unix_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|elapsed| elapsed.as_millis() as u64).unwrap_or(0)
}

/// Signed offset of a server timestamp from the local clock, in milliseconds
///
/// Positive when the server is ahead.
pub fn clock_skew_ms(server_time_ms: u64, local_time_ms: u64) -> i64 {
    server_time_ms as i64 - local_time_ms as i64
}
