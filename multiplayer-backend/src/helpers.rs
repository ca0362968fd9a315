use std::time::{SystemTime, UNIX_EPOCH};

/// Current Unix time in seconds, as stored in `last_updated`.
pub fn now() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|elapsed| elapsed.as_secs() as i64)
    .unwrap_or_default()
}
