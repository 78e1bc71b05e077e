use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

const SUFFIX_LEN: usize = 6;

/// Turn ids sort by creation time; the random suffix separates turns created
/// within the same millisecond.
pub fn turn_id(timestamp: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{suffix}", timestamp.timestamp_millis())
}
