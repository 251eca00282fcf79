//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for creation, update, deletion and event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
///
/// Aggregate operations never read the clock themselves; callers pass `now`
/// explicitly so behaviour stays deterministic under test.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }
}
