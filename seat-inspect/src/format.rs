//! Timestamp and duration formatting for report lines.

use chrono::{Local, LocalResult, TimeZone, Utc};

/// Sentinel for timestamps whose value is 0, meaning "never set".
pub const NEVER: &str = "--";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render µs since the epoch as a local wall-clock time.
pub fn format_timestamp(usec: u64) -> String {
    if usec == 0 {
        return NEVER.to_owned();
    }
    match Local.timestamp_micros(usec as i64) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
            dt.format(TIME_FORMAT).to_string()
        }
        LocalResult::None => NEVER.to_owned(),
    }
}

/// Render a wall-clock instant (e.g. a journal entry time) in the same
/// format as [`format_timestamp`].
pub fn format_system_time(time: std::time::SystemTime) -> String {
    chrono::DateTime::<Local>::from(time)
        .format(TIME_FORMAT)
        .to_string()
}

/// Coarse human duration: the largest applicable unit, rounded to the
/// nearest whole value, never combined (90000s is "1d", not "1d 1h").
pub fn format_elapsed(seconds: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    fn round_div(n: u64, unit: u64) -> u64 {
        (n + unit / 2) / unit
    }

    if seconds > DAY {
        format!("{}d", round_div(seconds, DAY))
    } else if seconds >= HOUR {
        format!("{}h", round_div(seconds, HOUR))
    } else if seconds > MINUTE {
        format!("{}m", round_div(seconds, MINUTE))
    } else {
        format!("{}s", seconds)
    }
}

/// Elapsed time from a µs-epoch timestamp until now, as a coarse duration.
pub fn elapsed_since(usec: u64) -> String {
    let now = Utc::now().timestamp_micros();
    let seconds = now.saturating_sub(usec as i64).max(0) as u64 / 1_000_000;
    format_elapsed(seconds)
}

/// Idle flag plus the time it was last set, shared by seats, users, and
/// sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleStatus {
    pub hint: bool,
    pub since_usec: u64,
}

impl IdleStatus {
    pub fn new(hint: bool, since_usec: u64) -> Self {
        Self { hint, since_usec }
    }

    pub fn describe(&self) -> String {
        if self.hint {
            format!("idle since {}", format_timestamp(self.since_usec))
        } else {
            "not idle".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn elapsed_picks_a_single_unit() {
        assert_eq!(format_elapsed(0), "0s");
        assert_eq!(format_elapsed(59), "59s");
        assert_eq!(format_elapsed(60), "60s");
        assert_eq!(format_elapsed(61), "1m");
        assert_eq!(format_elapsed(90), "2m");
        assert_eq!(format_elapsed(3599), "60m");
        assert_eq!(format_elapsed(3600), "1h");
        assert_eq!(format_elapsed(7200), "2h");
        assert_eq!(format_elapsed(86400), "24h");
        assert_eq!(format_elapsed(86401), "1d");
        assert_eq!(format_elapsed(90000), "1d");
        assert_eq!(format_elapsed(13 * 86400), "13d");
    }

    #[test]
    fn zero_timestamp_is_never() {
        assert_eq!(format_timestamp(0), NEVER);
    }

    #[test]
    fn timestamp_round_trips_at_second_resolution() {
        let usec: u64 = 1_700_000_000_123_456;
        let rendered = format_timestamp(usec);
        let parsed = NaiveDateTime::parse_from_str(&rendered, TIME_FORMAT)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap();
        assert_eq!(parsed.timestamp() as u64, usec / 1_000_000);
    }

    #[test]
    fn idle_status_lines() {
        assert_eq!(IdleStatus::new(false, 0).describe(), "not idle");
        let idle = IdleStatus::new(true, 1_700_000_000_000_000);
        assert!(idle.describe().starts_with("idle since "));
        assert!(!idle.describe().contains(NEVER));
    }
}
