// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Millisecond/display-string conversions.

/// Format a position as `MM:SS`, or `HH:MM:SS` once it reaches an hour.
pub fn format_time(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Parse `HH:MM:SS`, `MM:SS` or a bare number of seconds into milliseconds.
pub fn parse_time(text: &str) -> Option<u64> {
    let parts = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;

    // Overflow on absurd input yields None.
    let secs = match parts.as_slice() {
        [h, m, s] => h.checked_mul(3600)?.checked_add(m.checked_mul(60)?)?.checked_add(*s)?,
        [m, s] => m.checked_mul(60)?.checked_add(*s)?,
        [s] => *s,
        _ => return None,
    };
    secs.checked_mul(1000)
}

/// Label for a timeline tick: `5m` on whole minutes, `5:30` otherwise.
pub fn tick_label(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    if seconds == 0 {
        format!("{}m", minutes)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Seconds with millisecond precision, as the media tool expects them.
pub fn ms_to_secs_arg(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_short_and_long() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65_999), "01:05");
        assert_eq!(format_time(3_600_000), "01:00:00");
        assert_eq!(format_time(5_430_000), "01:30:30");
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("01:30:30"), Some(5_430_000));
        assert_eq!(parse_time("45:10"), Some(2_710_000));
        assert_eq!(parse_time(" 90 "), Some(90_000));
        assert_eq!(parse_time("1:2:3:4"), None);
        assert_eq!(parse_time("ab:cd"), None);
        assert_eq!(parse_time(""), None);
    }

    #[test]
    fn test_parse_time_overflow_is_rejected() {
        assert_eq!(parse_time("9999999999999999:00:00"), None);
        assert_eq!(parse_time("99999999999999999999"), None);
        assert_eq!(parse_time(&format!("{}", u64::MAX / 1000 + 1)), None);
        assert_eq!(parse_time(&format!("{}:00", u64::MAX / 60 + 1)), None);
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(tick_label(0), "0m");
        assert_eq!(tick_label(300_000), "5m");
        assert_eq!(tick_label(70_000), "1:10");
    }

    #[test]
    fn test_secs_arg() {
        assert_eq!(ms_to_secs_arg(35_000), "35.000");
        assert_eq!(ms_to_secs_arg(1_234), "1.234");
        assert_eq!(ms_to_secs_arg(7), "0.007");
    }
}
