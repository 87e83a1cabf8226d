//! Human-readable duration formatting for reporters
//!
//! Short runs are shown in seconds with two decimals, anything from 100
//! seconds up is shown as a clock (`H:MM:SS`).

/// Durations below this many seconds use the short `X.XXs` form
const SHORT_FORMAT_MAX_SECS: i64 = 100;

/// Format whole seconds as `H:MM:SS`
///
/// # Examples
///
/// ```
/// use tuner_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "0:00:00");
/// assert_eq!(format_clock(3661), "1:01:01");
/// assert_eq!(format_clock(-75), "-0:01:15");
/// ```
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs_seconds = seconds.abs();
    let hours = abs_seconds / 3600;
    let mins = (abs_seconds % 3600) / 60;
    let secs = abs_seconds % 60;
    format!("{}{}:{:02}:{:02}", sign, hours, mins, secs)
}

/// Format an elapsed duration given in milliseconds
///
/// # Examples
///
/// ```
/// use tuner_common::human_time::format_elapsed_ms;
///
/// assert_eq!(format_elapsed_ms(4_250), "4.25s");
/// assert_eq!(format_elapsed_ms(330_000), "0:05:30");
/// ```
pub fn format_elapsed_ms(millis: i64) -> String {
    if millis.abs() < SHORT_FORMAT_MAX_SECS * 1000 {
        format!("{:.2}s", millis as f64 / 1000.0)
    } else {
        format_clock(millis / 1000)
    }
}
