//! Shared helpers for command implementations.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc(local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        // Single or ambiguous (DST fall-back): use the earlier time
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight is rare but possible
            // Use 1am local which is guaranteed to exist
            let one_am = local_date.and_time(NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN));
            Local
                .from_local_datetime(&one_am)
                .earliest()
                .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc))
        }
    }
}

/// Parses an `HH:MM` wall-clock time on the given local date into UTC.
pub fn parse_local_time(date: NaiveDate, time: &str) -> Result<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .with_context(|| format!("invalid time '{time}', expected HH:MM"))?;
    let local = date.and_time(time);
    match Local.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
        LocalResult::None => bail!("time {local} does not exist in the local timezone"),
    }
}

/// Formats seconds as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
pub fn format_duration(secs: i64) -> String {
    if secs < 0 {
        return "0m".to_string();
    }
    let total_minutes = secs / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats seconds as a running clock, `HH:MM:SS`.
pub fn format_clock(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Generates a 10-character progress bar.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }
    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };
    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_switches_units_at_one_hour() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59 * 60), "59m");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(5400), "1h 30m");
        assert_eq!(format_duration(-5), "0m");
    }

    #[test]
    fn format_clock_pads_fields() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(50), "00:00:50");
        assert_eq!(format_clock(3725), "01:02:05");
    }

    #[test]
    fn parse_local_time_rejects_garbage() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert!(parse_local_time(date, "9:30").is_ok());
        assert!(parse_local_time(date, "24:00").is_err());
        assert!(parse_local_time(date, "soon").is_err());
    }

    #[test]
    fn progress_bar_has_fixed_width() {
        assert_eq!(progress_bar(0, 0).chars().count(), 10);
        assert_eq!(progress_bar(5, 10).chars().count(), 10);
        assert_eq!(progress_bar(10, 10), "██████████");
        // Tiny non-zero values stay visible.
        assert!(progress_bar(1, 1000).starts_with('█'));
    }
}
