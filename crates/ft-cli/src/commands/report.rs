//! Report command for summarizing focused time over a period.
//!
//! This module implements `ft report` with period options (--day, --week,
//! --month, --year) and output formats (human-readable, JSON).

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use ft_core::{
    Bucket, FocusSession, Granularity, SubjectResolver, TotalEntry, bucket_by, range_total,
    resolve_sessions, round_hours, top_subjects, top_tags,
};
use ft_db::Database;
use serde::Serialize;

use crate::ReportArgs;

use super::util::{format_duration, local_midnight_to_utc, progress_bar};

const TOP_LIMIT: usize = 5;

/// Report period type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    fn from_args(args: &ReportArgs) -> Self {
        if args.day {
            Self::Day
        } else if args.month {
            Self::Month
        } else if args.year {
            Self::Year
        } else {
            Self::Week
        }
    }
}

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub period: Period,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub total_seconds: i64,
    pub total_hours: f64,
    pub buckets: Vec<Bucket>,
    pub top: Vec<TotalEntry>,
    pub by_tag: bool,
}

/// Calculates period boundaries as a half-open local-midnight interval.
pub fn period_boundaries(period: Period, reference: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let (start_date, end_date) = match period {
        Period::Day => (reference, reference + chrono::Duration::days(1)),
        Period::Week => {
            let days_since_monday = reference.weekday().num_days_from_monday();
            let monday = reference - chrono::Duration::days(i64::from(days_since_monday));
            (monday, monday + chrono::Duration::days(7))
        }
        Period::Month => {
            let first = reference.with_day(1).unwrap_or(reference);
            let next = first
                .checked_add_months(chrono::Months::new(1))
                .unwrap_or(first);
            (first, next)
        }
        Period::Year => {
            let first = NaiveDate::from_ymd_opt(reference.year(), 1, 1).unwrap_or(reference);
            let next = NaiveDate::from_ymd_opt(reference.year() + 1, 1, 1).unwrap_or(first);
            (first, next)
        }
    };
    (
        local_midnight_to_utc(start_date),
        local_midnight_to_utc(end_date),
    )
}

/// Generates report data from the database.
pub fn generate_report_data(
    db: &Database,
    period: Period,
    reference: NaiveDate,
    by_tag: bool,
) -> Result<ReportData> {
    let (period_start, period_end) = period_boundaries(period, reference);

    let all_sessions = db.list_sessions()?;
    let sessions: Vec<FocusSession> = all_sessions
        .iter()
        .filter(|s| s.start_time >= period_start && s.start_time < period_end)
        .cloned()
        .collect();

    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let tags = db.list_tags()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);
    let views = resolve_sessions(&sessions, &resolver, &tags);

    let total_seconds = range_total(&sessions, period_start, period_end);
    let buckets = match period {
        Period::Day => Vec::new(),
        Period::Week => bucket_by(&sessions, Granularity::DayOfWeek),
        Period::Month => bucket_by(&sessions, Granularity::DayOfMonth),
        Period::Year => bucket_by(&sessions, Granularity::MonthOfYear),
    };
    let top = if by_tag {
        top_tags(&views, TOP_LIMIT)
    } else {
        top_subjects(&views, TOP_LIMIT)
    };

    Ok(ReportData {
        period,
        period_start,
        period_end,
        total_seconds,
        total_hours: round_hours(total_seconds),
        buckets,
        top,
        by_tag,
    })
}

fn format_period_description(period: Period, reference: NaiveDate) -> String {
    match period {
        Period::Day => format!("{}", reference.format("%A, %b %-d, %Y")),
        Period::Week => {
            let days_since_monday = reference.weekday().num_days_from_monday();
            let monday = reference - chrono::Duration::days(i64::from(days_since_monday));
            format!("Week of {}", monday.format("%b %-d, %Y"))
        }
        Period::Month => format!("{}", reference.format("%B %Y")),
        Period::Year => format!("{}", reference.format("%Y")),
    }
}

/// Formats the human-readable report output.
#[allow(clippy::cast_possible_truncation)]
pub fn format_report(data: &ReportData, reference: NaiveDate) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "FOCUS REPORT: {}",
        format_period_description(data.period, reference)
    );
    let _ = writeln!(output, "Total: {}", format_duration(data.total_seconds));

    if data.total_seconds == 0 {
        let _ = writeln!(output);
        let _ = writeln!(output, "No focus sessions in this period.");
        return output;
    }

    if !data.buckets.is_empty() {
        let max = data
            .buckets
            .iter()
            .map(|b| (b.hours * 10.0).round() as i64)
            .max()
            .unwrap_or(0);
        let _ = writeln!(output);
        let _ = writeln!(output, "TREND");
        for bucket in &data.buckets {
            let value = (bucket.hours * 10.0).round() as i64;
            let _ = writeln!(
                output,
                "{:>3}  {}  {:.1}h",
                bucket.label,
                progress_bar(value, max),
                bucket.hours
            );
        }
    }

    let heading = if data.by_tag { "TOP TAGS" } else { "TOP SUBJECTS" };
    let _ = writeln!(output);
    let _ = writeln!(output, "{heading}");
    if data.top.is_empty() {
        let _ = writeln!(output, "(none)");
    }
    for (rank, entry) in data.top.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. {}  {}",
            rank + 1,
            entry.label,
            format_duration(entry.seconds)
        );
    }

    output
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    args: &ReportArgs,
    today: NaiveDate,
) -> Result<()> {
    let period = Period::from_args(args);
    let reference = args.date.unwrap_or(today);
    let data = generate_report_data(db, period, reference, args.by_tag)?;

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data, reference))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use ft_core::SessionId;

    fn reference() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2026, 3, 4).unwrap()
    }

    fn seed(db: &mut Database, day: NaiveDate, hour: i64, minutes: i64, label: &str) {
        let task = db.find_or_create_task(label, local_midnight_to_utc(day)).unwrap();
        let start = local_midnight_to_utc(day) + Duration::hours(hour);
        let id = format!("{label}-{day}-{hour}").replace(' ', "-");
        db.insert_session(&ft_core::FocusSession {
            id: SessionId::new(id).unwrap(),
            subject_id: task.id,
            start_time: start,
            end_time: Some(start + Duration::minutes(minutes)),
            note: None,
        })
        .unwrap();
    }

    #[test]
    fn week_boundaries_start_monday() {
        let (start, end) = period_boundaries(Period::Week, reference());
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(start, local_midnight_to_utc(monday));
        assert_eq!(end - start, Duration::days(7));
    }

    #[test]
    fn month_boundaries_span_the_calendar_month() {
        let (start, end) = period_boundaries(Period::Month, reference());
        assert_eq!(start, local_midnight_to_utc(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert_eq!(end, local_midnight_to_utc(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }

    #[test]
    fn week_report_buckets_by_weekday() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        seed(&mut db, monday, 9, 90, "Write report");
        seed(&mut db, monday + Duration::days(2), 14, 60, "Review");
        // Outside the week.
        seed(&mut db, monday - Duration::days(1), 9, 60, "Old");

        let data = generate_report_data(&db, Period::Week, reference(), false).unwrap();
        assert_eq!(data.total_seconds, 150 * 60);
        assert_eq!(data.buckets.len(), 7);
        assert!((data.buckets[0].hours - 1.5).abs() < 1e-9);
        assert!((data.buckets[2].hours - 1.0).abs() < 1e-9);
        assert_eq!(data.top[0].label, "Write report");
    }

    #[test]
    fn day_report_has_no_trend() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();
        seed(&mut db, reference(), 9, 30, "Write report");

        let data = generate_report_data(&db, Period::Day, reference(), false).unwrap();
        assert!(data.buckets.is_empty());
        assert_eq!(data.total_seconds, 30 * 60);

        let rendered = format_report(&data, reference());
        assert!(rendered.contains("FOCUS REPORT: Wednesday, Mar 4, 2026"));
        assert!(rendered.contains("Total: 30m"));
        assert!(!rendered.contains("TREND"));
    }

    #[test]
    fn empty_period_renders_hint() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(&temp.path().join("ft.db")).unwrap();

        let data = generate_report_data(&db, Period::Week, reference(), false).unwrap();
        let rendered = format_report(&data, reference());
        assert!(rendered.contains("No focus sessions in this period."));
    }

    #[test]
    fn json_output_is_machine_readable() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();
        seed(&mut db, reference(), 9, 60, "Write report");

        let args = ReportArgs {
            day: false,
            week: true,
            month: false,
            year: false,
            date: Some(reference()),
            by_tag: false,
            json: true,
        };
        let mut output = Vec::new();
        run(&mut output, &db, &args, reference()).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_slice(&output).expect("valid JSON report");
        assert_eq!(parsed["period"], "week");
        assert_eq!(parsed["total_seconds"], 3600);
        assert_eq!(parsed["top"][0]["label"], "Write report");
    }
}
