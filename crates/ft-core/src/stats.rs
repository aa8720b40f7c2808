//! Aggregation: range totals, calendar buckets, leaderboards, heatmap.
//!
//! All functions are pure over terminated sessions; dates are attributed by
//! the session's start instant.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::session::FocusSession;
use crate::view::SessionView;

const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Rounds a duration in seconds to hours with one decimal place.
#[must_use]
pub fn round_hours(seconds: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let hours = seconds as f64 / 3600.0;
    (hours * 10.0).round() / 10.0
}

/// Total focused seconds across terminated sessions starting in
/// `[start, end)`.
#[must_use]
pub fn range_total(sessions: &[FocusSession], start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    sessions
        .iter()
        .filter(|s| s.start_time >= start && s.start_time < end)
        .filter_map(FocusSession::duration_seconds)
        .sum()
}

/// How session time is grouped into trend buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Seven buckets, Monday first.
    DayOfWeek,
    /// Thirty-one buckets labeled `1` through `31`.
    DayOfMonth,
    /// Twelve buckets, January first.
    MonthOfYear,
}

/// One trend bucket: a fixed calendar slot and its focused hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub hours: f64,
}

/// Groups terminated sessions into a fixed set of calendar buckets.
///
/// Every slot of the granularity is present, zero-filled; callers filter the
/// sessions to the range of interest first.
#[must_use]
pub fn bucket_by(sessions: &[FocusSession], granularity: Granularity) -> Vec<Bucket> {
    let slots = match granularity {
        Granularity::DayOfWeek => 7,
        Granularity::DayOfMonth => 31,
        Granularity::MonthOfYear => 12,
    };
    let mut totals = vec![0_i64; slots];

    for session in sessions {
        let Some(secs) = session.duration_seconds() else {
            continue;
        };
        let date = session.start_time.date_naive();
        let slot = match granularity {
            Granularity::DayOfWeek => date.weekday().num_days_from_monday() as usize,
            Granularity::DayOfMonth => date.day() as usize - 1,
            Granularity::MonthOfYear => date.month() as usize - 1,
        };
        totals[slot] += secs;
    }

    totals
        .into_iter()
        .enumerate()
        .map(|(i, secs)| Bucket {
            label: match granularity {
                Granularity::DayOfWeek => WEEKDAY_LABELS[i].to_owned(),
                Granularity::DayOfMonth => (i + 1).to_string(),
                Granularity::MonthOfYear => MONTH_LABELS[i].to_owned(),
            },
            hours: round_hours(secs),
        })
        .collect()
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalEntry {
    pub label: String,
    pub seconds: i64,
    pub hours: f64,
}

fn ranked(mut totals: HashMap<String, i64>, limit: usize) -> Vec<TotalEntry> {
    let mut entries: Vec<TotalEntry> = totals
        .drain()
        .map(|(label, seconds)| TotalEntry {
            label,
            seconds,
            hours: round_hours(seconds),
        })
        .collect();
    entries.sort_by(|a, b| b.seconds.cmp(&a.seconds).then_with(|| a.label.cmp(&b.label)));
    entries.truncate(limit);
    entries
}

/// The subjects with the most focused time, descending; ties break
/// alphabetically.
#[must_use]
pub fn top_subjects(views: &[SessionView<'_>], limit: usize) -> Vec<TotalEntry> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for view in views {
        let Some(secs) = view.session.duration_seconds() else {
            continue;
        };
        *totals.entry(view.label().to_owned()).or_default() += secs;
    }
    ranked(totals, limit)
}

/// The tags with the most focused time.
///
/// A session counts its full duration toward every tag on its subject, so
/// tag totals may exceed the range total.
#[must_use]
pub fn top_tags(views: &[SessionView<'_>], limit: usize) -> Vec<TotalEntry> {
    let mut totals: HashMap<String, i64> = HashMap::new();
    for view in views {
        let Some(secs) = view.session.duration_seconds() else {
            continue;
        };
        for tag in &view.tags {
            *totals.entry(tag.name.clone()).or_default() += secs;
        }
    }
    ranked(totals, limit)
}

/// Intensity level for a day's focused hours, 0 through 4.
///
/// Bounds are exclusive on the lower side: exactly 2.0 hours is still
/// level 0.
#[must_use]
pub fn heatmap_level(hours: f64) -> u8 {
    if hours > 8.0 {
        4
    } else if hours > 6.0 {
        3
    } else if hours > 4.0 {
        2
    } else if hours > 2.0 {
        1
    } else {
        0
    }
}

/// One day cell of the year heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    /// 0 = Monday through 6 = Sunday.
    pub weekday: u8,
    /// Horizontal grid position.
    pub column: usize,
    pub hours: f64,
    pub level: u8,
    /// 1 through 12.
    pub month: u32,
}

/// A full calendar year laid out as a weekday-by-column grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearHeatmap {
    pub cells: Vec<HeatmapCell>,
    pub columns: usize,
}

/// Builds the heatmap grid for a calendar year.
///
/// Columns advance after every Sunday and again at every month boundary, so
/// each month starts in a fresh column. A month ending on a Sunday leaves an
/// empty spacer column before the next month.
#[must_use]
pub fn year_heatmap(sessions: &[FocusSession], year: i32) -> YearHeatmap {
    let mut daily: HashMap<NaiveDate, i64> = HashMap::new();
    for session in sessions {
        let Some(secs) = session.duration_seconds() else {
            continue;
        };
        let date = session.start_time.date_naive();
        if date.year() == year {
            *daily.entry(date).or_default() += secs;
        }
    }

    let mut cells = Vec::with_capacity(366);
    let mut column = 0;
    let Some(mut date) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return YearHeatmap { cells, columns: 0 };
    };

    while date.year() == year {
        #[allow(clippy::cast_possible_truncation)]
        let weekday = date.weekday().num_days_from_monday() as u8;
        let hours = round_hours(daily.get(&date).copied().unwrap_or(0));
        cells.push(HeatmapCell {
            date,
            weekday,
            column,
            hours,
            level: heatmap_level(hours),
            month: date.month(),
        });

        let next = date.succ_opt();
        if weekday == 6 {
            column += 1;
        }
        if next.is_none_or(|n| n.month() != date.month()) {
            column += 1;
        }
        match next {
            Some(n) => date = n,
            None => break,
        }
    }

    let columns = cells.last().map_or(0, |c| c.column + 1);
    YearHeatmap { cells, columns }
}
