//! Timeline command for rendering one day's sessions on period tracks.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use ft_core::{Period, SubjectResolver, TimelineBlock, layout_day, resolve_sessions};
use ft_db::Database;

use super::util::{format_duration, local_midnight_to_utc};

const TRACK_WIDTH: usize = 50;

pub fn run<W: Write>(writer: &mut W, db: &Database, date: NaiveDate) -> Result<()> {
    let sessions = db.list_sessions()?;
    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let tags = db.list_tags()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);
    let views = resolve_sessions(&sessions, &resolver, &tags);

    let blocks = layout_day(&views, local_midnight_to_utc(date));
    write!(writer, "{}", format_timeline(date, &blocks))?;
    Ok(())
}

/// Formats the three period tracks with their blocks.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn format_timeline(date: NaiveDate, blocks: &[TimelineBlock]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Timeline for {date}");

    for period in Period::ALL {
        let (start_h, end_h) = period.bounds();
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "{:<10} {:02}:00-{:02}:00",
            period.label(),
            start_h as u32,
            end_h as u32
        );

        let period_blocks: Vec<&TimelineBlock> =
            blocks.iter().filter(|b| b.period == period).collect();

        let mut track = vec!['·'; TRACK_WIDTH];
        for block in &period_blocks {
            let from = ((block.left_pct / 100.0) * TRACK_WIDTH as f64).floor() as usize;
            let to = (((block.left_pct + block.width_pct) / 100.0) * TRACK_WIDTH as f64).ceil()
                as usize;
            let from = from.min(TRACK_WIDTH - 1);
            let to = to.clamp(from + 1, TRACK_WIDTH);
            for slot in &mut track[from..to] {
                *slot = '█';
            }
        }
        let _ = writeln!(output, "  {}", track.iter().collect::<String>());

        for block in &period_blocks {
            let detail = &block.detail;
            let start = detail.start_time.with_timezone(&Local).format("%H:%M");
            let end = detail.end_time.with_timezone(&Local).format("%H:%M");
            let emoji = detail
                .emoji
                .as_deref()
                .map(|e| format!("{e} "))
                .unwrap_or_default();
            let note = detail
                .note
                .as_deref()
                .map(|n| format!("  · {n}"))
                .unwrap_or_default();
            let _ = writeln!(
                output,
                "  {start}-{end}  {emoji}{}  ({}){note}",
                detail.label,
                format_duration(detail.duration_minutes * 60)
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use ft_core::{FocusSession, SessionId, SubjectId};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn at(hour: i64, min: i64) -> DateTime<Utc> {
        local_midnight_to_utc(date()) + Duration::minutes(hour * 60 + min)
    }

    fn seed(db: &mut Database) {
        let task = db.find_or_create_task("Write report", at(7, 0)).unwrap();
        db.insert_session(&FocusSession {
            id: SessionId::new("s1").unwrap(),
            subject_id: task.id,
            start_time: at(8, 0),
            end_time: Some(at(9, 30)),
            note: None,
        })
        .unwrap();
    }

    #[test]
    fn timeline_renders_all_three_periods() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        run(&mut output, &db, date()).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Morning    07:00-12:00"));
        assert!(output.contains("Afternoon  13:00-18:00"));
        assert!(output.contains("Evening    18:00-23:00"));
        assert!(output.contains("Write report"));
        assert!(output.contains("(1h 30m)"));
        assert!(output.contains('█'));
    }

    #[test]
    fn empty_day_renders_empty_tracks() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, date()).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(!output.contains('█'));
    }

    #[test]
    fn block_track_covers_expected_slots() {
        // 08:00-09:30 in Morning: left 20% width 30% of a 50-char track is
        // slots 10..25.
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();
        seed(&mut db);

        let sessions = db.list_sessions().unwrap();
        let tasks = db.list_tasks().unwrap();
        let resolver = SubjectResolver::new(&tasks, &[]);
        let views = resolve_sessions(&sessions, &resolver, &[]);
        let blocks = layout_day(&views, local_midnight_to_utc(date()));

        let rendered = format_timeline(date(), &blocks);
        let track_line = rendered
            .lines()
            .find(|l| l.contains('█'))
            .expect("a filled track line");
        let track: Vec<char> = track_line.trim_start().chars().collect();
        assert_eq!(track[9], '·');
        assert_eq!(track[10], '█');
        assert_eq!(track[24], '█');
        assert_eq!(track[25], '·');
    }
}
