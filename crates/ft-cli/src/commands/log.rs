//! Log command for recording a finished session manually.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use ft_core::{FocusSession, SessionId};
use ft_db::Database;
use uuid::Uuid;

use super::subjects::resolve_or_create;
use super::util::{format_duration, parse_local_time};

#[allow(clippy::too_many_arguments)]
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    subject: &str,
    date: NaiveDate,
    start: &str,
    end: &str,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()> {
    let start_time = parse_local_time(date, start)?;
    let end_time = parse_local_time(date, end)?;
    if end_time <= start_time {
        bail!("end time must be after start time");
    }

    let (subject_id, display, created) = resolve_or_create(db, subject, now)?;
    if created {
        writeln!(writer, "Created task '{display}'.")?;
    }

    let note = note.map(str::trim).filter(|n| !n.is_empty()).map(str::to_owned);
    let session = FocusSession {
        id: SessionId::new(Uuid::new_v4().to_string())?,
        subject_id,
        start_time,
        end_time: Some(end_time),
        note,
    };
    db.insert_session(&session)?;

    let duration = session.duration_seconds().unwrap_or(0);
    writeln!(
        writer,
        "Logged {} on {display} ({}).",
        format_duration(duration),
        session.id
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 20, 0, 0).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn log_records_terminated_session() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            &mut db,
            "Write report",
            date(),
            "09:00",
            "10:30",
            Some("first draft"),
            now(),
        )
        .unwrap();

        let sessions = db.list_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration_seconds(), Some(90 * 60));
        assert_eq!(sessions[0].note.as_deref(), Some("first draft"));
        assert!(String::from_utf8(output).unwrap().contains("Logged 1h 30m"));
    }

    #[test]
    fn log_rejects_inverted_range() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        let err = run(
            &mut output,
            &mut db,
            "Write report",
            date(),
            "10:00",
            "10:00",
            None,
            now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("end time must be after start time"));
        assert!(db.list_sessions().unwrap().is_empty());
    }

    #[test]
    fn blank_note_is_dropped() {
        let temp = tempfile::tempdir().unwrap();
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            &mut db,
            "Write report",
            date(),
            "09:00",
            "09:30",
            Some("   "),
            now(),
        )
        .unwrap();
        assert_eq!(db.list_sessions().unwrap()[0].note, None);
    }
}
