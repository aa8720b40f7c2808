//! Session inspection and editing commands.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDate};
use ft_core::{SessionId, SessionLog, SubjectResolver, edit_times, update_note};
use ft_db::Database;

use super::util::{format_duration, local_midnight_to_utc, parse_local_time};

pub fn list<W: Write>(writer: &mut W, db: &Database, date: NaiveDate) -> Result<()> {
    let day_start = local_midnight_to_utc(date);
    let day_end = day_start + Duration::hours(24);

    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);

    let sessions: Vec<_> = db
        .list_sessions()?
        .into_iter()
        .filter(|s| s.start_time >= day_start && s.start_time < day_end)
        .collect();
    if sessions.is_empty() {
        writeln!(writer, "No sessions on {date}.")?;
        return Ok(());
    }

    for session in sessions {
        let label = resolver
            .resolve(&session.subject_id)
            .map_or_else(|_| session.subject_id.to_string(), |s| s.label().to_owned());
        let start = session.start_time.with_timezone(&Local).format("%H:%M");
        let (end, duration) = match session.end_time {
            Some(end) => (
                end.with_timezone(&Local).format("%H:%M").to_string(),
                format_duration((end - session.start_time).num_seconds()),
            ),
            None => ("--:--".to_string(), "running".to_string()),
        };
        let note = session
            .note
            .as_deref()
            .map(|n| format!("  · {n}"))
            .unwrap_or_default();
        writeln!(
            writer,
            "{}  {start}-{end}  {duration:>7}  {label}{note}",
            session.id
        )?;
    }
    Ok(())
}

pub fn edit<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    date: NaiveDate,
    start: &str,
    end: &str,
) -> Result<()> {
    let id = SessionId::new(id)?;
    let start = parse_local_time(date, start)?;
    let end = parse_local_time(date, end)?;
    let session = edit_times(db, &id, start, end).context("failed to edit session")?;

    let duration = session.duration_seconds().unwrap_or(0);
    writeln!(writer, "Updated {id} ({}).", format_duration(duration))?;
    Ok(())
}

pub fn delete<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = SessionId::new(id)?;
    SessionLog::remove(db, &id)?;
    writeln!(writer, "Deleted {id}.")?;
    Ok(())
}

pub fn note<W: Write>(writer: &mut W, db: &mut Database, id: &str, text: &str) -> Result<()> {
    let id = SessionId::new(id)?;
    let session = update_note(db, &id, text)?;
    match &session.note {
        Some(note) => writeln!(writer, "Note on {id}: {note}")?,
        None => writeln!(writer, "Cleared note on {id}.")?,
    }
    Ok(())
}
