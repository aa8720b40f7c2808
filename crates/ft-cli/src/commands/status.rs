//! Status command for showing the active session and elapsed time.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use ft_core::{SubjectResolver, TimerController, TimerPhase, active_session};
use ft_db::Database;

use super::util::format_clock;
use crate::runtime;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    state_path: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let timer = TimerController::restore(runtime::load(state_path), db)?;
    let Some(session) = active_session(db)? else {
        writeln!(writer, "No active focus session.")?;
        return Ok(());
    };

    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);
    let label = resolver
        .resolve(&session.subject_id)
        .map_or_else(|_| session.subject_id.to_string(), |s| s.label().to_owned());

    let phase = match timer.phase() {
        TimerPhase::Paused => "paused",
        // A lost cache still shows the open session as running.
        TimerPhase::Running | TimerPhase::Idle => "running",
    };
    let elapsed = timer.elapsed_seconds(&session, now);
    let started = session.start_time.with_timezone(&Local);

    writeln!(writer, "Focusing on {label} ({phase})")?;
    writeln!(writer, "Elapsed: {}", format_clock(elapsed))?;
    writeln!(writer, "Started: {}", started.format("%H:%M"))?;
    if let Some(note) = &session.note {
        writeln!(writer, "Note: {note}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn status_reports_idle() {
        let temp = tempfile::tempdir().unwrap();
        let db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &temp.path().join("timer.json"), now()).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "No active focus session.\n");
    }

    #[test]
    fn status_shows_elapsed_with_pause_excluded() {
        let temp = tempfile::tempdir().unwrap();
        let state_path = temp.path().join("timer.json");
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut sink = Vec::new();
        super::super::start::run(&mut sink, &mut db, &state_path, "Deep work", now()).unwrap();
        super::super::pause::pause(&mut sink, &db, &state_path, now() + Duration::seconds(30))
            .unwrap();
        super::super::pause::resume(&mut sink, &db, &state_path, now() + Duration::seconds(40))
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &state_path, now() + Duration::seconds(60)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Focusing on Deep work (running)"));
        assert!(output.contains("Elapsed: 00:00:50"));
    }
}
