//! Stop command for terminating the active focus session.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use ft_core::{SubjectResolver, TimerController};
use ft_db::Database;

use super::util::format_duration;
use crate::runtime;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    state_path: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut timer = TimerController::restore(runtime::load(state_path), db)?;
    let session = timer.stop(db, now)?;
    runtime::clear(state_path)?;

    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);
    let label = resolver
        .resolve(&session.subject_id)
        .map_or_else(|_| session.subject_id.to_string(), |s| s.label().to_owned());

    let duration = session.duration_seconds().unwrap_or(0);
    writeln!(writer, "Stopped {label} after {}.", format_duration(duration))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use ft_core::active_session;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn stop_closes_session_and_clears_cache() {
        let temp = tempfile::tempdir().unwrap();
        let state_path = temp.path().join("timer.json");
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        super::super::start::run(&mut output, &mut db, &state_path, "Write report", now())
            .unwrap();

        let mut output = Vec::new();
        run(&mut output, &mut db, &state_path, now() + Duration::minutes(90)).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Stopped Write report after 1h 30m."));
        assert!(active_session(&db).unwrap().is_none());
        assert!(!state_path.exists());
    }

    #[test]
    fn stop_without_active_session_fails() {
        let temp = tempfile::tempdir().unwrap();
        let state_path = temp.path().join("timer.json");
        let mut db = Database::open(&temp.path().join("ft.db")).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut db, &state_path, now()).unwrap_err();
        assert!(err.to_string().contains("no active focus session"));
    }
}
