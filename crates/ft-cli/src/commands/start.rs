//! Start command for beginning a focus session.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use ft_core::{SessionId, TimerController};
use ft_db::Database;
use uuid::Uuid;

use super::subjects::resolve_or_create;
use crate::runtime;

pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    state_path: &Path,
    label: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let (subject_id, display, created) = resolve_or_create(db, label, now)?;
    if created {
        writeln!(writer, "Created task '{display}'.")?;
    }

    let mut timer = TimerController::restore(runtime::load(state_path), db)?;
    let id = SessionId::new(Uuid::new_v4().to_string())?;
    let session = timer.start(db, id, subject_id, now)?;
    runtime::store(state_path, timer.state())?;

    tracing::debug!(session = session.id.as_str(), "session started");
    writeln!(writer, "Focusing on {display}.")?;
    Ok(())
}
