//! Pause and resume commands for the active focus session.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use ft_core::{TimerController, TimerPhase, active_session};
use ft_db::Database;

use super::util::format_clock;
use crate::runtime;

pub fn pause<W: Write>(
    writer: &mut W,
    db: &Database,
    state_path: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut timer = TimerController::restore(runtime::load(state_path), db)?;
    if timer.phase() == TimerPhase::Idle {
        writeln!(writer, "No active focus session.")?;
        return Ok(());
    }
    timer.pause(now)?;
    runtime::store(state_path, timer.state())?;

    let elapsed = active_session(db)?
        .map(|session| timer.elapsed_seconds(&session, now))
        .unwrap_or(0);
    writeln!(writer, "Paused at {}.", format_clock(elapsed))?;
    Ok(())
}

pub fn resume<W: Write>(
    writer: &mut W,
    db: &Database,
    state_path: &Path,
    now: DateTime<Utc>,
) -> Result<()> {
    let mut timer = TimerController::restore(runtime::load(state_path), db)?;
    if timer.phase() == TimerPhase::Idle {
        writeln!(writer, "No active focus session.")?;
        return Ok(());
    }
    timer.resume(now)?;
    runtime::store(state_path, timer.state())?;
    writeln!(writer, "Resumed.")?;
    Ok(())
}
