//! Timer runtime-state cache.
//!
//! The timer keeps its anchors (active session, pause bookkeeping) in
//! memory; the CLI is a short-lived process, so it caches that state as JSON
//! between invocations. The cache lives at the configured `state_path` and
//! is advisory: `TimerController::restore` discards anything that no longer
//! matches the session log.

use std::path::Path;

use anyhow::{Context, Result};
use ft_core::TimerRuntimeState;

/// Loads the cached timer state, or an idle state if none is cached.
///
/// An unreadable cache is treated as idle rather than failing the command;
/// the restore step re-validates against the log anyway.
pub fn load(path: &Path) -> TimerRuntimeState {
    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring corrupt timer state");
                TimerRuntimeState::default()
            }
        },
        Err(_) => TimerRuntimeState::default(),
    }
}

/// Writes the timer state to the cache file.
pub fn store(path: &Path, state: &TimerRuntimeState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Removes the cache file; missing files are fine.
pub fn clear(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}
