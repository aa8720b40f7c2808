//! The focus timer: a single-active-session state machine.
//!
//! The controller owns only runtime state (which session is live, pause
//! anchors); the sessions themselves live in a [`SessionLog`]. Elapsed time
//! is never ticked — it is recomputed from the anchors on demand, so callers
//! read it whenever they render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::session::{FocusSession, LogError, SessionLog, SessionPatch, active_session};
use crate::types::{SessionId, SubjectId};

#[derive(Debug, Error)]
pub enum TimerError {
    /// A session is already running or paused.
    #[error("a focus session is already active")]
    AlreadyActive,
    /// The operation needs an active session and there is none.
    #[error("no active focus session")]
    NoActiveSession,
    /// An edit would produce an end time at or before the start time.
    #[error("end time must be after start time")]
    InvalidRange,
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Where the timer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
}

/// The timer's in-memory anchors, serializable so a short-lived frontend can
/// cache them between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRuntimeState {
    pub active_session_id: Option<SessionId>,
    /// Total whole seconds spent paused in completed pause intervals.
    pub paused_accumulated_secs: i64,
    /// Set while a pause is in progress.
    pub pause_started_at: Option<DateTime<Utc>>,
}

/// Drives the session lifecycle: start, pause, resume, stop.
#[derive(Debug, Clone, Default)]
pub struct TimerController {
    state: TimerRuntimeState,
}

impl TimerController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a controller from cached runtime state.
    ///
    /// The cache can outlive the session it points at (the session was
    /// stopped elsewhere, or the log was edited). Any state that does not
    /// match the log's open session is discarded.
    pub fn restore(state: TimerRuntimeState, log: &dyn SessionLog) -> Result<Self, TimerError> {
        let open = active_session(log)?;
        match (&state.active_session_id, &open) {
            (Some(cached), Some(session)) if *cached == session.id => Ok(Self { state }),
            (None, None) => Ok(Self::new()),
            _ => {
                warn!(
                    cached = ?state.active_session_id,
                    open = ?open.as_ref().map(|s| s.id.as_str()),
                    "discarding stale timer state"
                );
                Ok(Self::new())
            }
        }
    }

    #[must_use]
    pub const fn state(&self) -> &TimerRuntimeState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> TimerPhase {
        match (&self.state.active_session_id, &self.state.pause_started_at) {
            (None, _) => TimerPhase::Idle,
            (Some(_), None) => TimerPhase::Running,
            (Some(_), Some(_)) => TimerPhase::Paused,
        }
    }

    /// Starts a new session for `subject_id`.
    ///
    /// Fails with [`TimerError::AlreadyActive`] if this controller has an
    /// active session or the log already holds an open one; the existing
    /// session is left untouched.
    pub fn start(
        &mut self,
        log: &mut dyn SessionLog,
        id: SessionId,
        subject_id: SubjectId,
        now: DateTime<Utc>,
    ) -> Result<FocusSession, TimerError> {
        if self.state.active_session_id.is_some() || active_session(log)?.is_some() {
            return Err(TimerError::AlreadyActive);
        }
        let session = FocusSession {
            id: id.clone(),
            subject_id,
            start_time: now,
            end_time: None,
            note: None,
        };
        log.append(session.clone())?;
        self.state = TimerRuntimeState {
            active_session_id: Some(id),
            paused_accumulated_secs: 0,
            pause_started_at: None,
        };
        Ok(session)
    }

    /// Freezes the elapsed clock. A no-op when already paused or when
    /// nothing is active.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        match self.phase() {
            TimerPhase::Idle | TimerPhase::Paused => Ok(()),
            TimerPhase::Running => {
                self.state.pause_started_at = Some(now);
                Ok(())
            }
        }
    }

    /// Unfreezes the clock, folding the pause interval into the accumulated
    /// total. A no-op when not paused.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        match self.phase() {
            TimerPhase::Idle | TimerPhase::Running => Ok(()),
            TimerPhase::Paused => {
                if let Some(paused_at) = self.state.pause_started_at.take() {
                    self.state.paused_accumulated_secs += (now - paused_at).num_seconds();
                }
                Ok(())
            }
        }
    }

    /// Terminates the active session and resets the controller to idle.
    ///
    /// The stored end time is always the stop instant, even while paused;
    /// pause time is excluded only from the elapsed display, never from the
    /// recorded interval.
    pub fn stop(
        &mut self,
        log: &mut dyn SessionLog,
        now: DateTime<Utc>,
    ) -> Result<FocusSession, TimerError> {
        let id = self
            .state
            .active_session_id
            .clone()
            .ok_or(TimerError::NoActiveSession)?;
        let session = log.patch(
            &id,
            SessionPatch {
                end_time: Some(Some(now)),
                ..SessionPatch::default()
            },
        )?;
        self.state = TimerRuntimeState::default();
        Ok(session)
    }

    /// Focused seconds on the active session: wall time since start, minus
    /// time spent paused, floored to whole seconds. Frozen while paused.
    #[must_use]
    pub fn elapsed_seconds(&self, session: &FocusSession, now: DateTime<Utc>) -> i64 {
        let effective_now = self.state.pause_started_at.unwrap_or(now);
        let elapsed =
            (effective_now - session.start_time).num_seconds() - self.state.paused_accumulated_secs;
        elapsed.max(0)
    }
}

/// Rewrites a stored session's start and end times.
///
/// Rejects `end <= start` without touching the log.
pub fn edit_times(
    log: &mut dyn SessionLog,
    id: &SessionId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<FocusSession, TimerError> {
    if end <= start {
        return Err(TimerError::InvalidRange);
    }
    Ok(log.patch(
        id,
        SessionPatch {
            start_time: Some(start),
            end_time: Some(Some(end)),
            ..SessionPatch::default()
        },
    )?)
}

/// Sets or clears a session's note. Whitespace-only notes clear it.
pub fn update_note(
    log: &mut dyn SessionLog,
    id: &SessionId,
    note: &str,
) -> Result<FocusSession, TimerError> {
    let trimmed = note.trim();
    let value = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    };
    Ok(log.patch(
        id,
        SessionPatch {
            note: Some(value),
            ..SessionPatch::default()
        },
    )?)
}
