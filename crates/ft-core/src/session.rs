//! Focus session records and the session log contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{SessionId, SubjectId};

/// A single tracked focus interval.
///
/// A session with `end_time = None` is *open* (the timer is still running).
/// At most one session in the log may be open at any time; the timer
/// controller enforces this as a pre-condition on `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: SessionId,
    /// The Task or Scene this time is attributed to.
    pub subject_id: SubjectId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl FocusSession {
    /// Returns true while the session has no end time.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Whole-second duration for a terminated session, `None` while open.
    #[must_use]
    pub fn duration_seconds(&self) -> Option<i64> {
        self.end_time.map(|end| (end - self.start_time).num_seconds())
    }
}

/// A partial update to a stored session.
///
/// `None` leaves the field untouched; the nested `Option` on `end_time` and
/// `note` distinguishes "set to a value" from "clear".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub note: Option<Option<String>>,
}

impl SessionPatch {
    /// Applies the patch to a session in place.
    pub fn apply(&self, session: &mut FocusSession) {
        if let Some(start) = self.start_time {
            session.start_time = start;
        }
        if let Some(end) = self.end_time {
            session.end_time = end;
        }
        if let Some(ref note) = self.note {
            session.note.clone_from(note);
        }
    }
}

/// Errors surfaced by a session log implementation.
#[derive(Debug, Error)]
pub enum LogError {
    /// No session with the given ID exists.
    #[error("session not found: {0}")]
    NotFound(SessionId),
    /// The underlying store failed.
    #[error("session log storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// The ordered collection of focus sessions.
///
/// Persistence is the implementor's concern; the core only requires these
/// four operations. Mutations are all-or-nothing: on error the log is
/// unchanged.
pub trait SessionLog {
    /// Returns all sessions ordered by start time.
    fn list(&self) -> Result<Vec<FocusSession>, LogError>;

    /// Appends a new session.
    fn append(&mut self, session: FocusSession) -> Result<(), LogError>;

    /// Applies a partial update, returning the updated session.
    fn patch(&mut self, id: &SessionId, patch: SessionPatch) -> Result<FocusSession, LogError>;

    /// Deletes a session.
    fn remove(&mut self, id: &SessionId) -> Result<(), LogError>;
}

/// Returns the unique open session, if any.
pub fn active_session(log: &dyn SessionLog) -> Result<Option<FocusSession>, LogError> {
    Ok(log.list()?.into_iter().find(FocusSession::is_open))
}

/// An in-memory session log.
///
/// Reference implementation of the [`SessionLog`] contract; also the fixture
/// used throughout the core tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    sessions: Vec<FocusSession>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sessions(sessions: Vec<FocusSession>) -> Self {
        Self { sessions }
    }
}

impl SessionLog for MemoryLog {
    fn list(&self) -> Result<Vec<FocusSession>, LogError> {
        let mut sessions = self.sessions.clone();
        sessions.sort_by_key(|s| s.start_time);
        Ok(sessions)
    }

    fn append(&mut self, session: FocusSession) -> Result<(), LogError> {
        self.sessions.push(session);
        Ok(())
    }

    fn patch(&mut self, id: &SessionId, patch: SessionPatch) -> Result<FocusSession, LogError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == *id)
            .ok_or_else(|| LogError::NotFound(id.clone()))?;
        patch.apply(session);
        Ok(session.clone())
    }

    fn remove(&mut self, id: &SessionId) -> Result<(), LogError> {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != *id);
        if self.sessions.len() == before {
            return Err(LogError::NotFound(id.clone()));
        }
        Ok(())
    }
}
