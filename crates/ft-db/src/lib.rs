//! Storage layer for the focus tracker.
//!
//! Provides persistence for sessions, tasks, scenes, and tags using
//! `rusqlite`, and implements the core [`SessionLog`] contract on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`. A `Database` instance can be moved between threads but cannot
//! be shared across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.,
//! `2024-01-15T10:30:00Z`). This format matches `chrono::DateTime<Utc>`
//! serialization and ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)
//!
//! An open session has `end_time = NULL`; the single-open-session rule is
//! enforced by the timer, not by a database constraint.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use ft_core::{
    FocusSession, LogError, Scene, SessionId, SessionLog, SessionPatch, SubjectId, Tag, TagId,
    Task, ValidationError,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// No session with the given ID exists.
    #[error("session not found: {0}")]
    SessionNotFound(String),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {record_id}: {timestamp}")]
    TimestampParse {
        record_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates a core type invariant (e.g. an empty ID).
    #[error("invalid record {record_id}: {source}")]
    InvalidRecord {
        record_id: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                color TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS task_tags (
                task_id TEXT NOT NULL,
                tag_id TEXT NOT NULL,
                PRIMARY KEY (task_id, tag_id),
                FOREIGN KEY (task_id) REFERENCES tasks(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS scenes (
                id TEXT PRIMARY KEY,
                emoji TEXT NOT NULL,
                name TEXT NOT NULL,
                is_archived INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS scene_tags (
                scene_id TEXT NOT NULL,
                tag_id TEXT NOT NULL,
                PRIMARY KEY (scene_id, tag_id),
                FOREIGN KEY (scene_id) REFERENCES scenes(id) ON DELETE CASCADE,
                FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
            );

            -- Sessions table: one row per focus interval
            -- start_time/end_time: ISO 8601 (e.g., '2024-01-15T10:30:00Z')
            -- end_time NULL while the session is still running
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                subject_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                note TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_start ON sessions(start_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_subject ON sessions(subject_id);
            ",
        )?;
        Ok(())
    }

    /// Lists all sessions ordered by start time then ID.
    pub fn list_sessions(&self) -> Result<Vec<FocusSession>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, subject_id, start_time, end_time, note
            FROM sessions
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], session_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Inserts a session.
    pub fn insert_session(&mut self, session: &FocusSession) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO sessions (id, subject_id, start_time, end_time, note) VALUES (?, ?, ?, ?, ?)",
            params![
                session.id.as_str(),
                session.subject_id.as_str(),
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                session.note,
            ],
        )?;
        Ok(())
    }

    /// Applies a partial update and returns the stored result.
    pub fn update_session(
        &mut self,
        id: &SessionId,
        patch: &SessionPatch,
    ) -> Result<FocusSession, DbError> {
        let mut session = self.get_session(id)?;
        patch.apply(&mut session);
        self.conn.execute(
            "UPDATE sessions SET start_time = ?, end_time = ?, note = ? WHERE id = ?",
            params![
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                session.note,
                id.as_str(),
            ],
        )?;
        Ok(session)
    }

    /// Deletes a session.
    pub fn delete_session(&mut self, id: &SessionId) -> Result<(), DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?", [id.as_str()])?;
        if deleted == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_session(&self, id: &SessionId) -> Result<FocusSession, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, subject_id, start_time, end_time, note FROM sessions WHERE id = ?",
                [id.as_str()],
                session_row,
            )
            .optional()?
            .ok_or_else(|| DbError::SessionNotFound(id.to_string()))?;
        row.into_session()
    }

    /// Lists all tasks with their tag links, ordered by creation time.
    pub fn list_tasks(&self) -> Result<Vec<Task>, DbError> {
        let links = self.subject_tag_links("task_tags", "task_id")?;
        let mut stmt = self.conn.prepare(
            "SELECT id, title, completed, created_at FROM tasks ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, bool>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;
        let mut tasks = Vec::new();
        for row in rows {
            let (id, title, completed, created_at) = row?;
            let created_at = parse_timestamp(&created_at, &id)?;
            tasks.push(Task {
                tag_ids: links.get(&id).cloned().unwrap_or_default(),
                id: subject_id(id)?,
                title,
                completed,
                created_at,
            });
        }
        Ok(tasks)
    }

    /// Lists all scenes with their tag links, ordered by creation time.
    pub fn list_scenes(&self) -> Result<Vec<Scene>, DbError> {
        let links = self.subject_tag_links("scene_tags", "scene_id")?;
        let mut stmt = self.conn.prepare(
            "SELECT id, emoji, name, is_archived, created_at FROM scenes ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;
        let mut scenes = Vec::new();
        for row in rows {
            let (id, emoji, name, is_archived, created_at) = row?;
            let created_at = parse_timestamp(&created_at, &id)?;
            scenes.push(Scene {
                tag_ids: links.get(&id).cloned().unwrap_or_default(),
                id: subject_id(id)?,
                emoji,
                name,
                is_archived,
                created_at,
            });
        }
        Ok(scenes)
    }

    /// Lists all tags ordered by name.
    pub fn list_tags(&self) -> Result<Vec<Tag>, DbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM tags ORDER BY name ASC, id ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut tags = Vec::new();
        for row in rows {
            let (id, name, color) = row?;
            tags.push(Tag {
                id: TagId::new(id.clone()).map_err(|source| DbError::InvalidRecord {
                    record_id: id,
                    source,
                })?,
                name,
                color,
            });
        }
        Ok(tags)
    }

    /// Inserts a task and its tag links.
    pub fn insert_task(&mut self, task: &Task) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO tasks (id, title, completed, created_at) VALUES (?, ?, ?, ?)",
            params![
                task.id.as_str(),
                task.title,
                task.completed,
                format_timestamp(task.created_at),
            ],
        )?;
        for tag_id in &task.tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?, ?)",
                params![task.id.as_str(), tag_id.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Inserts a scene and its tag links.
    pub fn insert_scene(&mut self, scene: &Scene) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO scenes (id, emoji, name, is_archived, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                scene.id.as_str(),
                scene.emoji,
                scene.name,
                scene.is_archived,
                format_timestamp(scene.created_at),
            ],
        )?;
        for tag_id in &scene.tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO scene_tags (scene_id, tag_id) VALUES (?, ?)",
                params![scene.id.as_str(), tag_id.as_str()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Inserts a tag.
    pub fn insert_tag(&mut self, tag: &Tag) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT INTO tags (id, name, color) VALUES (?, ?, ?)",
            params![tag.id.as_str(), tag.name, tag.color],
        )?;
        Ok(())
    }

    /// Links a tag to a task, ignoring duplicates.
    pub fn add_task_tag(&mut self, task_id: &SubjectId, tag_id: &TagId) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?, ?)",
            params![task_id.as_str(), tag_id.as_str()],
        )?;
        Ok(())
    }

    /// Links a tag to a scene, ignoring duplicates.
    pub fn add_scene_tag(&mut self, scene_id: &SubjectId, tag_id: &TagId) -> Result<(), DbError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO scene_tags (scene_id, tag_id) VALUES (?, ?)",
            params![scene_id.as_str(), tag_id.as_str()],
        )?;
        Ok(())
    }

    /// Marks a task completed or reopened.
    pub fn set_task_completed(&mut self, id: &SubjectId, completed: bool) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE tasks SET completed = ? WHERE id = ?",
            params![completed, id.as_str()],
        )?;
        Ok(())
    }

    /// Archives or unarchives a scene.
    pub fn set_scene_archived(&mut self, id: &SubjectId, archived: bool) -> Result<(), DbError> {
        self.conn.execute(
            "UPDATE scenes SET is_archived = ? WHERE id = ?",
            params![archived, id.as_str()],
        )?;
        Ok(())
    }

    /// Finds a task by title (case-insensitive) or creates one.
    ///
    /// This backs `start <label>` for labels that name no existing subject.
    pub fn find_or_create_task(
        &mut self,
        title: &str,
        now: DateTime<Utc>,
    ) -> Result<Task, DbError> {
        let existing = self
            .conn
            .query_row(
                "SELECT id, title, completed, created_at FROM tasks
                 WHERE title = ? COLLATE NOCASE
                 ORDER BY created_at ASC LIMIT 1",
                [title],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        if let Some((id, title, completed, created_at)) = existing {
            let created_at = parse_timestamp(&created_at, &id)?;
            let tag_ids = self
                .subject_tag_links("task_tags", "task_id")?
                .remove(&id)
                .unwrap_or_default();
            return Ok(Task {
                id: subject_id(id)?,
                title,
                completed,
                tag_ids,
                created_at,
            });
        }

        let task = Task {
            id: subject_id(Uuid::new_v4().to_string())?,
            title: title.to_owned(),
            completed: false,
            tag_ids: Vec::new(),
            created_at: now,
        };
        self.insert_task(&task)?;
        Ok(task)
    }

    fn subject_tag_links(
        &self,
        table: &str,
        key_column: &str,
    ) -> Result<HashMap<String, Vec<TagId>>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {key_column}, tag_id FROM {table} ORDER BY {key_column} ASC, tag_id ASC"
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut links: HashMap<String, Vec<TagId>> = HashMap::new();
        for row in rows {
            let (subject, tag) = row?;
            let tag = TagId::new(tag.clone()).map_err(|source| DbError::InvalidRecord {
                record_id: tag,
                source,
            })?;
            links.entry(subject).or_default().push(tag);
        }
        Ok(links)
    }
}

impl SessionLog for Database {
    fn list(&self) -> Result<Vec<FocusSession>, LogError> {
        self.list_sessions().map_err(storage_error)
    }

    fn append(&mut self, session: FocusSession) -> Result<(), LogError> {
        self.insert_session(&session).map_err(storage_error)
    }

    fn patch(&mut self, id: &SessionId, patch: SessionPatch) -> Result<FocusSession, LogError> {
        self.update_session(id, &patch).map_err(|err| match err {
            DbError::SessionNotFound(_) => LogError::NotFound(id.clone()),
            other => storage_error(other),
        })
    }

    fn remove(&mut self, id: &SessionId) -> Result<(), LogError> {
        self.delete_session(id).map_err(|err| match err {
            DbError::SessionNotFound(_) => LogError::NotFound(id.clone()),
            other => storage_error(other),
        })
    }
}

fn storage_error(err: DbError) -> LogError {
    LogError::Storage(Box::new(err))
}

struct SessionRow {
    id: String,
    subject_id: String,
    start_time: String,
    end_time: Option<String>,
    note: Option<String>,
}

fn session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        start_time: row.get(2)?,
        end_time: row.get(3)?,
        note: row.get(4)?,
    })
}

impl SessionRow {
    fn into_session(self) -> Result<FocusSession, DbError> {
        let start_time = parse_timestamp(&self.start_time, &self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|ts| parse_timestamp(ts, &self.id))
            .transpose()?;
        Ok(FocusSession {
            id: SessionId::new(self.id.clone()).map_err(|source| DbError::InvalidRecord {
                record_id: self.id.clone(),
                source,
            })?,
            subject_id: subject_id(self.subject_id)?,
            start_time,
            end_time,
            note: self.note,
        })
    }
}

fn subject_id(id: String) -> Result<SubjectId, DbError> {
    SubjectId::new(id.clone()).map_err(|source| DbError::InvalidRecord {
        record_id: id,
        source,
    })
}

fn parse_timestamp(timestamp: &str, record_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            record_id: record_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
