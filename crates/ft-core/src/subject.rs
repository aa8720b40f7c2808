//! Subjects: the Tasks and Scenes that focus time is attributed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{SubjectId, TagId};

/// A label that can be attached to tasks and scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    /// Hex color, e.g. `#F97316`.
    pub color: String,
}

/// A unit of work that sessions can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: SubjectId,
    pub title: String,
    pub completed: bool,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    pub created_at: DateTime<Utc>,
}

/// A recurring context (e.g. "Deep Work", "Reading") sessions can be
/// attributed to instead of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SubjectId,
    pub emoji: String,
    pub name: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

/// A resolved subject: either a task or a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject<'a> {
    Task(&'a Task),
    Scene(&'a Scene),
}

impl<'a> Subject<'a> {
    #[must_use]
    pub fn id(&self) -> &'a SubjectId {
        match self {
            Self::Task(task) => &task.id,
            Self::Scene(scene) => &scene.id,
        }
    }

    /// The display label: a task's title or a scene's name.
    #[must_use]
    pub fn label(&self) -> &'a str {
        match self {
            Self::Task(task) => &task.title,
            Self::Scene(scene) => &scene.name,
        }
    }

    #[must_use]
    pub fn tag_ids(&self) -> &'a [TagId] {
        match self {
            Self::Task(task) => &task.tag_ids,
            Self::Scene(scene) => &scene.tag_ids,
        }
    }

    #[must_use]
    pub const fn is_scene(&self) -> bool {
        matches!(self, Self::Scene(_))
    }

    #[must_use]
    pub fn emoji(&self) -> Option<&'a str> {
        match self {
            Self::Task(_) => None,
            Self::Scene(scene) => Some(&scene.emoji),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no task or scene with id {0}")]
pub struct SubjectNotFound(pub SubjectId);

/// Looks up subjects across the task and scene collections.
///
/// Tasks and scenes share one ID space. When both collections contain the
/// same ID, the task wins; label lookups follow the same priority.
#[derive(Debug, Clone, Copy)]
pub struct SubjectResolver<'a> {
    tasks: &'a [Task],
    scenes: &'a [Scene],
}

impl<'a> SubjectResolver<'a> {
    #[must_use]
    pub const fn new(tasks: &'a [Task], scenes: &'a [Scene]) -> Self {
        Self { tasks, scenes }
    }

    /// Resolves an ID to its subject, tasks before scenes.
    pub fn resolve(&self, id: &SubjectId) -> Result<Subject<'a>, SubjectNotFound> {
        if let Some(task) = self.tasks.iter().find(|t| t.id == *id) {
            return Ok(Subject::Task(task));
        }
        if let Some(scene) = self.scenes.iter().find(|s| s.id == *id) {
            return Ok(Subject::Scene(scene));
        }
        Err(SubjectNotFound(id.clone()))
    }

    /// Resolves a display label case-insensitively, tasks before scenes.
    ///
    /// Returns the first match in collection order.
    #[must_use]
    pub fn resolve_by_label(&self, label: &str) -> Option<Subject<'a>> {
        if let Some(task) = self
            .tasks
            .iter()
            .find(|t| t.title.eq_ignore_ascii_case(label))
        {
            return Some(Subject::Task(task));
        }
        self.scenes
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(label))
            .map(Subject::Scene)
    }
}
