//! Resolved session views shared by the timeline and aggregation engines.

use tracing::warn;

use crate::session::FocusSession;
use crate::subject::{Subject, SubjectResolver, Tag};

/// A session joined to its resolved subject and tags.
///
/// Both read engines consume these instead of resolving subjects themselves,
/// so the Task-priority rule is applied exactly once.
#[derive(Debug, Clone)]
pub struct SessionView<'a> {
    pub session: &'a FocusSession,
    pub subject: Subject<'a>,
    pub tags: Vec<&'a Tag>,
}

impl SessionView<'_> {
    #[must_use]
    pub fn label(&self) -> &str {
        self.subject.label()
    }
}

/// Resolves each session against the subject collections.
///
/// Sessions whose subject no longer exists (e.g. a deleted task) are skipped
/// rather than failing the whole view.
#[must_use]
pub fn resolve_sessions<'a>(
    sessions: &'a [FocusSession],
    resolver: &SubjectResolver<'a>,
    tags: &'a [Tag],
) -> Vec<SessionView<'a>> {
    sessions
        .iter()
        .filter_map(|session| match resolver.resolve(&session.subject_id) {
            Ok(subject) => {
                let tags = subject
                    .tag_ids()
                    .iter()
                    .filter_map(|id| tags.iter().find(|t| t.id == *id))
                    .collect();
                Some(SessionView { session, subject, tags })
            }
            Err(_) => {
                warn!(
                    session = session.id.as_str(),
                    subject = session.subject_id.as_str(),
                    "skipping session with unresolvable subject"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Task;
    use crate::types::{SessionId, SubjectId, TagId};
    use chrono::{TimeZone, Utc};

    fn task(id: &str, title: &str, tag_ids: Vec<TagId>) -> Task {
        Task {
            id: SubjectId::new(id).unwrap(),
            title: title.to_owned(),
            completed: false,
            tag_ids,
            created_at: Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap(),
        }
    }

    fn session(id: &str, subject: &str) -> FocusSession {
        FocusSession {
            id: SessionId::new(id).unwrap(),
            subject_id: SubjectId::new(subject).unwrap(),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            end_time: Some(Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap()),
            note: None,
        }
    }

    #[test]
    fn joins_subject_and_tags() {
        let tag = Tag {
            id: TagId::new("deep").unwrap(),
            name: "Deep".to_owned(),
            color: "#F97316".to_owned(),
        };
        let tasks = vec![task("t1", "Write report", vec![tag.id.clone()])];
        let tags = vec![tag];
        let sessions = vec![session("s1", "t1")];
        let resolver = SubjectResolver::new(&tasks, &[]);

        let views = resolve_sessions(&sessions, &resolver, &tags);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].label(), "Write report");
        assert_eq!(views[0].tags[0].name, "Deep");
    }

    #[test]
    fn skips_unresolvable_sessions() {
        let tasks = vec![task("t1", "Write report", Vec::new())];
        let sessions = vec![session("s1", "t1"), session("s2", "deleted-task")];
        let resolver = SubjectResolver::new(&tasks, &[]);

        let views = resolve_sessions(&sessions, &resolver, &[]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].session.id.as_str(), "s1");
    }

    #[test]
    fn unknown_tag_ids_are_dropped() {
        let tasks = vec![task("t1", "Write report", vec![TagId::new("gone").unwrap()])];
        let sessions = vec![session("s1", "t1")];
        let resolver = SubjectResolver::new(&tasks, &[]);

        let views = resolve_sessions(&sessions, &resolver, &[]);
        assert!(views[0].tags.is_empty());
    }
}
