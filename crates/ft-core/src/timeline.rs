//! Daily timeline layout: sessions projected onto three fixed periods.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::types::SessionId;
use crate::view::SessionView;

/// Block color for scene-attributed sessions.
pub const SCENE_COLOR: &str = "#A855F7";
/// Block color when the subject has no tags.
pub const NEUTRAL_COLOR: &str = "#94A3B8";

/// Minimum rendered block width, in percent of the period track.
const MIN_WIDTH_PCT: f64 = 0.5;
/// At or above this width the block carries its full label.
const FULL_LABEL_PCT: f64 = 5.0;
/// At or above this width (but below full) the block carries two characters.
const SHORT_LABEL_PCT: f64 = 2.0;

/// The three fixed tracks of the daily timeline, as half-open hour ranges.
///
/// The 12:00-13:00 hour belongs to no period; sessions there simply do not
/// render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    pub const ALL: [Self; 3] = [Self::Morning, Self::Afternoon, Self::Evening];

    /// Hour bounds `[start, end)` relative to the day start.
    #[must_use]
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Morning => (7.0, 12.0),
            Self::Afternoon => (13.0, 18.0),
            Self::Evening => (18.0, 23.0),
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

/// Tooltip payload carried by each block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockDetail {
    pub session_id: SessionId,
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub note: Option<String>,
    pub tag_names: Vec<String>,
    pub emoji: Option<String>,
    pub is_scene: bool,
}

/// One rendered segment of a session within a period track.
///
/// Overlapping sessions produce overlapping blocks; nothing is merged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineBlock {
    pub period: Period,
    /// Offset from the period's left edge, percent.
    pub left_pct: f64,
    /// Width within the period, percent.
    pub width_pct: f64,
    /// Hex fill color.
    pub color: String,
    /// Inline label, already truncated per the width policy.
    pub label: Option<String>,
    pub detail: BlockDetail,
}

fn block_color(view: &SessionView<'_>) -> String {
    if view.subject.is_scene() {
        SCENE_COLOR.to_owned()
    } else if let Some(tag) = view.tags.first() {
        tag.color.clone()
    } else {
        NEUTRAL_COLOR.to_owned()
    }
}

fn block_label(full: &str, width_pct: f64) -> Option<String> {
    if width_pct >= FULL_LABEL_PCT {
        Some(full.to_owned())
    } else if width_pct >= SHORT_LABEL_PCT {
        Some(full.chars().take(2).collect())
    } else {
        None
    }
}

/// Lays out one day's terminated sessions onto the three period tracks.
///
/// `day_start` is the wall-clock midnight of the day being rendered,
/// expressed in UTC; sessions starting within the following 24 hours are
/// considered. A session spanning several periods yields one block per
/// period it touches.
#[must_use]
pub fn layout_day(views: &[SessionView<'_>], day_start: DateTime<Utc>) -> Vec<TimelineBlock> {
    let day_end = day_start + Duration::hours(24);
    let mut blocks = Vec::new();

    for view in views {
        let session = view.session;
        let Some(end_time) = session.end_time else {
            continue;
        };
        if session.start_time < day_start || session.start_time >= day_end {
            continue;
        }

        let start_h = hour_fraction(session.start_time, day_start);
        let end_h = hour_fraction(end_time, day_start);

        for period in Period::ALL {
            let (p_start, p_end) = period.bounds();
            let clip_start = start_h.max(p_start);
            let clip_end = end_h.min(p_end);
            if clip_end <= clip_start {
                continue;
            }

            let track_hours = p_end - p_start;
            let left_pct = (clip_start - p_start) / track_hours * 100.0;
            let width_pct = ((clip_end - clip_start) / track_hours * 100.0).max(MIN_WIDTH_PCT);

            blocks.push(TimelineBlock {
                period,
                left_pct,
                width_pct,
                color: block_color(view),
                label: block_label(view.label(), width_pct),
                detail: BlockDetail {
                    session_id: session.id.clone(),
                    label: view.label().to_owned(),
                    start_time: session.start_time,
                    end_time,
                    duration_minutes: (end_time - session.start_time).num_minutes(),
                    note: session.note.clone(),
                    tag_names: view.tags.iter().map(|t| t.name.clone()).collect(),
                    emoji: view.subject.emoji().map(str::to_owned),
                    is_scene: view.subject.is_scene(),
                },
            });
        }
    }

    blocks.sort_by(|a, b| {
        a.period
            .cmp(&b.period)
            .then(a.left_pct.partial_cmp(&b.left_pct).unwrap_or(std::cmp::Ordering::Equal))
    });
    blocks
}

fn hour_fraction(t: DateTime<Utc>, day_start: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let secs = (t - day_start).num_seconds() as f64;
    secs / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FocusSession;
    use crate::subject::{Scene, Subject, SubjectResolver, Tag, Task};
    use crate::types::{SubjectId, TagId};
    use crate::view::resolve_sessions;
    use chrono::TimeZone;

    fn day_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        day_start() + Duration::minutes(i64::from(hour) * 60 + i64::from(min))
    }

    fn session(id: &str, subject: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> FocusSession {
        FocusSession {
            id: crate::types::SessionId::new(id).unwrap(),
            subject_id: SubjectId::new(subject).unwrap(),
            start_time: start,
            end_time: Some(end),
            note: None,
        }
    }

    fn task(id: &str, title: &str, tag_ids: Vec<TagId>) -> Task {
        Task {
            id: SubjectId::new(id).unwrap(),
            title: title.to_owned(),
            completed: false,
            tag_ids,
            created_at: day_start(),
        }
    }

    fn views<'a>(
        sessions: &'a [FocusSession],
        tasks: &'a [Task],
        scenes: &'a [Scene],
        tags: &'a [Tag],
    ) -> Vec<crate::view::SessionView<'a>> {
        let resolver = SubjectResolver::new(tasks, scenes);
        resolve_sessions(sessions, &resolver, tags)
    }

    #[test]
    fn block_geometry_within_one_period() {
        let tasks = vec![task("t1", "Write report", Vec::new())];
        // 08:00-09:30 in Morning [7,12): left 20%, width 30%.
        let sessions = vec![session("s1", "t1", at(8, 0), at(9, 30))];
        let v = views(&sessions, &tasks, &[], &[]);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.period, Period::Morning);
        assert!((b.left_pct - 20.0).abs() < 1e-9);
        assert!((b.width_pct - 30.0).abs() < 1e-9);
        assert_eq!(b.label.as_deref(), Some("Write report"));
        assert_eq!(b.color, NEUTRAL_COLOR);
        assert_eq!(b.detail.duration_minutes, 90);
    }

    #[test]
    fn session_over_gap_clips_to_morning_only() {
        let tasks = vec![task("t1", "Write report", Vec::new())];
        // 11:45-12:15: only the 11:45-12:00 slice is inside a period.
        let sessions = vec![session("s1", "t1", at(11, 45), at(12, 15))];
        let v = views(&sessions, &tasks, &[], &[]);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!(b.period, Period::Morning);
        assert!((b.left_pct - 95.0).abs() < 1e-9);
        assert!((b.width_pct - 5.0).abs() < 1e-9);
    }

    #[test]
    fn session_spanning_periods_yields_one_block_each() {
        let tasks = vec![task("t1", "Long haul", Vec::new())];
        // 16:00-20:00 touches Afternoon and Evening.
        let sessions = vec![session("s1", "t1", at(16, 0), at(20, 0))];
        let v = views(&sessions, &tasks, &[], &[]);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].period, Period::Afternoon);
        assert!((blocks[0].left_pct - 60.0).abs() < 1e-9);
        assert!((blocks[0].width_pct - 40.0).abs() < 1e-9);
        assert_eq!(blocks[1].period, Period::Evening);
        assert!((blocks[1].left_pct - 0.0).abs() < 1e-9);
        assert!((blocks[1].width_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn overlapping_sessions_are_not_merged() {
        let tasks = vec![task("t1", "First", Vec::new()), task("t2", "Second", Vec::new())];
        let sessions = vec![
            session("s1", "t1", at(9, 0), at(10, 0)),
            session("s2", "t2", at(9, 30), at(10, 30)),
        ];
        let v = views(&sessions, &tasks, &[], &[]);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks.len(), 2);
        // Sorted left-to-right within the period.
        assert!(blocks[0].left_pct < blocks[1].left_pct);
    }

    #[test]
    fn open_sessions_are_excluded() {
        let tasks = vec![task("t1", "Open", Vec::new())];
        let sessions = vec![FocusSession {
            end_time: None,
            ..session("s1", "t1", at(9, 0), at(10, 0))
        }];
        let v = views(&sessions, &tasks, &[], &[]);
        assert!(layout_day(&v, day_start()).is_empty());
    }

    #[test]
    fn label_policy_by_width() {
        let tasks = vec![task("t1", "Deep work", Vec::new())];
        // 15 min in a 5h track = 5% → full label.
        let full = vec![session("s1", "t1", at(8, 0), at(8, 15))];
        // 9 min = 3% → two characters.
        let short = vec![session("s2", "t1", at(8, 0), at(8, 9))];
        // 3 min = 1% → no label.
        let none = vec![session("s3", "t1", at(8, 0), at(8, 3))];

        let v = views(&full, &tasks, &[], &[]);
        assert_eq!(layout_day(&v, day_start())[0].label.as_deref(), Some("Deep work"));

        let v = views(&short, &tasks, &[], &[]);
        assert_eq!(layout_day(&v, day_start())[0].label.as_deref(), Some("De"));

        let v = views(&none, &tasks, &[], &[]);
        assert_eq!(layout_day(&v, day_start())[0].label, None);
    }

    #[test]
    fn tiny_blocks_keep_minimum_width() {
        let tasks = vec![task("t1", "Blip", Vec::new())];
        // 10 seconds wide.
        let sessions = vec![session("s1", "t1", at(8, 0), at(8, 0) + Duration::seconds(10))];
        let v = views(&sessions, &tasks, &[], &[]);

        let blocks = layout_day(&v, day_start());
        assert!((blocks[0].width_pct - MIN_WIDTH_PCT).abs() < 1e-9);
    }

    #[test]
    fn color_priority_scene_then_tag_then_neutral() {
        let tag = Tag {
            id: TagId::new("deep").unwrap(),
            name: "Deep".to_owned(),
            color: "#F97316".to_owned(),
        };
        let tasks = vec![
            task("tagged", "Tagged", vec![tag.id.clone()]),
            task("plain", "Plain", Vec::new()),
        ];
        let scenes = vec![Scene {
            id: SubjectId::new("scene-1").unwrap(),
            emoji: "📚".to_owned(),
            name: "Reading".to_owned(),
            tag_ids: vec![tag.id.clone()],
            is_archived: false,
            created_at: day_start(),
        }];
        let tags = vec![tag];
        let sessions = vec![
            session("s1", "scene-1", at(8, 0), at(9, 0)),
            session("s2", "tagged", at(9, 0), at(10, 0)),
            session("s3", "plain", at(10, 0), at(11, 0)),
        ];
        let v = views(&sessions, &tasks, &scenes, &tags);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks[0].color, SCENE_COLOR);
        assert_eq!(blocks[0].detail.emoji.as_deref(), Some("📚"));
        assert_eq!(blocks[1].color, "#F97316");
        assert_eq!(blocks[2].color, NEUTRAL_COLOR);
    }

    #[test]
    fn sessions_outside_the_day_are_skipped() {
        let tasks = vec![task("t1", "Elsewhere", Vec::new())];
        let sessions = vec![session(
            "s1",
            "t1",
            day_start() - Duration::hours(2),
            day_start() - Duration::hours(1),
        )];
        let v = views(&sessions, &tasks, &[], &[]);
        assert!(layout_day(&v, day_start()).is_empty());
    }

    #[test]
    fn subject_labels_come_from_resolution() {
        let tasks = vec![task("shared", "Task wins", Vec::new())];
        let scenes = vec![Scene {
            id: SubjectId::new("shared").unwrap(),
            emoji: "🎯".to_owned(),
            name: "Scene loses".to_owned(),
            tag_ids: Vec::new(),
            is_archived: false,
            created_at: day_start(),
        }];
        let sessions = vec![session("s1", "shared", at(8, 0), at(9, 0))];
        let v = views(&sessions, &tasks, &scenes, &[]);

        let blocks = layout_day(&v, day_start());
        assert_eq!(blocks[0].detail.label, "Task wins");
        assert!(!blocks[0].detail.is_scene);
        assert!(matches!(v[0].subject, Subject::Task(_)));
    }
}
