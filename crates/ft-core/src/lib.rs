//! Core domain logic for the focus tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer: the single-active-session lifecycle with pause accounting
//! - Subjects: resolving sessions to the Tasks and Scenes they belong to
//! - Timeline: projecting a day's sessions onto fixed period tracks
//! - Stats: range totals, trend buckets, leaderboards, and the year heatmap

pub mod session;
pub mod stats;
pub mod subject;
pub mod timeline;
pub mod timer;
pub mod types;
pub mod view;

pub use session::{FocusSession, LogError, MemoryLog, SessionLog, SessionPatch, active_session};
pub use stats::{
    Bucket, Granularity, HeatmapCell, TotalEntry, YearHeatmap, bucket_by, heatmap_level,
    range_total, round_hours, top_subjects, top_tags, year_heatmap,
};
pub use subject::{Scene, Subject, SubjectNotFound, SubjectResolver, Tag, Task};
pub use timeline::{BlockDetail, Period, TimelineBlock, layout_day};
pub use timer::{TimerController, TimerError, TimerPhase, TimerRuntimeState, edit_times, update_note};
pub use types::{SessionId, SubjectId, TagId, ValidationError};
pub use view::{SessionView, resolve_sessions};
