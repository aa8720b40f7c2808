//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Focus session tracker.
///
/// Tracks focused time against tasks and scenes, and renders daily
/// timelines, trend reports, and a yearly heatmap from the session log.
#[derive(Debug, Parser)]
#[command(name = "ft", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a focus session on a task or scene.
    ///
    /// The label is matched case-insensitively against task titles first,
    /// then scene names. An unknown label creates a new task.
    Start {
        /// Task title or scene name.
        #[arg(num_args = 1.., required = true)]
        label: Vec<String>,
    },

    /// Stop the active focus session.
    Stop,

    /// Pause the active focus session.
    Pause,

    /// Resume a paused focus session.
    Resume,

    /// Show the active session and elapsed time.
    Status,

    /// Record a finished session manually.
    Log {
        /// Task title or scene name.
        #[arg(long)]
        subject: String,

        /// Start of the session, HH:MM local time.
        #[arg(long)]
        start: String,

        /// End of the session, HH:MM local time.
        #[arg(long)]
        end: String,

        /// Day the session took place (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Optional note.
        #[arg(long)]
        note: Option<String>,
    },

    /// Inspect and edit recorded sessions.
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Render the daily timeline.
    Timeline {
        /// Day to render (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Summarize focused time over a period.
    Report(ReportArgs),

    /// Render the yearly focus heatmap.
    Heatmap {
        /// Calendar year (defaults to the current year).
        #[arg(long)]
        year: Option<i32>,

        /// Output JSON instead of the grid.
        #[arg(long)]
        json: bool,
    },

    /// Manage tasks.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage scenes.
    Scene {
        #[command(subcommand)]
        action: SceneAction,
    },

    /// Manage tags.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
}

/// Session management actions.
#[derive(Debug, Subcommand)]
pub enum SessionsAction {
    /// List sessions for a day.
    List {
        /// Day to list (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Rewrite a session's start and end times.
    Edit {
        /// Session ID.
        id: String,

        /// New start, HH:MM local time.
        #[arg(long)]
        start: String,

        /// New end, HH:MM local time.
        #[arg(long)]
        end: String,

        /// Day the times refer to (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a session.
    Delete {
        /// Session ID.
        id: String,
    },

    /// Set or clear a session's note (empty clears).
    Note {
        /// Session ID.
        id: String,

        /// Note text.
        #[arg(default_value = "")]
        note: String,
    },
}

/// Arguments for the report command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report on a single day.
    #[arg(long, conflicts_with_all = ["week", "month", "year"])]
    pub day: bool,

    /// Report on the week containing the reference date (Monday start).
    #[arg(long, conflicts_with_all = ["month", "year"])]
    pub week: bool,

    /// Report on the calendar month.
    #[arg(long, conflicts_with = "year")]
    pub month: bool,

    /// Report on the calendar year.
    #[arg(long)]
    pub year: bool,

    /// Reference date (defaults to today).
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Rank tags instead of subjects.
    #[arg(long)]
    pub by_tag: bool,

    /// Output JSON instead of the formatted report.
    #[arg(long)]
    pub json: bool,
}

/// Task management actions.
#[derive(Debug, Subcommand)]
pub enum TaskAction {
    /// Create a task.
    Add {
        /// Task title.
        #[arg(num_args = 1.., required = true)]
        title: Vec<String>,

        /// Tag names to attach.
        #[arg(long)]
        tag: Vec<String>,
    },

    /// List tasks.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
    },

    /// Mark a task completed.
    Done {
        /// Task ID.
        id: String,
    },
}

/// Scene management actions.
#[derive(Debug, Subcommand)]
pub enum SceneAction {
    /// Create a scene.
    Add {
        /// Scene name.
        #[arg(num_args = 1.., required = true)]
        name: Vec<String>,

        /// Emoji shown on the timeline.
        #[arg(long, default_value = "🎯")]
        emoji: String,

        /// Tag names to attach.
        #[arg(long)]
        tag: Vec<String>,
    },

    /// List scenes.
    List {
        /// Include archived scenes.
        #[arg(long)]
        all: bool,
    },

    /// Archive a scene.
    Archive {
        /// Scene ID.
        id: String,
    },
}

/// Tag management actions.
#[derive(Debug, Subcommand)]
pub enum TagAction {
    /// Create a tag.
    Add {
        /// Tag name.
        name: String,

        /// Hex color, e.g. #F97316.
        #[arg(long, default_value = "#94A3B8")]
        color: String,
    },

    /// List tags.
    List,
}
