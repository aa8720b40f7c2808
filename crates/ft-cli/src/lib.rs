//! Focus tracker CLI library.
//!
//! This crate provides the CLI interface for the focus session tracker.

mod cli;
pub mod commands;
mod config;
pub mod runtime;

pub use cli::{
    Cli, Commands, ReportArgs, SceneAction, SessionsAction, TagAction, TaskAction,
};
pub use config::Config;
