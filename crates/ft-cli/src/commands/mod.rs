//! CLI subcommand implementations.

pub mod heatmap;
pub mod log;
pub mod pause;
pub mod report;
pub mod sessions;
pub mod start;
pub mod status;
pub mod stop;
pub mod subjects;
pub mod timeline;
pub mod util;
