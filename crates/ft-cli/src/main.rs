use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ft_cli::commands::{
    heatmap, log, pause, report, sessions, start, status, stop, subjects, timeline,
};
use ft_cli::{Cli, Commands, Config, SceneAction, SessionsAction, TagAction, TaskAction};

/// Open the configured database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<ft_db::Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    ft_db::Database::open(&config.database_path).context("failed to open database")
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut out = std::io::stdout().lock();
    let state_path = config.state_path.clone();
    let now = Utc::now();
    let today = Local::now().date_naive();

    match &cli.command {
        Some(Commands::Start { label }) => {
            let mut db = open_database(&config)?;
            start::run(&mut out, &mut db, &state_path, &label.join(" "), now)?;
        }
        Some(Commands::Stop) => {
            let mut db = open_database(&config)?;
            stop::run(&mut out, &mut db, &state_path, now)?;
        }
        Some(Commands::Pause) => {
            let db = open_database(&config)?;
            pause::pause(&mut out, &db, &state_path, now)?;
        }
        Some(Commands::Resume) => {
            let db = open_database(&config)?;
            pause::resume(&mut out, &db, &state_path, now)?;
        }
        Some(Commands::Status) => {
            let db = open_database(&config)?;
            status::run(&mut out, &db, &state_path, now)?;
        }
        Some(Commands::Log {
            subject,
            start,
            end,
            date,
            note,
        }) => {
            let mut db = open_database(&config)?;
            log::run(
                &mut out,
                &mut db,
                subject,
                date.unwrap_or(today),
                start,
                end,
                note.as_deref(),
                now,
            )?;
        }
        Some(Commands::Sessions { action }) => {
            let mut db = open_database(&config)?;
            match action {
                SessionsAction::List { date } => {
                    sessions::list(&mut out, &db, date.unwrap_or(today))?;
                }
                SessionsAction::Edit {
                    id,
                    start,
                    end,
                    date,
                } => {
                    sessions::edit(&mut out, &mut db, id, date.unwrap_or(today), start, end)?;
                }
                SessionsAction::Delete { id } => sessions::delete(&mut out, &mut db, id)?,
                SessionsAction::Note { id, note } => sessions::note(&mut out, &mut db, id, note)?,
            }
        }
        Some(Commands::Timeline { date }) => {
            let db = open_database(&config)?;
            timeline::run(&mut out, &db, date.unwrap_or(today))?;
        }
        Some(Commands::Report(args)) => {
            let db = open_database(&config)?;
            report::run(&mut out, &db, args, today)?;
        }
        Some(Commands::Heatmap { year, json }) => {
            let db = open_database(&config)?;
            heatmap::run(&mut out, &db, year.unwrap_or_else(|| today.year()), *json)?;
        }
        Some(Commands::Task { action }) => {
            let mut db = open_database(&config)?;
            match action {
                TaskAction::Add { title, tag } => {
                    subjects::task_add(&mut out, &mut db, &title.join(" "), tag, now)?;
                }
                TaskAction::List { all } => subjects::task_list(&mut out, &db, *all)?,
                TaskAction::Done { id } => subjects::task_done(&mut out, &mut db, id)?,
            }
        }
        Some(Commands::Scene { action }) => {
            let mut db = open_database(&config)?;
            match action {
                SceneAction::Add { name, emoji, tag } => {
                    subjects::scene_add(&mut out, &mut db, &name.join(" "), emoji, tag, now)?;
                }
                SceneAction::List { all } => subjects::scene_list(&mut out, &db, *all)?,
                SceneAction::Archive { id } => subjects::scene_archive(&mut out, &mut db, id)?,
            }
        }
        Some(Commands::Tag { action }) => {
            let mut db = open_database(&config)?;
            match action {
                TagAction::Add { name, color } => {
                    subjects::tag_add(&mut out, &mut db, name, color)?;
                }
                TagAction::List => subjects::tag_list(&mut out, &db)?,
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(out)?;
        }
    }

    Ok(())
}
