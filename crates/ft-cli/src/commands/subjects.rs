//! Task, scene, and tag management commands.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use ft_core::{Scene, SubjectId, SubjectResolver, Tag, TagId, Task};
use ft_db::Database;
use uuid::Uuid;

/// Resolves a subject ID or label to an existing subject, or creates a task.
///
/// Returns the subject ID, its display label, and whether a task was
/// created.
pub(crate) fn resolve_or_create(
    db: &mut Database,
    label: &str,
    now: DateTime<Utc>,
) -> Result<(SubjectId, String, bool)> {
    let tasks = db.list_tasks()?;
    let scenes = db.list_scenes()?;
    let resolver = SubjectResolver::new(&tasks, &scenes);
    let found = SubjectId::new(label)
        .ok()
        .and_then(|id| resolver.resolve(&id).ok())
        .or_else(|| resolver.resolve_by_label(label));
    if let Some(subject) = found {
        return Ok((subject.id().clone(), subject.label().to_owned(), false));
    }

    let task = db.find_or_create_task(label, now)?;
    Ok((task.id, task.title, true))
}

fn tag_ids_for(db: &Database, names: &[String]) -> Result<Vec<TagId>> {
    let tags = db.list_tags()?;
    names
        .iter()
        .map(|name| {
            tags.iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .map(|t| t.id.clone())
                .with_context(|| format!("unknown tag '{name}', create it with 'ft tag add'"))
        })
        .collect()
}

fn tag_names(tags: &[Tag], ids: &[TagId]) -> String {
    let names: Vec<&str> = ids
        .iter()
        .filter_map(|id| tags.iter().find(|t| t.id == *id))
        .map(|t| t.name.as_str())
        .collect();
    if names.is_empty() {
        String::new()
    } else {
        format!("  [{}]", names.join(", "))
    }
}

pub fn task_add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    title: &str,
    tags: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let tag_ids = tag_ids_for(db, tags)?;
    let task = Task {
        id: SubjectId::new(Uuid::new_v4().to_string())?,
        title: title.to_owned(),
        completed: false,
        tag_ids,
        created_at: now,
    };
    db.insert_task(&task)?;
    writeln!(writer, "Added task '{}' ({}).", task.title, task.id)?;
    Ok(())
}

pub fn task_list<W: Write>(writer: &mut W, db: &Database, all: bool) -> Result<()> {
    let tags = db.list_tags()?;
    let tasks = db.list_tasks()?;
    let mut shown = 0;
    for task in tasks {
        if task.completed && !all {
            continue;
        }
        let marker = if task.completed { "x" } else { " " };
        writeln!(
            writer,
            "[{marker}] {}  {}{}",
            task.id,
            task.title,
            tag_names(&tags, &task.tag_ids)
        )?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(writer, "No tasks.")?;
    }
    Ok(())
}

pub fn task_done<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = SubjectId::new(id)?;
    if !db.list_tasks()?.iter().any(|t| t.id == id) {
        bail!("no task with id {id}");
    }
    db.set_task_completed(&id, true)?;
    writeln!(writer, "Completed task {id}.")?;
    Ok(())
}

pub fn scene_add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    emoji: &str,
    tags: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let tag_ids = tag_ids_for(db, tags)?;
    let scene = Scene {
        id: SubjectId::new(Uuid::new_v4().to_string())?,
        emoji: emoji.to_owned(),
        name: name.to_owned(),
        tag_ids,
        is_archived: false,
        created_at: now,
    };
    db.insert_scene(&scene)?;
    writeln!(writer, "Added scene {} {} ({}).", scene.emoji, scene.name, scene.id)?;
    Ok(())
}

pub fn scene_list<W: Write>(writer: &mut W, db: &Database, all: bool) -> Result<()> {
    let tags = db.list_tags()?;
    let scenes = db.list_scenes()?;
    let mut shown = 0;
    for scene in scenes {
        if scene.is_archived && !all {
            continue;
        }
        let marker = if scene.is_archived { " (archived)" } else { "" };
        writeln!(
            writer,
            "{} {}  {}{}{}",
            scene.emoji,
            scene.id,
            scene.name,
            tag_names(&tags, &scene.tag_ids),
            marker
        )?;
        shown += 1;
    }
    if shown == 0 {
        writeln!(writer, "No scenes.")?;
    }
    Ok(())
}

pub fn scene_archive<W: Write>(writer: &mut W, db: &mut Database, id: &str) -> Result<()> {
    let id = SubjectId::new(id)?;
    if !db.list_scenes()?.iter().any(|s| s.id == id) {
        bail!("no scene with id {id}");
    }
    db.set_scene_archived(&id, true)?;
    writeln!(writer, "Archived scene {id}.")?;
    Ok(())
}

pub fn tag_add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    color: &str,
) -> Result<()> {
    if db
        .list_tags()?
        .iter()
        .any(|t| t.name.eq_ignore_ascii_case(name))
    {
        bail!("tag '{name}' already exists");
    }
    let tag = Tag {
        id: TagId::new(Uuid::new_v4().to_string())?,
        name: name.to_owned(),
        color: color.to_owned(),
    };
    db.insert_tag(&tag)?;
    writeln!(writer, "Added tag '{}' ({}).", tag.name, tag.color)?;
    Ok(())
}

pub fn tag_list<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let tags = db.list_tags()?;
    if tags.is_empty() {
        writeln!(writer, "No tags.")?;
        return Ok(());
    }
    for tag in tags {
        writeln!(writer, "{}  {}", tag.name, tag.color)?;
    }
    Ok(())
}
