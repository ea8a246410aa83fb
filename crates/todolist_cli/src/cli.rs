use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use todolist_core::{
    all_lists_export_file_name, format_relative, list_export_file_name, DocumentStore,
    ListService, RenameOutcome, RenamePlan, ServiceError, Task, TaskId, TaskService,
    TransferService,
};

/// Characters of a task id shown in listings and accepted as a prefix.
const SHORT_ID_CHARS: usize = 8;

#[derive(Parser)]
#[command(name = "todolist")]
#[command(about = "Named to-do lists with import and export")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show every list with its progress
    Lists,
    /// Create an empty list
    Create { name: String },
    /// Rename a list, merging into an existing one after confirmation
    Rename {
        old: String,
        new: String,
        /// Merge without asking
        #[arg(long)]
        yes: bool,
    },
    /// Delete a list and all its tasks
    Delete {
        name: String,
        /// Delete without asking
        #[arg(long)]
        yes: bool,
    },
    /// Show the tasks of one list
    Show { list: String },
    /// Append a task to a list
    Add { list: String, text: String },
    /// Toggle a task between open and completed
    Toggle {
        list: String,
        /// Task id or a unique prefix of it
        id: String,
    },
    /// Replace the text of a task
    Edit {
        list: String,
        id: String,
        text: String,
    },
    /// Remove a task
    Remove { list: String, id: String },
    /// Write one list to a JSON file
    Export {
        list: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Write every list to a JSON file
    ExportAll {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Import lists from a JSON export
    Import {
        file: PathBuf,
        /// Replace the tasks of this existing list instead
        #[arg(long)]
        into: Option<String>,
        /// Replace existing lists without asking
        #[arg(long)]
        yes: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Lists => "lists",
            Self::Create { .. } => "create",
            Self::Rename { .. } => "rename",
            Self::Delete { .. } => "delete",
            Self::Show { .. } => "show",
            Self::Add { .. } => "add",
            Self::Toggle { .. } => "toggle",
            Self::Edit { .. } => "edit",
            Self::Remove { .. } => "remove",
            Self::Export { .. } => "export",
            Self::ExportAll { .. } => "export_all",
            Self::Import { .. } => "import",
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("No task in '{list}' matches id '{input}'")]
    UnknownTask { list: String, input: String },
    #[error("Id '{input}' matches {matches} tasks in '{list}'; use more characters")]
    AmbiguousTask {
        list: String,
        input: String,
        matches: usize,
    },
    #[error("Failed to access {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode export: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs one command against `store`, prompting on `input` and reporting on `out`.
pub fn run<S, I, O>(command: Commands, store: &S, input: &mut I, out: &mut O) -> Result<(), CliError>
where
    S: DocumentStore,
    I: BufRead,
    O: Write,
{
    let command_name = command.name();
    let lists = ListService::new(store);
    let tasks = TaskService::new(store);
    let transfer = TransferService::new(store);

    match command {
        Commands::Lists => handle_lists(&lists, out)?,
        Commands::Create { name } => {
            let name = lists.create(&name)?;
            writeln!(out, "Created list '{name}'")?;
        }
        Commands::Rename { old, new, yes } => handle_rename(&lists, &old, &new, yes, input, out)?,
        Commands::Delete { name, yes } => handle_delete(&lists, &name, yes, input, out)?,
        Commands::Show { list } => handle_show(&lists, &tasks, &list, out)?,
        Commands::Add { list, text } => {
            let task = tasks.append(&list, &text)?;
            writeln!(out, "Added {} to '{list}'", short_id(&task.id))?;
        }
        Commands::Toggle { list, id } => {
            let id = resolve_task_id(&lists.get(&list)?, &list, &id)?;
            let outcome = tasks.toggle_complete(&list, id)?;
            let state = if outcome.task.completed { "completed" } else { "reopened" };
            writeln!(out, "{} {state}: {}", short_id(&id), outcome.task.text)?;
            if outcome.list_completed {
                writeln!(out, "Every task in '{list}' is done.")?;
            }
        }
        Commands::Edit { list, id, text } => {
            let id = resolve_task_id(&lists.get(&list)?, &list, &id)?;
            let task = tasks.edit(&list, id, &text)?;
            writeln!(out, "{} updated: {}", short_id(&id), task.text)?;
        }
        Commands::Remove { list, id } => {
            let id = resolve_task_id(&lists.get(&list)?, &list, &id)?;
            let task = tasks.remove(&list, id)?;
            writeln!(out, "Removed {}: {}", short_id(&id), task.text)?;
        }
        Commands::Export { list, out: dir } => {
            let json = transfer.export_list(&list)?.to_json_pretty()?;
            let path = dir.join(list_export_file_name(&list, Utc::now().date_naive()));
            write_file(&path, &json)?;
            writeln!(out, "Exported '{list}' to {}", path.display())?;
        }
        Commands::ExportAll { out: dir } => {
            let export = transfer.export_all()?;
            let path = dir.join(all_lists_export_file_name(Utc::now().date_naive()));
            write_file(&path, &export.to_json_pretty()?)?;
            writeln!(
                out,
                "Exported {} lists ({} tasks) to {}",
                export.total_lists,
                export.total_tasks,
                path.display()
            )?;
        }
        Commands::Import { file, into, yes } => {
            handle_import(&transfer, &file, into.as_deref(), yes, input, out)?
        }
    }

    info!("event=cli_command module=cli status=ok command={command_name}");
    Ok(())
}

fn handle_lists<S: DocumentStore, O: Write>(
    lists: &ListService<S>,
    out: &mut O,
) -> Result<(), CliError> {
    let summaries = lists.list()?;
    if summaries.is_empty() {
        writeln!(out, "No lists yet. Create one with `todolist create <name>`.")?;
        return Ok(());
    }
    for summary in summaries {
        let marker = if summary.is_complete { " (done)" } else { "" };
        writeln!(
            out,
            "{}  {}/{}  {}%{marker}",
            summary.name, summary.completed_count, summary.task_count, summary.percentage
        )?;
    }
    Ok(())
}

fn handle_show<S: DocumentStore, O: Write>(
    lists: &ListService<S>,
    tasks: &TaskService<S>,
    list: &str,
    out: &mut O,
) -> Result<(), CliError> {
    let entries = lists.get(list)?;
    let progress = tasks.progress(list)?;
    writeln!(
        out,
        "{list}: {}/{} done ({}%)",
        progress.completed_count, progress.task_count, progress.percentage
    )?;
    if entries.is_empty() {
        writeln!(out, "  (no tasks)")?;
    }

    let now = Utc::now();
    for task in &entries {
        let check = if task.completed { 'x' } else { ' ' };
        write!(
            out,
            "  [{check}] {}  {}  created {}",
            short_id(&task.id),
            task.text,
            format_relative(task.created_at.with_timezone(&Local), now)
        )?;
        if let Some(completed_at) = task.completed_at {
            write!(
                out,
                ", completed {}",
                format_relative(completed_at.with_timezone(&Local), now)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn handle_rename<S: DocumentStore, I: BufRead, O: Write>(
    lists: &ListService<S>,
    old: &str,
    new: &str,
    yes: bool,
    input: &mut I,
    out: &mut O,
) -> Result<(), CliError> {
    let plan = lists.plan_rename(old, new)?;
    if let RenamePlan::Merge {
        from,
        into,
        existing_count,
        incoming_count,
    } = &plan
    {
        let question = format!(
            "'{into}' already exists with {existing_count} tasks. \
             Append the {incoming_count} tasks of '{from}' to it?"
        );
        if !yes && !confirm(&question, input, out)? {
            writeln!(out, "Rename cancelled.")?;
            return Ok(());
        }
    }

    match lists.apply_rename(&plan)? {
        RenameOutcome::Unchanged => writeln!(out, "Name unchanged.")?,
        RenameOutcome::Renamed => writeln!(out, "Renamed '{old}' to '{}'", new.trim())?,
        RenameOutcome::Merged { task_count } => writeln!(
            out,
            "Merged '{old}' into '{}' ({task_count} tasks)",
            new.trim()
        )?,
        RenameOutcome::Declined => writeln!(out, "Rename cancelled.")?,
    }
    Ok(())
}

fn handle_delete<S: DocumentStore, I: BufRead, O: Write>(
    lists: &ListService<S>,
    name: &str,
    yes: bool,
    input: &mut I,
    out: &mut O,
) -> Result<(), CliError> {
    let plan = lists.plan_delete(name)?;
    let question = format!(
        "Delete '{name}' with {} tasks ({} pending)? This cannot be undone.",
        plan.task_count,
        plan.pending_count()
    );
    if !yes && !confirm(&question, input, out)? {
        writeln!(out, "Delete cancelled.")?;
        return Ok(());
    }
    lists.apply_delete(&plan)?;
    writeln!(out, "Deleted '{name}'")?;
    Ok(())
}

fn handle_import<S: DocumentStore, I: BufRead, O: Write>(
    transfer: &TransferService<S>,
    file: &Path,
    into: Option<&str>,
    yes: bool,
    input: &mut I,
    out: &mut O,
) -> Result<(), CliError> {
    let raw = fs::read_to_string(file).map_err(|source| CliError::File {
        path: file.to_path_buf(),
        source,
    })?;
    let plan = match into {
        Some(target) => transfer.plan_import_into(target, &raw)?,
        None => transfer.plan_import(&raw)?,
    };

    let names: Vec<&str> = plan.list_names().collect();
    let mut question = format!(
        "Import {} list(s) ({}) with {} tasks, {} completed?",
        names.len(),
        names.join(", "),
        plan.total_tasks,
        plan.completed_tasks
    );
    if !plan.replaced_lists.is_empty() {
        question.push_str(&format!(
            " This replaces all tasks in: {}.",
            plan.replaced_lists.join(", ")
        ));
    }
    if !yes && !confirm(&question, input, out)? {
        writeln!(out, "Import cancelled.")?;
        return Ok(());
    }

    let summary = transfer.apply_import(&plan)?;
    writeln!(
        out,
        "Imported {} new and {} replaced lists ({} tasks)",
        summary.imported, summary.replaced, summary.total_tasks
    )?;
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    fs::write(path, contents).map_err(|source| CliError::File {
        path: path.to_path_buf(),
        source,
    })
}

/// Asks a yes/no question; anything but `y`/`yes` declines.
fn confirm<I: BufRead, O: Write>(question: &str, input: &mut I, out: &mut O) -> Result<bool, CliError> {
    write!(out, "{question} [y/N] ")?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn short_id(id: &TaskId) -> String {
    id.simple().to_string()[..SHORT_ID_CHARS].to_string()
}

/// Accepts a full task id or a unique prefix of its hyphen-free form.
fn resolve_task_id(tasks: &[Task], list: &str, input: &str) -> Result<TaskId, CliError> {
    let needle = input.trim().replace('-', "").to_ascii_lowercase();
    let matches: Vec<TaskId> = tasks
        .iter()
        .map(|task| task.id)
        .filter(|id| !needle.is_empty() && id.simple().to_string().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(CliError::UnknownTask {
            list: list.to_string(),
            input: input.to_string(),
        }),
        _ => Err(CliError::AmbiguousTask {
            list: list.to_string(),
            input: input.to_string(),
            matches: matches.len(),
        }),
    }
}
