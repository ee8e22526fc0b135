use clap::{Parser, Subcommand};
use std::io::Write;
use thiserror::Error;

use crate::models::{Task, TaskDraft, ThemeMode};
use crate::storage::{StorageAdapter, load_theme, save_theme};
use crate::store::{StoreError, TaskStore};
use crate::utils::format_due_date;
use crate::view::{FilterSpec, PriorityFilter, StatusFilter};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Track, filter and complete tasks from the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a new task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(long)]
        description: Option<String>,
        /// Low, Medium or High
        #[arg(long, default_value = "Low")]
        priority: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks in display order
    List {
        /// All, Pending or Completed
        #[arg(long, default_value = "All")]
        status: StatusFilter,
        /// All, Low, Medium or High
        #[arg(long, default_value = "All")]
        priority: PriorityFilter,
        /// Case-insensitive title search
        #[arg(long, default_value = "")]
        query: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Edit a task; omitted fields keep their current value
    Edit {
        /// Task id
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
        /// Set completion explicitly (true/false)
        #[arg(long)]
        completed: Option<bool>,
    },
    /// Flip a task between pending and completed
    Toggle {
        /// Task id
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
    },
    /// Show the stored theme, or set it
    Theme {
        /// light or dark
        mode: Option<ThemeMode>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    StoreError(#[from] StoreError),
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Failed to write output: {0}")]
    IoError(#[from] std::io::Error),
}

/// Field changes requested by `edit`
#[derive(Debug, Default, Clone)]
pub struct EditArgs {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub clear_due: bool,
    pub completed: Option<bool>,
}

/// One table row: status box, id, priority, due date, title
pub fn format_task_line(task: &Task) -> String {
    format!(
        "{} {:<18} {:<6} {:<13} {}",
        if task.completed { "[x]" } else { "[ ]" },
        task.id,
        task.priority.as_str(),
        format_due_date(task.due_date.as_deref()),
        task.title
    )
}

/// Handle the add command
pub fn handle_add(
    store: &mut TaskStore,
    title: String,
    description: Option<String>,
    priority: String,
    due: Option<String>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let draft = TaskDraft {
        title: Some(title),
        description,
        priority: Some(priority),
        due_date: due,
        completed: None,
    };
    let task = store.create(&draft)?;
    writeln!(out, "Task created (ID: {})", task.id)?;
    Ok(())
}

/// Handle the list command
pub fn handle_list(store: &TaskStore, spec: &FilterSpec, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let visible = store.visible(spec);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&visible)?)?;
        return Ok(());
    }

    if visible.is_empty() {
        if store.is_empty() {
            writeln!(out, "No tasks yet.")?;
        } else {
            writeln!(out, "No tasks match the current filters ({}).", spec.summary())?;
        }
        return Ok(());
    }

    for task in &visible {
        writeln!(out, "{}", format_task_line(task))?;
    }
    writeln!(
        out,
        "{} of {} tasks ({} pending, {} completed)",
        visible.len(),
        store.len(),
        store.pending_count(),
        store.completed_count()
    )?;
    Ok(())
}

/// Handle the edit command
pub fn handle_edit(store: &mut TaskStore, id: &str, args: EditArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let current = store
        .get(id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

    let mut draft = TaskDraft::from_task(current);
    if let Some(title) = args.title {
        draft.title = Some(title);
    }
    if let Some(description) = args.description {
        draft.description = Some(description);
    }
    if let Some(priority) = args.priority {
        draft.priority = Some(priority);
    }
    if args.clear_due {
        draft.due_date = None;
    } else if let Some(due) = args.due {
        draft.due_date = Some(due);
    }
    draft.completed = args.completed.or(draft.completed);

    let task = store.update(id, &draft)?;
    writeln!(out, "Task updated: {}", format_task_line(task))?;
    Ok(())
}

/// Handle the toggle command
pub fn handle_toggle(store: &mut TaskStore, id: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let task = store.toggle_complete(id)?;
    let status = if task.completed { "completed" } else { "pending" };
    writeln!(out, "Task {} is now {}", task.id, status)?;
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(store: &mut TaskStore, id: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let task = store.delete(id)?;
    writeln!(out, "Task deleted: {}", task.title)?;
    Ok(())
}

/// Handle the theme command
pub fn handle_theme(
    storage: &dyn StorageAdapter,
    fallback: ThemeMode,
    mode: Option<ThemeMode>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match mode {
        Some(mode) => {
            save_theme(storage, mode);
            writeln!(out, "Theme set to {}", mode)?;
        }
        None => {
            writeln!(out, "{}", load_theme(storage, fallback))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use crate::store::StoreOptions;
    use chrono::{TimeZone, Utc};

    fn store() -> TaskStore {
        TaskStore::open(
            Box::new(MemoryStorage::new()),
            Box::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 11, 12, 8, 0, 0).unwrap())),
            StoreOptions::default(),
        )
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from(["taskdeck", "list", "--status", "pending", "--priority", "High"]).unwrap();
        match cli.command {
            Some(Commands::List { status, priority, query, json }) => {
                assert_eq!(status, StatusFilter::Pending);
                assert_eq!(priority, PriorityFilter::Only(crate::models::Priority::High));
                assert_eq!(query, "");
                assert!(!json);
            }
            _ => panic!("expected list"),
        }
        assert!(Cli::try_parse_from(["taskdeck", "list", "--status", "sometimes"]).is_err());
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["taskdeck", "--dev"]).unwrap();
        assert!(cli.dev);
        assert!(cli.command.is_none());
    }

    #[test]
    fn add_reports_validation_errors() {
        let mut store = store();
        let mut out = Vec::new();
        let err = handle_add(&mut store, "  ".to_string(), None, "Urgent".to_string(), None, &mut out).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("title: Title is required"));
        assert!(message.contains("priority: Priority must be one of Low, Medium, High"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn list_prints_display_order() {
        let store = store();
        let mut out = Vec::new();
        handle_list(&store, &FilterSpec::default(), false, &mut out).unwrap();
        let text = output(out);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("Prepare slides"));
        assert!(lines[1].contains("Submit React Assessment"));
        assert!(lines[2].starts_with("[x]"));
        assert_eq!(lines[3], "3 of 3 tasks (2 pending, 1 completed)");
    }

    #[test]
    fn list_json_is_an_array() {
        let store = store();
        let mut out = Vec::new();
        let spec = FilterSpec::new(StatusFilter::Completed, PriorityFilter::All, "");
        handle_list(&store, &spec, true, &mut out).unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&output(out)).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy groceries");
    }

    #[test]
    fn list_explains_empty_result() {
        let store = store();
        let mut out = Vec::new();
        let spec = FilterSpec::new(StatusFilter::All, PriorityFilter::All, "xyz");
        handle_list(&store, &spec, false, &mut out).unwrap();
        assert_eq!(
            output(out),
            "No tasks match the current filters (Status: All | Priority: All | Search: \"xyz\").\n"
        );
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let mut store = store();
        let mut out = Vec::new();
        let args = EditArgs {
            priority: Some("High".to_string()),
            clear_due: true,
            ..EditArgs::default()
        };
        handle_edit(&mut store, "170000003-03", args, &mut out).unwrap();
        let task = store.get("170000003-03").unwrap();
        assert_eq!(task.title, "Prepare slides");
        assert_eq!(task.description, "For Monday's meeting.");
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, crate::models::Priority::High);
    }

    #[test]
    fn edit_unknown_id_fails() {
        let mut store = store();
        let mut out = Vec::new();
        let err = handle_edit(&mut store, "missing", EditArgs::default(), &mut out).unwrap_err();
        assert_eq!(err.to_string(), "Task not found: missing");
    }

    #[test]
    fn toggle_delete_and_theme() {
        let mut store = store();
        let mut out = Vec::new();
        handle_toggle(&mut store, "170000002-02", &mut out).unwrap();
        handle_delete(&mut store, "170000001-01", &mut out).unwrap();
        handle_theme(store.storage(), ThemeMode::Light, Some(ThemeMode::Dark), &mut out).unwrap();
        handle_theme(store.storage(), ThemeMode::Light, None, &mut out).unwrap();
        let text = output(out);
        assert!(text.contains("Task 170000002-02 is now pending"));
        assert!(text.contains("Task deleted: Submit React Assessment"));
        assert!(text.ends_with("dark\n"));
    }
}
