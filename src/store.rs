//! Authoritative in-memory task collection.
//!
//! Every mutation is all-or-nothing: a draft that fails validation (or an unknown id)
//! leaves both the collection and storage untouched. Committed mutations are written
//! through the [`StorageAdapter`] on a best-effort basis.

use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::models::{Priority, Task, TaskDraft};
use crate::storage::{StorageAdapter, TASKS_KEY};
use crate::utils::{format_timestamp, parse_timestamp};
use crate::validate::{ValidationErrors, validate};
use crate::view::{FilterSpec, select_visible};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Task not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Start from the demo tasks when nothing usable is stored
    pub seed_demo_tasks: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { seed_demo_tasks: true }
    }
}

/// Validated, normalized draft fields ready to commit
struct Checked {
    title: String,
    description: String,
    priority: Priority,
    due_date: Option<String>,
}

fn check(draft: &TaskDraft) -> Result<Checked, ValidationErrors> {
    let errors = validate(draft);
    let priority = match draft.priority.as_deref().map(str::parse::<Priority>) {
        Some(Ok(priority)) if errors.is_empty() => priority,
        _ => return Err(errors),
    };

    Ok(Checked {
        title: draft.title.as_deref().unwrap_or("").trim().to_string(),
        description: draft.description.as_deref().unwrap_or("").trim().to_string(),
        priority,
        due_date: draft
            .due_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn StorageAdapter>,
    clock: Box<dyn Clock>,
    id_seq: u32,
}

impl TaskStore {
    /// Load the collection from storage. Missing or unreadable data, or a blob
    /// that is not a JSON array, falls back to the seed collection. Elements that
    /// do not decode as tasks are dropped individually.
    pub fn open(storage: Box<dyn StorageAdapter>, clock: Box<dyn Clock>, options: StoreOptions) -> Self {
        let seed = || {
            if options.seed_demo_tasks {
                demo_tasks()
            } else {
                Vec::new()
            }
        };

        let tasks = match storage.load(TASKS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
                Ok(entries) => dedupe_ids(decode_entries(entries)),
                Err(e) => {
                    warn!(error = %e, "stored tasks are malformed, starting from defaults");
                    seed()
                }
            },
            Ok(None) => {
                debug!("no stored tasks, starting from defaults");
                seed()
            }
            Err(e) => {
                warn!(error = %e, storage = %storage.describe(), "failed to load tasks, starting from defaults");
                seed()
            }
        };
        info!(count = tasks.len(), storage = %storage.describe(), "task store ready");

        Self {
            tasks,
            storage,
            clock,
            id_seq: 0,
        }
    }

    /// Tasks in collection order (newest insertions first)
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Ordered view of the current collection for `spec`
    pub fn visible(&self, spec: &FilterSpec) -> Vec<Task> {
        select_visible(&self.tasks, spec)
    }

    pub fn storage(&self) -> &dyn StorageAdapter {
        self.storage.as_ref()
    }

    /// Validate and insert a new task at the front of the collection
    pub fn create(&mut self, draft: &TaskDraft) -> Result<&Task, StoreError> {
        let checked = check(draft)?;
        let now = self.clock.now();
        let stamp = format_timestamp(now);
        let id = self.next_id(now.timestamp_millis());

        let task = Task {
            id,
            title: checked.title,
            description: checked.description,
            priority: checked.priority,
            due_date: checked.due_date,
            completed: false,
            created_at: stamp.clone(),
            updated_at: stamp,
        };
        info!(id = %task.id, "task created");
        self.tasks.insert(0, task);
        self.persist();
        Ok(&self.tasks[0])
    }

    /// Replace the editable fields of a task. `completed` is only changed when the
    /// draft carries a value for it.
    pub fn update(&mut self, id: &str, draft: &TaskDraft) -> Result<&Task, StoreError> {
        let index = self.index_of(id)?;
        let checked = check(draft)?;
        let updated_at = self.stamp_after(&self.tasks[index].created_at);

        let task = &mut self.tasks[index];
        task.title = checked.title;
        task.description = checked.description;
        task.priority = checked.priority;
        task.due_date = checked.due_date;
        if let Some(completed) = draft.completed {
            task.completed = completed;
        }
        task.updated_at = updated_at;
        info!(id = %id, "task updated");

        self.persist();
        Ok(&self.tasks[index])
    }

    /// Flip the completion flag
    pub fn toggle_complete(&mut self, id: &str) -> Result<&Task, StoreError> {
        let index = self.index_of(id)?;
        let updated_at = self.stamp_after(&self.tasks[index].created_at);

        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        task.updated_at = updated_at;
        info!(id = %id, completed = task.completed, "task toggled");

        self.persist();
        Ok(&self.tasks[index])
    }

    /// Remove a task, returning it
    pub fn delete(&mut self, id: &str) -> Result<Task, StoreError> {
        let index = self.index_of(id)?;
        let removed = self.tasks.remove(index);
        info!(id = %id, "task deleted");
        self.persist();
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Current time, never earlier than `created_at`
    fn stamp_after(&self, created_at: &str) -> String {
        let now = self.clock.now();
        match parse_timestamp(created_at) {
            Some(created) if created > now => format_timestamp(created),
            _ => format_timestamp(now),
        }
    }

    fn next_id(&mut self, millis: i64) -> String {
        loop {
            let id = format!("{}-{:03}", millis, self.id_seq);
            self.id_seq = self.id_seq.wrapping_add(1);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&self) {
        match serde_json::to_string(&self.tasks) {
            Ok(blob) => {
                if let Err(e) = self.storage.save(TASKS_KEY, &blob) {
                    warn!(error = %e, "failed to persist tasks, keeping in-memory changes");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize tasks"),
        }
    }
}

/// Keep every stored entry that decodes as a task
fn decode_entries(entries: Vec<serde_json::Value>) -> Vec<Task> {
    let total = entries.len();
    let tasks: Vec<Task> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Task>(entry) {
            Ok(task) => Some(task),
            Err(e) => {
                debug!(error = %e, "skipping malformed stored task");
                None
            }
        })
        .collect();
    if tasks.len() < total {
        warn!(dropped = total - tasks.len(), "dropped malformed stored tasks");
    }
    tasks
}

fn dedupe_ids(tasks: Vec<Task>) -> Vec<Task> {
    let mut seen = HashSet::new();
    let before = tasks.len();
    let tasks: Vec<Task> = tasks
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect();
    if tasks.len() != before {
        warn!(dropped = before - tasks.len(), "dropped stored tasks with duplicate ids");
    }
    tasks
}

/// Collection used on first run
pub fn demo_tasks() -> Vec<Task> {
    let task = |id: &str, title: &str, description: &str, priority, due: &str, completed, created: &str, updated: &str| Task {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        priority,
        due_date: Some(due.to_string()),
        completed,
        created_at: created.to_string(),
        updated_at: updated.to_string(),
    };

    vec![
        task(
            "170000003-03",
            "Prepare slides",
            "For Monday's meeting.",
            Priority::Medium,
            "2025-11-15",
            false,
            "2025-11-09T12:00:00.000Z",
            "2025-11-09T13:00:00.000Z",
        ),
        task(
            "170000001-01",
            "Submit React Assessment",
            "Finish all sections and code.",
            Priority::High,
            "2025-11-20",
            false,
            "2025-11-11T10:00:00.000Z",
            "2025-11-11T10:10:00.000Z",
        ),
        task(
            "170000002-02",
            "Buy groceries",
            "",
            Priority::Low,
            "2025-11-11",
            true,
            "2025-11-10T08:00:00.000Z",
            "2025-11-10T09:00:00.000Z",
        ),
    ]
}
