use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::{Priority, Task, TaskDraft, ThemeMode};
use crate::storage::{load_theme, save_theme};
use crate::store::{StoreError, TaskStore};
use crate::tui::widgets::color::Palette;
use crate::tui::widgets::editor::Editor;
use crate::validate::{Field, ValidationErrors, validate};
use crate::view::FilterSpec;
use crate::Config;

/// How long a status toast stays on screen
pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_millis(1800);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Search,
    Form,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    DueDate,
    Completed,
}

impl FormField {
    /// The validation field shown under this form field, if any
    pub fn validation_field(&self) -> Option<Field> {
        match self {
            FormField::Title => Some(Field::Title),
            FormField::Description => Some(Field::Description),
            FormField::Priority => Some(Field::Priority),
            FormField::DueDate => Some(Field::DueDate),
            FormField::Completed => None,
        }
    }
}

/// Create/edit form. Errors are recomputed after every change so the form can show
/// them inline and refuse to save while any remain.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: FormField,
    pub title: Editor,
    pub description: Editor,
    pub priority: Priority,
    pub due_date: Editor,
    pub completed: bool,
    pub editing_id: Option<String>,
    pub errors: ValidationErrors,
}

impl TaskForm {
    pub fn new() -> Self {
        let mut form = Self {
            current_field: FormField::Title,
            title: Editor::single_line(),
            description: Editor::multi_line(),
            priority: Priority::Low,
            due_date: Editor::single_line(),
            completed: false,
            editing_id: None,
            errors: ValidationErrors::default(),
        };
        form.refresh_errors();
        form
    }

    pub fn for_task(task: &Task) -> Self {
        let mut form = Self {
            current_field: FormField::Title,
            title: Editor::from_string(&task.title, false),
            description: Editor::from_string(&task.description, true),
            priority: task.priority,
            due_date: Editor::from_string(task.due_date.as_deref().unwrap_or(""), false),
            completed: task.completed,
            editing_id: Some(task.id.clone()),
            errors: ValidationErrors::default(),
        };
        form.refresh_errors();
        form
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn draft(&self) -> TaskDraft {
        let due_date = self.due_date.text();
        TaskDraft {
            title: Some(self.title.text()),
            description: Some(self.description.text()),
            priority: Some(self.priority.as_str().to_string()),
            due_date: if due_date.trim().is_empty() { None } else { Some(due_date) },
            completed: self.is_editing().then_some(self.completed),
        }
    }

    pub fn refresh_errors(&mut self) {
        self.errors = validate(&self.draft());
    }

    pub fn can_save(&self) -> bool {
        self.errors.is_empty()
    }

    fn fields(&self) -> &'static [FormField] {
        if self.is_editing() {
            &[
                FormField::Title,
                FormField::Description,
                FormField::Priority,
                FormField::DueDate,
                FormField::Completed,
            ]
        } else {
            &[
                FormField::Title,
                FormField::Description,
                FormField::Priority,
                FormField::DueDate,
            ]
        }
    }

    pub fn navigate(&mut self, forward: bool) {
        let fields = self.fields();
        let pos = fields
            .iter()
            .position(|f| *f == self.current_field)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % fields.len()
        } else {
            (pos + fields.len() - 1) % fields.len()
        };
        self.current_field = fields[next];
    }

    /// Editor behind the focused field, if it is a text field
    pub fn current_editor(&mut self) -> Option<&mut Editor> {
        match self.current_field {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Priority | FormField::Completed => None,
        }
    }

    pub fn cycle_priority(&mut self, forward: bool) {
        self.priority = if forward { self.priority.next() } else { self.priority.prev() };
        self.refresh_errors();
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub store: TaskStore,
    pub filter: FilterSpec,
    pub theme: ThemeMode,
    pub mode: Mode,
    pub form: Option<TaskForm>,
    pub delete_confirmation: Option<Task>,
    /// 0 = Delete, 1 = Cancel
    pub delete_modal_selection: usize,
    pub selected_index: usize,
    pub list_state: ListState,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, store: TaskStore) -> Self {
        let theme = load_theme(store.storage(), config.default_theme);
        let mut app = Self {
            config,
            store,
            filter: FilterSpec::default(),
            theme,
            mode: Mode::View,
            form: None,
            delete_confirmation: None,
            delete_modal_selection: 0,
            selected_index: 0,
            list_state: ListState::default(),
            status: StatusState::default(),
        };
        app.adjust_selected_index();
        app
    }

    /// Colors for the active theme mode
    pub fn palette(&self) -> Palette {
        Palette::from_theme(&self.config.get_theme(self.theme))
    }

    pub fn visible_tasks(&self) -> Vec<Task> {
        self.store.visible(&self.filter)
    }

    pub fn selected_task(&self) -> Option<Task> {
        self.visible_tasks().into_iter().nth(self.selected_index)
    }

    /// Clamp the selection to the visible list and sync the list widget state
    pub fn adjust_selected_index(&mut self) {
        let count = self.visible_tasks().len();
        if count == 0 {
            self.selected_index = 0;
            self.list_state.select(None);
        } else {
            self.selected_index = self.selected_index.min(count - 1);
            self.list_state.select(Some(self.selected_index));
        }
    }

    /// Select a task by id if it is visible, otherwise keep the current position
    fn select_task_id(&mut self, id: &str) {
        if let Some(index) = self.visible_tasks().iter().position(|t| t.id == id) {
            self.selected_index = index;
        }
        self.adjust_selected_index();
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
        self.adjust_selected_index();
    }

    pub fn move_selection_down(&mut self) {
        self.selected_index += 1;
        self.adjust_selected_index();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.clear_status_message();
            }
        }
    }

    pub fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        match self.store.toggle_complete(&task.id) {
            Ok(updated) => {
                let message = if updated.completed {
                    "Task completed"
                } else {
                    "Task marked pending"
                };
                self.set_status_message(message.to_string());
                self.select_task_id(&task.id);
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.form = Some(TaskForm::new());
        self.mode = Mode::Form;
    }

    pub fn enter_edit_mode(&mut self) {
        match self.selected_task() {
            Some(task) => {
                self.form = Some(TaskForm::for_task(&task));
                self.mode = Mode::Form;
            }
            None => self.set_status_message("No task selected".to_string()),
        }
    }

    pub fn exit_form_mode(&mut self) {
        self.form = None;
        self.mode = Mode::View;
    }

    /// Commit the form. On validation failure the form stays open with its errors.
    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        form.refresh_errors();
        if !form.can_save() {
            debug!(errors = %form.errors, "form has errors, not saving");
            self.set_status_message("Fix the highlighted fields to save".to_string());
            return;
        }

        let draft = form.draft();
        let result = match form.editing_id.clone() {
            Some(id) => self
                .store
                .update(&id, &draft)
                .map(|task| (task.id.clone(), "Task updated")),
            None => self
                .store
                .create(&draft)
                .map(|task| (task.id.clone(), "Task created")),
        };

        match result {
            Ok((id, message)) => {
                self.exit_form_mode();
                self.set_status_message(message.to_string());
                self.select_task_id(&id);
            }
            Err(StoreError::Validation(errors)) => {
                if let Some(form) = self.form.as_mut() {
                    form.errors = errors;
                }
            }
            Err(e) => {
                self.exit_form_mode();
                self.set_status_message(e.to_string());
                self.adjust_selected_index();
            }
        }
    }

    pub fn request_delete(&mut self) {
        match self.selected_task() {
            Some(task) => {
                self.delete_confirmation = Some(task);
                self.delete_modal_selection = 1;
            }
            None => self.set_status_message("No task selected".to_string()),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirmation = None;
    }

    pub fn confirm_delete(&mut self) {
        let Some(task) = self.delete_confirmation.take() else {
            return;
        };
        match self.store.delete(&task.id) {
            Ok(_) => self.set_status_message("Task deleted".to_string()),
            Err(e) => self.set_status_message(e.to_string()),
        }
        self.adjust_selected_index();
    }

    pub fn enter_search_mode(&mut self) {
        self.mode = Mode::Search;
    }

    pub fn exit_search_mode(&mut self) {
        self.mode = Mode::View;
    }

    pub fn add_to_search(&mut self, ch: char) {
        self.filter.query.push(ch);
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn remove_from_search(&mut self) {
        self.filter.query.pop();
        self.adjust_selected_index();
    }

    pub fn cycle_status_filter(&mut self) {
        self.filter.status = self.filter.status.next();
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn cycle_priority_filter(&mut self) {
        self.filter.priority = self.filter.priority.next();
        self.selected_index = 0;
        self.adjust_selected_index();
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterSpec::default();
        self.adjust_selected_index();
        self.set_status_message("Filters cleared".to_string());
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        save_theme(self.store.storage(), self.theme);
        self.set_status_message(format!("Theme: {}", self.theme));
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::View;
    }
}
