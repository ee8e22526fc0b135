use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;
use tracing::{debug, info};

use crate::tui::app::{App, FormField, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{ParsedKeyBinding, has_primary_modifier, parse_key_binding};

/// Restores the terminal when dropped, including on panic.
/// A terminal left in raw mode or the alternate screen is unusable for the user.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: false,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        guard.alternate_screen_enabled = true;
        Ok(guard)
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already cleaning up, errors have nowhere to go
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Checked before entering the alternate screen so the message stays readable
    let (width, height) = terminal_size()?;
    if width < Layout::MIN_WIDTH || height < Layout::MIN_HEIGHT {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width,
            height,
            Layout::MIN_WIDTH,
            Layout::MIN_HEIGHT
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!(width, height, "terminal ui started");

    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Press only; Windows also reports releases
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                Event::Resize(width, height) => {
                    debug!(width, height, "terminal resized");
                }
                _ => {}
            }
        }
    }

    guard.restore()?;
    info!("terminal ui stopped");
    Ok(())
}

/// Dispatch one key press. Returns `true` when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if app.delete_confirmation.is_some() {
        return handle_delete_confirmation_modal(app, key_event);
    }
    match app.mode {
        Mode::Help => handle_help_mode(app, key_event),
        Mode::Search => handle_search_mode(app, key_event),
        Mode::Form => handle_form_mode(app, key_event),
        Mode::View => handle_global_key_bindings(app, key_event),
    }
}

fn binding(key_str: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key_str).map_err(TuiError::KeyBindingError)
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
            app.delete_modal_selection = 1 - app.delete_modal_selection.min(1);
        }
        KeyCode::Enter => {
            if app.delete_modal_selection == 0 {
                app.confirm_delete();
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let help = binding(&app.config.key_bindings.help)?;
    let quit = binding(&app.config.key_bindings.quit)?;
    if key_event.code == KeyCode::Esc || matches_key_event(key_event, &help) || matches_key_event(key_event, &quit) {
        app.exit_help_mode();
    }
    Ok(false)
}

fn handle_search_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc | KeyCode::Enter => app.exit_search_mode(),
        KeyCode::Backspace => app.remove_from_search(),
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => app.add_to_search(c),
        _ => {}
    }
    Ok(false)
}

fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let save = binding(&app.config.key_bindings.save)?;
    if matches_key_event(key_event, &save) {
        app.save_form();
        return Ok(false);
    }
    if key_event.code == KeyCode::Esc {
        app.exit_form_mode();
        return Ok(false);
    }

    let Some(form) = app.form.as_mut() else {
        app.exit_form_mode();
        return Ok(false);
    };

    match key_event.code {
        KeyCode::Tab if !key_event.modifiers.contains(KeyModifiers::SHIFT) => {
            form.navigate(true);
            return Ok(false);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            form.navigate(false);
            return Ok(false);
        }
        _ => {}
    }

    match form.current_field {
        FormField::Priority => match key_event.code {
            KeyCode::Left => form.cycle_priority(false),
            KeyCode::Right | KeyCode::Char(' ') => form.cycle_priority(true),
            KeyCode::Enter => form.navigate(true),
            _ => {}
        },
        FormField::Completed => match key_event.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') => form.toggle_completed(),
            KeyCode::Enter => form.navigate(true),
            _ => {}
        },
        FormField::Title | FormField::Description | FormField::DueDate => {
            let is_multi_line = form.current_field == FormField::Description;
            let Some(editor) = form.current_editor() else {
                return Ok(false);
            };
            match key_event.code {
                KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => editor.insert_char(c),
                KeyCode::Enter if is_multi_line => editor.insert_newline(),
                KeyCode::Enter => {
                    form.navigate(true);
                    return Ok(false);
                }
                KeyCode::Backspace => editor.delete_char(),
                KeyCode::Delete => editor.delete_forward(),
                KeyCode::Left => editor.move_cursor_left(),
                KeyCode::Right => editor.move_cursor_right(),
                KeyCode::Up => editor.move_cursor_up(),
                KeyCode::Down => editor.move_cursor_down(),
                KeyCode::Home => editor.move_cursor_home(),
                KeyCode::End => editor.move_cursor_end(),
                _ => return Ok(false),
            }
            form.refresh_errors();
        }
    }
    Ok(false)
}

fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if matches_key_event(key_event, &binding(&kb.quit)?) {
        return Ok(true);
    }

    if matches_key_event(key_event, &binding(&kb.list_up)?) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if matches_key_event(key_event, &binding(&kb.list_down)?) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if matches_key_event(key_event, &binding(&kb.new)?) {
        app.enter_create_mode();
    } else if matches_key_event(key_event, &binding(&kb.edit)?) || key_event.code == KeyCode::Enter {
        app.enter_edit_mode();
    } else if matches_key_event(key_event, &binding(&kb.delete)?) {
        app.request_delete();
    } else if matches_key_event(key_event, &binding(&kb.toggle_complete)?) {
        app.toggle_selected();
    } else if matches_key_event(key_event, &binding(&kb.search)?) {
        app.enter_search_mode();
    } else if matches_key_event(key_event, &binding(&kb.cycle_status)?) {
        app.cycle_status_filter();
    } else if matches_key_event(key_event, &binding(&kb.cycle_priority)?) {
        app.cycle_priority_filter();
    } else if matches_key_event(key_event, &binding(&kb.clear_filters)?) {
        app.clear_filters();
    } else if matches_key_event(key_event, &binding(&kb.toggle_theme)?) {
        app.toggle_theme();
    } else if matches_key_event(key_event, &binding(&kb.help)?) {
        app.enter_help_mode();
    }

    Ok(false)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Ctrl on Windows/Linux, Ctrl or Option on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;
    use crate::store::{StoreOptions, TaskStore};
    use crate::validate::Field;
    use crate::Config;
    use chrono::{TimeZone, Utc};

    fn app() -> App {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 11, 12, 8, 0, 0).unwrap());
        let store = TaskStore::open(Box::new(MemoryStorage::new()), Box::new(clock), StoreOptions::default());
        App::new(Config::default(), store)
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn ctrl_s() -> KeyEvent {
        #[cfg(target_os = "macos")]
        let modifiers = KeyModifiers::ALT;
        #[cfg(not(target_os = "macos"))]
        let modifiers = KeyModifiers::CONTROL;
        KeyEvent::new(KeyCode::Char('s'), modifiers)
    }

    #[test]
    fn quit_key() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn create_task_through_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode, Mode::Form);

        type_str(&mut app, "Plan sprint");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "Before Friday");
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "2025-11-30");

        handle_key_event(&mut app, ctrl_s()).unwrap();
        assert_eq!(app.mode, Mode::View);

        let task = app.store.tasks()[0].clone();
        assert_eq!(task.title, "Plan sprint");
        assert_eq!(task.description, "Before Friday");
        assert_eq!(task.priority, crate::models::Priority::High);
        assert_eq!(task.due_date.as_deref(), Some("2025-11-30"));
    }

    #[test]
    fn quit_key_is_text_inside_form() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.form.as_ref().unwrap().title.text(), "q");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::View);
        assert!(app.form.is_none());
    }

    #[test]
    fn inline_errors_update_while_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert!(app.form.as_ref().unwrap().errors.contains(Field::Title));
        press(&mut app, KeyCode::Char('x'));
        assert!(app.form.as_ref().unwrap().errors.is_empty());
        press(&mut app, KeyCode::Backspace);
        assert!(app.form.as_ref().unwrap().errors.contains(Field::Title));

        handle_key_event(&mut app, ctrl_s()).unwrap();
        assert_eq!(app.mode, Mode::Form);
    }

    #[test]
    fn delete_modal_defaults_to_cancel() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert!(app.delete_confirmation.is_some());
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.len(), 3);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn search_mode_captures_text() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "groc");
        assert_eq!(app.filter.query, "groc");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::View);
        assert_eq!(app.visible_tasks().len(), 1);
    }

    #[test]
    fn space_toggles_and_s_cycles_status() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.get("170000003-03").unwrap().completed);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.visible_tasks().len(), 1);
    }

    #[test]
    fn help_opens_and_closes() {
        let mut app = app();
        press(&mut app, KeyCode::F(1));
        assert_eq!(app.mode, Mode::Help);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.mode, Mode::View);
    }

    #[test]
    fn bad_binding_is_reported() {
        let mut app = app();
        app.config.key_bindings.quit = "NotAKey".to_string();
        let result = handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(matches!(result, Err(TuiError::KeyBindingError(_))));
    }
}
