use ratatui::Frame;
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::tui::app::{App, FormField, Mode};
use crate::tui::widgets::{
    confirm_delete::render_confirm_delete,
    filters_box::{render_filters_box, render_search_line},
    form::render_task_form,
    header::render_header,
    help::render_help,
    item_view::render_item_view,
    status_bar::render_status_bar,
    task_list::render_task_list,
};
use crate::tui::Layout;
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let palette = app.palette();
    f.render_widget(Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)), f.area());

    render_header(
        f,
        layout.header_area,
        app.store.pending_count(),
        app.store.completed_count(),
        app.theme,
        &palette,
    );
    render_search_line(
        f,
        layout.search_area,
        &app.filter.query,
        app.mode == Mode::Search,
        &app.config,
        &palette,
    );
    render_filters_box(f, layout.filters_area, &app.filter, &app.config, &palette);

    let visible = app.visible_tasks();
    let selected = visible.get(app.selected_index).cloned();
    render_task_list(
        f,
        layout.list_area,
        &visible,
        app.store.len(),
        &mut app.list_state,
        &app.config,
        &palette,
    );
    render_item_view(f, layout.detail_area, selected.as_ref(), &palette);

    // Overlays go on top of the normal content
    if app.mode == Mode::Form {
        if let Some(ref form) = app.form {
            render_task_form(f, f.area(), form, &app.config, &palette);
        }
    }
    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config, &palette);
    }
    if let Some(ref task) = app.delete_confirmation {
        render_confirm_delete(f, f.area(), task, app.delete_modal_selection, &palette);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_deref(), &key_hints, &palette);
}

pub fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    if app.delete_confirmation.is_some() {
        return vec![
            "Enter: Confirm".to_string(),
            "y: Delete".to_string(),
            "n/Esc: Cancel".to_string(),
        ];
    }
    match app.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", format_key_binding_for_display(&kb.help))],
        Mode::Search => vec!["Type to filter titles".to_string(), "Enter/Esc: Done".to_string()],
        Mode::Form => {
            let mut hints = vec![
                "Tab/Shift+Tab: Next field".to_string(),
                format!("{}: Save", format_key_binding_for_display(&kb.save)),
                "Esc: Cancel".to_string(),
            ];
            let on_choice = app
                .form
                .as_ref()
                .map(|form| matches!(form.current_field, FormField::Priority | FormField::Completed))
                .unwrap_or(false);
            if on_choice {
                hints.insert(1, "←/→: Change".to_string());
            }
            hints
        }
        Mode::View => vec![
            format!("{}: Quit", format_key_binding_for_display(&kb.quit)),
            format!("{}: New", format_key_binding_for_display(&kb.new)),
            format!("{}: Edit", format_key_binding_for_display(&kb.edit)),
            format!("{}: Delete", format_key_binding_for_display(&kb.delete)),
            format!("{}: Toggle", format_key_binding_for_display(&kb.toggle_complete)),
            format!("{}: Search", format_key_binding_for_display(&kb.search)),
            format!("{}: Theme", format_key_binding_for_display(&kb.toggle_theme)),
            format!("{}: Help", format_key_binding_for_display(&kb.help)),
        ],
    }
}
