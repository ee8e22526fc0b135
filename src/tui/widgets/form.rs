use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::models::Priority;
use crate::tui::app::{FormField, TaskForm};
use crate::tui::widgets::color::{Palette, priority_color};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display;
use crate::validate::DESCRIPTION_MAX_CHARS;
use crate::Config;

fn field_block<'a>(title: String, active: bool, has_error: bool, palette: &Palette) -> Block<'a> {
    let border = if has_error {
        palette.error
    } else if active {
        palette.accent
    } else {
        palette.muted
    };
    let title_style = if active {
        Style::default().fg(border).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(border)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(title, title_style))
}

fn render_error(f: &mut Frame, area: Rect, message: Option<&str>, palette: &Palette) {
    if let Some(message) = message {
        let line = Line::from(Span::styled(format!(" ⚠ {}", message), Style::default().fg(palette.error)));
        f.render_widget(Paragraph::new(line), area);
    }
}

/// Render an editor inside a bordered field, placing the terminal cursor when active
fn render_editor_field(
    f: &mut Frame,
    area: Rect,
    editor: &Editor,
    block: Block,
    active: bool,
    palette: &Palette,
) {
    let inner = block.inner(area);
    let (_, visible) = editor.visible_lines(inner.height as usize);
    let lines: Vec<Line> = visible
        .iter()
        .map(|l| Line::from(Span::styled(l.clone(), Style::default().fg(palette.fg))))
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);

    if active {
        if let Some(pos) = editor.cursor_screen_pos(inner) {
            f.set_cursor_position(pos);
        }
    }
}

fn priority_line(selected: Priority, active: bool, palette: &Palette) -> Line<'static> {
    let label_style = if active {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };
    let mut spans = vec![Span::styled(" Priority  ", label_style)];
    for priority in Priority::ALL {
        let style = if priority == selected {
            Style::default()
                .fg(palette.bg)
                .bg(priority_color(priority))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(priority_color(priority))
        };
        spans.push(Span::styled(format!(" {} ", priority.as_str()), style));
        spans.push(Span::raw(" "));
    }
    if active {
        spans.push(Span::styled("←/→", Style::default().fg(palette.muted)));
    }
    Line::from(spans)
}

fn completed_line(completed: bool, active: bool, palette: &Palette) -> Line<'static> {
    let style = if active {
        Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.fg)
    };
    let mark = if completed { "[x]" } else { "[ ]" };
    Line::from(Span::styled(format!(" {} Completed", mark), style))
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, config: &Config, palette: &Palette) {
    let popup = popup_area(area, 70, 85);
    f.render_widget(Clear, popup);

    let title = if form.is_editing() { "Edit Task" } else { "New Task" };
    let outer = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(palette.fg).bg(palette.bg));
    let inner = outer.inner(popup);
    f.render_widget(outer, popup);

    let mut constraints = vec![
        Constraint::Length(3), // Title
        Constraint::Length(1), // Title error
        Constraint::Min(4),    // Description
        Constraint::Length(1), // Description error
        Constraint::Length(1), // Priority
        Constraint::Length(1), // Priority error
        Constraint::Length(3), // Due date
        Constraint::Length(1), // Due date error
    ];
    if form.is_editing() {
        constraints.push(Constraint::Length(1)); // Completed
    }
    constraints.push(Constraint::Length(1)); // Save state

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let is_active = move |field: FormField| form.current_field == field;
    let error_for = move |field: FormField| field.validation_field().and_then(|v| form.errors.get(v));

    render_editor_field(
        f,
        rows[0],
        &form.title,
        field_block("Title *".to_string(), is_active(FormField::Title), error_for(FormField::Title).is_some(), palette),
        is_active(FormField::Title),
        palette,
    );
    render_error(f, rows[1], error_for(FormField::Title), palette);

    let description_len = form.description.text().chars().count();
    render_editor_field(
        f,
        rows[2],
        &form.description,
        field_block(
            format!("Description ({}/{})", description_len, DESCRIPTION_MAX_CHARS),
            is_active(FormField::Description),
            error_for(FormField::Description).is_some(),
            palette,
        ),
        is_active(FormField::Description),
        palette,
    );
    render_error(f, rows[3], error_for(FormField::Description), palette);

    f.render_widget(Paragraph::new(priority_line(form.priority, is_active(FormField::Priority), palette)), rows[4]);
    render_error(f, rows[5], error_for(FormField::Priority), palette);

    render_editor_field(
        f,
        rows[6],
        &form.due_date,
        field_block(
            "Due date (YYYY-MM-DD)".to_string(),
            is_active(FormField::DueDate),
            error_for(FormField::DueDate).is_some(),
            palette,
        ),
        is_active(FormField::DueDate),
        palette,
    );
    render_error(f, rows[7], error_for(FormField::DueDate), palette);

    let mut next_row = 8;
    if form.is_editing() {
        f.render_widget(
            Paragraph::new(completed_line(form.completed, is_active(FormField::Completed), palette)),
            rows[next_row],
        );
        next_row += 1;
    }

    let save_key = format_key_binding_for_display(&config.key_bindings.save);
    let footer = if form.can_save() {
        Line::from(Span::styled(
            format!(" {}: Save   Esc: Cancel", save_key),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            format!(" {}: Save (fix errors first)   Esc: Cancel", save_key),
            Style::default().fg(palette.muted).add_modifier(Modifier::DIM),
        ))
    };
    f.render_widget(Paragraph::new(footer), rows[next_row]);
}
