use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::note::NoteKind;
use crate::tui::app::Mode;
use crate::tui::widgets::{
    alert::render_alert,
    color::parse_color,
    help::render_help,
    note_list::render_note_list,
    prompt::render_prompt,
    sketch::render_sketch_note,
    status_bar::render_status_bar,
    text_view::render_text_note,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let theme = &app.config.theme;
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Stickies")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    render_note_list(
        f,
        layout.sidebar_area,
        app.desk.notes(),
        &mut app.list_state,
        &app.config.theme,
    );

    let focused = app.focus.and_then(|id| app.desk.note(id).ok());
    app.canvas_area = None;
    match focused {
        Some(note) => match note.kind() {
            NoteKind::Text(text) => {
                let editor = if app.mode == Mode::Edit {
                    app.editor.as_mut()
                } else {
                    None
                };
                render_text_note(f, layout.main_area, note, text, editor);
            }
            NoteKind::Graphic(graphic) => {
                app.canvas_area = Some(render_sketch_note(f, layout.main_area, note, graphic));
            }
        },
        None => {
            let hint = format!(
                "No notes open. Press {} for a text note or {} for a sketch.",
                format_key_binding_for_display(&app.config.key_bindings.new_text),
                format_key_binding_for_display(&app.config.key_bindings.new_sketch),
            );
            let paragraph = Paragraph::new(hint)
                .block(Block::default().borders(Borders::ALL))
                .style(Style::default().fg(fg_color))
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, layout.main_area);
        }
    }

    let key_hints = app.key_hints();
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_deref(),
        &key_hints,
        &app.config.theme,
    );

    // Overlays
    let area = f.area();
    match app.mode {
        Mode::Prompt => {
            if let Some(ref mut prompt) = app.prompt {
                render_prompt(f, area, prompt, &app.config.theme);
            }
        }
        Mode::Help => render_help(f, area, &app.config),
        Mode::Browse | Mode::Edit => {}
    }

    // Alarm alerts are modal over everything else
    if let Some(message) = app.alerts.front() {
        render_alert(f, area, message, app.alerts.len(), &app.config.theme);
    }
}
