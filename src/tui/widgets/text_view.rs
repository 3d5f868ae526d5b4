use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::note::{FontChoice, Note, TextNote};
use crate::tui::widgets::color::{get_contrast_text_color, to_color};
use crate::tui::widgets::editor::Editor;

/// Terminals have one font, so each choice maps to a text style
fn font_modifier(font: FontChoice) -> Modifier {
    match font {
        FontChoice::Helvetica => Modifier::empty(),
        FontChoice::MarkerFelt => Modifier::ITALIC,
        FontChoice::Typewriter => Modifier::BOLD,
    }
}

/// Render a text note on its sticky background. With `editor` the buffer
/// is shown instead of the stored content and the cursor is placed.
pub fn render_text_note(
    f: &mut Frame,
    area: Rect,
    note: &Note,
    text: &TextNote,
    editor: Option<&mut Editor>,
) {
    let background = to_color(text.background());
    let chrome = get_contrast_text_color(background);
    let editing = editor.is_some();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(note.display_title())
        .title_bottom(Line::from(format!(
            " {} · {}{} ",
            text.font().label(),
            text.text_color().name,
            if editing { " · editing" } else { "" }
        )))
        .border_style(Style::default().fg(chrome))
        .title_style(Style::default().fg(chrome))
        .style(Style::default().bg(background));
    let inner = block.inner(area);

    let body_style = Style::default()
        .fg(to_color(text.text_color().value))
        .bg(background)
        .add_modifier(font_modifier(text.font()));

    match editor {
        Some(editor) => {
            editor.update_scroll(inner.height as usize, inner.width as usize);
            let lines: Vec<Line> = editor
                .get_visible_lines(inner.height as usize, inner.width as usize)
                .into_iter()
                .map(Line::from)
                .collect();
            f.render_widget(Paragraph::new(lines).block(block).style(body_style), area);
            if let Some((x, y)) = editor.get_cursor_screen_pos(inner) {
                f.set_cursor_position(Position::new(x, y));
            }
        }
        None => {
            let paragraph = Paragraph::new(text.content())
                .block(block)
                .style(body_style)
                .wrap(Wrap { trim: false });
            f.render_widget(paragraph, area);
        }
    }
}
