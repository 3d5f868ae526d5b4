use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::config::Theme;
use crate::note::{Note, NoteKind};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

pub fn render_note_list(
    f: &mut Frame,
    area: Rect,
    notes: &[Note],
    list_state: &mut ListState,
    theme: &Theme,
) {
    // 2 for borders, 2 for the glyph and its space
    let max_width = area.width.saturating_sub(4) as usize;

    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };

    let items: Vec<ListItem> = notes
        .iter()
        .map(|note| {
            ListItem::new(format!("{} {}", glyph(note), fit(&note.display_title(), max_width)))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Notes ({})", notes.len())),
        )
        .style(Style::default().fg(parse_color(&theme.fg)))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(list, area, list_state);
}

fn glyph(note: &Note) -> &'static str {
    match note.kind() {
        NoteKind::Text(_) => "✎",
        NoteKind::Graphic(_) => "◩",
    }
}

fn fit(title: &str, max_width: usize) -> String {
    if title.chars().count() > max_width {
        title.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        title.to_string()
    }
}
