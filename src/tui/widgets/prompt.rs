use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::config::Theme;
use crate::tui::app::Prompt;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::help::dialog_area;

pub fn render_prompt(f: &mut Frame, area: Rect, prompt: &mut Prompt, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight = parse_color(&theme.highlight_bg);

    // Label and value line per field, an error line, and the borders
    let height = prompt.fields.len() as u16 * 2 + 3;
    let popup_area = dialog_area(area, 50, height);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(prompt.title())
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    let inner = block.inner(popup_area);
    let width = inner.width.saturating_sub(2) as usize;

    let mut lines = Vec::with_capacity(prompt.fields.len() * 2 + 1);
    let mut cursor = None;
    for (index, field) in prompt.fields.iter_mut().enumerate() {
        let label_style = if index == prompt.active {
            Style::default().fg(highlight).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(field.label, label_style)));

        field.editor.update_scroll(1, width);
        let value = field.editor.get_visible_lines(1, width).concat();
        lines.push(Line::from(format!("> {}", value)));

        if index == prompt.active {
            let row = inner.y + index as u16 * 2 + 1;
            let value_area = Rect::new(inner.x + 2, row, inner.width.saturating_sub(2), 1);
            cursor = field.editor.get_cursor_screen_pos(value_area);
        }
    }
    if let Some(ref error) = prompt.error {
        lines.push(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(parse_color("lightred")),
        )));
    }

    f.render_widget(Paragraph::new(lines).block(block), popup_area);
    if let Some((x, y)) = cursor {
        f.set_cursor_position(Position::new(x, y));
    }
}
