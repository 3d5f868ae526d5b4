use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::Theme;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::help::dialog_area;

/// Modal shown when an alarm fires
pub fn render_alert(f: &mut Frame, area: Rect, message: &str, waiting: usize, theme: &Theme) {
    let bg_color = parse_color(&theme.highlight_bg);
    let fg_color = get_contrast_text_color(bg_color);

    let popup_area = dialog_area(area, 40, 7);
    f.render_widget(Clear, popup_area);

    let footer = if waiting > 1 {
        format!("Enter: OK ({} more)", waiting - 1)
    } else {
        "Enter: OK".to_string()
    };
    let lines = vec![
        Line::from(""),
        Line::from(message).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(footer),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Alarm")
                .title_alignment(Alignment::Center),
        )
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(paragraph, popup_area);
}
