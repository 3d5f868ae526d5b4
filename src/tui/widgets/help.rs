use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::config::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let fg_color = parse_color(&config.theme.fg);
    let bg_color = parse_color(&config.theme.bg);
    let style = Style::default().fg(fg_color).bg(bg_color);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

/// Centered rect taking the given percentages of `area`
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// Centered rect with a fixed height, for dialogs
pub fn dialog_area(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("File:\n");
    text.push_str(&format!("  {}: New text note\n", key(&kb.new_text)));
    text.push_str(&format!("  {}: New sketch note\n", key(&kb.new_sketch)));
    text.push_str(&format!("  {}: Import text file (text notes)\n", key(&kb.import)));
    text.push_str(&format!("  {}: Export note\n", key(&kb.export)));
    text.push_str(&format!("  {}: Close note\n", key(&kb.close)));
    text.push_str(&format!("  {}: Exit\n", key(&kb.quit)));
    text.push('\n');

    text.push_str("Note:\n");
    text.push_str(&format!(
        "  {} / {}: Next / previous note\n",
        key(&kb.next_note),
        key(&kb.prev_note)
    ));
    text.push_str(&format!("  {}: Set title\n", key(&kb.title)));
    text.push_str(&format!("  {}: Lock / unlock\n", key(&kb.lock)));
    text.push_str(&format!("  {}: Attach alarm\n", key(&kb.alarm)));
    text.push('\n');

    text.push_str("Text notes:\n");
    text.push_str(&format!("  {}: Edit text (Esc to finish)\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Cycle font\n", key(&kb.font)));
    text.push_str("  1-9: Text color\n");
    text.push_str(&format!("  {} / {}: Copy / paste\n", key(&kb.copy), key(&kb.paste)));
    text.push('\n');

    text.push_str("Sketch notes:\n");
    text.push_str("  Mouse drag: Draw\n");
    text.push_str("  1-9: Pen color\n");
    text.push_str(&format!("  {}: Eraser\n", key(&kb.eraser)));
    text.push('\n');

    text.push_str(&format!("{}: Show/hide help\n", key(&kb.help)));
    text
}
