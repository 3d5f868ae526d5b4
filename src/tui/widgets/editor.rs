use ratatui::layout::Rect;
use std::cmp;

/// Line buffer behind text-note edit mode and prompt fields.
///
/// Cursor columns count chars, never bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize, // Vertical scroll (line offset)
    pub scroll_col: usize,    // Horizontal scroll (column offset)
    single_line: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            scroll_col: 0,
            single_line: false,
        }
    }

    /// An editor that ignores newlines, for prompt fields
    pub fn single_line() -> Self {
        Self {
            single_line: true,
            ..Self::new()
        }
    }

    /// Load `content` with the cursor at its end. Line breaks survive a
    /// round trip through [`Editor::content`], trailing ones included.
    pub fn from_string(content: &str) -> Self {
        let lines: Vec<String> = content.split('\n').map(|s| s.to_string()).collect();
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
            ..Self::new()
        }
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    fn ensure_cursor_valid(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_line >= self.lines.len() {
            self.cursor_line = self.lines.len() - 1;
        }
    }

    fn current_line_len(&self) -> usize {
        self.lines
            .get(self.cursor_line)
            .map(|l| l.chars().count())
            .unwrap_or(0)
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        self.ensure_cursor_valid();
        let col = cmp::min(self.cursor_col, self.current_line_len());
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let mut chars: Vec<char> = line.chars().collect();
            chars.insert(col, ch);
            *line = chars.into_iter().collect();
            self.cursor_col = col + 1;
        }
    }

    /// Backspace: delete before the cursor, merging lines at column 0
    pub fn delete_char(&mut self) {
        self.ensure_cursor_valid();
        let col = cmp::min(self.cursor_col, self.current_line_len());
        if col > 0 {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let mut chars: Vec<char> = line.chars().collect();
                chars.remove(col - 1);
                *line = chars.into_iter().collect();
                self.cursor_col = col - 1;
            }
        } else if self.cursor_line > 0 {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            if let Some(prev) = self.lines.get_mut(self.cursor_line) {
                self.cursor_col = prev.chars().count();
                prev.push_str(&current);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        if self.single_line {
            return;
        }
        self.ensure_cursor_valid();
        let col = cmp::min(self.cursor_col, self.current_line_len());
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let mut chars: Vec<char> = line.chars().collect();
            let remainder: String = chars.split_off(col).into_iter().collect();
            *line = chars.into_iter().collect();
            self.lines.insert(self.cursor_line + 1, remainder);
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_line_len());
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn get_visible_lines(&self, viewport_height: usize, viewport_width: usize) -> Vec<String> {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());
        self.lines[start..end]
            .iter()
            .map(|line| line.chars().skip(self.scroll_col).take(viewport_width).collect())
            .collect()
    }

    /// Keep the cursor inside a viewport of the given size
    pub fn update_scroll(&mut self, viewport_height: usize, viewport_width: usize) {
        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if viewport_height > 0 && self.cursor_line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor_line + 1 - viewport_height;
        }

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if viewport_width > 0 && self.cursor_col >= self.scroll_col + viewport_width {
            self.scroll_col = self.cursor_col + 1 - viewport_width;
        }
    }

    /// Screen position of the cursor inside `inner` (an area without borders)
    pub fn get_cursor_screen_pos(&self, inner: Rect) -> Option<(u16, u16)> {
        let row = self.cursor_line.checked_sub(self.scroll_offset)?;
        let col = self.cursor_col.checked_sub(self.scroll_col)?;
        if row >= inner.height as usize || col >= inner.width as usize {
            return None;
        }
        Some((inner.x + col as u16, inner.y + row as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_line_breaks() {
        let text = "first\n\nthird\n";
        assert_eq!(Editor::from_string(text).content(), text);
    }

    #[test]
    fn backspace_merges_lines() {
        let mut editor = Editor::from_string("ab\ncd");
        editor.move_cursor_home();
        editor.delete_char();
        assert_eq!(editor.content(), "abcd");
        assert_eq!((editor.cursor_line, editor.cursor_col), (0, 2));
    }

    #[test]
    fn inserts_multibyte_chars_by_position() {
        let mut editor = Editor::from_string("né");
        editor.move_cursor_left();
        editor.insert_char('x');
        assert_eq!(editor.content(), "nxé");
    }

    #[test]
    fn single_line_ignores_newline() {
        let mut editor = Editor::single_line();
        editor.insert_char('5');
        editor.insert_char('\n');
        assert_eq!(editor.content(), "5");
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut editor = Editor::from_string("1\n2\n3\n4\n5");
        editor.update_scroll(2, 10);
        assert_eq!(editor.scroll_offset, 3);
        let inner = Rect::new(0, 0, 10, 2);
        assert_eq!(editor.get_cursor_screen_pos(inner), Some((1, 1)));
    }
}
