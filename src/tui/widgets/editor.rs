use ratatui::layout::Rect;

/// Editable text buffer behind a form field.
///
/// Single-line editors ignore newlines; multi-line editors split on them. The cursor
/// column is counted in chars, never bytes.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    multi_line: bool,
}

impl Editor {
    pub fn single_line() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            multi_line: false,
        }
    }

    pub fn multi_line() -> Self {
        Self {
            multi_line: true,
            ..Self::single_line()
        }
    }

    /// Editor pre-filled with `content`, cursor at the end
    pub fn from_string(content: &str, multi_line: bool) -> Self {
        let lines: Vec<String> = if content.is_empty() {
            vec![String::new()]
        } else if multi_line {
            content.split('\n').map(|s| s.to_string()).collect()
        } else {
            vec![content.replace('\n', " ")]
        };
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
            multi_line,
        }
    }

    pub fn is_multi_line(&self) -> bool {
        self.multi_line
    }

    fn current_len(&self) -> usize {
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
        let col = self.cursor_col.min(self.current_len());
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let mut chars: Vec<char> = line.chars().collect();
            chars.insert(col, ch);
            *line = chars.into_iter().collect();
            self.cursor_col = col + 1;
        }
    }

    pub fn insert_newline(&mut self) {
        if !self.multi_line {
            return;
        }
        let col = self.cursor_col.min(self.current_len());
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let rest: String = line.chars().skip(col).collect();
            *line = line.chars().take(col).collect();
            self.lines.insert(self.cursor_line + 1, rest);
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        let col = self.cursor_col.min(self.current_len());
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
            self.cursor_col = self.current_len();
            if let Some(prev) = self.lines.get_mut(self.cursor_line) {
                prev.push_str(&current);
            }
        }
    }

    /// Delete the char under the cursor
    pub fn delete_forward(&mut self) {
        let len = self.current_len();
        let col = self.cursor_col.min(len);
        if col < len {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let mut chars: Vec<char> = line.chars().collect();
                chars.remove(col);
                *line = chars.into_iter().collect();
            }
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                line.push_str(&next);
            }
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col = self.cursor_col.min(self.current_len()) - 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.cursor_col.min(self.current_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = self.cursor_col.min(self.current_len());
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_len();
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines to show in a viewport `height` rows tall, keeping the cursor line visible.
    /// Returns the index of the first shown line with the lines.
    pub fn visible_lines(&self, height: usize) -> (usize, &[String]) {
        if height == 0 {
            return (0, &[]);
        }
        let start = (self.cursor_line + 1).saturating_sub(height);
        let end = (start + height).min(self.lines.len());
        (start, &self.lines[start..end])
    }

    /// Screen position of the cursor inside `area` (no borders), clamped to the area
    pub fn cursor_screen_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.width == 0 || area.height == 0 {
            return None;
        }
        let (first, _) = self.visible_lines(area.height as usize);
        let row = (self.cursor_line - first) as u16;
        let col = self.cursor_col.min(self.current_len()) as u16;
        let x = area.x + col.min(area.width.saturating_sub(1));
        Some((x, area.y + row))
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::single_line()
    }
}
