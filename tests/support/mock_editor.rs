use kak_mini::traits::{HostEditor, TextOps};
use kak_mini::types::{CursorStyle, EditOp, Position, Range, Selection};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

/// In-memory host editor for integration tests.
///
/// Columns are grapheme clusters, like the engine expects. Edits are
/// applied with conventional editor semantics: every position in a batch
/// refers to the pre-batch buffer, and existing selections are shifted
/// past inserted or deleted text.
pub struct MockEditor {
    rope: Rope,
    selections: Vec<Selection>,
    pub styles: Vec<CursorStyle>,
    pub primitive_calls: Vec<&'static str>,
}

impl MockEditor {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selections: vec![Selection::caret(Position::ZERO)],
            styles: Vec::new(),
            primitive_calls: Vec::new(),
        }
    }

    pub fn with_selections(text: &str, selections: Vec<Selection>) -> Self {
        let mut editor = Self::new(text);
        editor.selections = selections;
        editor
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn cursor_style(&self) -> Option<CursorStyle> {
        self.styles.last().copied()
    }

    fn line_str(&self, line: u32) -> String {
        if line as usize >= self.rope.len_lines() {
            return String::new();
        }
        let mut s = self.rope.line(line as usize).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        s
    }

    // Rope char index of a (line, grapheme-column) position.
    fn pos_to_char(&self, pos: Position) -> usize {
        let line = (pos.line as usize).min(self.rope.len_lines().saturating_sub(1));
        let mut idx = self.rope.line_to_char(line);
        for (i, grapheme) in self.line_str(line as u32).graphemes(true).enumerate() {
            if i as u32 >= pos.col {
                break;
            }
            idx += grapheme.chars().count();
        }
        idx
    }

    fn char_to_pos(&self, idx: usize) -> Position {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        let prefix_chars = idx - self.rope.line_to_char(line);
        let mut col = 0u32;
        let mut consumed = 0usize;
        for grapheme in self.line_str(line as u32).graphemes(true) {
            if consumed >= prefix_chars {
                break;
            }
            consumed += grapheme.chars().count();
            col += 1;
        }
        Position::new(line as u32, col)
    }

    fn word_start_before(&self, pos: Position) -> Position {
        let line = self.line_str(pos.line);
        let graphemes: Vec<&str> = line.graphemes(true).collect();
        let mut col = pos.col.min(graphemes.len() as u32) as usize;
        let is_word = |g: &str| {
            g.chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        };
        while col > 0 && !is_word(graphemes[col - 1]) {
            col -= 1;
        }
        while col > 0 && is_word(graphemes[col - 1]) {
            col -= 1;
        }
        Position::new(pos.line, col as u32)
    }

    fn matching_bracket(&self, pos: Position) -> Option<Position> {
        let open = "([{";
        let close = ")]}";
        let ch = self.char_at(pos)?;
        let (forward, counterpart) = if let Some(i) = open.find(ch) {
            (true, close.as_bytes()[i] as char)
        } else if let Some(i) = close.find(ch) {
            (false, open.as_bytes()[i] as char)
        } else {
            return None;
        };

        let start = self.pos_to_char(pos);
        let mut depth = 0i32;
        if forward {
            for (offset, c) in self.rope.slice(start..).chars().enumerate() {
                if c == ch {
                    depth += 1;
                } else if c == counterpart {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.char_to_pos(start + offset));
                    }
                }
            }
        } else {
            let chars: Vec<char> = self.rope.slice(..start + 1).chars().collect();
            for (back, c) in chars.iter().rev().enumerate() {
                if *c == ch {
                    depth += 1;
                } else if *c == counterpart {
                    depth -= 1;
                    if depth == 0 {
                        return Some(self.char_to_pos(start - back));
                    }
                }
            }
        }
        None
    }
}

impl TextOps for MockEditor {
    fn line_count(&self) -> u32 {
        self.rope.len_lines() as u32
    }

    fn line_len(&self, line: u32) -> u32 {
        self.line_str(line).graphemes(true).count() as u32
    }

    fn char_at(&self, pos: Position) -> Option<char> {
        self.line_str(pos.line)
            .graphemes(true)
            .nth(pos.col as usize)
            .and_then(|g| g.chars().next())
    }

    fn text_to_end(&self, pos: Position) -> String {
        self.rope.slice(self.pos_to_char(pos)..).to_string()
    }

    fn text_to_start(&self, pos: Position) -> String {
        self.rope.slice(..self.pos_to_char(pos)).to_string()
    }

    fn slice(&self, range: Range) -> String {
        let start = self.pos_to_char(range.start);
        let end = self.pos_to_char(range.end).max(start);
        self.rope.slice(start..end).to_string()
    }
}

impl HostEditor for MockEditor {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
    }

    fn apply_edits(&mut self, edits: Vec<EditOp>) {
        // Convert everything to char indices against the pre-batch rope,
        // then apply ops from the highest index down so earlier indices
        // stay valid, shifting selection endpoints as we go.
        let mut endpoints: Vec<(usize, usize)> = self
            .selections
            .iter()
            .map(|s| (self.pos_to_char(s.anchor), self.pos_to_char(s.active)))
            .collect();

        enum CharOp {
            Insert { at: usize, text: String },
            Delete { start: usize, end: usize },
        }

        let mut ops: Vec<CharOp> = edits
            .into_iter()
            .map(|op| match op {
                EditOp::Insert { at, text } => CharOp::Insert {
                    at: self.pos_to_char(at),
                    text,
                },
                EditOp::Delete { range } => CharOp::Delete {
                    start: self.pos_to_char(range.start),
                    end: self.pos_to_char(range.end),
                },
            })
            .collect();
        ops.sort_by_key(|op| {
            std::cmp::Reverse(match op {
                CharOp::Insert { at, .. } => *at,
                CharOp::Delete { start, .. } => *start,
            })
        });

        for op in ops {
            match op {
                CharOp::Insert { at, text } => {
                    self.rope.insert(at, &text);
                    let n = text.chars().count();
                    for (anchor, active) in &mut endpoints {
                        if *anchor >= at {
                            *anchor += n;
                        }
                        if *active >= at {
                            *active += n;
                        }
                    }
                }
                CharOp::Delete { start, end } => {
                    let end = end.min(self.rope.len_chars()).max(start);
                    self.rope.remove(start..end);
                    let shift = |p: &mut usize| {
                        if *p >= end {
                            *p -= end - start;
                        } else if *p > start {
                            *p = start;
                        }
                    };
                    for (anchor, active) in &mut endpoints {
                        shift(anchor);
                        shift(active);
                    }
                }
            }
        }

        self.selections = endpoints
            .into_iter()
            .map(|(anchor, active)| {
                Selection::new(self.char_to_pos(anchor), self.char_to_pos(active))
            })
            .collect();
    }

    fn set_cursor_style(&mut self, style: CursorStyle) {
        self.styles.push(style);
    }

    fn extend_word_left(&mut self) {
        self.primitive_calls.push("extend_word_left");
        let selections = self
            .selections
            .iter()
            .map(|sel| Selection::new(sel.anchor, self.word_start_before(sel.active)))
            .collect();
        self.selections = selections;
    }

    fn jump_to_bracket(&mut self) {
        self.primitive_calls.push("jump_to_bracket");
        let selections = self
            .selections
            .iter()
            .map(|sel| match self.matching_bracket(sel.active) {
                Some(pos) => Selection::new(sel.anchor, pos),
                None => *sel,
            })
            .collect();
        self.selections = selections;
    }

    fn expand_line_selection(&mut self) {
        self.primitive_calls.push("expand_line_selection");
        let last_line = self.line_count().saturating_sub(1);
        let selections = self
            .selections
            .iter()
            .map(|sel| {
                let first = sel.min().line;
                let last = sel.max().line;
                let end = if last < last_line {
                    Position::new(last + 1, 0)
                } else {
                    Position::new(last, self.line_len(last))
                };
                Selection::new(Position::new(first, 0), end)
            })
            .collect();
        self.selections = selections;
    }

    fn cursor_home(&mut self, select: bool) {
        self.primitive_calls.push("cursor_home");
        let selections = self
            .selections
            .iter()
            .map(|sel| {
                let pos = Position::new(sel.active.line, 0);
                Selection::new(if select { sel.anchor } else { pos }, pos)
            })
            .collect();
        self.selections = selections;
    }

    fn cursor_end(&mut self, select: bool) {
        self.primitive_calls.push("cursor_end");
        let selections = self
            .selections
            .iter()
            .map(|sel| {
                let pos = Position::new(sel.active.line, self.line_len(sel.active.line));
                Selection::new(if select { sel.anchor } else { pos }, pos)
            })
            .collect();
        self.selections = selections;
    }
}
