//! Terminal UI example using crossterm and ratatui.
//!
//! This example demonstrates how to integrate kak_mini into a terminal
//! application. Run with: cargo run --example tui_crossterm
//!
//! Keys follow the engine's defaults: hjkl to move (HJKL to extend),
//! w/e/b for words, f/t to find, g for goto, i/a to insert, d to delete,
//! Esc to leave insert mode, Ctrl+q to quit.

use crossterm::{
    event::{self, Event, KeyCode as CKeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use ropey::Rope;
use std::io;
use unicode_segmentation::UnicodeSegmentation;
use kak_mini::{
    Engine, InputEvent, KeyCode, KeyEvent, Mode, Modifiers,
    traits::{HostEditor, TextOps},
    types::*,
};

/// Text buffer implementation using ropey
struct RopeHost {
    rope: Rope,
    selections: Vec<Selection>,
    cursor_style: CursorStyle,
}

impl RopeHost {
    fn new() -> Self {
        Self {
            rope: Rope::from(
                "Welcome to kak_mini!\n\nEverything is a selection: motions move the cursor,\nuppercase motions extend, i/a drop you into insert mode.\n\nTry:\n- 3w to select three words ahead\n- fo to select through the next 'o'\n- gl to jump to the line end\n- typing (, [ or \" in insert mode\n",
            ),
            selections: vec![Selection::caret(Position::ZERO)],
            cursor_style: CursorStyle::Block,
        }
    }

    fn line_str(&self, line: u32) -> String {
        if line as usize >= self.rope.len_lines() {
            return String::new();
        }
        let mut s = self.rope.line(line as usize).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

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
        let prefix = idx - self.rope.line_to_char(line);
        let mut col = 0u32;
        let mut consumed = 0usize;
        for grapheme in self.line_str(line as u32).graphemes(true) {
            if consumed >= prefix {
                break;
            }
            consumed += grapheme.chars().count();
            col += 1;
        }
        Position::new(line as u32, col)
    }
}

impl TextOps for RopeHost {
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

impl HostEditor for RopeHost {
    fn selections(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    fn set_selections(&mut self, selections: Vec<Selection>) {
        self.selections = selections;
    }

    fn apply_edits(&mut self, edits: Vec<EditOp>) {
        let mut endpoints: Vec<(usize, usize)> = self
            .selections
            .iter()
            .map(|s| (self.pos_to_char(s.anchor), self.pos_to_char(s.active)))
            .collect();

        // Convert to char indices against the pre-batch rope, then apply
        // highest index first so earlier coordinates stay valid
        let mut ops: Vec<(usize, usize, Option<String>)> = edits
            .into_iter()
            .map(|op| match op {
                EditOp::Insert { at, text } => (self.pos_to_char(at), 0, Some(text)),
                EditOp::Delete { range } => (
                    self.pos_to_char(range.start),
                    self.pos_to_char(range.end),
                    None,
                ),
            })
            .collect();
        ops.sort_by_key(|(at, ..)| std::cmp::Reverse(*at));

        for (at, end, text) in ops {
            match text {
                Some(text) => {
                    self.rope.insert(at, &text);
                    let n = text.chars().count();
                    for endpoint in endpoints.iter_mut().flat_map(|(a, b)| [a, b]) {
                        if *endpoint >= at {
                            *endpoint += n;
                        }
                    }
                }
                None => {
                    let end = end.min(self.rope.len_chars()).max(at);
                    self.rope.remove(at..end);
                    for endpoint in endpoints.iter_mut().flat_map(|(a, b)| [a, b]) {
                        if *endpoint >= end {
                            *endpoint -= end - at;
                        } else if *endpoint > at {
                            *endpoint = at;
                        }
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
        self.cursor_style = style;
    }

    fn extend_word_left(&mut self) {
        let selections = self
            .selections
            .iter()
            .map(|sel| {
                let line = self.line_str(sel.active.line);
                let graphemes: Vec<&str> = line.graphemes(true).collect();
                let mut col = sel.active.col.min(graphemes.len() as u32) as usize;
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
                Selection::new(sel.anchor, Position::new(sel.active.line, col as u32))
            })
            .collect();
        self.selections = selections;
    }

    fn jump_to_bracket(&mut self) {}

    fn expand_line_selection(&mut self) {
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

fn translate_key(event: crossterm::event::KeyEvent) -> Option<InputEvent> {
    let mut mods = Modifiers::empty();
    if event.modifiers.contains(KeyModifiers::SHIFT) {
        mods |= Modifiers::SHIFT;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) {
        mods |= Modifiers::CTRL;
    }
    if event.modifiers.contains(KeyModifiers::ALT) {
        mods |= Modifiers::ALT;
    }
    let code = match event.code {
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        _ => return None,
    };
    KeyEvent::new(code, mods).into_input()
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Insert => "INSERT",
        Mode::Select => "SELECT",
        Mode::CharFind => "FIND",
        Mode::CharTo => "TO",
        Mode::Goto => "GOTO",
        Mode::GotoExtend => "GOTO+",
    }
}

fn draw(frame: &mut Frame, host: &RopeHost, engine: &Engine) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(frame.size());

    let selected = Style::default()
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD);
    let cursor = Style::default().add_modifier(Modifier::REVERSED);

    let mut lines = Vec::new();
    for line_no in 0..host.line_count() {
        let text = host.line_str(line_no);
        let mut spans = Vec::new();
        for (col, grapheme) in text.graphemes(true).chain(std::iter::once(" ")).enumerate() {
            let pos = Position::new(line_no, col as u32);
            let style = if host.selections.iter().any(|s| s.active == pos) {
                cursor
            } else if host
                .selections
                .iter()
                .any(|s| !s.is_caret() && s.min() <= pos && pos < s.max())
            {
                selected
            } else {
                Style::default()
            };
            spans.push(Span::styled(grapheme.to_string(), style));
        }
        lines.push(Line::from(spans));
    }

    let editor = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("buffer"));
    frame.render_widget(editor, chunks[0]);

    let snapshot = engine.snapshot();
    let status = format!(
        " {} | count: {} | cursor: {:?} | Ctrl+q quits",
        mode_label(snapshot.mode),
        snapshot
            .pending_count
            .map_or_else(|| "-".to_string(), |n| n.to_string()),
        host.cursor_style,
    );
    let bar = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, chunks[1]);
}

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut host = RopeHost::new();
    let mut engine = Engine::new();

    loop {
        terminal.draw(|frame| draw(frame, &host, &engine))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.code == CKeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            if let Some(input) = translate_key(key) {
                engine.process_input(&mut host, input);
            }
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}
