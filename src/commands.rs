use unicode_segmentation::UnicodeSegmentation;

use crate::engine::Engine;
use crate::traits::HostEditor;
use crate::types::{EditOp, Mode, Position, Selection};

/// The four single-step motion directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Second half of a `g`/`G` compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GotoTarget {
    /// `g g` - first line of the buffer.
    FirstLine,
    /// `g e` - last line of the buffer.
    LastLine,
    /// `g h` - start of the current line.
    LineStart,
    /// `g i` - first non-blank character of the current line.
    FirstNonBlank,
    /// `g l` - end of the current line.
    LineEnd,
}

impl GotoTarget {
    pub fn from_char(c: char) -> Option<GotoTarget> {
        match c {
            'g' => Some(GotoTarget::FirstLine),
            'e' => Some(GotoTarget::LastLine),
            'h' => Some(GotoTarget::LineStart),
            'i' => Some(GotoTarget::FirstNonBlank),
            'l' => Some(GotoTarget::LineEnd),
            _ => None,
        }
    }
}

/// Every command the engine can dispatch.
///
/// Command identity is this closed enum rather than raw key strings; the
/// `g`/`G` compounds synthesized by the goto sub-modes are ordinary
/// variants. Lowercase tokens collapse the selection before acting,
/// uppercase tokens keep the anchor and extend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// `i` - insert before the selection.
    InsertBefore,
    /// `a` - insert after the selection.
    InsertAfter,
    /// `h j k l` / `H J K L` - single-step motion.
    Move { dir: Direction, extend: bool },
    /// `w` / `W` - select to the next word start.
    WordStart { extend: bool },
    /// `e` / `E` - select to the next word end.
    WordEnd { extend: bool },
    /// `b` / `B` - select one word to the left.
    WordLeft { extend: bool },
    /// `f` / `F` - wait for a character, then select through it.
    FindPrompt { extend: bool },
    /// `t` / `T` - wait for a character, then select up to it.
    ToPrompt { extend: bool },
    /// Dispatched by the engine when find mode receives its target.
    FindChar,
    /// Dispatched by the engine when to mode receives its target.
    ToChar,
    /// `x` / `X` - expand the selection to whole lines.
    ExpandLine { extend: bool },
    /// `%` - select the whole buffer.
    SelectAll,
    /// `m` - jump each active end to its matching bracket.
    MatchBracket,
    /// `g` / `G` - goto line `n`, or enter a goto sub-mode without a count.
    GotoLine { extend: bool },
    /// A completed `g`/`G` compound.
    Goto { target: GotoTarget, extend: bool },
    /// `d` - delete the selection contents.
    Delete,
    /// Select from each active end to the line start.
    SelectToLineStart { full: bool },
    /// Select from each active end to the line end.
    SelectToLineEnd { full: bool },
}

/// The argument payload a dispatch carries, tagged per command category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandArg {
    /// Motions and mode switches take nothing.
    None,
    /// Non-repeatable commands receive the pending count, if any.
    Line(Option<u32>),
    /// Find/to commands receive their target and direction.
    Target { ch: char, forward: bool },
}

impl CommandId {
    /// The command bound to a selection-mode token, if any.
    pub fn from_token(c: char) -> Option<CommandId> {
        use CommandId::*;
        match c {
            'i' => Some(InsertBefore),
            'a' => Some(InsertAfter),
            'h' => Some(Move { dir: Direction::Left, extend: false }),
            'H' => Some(Move { dir: Direction::Left, extend: true }),
            'l' => Some(Move { dir: Direction::Right, extend: false }),
            'L' => Some(Move { dir: Direction::Right, extend: true }),
            'j' => Some(Move { dir: Direction::Down, extend: false }),
            'J' => Some(Move { dir: Direction::Down, extend: true }),
            'k' => Some(Move { dir: Direction::Up, extend: false }),
            'K' => Some(Move { dir: Direction::Up, extend: true }),
            'w' => Some(WordStart { extend: false }),
            'W' => Some(WordStart { extend: true }),
            'e' => Some(WordEnd { extend: false }),
            'E' => Some(WordEnd { extend: true }),
            'b' => Some(WordLeft { extend: false }),
            'B' => Some(WordLeft { extend: true }),
            'f' => Some(FindPrompt { extend: false }),
            'F' => Some(FindPrompt { extend: true }),
            't' => Some(ToPrompt { extend: false }),
            'T' => Some(ToPrompt { extend: true }),
            'x' => Some(ExpandLine { extend: false }),
            'X' => Some(ExpandLine { extend: true }),
            '%' => Some(SelectAll),
            'm' => Some(MatchBracket),
            'g' => Some(GotoLine { extend: false }),
            'G' => Some(GotoLine { extend: true }),
            'd' => Some(Delete),
            _ => None,
        }
    }

    /// Whether a pending count repeats the command instead of being
    /// passed as an argument.
    pub fn repeatable(&self) -> bool {
        matches!(
            self,
            CommandId::Move { .. }
                | CommandId::WordStart { .. }
                | CommandId::WordEnd { .. }
                | CommandId::WordLeft { .. }
        )
    }
}

pub(crate) fn exec<H: HostEditor>(
    id: CommandId,
    engine: &mut Engine,
    host: &mut H,
    arg: CommandArg,
) {
    use CommandId::*;
    match id {
        InsertBefore => insert_before(engine, host),
        InsertAfter => insert_after(engine, host),
        Move { dir, extend } => move_cursor(host, dir, extend),
        WordStart { extend } => word_motion(host, extend, WordFlavor::Start),
        WordEnd { extend } => word_motion(host, extend, WordFlavor::End),
        WordLeft { extend } => {
            if !extend {
                engine.reset_cursor(host);
            }
            host.extend_word_left();
        }
        FindPrompt { extend } => {
            if !extend {
                engine.reset_cursor(host);
            }
            engine.set_mode(host, Mode::CharFind);
        }
        ToPrompt { extend } => {
            if !extend {
                engine.reset_cursor(host);
            }
            engine.set_mode(host, Mode::CharTo);
        }
        FindChar | ToChar => {
            let CommandArg::Target { ch, forward } = arg else {
                return;
            };
            find_char(engine, host, ch, forward, matches!(id, FindChar));
        }
        ExpandLine { extend } => {
            if !extend {
                engine.reset_cursor(host);
            }
            host.expand_line_selection();
        }
        SelectAll => {
            let end = host.end_of_buffer();
            host.set_selections(vec![Selection::new(Position::ZERO, end)]);
        }
        MatchBracket => host.jump_to_bracket(),
        GotoLine { extend } => match arg {
            CommandArg::Line(Some(n)) => goto_line(host, n, extend),
            _ => {
                let sub = if extend { Mode::GotoExtend } else { Mode::Goto };
                engine.set_mode(host, sub);
            }
        },
        Goto { target, extend } => goto_target(host, target, extend),
        Delete => delete_selections(engine, host),
        SelectToLineStart { full } => {
            if full {
                engine.reset_cursor(host);
            }
            host.cursor_home(true);
        }
        SelectToLineEnd { full } => {
            if full {
                engine.reset_cursor(host);
            }
            host.cursor_end(true);
        }
    }
}

// ---- mode-entry commands ----

fn insert_before<H: HostEditor>(engine: &mut Engine, host: &mut H) {
    // If the cursor sits at the end of the selection, swap anchor and
    // active so insertion happens at the front.
    let selections = host
        .selections()
        .into_iter()
        .map(|sel| {
            if sel.anchor < sel.active {
                Selection::new(sel.active, sel.anchor)
            } else {
                sel
            }
        })
        .collect();
    host.set_selections(selections);
    engine.set_mode(host, Mode::Insert);
}

fn insert_after<H: HostEditor>(engine: &mut Engine, host: &mut H) {
    // Mirror image of `i`: the cursor must end up at the back. A bare
    // caret shifts one to the right so typing appends.
    let selections = host
        .selections()
        .into_iter()
        .map(|sel| {
            if sel.is_caret() {
                let pos = host.clamp(Position::new(sel.active.line, sel.active.col + 1));
                Selection::caret(pos)
            } else if sel.anchor > sel.active {
                Selection::new(sel.active, sel.anchor)
            } else {
                sel
            }
        })
        .collect();
    host.set_selections(selections);
    engine.set_mode(host, Mode::Insert);
}

// ---- single-step motion ----

fn step<H: HostEditor>(host: &H, pos: Position, dir: Direction) -> Option<Position> {
    match dir {
        Direction::Left => (pos.col > 0).then(|| Position::new(pos.line, pos.col - 1)),
        Direction::Right => {
            (pos.col < host.line_len(pos.line)).then(|| Position::new(pos.line, pos.col + 1))
        }
        Direction::Up => (pos.line > 0).then(|| host.clamp(Position::new(pos.line - 1, pos.col))),
        Direction::Down => {
            (pos.line + 1 < host.line_count()).then(|| host.clamp(Position::new(pos.line + 1, pos.col)))
        }
    }
}

fn move_cursor<H: HostEditor>(host: &mut H, dir: Direction, extend: bool) {
    let selections: Vec<Selection> = host
        .selections()
        .into_iter()
        .map(|sel| match step(host, sel.active, dir) {
            Some(pos) => Selection::new(if extend { sel.anchor } else { pos }, pos),
            // At a buffer boundary this cursor stays; the rest still move.
            None => sel,
        })
        .collect();
    host.set_selections(selections);
}

// ---- word motion ----

#[derive(Clone, Copy, PartialEq, Eq)]
enum WordFlavor {
    /// Stop at the next word start (skip trailing whitespace).
    Start,
    /// Stop at the next word end (skip leading whitespace).
    End,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Space,
    Punct,
}

fn classify(grapheme: &str) -> CharClass {
    match grapheme.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => CharClass::Word,
        Some(c) if c.is_whitespace() => CharClass::Space,
        _ => CharClass::Punct,
    }
}

fn run_len(graphemes: &[&str], from: usize, class: CharClass) -> usize {
    graphemes[from..]
        .iter()
        .take_while(|g| classify(g) == class)
        .count()
}

/// How many graphemes a word motion jumps over, starting at the cursor.
/// A run of punctuation wins outright; otherwise `Start` consumes
/// word-then-space and `End` consumes space-then-word.
fn word_jump(text: &str, flavor: WordFlavor) -> usize {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    let punct = run_len(&graphemes, 0, CharClass::Punct);
    if punct > 0 {
        return punct;
    }
    match flavor {
        WordFlavor::Start => {
            let word = run_len(&graphemes, 0, CharClass::Word);
            word + run_len(&graphemes, word, CharClass::Space)
        }
        WordFlavor::End => {
            let space = run_len(&graphemes, 0, CharClass::Space);
            space + run_len(&graphemes, space, CharClass::Word)
        }
    }
}

/// Walk `steps` graphemes forward through `text`, which starts at `pos`.
fn advance_through(pos: Position, text: &str, steps: usize) -> Position {
    let mut line = pos.line;
    let mut col = pos.col;
    for grapheme in text.graphemes(true).take(steps) {
        if grapheme.contains('\n') {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    Position::new(line, col)
}

fn word_motion<H: HostEditor>(host: &mut H, extend: bool, flavor: WordFlavor) {
    let selections: Vec<Selection> = host
        .selections()
        .into_iter()
        .map(|sel| {
            let start = sel.active;
            let text = host.text_to_end(start);
            let jump = word_jump(&text, flavor);
            let target = advance_through(start, &text, jump);
            let anchor = if extend { sel.anchor } else { start };
            Selection::new(anchor, target)
        })
        .collect();
    host.set_selections(selections);
}

// ---- character search ----

/// Extend each selection through (`include`) or up to the next occurrence
/// of `target`. Cursors whose remaining text lacks the target stay put.
/// Always returns the engine to selection mode.
pub(crate) fn find_char<H: HostEditor>(
    engine: &mut Engine,
    host: &mut H,
    target: char,
    forward: bool,
    include: bool,
) {
    let needle = target.to_string();
    let selections: Vec<Selection> = host
        .selections()
        .into_iter()
        .map(|sel| {
            let active = sel.active;
            if forward {
                let text = host.text_to_end(active);
                let found = text.graphemes(true).position(|g| g == needle);
                let steps = match found {
                    Some(i) if include => i + 1,
                    Some(i) => i,
                    None => 0,
                };
                if steps == 0 {
                    return sel;
                }
                Selection::new(sel.anchor, advance_through(active, &text, steps))
            } else {
                let text = host.text_to_start(active);
                let reversed: Vec<&str> = text.graphemes(true).rev().collect();
                let found = reversed.iter().position(|g| **g == needle);
                let steps = match found {
                    Some(i) if include => i + 1,
                    Some(i) => i,
                    None => 0,
                };
                if steps == 0 {
                    return sel;
                }
                let mut pos = active;
                for grapheme in reversed.iter().take(steps) {
                    if grapheme.contains('\n') {
                        pos.line -= 1;
                        pos.col = host.line_len(pos.line);
                    } else {
                        pos.col -= 1;
                    }
                }
                Selection::new(sel.anchor, pos)
            }
        })
        .collect();
    host.set_selections(selections);
    engine.set_mode(host, Mode::Select);
}

// ---- goto ----

fn first_non_blank<H: HostEditor>(host: &H, line: u32) -> Position {
    let len = host.line_len(line);
    for col in 0..len {
        let at = Position::new(line, col);
        if host.char_at(at).is_some_and(|c| !c.is_whitespace()) {
            return at;
        }
    }
    Position::new(line, 0)
}

fn goto_target<H: HostEditor>(host: &mut H, target: GotoTarget, extend: bool) {
    let selections: Vec<Selection> = host
        .selections()
        .into_iter()
        .map(|sel| {
            let pos = match target {
                GotoTarget::FirstLine => Position::ZERO,
                GotoTarget::LastLine => Position::new(host.line_count().saturating_sub(1), 0),
                GotoTarget::LineStart => Position::new(sel.active.line, 0),
                GotoTarget::FirstNonBlank => first_non_blank(host, sel.active.line),
                GotoTarget::LineEnd => {
                    Position::new(sel.active.line, host.line_len(sel.active.line))
                }
            };
            Selection::new(if extend { sel.anchor } else { pos }, pos)
        })
        .collect();
    host.set_selections(selections);
}

fn goto_line<H: HostEditor>(host: &mut H, n: u32, extend: bool) {
    // The argument is one-based; clamp into the buffer.
    let line = n.saturating_sub(1).min(host.line_count().saturating_sub(1));
    let pos = Position::new(line, 0);
    let selections: Vec<Selection> = host
        .selections()
        .into_iter()
        .map(|sel| Selection::new(if extend { sel.anchor } else { pos }, pos))
        .collect();
    host.set_selections(selections);
}

// ---- deletion ----

fn delete_selections<H: HostEditor>(engine: &mut Engine, host: &mut H) {
    let selections = host.selections();
    let mut edits = Vec::new();
    let mut pieces = Vec::with_capacity(selections.len());
    for sel in &selections {
        let mut range = sel.range();
        if range.is_empty() {
            // A bare caret deletes the character after it, or the line
            // break when the caret sits at the line end.
            let pos = range.start;
            if pos.col < host.line_len(pos.line) {
                range.end = Position::new(pos.line, pos.col + 1);
            } else if pos.line + 1 < host.line_count() {
                range.end = Position::new(pos.line + 1, 0);
            }
        }
        pieces.push(host.slice(range));
        if !range.is_empty() {
            edits.push(EditOp::Delete { range });
        }
    }

    let registers = engine.registers_mut();
    registers.clear(None);
    for piece in pieces {
        registers.append(piece, None);
    }

    if !edits.is_empty() {
        host.apply_edits(edits);
    }
    let collapsed = host.selections().iter().map(Selection::collapsed).collect();
    host.set_selections(collapsed);
}
