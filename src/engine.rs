use crate::commands::{self, CommandArg, CommandId, GotoTarget};
use crate::key::{InputEvent, Signal};
use crate::pairs;
use crate::registers::Registers;
use crate::traits::HostEditor;
use crate::types::{CursorStyle, EditOp, Mode, Position, Range, Selection};

/// Ceiling for accumulated repeat counts. Keeps a pathological digit
/// stream from wedging the session in a billion-iteration repeat loop.
const MAX_COUNT: u32 = 99_999;

#[derive(Debug, Default, Clone)]
struct Counts {
    current: Option<u32>,
}

impl Counts {
    fn push_digit(&mut self, d: u32) {
        let next = self
            .current
            .unwrap_or(0)
            .saturating_mul(10)
            .saturating_add(d);
        self.current = Some(next.min(MAX_COUNT));
    }

    fn take(&mut self) -> Option<u32> {
        self.current.take()
    }

    fn take_or(&mut self, default_: u32) -> u32 {
        let v = self.current.take().unwrap_or(default_);
        v.max(1)
    }
}

/// Which way the next pair-skip nudge moves an insert-mode cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nudge {
    None,
    Left,
    Right,
}

/// The modal dispatcher: one per editing session.
///
/// Owns the current [`Mode`], the pending repeat count, and the pending
/// search direction. Feed it one [`InputEvent`] per call through
/// [`Engine::process_input`]; all buffer and selection effects flow through
/// the [`HostEditor`] passed in.
#[derive(Debug, Clone)]
pub struct Engine {
    mode: Mode,
    counts: Counts,
    search_forward: bool,
    auto_pairs: bool,
    registers: Registers<String>,
}

/// A read-only view of the engine's transient state, for status lines
/// and tests.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub mode: Mode,
    pub pending_count: Option<u32>,
    pub search_forward: bool,
}

pub struct EngineBuilder {
    mode: Mode,
    auto_pairs: bool,
    default_register: char,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            mode: Mode::Select,
            auto_pairs: true,
            default_register: '"',
        }
    }
}

impl EngineBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Disable to insert bracket and quote characters literally.
    pub fn auto_pairs(mut self, enabled: bool) -> Self {
        self.auto_pairs = enabled;
        self
    }

    /// The register deletions are recorded into.
    pub fn default_register(mut self, register: char) -> Self {
        self.default_register = register;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            mode: self.mode,
            counts: Counts::default(),
            search_forward: true,
            auto_pairs: self.auto_pairs,
            registers: Registers::new(self.default_register),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            mode: self.mode,
            pending_count: self.counts.current,
            search_forward: self.search_forward,
        }
    }

    pub fn registers(&self) -> &Registers<String> {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers<String> {
        &mut self.registers
    }

    /// Back to selection mode with collapsed cursors and no pending state.
    pub fn reset_state<H: HostEditor>(&mut self, host: &mut H) {
        self.set_mode(host, Mode::Select);
        self.reset_cursor(host);
        self.counts = Counts::default();
        self.search_forward = true;
    }

    /// Switch modes, signaling the host's cursor style. Entering insert
    /// mode collapses every selection to its active end.
    pub fn set_mode<H: HostEditor>(&mut self, host: &mut H, mode: Mode) {
        log::trace!("mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        match mode {
            Mode::Insert => {
                host.set_cursor_style(CursorStyle::Bar);
                self.reset_cursor(host);
            }
            _ => host.set_cursor_style(CursorStyle::Block),
        }
    }

    /// Collapse every selection to its active end.
    pub fn reset_cursor<H: HostEditor>(&self, host: &mut H) {
        let collapsed = host.selections().iter().map(Selection::collapsed).collect();
        host.set_selections(collapsed);
    }

    /// Feed one input token through the state machine.
    ///
    /// Each call runs to completion - every repetition of a repeatable
    /// command and every per-cursor edit - before transient state
    /// (pending count, search direction) is cleared.
    pub fn process_input<H: HostEditor>(&mut self, host: &mut H, input: InputEvent) {
        match input {
            InputEvent::Signal(signal) => self.handle_signal(host, signal),
            InputEvent::Backspace => {
                if self.mode == Mode::Insert {
                    self.backspace(host);
                } else {
                    // Reserved token with no selection-mode binding.
                    self.clear_transient();
                }
            }
            InputEvent::Char(c) => self.handle_char(host, c),
        }
    }

    fn handle_char<H: HostEditor>(&mut self, host: &mut H, c: char) {
        if self.mode == Mode::Insert {
            self.insert_char(host, c);
            return;
        }

        // A goto sub-mode consumes the token as the second half of its
        // compound, falling back to selection mode before dispatch.
        if let Mode::Goto | Mode::GotoExtend = self.mode {
            let extend = self.mode == Mode::GotoExtend;
            self.set_mode(host, Mode::Select);
            match GotoTarget::from_char(c) {
                Some(target) => {
                    self.dispatch(host, CommandId::Goto { target, extend });
                }
                None => log::trace!("unknown goto target {c:?}"),
            }
            self.clear_transient();
            return;
        }

        if let Some(d) = c.to_digit(10) {
            self.counts.push_digit(d);
            return;
        }

        match self.mode {
            Mode::Select => {
                match CommandId::from_token(c) {
                    Some(id) => self.dispatch(host, id),
                    // Unknown tokens are ignored but may not leak a
                    // stale count or direction into the next command.
                    None => log::trace!("unbound token {c:?}"),
                }
                self.clear_transient();
            }
            Mode::CharFind => {
                let arg = CommandArg::Target {
                    ch: c,
                    forward: self.search_forward,
                };
                commands::exec(CommandId::FindChar, self, host, arg);
                self.clear_transient();
            }
            Mode::CharTo => {
                let arg = CommandArg::Target {
                    ch: c,
                    forward: self.search_forward,
                };
                commands::exec(CommandId::ToChar, self, host, arg);
                self.clear_transient();
            }
            Mode::Insert | Mode::Goto | Mode::GotoExtend => {}
        }
    }

    fn dispatch<H: HostEditor>(&mut self, host: &mut H, id: CommandId) {
        if id.repeatable() {
            let count = self.counts.take_or(1);
            log::debug!("dispatch {id:?} x{count}");
            for _ in 0..count {
                commands::exec(id, self, host, CommandArg::None);
            }
        } else {
            let count = self.counts.take();
            log::debug!("dispatch {id:?} arg {count:?}");
            commands::exec(id, self, host, CommandArg::Line(count));
        }
    }

    fn handle_signal<H: HostEditor>(&mut self, host: &mut H, signal: Signal) {
        match signal {
            Signal::LeaveInsert => self.set_mode(host, Mode::Select),
            Signal::FindCharBackward => {
                self.set_mode(host, Mode::CharFind);
                self.search_forward = false;
            }
            Signal::ToCharBackward => {
                self.set_mode(host, Mode::CharTo);
                self.search_forward = false;
            }
            Signal::SelectToLineStart
            | Signal::SelectToLineStartFull
            | Signal::SelectToLineEnd
            | Signal::SelectToLineEndFull => {
                if self.mode == Mode::Insert {
                    return;
                }
                let id = match signal {
                    Signal::SelectToLineStart => CommandId::SelectToLineStart { full: false },
                    Signal::SelectToLineStartFull => CommandId::SelectToLineStart { full: true },
                    Signal::SelectToLineEnd => CommandId::SelectToLineEnd { full: false },
                    _ => CommandId::SelectToLineEnd { full: true },
                };
                self.dispatch(host, id);
                self.clear_transient();
            }
        }
    }

    fn clear_transient(&mut self) {
        self.counts.current = None;
        self.search_forward = true;
    }

    // ---- insert mode ----

    /// Insert a literal character at every cursor, with auto-pairing.
    ///
    /// Each cursor's edit is computed from its own position at the time
    /// its transaction runs, so one cursor's insertion never skews the
    /// coordinates of another's. Pair-skip cursor nudges are applied in
    /// one selection update at the end.
    fn insert_char<H: HostEditor>(&mut self, host: &mut H, c: char) {
        let cursor_count = host.selections().len();
        let mut nudges = Vec::with_capacity(cursor_count);

        for i in 0..cursor_count {
            let pos = host.selections()[i].active;
            let mut edits = Vec::new();
            let mut nudge = Nudge::None;

            if self.auto_pairs && pairs::is_bracket(c) {
                if pairs::openable(c) {
                    let close = pairs::matching(c).unwrap_or(c);
                    edits.push(EditOp::Insert {
                        at: pos,
                        text: format!("{c}{close}"),
                    });
                    nudge = Nudge::Left;
                } else if host.char_at(pos) == Some(c) {
                    // Typing through an already-present closer.
                    nudge = Nudge::Right;
                } else {
                    edits.push(EditOp::Insert {
                        at: pos,
                        text: c.to_string(),
                    });
                }
            } else if self.auto_pairs && pairs::is_quote(c) {
                if host.char_at(pos) == Some(c) {
                    // A quote that already exists under the cursor is a
                    // closing quote; skip it.
                    nudge = Nudge::Right;
                } else {
                    edits.push(EditOp::Insert {
                        at: pos,
                        text: format!("{c}{c}"),
                    });
                    nudge = Nudge::Left;
                }
            } else {
                edits.push(EditOp::Insert {
                    at: pos,
                    text: c.to_string(),
                });
            }

            if !edits.is_empty() {
                host.apply_edits(edits);
            }
            nudges.push(nudge);
        }

        let adjusted = host
            .selections()
            .iter()
            .zip(&nudges)
            .map(|(sel, nudge)| {
                let active = sel.active;
                let pos = match nudge {
                    Nudge::None => active,
                    Nudge::Left => Position::new(active.line, active.col.saturating_sub(1)),
                    Nudge::Right => host.clamp(Position::new(active.line, active.col + 1)),
                };
                Selection::caret(pos)
            })
            .collect();
        host.set_selections(adjusted);
    }

    /// Backspace at every cursor. Deleting the opening half of a quote
    /// pair removes the closing half sitting after the cursor too.
    fn backspace<H: HostEditor>(&mut self, host: &mut H) {
        let cursor_count = host.selections().len();
        for i in 0..cursor_count {
            let pos = host.selections()[i].active;
            let before = if pos.col > 0 {
                host.char_at(Position::new(pos.line, pos.col - 1))
            } else {
                // Start of a line: the character before is the line
                // break (or nothing at the start of the buffer).
                None
            };

            let left = if pos.col > 0 {
                Range::new(Position::new(pos.line, pos.col - 1), pos)
            } else if pos.line > 0 {
                Range::new(
                    Position::new(pos.line - 1, host.line_len(pos.line - 1)),
                    pos,
                )
            } else {
                continue;
            };

            let mut edits = vec![EditOp::Delete { range: left }];
            if let Some(b) = before
                && pairs::is_quote(b)
                && host.char_at(pos) == Some(b)
            {
                edits.push(EditOp::Delete {
                    range: Range::new(pos, Position::new(pos.line, pos.col + 1)),
                });
            }
            host.apply_edits(edits);
        }
    }
}
