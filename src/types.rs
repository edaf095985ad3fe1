/// A position within a text buffer.
///
/// Positions are zero-indexed and column values are counted in grapheme clusters,
/// not bytes or chars. This ensures correct handling of emoji and combining characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column position in grapheme clusters.
    pub col: u32,
}

impl Position {
    /// The origin position (0, 0).
    pub const ZERO: Position = Position { line: 0, col: 0 };

    pub const fn new(line: u32, col: u32) -> Position {
        Position { line, col }
    }
}

/// A range of text defined by start and end positions.
///
/// Ranges are half-open intervals [start, end), meaning the start position
/// is included but the end position is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// The start position (inclusive).
    pub start: Position,
    /// The end position (exclusive).
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Range {
        Range { start, end }
    }

    /// True when the range covers no text.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The current mode of the editing engine.
///
/// The same token performs different actions depending on the current mode.
/// `Select` is the resting mode: tokens are commands over the selection set.
/// The remaining variants other than `Insert` are transient sub-modes that
/// consume exactly one further token and fall back to `Select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Insert mode - tokens become buffer text, with auto-pairing.
    Insert,
    /// Selection mode - tokens are commands, digits accumulate a count.
    Select,
    /// Waiting for the target character of a find command.
    CharFind,
    /// Waiting for the target character of a to command.
    CharTo,
    /// Waiting for the second half of a `g` compound.
    Goto,
    /// Waiting for the second half of a `G` compound.
    GotoExtend,
}

/// A single cursor: an anchor and the live (moving) end.
///
/// `active` is where the cursor visually sits; `anchor` stays fixed while a
/// motion extends the selection. A collapsed selection has `anchor == active`.
/// A session holds an ordered list of these (multi-cursor), and every
/// operation that changes them replaces the whole list at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The fixed end of the selection.
    pub anchor: Position,
    /// The moving end of the selection (the cursor).
    pub active: Position,
}

impl Selection {
    pub const fn new(anchor: Position, active: Position) -> Selection {
        Selection { anchor, active }
    }

    /// A collapsed selection at `pos`.
    pub const fn caret(pos: Position) -> Selection {
        Selection {
            anchor: pos,
            active: pos,
        }
    }

    /// True when anchor and active coincide.
    pub fn is_caret(&self) -> bool {
        self.anchor == self.active
    }

    /// Collapse to the active end.
    pub fn collapsed(&self) -> Selection {
        Selection::caret(self.active)
    }

    /// The earlier of the two ends.
    pub fn min(&self) -> Position {
        self.anchor.min(self.active)
    }

    /// The later of the two ends.
    pub fn max(&self) -> Position {
        self.anchor.max(self.active)
    }

    /// The covered text as a half-open range.
    pub fn range(&self) -> Range {
        Range::new(self.min(), self.max())
    }
}

/// Cursor rendering hint sent to the host when the mode changes.
///
/// Purely cosmetic; hosts that don't render a cursor shape ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStyle {
    /// Thin bar, shown in insert mode.
    Bar,
    /// Block/underline, shown in all other modes.
    Block,
}

/// One primitive operation inside an atomic edit batch.
///
/// All positions refer to the buffer state *before* the batch is applied;
/// the host commits the whole batch as a unit and shifts existing
/// selections past inserted/deleted text the way editors conventionally do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Insert `text` at `at`.
    Insert { at: Position, text: String },
    /// Delete the text in `range`.
    Delete { range: Range },
}
