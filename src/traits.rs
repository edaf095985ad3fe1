use crate::types::{CursorStyle, EditOp, Position, Range, Selection};

pub trait TextOps {
    // Basic queries
    fn line_count(&self) -> u32;
    fn line_len(&self, line: u32) -> u32; // grapheme columns

    // The grapheme at pos, or None past the line end / buffer end.
    // Newlines are not addressable; the last column of a line is its
    // final visible character.
    fn char_at(&self, pos: Position) -> Option<char>;

    // Buffer text from pos to the end of the buffer, newlines included.
    fn text_to_end(&self, pos: Position) -> String;

    // Buffer text from the start of the buffer up to (excluding) pos.
    fn text_to_start(&self, pos: Position) -> String;

    // The text covered by a range, newlines included.
    fn slice(&self, range: Range) -> String;

    fn clamp(&self, pos: Position) -> Position {
        let last_line = self.line_count().saturating_sub(1);
        let line = pos.line.min(last_line);
        let col = pos.col.min(self.line_len(line));
        Position { line, col }
    }

    // Position of the last character slot in the buffer.
    fn end_of_buffer(&self) -> Position {
        let line = self.line_count().saturating_sub(1);
        Position {
            line,
            col: self.line_len(line),
        }
    }
}

/// The mutable side of the host contract.
///
/// The engine never touches buffer storage directly: it reads through
/// [`TextOps`], replaces the selection list wholesale, and submits edits as
/// atomic batches. A batch's positions all refer to the pre-batch buffer;
/// the host applies them as a unit and shifts any existing selections past
/// inserted or deleted text, as editors conventionally do.
pub trait HostEditor: TextOps {
    /// The current selection list, in order. Never empty for a live buffer.
    fn selections(&self) -> Vec<Selection>;

    /// Replace the whole selection list atomically.
    fn set_selections(&mut self, selections: Vec<Selection>);

    /// Apply one atomic edit transaction.
    fn apply_edits(&mut self, edits: Vec<EditOp>);

    /// Cursor rendering hint. Cosmetic only.
    fn set_cursor_style(&mut self, style: CursorStyle);

    // Primitive commands the host already implements; the engine invokes
    // them rather than reimplementing their motion rules.

    /// Extend every selection's active end one word to the left.
    fn extend_word_left(&mut self);

    /// Jump every selection's active end to its matching bracket,
    /// keeping anchors in place.
    fn jump_to_bracket(&mut self);

    /// Expand every selection to cover whole lines.
    fn expand_line_selection(&mut self);

    /// Move every active end to the line start, extending when `select`.
    fn cursor_home(&mut self, select: bool);

    /// Move every active end to the line end, extending when `select`.
    fn cursor_end(&mut self, select: bool);
}

pub trait Clipboard {
    fn get(&mut self) -> Option<String>;
    fn set(&mut self, text: String);
}
