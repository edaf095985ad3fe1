/// Key codes representing individual keys on the keyboard.
///
/// This enum provides a platform-agnostic representation of keys.
/// Hosts should map their platform-specific key events to these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A character key, exactly as typed (case preserved - `H` and `h`
    /// dispatch different commands).
    Char(char),
    /// The Escape key, used to leave insert mode and cancel sub-modes.
    Esc,
    /// The Enter/Return key.
    Enter,
    /// The Backspace key for deleting characters in insert mode.
    Backspace,
    /// The Home key (line start).
    Home,
    /// The End key (line end).
    End,
}

bitflags::bitflags! {
    /// Keyboard modifier flags.
    ///
    /// These can be combined to represent multiple modifiers held simultaneously.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press event with optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifier keys held during the key press.
    pub mods: Modifiers,
}

/// Direct mode-trigger signals.
///
/// These correspond to key combinations a host binds outside the plain
/// typing stream: they carry intent that a single character token cannot
/// (backward search direction, line-select variants, leaving insert mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Return to selection mode from anywhere.
    LeaveInsert,
    /// Enter find-character mode searching backward.
    FindCharBackward,
    /// Enter to-character mode searching backward.
    ToCharBackward,
    /// Extend each selection's active end to the line start.
    SelectToLineStart,
    /// Collapse first, then select from the cursor to the line start.
    SelectToLineStartFull,
    /// Extend each selection's active end to the line end.
    SelectToLineEnd,
    /// Collapse first, then select from the cursor to the line end.
    SelectToLineEndFull,
}

/// Input events consumed by the engine, one per call.
///
/// `Char` covers the ordinary typing stream (commands in selection mode,
/// literal text in insert mode). `Backspace` is the one reserved control
/// token insert mode understands; `Signal` carries the direct triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A typed character token.
    Char(char),
    /// The backspace control token.
    Backspace,
    /// A direct mode-trigger signal.
    Signal(Signal),
}

impl KeyEvent {
    pub const fn new(code: KeyCode, mods: Modifiers) -> KeyEvent {
        KeyEvent { code, mods }
    }

    /// Translate a key event into an engine input using the conventional
    /// bindings: Esc leaves insert mode, Alt+f / Alt+t search backward,
    /// Home/End select to the line edges (Shift for the "full" variants).
    ///
    /// Hosts with their own keymap layer can skip this and construct
    /// [`InputEvent`]s directly.
    pub fn into_input(self) -> Option<InputEvent> {
        match self.code {
            KeyCode::Esc => Some(InputEvent::Signal(Signal::LeaveInsert)),
            KeyCode::Backspace => Some(InputEvent::Backspace),
            KeyCode::Enter => Some(InputEvent::Char('\n')),
            KeyCode::Home if self.mods.contains(Modifiers::SHIFT) => {
                Some(InputEvent::Signal(Signal::SelectToLineStartFull))
            }
            KeyCode::Home => Some(InputEvent::Signal(Signal::SelectToLineStart)),
            KeyCode::End if self.mods.contains(Modifiers::SHIFT) => {
                Some(InputEvent::Signal(Signal::SelectToLineEndFull))
            }
            KeyCode::End => Some(InputEvent::Signal(Signal::SelectToLineEnd)),
            KeyCode::Char('f') if self.mods.contains(Modifiers::ALT) => {
                Some(InputEvent::Signal(Signal::FindCharBackward))
            }
            KeyCode::Char('t') if self.mods.contains(Modifiers::ALT) => {
                Some(InputEvent::Signal(Signal::ToCharBackward))
            }
            // Chords other than the ones above are the host's business
            KeyCode::Char(_)
                if self
                    .mods
                    .intersects(Modifiers::CTRL | Modifiers::ALT | Modifiers::META) =>
            {
                None
            }
            KeyCode::Char(c) => Some(InputEvent::Char(c)),
        }
    }
}
