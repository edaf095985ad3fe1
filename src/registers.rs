//! Char-keyed register storage for deleted/yanked selection contents.

use std::collections::HashMap;

use crate::traits::Clipboard;

/// A generic register store keyed by single characters.
///
/// Registers hold one entry per cursor, in cursor order, so multi-cursor
/// content round-trips with the cursor count intact. A default register is
/// chosen at construction and used whenever an operation names none.
#[derive(Debug, Clone)]
pub struct Registers<T> {
    default_register: char,
    registers: HashMap<char, Vec<T>>,
}

impl<T> Registers<T> {
    pub fn new(default_register: char) -> Self {
        Self {
            default_register,
            registers: HashMap::new(),
        }
    }

    /// The register used when operations name none.
    pub fn default_register(&self) -> char {
        self.default_register
    }

    /// Append one entry to a register.
    pub fn append(&mut self, entry: T, register: Option<char>) {
        let register = register.unwrap_or(self.default_register);
        self.registers.entry(register).or_default().push(entry);
    }

    /// The entries of a register, oldest first. Empty if never written.
    pub fn get(&self, register: Option<char>) -> &[T] {
        let register = register.unwrap_or(self.default_register);
        self.registers.get(&register).map_or(&[], Vec::as_slice)
    }

    /// Drop all entries of a register.
    pub fn clear(&mut self, register: Option<char>) {
        let register = register.unwrap_or(self.default_register);
        self.registers.remove(&register);
    }
}

impl Registers<String> {
    /// Export a register to a clipboard, entries joined by newlines.
    /// Does nothing when the register is empty.
    pub fn copy_to<C: Clipboard>(&self, clipboard: &mut C, register: Option<char>) {
        let entries = self.get(register);
        if !entries.is_empty() {
            clipboard.set(entries.join("\n"));
        }
    }
}

/// System clipboard backed by `arboard`.
///
/// Clipboard errors (no display server, empty clipboard) degrade to `None`
/// reads and dropped writes; the engine never depends on clipboard success.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            inner: arboard::Clipboard::new().ok(),
        }
    }
}

#[cfg(feature = "clipboard")]
impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn get(&mut self) -> Option<String> {
        self.inner.as_mut().and_then(|c| c.get_text().ok())
    }

    fn set(&mut self, text: String) {
        if let Some(c) = self.inner.as_mut() {
            let _ = c.set_text(text);
        }
    }
}
