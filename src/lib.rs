pub mod commands;
pub mod engine;
pub mod key;
pub mod pairs;
pub mod registers;
pub mod traits;
pub mod types;

pub use crate::commands::{CommandArg, CommandId, Direction, GotoTarget};
pub use crate::engine::{Engine, EngineBuilder, EngineSnapshot};
pub use crate::key::{InputEvent, KeyCode, KeyEvent, Modifiers, Signal};
pub use crate::registers::Registers;
pub use crate::traits::{Clipboard, HostEditor, TextOps};
pub use crate::types::{CursorStyle, EditOp, Mode, Position, Range, Selection};
