use thiserror::Error;

use crate::{ir::BlockId, lexer::Position};

pub mod translator;

pub use self::translator::translate;

/// Size of the cell array, every cell is a single byte
pub const CELL_COUNT: u64 = 0xFFFF;

/// Name of the function the translated program lives in
pub const ENTRY_FUNCTION: &str = "main";

/// The blocks bracketing one `[ ... ]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    /// Where `[` and `]` jump to while the cell is non-zero
    pub body: BlockId,
    /// Where control continues once the cell is zero
    pub end: BlockId,
    /// Location of the `[` that opened this loop
    pub opened_at: Position,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("unexpected closing bracket at {position}")]
    UnmatchedClose { position: Position },

    #[error("excessive opening brackets ({depth} unclosed, innermost at {position})")]
    UnmatchedOpen { position: Position, depth: usize },
}
