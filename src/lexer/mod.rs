use std::fmt;

pub mod lexer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexerTokenKind {
    // `>`: Increment the `data pointer` by one
    Increment,
    // `<`: Decrement the `data pointer` by one
    Decrement,

    // `+`: Increment the byte at the `data pointer` by one
    DerefIncrement,
    // `-`: Decrement the byte at the `data pointer` by one
    DerefDecrement,

    // `.`: Write the byte at the `data pointer` to the `output device`
    Write,
    // `,`: Read the next byte from the `input device` and write it to the `data pointer`
    Read,

    // `[`: If the byte at the `data pointer` is zero, then jump the `instruction pointer` forward to the instruction after the matching `]`
    JumpStart,
    // `]`: If the byte at the `data pointer` is non-zero then jump the `instruction pointer` back to the instruction after the matching `[`
    JumpEnd,
}

impl LexerTokenKind {
    /// Every other byte is a comment
    pub fn from_byte(byte: u8) -> Option<LexerTokenKind> {
        match byte {
            b'>' => Some(LexerTokenKind::Increment),
            b'<' => Some(LexerTokenKind::Decrement),
            b'+' => Some(LexerTokenKind::DerefIncrement),
            b'-' => Some(LexerTokenKind::DerefDecrement),
            b'.' => Some(LexerTokenKind::Write),
            b',' => Some(LexerTokenKind::Read),
            b'[' => Some(LexerTokenKind::JumpStart),
            b']' => Some(LexerTokenKind::JumpEnd),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            LexerTokenKind::Increment => '>',
            LexerTokenKind::Decrement => '<',
            LexerTokenKind::DerefIncrement => '+',
            LexerTokenKind::DerefDecrement => '-',
            LexerTokenKind::Write => '.',
            LexerTokenKind::Read => ',',
            LexerTokenKind::JumpStart => '[',
            LexerTokenKind::JumpEnd => ']',
        }
    }
}

/// Human readable location of a token in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
    /// raw byte offset within the file
    pub offset: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: LexerTokenKind,
    pub position: Position,
}
