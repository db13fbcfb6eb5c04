use super::{LexerTokenKind, Position, Token};

/// Walks the raw source one byte at a time, handing out instructions lazily.
///
/// There is no notion of an invalid byte here; anything that isn't one of the
/// eight instructions is a comment and only moves the position along.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /** Human Readable positions in file */
    pub cur_line: usize,
    pub cur_col: usize,

    /** 'raw' format / offset within the file (in terms of bytes) */
    pub byte_offset: usize,

    bytes: std::iter::Peekable<std::slice::Iter<'a, u8>>,
}

impl<'a> Lexer<'a> {
    pub fn new(bytes: &'a [u8]) -> Lexer<'a> {
        Lexer {
            cur_col: 1,
            cur_line: 1,

            byte_offset: 0,

            bytes: bytes.iter().peekable(),
        }
    }

    fn current_position(&self) -> Position {
        Position {
            line: self.cur_line,
            col: self.cur_col,
            offset: self.byte_offset,
        }
    }

    fn consume_byte(&mut self) -> Option<u8> {
        let b = *self.bytes.next()?;
        self.cur_col += 1;
        if b == b'\n' {
            self.cur_line += 1;
            self.cur_col = 1;
        }
        self.byte_offset += 1;
        Some(b)
    }

    fn skip_comments(&mut self) {
        while let Some(&&b) = self.bytes.peek() {
            if LexerTokenKind::from_byte(b).is_some() {
                break;
            }
            self.consume_byte();
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        self.skip_comments();

        let position = self.current_position();
        let kind = LexerTokenKind::from_byte(self.consume_byte()?)?;
        Some(Token { kind, position })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<LexerTokenKind> {
        Lexer::new(src.as_bytes()).map(|t| t.kind).collect()
    }

    #[test]
    fn recognises_all_eight_instructions() {
        assert_eq!(
            kinds("><+-.,[]"),
            vec![
                LexerTokenKind::Increment,
                LexerTokenKind::Decrement,
                LexerTokenKind::DerefIncrement,
                LexerTokenKind::DerefDecrement,
                LexerTokenKind::Write,
                LexerTokenKind::Read,
                LexerTokenKind::JumpStart,
                LexerTokenKind::JumpEnd,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("a+b"), vec![LexerTokenKind::DerefIncrement]);
        assert!(kinds("hello world\n\t").is_empty());
        assert!(kinds("").is_empty());
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens: Vec<Token> = Lexer::new(b"ab+\n  ]").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].position,
            Position { line: 1, col: 3, offset: 2 }
        );
        assert_eq!(
            tokens[1].position,
            Position { line: 2, col: 3, offset: 6 }
        );
    }

    #[test]
    fn next_token_carries_its_position() {
        let mut lexer = Lexer::new(b"x\n[");
        assert_eq!(
            lexer.next_token(),
            Some(Token {
                kind: LexerTokenKind::JumpStart,
                position: Position { line: 2, col: 1, offset: 2 },
            })
        );
        assert_eq!(lexer.next_token(), None);
    }

    #[test]
    fn non_utf8_bytes_are_comments() {
        let tokens: Vec<Token> = Lexer::new(&[0xff, b'.', 0x80]).collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, LexerTokenKind::Write);
    }
}
