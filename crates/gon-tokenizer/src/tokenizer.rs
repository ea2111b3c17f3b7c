//! Tokenizer for the GON object notation.

use crate::{Span, Token, TokenKind};
use tracing::trace;

/// A tokenizer that produces tokens from GON source text.
///
/// Whitespace and comments are consumed between tokens and never surface as
/// tokens of their own. The tokenizer is `Clone`: cloning it is how callers
/// take lookahead without committing the cursor.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
        }
    }

    /// Create a tokenizer whose cursor starts at `offset` into `source`.
    ///
    /// `offset` must lie on a character boundary; the tree assembler uses
    /// this to resume tokenizing at a previously recorded token position.
    pub fn starting_at(source: &'src str, offset: usize) -> Self {
        Self {
            source,
            remaining: &source[offset..],
            pos: offset as u32,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8() as u32;
        self.remaining = &self.remaining[c.len_utf8()..];
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Check if the remaining text starts with the given prefix.
    #[inline]
    fn starts_with(&self, prefix: &str) -> bool {
        self.remaining.starts_with(prefix)
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        self.token_at(kind, Span::new(start, self.pos))
    }

    /// Create a token covering an explicit span.
    fn token_at(&self, kind: TokenKind, span: Span) -> Token<'src> {
        let text = span.slice(self.source);
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        self.skip_trivia();

        // Check for EOF
        if self.is_eof() {
            return self.token(TokenKind::Eof, self.pos);
        }

        let start = self.pos;
        let c = self.peek().unwrap();

        match c {
            // Structural tokens
            '{' => {
                self.advance();
                self.token(TokenKind::LBrace, start)
            }
            '}' => {
                self.advance();
                self.token(TokenKind::RBrace, start)
            }
            '[' => {
                self.advance();
                self.token(TokenKind::LBracket, start)
            }
            ']' => {
                self.advance();
                self.token(TokenKind::RBracket, start)
            }
            ':' => {
                self.advance();
                self.token(TokenKind::Colon, start)
            }
            ',' => {
                self.advance();
                self.token(TokenKind::Comma, start)
            }

            // Quoted identifier
            '"' => self.tokenize_quoted_ident(),

            // Bare identifier (default for anything else)
            _ => self.tokenize_bare_ident(),
        }
    }

    /// Skip whitespace and comments until real content or end of input.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance();
                }
                // `--[[` must win over `--`
                Some('-') if self.starts_with("--[[") => self.skip_block_comment(),
                Some('-') if self.starts_with("--") => self.skip_line_comment(),
                _ => break,
            }
        }
    }

    /// Skip a block comment: `--[[ ... ]]`.
    /// Without a closing `]]` the comment runs to the end of input.
    fn skip_block_comment(&mut self) {
        self.advance_by(4);
        while !self.is_eof() && !self.starts_with("]]") {
            self.advance();
        }
        if self.starts_with("]]") {
            self.advance_by(2);
        }
    }

    /// Skip a line comment: `-- ...` through and including the newline.
    fn skip_line_comment(&mut self) {
        self.advance_by(2);
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    /// Tokenize a quoted identifier: `"..."`.
    ///
    /// The returned span excludes the surrounding quotes and keeps escapes
    /// raw. A missing closing quote consumes the rest of the input without
    /// raising an error.
    fn tokenize_quoted_ident(&mut self) -> Token<'src> {
        let start = self.pos;

        // Consume opening quote
        self.advance();

        let mut terminated = false;
        loop {
            match self.peek() {
                None => break,
                Some('"') => {
                    self.advance();
                    terminated = true;
                    break;
                }
                Some('\\') => {
                    // Escape sequence - consume backslash and next char
                    self.advance();
                    if self.peek().is_some() {
                        self.advance();
                    }
                }
                Some(_) => {
                    self.advance();
                }
            }
        }

        // Trim the quotes off the literal; an unterminated literal has no
        // closing quote to trim.
        let mut content = Span::new(start, self.pos).advance(1);
        if terminated {
            content = content.narrow(content.len().saturating_sub(1));
        }
        self.token_at(TokenKind::QuotedIdent, content)
    }

    /// Tokenize a bare (unquoted) identifier.
    fn tokenize_bare_ident(&mut self) -> Token<'src> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_ident_terminator(c) {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::BareIdent, start)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Check if a character ends a bare identifier.
/// Note that `"` does not: `a"b` is a single bare identifier.
fn is_ident_terminator(c: char) -> bool {
    matches!(
        c,
        ' ' | ',' | ':' | '\n' | '\t' | '\r' | '}' | ']' | '{' | '['
    )
}
