//! One-pass lexer for the Slang language.
//!
//! [`Lexer::scan_tokens`] transforms the source text into a flat `Vec` of
//! [`Token`]s terminated by exactly one `EOF` token.  The lexer never fails:
//! unexpected characters and unterminated literals are pushed into the
//! shared [`Diagnostics`] accumulator and scanning continues to end of
//! input, so the parser always receives a complete (if possibly error-laden)
//! token stream.
//!
//! The scan is a single left-to-right pass over the raw bytes with one byte
//! of lookahead (`peek`) and a second (`peek_next`) for fractional-number
//! detection.  Operators use maximal munch (`!=` before `!`).  Tokens are
//! zero-allocation slices of the original buffer except for string/number
//! literal payloads.

use log::{debug, info};
use memchr::memchr;
use phf::phf_map;

use crate::error::{Diagnostics, SlangError};
use crate::token::{Token, TokenType};

/// Compile-time perfect hash from reserved spellings to keyword tokens.
/// `super` is reserved even though no grammar production consumes it.
static KEYWORDS: phf::Map<&'static [u8], TokenType> = phf_map! {
    b"and"    => TokenType::AND,
    b"class"  => TokenType::CLASS,
    b"else"   => TokenType::ELSE,
    b"false"  => TokenType::FALSE,
    b"fun"    => TokenType::FUN,
    b"for"    => TokenType::FOR,
    b"if"     => TokenType::IF,
    b"nil"    => TokenType::NIL,
    b"or"     => TokenType::OR,
    b"print"  => TokenType::PRINT,
    b"return" => TokenType::RETURN,
    b"super"  => TokenType::SUPER,
    b"this"   => TokenType::THIS,
    b"true"   => TokenType::TRUE,
    b"var"    => TokenType::VAR,
    b"while"  => TokenType::WHILE,
};

/// Single-pass lexer.  The lifetime `'a` ties every emitted token's
/// `lexeme` slice back to the original source buffer.
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    start: usize,               // first byte of the current lexeme
    curr: usize,                // one past the last byte examined
    line: usize,                // 1-based, '\n' increments
    pending: Option<TokenType>, // recognised token kind waiting to be emitted
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        info!("Lexer created over {} bytes", src.len());

        Self {
            src,
            bytes: src.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    /// Scan the whole input, reporting lexical errors to `diags` and
    /// returning every recognised token plus a final `EOF`.
    pub fn scan_tokens(mut self, diags: &mut Diagnostics) -> Vec<Token<'a>> {
        let mut tokens: Vec<Token<'a>> = Vec::new();

        while !self.is_at_end() {
            self.start = self.curr;
            self.pending = None;

            if let Err(e) = self.scan_token(diags) {
                diags.report(e);
                continue;
            }

            if let Some(tt) = self.pending.take() {
                let lexeme: &'a str = &self.src[self.start..self.curr];
                debug!("scanned {:?} on line {}", tt, self.line);

                tokens.push(Token::new(tt, lexeme, self.line));
            }
            // Otherwise it was whitespace or a comment.
        }

        tokens.push(Token::new(TokenType::EOF, "", self.line));

        info!("scan complete: {} token(s)", tokens.len());

        tokens
    }

    // ───────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.bytes.len()
    }

    /// Advance one byte and return it.  Callers guard with [`is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF
    /// to avoid branching at the call site.
    #[inline(always)]
    fn peek(&self) -> u8 {
        if self.is_at_end() {
            0
        } else {
            self.bytes[self.curr]
        }
    }

    /// Peek one byte beyond [`peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        if self.curr + 1 >= self.bytes.len() {
            0
        } else {
            self.bytes[self.curr + 1]
        }
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    // ───────────────────────── core lexing ─────────────────────────

    /// Scan a single lexeme starting at `self.start`.  A recognised token
    /// kind lands in `self.pending`; whitespace and comments leave it empty.
    fn scan_token(&mut self, diags: &mut Diagnostics) -> crate::error::Result<()> {
        let b = self.advance();

        match b {
            // ── single-character punctuators ──────────────────────────────
            b'(' => self.pending = Some(TokenType::LEFT_PAREN),
            b')' => self.pending = Some(TokenType::RIGHT_PAREN),
            b'{' => self.pending = Some(TokenType::LEFT_BRACE),
            b'}' => self.pending = Some(TokenType::RIGHT_BRACE),
            b',' => self.pending = Some(TokenType::COMMA),
            b'.' => self.pending = Some(TokenType::DOT),
            b'-' => self.pending = Some(TokenType::MINUS),
            b'+' => self.pending = Some(TokenType::PLUS),
            b';' => self.pending = Some(TokenType::SEMICOLON),
            b'*' => self.pending = Some(TokenType::STAR),

            // ── two-character operators (maximal munch) ──────────────────
            b'!' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::BANG_EQUAL
                } else {
                    TokenType::BANG
                };

                self.pending = Some(tt);
            }

            b'=' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::EQUAL_EQUAL
                } else {
                    TokenType::EQUAL
                };

                self.pending = Some(tt);
            }

            b'<' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::LESS_EQUAL
                } else {
                    TokenType::LESS
                };

                self.pending = Some(tt);
            }

            b'>' => {
                let tt = if self.match_byte(b'=') {
                    TokenType::GREATER_EQUAL
                } else {
                    TokenType::GREATER
                };

                self.pending = Some(tt);
            }

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {}

            b'\n' => {
                self.line += 1;
            }

            // ── comments or division ─────────────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // Fast-forward to the next newline with `memchr`; the
                    // newline itself is left for the main loop to count.
                    if let Some(pos) = memchr(b'\n', &self.bytes[self.curr..]) {
                        self.curr += pos;
                    } else {
                        self.curr = self.bytes.len();
                    }
                } else if self.match_byte(b'*') {
                    self.block_comment(diags);
                } else {
                    self.pending = Some(TokenType::SLASH);
                }
            }

            // ── string literal " … " ─────────────────────────────────────
            b'"' => {
                return self.string();
            }

            // ── number literal ───────────────────────────────────────────
            b'0'..=b'9' => {
                self.number();
            }

            // ── identifiers / keywords ───────────────────────────────────
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.identifier();
            }

            // ── unexpected character ─────────────────────────────────────
            _ => {
                return Err(SlangError::lex(
                    self.line,
                    format!("Unexpected character: {}", b as char),
                ));
            }
        }

        Ok(())
    }

    /// Consume a `/* ... */` block comment up to the matching `*/` or end of
    /// input.  Block comments do not nest.  An unterminated comment is
    /// reported rather than silently swallowed.
    fn block_comment(&mut self, diags: &mut Diagnostics) {
        let opening_line = self.line;

        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance(); // '*'
                self.advance(); // '/'
                return;
            }

            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        diags.report(SlangError::lex(opening_line, "Unterminated block comment."));
    }

    /// Parse a double-quoted string literal.  Newlines are legal inside the
    /// literal and increment the line counter.
    fn string(&mut self) -> crate::error::Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(SlangError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        // Slice excluding the surrounding quotes.
        let value = &self.src[self.start + 1..self.curr - 1];
        self.pending = Some(TokenType::STRING(value.to_owned()));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  The fraction is optional;
    /// there is no exponent form and no integer/float distinction.
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume '.'

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let lexeme = &self.src[self.start..self.curr];
        let n: f64 = lexeme.parse().unwrap_or(0.0); // digits only, cannot fail

        self.pending = Some(TokenType::NUMBER(n));
    }

    /// Parse an identifier and decide whether it is a keyword.
    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }

        let slice: &[u8] = &self.bytes[self.start..self.curr];

        let tt: TokenType = KEYWORDS
            .get(slice)
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER);

        self.pending = Some(tt);
    }
}

