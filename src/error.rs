//! Centralised error hierarchy for the **Slang interpreter**.
//!
//! All subsystems (lexer, parser, resolver, runtime, CLI) convert their
//! internal failure modes into one of the variants defined here.  This
//! enables a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter-operation with `anyhow`, while still preserving rich diagnostic
//! detail.
//!
//! Static phases (lexing, parsing, resolution) never fail fast: they push
//! their errors into a [`Diagnostics`] accumulator and keep going, and the
//! driver decides between phases whether the pipeline may continue.  The
//! module itself **does not** print diagnostics.

use std::io;

use log::{debug, info};
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
///
/// Every user-facing variant renders in the shared diagnostic shape
/// `[line N] Error<where>: <message>`, where `<where>` is empty, `" at end"`,
/// or `" at '<lexeme>'"`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SlangError {
    /// Lexical error with source line information.
    #[error("[line {line}] Error{location}: {message}")]
    Lex {
        line: usize,
        location: String,
        message: String,
    },

    /// Syntactic (parser) error at the offending token.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        line: usize,
        location: String,
        message: String,
    },

    /// Static-analysis failure (duplicate declaration, invalid `return`, …).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        line: usize,
        location: String,
        message: String,
    },

    /// Runtime evaluation error, carrying the offending token's position.
    #[error("[line {line}] Error{location}: {message}")]
    Runtime {
        line: usize,
        location: String,
        message: String,
    },

    /// Wrapper around `std::io::Error`.  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// `" at end"` for EOF, otherwise `" at '<lexeme>'"`.
fn locate(token: &Token<'_>) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_owned()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

impl SlangError {
    /// Helper constructor for the **lexer**, which has no token to point at.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        debug!("lex error: line={}, msg={}", line, message);

        SlangError::Lex {
            line,
            location: String::new(),
            message,
        }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        debug!("parse error: line={}, msg={}", token.line, message);

        SlangError::Parse {
            line: token.line,
            location: locate(token),
            message,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        debug!("resolve error: line={}, msg={}", token.line, message);

        SlangError::Resolve {
            line: token.line,
            location: locate(token),
            message,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token<'_>, msg: S) -> Self {
        let message: String = msg.into();

        debug!("runtime error: line={}, msg={}", token.line, message);

        SlangError::Runtime {
            line: token.line,
            location: locate(token),
            message,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SlangError>;

/// Accumulator for static-phase diagnostics.
///
/// Threaded by reference through the lexer, parser, and resolver; the driver
/// inspects it between phases and refuses to execute once any error has been
/// recorded.  Replaces a process-wide "had error" flag with an explicit
/// value, so the REPL can simply start each line with a fresh accumulator.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<SlangError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic.  Reporting never aborts the current phase.
    pub fn report(&mut self, error: SlangError) {
        info!("diagnostic recorded: {}", error);

        self.errors.push(error);
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[SlangError] {
        &self.errors
    }
}
