//! Shared pipeline harness for integration tests: lex → parse → resolve →
//! interpret, with `print` output captured in a shared buffer.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use slang::error::Diagnostics;
use slang::interpreter::Interpreter;
use slang::lexer::Lexer;
use slang::parser::Parser;
use slang::resolver::Resolver;

/// A clonable in-memory `Write` sink; clones share the same buffer.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("print output is UTF-8")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `source` through the whole pipeline.  Returns the captured `print`
/// output, or the rendered diagnostics (static errors joined by newlines, or
/// the single runtime error).
pub fn run(source: &str) -> Result<String, String> {
    let mut diags = Diagnostics::new();

    let tokens = Lexer::new(source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    let sink = SharedBuf::default();
    let mut interpreter = Interpreter::with_output(Box::new(sink.clone()));

    // Resolution is skipped over a broken parse, like the driver does.
    if !diags.had_error() {
        Resolver::new(&mut interpreter).resolve(&statements, &mut diags);
    }

    if diags.had_error() {
        let rendered: Vec<String> = diags.errors().iter().map(|e| e.to_string()).collect();

        return Err(rendered.join("\n"));
    }

    match interpreter.interpret(&statements) {
        Ok(()) => Ok(sink.contents()),
        Err(e) => Err(e.to_string()),
    }
}

/// Run and expect success; returns the captured output.
pub fn run_ok(source: &str) -> String {
    match run(source) {
        Ok(output) => output,
        Err(e) => panic!("program failed unexpectedly:\n{}", e),
    }
}

/// Run and expect failure; returns the rendered error(s).
pub fn run_err(source: &str) -> String {
    match run(source) {
        Ok(output) => panic!("program succeeded unexpectedly with output:\n{}", output),
        Err(e) => e,
    }
}

/// Run only the static phases and return every diagnostic, rendered.
pub fn static_errors(source: &str) -> Vec<String> {
    let mut diags = Diagnostics::new();

    let tokens = Lexer::new(source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    if !diags.had_error() {
        let mut interpreter = Interpreter::with_output(Box::new(SharedBuf::default()));
        Resolver::new(&mut interpreter).resolve(&statements, &mut diags);
    }

    diags.errors().iter().map(|e| e.to_string()).collect()
}
