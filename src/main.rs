use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use env_logger::Builder;
use log::{debug, info};

use slang::ast_printer::AstPrinter;
use slang::error::Diagnostics;
use slang::interpreter::Interpreter;
use slang::lexer::Lexer;
use slang::parser::Parser;
use slang::resolver::Resolver;

/// Exit code for static (lex/parse/resolve) errors, per sysexits EX_DATAERR.
const EXIT_STATIC_ERROR: u8 = 65;
/// Exit code for runtime errors, per sysexits EX_SOFTWARE.
const EXIT_RUNTIME_ERROR: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Slang language interpreter", long_about = None)]
pub struct Cli {
    /// Script to run; omit for an interactive prompt.
    script: Option<PathBuf>,

    /// Print the canonical AST instead of executing (batch mode only).
    #[arg(long)]
    ast: bool,

    /// Enable logging to slang.log
    #[arg(long)]
    log: bool,
}

fn init_logger() -> Result<()> {
    let log_file = File::create("slang.log").context("Failed to create slang.log")?;

    // Log records carry the in-crate module path and source line.
    Builder::new()
        .format(|buf, record| {
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("slang::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));

            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .init();

    info!("logger initialized, writing to slang.log");

    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.script {
        Some(path) => run_file(path, args.ast),
        None => run_prompt(),
    }
}

/// Batch mode: run one script to completion.  Static errors exit with 65,
/// runtime errors with 70.
fn run_file(path: PathBuf, ast_only: bool) -> Result<ExitCode> {
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file {:?}", path))?;

    info!("running {:?} ({} bytes)", path, source.len());

    let mut diags = Diagnostics::new();

    let tokens = Lexer::new(&source).scan_tokens(&mut diags);
    let statements = Parser::new(&tokens, &mut diags).parse();

    let mut interpreter = Interpreter::new();

    // Resolution only runs over a cleanly parsed tree; a broken parse would
    // produce follow-on diagnostics for statements the user never wrote.
    if !diags.had_error() {
        Resolver::new(&mut interpreter).resolve(&statements, &mut diags);
    }

    if diags.had_error() {
        for error in diags.errors() {
            eprintln!("{}", error);
        }

        return Ok(ExitCode::from(EXIT_STATIC_ERROR));
    }

    if ast_only {
        print!("{}", AstPrinter::print_program(&statements));

        return Ok(ExitCode::SUCCESS);
    }

    if let Err(e) = interpreter.interpret(&statements) {
        debug!("runtime failure: {}", e);
        eprintln!("{}", e);

        return Ok(ExitCode::from(EXIT_RUNTIME_ERROR));
    }

    Ok(ExitCode::SUCCESS)
}

/// Interactive mode: one statement line at a time against a persistent
/// interpreter.  Each line starts with a fresh diagnostics accumulator, so
/// one bad line does not poison the session.
///
/// Function and class values created on earlier lines keep references into
/// those lines' token buffers, so each line's source and tokens are leaked
/// into `'static` storage for the lifetime of the process.
fn run_prompt() -> Result<ExitCode> {
    let mut interpreter: Interpreter<'static> = Interpreter::new();

    // Expression ids key the interpreter's distance map, so they must stay
    // unique across the whole session.
    let mut id_base: usize = 0;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read line")?;

        if !line.trim().is_empty() {
            let source: &'static str = Box::leak(line.into_boxed_str());

            let mut diags = Diagnostics::new();

            let tokens: &'static [_] = Vec::leak(Lexer::new(source).scan_tokens(&mut diags));

            let mut parser = Parser::with_base_id(tokens, &mut diags, id_base);
            let statements = parser.parse();
            id_base = parser.next_id();

            if !diags.had_error() {
                Resolver::new(&mut interpreter).resolve(&statements, &mut diags);
            }

            if diags.had_error() {
                for error in diags.errors() {
                    eprintln!("{}", error);
                }
            } else if let Err(e) = interpreter.interpret(&statements) {
                eprintln!("{}", e);
            }
        }

        print!("> ");
        stdout.flush()?;
    }

    println!("Goodbye!");

    Ok(ExitCode::SUCCESS)
}
