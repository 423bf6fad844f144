//! `lessc` -- the command-line wrapper (spec.md §6): `compile <file>`
//! writes CSS to stdout; `fmt <glob>...` parses and re-emits each matched
//! file in place as canonically formatted LESS (not compiled CSS).
//! Grounded on the example pack's `clap` derive + `glob` CLI idiom (the
//! teacher itself has no binary wrapper of its own).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use less::{compile_file, CompileOptions};
use log::error;

#[derive(Parser, Debug)]
#[clap(name = "lessc", version, about = "A LESS-to-CSS compiler")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a single `.less` file and print the resulting CSS to stdout.
    Compile {
        file: PathBuf,
        #[clap(long, default_value_t = 100)]
        max_recursion_depth: u32,
    },
    /// Reformat every file matching one or more globs in place.
    Fmt {
        #[clap(required = true)]
        globs: Vec<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> less::LessResult<()> {
    match &cli.command {
        Command::Compile { file, max_recursion_depth } => {
            let options = CompileOptions { max_recursion_depth: *max_recursion_depth, ..CompileOptions::default() };
            let css = compile_file(file, &options)?;
            print!("{}", css);
            Ok(())
        }
        Command::Fmt { globs } => {
            for pattern in globs {
                for entry in glob::glob(pattern).map_err(glob_err)? {
                    let path = entry.map_err(glob_err)?;
                    fmt_one(&path)?;
                }
            }
            Ok(())
        }
    }
}

fn fmt_one(path: &Path) -> less::LessResult<()> {
    let source = std::fs::read_to_string(path).map_err(|e| io_err(path, &e))?;
    let formatted = less::format_source(&source, path)?;
    std::fs::write(path, formatted).map_err(|e| io_err(path, &e))?;
    Ok(())
}

fn glob_err(e: impl std::fmt::Display) -> less::LessError {
    io_err(Path::new(""), &std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

fn io_err(path: &Path, e: &std::io::Error) -> less::LessError {
    // `LessError` always carries a `Span`; CLI-level filesystem failures
    // don't have source text to anchor one, so this builds a throwaway
    // one-file codemap just to get a valid span, matching `lib.rs`'s
    // `dummy_span_for`.
    let mut codemap = codemap::CodeMap::new();
    let span = codemap.add_file(path.display().to_string(), String::new()).span;
    less::LessError::import(e.to_string(), span)
}
