//! # less
//! A LESS-to-CSS compiler, implemented in pure Rust.
//!
//! All functionality is exposed through [`compile`] and [`compile_file`].
//!
//! ## Use as library
//! ```no_run
//! use less::{compile, CompileOptions};
//!
//! fn main() -> less::LessResult<()> {
//!     let css = compile(".a { .b { color: red; } }", &CompileOptions::default())?;
//!     println!("{}", css);
//!     Ok(())
//! }
//! ```
//!
//! ## Use as binary
//! ```bash
//! cargo install less
//! lessc compile input.less
//! ```

use std::path::Path;

use codemap::CodeMap;
use log::debug;

pub mod builtin;
pub mod color;
pub mod common;
pub mod error;
pub mod eval;
pub mod format;
pub mod importer;
pub mod lessfmt;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod unit;
pub mod value;

pub use error::{LessError, LessResult};
use eval::{EvalOptions, Evaluator};
use importer::RealFilesystem;

/// Knobs that govern one compile (spec.md §6). `Default` matches the
/// reference implementation's defaults.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Mixin-call recursion bound (spec.md §5); overflow is an evaluation
    /// error rather than a stack overflow.
    pub max_recursion_depth: u32,
    /// Declaration indent width, in spaces.
    pub indent_width: usize,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions { max_recursion_depth: 100, indent_width: 2 }
    }
}

impl From<&CompileOptions> for EvalOptions {
    fn from(opts: &CompileOptions) -> EvalOptions {
        EvalOptions { max_recursion_depth: opts.max_recursion_depth }
    }
}

/// Compiles a LESS source string with no filesystem access -- `@import`
/// statements fail unless `optional` (spec.md §6 "compile from a string").
pub fn compile(source: &str, options: &CompileOptions) -> LessResult<String> {
    compile_with_fs(source, Path::new("<stdin>"), &RealFilesystem, options)
}

/// Compiles a LESS file from disk, resolving `@import`s relative to its
/// directory (spec.md §6 "compile a file").
pub fn compile_file(path: &Path, options: &CompileOptions) -> LessResult<String> {
    let source = std::fs::read_to_string(path).map_err(|e| error::io_err_at(dummy_span_for(path), &e))?;
    compile_with_fs(&source, path, &RealFilesystem, options)
}

/// Compiles `source`, rooted at `path`, against a caller-supplied
/// filesystem view -- the seam the importer's tests and any embedding
/// application use instead of `compile_file` (spec.md §5: "each
/// `compile(source, fs)` invocation owns its AST and scope chain").
pub fn compile_with_fs(
    source: &str,
    path: &Path,
    fs: &dyn importer::Filesystem,
    options: &CompileOptions,
) -> LessResult<String> {
    let mut codemap = CodeMap::new();
    let file = codemap.add_file(path.display().to_string(), source.to_string());
    debug!("lexing {}", path.display());
    let tokens = lexer::lex(&file)?;
    debug!("parsing {}", path.display());
    let stylesheet = parser::parse(tokens)?;
    debug!("resolving imports for {}", path.display());
    let stylesheet = importer::resolve_imports(stylesheet, fs, path, &mut codemap)?;
    debug!("evaluating {}", path.display());
    let evaluator = Evaluator::new(EvalOptions::from(options));
    let items = evaluator.eval_stylesheet(&stylesheet)?;
    Ok(format::render(&items))
}

/// Parses a LESS source string and re-emits it as canonically formatted
/// LESS -- no import resolution, no evaluation (spec.md §6 "`fmt` --
/// parse and re-emit each matching file in place").
pub fn format_source(source: &str, path: &Path) -> LessResult<String> {
    let mut codemap = CodeMap::new();
    let file = codemap.add_file(path.display().to_string(), source.to_string());
    let tokens = lexer::lex(&file)?;
    let stylesheet = parser::parse(tokens)?;
    Ok(lessfmt::format_stylesheet(&stylesheet))
}

/// A synthetic span is never used for anything user-visible beyond an I/O
/// error message, but `LessError` needs one -- `codemap` has no way to
/// build a `Span` without an owning `File`, so this adds a throwaway
/// single-character file just to anchor the message.
fn dummy_span_for(path: &Path) -> codemap::Span {
    let mut codemap = CodeMap::new();
    codemap.add_file(path.display().to_string(), String::new()).span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_simple_rule() {
        let css = compile(".a { color: red; }", &CompileOptions::default()).unwrap();
        assert_eq!(css, ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn compiles_nested_rules_and_variables() {
        let css = compile("@pad: 4px;\n.card { padding: @pad; .title { font-weight: bold; } }", &CompileOptions::default()).unwrap();
        assert!(css.contains("padding: 4px;"));
        assert!(css.contains(".card .title {"));
    }

    #[test]
    fn unresolved_import_is_a_compile_error() {
        let err = compile("@import \"missing.less\";", &CompileOptions::default());
        assert!(err.is_err());
    }
}
