//! `@import` resolution: walks a `Stylesheet`, recursively inlining the
//! statements of each imported file (spec.md §4.3).
//!
//! The teacher doesn't have an importer module of its own (grass resolves
//! everything through a single parser pass); this is grounded directly on
//! spec.md §4.3's resolution algorithm, using the same `codemap`/`LessError`
//! idiom as the rest of the pipeline.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use codemap::CodeMap;

use crate::error::{io_err_at, LessError, LessResult};
use crate::lexer;
use crate::parser;
use crate::parser::ast::{AtRule, AtRuleBlock, Statement, Stylesheet};

/// Abstracts filesystem access so imports can be resolved against an
/// in-memory view in tests, not just the real disk.
pub trait Filesystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf>;
}

/// The default `Filesystem`, backed by `std::fs`.
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }
}

/// The at-rule name used for `inline`/`css`-flagged imports, whose body is
/// emitted to the output verbatim rather than evaluated as LESS.
pub const VERBATIM_PASSTHROUGH: &str = "__verbatim__";

struct ImportFlags {
    reference: bool,
    inline: bool,
    less: bool,
    css: bool,
    once: bool,
    multiple: bool,
    optional: bool,
}

impl ImportFlags {
    fn parse(raw: &str) -> ImportFlags {
        let mut flags = ImportFlags {
            reference: false,
            inline: false,
            less: false,
            css: false,
            once: false,
            multiple: false,
            optional: false,
        };
        for word in raw.split(',').map(|s| s.trim()) {
            match word {
                "reference" => flags.reference = true,
                "inline" => flags.inline = true,
                "less" => flags.less = true,
                "css" => flags.css = true,
                "once" => flags.once = true,
                "multiple" => flags.multiple = true,
                "optional" => flags.optional = true,
                _ => {}
            }
        }
        flags
    }
}

/// Splits an `@import` prelude (captured verbatim by the parser) into its
/// path and option flags, per spec.md §4.3: the path comes from a quoted
/// string or a `url(...)` wrapper, and flags live in a trailing `(...)`.
fn parse_import_spec(raw: &str) -> (String, ImportFlags) {
    let raw = raw.trim();
    let (body, flag_text) = match raw.rfind('(') {
        Some(idx) if raw.ends_with(')') => (raw[..idx].trim(), &raw[idx + 1..raw.len() - 1]),
        _ => (raw, ""),
    };
    let path = extract_path(body);
    (path, ImportFlags::parse(flag_text))
}

fn extract_path(body: &str) -> String {
    let body = body.trim();
    if let Some(inner) = body.strip_prefix("url(").and_then(|s| s.strip_suffix(')')) {
        return unquote(inner.trim());
    }
    unquote(body)
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 {
        let bytes = s.as_bytes();
        if (bytes[0] == b'"' && bytes[s.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[s.len() - 1] == b'\'')
        {
            return s[1..s.len() - 1].to_string();
        }
    }
    s.to_string()
}

struct ImportContext<'a> {
    fs: &'a dyn Filesystem,
    codemap: &'a mut CodeMap,
    stack: Vec<PathBuf>,
    seen_once: HashSet<PathBuf>,
}

/// Recursively resolves every `@import` in `stylesheet`, returning a new
/// stylesheet with import statements replaced by the statements they
/// resolved to (spec.md §4.3).
pub fn resolve_imports(
    stylesheet: Stylesheet,
    fs: &dyn Filesystem,
    base_path: &Path,
    codemap: &mut CodeMap,
) -> LessResult<Stylesheet> {
    let base_canonical = fs.canonicalize(base_path).unwrap_or_else(|_| base_path.to_path_buf());
    let mut ctx = ImportContext {
        fs,
        codemap,
        stack: vec![base_canonical],
        seen_once: HashSet::new(),
    };
    let statements = resolve_statements(stylesheet.statements, &mut ctx)?;
    Ok(Stylesheet { statements })
}

fn resolve_statements(statements: Vec<Statement>, ctx: &mut ImportContext) -> LessResult<Vec<Statement>> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        match stmt {
            Statement::AtRule(at_rule) if at_rule.name.eq_ignore_ascii_case("import") => {
                out.extend(resolve_one_import(at_rule, ctx)?);
            }
            Statement::AtRule(AtRule { name, parameters, block: AtRuleBlock::Statements(inner), span }) => {
                let inner = resolve_statements(inner, ctx)?;
                out.push(Statement::AtRule(AtRule {
                    name,
                    parameters,
                    block: AtRuleBlock::Statements(inner),
                    span,
                }));
            }
            Statement::Rule(mut rule) => {
                rule.body = resolve_statements(rule.body, ctx)?;
                out.push(Statement::Rule(rule));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn resolve_one_import(at_rule: AtRule, ctx: &mut ImportContext) -> LessResult<Vec<Statement>> {
    let raw = match &at_rule.block {
        AtRuleBlock::Raw(s) => s.clone(),
        _ => at_rule.parameters.clone(),
    };
    let (rel_path, flags) = parse_import_spec(&raw);
    let base_dir = ctx
        .stack
        .last()
        .and_then(|p| p.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let target = base_dir.join(&rel_path);

    let canonical = match ctx.fs.canonicalize(&target) {
        Ok(p) => p,
        Err(e) => {
            if flags.optional {
                return Ok(Vec::new());
            }
            return Err(io_err_at(at_rule.span, &e));
        }
    };

    if ctx.stack.contains(&canonical) {
        return Err(LessError::import(
            format!("import cycle detected at '{}'", canonical.display()),
            at_rule.span,
        ));
    }

    if !flags.multiple {
        if ctx.seen_once.contains(&canonical) {
            return Ok(Vec::new());
        }
        ctx.seen_once.insert(canonical.clone());
    }

    let is_stylesheet = flags.less
        || (!flags.css
            && !flags.inline
            && canonical.extension().map_or(true, |ext| ext.eq_ignore_ascii_case("less")));

    let source = match ctx.fs.read_to_string(&canonical) {
        Ok(s) => s,
        Err(e) => {
            if flags.optional {
                return Ok(Vec::new());
            }
            return Err(io_err_at(at_rule.span, &e));
        }
    };

    if !is_stylesheet {
        // `inline`/`css`: embed the file's text verbatim, with no LESS
        // evaluation at all (spec.md §4.3).
        return Ok(vec![Statement::AtRule(AtRule {
            name: VERBATIM_PASSTHROUGH.to_string(),
            parameters: source,
            block: AtRuleBlock::None,
            span: at_rule.span,
        })]);
    }

    let file = ctx.codemap.add_file(canonical.display().to_string(), source);
    let tokens = lexer::lex(&file)?;
    let imported = parser::parse(tokens)?;

    ctx.stack.push(canonical);
    let resolved = resolve_statements(imported.statements, ctx)?;
    ctx.stack.pop();

    if flags.reference {
        // Still visible for the duration of this recursion (mixin
        // definitions could be called from within the imported file
        // itself); dropped from the final output (spec.md §4.3).
        return Ok(Vec::new());
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeFs {
        files: HashMap<PathBuf, String>,
    }

    impl Filesystem for FakeFs {
        fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
        }

        fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
            if self.files.contains_key(path) {
                Ok(path.to_path_buf())
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"))
            }
        }
    }

    fn compile_with_fs(entry: &str, files: HashMap<PathBuf, String>) -> LessResult<Stylesheet> {
        let fs = FakeFs { files };
        let mut codemap = CodeMap::new();
        let entry_path = PathBuf::from(entry);
        let source = fs.files.get(&entry_path).unwrap().clone();
        let file = codemap.add_file(entry.to_string(), source);
        let tokens = lexer::lex(&file)?;
        let stylesheet = parser::parse(tokens)?;
        resolve_imports(stylesheet, &fs, &entry_path, &mut codemap)
    }

    #[test]
    fn optional_missing_import_is_dropped() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("entry.less"),
            "@import (optional) \"missing.less\";\n.a { color: red; }".to_string(),
        );
        let result = compile_with_fs("entry.less", files).unwrap();
        assert_eq!(result.statements.len(), 1);
    }

    #[test]
    fn cycle_is_detected() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("a.less"),
            "@import \"b.less\";".to_string(),
        );
        files.insert(
            PathBuf::from("b.less"),
            "@import \"a.less\";".to_string(),
        );
        let err = compile_with_fs("a.less", files).unwrap_err();
        assert!(matches!(err, LessError::Import { .. }));
    }
}
