//! Error taxonomy for the compile pipeline (spec.md §7).
//!
//! One enum covers every stage. Each variant carries the `codemap::Span`
//! that points at the offending source text so the CLI can render a normal
//! one-line diagnostic with `codemap_diagnostic`.

use std::fmt;
use std::io;

use codemap::Span;
use codemap_diagnostic::{ColorConfig, Diagnostic, Emitter, Level, SpanLabel, SpanStyle};

pub type LessResult<T> = Result<T, LessError>;

#[derive(Debug, Clone)]
pub enum LessError {
    /// Malformed token: unterminated string/comment, invalid escape.
    Lex { message: String, span: Span },
    /// Syntactic violation.
    Parse { message: String, span: Span },
    /// `@import` target not found, filesystem failure, or cycle.
    Import { message: String, span: Span },
    /// Mixin not found, arity mismatch, guard type mismatch, recursion
    /// overflow, incompatible-unit arithmetic with no textual pass-through.
    Eval { message: String, span: Span },
}

impl LessError {
    pub fn lex<S: Into<String>>(message: S, span: Span) -> LessError {
        LessError::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse<S: Into<String>>(message: S, span: Span) -> LessError {
        LessError::Parse {
            message: message.into(),
            span,
        }
    }

    pub fn import<S: Into<String>>(message: S, span: Span) -> LessError {
        LessError::Import {
            message: message.into(),
            span,
        }
    }

    pub fn eval<S: Into<String>>(message: S, span: Span) -> LessError {
        LessError::Eval {
            message: message.into(),
            span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LessError::Lex { message, .. }
            | LessError::Parse { message, .. }
            | LessError::Import { message, .. }
            | LessError::Eval { message, .. } => message,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LessError::Lex { span, .. }
            | LessError::Parse { span, .. }
            | LessError::Import { span, .. }
            | LessError::Eval { span, .. } => *span,
        }
    }

    fn kind_str(&self) -> &'static str {
        match self {
            LessError::Lex { .. } => "lex error",
            LessError::Parse { .. } => "parse error",
            LessError::Import { .. } => "import error",
            LessError::Eval { .. } => "evaluation error",
        }
    }

    /// Render a single human-readable diagnostic line, in the `file:line:col:
    /// message` shape the CLI prints to stderr (spec.md §7).
    pub fn to_diagnostic_string(&self, codemap: &codemap::CodeMap) -> String {
        let loc = codemap.look_up_pos(self.span().low());
        format!(
            "{}:{}:{}: {}: {}",
            loc.file.name(),
            loc.position.line + 1,
            loc.position.column + 1,
            self.kind_str(),
            self.message()
        )
    }

    /// Emit a richer, source-snippet diagnostic via `codemap_diagnostic`.
    /// Falls back to nothing on emitter failure -- callers should still use
    /// `to_diagnostic_string` for the guaranteed one-liner.
    pub fn emit(&self, codemap: &codemap::CodeMap) {
        let label = SpanLabel {
            span: self.span(),
            style: SpanStyle::Primary,
            label: Some(self.message().to_string()),
        };
        let diagnostic = Diagnostic {
            level: Level::Error,
            message: self.kind_str().to_string(),
            code: None,
            spans: vec![label],
        };
        let mut emitter = Emitter::stderr(ColorConfig::Auto, Some(codemap));
        emitter.emit(&[diagnostic]);
    }
}

impl fmt::Display for LessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind_str(), self.message())
    }
}

impl std::error::Error for LessError {}

/// Filesystem failures surfaced through the importer become `Import` errors
/// anchored at a call-site span supplied by the caller via `with_span`.
#[derive(Debug, Clone)]
pub struct IoErrorAt(pub Span, pub String);

impl From<IoErrorAt> for LessError {
    fn from(e: IoErrorAt) -> LessError {
        LessError::import(e.1, e.0)
    }
}

pub(crate) fn io_err_at(span: Span, e: &io::Error) -> LessError {
    LessError::import(e.to_string(), span)
}
