//! The recursive value sum type (spec.md §3 "Value").

pub mod number;

use codemap::Span;

use crate::color::Color;
use crate::common::{ListSeparator, Op, QuoteKind};
pub use number::Number;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Color(Color),
    Number(Number),
    Str(String, QuoteKind),
    /// A bare keyword: `auto`, `none`, `inherit`, a font-family name, …
    Keyword(String),
    Url(String),
    /// `@name` -- resolved against the scope chain at evaluation time.
    Variable(String, Span),
    FunctionCall(String, Vec<Value>, Span),
    /// `in_parens` records whether this expression (for `/`, whether
    /// computed division applies) was wrapped in an explicit `(...)`
    /// group, per spec.md §4.4's parenthesized-division rule.
    BinaryOp {
        left: Box<Value>,
        op: Op,
        right: Box<Value>,
        in_parens: bool,
        span: Span,
    },
    List(Vec<Value>, ListSeparator),
    /// `@{name}` / `#{expr}` -- expands to the unquoted stringified value
    /// of the inner expression (spec.md §4.4 "Interpolation").
    Interpolation(Box<Value>),
}

impl Value {
    pub fn keyword(s: impl Into<String>) -> Value {
        Value::Keyword(s.into())
    }

    /// Renders a value that is already fully reduced (no variables,
    /// function calls, or binary ops left) as the text that belongs in
    /// CSS output. The evaluator calls this only after `reduce`.
    pub fn render(&self) -> String {
        match self {
            Value::Color(c) => c.to_css_string(),
            Value::Number(n) => n.to_string(),
            Value::Str(s, QuoteKind::None) => s.clone(),
            Value::Str(s, QuoteKind::Double) => format!("\"{}\"", s),
            Value::Str(s, QuoteKind::Single) => format!("'{}'", s),
            Value::Keyword(k) => k.clone(),
            Value::Url(u) => format!("url({})", u),
            Value::Variable(name, _) => format!("@{}", name),
            Value::FunctionCall(name, args, _) => format!(
                "{}({})",
                name,
                args.iter().map(Value::render).collect::<Vec<_>>().join(", ")
            ),
            Value::BinaryOp { left, op, right, .. } => {
                format!("{}{}{}", left.render(), op, right.render())
            }
            Value::List(items, sep) => items
                .iter()
                .map(Value::render)
                .collect::<Vec<_>>()
                .join(sep.as_str()),
            Value::Interpolation(inner) => inner.render(),
        }
    }

    /// True if the value reduces to the boolean keyword `true` (used for
    /// guard conditions and the `if()` built-in).
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Keyword(k) if k == "false")
    }
}
