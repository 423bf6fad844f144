//! AST node types (spec.md §3). A single exhaustively-matched enum per
//! sum type, per the Design Notes in spec.md §9 -- no marker-method
//! polymorphism.

use codemap::Span;

use crate::common::{Combinator, CompareOp};
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Rule(Rule),
    MixinCall(MixinCall),
    VariableDeclaration(VariableDeclaration),
    AtRule(AtRule),
    Comment(Comment),
    Declaration(Declaration),
}

/// Represents both plain CSS rules (`parameters` empty, `guard` absent)
/// and mixin definitions (spec.md §3 "Rule").
#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: Selector,
    /// Declarations, nested rules, mixin calls, variable declarations, and
    /// comments, in source order. See DESIGN.md "Rule body ordering" for
    /// why this is one ordered list rather than the two separate
    /// `declarations`/`nested_statements` fields spec.md §3 names --
    /// mixin splicing needs them interleaved in source order and a single
    /// list is the only way to keep that order through a splice.
    pub body: Vec<Statement>,
    pub parameters: Vec<Parameter>,
    pub guard: Option<Guard>,
    pub extends: Vec<ExtendTarget>,
    pub leading_comments: Vec<String>,
    /// Whether the selector was written with a trailing `()`, e.g.
    /// `.mixin() { ... }` -- marks it as a mixin definition even with zero
    /// parameters (spec.md §3 "Rule").
    pub has_call_parens: bool,
    pub span: Span,
}

impl Rule {
    /// A rule *is* a mixin definition iff its selector is a single class
    /// or id and it carries parameters, or its selector was written with a
    /// trailing `()` (spec.md §3 "Rule").
    pub fn is_mixin_definition(&self) -> bool {
        self.selector.is_single_class_or_id() && (!self.parameters.is_empty() || self.has_call_parens)
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Value>,
    pub is_rest: bool,
}

#[derive(Debug, Clone)]
pub struct Guard {
    /// Outer: disjunction (`,`); inner: conjunction (`and`).
    pub groups: Vec<Vec<GuardCondition>>,
    /// `true` for `when not (...)` / `unless (...)`.
    pub negate: bool,
}

#[derive(Debug, Clone)]
pub struct GuardCondition {
    pub left: Value,
    pub op: CompareOp,
    pub right: Value,
}

#[derive(Debug, Clone)]
pub struct ExtendTarget {
    pub selector: Selector,
    pub all: bool,
}

#[derive(Debug, Clone)]
pub struct MixinCall {
    /// Namespaced lookup path, e.g. `[#ns, .mixin]` (spec.md §3).
    pub path: Vec<String>,
    pub arguments: Vec<Argument>,
    pub important: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub name: String,
    pub value: Value,
    pub leading_comments: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AtRuleBlock {
    None,
    Raw(String),
    Statements(Vec<Statement>),
}

#[derive(Debug, Clone)]
pub struct AtRule {
    pub name: String,
    pub parameters: String,
    pub block: AtRuleBlock,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub text: String,
    pub is_block: bool,
}

#[derive(Debug, Clone)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    pub important: bool,
    pub span: Span,
}

/// A comma-delimited set of selector expressions (spec.md §3 "Selector").
#[derive(Debug, Clone, Default)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectorPart {
    pub atoms: Vec<SelectorAtom>,
}

#[derive(Debug, Clone)]
pub enum SelectorAtom {
    /// Raw compound-selector text: type/class/id/attribute/pseudo chunks
    /// that don't need further structure for this compiler's purposes.
    Text(String),
    /// The `&` parent-selector marker.
    Parent,
    Combinator(Combinator),
    Interpolation(Value),
}

impl Selector {
    pub fn new() -> Selector {
        Selector { parts: Vec::new() }
    }

    pub fn from_text(text: &str) -> Selector {
        Selector {
            parts: vec![SelectorPart {
                atoms: vec![SelectorAtom::Text(text.to_string())],
            }],
        }
    }

    pub fn is_single_class_or_id(&self) -> bool {
        if self.parts.len() != 1 {
            return false;
        }
        let atoms = &self.parts[0].atoms;
        atoms.len() == 1
            && matches!(&atoms[0], SelectorAtom::Text(t) if t.starts_with('.') || t.starts_with('#'))
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
