//! The evaluator: walks a fully import-resolved `Stylesheet` and produces
//! flat CSS output (spec.md §4.4 "Evaluator"). Grounded on the teacher's
//! `eat_include` mixin dispatch and the guard-style branch evaluation in
//! `atrule/if_rule.rs`, generalized to the full scope-chain/selector-stack/
//! extend-registry model spec.md describes.

pub mod extend;
pub mod scope;
pub mod selector;

use std::rc::Rc;

use codemap::Span;
use log::trace;

use crate::common::{CompareOp, Op};
use crate::importer::VERBATIM_PASSTHROUGH;
use crate::parser::ast::{
    AtRule, AtRuleBlock, Declaration as AstDeclaration, Guard, GuardCondition, MixinCall, Rule,
    Selector, SelectorAtom, Statement, Stylesheet, VariableDeclaration,
};
use crate::value::Value;

use extend::ExtendRegistry;
use scope::Scope;
use self::selector::{ResolvedAtom, ResolvedPart};

/// Knobs the caller can tune; see `CompileOptions` in `lib.rs` for the
/// public-facing counterpart this is built from.
#[derive(Debug, Clone)]
pub struct EvalOptions {
    pub max_recursion_depth: u32,
}

impl Default for EvalOptions {
    fn default() -> EvalOptions {
        EvalOptions { max_recursion_depth: 100 }
    }
}

/// One flattened declaration, ready for rendering.
#[derive(Debug, Clone)]
pub struct OutDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// The evaluator's output tree. Flat at the rule level (spec.md §4.4
/// "each fully-qualified rule is emitted exactly once in source order"),
/// but at-rules that wrap nested statements (`@media`, `@supports`,
/// `@keyframes`) keep their own nesting so the renderer can reproduce the
/// wrapping block.
#[derive(Debug, Clone)]
pub enum OutputItem {
    Rule {
        selectors: Vec<String>,
        declarations: Vec<OutDeclaration>,
    },
    AtRuleBlock {
        prelude: String,
        items: Vec<OutputItem>,
    },
    Verbatim(String),
}

pub struct Evaluator {
    scope: Scope,
    extends: ExtendRegistry,
    recursion_depth: u32,
    options: EvalOptions,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Evaluator {
        Evaluator {
            scope: Scope::new(),
            extends: ExtendRegistry::new(),
            recursion_depth: 0,
            options,
        }
    }

    pub fn eval_stylesheet(mut self, stylesheet: &Stylesheet) -> crate::error::LessResult<Vec<OutputItem>> {
        let mut out = Vec::new();
        self.eval_statement_list(&stylesheet.statements, &[], &mut Vec::new(), &mut out)?;
        let mut refs: Vec<&mut Vec<String>> = Vec::new();
        collect_selector_refs(&mut out, &mut refs);
        self.extends.apply(refs);
        Ok(out)
    }

    /// Evaluates one statement list (a rule body, an at-rule block, or the
    /// stylesheet's top level) under `current_selectors`. Declarations that
    /// belong directly to the enclosing rule accumulate into `own_decls`;
    /// everything else (nested rules, at-rule blocks, verbatim imports)
    /// appends further `OutputItem`s to `out`.
    fn eval_statement_list(
        &mut self,
        statements: &[Statement],
        current_selectors: &[String],
        own_decls: &mut Vec<OutDeclaration>,
        out: &mut Vec<OutputItem>,
    ) -> crate::error::LessResult<()> {
        for stmt in statements {
            match stmt {
                Statement::Comment(_) => {}
                Statement::VariableDeclaration(decl) => self.eval_variable_declaration(decl)?,
                Statement::Declaration(decl) => own_decls.push(self.eval_declaration(decl)?),
                Statement::Rule(rule) => self.eval_rule(rule, current_selectors, out)?,
                Statement::MixinCall(call) => {
                    self.eval_mixin_call(call, current_selectors, own_decls, out)?
                }
                Statement::AtRule(at_rule) => self.eval_at_rule(at_rule, current_selectors, out)?,
            }
        }
        Ok(())
    }

    fn eval_variable_declaration(&mut self, decl: &VariableDeclaration) -> crate::error::LessResult<()> {
        let value = self.reduce(&decl.value)?;
        self.scope.declare_variable(decl.name.clone(), value);
        Ok(())
    }

    fn eval_declaration(&mut self, decl: &AstDeclaration) -> crate::error::LessResult<OutDeclaration> {
        let value = self.reduce(&decl.value)?;
        Ok(OutDeclaration {
            property: decl.property.clone(),
            value: value.render(),
            important: decl.important,
        })
    }

    fn eval_rule(
        &mut self,
        rule: &Rule,
        parent_selectors: &[String],
        out: &mut Vec<OutputItem>,
    ) -> crate::error::LessResult<()> {
        if rule.selector.is_single_class_or_id() {
            let key = mixin_key(&rule.selector);
            self.scope.declare_mixin(key, Rc::new(rule.clone()));
        }
        if rule.is_mixin_definition() {
            // Mixin definitions don't emit CSS on their own (spec.md §3
            // "Rule"); they're only visible for later `MixinCall`s.
            return Ok(());
        }

        let resolved = self.resolve_selector(&rule.selector)?;
        let own_selectors = selector::combine(parent_selectors, &resolved);

        self.scope.push();
        let mut own_decls = Vec::new();
        // Nested rules hoist out into their own flattened blocks, which
        // come *after* this rule's own declarations regardless of how
        // declarations and nested rules interleave in source (spec.md
        // §4.4 "each fully-qualified rule is emitted exactly once in
        // source order" -- source order among siblings, parent before its
        // own nested children). Accumulating into a separate buffer here
        // (instead of the caller's `out`) keeps that order even though
        // `own_decls` isn't complete until the whole body has been walked.
        let mut nested_out = Vec::new();
        self.eval_statement_list(&rule.body, &own_selectors, &mut own_decls, &mut nested_out)?;
        self.scope.pop();

        for ext in &rule.extends {
            let target_parts = self.resolve_selector(&ext.selector)?;
            for target in selector::resolve_extend_target(&own_selectors, &target_parts) {
                for extending in &own_selectors {
                    self.extends.register(target.clone(), extending.clone(), ext.all);
                }
            }
        }

        if !own_decls.is_empty() {
            out.push(OutputItem::Rule { selectors: own_selectors, declarations: own_decls });
        }
        out.extend(nested_out);
        Ok(())
    }

    fn eval_at_rule(
        &mut self,
        at_rule: &AtRule,
        current_selectors: &[String],
        out: &mut Vec<OutputItem>,
    ) -> crate::error::LessResult<()> {
        if at_rule.name == VERBATIM_PASSTHROUGH {
            out.push(OutputItem::Verbatim(at_rule.parameters.clone()));
            return Ok(());
        }
        match &at_rule.block {
            AtRuleBlock::Statements(inner) => {
                self.scope.push();
                let mut nested_out = Vec::new();
                let mut stray_decls = Vec::new();
                self.eval_statement_list(inner, current_selectors, &mut stray_decls, &mut nested_out)?;
                self.scope.pop();
                let prelude = if at_rule.parameters.is_empty() {
                    format!("@{}", at_rule.name)
                } else {
                    format!("@{} {}", at_rule.name, at_rule.parameters)
                };
                out.push(OutputItem::AtRuleBlock { prelude, items: nested_out });
            }
            AtRuleBlock::Raw(s) => {
                out.push(OutputItem::Verbatim(format!("@{} {};", at_rule.name, s)));
            }
            AtRuleBlock::None => {
                out.push(OutputItem::Verbatim(format!("@{} {};", at_rule.name, at_rule.parameters)));
            }
        }
        Ok(())
    }

    fn resolve_selector(&mut self, selector: &Selector) -> crate::error::LessResult<Vec<ResolvedPart>> {
        let mut parts = Vec::with_capacity(selector.parts.len());
        for part in &selector.parts {
            let mut resolved: ResolvedPart = Vec::with_capacity(part.atoms.len());
            for atom in &part.atoms {
                resolved.push(match atom {
                    SelectorAtom::Text(t) => ResolvedAtom::Text(t.clone()),
                    SelectorAtom::Parent => ResolvedAtom::Parent,
                    SelectorAtom::Combinator(c) => ResolvedAtom::Combinator(*c),
                    SelectorAtom::Interpolation(v) => ResolvedAtom::Text(self.reduce(v)?.render()),
                });
            }
            parts.push(resolved);
        }
        Ok(parts)
    }

    fn eval_mixin_call(
        &mut self,
        call: &MixinCall,
        current_selectors: &[String],
        own_decls: &mut Vec<OutDeclaration>,
        out: &mut Vec<OutputItem>,
    ) -> crate::error::LessResult<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > self.options.max_recursion_depth {
            self.recursion_depth -= 1;
            return Err(crate::error::LessError::eval(
                "maximum mixin recursion depth exceeded",
                call.span,
            ));
        }
        let result = self.eval_mixin_call_inner(call, current_selectors, own_decls, out);
        self.recursion_depth -= 1;
        result
    }

    fn eval_mixin_call_inner(
        &mut self,
        call: &MixinCall,
        current_selectors: &[String],
        own_decls: &mut Vec<OutDeclaration>,
        out: &mut Vec<OutputItem>,
    ) -> crate::error::LessResult<()> {
        let defs = self.resolve_mixin_path(&call.path, call.span)?;
        if defs.is_empty() {
            return Err(crate::error::LessError::eval(
                format!("no mixin definition found for '{}'", call.path.join(" ")),
                call.span,
            ));
        }

        // Evaluate call-site argument expressions once, in the caller's
        // scope, before binding them against any particular overload.
        let mut evaluated_positional = Vec::new();
        let mut evaluated_named = Vec::new();
        for arg in &call.arguments {
            let v = self.reduce(&arg.value)?;
            match &arg.name {
                Some(name) => evaluated_named.push((name.clone(), v)),
                None => evaluated_positional.push(v),
            }
        }

        let mut any_arity_match = false;
        let mut matched_any = false;
        for def in &defs {
            if !arity_compatible(def, evaluated_positional.len() + evaluated_named.len()) {
                continue;
            }
            any_arity_match = true;

            self.scope.push();
            bind_arguments(&mut self.scope, def, &evaluated_positional, &evaluated_named)?;

            let guard_ok = match &def.guard {
                None => true,
                Some(g) => self.eval_guard(g)?,
            };
            if !guard_ok {
                self.scope.pop();
                continue;
            }
            matched_any = true;
            trace!("invoking mixin '{}'", call.path.join(" "));
            self.eval_statement_list(&def.body, current_selectors, own_decls, out)?;
            self.scope.pop();
        }

        if !any_arity_match {
            return Err(crate::error::LessError::eval(
                format!("no overload of '{}' accepts {} argument(s)", call.path.join(" "), call.arguments.len()),
                call.span,
            ));
        }
        if !matched_any {
            return Err(crate::error::LessError::eval(
                format!("no matching guard for '{}'", call.path.join(" ")),
                call.span,
            ));
        }
        Ok(())
    }

    fn resolve_mixin_path(&self, path: &[String], span: Span) -> crate::error::LessResult<Vec<Rc<Rule>>> {
        if path.is_empty() {
            return Ok(Vec::new());
        }
        let mut current = self.scope.lookup_mixins(&path[0]).map(<[Rc<Rule>]>::to_vec).unwrap_or_default();
        for segment in &path[1..] {
            let namespace = match current.last() {
                Some(r) => r,
                None => return Ok(Vec::new()),
            };
            current = namespace
                .body
                .iter()
                .filter_map(|s| match s {
                    Statement::Rule(r) if mixin_key(&r.selector) == *segment => Some(Rc::new(r.clone())),
                    _ => None,
                })
                .collect();
        }
        let _ = span;
        Ok(current)
    }

    fn eval_guard(&mut self, guard: &Guard) -> crate::error::LessResult<bool> {
        let mut result = false;
        for group in &guard.groups {
            let mut group_result = true;
            for cond in group {
                if !self.eval_guard_condition(cond)? {
                    group_result = false;
                    break;
                }
            }
            if group_result {
                result = true;
                break;
            }
        }
        Ok(result ^ guard.negate)
    }

    fn eval_guard_condition(&mut self, cond: &GuardCondition) -> crate::error::LessResult<bool> {
        let left = self.reduce(&cond.left)?;
        let right = self.reduce(&cond.right)?;
        Ok(compare_values(&left, &right, cond.op))
    }

    /// Reduces a `Value` tree to one with no remaining `Variable`,
    /// `FunctionCall`, `BinaryOp`, or `Interpolation` nodes (spec.md §4.4
    /// "Evaluation of values").
    pub fn reduce(&mut self, value: &Value) -> crate::error::LessResult<Value> {
        match value {
            Value::Color(_) | Value::Number(_) | Value::Str(..) | Value::Keyword(_) | Value::Url(_) => {
                Ok(value.clone())
            }
            Value::Variable(name, span) => match self.scope.lookup_variable(name) {
                Some(v) => Ok(v.clone()),
                None => {
                    // Unknown variable references pass through as literal
                    // text (spec.md §4.5) -- intentional, for CSS custom
                    // property pass-through.
                    let _ = span;
                    Ok(Value::Keyword(format!("@{}", name)))
                }
            },
            Value::FunctionCall(name, args, span) => {
                let mut reduced = Vec::with_capacity(args.len());
                for a in args {
                    reduced.push(self.reduce(a)?);
                }
                match crate::builtin::call(name, &reduced, *span)? {
                    Some(v) => Ok(v),
                    None => Ok(Value::Keyword(format!(
                        "{}({})",
                        name,
                        reduced.iter().map(Value::render).collect::<Vec<_>>().join(", ")
                    ))),
                }
            }
            Value::BinaryOp { left, op, right, in_parens, span } => {
                let left = self.reduce(left)?;
                let right = self.reduce(right)?;
                Ok(eval_binary_op(&left, *op, &right, *in_parens, *span))
            }
            Value::List(items, sep) => {
                let mut reduced = Vec::with_capacity(items.len());
                for i in items {
                    reduced.push(self.reduce(i)?);
                }
                Ok(Value::List(reduced, *sep))
            }
            Value::Interpolation(inner) => {
                let reduced = self.reduce(inner)?;
                Ok(Value::Keyword(reduced.render()))
            }
        }
    }
}

fn mixin_key(selector: &Selector) -> String {
    if selector.parts.len() == 1 && selector.parts[0].atoms.len() == 1 {
        if let SelectorAtom::Text(t) = &selector.parts[0].atoms[0] {
            return t.clone();
        }
    }
    // Not a single class/id atom -- never looked up as a mixin, but still
    // needs a stable (if uncallable) key.
    String::new()
}

fn arity_compatible(def: &Rule, arg_count: usize) -> bool {
    let required = def.parameters.iter().filter(|p| p.default.is_none() && !p.is_rest).count();
    let has_rest = def.parameters.iter().any(|p| p.is_rest);
    if has_rest {
        arg_count >= required
    } else {
        arg_count >= required && arg_count <= def.parameters.len()
    }
}

fn bind_arguments(
    scope: &mut Scope,
    def: &Rule,
    positional: &[Value],
    named: &[(String, Value)],
) -> crate::error::LessResult<()> {
    let mut next_positional = 0usize;
    for param in &def.parameters {
        if param.is_rest {
            let rest: Vec<Value> = positional[next_positional.min(positional.len())..].to_vec();
            scope.declare_variable(param.name.clone(), Value::List(rest, crate::common::ListSeparator::Comma));
            next_positional = positional.len();
            continue;
        }
        if let Some((_, v)) = named.iter().find(|(n, _)| *n == param.name) {
            scope.declare_variable(param.name.clone(), v.clone());
            continue;
        }
        if next_positional < positional.len() {
            scope.declare_variable(param.name.clone(), positional[next_positional].clone());
            next_positional += 1;
            continue;
        }
        if let Some(default) = &param.default {
            scope.declare_variable(param.name.clone(), default.clone());
        }
    }
    Ok(())
}

fn compare_values(left: &Value, right: &Value, op: CompareOp) -> bool {
    if let (Value::Number(a), Value::Number(b)) = (left, right) {
        return match op {
            CompareOp::Eq => a.compare(b) == Some(std::cmp::Ordering::Equal),
            CompareOp::Ne => a.compare(b) != Some(std::cmp::Ordering::Equal),
            CompareOp::Lt => a.compare(b) == Some(std::cmp::Ordering::Less),
            CompareOp::Gt => a.compare(b) == Some(std::cmp::Ordering::Greater),
            CompareOp::Le => matches!(a.compare(b), Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)),
            CompareOp::Ge => matches!(a.compare(b), Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)),
        };
    }
    let eq = left.render() == right.render();
    match op {
        CompareOp::Eq => eq,
        CompareOp::Ne => !eq,
        _ => false,
    }
}

fn eval_binary_op(left: &Value, op: Op, right: &Value, in_parens: bool, span: Span) -> Value {
    if op == Op::Div && !in_parens {
        return Value::Keyword(format!("{}{}{}", left.render(), op, right.render()));
    }
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match op {
            Op::Add => a.add(b).map_or_else(|| pass_through(left, op, right), Value::Number),
            Op::Sub => a.sub(b).map_or_else(|| pass_through(left, op, right), Value::Number),
            Op::Mul => Value::Number(a.mul(b)),
            Op::Div => Value::Number(a.div(b)),
        },
        (Value::Color(c), Value::Number(n)) => Value::Color(color_number_op(*c, op, n.value)),
        (Value::Number(n), Value::Color(c)) => match op {
            Op::Add | Op::Mul => Value::Color(color_number_op(*c, op, n.value)),
            _ => pass_through(left, op, right),
        },
        (Value::Color(a), Value::Color(b)) => match op {
            Op::Add => Value::Color(a.add_color(b)),
            Op::Sub => Value::Color(a.sub_color(b)),
            _ => pass_through(left, op, right),
        },
        _ => {
            let _ = span;
            pass_through(left, op, right)
        }
    }
}

fn color_number_op(c: crate::color::Color, op: Op, n: f64) -> crate::color::Color {
    match op {
        Op::Add => c.add_scalar(n),
        Op::Sub => c.add_scalar(-n),
        Op::Mul => c.scale_scalar(n),
        Op::Div => c.scale_scalar(1.0 / n),
    }
}

fn pass_through(left: &Value, op: Op, right: &Value) -> Value {
    Value::Keyword(format!("{} {} {}", left.render(), op, right.render()))
}

fn collect_selector_refs<'a>(items: &'a mut [OutputItem], out: &mut Vec<&'a mut Vec<String>>) {
    for item in items {
        match item {
            OutputItem::Rule { selectors, .. } => out.push(selectors),
            OutputItem::AtRuleBlock { items, .. } => collect_selector_refs(items, out),
            OutputItem::Verbatim(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser;
    use codemap::CodeMap;

    fn eval_source(src: &str) -> Vec<OutputItem> {
        let mut codemap = CodeMap::new();
        let file = codemap.add_file("test.less".to_string(), src.to_string());
        let tokens = lexer::lex(&file).unwrap();
        let stylesheet = parser::parse(tokens).unwrap();
        Evaluator::new(EvalOptions::default()).eval_stylesheet(&stylesheet).unwrap()
    }

    #[test]
    fn variable_substitution() {
        let out = eval_source("@color: red;\n.a { color: @color; }");
        match &out[0] {
            OutputItem::Rule { selectors, declarations } => {
                assert_eq!(selectors, &vec![".a".to_string()]);
                assert_eq!(declarations[0].value, "red");
            }
            _ => panic!("expected a rule"),
        }
    }

    #[test]
    fn nested_rule_combines_with_ampersand() {
        let out = eval_source(".btn { &:hover { color: blue; } }");
        assert!(out.iter().any(|item| matches!(
            item,
            OutputItem::Rule { selectors, .. } if selectors == &vec![".btn:hover".to_string()]
        )));
    }

    #[test]
    fn mixin_call_splices_declarations() {
        let out = eval_source(".m(@c) { color: @c; } .a { .m(green); }");
        match &out[0] {
            OutputItem::Rule { declarations, .. } => assert_eq!(declarations[0].value, "green"),
            _ => panic!("expected a rule"),
        }
    }

    #[test]
    fn guard_selects_matching_overload() {
        let out = eval_source(
            ".m(@a) when (@a > 0) { width: 1px; } .m(@a) when (@a <= 0) { width: 2px; } .x { .m(-5); }",
        );
        match &out[0] {
            OutputItem::Rule { declarations, .. } => assert_eq!(declarations[0].value, "2px"),
            _ => panic!("expected a rule"),
        }
    }

    #[test]
    fn recursion_depth_is_bounded() {
        let mut codemap = CodeMap::new();
        let src = ".m(@n) { .m(@n + 1); }\n.a { .m(0); }";
        let file = codemap.add_file("test.less".to_string(), src.to_string());
        let tokens = lexer::lex(&file).unwrap();
        let stylesheet = parser::parse(tokens).unwrap();
        let mut opts = EvalOptions::default();
        opts.max_recursion_depth = 10;
        let err = Evaluator::new(opts).eval_stylesheet(&stylesheet).unwrap_err();
        assert!(matches!(err, crate::error::LessError::Eval { .. }));
    }
}
