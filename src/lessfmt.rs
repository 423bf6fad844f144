//! Re-emits a parsed `Stylesheet` as canonically formatted LESS source
//! (spec.md §6 "`fmt <file-glob>…` — parse and re-emit each matching
//! file in place"). Operates directly on the AST, before import
//! resolution or evaluation -- unlike `format::render`, which prints
//! compiled CSS. `Value::render()` already renders unreduced nodes
//! (`Variable`, `FunctionCall`, `BinaryOp`, `Interpolation`) as LESS
//! source text, so this module reuses it directly rather than
//! duplicating a second value printer.

use std::fmt::Write;

use crate::common::CompareOp;
use crate::parser::ast::{
    Argument, AtRule, AtRuleBlock, Comment, Declaration, Guard, MixinCall, Parameter, Rule, Selector,
    SelectorAtom, Statement, Stylesheet, VariableDeclaration,
};

const INDENT: &str = "  ";

pub fn format_stylesheet(stylesheet: &Stylesheet) -> String {
    let mut out = String::new();
    format_statements(&stylesheet.statements, 0, &mut out);
    out
}

fn pad(depth: usize) -> String {
    INDENT.repeat(depth)
}

fn format_statements(statements: &[Statement], depth: usize, out: &mut String) {
    for stmt in statements {
        format_statement(stmt, depth, out);
    }
}

fn format_statement(stmt: &Statement, depth: usize, out: &mut String) {
    match stmt {
        Statement::Comment(c) => format_comment(c, depth, out),
        Statement::VariableDeclaration(v) => format_variable_declaration(v, depth, out),
        Statement::Declaration(d) => format_declaration(d, depth, out),
        Statement::MixinCall(call) => format_mixin_call(call, depth, out),
        Statement::Rule(rule) => format_rule(rule, depth, out),
        Statement::AtRule(at_rule) => format_at_rule(at_rule, depth, out),
    }
}

fn format_comment(c: &Comment, depth: usize, out: &mut String) {
    if c.is_block {
        let _ = writeln!(out, "{}/*{}*/", pad(depth), c.text);
    } else {
        let _ = writeln!(out, "{}//{}", pad(depth), c.text);
    }
}

fn format_variable_declaration(v: &VariableDeclaration, depth: usize, out: &mut String) {
    for c in &v.leading_comments {
        let _ = writeln!(out, "{}//{}", pad(depth), c);
    }
    let _ = writeln!(out, "{}@{}: {};", pad(depth), v.name, v.value.render());
}

fn format_declaration(d: &Declaration, depth: usize, out: &mut String) {
    let important = if d.important { " !important" } else { "" };
    let _ = writeln!(out, "{}{}: {}{};", pad(depth), d.property, d.value.render(), important);
}

fn format_argument(arg: &Argument) -> String {
    match &arg.name {
        Some(name) => format!("@{}: {}", name, arg.value.render()),
        None => arg.value.render(),
    }
}

fn format_mixin_call(call: &MixinCall, depth: usize, out: &mut String) {
    let path = call.path.join(" ");
    let important = if call.important { " !important" } else { "" };
    if call.arguments.is_empty() {
        let _ = writeln!(out, "{}{}{};", pad(depth), path, important);
    } else {
        let args = call.arguments.iter().map(format_argument).collect::<Vec<_>>().join(", ");
        let _ = writeln!(out, "{}{}({}){};", pad(depth), path, args, important);
    }
}

fn format_parameter(p: &Parameter) -> String {
    if p.is_rest {
        return format!("@{}...", p.name);
    }
    match &p.default {
        Some(d) => format!("@{}: {}", p.name, d.render()),
        None => format!("@{}", p.name),
    }
}

fn format_guard(guard: &Guard) -> String {
    let keyword = if guard.negate { "unless" } else { "when" };
    let groups = guard
        .groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|cond| format!("({} {} {})", cond.left.render(), compare_op_str(cond.op), cond.right.render()))
                .collect::<Vec<_>>()
                .join(" and ")
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} {}", keyword, groups)
}

fn compare_op_str(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "=",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Gt => ">",
        CompareOp::Le => "<=",
        CompareOp::Ge => ">=",
    }
}

fn format_selector(selector: &Selector) -> String {
    selector
        .parts
        .iter()
        .map(|part| {
            let mut s = String::new();
            for atom in &part.atoms {
                match atom {
                    SelectorAtom::Text(t) => s.push_str(t),
                    SelectorAtom::Parent => s.push('&'),
                    SelectorAtom::Combinator(c) => s.push_str(c.as_str()),
                    SelectorAtom::Interpolation(v) => {
                        let _ = write!(s, "@{{{}}}", v.render());
                    }
                }
            }
            s.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_rule(rule: &Rule, depth: usize, out: &mut String) {
    for c in &rule.leading_comments {
        let _ = writeln!(out, "{}//{}", pad(depth), c);
    }
    let mut header = format_selector(&rule.selector);
    if !rule.parameters.is_empty() || rule.has_call_parens {
        let params = rule.parameters.iter().map(format_parameter).collect::<Vec<_>>().join(", ");
        let _ = write!(header, "({})", params);
    }
    if let Some(guard) = &rule.guard {
        let _ = write!(header, " {}", format_guard(guard));
    }
    let _ = writeln!(out, "{}{} {{", pad(depth), header);
    format_statements(&rule.body, depth + 1, out);
    for ext in &rule.extends {
        let all = if ext.all { " all" } else { "" };
        let _ = writeln!(out, "{}&:extend({}{});", pad(depth + 1), format_selector(&ext.selector), all);
    }
    let _ = writeln!(out, "{}}}", pad(depth));
}

fn format_at_rule(at_rule: &AtRule, depth: usize, out: &mut String) {
    let prelude = if at_rule.parameters.is_empty() {
        format!("@{}", at_rule.name)
    } else {
        format!("@{} {}", at_rule.name, at_rule.parameters)
    };
    match &at_rule.block {
        AtRuleBlock::None => {
            let _ = writeln!(out, "{}{};", pad(depth), prelude);
        }
        AtRuleBlock::Raw(s) => {
            let _ = writeln!(out, "{}@{} {};", pad(depth), at_rule.name, s);
        }
        AtRuleBlock::Statements(inner) => {
            let _ = writeln!(out, "{}{} {{", pad(depth), prelude);
            format_statements(inner, depth + 1, out);
            let _ = writeln!(out, "{}}}", pad(depth));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;
    use crate::parser;
    use codemap::CodeMap;

    fn roundtrip(src: &str) -> String {
        let mut codemap = CodeMap::new();
        let file = codemap.add_file("t.less".to_string(), src.to_string());
        let tokens = lexer::lex(&file).unwrap();
        let stylesheet = parser::parse(tokens).unwrap();
        format_stylesheet(&stylesheet)
    }

    #[test]
    fn formats_a_simple_rule() {
        let out = roundtrip(".a{color:red;}");
        assert_eq!(out, ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn formats_nested_rule_with_ampersand() {
        let out = roundtrip(".btn{&:hover{color:blue;}}");
        assert!(out.contains("&:hover {"));
    }

    #[test]
    fn formats_mixin_definition_with_guard() {
        let out = roundtrip(".m(@a) when (@a > 0) { width: @a; }");
        assert!(out.contains(".m(@a) when (@a > 0) {"));
    }

    #[test]
    fn formats_variable_declaration() {
        let out = roundtrip("@pad: 4px;");
        assert_eq!(out, "@pad: 4px;\n");
    }
}
