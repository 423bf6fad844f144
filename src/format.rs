//! CSS rendering (spec.md §4.4 "Output formatting"). Grounded on the
//! teacher's `css.rs`/`format.rs` pair (`use crate::css::Css; use
//! crate::format::PrettyPrinter;` in `lib.rs`), generalized from printing
//! a `StyleSheet`'s `Stmt` tree to printing the evaluator's flat
//! `OutputItem` tree.

use std::fmt::Write;

use crate::eval::OutputItem;

const INDENT: &str = "  ";

/// Renders a fully evaluated output tree to a CSS string: two-space
/// declaration indentation, one blank line between top-level rules,
/// comma-separated selectors one per line (spec.md §4.4).
pub fn render(items: &[OutputItem]) -> String {
    let mut out = String::new();
    render_items(items, 0, &mut out);
    out
}

fn render_items(items: &[OutputItem], depth: usize, out: &mut String) {
    let mut first = true;
    for item in items {
        if !first && depth == 0 {
            out.push('\n');
        }
        first = false;
        render_item(item, depth, out);
    }
}

fn render_item(item: &OutputItem, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match item {
        OutputItem::Rule { selectors, declarations } => {
            if declarations.is_empty() {
                return;
            }
            let selector_text = selectors
                .iter()
                .map(|s| format!("{}{}", pad, s))
                .collect::<Vec<_>>()
                .join(",\n");
            let _ = writeln!(out, "{} {{", selector_text);
            for decl in declarations {
                let important = if decl.important { " !important" } else { "" };
                let _ = writeln!(out, "{}{}{}: {}{};", pad, INDENT, decl.property, decl.value, important);
            }
            let _ = writeln!(out, "{}}}", pad);
        }
        OutputItem::AtRuleBlock { prelude, items } => {
            if items.is_empty() {
                return;
            }
            let _ = writeln!(out, "{}{} {{", pad, prelude);
            render_items(items, depth + 1, out);
            let _ = writeln!(out, "{}}}", pad);
        }
        OutputItem::Verbatim(text) => {
            let _ = writeln!(out, "{}{}", pad, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::OutDeclaration;

    #[test]
    fn renders_single_rule_with_two_space_indent() {
        let items = vec![OutputItem::Rule {
            selectors: vec![".a".to_string()],
            declarations: vec![OutDeclaration { property: "color".to_string(), value: "red".to_string(), important: false }],
        }];
        assert_eq!(render(&items), ".a {\n  color: red;\n}\n");
    }

    #[test]
    fn comma_selectors_get_one_per_line() {
        let items = vec![OutputItem::Rule {
            selectors: vec![".a".to_string(), ".b".to_string()],
            declarations: vec![OutDeclaration { property: "color".to_string(), value: "red".to_string(), important: false }],
        }];
        let rendered = render(&items);
        assert!(rendered.starts_with(".a,\n.b {\n"));
    }

    #[test]
    fn blank_line_separates_top_level_rules() {
        let rule = |s: &str| OutputItem::Rule {
            selectors: vec![s.to_string()],
            declarations: vec![OutDeclaration { property: "color".to_string(), value: "red".to_string(), important: false }],
        };
        let items = vec![rule(".a"), rule(".b")];
        let rendered = render(&items);
        assert!(rendered.contains("}\n\n.b"));
    }

    #[test]
    fn empty_rule_emits_nothing() {
        let items = vec![OutputItem::Rule { selectors: vec![".a".to_string()], declarations: vec![] }];
        assert_eq!(render(&items), "");
    }
}
