//! Selector combination: `&` substitution, combinator joining, and the
//! cartesian product over comma-separated selector lists (spec.md §4.4
//! "Nesting expansion"). New module -- grounded directly on spec.md's
//! description since the teacher's Sass selector model doesn't carry a
//! bare `&` token the way LESS's does.

use crate::common::Combinator;

/// A selector atom after interpolation has been reduced to plain text.
#[derive(Debug, Clone)]
pub enum ResolvedAtom {
    Text(String),
    Parent,
    Combinator(Combinator),
}

pub type ResolvedPart = Vec<ResolvedAtom>;

/// Combines every parent selector string with every child part, producing
/// the flattened list of fully-qualified selectors for one nested rule
/// (spec.md §4.4: "the cartesian product is taken over parent and child
/// when either lists multiple comma-separated selectors").
pub fn combine(parents: &[String], children: &[ResolvedPart]) -> Vec<String> {
    let parents: Vec<String> = if parents.is_empty() {
        vec![String::new()]
    } else {
        parents.to_vec()
    };
    let mut out = Vec::with_capacity(parents.len() * children.len().max(1));
    for parent in &parents {
        for child in children {
            out.push(combine_one(parent, child));
        }
    }
    out
}

/// Resolves an `&:extend(...)` target: a literal `&` substitutes for the
/// enclosing rule's own selector(s), same as nesting. An unqualified
/// selector is used verbatim -- it names a selector emitted *elsewhere* in
/// the stylesheet, not a descendant of the current rule, so (unlike
/// `combine`) it is never given a descendant-combinator prefix.
pub fn resolve_extend_target(own_selectors: &[String], children: &[ResolvedPart]) -> Vec<String> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        let has_parent_ref = child.iter().any(|a| matches!(a, ResolvedAtom::Parent));
        if has_parent_ref {
            for parent in own_selectors {
                out.push(combine_one(parent, child));
            }
        } else {
            let mut s = String::new();
            for atom in child {
                push_atom(&mut s, atom, "");
            }
            out.push(normalize_whitespace(&s));
        }
    }
    out
}

fn combine_one(parent: &str, child: &ResolvedPart) -> String {
    let has_parent_ref = child.iter().any(|a| matches!(a, ResolvedAtom::Parent));
    let mut s = String::new();
    if !has_parent_ref {
        if !parent.is_empty() {
            s.push_str(parent);
            s.push(' ');
        }
        for atom in child {
            push_atom(&mut s, atom, parent);
        }
    } else {
        for atom in child {
            push_atom(&mut s, atom, parent);
        }
    }
    normalize_whitespace(&s)
}

fn push_atom(s: &mut String, atom: &ResolvedAtom, parent: &str) {
    match atom {
        ResolvedAtom::Text(t) => s.push_str(t),
        ResolvedAtom::Parent => s.push_str(parent),
        ResolvedAtom::Combinator(c) => s.push_str(c.as_str()),
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_reference_substitutes_in_place() {
        let parents = vec![".btn".to_string()];
        let children = vec![vec![ResolvedAtom::Parent, ResolvedAtom::Text(":hover".to_string())]];
        assert_eq!(combine(&parents, &children), vec![".btn:hover".to_string()]);
    }

    #[test]
    fn no_parent_reference_is_descendant() {
        let parents = vec![".card".to_string()];
        let children = vec![vec![ResolvedAtom::Text(".title".to_string())]];
        assert_eq!(combine(&parents, &children), vec![".card .title".to_string()]);
    }

    #[test]
    fn extend_target_without_parent_ref_is_used_verbatim() {
        let children = vec![vec![ResolvedAtom::Text(".error".to_string())]];
        assert_eq!(
            resolve_extend_target(&[".validation".to_string()], &children),
            vec![".error".to_string()]
        );
    }

    #[test]
    fn extend_target_with_parent_ref_substitutes_the_enclosing_selector() {
        let children = vec![vec![ResolvedAtom::Parent, ResolvedAtom::Text(".active".to_string())]];
        assert_eq!(
            resolve_extend_target(&[".btn".to_string()], &children),
            vec![".btn.active".to_string()]
        );
    }

    #[test]
    fn cartesian_product_over_comma_lists() {
        let parents = vec![".a".to_string(), ".b".to_string()];
        let children = vec![
            vec![ResolvedAtom::Text(".x".to_string())],
            vec![ResolvedAtom::Text(".y".to_string())],
        ];
        let combined = combine(&parents, &children);
        assert_eq!(
            combined,
            vec![".a .x", ".a .y", ".b .x", ".b .y"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }
}
