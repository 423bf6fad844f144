#![cfg(test)]

#[macro_use]
mod macros;

test!(
    descendant_combinator_is_implicit,
    ".card { .title { font-weight: bold; } }",
    ".card .title {\n  font-weight: bold;\n}\n"
);

test!(
    single_line_descendant_selector_keeps_its_space,
    ".a .b { color: red; }",
    ".a .b {\n  color: red;\n}\n"
);

test!(
    bare_element_descendant_selector_keeps_its_space,
    "ul li { color: red; }",
    "ul li {\n  color: red;\n}\n"
);

test!(
    compound_class_selector_with_no_whitespace_stays_attached,
    ".a.b { color: red; }",
    ".a.b {\n  color: red;\n}\n"
);

test!(
    ampersand_attaches_without_whitespace,
    ".btn { &:hover { color: blue; } }",
    ".btn:hover {\n  color: blue;\n}\n"
);

test!(
    ampersand_can_prefix_a_modifier_class,
    ".btn { &.active { color: green; } }",
    ".btn.active {\n  color: green;\n}\n"
);

test!(
    comma_selector_at_parent_and_child_cartesian_products,
    ".a, .b { .x, .y { color: red; } }",
    ".a .x,\n.a .y,\n.b .x,\n.b .y {\n  color: red;\n}\n"
);

test!(
    sibling_combinator_parent_reference,
    ".item { & + & { margin-left: 4px; } }",
    ".item + .item {\n  margin-left: 4px;\n}\n"
);

test!(
    deeply_nested_rules_each_emit_their_own_flattened_rule,
    ".a { color: red; .b { color: green; .c { color: blue; } } }",
    ".a {\n  color: red;\n}\n\n.a .b {\n  color: green;\n}\n\n.a .b .c {\n  color: blue;\n}\n"
);
