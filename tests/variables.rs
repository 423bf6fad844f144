#![cfg(test)]

#[macro_use]
mod macros;

test!(
    basic_substitution,
    "@color: red;\n.a { color: @color; }",
    ".a {\n  color: red;\n}\n"
);

test!(
    later_declaration_wins_in_same_scope,
    "@w: 1px;\n@w: 2px;\n.a { width: @w; }",
    ".a {\n  width: 2px;\n}\n"
);

test!(
    inner_scope_shadows_outer,
    "@w: 1px;\n.a { @w: 2px; width: @w; }",
    ".a {\n  width: 2px;\n}\n"
);

test!(
    outer_scope_unaffected_by_inner_shadow,
    "@w: 1px;\n.a { @w: 2px; width: @w; }\n.b { width: @w; }",
    ".a {\n  width: 2px;\n}\n\n.b {\n  width: 1px;\n}\n"
);

test!(
    undefined_variable_passes_through_literally,
    ".a { width: @nope; }",
    ".a {\n  width: @nope;\n}\n"
);

test!(
    interpolation_expands_to_an_unquoted_value,
    "@side: left;\n.a { content: @{side}; }",
    ".a {\n  content: left;\n}\n"
);
