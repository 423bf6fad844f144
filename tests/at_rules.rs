#![cfg(test)]

#[macro_use]
mod macros;

test!(
    media_query_condition_is_preserved_on_the_wrapping_block,
    "@media screen and (min-width: 600px) { .a { color: red; } }",
    "@media screen and (min-width: 600px) {\n  .a {\n    color: red;\n  }\n}\n"
);

test!(
    keyframes_percentage_selectors_are_emitted_as_written,
    "@keyframes fade { from { opacity: 0; } 50% { opacity: 0.5; } to { opacity: 1; } }",
    "@keyframes fade {\n  from {\n    opacity: 0;\n  }\n  50% {\n    opacity: 0.5;\n  }\n  to {\n    opacity: 1;\n  }\n}\n"
);

test!(
    supports_block_wraps_its_nested_rule,
    "@supports (display: grid) { .a { display: grid; } }",
    "@supports (display: grid) {\n  .a {\n    display: grid;\n  }\n}\n"
);

test!(
    nested_rule_inside_media_block_combines_with_outer_selector,
    ".card { @media (min-width: 600px) { & { width: 50%; } } }",
    "@media (min-width: 600px) {\n  .card {\n    width: 50%;\n  }\n}\n"
);
