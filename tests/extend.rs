#![cfg(test)]

#[macro_use]
mod macros;

test!(
    plain_extend_attaches_to_the_first_matching_selector,
    ".error { color: red; }\n.validation { &:extend(.error); }",
    ".error,\n.validation {\n  color: red;\n}\n"
);

test!(
    extend_all_attaches_wherever_the_target_text_appears,
    ".alert { color: orange; }\n.form .alert { border: 1px solid; }\n.message { &:extend(.alert all); }",
    ".alert,\n.message {\n  color: orange;\n}\n\n.form .alert,\n.message {\n  border: 1px solid;\n}\n"
);

test!(
    extend_does_not_duplicate_an_already_present_selector,
    ".error { color: red; }\n.error { &:extend(.error); }",
    ".error {\n  color: red;\n}\n"
);
