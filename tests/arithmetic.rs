#![cfg(test)]

#[macro_use]
mod macros;

test!(
    same_unit_addition,
    ".a { width: 2px + 3px; }",
    ".a {\n  width: 5px;\n}\n"
);

test!(
    unitless_plus_dimensioned_carries_the_dimensioned_unit,
    ".a { width: 2 + 3px; }",
    ".a {\n  width: 5px;\n}\n"
);

test!(
    multiplication_carries_the_left_operands_unit,
    ".a { width: 3px * 2; }",
    ".a {\n  width: 6px;\n}\n"
);

test!(
    parenthesized_division_computes,
    ".a { width: (10px / 2); }",
    ".a {\n  width: 5px;\n}\n"
);

test!(
    unparenthesized_division_is_left_as_literal_text,
    ".a { font: 10px/1.5; }",
    ".a {\n  font: 10px / 1.5;\n}\n"
);

test!(
    convertible_units_are_converted_to_the_left_units_before_adding,
    ".a { width: 1in + 1in; }",
    ".a {\n  width: 2in;\n}\n"
);

test!(
    incompatible_units_fall_back_to_a_literal_pass_through,
    ".a { width: 1px + 1s; }",
    ".a {\n  width: 1px + 1s;\n}\n"
);
