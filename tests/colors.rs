#![cfg(test)]

#[macro_use]
mod macros;

test!(
    six_digit_hex_with_unequal_nibbles_stays_six_digit,
    ".a { color: #FF0102; }",
    ".a {\n  color: #ff0102;\n}\n"
);

test!(
    three_digit_hex_round_trips_through_shorthand,
    ".a { color: #f00; }",
    ".a {\n  color: #f00;\n}\n"
);

test!(
    named_color_round_trips_through_hex,
    ".a { color: red; }",
    ".a {\n  color: red;\n}\n"
);

test!(
    lighten_by_zero_percent_is_the_identity,
    ".a { color: lighten(#336699, 0%); }",
    ".a {\n  color: #369;\n}\n"
);

test!(
    darken_increases_toward_black,
    ".a { color: darken(#ffffff, 100%); }",
    ".a {\n  color: #000;\n}\n"
);

test!(
    mix_of_black_and_white_at_half_is_grey,
    ".a { color: mix(#000000, #ffffff, 50%); }",
    ".a {\n  color: #808080;\n}\n"
);

test!(
    fade_sets_alpha_and_renders_rgba,
    ".a { color: fade(#000000, 50%); }",
    ".a {\n  color: rgba(0, 0, 0, 0.5);\n}\n"
);

test!(
    color_addition_adds_channels,
    ".a { color: #010101 + #010101; }",
    ".a {\n  color: #020202;\n}\n"
);
