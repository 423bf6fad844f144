#![cfg(test)]

#[macro_use]
mod macros;

test!(
    mixin_call_splices_declarations_into_caller,
    ".clearfix() { overflow: hidden; zoom: 1; } .box { .clearfix(); color: red; }",
    ".box {\n  overflow: hidden;\n  zoom: 1;\n  color: red;\n}\n"
);

test!(
    mixin_default_parameter_is_used_when_omitted,
    ".m(@size: 10px) { width: @size; } .a { .m(); }",
    ".a {\n  width: 10px;\n}\n"
);

test!(
    mixin_positional_argument_overrides_default,
    ".m(@size: 10px) { width: @size; } .a { .m(20px); }",
    ".a {\n  width: 20px;\n}\n"
);

test!(
    mixin_named_argument_can_skip_earlier_defaults,
    ".m(@w: 1px, @h: 2px) { width: @w; height: @h; } .a { .m(@h: 9px); }",
    ".a {\n  width: 1px;\n  height: 9px;\n}\n"
);

test!(
    guard_picks_the_truthy_overload,
    ".m(@a) when (@a > 0) { sign: positive; } .m(@a) when (@a <= 0) { sign: non-positive; } .a { .m(5); }",
    ".a {\n  sign: positive;\n}\n"
);

test!(
    unguarded_plain_rule_is_both_emitted_and_callable,
    ".reusable { color: teal; } .a { .reusable(); }",
    ".reusable {\n  color: teal;\n}\n\n.a {\n  color: teal;\n}\n"
);

error!(
    mixin_call_with_no_matching_guard_is_an_error,
    ".m(@a) when (@a > 0) { sign: positive; } .a { .m(-1); }",
    "no matching guard for '.m'"
);

error!(
    unknown_mixin_call_is_an_error,
    ".a { .nope(); }",
    "no mixin definition found for '.nope'"
);

test!(
    rest_parameter_collects_remaining_positional_args,
    ".m(@first, @rest...) { head: @first; } .a { .m(1, 2, 3); }",
    ".a {\n  head: 1;\n}\n"
);

test!(
    recursive_guarded_mixin_with_interpolated_selector_unrolls_in_call_order,
    ".gen(@n) when (@n > 0) { .c-@{n} { width: (10px * @n); } .gen((@n - 1)); } .gen(0) { }\n.gen(3);",
    ".c-3 {\n  width: 30px;\n}\n\n.c-2 {\n  width: 20px;\n}\n\n.c-1 {\n  width: 10px;\n}\n"
);
