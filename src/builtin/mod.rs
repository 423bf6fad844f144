//! The built-in function registry (spec.md §4.4 "Built-in functions").
//! Grounded on the teacher's `builtin` module (`mod builtin;` in
//! `lib.rs`), split the same way by concern: math, string, list, color
//! construction/manipulation, and type predicates.

mod color_fns;
mod list;
mod math;
mod string;
mod types;

use codemap::Span;

use crate::error::LessResult;
use crate::value::Value;

/// Dispatches a function call to whichever submodule recognizes `name`.
/// Returns `Ok(None)` for an unrecognized name so the evaluator can fall
/// back to passing the call through as literal CSS text (e.g. `calc()`,
/// `translateX()` -- valid CSS functions this compiler doesn't need to
/// understand).
pub fn call(name: &str, args: &[Value], span: Span) -> LessResult<Option<Value>> {
    let lower = name.to_ascii_lowercase();
    if let Some(r) = math::call(&lower, args, span) {
        return r.map(Some);
    }
    if let Some(r) = color_fns::call(&lower, args, span) {
        return r.map(Some);
    }
    if let Some(r) = string::call(&lower, args, span) {
        return r.map(Some);
    }
    if let Some(r) = list::call(&lower, args, span) {
        return r.map(Some);
    }
    if let Some(r) = types::call(&lower, args, span) {
        return r.map(Some);
    }
    if lower == "if" {
        return Ok(Some(builtin_if(args, span)?));
    }
    Ok(None)
}

fn builtin_if(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [cond, when_true, when_false] => {
            Ok(if cond.is_truthy() { when_true.clone() } else { when_false.clone() })
        }
        [cond, when_true] => Ok(if cond.is_truthy() { when_true.clone() } else { Value::Keyword(String::new()) }),
        _ => Err(crate::error::LessError::eval("if() expects 2 or 3 arguments", span)),
    }
}

/// Shared helper: pulls a plain `f64` out of a `Value::Number`, erroring
/// with the caller's function name on anything else.
fn expect_number(v: &Value, fn_name: &str, span: Span) -> LessResult<crate::value::Number> {
    match v {
        Value::Number(n) => Ok(n.clone()),
        other => Err(crate::error::LessError::eval(
            format!("{}() expects a number, got '{}'", fn_name, other.render()),
            span,
        )),
    }
}

fn expect_color(v: &Value, fn_name: &str, span: Span) -> LessResult<crate::color::Color> {
    match v {
        Value::Color(c) => Ok(*c),
        other => Err(crate::error::LessError::eval(
            format!("{}() expects a color, got '{}'", fn_name, other.render()),
            span,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;
    use crate::unit::Unit;
    use codemap::CodeMap;

    fn span() -> Span {
        let mut cm = CodeMap::new();
        cm.add_file("t".to_string(), "x".to_string()).span
    }

    #[test]
    fn unknown_function_passes_through() {
        assert!(call("translateX", &[Value::Number(Number::new(1.0, Unit::Px))], span()).unwrap().is_none());
    }

    #[test]
    fn if_picks_branch() {
        let out = call(
            "if",
            &[Value::Keyword("true".to_string()), Value::Keyword("a".to_string()), Value::Keyword("b".to_string())],
            span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(out.render(), "a");
    }
}
