//! Math built-ins (spec.md §4.4 "Built-in functions": `ceil`, `floor`,
//! `round`, `abs`, `sqrt`, `pow`, `min`, `max`, `mod`, trig, `pi`,
//! `percentage`).

use codemap::Span;

use super::expect_number;
use crate::error::LessResult;
use crate::unit::Unit;
use crate::value::{Number, Value};

pub fn call(name: &str, args: &[Value], span: Span) -> Option<LessResult<Value>> {
    Some(match name {
        "ceil" => unary(args, name, span, f64::ceil),
        "floor" => unary(args, name, span, f64::floor),
        "round" => unary(args, name, span, |v| v.round()),
        "abs" => unary(args, name, span, f64::abs),
        "sqrt" => unary(args, name, span, f64::sqrt),
        "sin" => unary(args, name, span, f64::sin),
        "cos" => unary(args, name, span, f64::cos),
        "tan" => unary(args, name, span, f64::tan),
        "asin" => unary(args, name, span, f64::asin),
        "acos" => unary(args, name, span, f64::acos),
        "atan" => unary(args, name, span, f64::atan),
        "pi" => Ok(Value::Number(Number::unitless(std::f64::consts::PI))),
        "pow" => binary(args, name, span, f64::powf),
        "mod" => binary(args, name, span, |a, b| a % b),
        "min" => variadic(args, name, span, f64::min),
        "max" => variadic(args, name, span, f64::max),
        "percentage" => percentage(args, span),
        _ => return None,
    })
}

fn unary(args: &[Value], name: &str, span: Span, f: impl Fn(f64) -> f64) -> LessResult<Value> {
    match args {
        [a] => {
            let n = expect_number(a, name, span)?;
            Ok(Value::Number(Number::new(f(n.value), n.unit)))
        }
        _ => Err(crate::error::LessError::eval(format!("{}() expects 1 argument", name), span)),
    }
}

fn binary(args: &[Value], name: &str, span: Span, f: impl Fn(f64, f64) -> f64) -> LessResult<Value> {
    match args {
        [a, b] => {
            let a = expect_number(a, name, span)?;
            let b = expect_number(b, name, span)?;
            let unit = if a.is_unitless() { b.unit.clone() } else { a.unit.clone() };
            Ok(Value::Number(Number::new(f(a.value, b.value), unit)))
        }
        _ => Err(crate::error::LessError::eval(format!("{}() expects 2 arguments", name), span)),
    }
}

fn variadic(args: &[Value], name: &str, span: Span, f: impl Fn(f64, f64) -> f64) -> LessResult<Value> {
    if args.is_empty() {
        return Err(crate::error::LessError::eval(format!("{}() expects at least 1 argument", name), span));
    }
    let mut numbers = Vec::with_capacity(args.len());
    for a in args {
        numbers.push(expect_number(a, name, span)?);
    }
    let unit = numbers.iter().find(|n| !n.is_unitless()).map_or(Unit::None, |n| n.unit.clone());
    let result = numbers.iter().map(|n| n.value).fold(numbers[0].value, f);
    Ok(Value::Number(Number::new(result, unit)))
}

fn percentage(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [a] => {
            let n = expect_number(a, "percentage", span)?;
            Ok(Value::Number(Number::new(n.value * 100.0, Unit::Percent)))
        }
        _ => Err(crate::error::LessError::eval("percentage() expects 1 argument", span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap::CodeMap;

    fn span() -> Span {
        let mut cm = CodeMap::new();
        cm.add_file("t".to_string(), "x".to_string()).span
    }

    #[test]
    fn round_rounds_half_up() {
        let out = call("round", &[Value::Number(Number::new(2.5, Unit::Px))], span()).unwrap().unwrap();
        assert_eq!(out, Value::Number(Number::new(3.0, Unit::Px)));
    }

    #[test]
    fn percentage_scales_by_100() {
        let out = call("percentage", &[Value::Number(Number::unitless(0.5))], span()).unwrap().unwrap();
        assert_eq!(out, Value::Number(Number::new(50.0, Unit::Percent)));
    }

    #[test]
    fn min_picks_smallest() {
        let out = call(
            "min",
            &[Value::Number(Number::new(3.0, Unit::Px)), Value::Number(Number::new(1.0, Unit::Px))],
            span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(out, Value::Number(Number::new(1.0, Unit::Px)));
    }
}
