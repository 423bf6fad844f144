//! Type-predicate and unit-utility built-ins (spec.md §4.4 "Built-in
//! functions": `isnumber`, `isstring`, `iscolor`, …, `unit`, `get-unit`,
//! `convert`).

use codemap::Span;

use crate::error::LessResult;
use crate::unit::Unit;
use crate::value::{Number, Value};

pub fn call(name: &str, args: &[Value], span: Span) -> Option<LessResult<Value>> {
    Some(match name {
        "isnumber" => predicate(args, span, |v| matches!(v, Value::Number(_))),
        "isstring" => predicate(args, span, |v| matches!(v, Value::Str(..))),
        "iscolor" => predicate(args, span, |v| matches!(v, Value::Color(_))),
        "iskeyword" => predicate(args, span, |v| matches!(v, Value::Keyword(_))),
        "isurl" => predicate(args, span, |v| matches!(v, Value::Url(_))),
        "ispixel" => predicate(args, span, |v| matches!(v, Value::Number(n) if n.unit == Unit::Px)),
        "ispercentage" => predicate(args, span, |v| matches!(v, Value::Number(n) if n.unit == Unit::Percent)),
        "isem" => predicate(args, span, |v| matches!(v, Value::Number(n) if n.unit == Unit::Other("em".to_string()))),
        "isunit" => is_unit(args, span),
        "boolean" => boolean(args, span),
        "unit" => unit_fn(args, span),
        "get-unit" => get_unit(args, span),
        "convert" => convert(args, span),
        _ => return None,
    })
}

fn bool_value(b: bool) -> Value {
    Value::Keyword(if b { "true" } else { "false" }.to_string())
}

fn predicate(args: &[Value], span: Span, f: impl Fn(&Value) -> bool) -> LessResult<Value> {
    match args {
        [v] => Ok(bool_value(f(v))),
        _ => Err(crate::error::LessError::eval("type predicate expects 1 argument", span)),
    }
}

fn is_unit(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Number(n), unit] => {
            let unit_text = match unit {
                Value::Keyword(k) => k.clone(),
                Value::Str(s, _) => s.clone(),
                other => other.render(),
            };
            Ok(bool_value(n.unit == Unit::parse(&unit_text)))
        }
        [_, _] => Ok(bool_value(false)),
        _ => Err(crate::error::LessError::eval("isunit() expects 2 arguments", span)),
    }
}

fn boolean(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [v] => Ok(bool_value(v.is_truthy())),
        _ => Err(crate::error::LessError::eval("boolean() expects 1 argument", span)),
    }
}

/// `unit(@n, px)` re-labels a number's unit without converting its value.
fn unit_fn(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Number(n)] => Ok(Value::Number(Number::new(n.value, Unit::None))),
        [Value::Number(n), unit] => {
            let unit_text = match unit {
                Value::Keyword(k) => k.clone(),
                Value::Str(s, _) => s.clone(),
                other => other.render(),
            };
            Ok(Value::Number(Number::new(n.value, Unit::parse(&unit_text))))
        }
        _ => Err(crate::error::LessError::eval("unit() expects a number and an optional unit", span)),
    }
}

fn get_unit(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Number(n)] => Ok(Value::Keyword(n.unit.to_string())),
        _ => Err(crate::error::LessError::eval("get-unit() expects 1 number argument", span)),
    }
}

fn convert(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Number(n), unit] => {
            let unit_text = match unit {
                Value::Keyword(k) => k.clone(),
                Value::Str(s, _) => s.clone(),
                other => other.render(),
            };
            let target = Unit::parse(&unit_text);
            match n.unit.convert(n.value, &target) {
                Some(v) => Ok(Value::Number(Number::new(v, target))),
                None => Err(crate::error::LessError::eval(
                    format!("convert() can't convert {} to {}", n.unit, target),
                    span,
                )),
            }
        }
        _ => Err(crate::error::LessError::eval("convert() expects a number and a target unit", span)),
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
    fn iscolor_distinguishes_colors_from_numbers() {
        let out = call("iscolor", &[Value::Number(Number::unitless(1.0))], span()).unwrap().unwrap();
        assert_eq!(out, Value::Keyword("false".to_string()));
    }

    #[test]
    fn unit_relabels_without_converting() {
        let out = call("unit", &[Value::Number(Number::unitless(5.0)), Value::Keyword("px".to_string())], span())
            .unwrap()
            .unwrap();
        assert_eq!(out, Value::Number(Number::new(5.0, Unit::Px)));
    }
}
