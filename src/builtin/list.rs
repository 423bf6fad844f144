//! List built-ins (spec.md §4.4 "Built-in functions": `length`,
//! `extract`, `range`).

use codemap::Span;

use crate::common::ListSeparator;
use crate::error::LessResult;
use crate::value::{Number, Value};

pub fn call(name: &str, args: &[Value], span: Span) -> Option<LessResult<Value>> {
    Some(match name {
        "length" => length(args, span),
        "extract" => extract(args, span),
        "range" => range(args, span),
        _ => return None,
    })
}

fn as_items(v: &Value) -> Vec<Value> {
    match v {
        Value::List(items, _) => items.clone(),
        other => vec![other.clone()],
    }
}

fn length(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [v] => Ok(Value::Number(Number::unitless(as_items(v).len() as f64))),
        _ => Err(crate::error::LessError::eval("length() expects 1 argument", span)),
    }
}

fn extract(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [list, index] => {
            let items = as_items(list);
            let i = match index {
                Value::Number(n) => n.value as usize,
                _ => return Err(crate::error::LessError::eval("extract() index must be a number", span)),
            };
            // LESS lists are 1-indexed.
            items
                .get(i.wrapping_sub(1))
                .cloned()
                .ok_or_else(|| crate::error::LessError::eval("extract() index out of range", span))
        }
        _ => Err(crate::error::LessError::eval("extract() expects 2 arguments", span)),
    }
}

fn range(args: &[Value], span: Span) -> LessResult<Value> {
    let (start, end, step) = match args {
        [end] => (1.0, number_value(end, span)?, 1.0),
        [start, end] => (number_value(start, span)?, number_value(end, span)?, 1.0),
        [start, end, step] => (number_value(start, span)?, number_value(end, span)?, number_value(step, span)?),
        _ => return Err(crate::error::LessError::eval("range() expects 1 to 3 arguments", span)),
    };
    if step == 0.0 {
        return Err(crate::error::LessError::eval("range() step must be non-zero", span));
    }
    let mut items = Vec::new();
    let mut v = start;
    while (step > 0.0 && v <= end) || (step < 0.0 && v >= end) {
        items.push(Value::Number(Number::unitless(v)));
        v += step;
    }
    Ok(Value::List(items, ListSeparator::Comma))
}

fn number_value(v: &Value, span: Span) -> LessResult<f64> {
    match v {
        Value::Number(n) => Ok(n.value),
        other => Err(crate::error::LessError::eval(format!("range() expects numbers, got '{}'", other.render()), span)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::QuoteKind;
    use codemap::CodeMap;

    fn span() -> Span {
        let mut cm = CodeMap::new();
        cm.add_file("t".to_string(), "x".to_string()).span
    }

    #[test]
    fn length_counts_comma_list() {
        let list = Value::List(
            vec![Value::Keyword("a".to_string()), Value::Keyword("b".to_string())],
            ListSeparator::Comma,
        );
        let out = call("length", &[list], span()).unwrap().unwrap();
        assert_eq!(out, Value::Number(Number::unitless(2.0)));
    }

    #[test]
    fn extract_is_one_indexed() {
        let list = Value::List(
            vec![Value::Str("a".to_string(), QuoteKind::Double), Value::Str("b".to_string(), QuoteKind::Double)],
            ListSeparator::Comma,
        );
        let out = call("extract", &[list, Value::Number(Number::unitless(1.0))], span()).unwrap().unwrap();
        assert_eq!(out.render(), "\"a\"");
    }
}
