//! String built-ins (spec.md §4.4 "Built-in functions": `escape`, `e`,
//! `replace`, `format`).

use codemap::Span;

use crate::common::QuoteKind;
use crate::error::LessResult;
use crate::value::Value;

pub fn call(name: &str, args: &[Value], span: Span) -> Option<LessResult<Value>> {
    Some(match name {
        "escape" => escape(args, span),
        "e" => unquote(args, span),
        "replace" => replace(args, span),
        "format" => format_fn(args, span),
        _ => return None,
    })
}

fn as_text(v: &Value) -> String {
    match v {
        Value::Str(s, _) => s.clone(),
        other => other.render(),
    }
}

/// URL-escapes reserved characters, per the reference `escape()`.
fn escape(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [v] => {
            let s = as_text(v);
            let mut out = String::with_capacity(s.len());
            for c in s.chars() {
                match c {
                    '=' => out.push_str("%3D"),
                    ':' => out.push_str("%3A"),
                    '#' => out.push_str("%23"),
                    ';' => out.push_str("%3B"),
                    ',' => out.push_str("%2C"),
                    '/' => out.push_str("%2F"),
                    '?' => out.push_str("%3F"),
                    _ => out.push(c),
                }
            }
            Ok(Value::Str(out, QuoteKind::None))
        }
        _ => Err(crate::error::LessError::eval("escape() expects 1 argument", span)),
    }
}

/// `e()` strips quotes, turning a quoted string into bare CSS text.
fn unquote(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [v] => Ok(Value::Str(as_text(v), QuoteKind::None)),
        _ => Err(crate::error::LessError::eval("e() expects 1 argument", span)),
    }
}

fn replace(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [subject, pattern, replacement] => {
            let subject = as_text(subject);
            let pattern = as_text(pattern);
            let replacement = as_text(replacement);
            Ok(Value::Str(subject.replacen(&pattern, &replacement, 1), QuoteKind::None))
        }
        [subject, pattern, replacement, flags] => {
            let subject = as_text(subject);
            let pattern = as_text(pattern);
            let replacement = as_text(replacement);
            let flags = as_text(flags);
            let result = if flags.contains('g') {
                subject.replace(&pattern, &replacement)
            } else {
                subject.replacen(&pattern, &replacement, 1)
            };
            Ok(Value::Str(result, QuoteKind::None))
        }
        _ => Err(crate::error::LessError::eval("replace() expects 3 or 4 arguments", span)),
    }
}

/// `format("%a %d", x, y)`: `%s`/`%d`/`%a` all substitute positionally as
/// plain text.
fn format_fn(args: &[Value], span: Span) -> LessResult<Value> {
    match args.split_first() {
        Some((template, rest)) => {
            let template = as_text(template);
            let mut out = String::with_capacity(template.len());
            let mut rest_iter = rest.iter();
            let mut chars = template.chars().peekable();
            while let Some(c) = chars.next() {
                if c == '%' {
                    if let Some(&spec) = chars.peek() {
                        if matches!(spec, 's' | 'd' | 'a' | 'S' | 'D' | 'A') {
                            chars.next();
                            if let Some(v) = rest_iter.next() {
                                out.push_str(&as_text(v));
                            }
                            continue;
                        }
                    }
                }
                out.push(c);
            }
            Ok(Value::Str(out, QuoteKind::None))
        }
        None => Err(crate::error::LessError::eval("format() expects at least 1 argument", span)),
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
    fn escape_encodes_reserved_chars() {
        let out = call("escape", &[Value::Str("a=b".to_string(), QuoteKind::Double)], span()).unwrap().unwrap();
        assert_eq!(out.render(), "a%3Db");
    }

    #[test]
    fn format_substitutes_in_order() {
        let out = call(
            "format",
            &[
                Value::Str("%s-%d".to_string(), QuoteKind::Double),
                Value::Str("a".to_string(), QuoteKind::Double),
                Value::Str("b".to_string(), QuoteKind::Double),
            ],
            span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(out.render(), "a-b");
    }
}
