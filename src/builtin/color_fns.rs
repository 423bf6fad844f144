//! Color construction, channel accessors, manipulation, and blend-mode
//! built-ins (spec.md §4.4 "Built-in functions"). Percentage amounts are
//! specified in `[0,100]`; this module divides by 100 before applying,
//! per spec.md §4.4.

use codemap::Span;

use super::{expect_color, expect_number};
use crate::color::{BlendMode, Color};
use crate::error::LessResult;
use crate::unit::Unit;
use crate::value::{Number, Value};

pub fn call(name: &str, args: &[Value], span: Span) -> Option<LessResult<Value>> {
    Some(match name {
        "rgb" => rgb(args, span),
        "rgba" => rgba(args, span),
        "hsl" => hsl(args, span),
        "hsla" => hsla(args, span),
        "argb" => argb(args, span),
        "color" => color_from_string(args, span),
        "hue" => channel(args, name, span, |c| c.to_hsla().0),
        "saturation" => channel(args, name, span, |c| c.to_hsla().1 * 100.0),
        "lightness" => channel(args, name, span, |c| c.to_hsla().2 * 100.0),
        "red" => channel(args, name, span, |c| c.r as f64),
        "green" => channel(args, name, span, |c| c.g as f64),
        "blue" => channel(args, name, span, |c| c.b as f64),
        "alpha" => channel(args, name, span, |c| c.a as f64),
        "luma" | "luminance" => channel(args, name, span, |c| c.luma() * 100.0),
        "saturate" => adjust_hsl(args, name, span),
        "desaturate" => adjust_hsl(args, name, span),
        "lighten" => adjust_hsl(args, name, span),
        "darken" => adjust_hsl(args, name, span),
        "spin" => spin(args, span),
        "mix" => mix(args, span),
        "tint" => mix_with(args, span, Color::opaque(255, 255, 255)),
        "shade" => mix_with(args, span, Color::opaque(0, 0, 0)),
        "greyscale" => greyscale(args, span),
        "fade" => fade(args, span),
        "fadein" => fade_by(args, span, 1.0),
        "fadeout" => fade_by(args, span, -1.0),
        "contrast" => contrast(args, span),
        "multiply" => blend(args, span, BlendMode::Multiply),
        "screen" => blend(args, span, BlendMode::Screen),
        "overlay" => blend(args, span, BlendMode::Overlay),
        "softlight" => blend(args, span, BlendMode::Softlight),
        "hardlight" => blend(args, span, BlendMode::Hardlight),
        "difference" => blend(args, span, BlendMode::Difference),
        "exclusion" => blend(args, span, BlendMode::Exclusion),
        "average" => blend(args, span, BlendMode::Average),
        "negation" => blend(args, span, BlendMode::Negation),
        _ => return None,
    })
}

fn channel_value(v: &Value, name: &str, span: Span) -> LessResult<f64> {
    match v {
        Value::Number(n) => Ok(n.value),
        other => Err(crate::error::LessError::eval(
            format!("{}() expects a number, got '{}'", name, other.render()),
            span,
        )),
    }
}

fn rgb(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [r, g, b] => {
            let clamp = |n: f64| n.round().clamp(0.0, 255.0) as u8;
            Ok(Value::Color(Color::opaque(
                clamp(channel_value(r, "rgb", span)?),
                clamp(channel_value(g, "rgb", span)?),
                clamp(channel_value(b, "rgb", span)?),
            )))
        }
        _ => Err(crate::error::LessError::eval("rgb() expects 3 arguments", span)),
    }
}

fn rgba(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Color(c), a] => {
            let alpha = channel_value(a, "rgba", span)?;
            Ok(Value::Color(Color::new(c.r, c.g, c.b, alpha as f32)))
        }
        [r, g, b, a] => {
            let clamp = |n: f64| n.round().clamp(0.0, 255.0) as u8;
            Ok(Value::Color(Color::new(
                clamp(channel_value(r, "rgba", span)?),
                clamp(channel_value(g, "rgba", span)?),
                clamp(channel_value(b, "rgba", span)?),
                channel_value(a, "rgba", span)? as f32,
            )))
        }
        _ => Err(crate::error::LessError::eval("rgba() expects 3 or 4 arguments", span)),
    }
}

fn hsl(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [h, s, l] => {
            let h = channel_value(h, "hsl", span)?;
            let s = channel_value(s, "hsl", span)? / 100.0;
            let l = channel_value(l, "hsl", span)? / 100.0;
            Ok(Value::Color(Color::from_hsla(h, s, l, 1.0)))
        }
        _ => Err(crate::error::LessError::eval("hsl() expects 3 arguments", span)),
    }
}

fn hsla(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [h, s, l, a] => {
            let h = channel_value(h, "hsla", span)?;
            let s = channel_value(s, "hsla", span)? / 100.0;
            let l = channel_value(l, "hsla", span)? / 100.0;
            let a = channel_value(a, "hsla", span)?;
            Ok(Value::Color(Color::from_hsla(h, s, l, a as f32)))
        }
        _ => Err(crate::error::LessError::eval("hsla() expects 4 arguments", span)),
    }
}

fn argb(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Color(c)] => Ok(Value::Str(
            format!("#{:02x}{:02x}{:02x}{:02x}", (c.a * 255.0).round() as u8, c.r, c.g, c.b),
            crate::common::QuoteKind::None,
        )),
        _ => Err(crate::error::LessError::eval("argb() expects 1 color argument", span)),
    }
}

fn color_from_string(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [Value::Str(s, _)] | [Value::Keyword(s)] => {
            let hex = s.trim_start_matches('#');
            Color::from_hex(hex)
                .or_else(|| Color::named(s))
                .map(Value::Color)
                .ok_or_else(|| crate::error::LessError::eval(format!("color() can't parse '{}'", s), span))
        }
        _ => Err(crate::error::LessError::eval("color() expects a single string argument", span)),
    }
}

fn channel(args: &[Value], name: &str, span: Span, f: impl Fn(&Color) -> f64) -> LessResult<Value> {
    match args {
        [v] => {
            let c = expect_color(v, name, span)?;
            Ok(Value::Number(Number::unitless(f(&c))))
        }
        _ => Err(crate::error::LessError::eval(format!("{}() expects 1 argument", name), span)),
    }
}

fn adjust_hsl(args: &[Value], name: &str, span: Span) -> LessResult<Value> {
    match args {
        [c, amount] => {
            let c = expect_color(c, name, span)?;
            let amount = expect_number(amount, name, span)?.value / 100.0;
            let (h, s, l) = c.to_hsla();
            let (s, l) = match name {
                "saturate" => ((s + amount).clamp(0.0, 1.0), l),
                "desaturate" => ((s - amount).clamp(0.0, 1.0), l),
                "lighten" => (s, (l + amount).clamp(0.0, 1.0)),
                "darken" => (s, (l - amount).clamp(0.0, 1.0)),
                _ => (s, l),
            };
            Ok(Value::Color(Color::from_hsla(h, s, l, c.a)))
        }
        _ => Err(crate::error::LessError::eval(format!("{}() expects 2 arguments", name), span)),
    }
}

fn spin(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [c, amount] => {
            let c = expect_color(c, "spin", span)?;
            let amount = expect_number(amount, "spin", span)?.value;
            let (h, s, l) = c.to_hsla();
            Ok(Value::Color(Color::from_hsla(h + amount, s, l, c.a)))
        }
        _ => Err(crate::error::LessError::eval("spin() expects 2 arguments", span)),
    }
}

fn mix(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [a, b] => {
            let a = expect_color(a, "mix", span)?;
            let b = expect_color(b, "mix", span)?;
            Ok(Value::Color(a.mix(&b, 0.5)))
        }
        [a, b, weight] => {
            let a = expect_color(a, "mix", span)?;
            let b = expect_color(b, "mix", span)?;
            let weight = expect_number(weight, "mix", span)?.value / 100.0;
            Ok(Value::Color(a.mix(&b, weight)))
        }
        _ => Err(crate::error::LessError::eval("mix() expects 2 or 3 arguments", span)),
    }
}

fn mix_with(args: &[Value], span: Span, reference: Color) -> LessResult<Value> {
    match args {
        [c] => {
            let c = expect_color(c, "tint/shade", span)?;
            Ok(Value::Color(reference.mix(&c, 0.5)))
        }
        [c, weight] => {
            let c = expect_color(c, "tint/shade", span)?;
            let weight = expect_number(weight, "tint/shade", span)?.value / 100.0;
            Ok(Value::Color(reference.mix(&c, weight)))
        }
        _ => Err(crate::error::LessError::eval("tint()/shade() expects 1 or 2 arguments", span)),
    }
}

fn greyscale(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [c] => {
            let c = expect_color(c, "greyscale", span)?;
            let (h, _, l) = c.to_hsla();
            Ok(Value::Color(Color::from_hsla(h, 0.0, l, c.a)))
        }
        _ => Err(crate::error::LessError::eval("greyscale() expects 1 argument", span)),
    }
}

fn fade(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [c, amount] => {
            let c = expect_color(c, "fade", span)?;
            let amount = expect_number(amount, "fade", span)?.value / 100.0;
            Ok(Value::Color(Color::new(c.r, c.g, c.b, amount.clamp(0.0, 1.0) as f32)))
        }
        _ => Err(crate::error::LessError::eval("fade() expects 2 arguments", span)),
    }
}

fn fade_by(args: &[Value], span: Span, sign: f64) -> LessResult<Value> {
    match args {
        [c, amount] => {
            let c = expect_color(c, "fadein/fadeout", span)?;
            let amount = expect_number(amount, "fadein/fadeout", span)?.value / 100.0;
            let a = (c.a as f64 + sign * amount).clamp(0.0, 1.0);
            Ok(Value::Color(Color::new(c.r, c.g, c.b, a as f32)))
        }
        _ => Err(crate::error::LessError::eval("fadein()/fadeout() expects 2 arguments", span)),
    }
}

fn contrast(args: &[Value], span: Span) -> LessResult<Value> {
    match args {
        [c] => contrast_inner(c, None, None, span),
        [c, dark] => contrast_inner(c, Some(dark), None, span),
        [c, dark, light] => contrast_inner(c, Some(dark), Some(light), span),
        _ => Err(crate::error::LessError::eval("contrast() expects 1 to 3 arguments", span)),
    }
}

fn contrast_inner(c: &Value, dark: Option<&Value>, light: Option<&Value>, span: Span) -> LessResult<Value> {
    let c = expect_color(c, "contrast", span)?;
    let dark = match dark {
        Some(v) => expect_color(v, "contrast", span)?,
        None => Color::opaque(0, 0, 0),
    };
    let light = match light {
        Some(v) => expect_color(v, "contrast", span)?,
        None => Color::opaque(255, 255, 255),
    };
    Ok(Value::Color(if c.luma() > 0.43 { dark } else { light }))
}

fn blend(args: &[Value], span: Span, mode: BlendMode) -> LessResult<Value> {
    match args {
        [backdrop, source] => {
            let backdrop = expect_color(backdrop, "blend", span)?;
            let source = expect_color(source, "blend", span)?;
            Ok(Value::Color(backdrop.blend(&source, mode)))
        }
        _ => Err(crate::error::LessError::eval("blend function expects 2 color arguments", span)),
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
    fn rgb_builds_opaque_color() {
        let out = call(
            "rgb",
            &[
                Value::Number(Number::unitless(51.0)),
                Value::Number(Number::unitless(102.0)),
                Value::Number(Number::unitless(153.0)),
            ],
            span(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(out, Value::Color(Color::opaque(51, 102, 153)));
    }

    #[test]
    fn lighten_moves_lightness_up() {
        let base = Color::from_hex("333333").unwrap();
        let out = call("lighten", &[Value::Color(base), Value::Number(Number::new(20.0, Unit::Percent))], span())
            .unwrap()
            .unwrap();
        match out {
            Value::Color(c) => assert!(c.to_hsla().2 > base.to_hsla().2),
            _ => panic!("expected a color"),
        }
    }

    #[test]
    fn mix_of_black_and_white_is_grey() {
        let out = call("mix", &[Value::Color(Color::opaque(0, 0, 0)), Value::Color(Color::opaque(255, 255, 255))], span())
            .unwrap()
            .unwrap();
        assert_eq!(out, Value::Color(Color::opaque(128, 128, 128)));
    }
}
