//! Dimensioned-number units and the length/time/angle conversion tables
//! spec.md §4.4 "Arithmetic" requires.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    None,
    Percent,
    // length
    Px,
    Pt,
    Cm,
    Mm,
    In,
    Pc,
    // time
    S,
    Ms,
    // angle
    Deg,
    Rad,
    Grad,
    Turn,
    /// Anything outside the conversion table (`em`, `rem`, `vh`, `vw`, …).
    /// Arithmetic between two `Other` units is only defined when the unit
    /// text matches exactly.
    Other(String),
}

impl Unit {
    pub fn parse(s: &str) -> Unit {
        match s.to_ascii_lowercase().as_str() {
            "" => Unit::None,
            "%" => Unit::Percent,
            "px" => Unit::Px,
            "pt" => Unit::Pt,
            "cm" => Unit::Cm,
            "mm" => Unit::Mm,
            "in" => Unit::In,
            "pc" => Unit::Pc,
            "s" => Unit::S,
            "ms" => Unit::Ms,
            "deg" => Unit::Deg,
            "rad" => Unit::Rad,
            "grad" => Unit::Grad,
            "turn" => Unit::Turn,
            _ => Unit::Other(s.to_string()),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Unit::None)
    }

    fn family(&self) -> Option<Family> {
        match self {
            Unit::Px | Unit::Pt | Unit::Cm | Unit::Mm | Unit::In | Unit::Pc => Some(Family::Length),
            Unit::S | Unit::Ms => Some(Family::Time),
            Unit::Deg | Unit::Rad | Unit::Grad | Unit::Turn => Some(Family::Angle),
            _ => None,
        }
    }

    /// Factor to convert a quantity in `self` units into the family's
    /// canonical base unit (px for length, ms for time, deg for angle).
    fn to_base_factor(&self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Pt => 96.0 / 72.0,
            Unit::Pc => 16.0,
            Unit::In => 96.0,
            Unit::Cm => 96.0 / 2.54,
            Unit::Mm => 96.0 / 25.4,
            Unit::S => 1000.0,
            Unit::Ms => 1.0,
            Unit::Deg => 1.0,
            Unit::Rad => 180.0 / std::f64::consts::PI,
            Unit::Grad => 0.9,
            Unit::Turn => 360.0,
            _ => 1.0,
        }
    }

    /// Converts `value` from `self` units into `target` units. Returns
    /// `None` if the two units aren't in the same conversion family.
    pub fn convert(&self, value: f64, target: &Unit) -> Option<f64> {
        if self == target {
            return Some(value);
        }
        let (sf, tf) = (self.family(), target.family());
        match (sf, tf) {
            (Some(a), Some(b)) if a == b => {
                let base = value * self.to_base_factor();
                Some(base / target.to_base_factor())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Length,
    Time,
    Angle,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            Unit::None => "",
            Unit::Percent => "%",
            Unit::Px => "px",
            Unit::Pt => "pt",
            Unit::Cm => "cm",
            Unit::Mm => "mm",
            Unit::In => "in",
            Unit::Pc => "pc",
            Unit::S => "s",
            Unit::Ms => "ms",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Grad => "grad",
            Unit::Turn => "turn",
            Unit::Other(s) => s,
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_family_round_trips() {
        let px = Unit::Px;
        let inch = Unit::In;
        let converted = px.convert(96.0, &inch).unwrap();
        assert!((converted - 1.0).abs() < 1e-9);
    }

    #[test]
    fn different_family_is_none() {
        assert_eq!(Unit::Px.convert(1.0, &Unit::S), None);
    }

    #[test]
    fn unknown_units_only_match_themselves() {
        let em = Unit::parse("em");
        assert_eq!(em.convert(2.0, &Unit::parse("em")), Some(2.0));
        assert_eq!(em.convert(2.0, &Unit::parse("rem")), None);
    }
}
