//! Dimensioned-number representation and unit-aware arithmetic
//! (spec.md §4.4 "Arithmetic").

use std::fmt;

use crate::unit::Unit;

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub value: f64,
    pub unit: Unit,
}

impl Number {
    pub fn new(value: f64, unit: Unit) -> Number {
        Number { value, unit }
    }

    pub fn unitless(value: f64) -> Number {
        Number { value, unit: Unit::None }
    }

    pub fn is_unitless(&self) -> bool {
        self.unit.is_none()
    }

    /// Multiplication and division: LESS convention keeps the left
    /// operand's unit regardless of whether the right side shares it.
    pub fn mul(&self, other: &Number) -> Number {
        Number::new(self.value * other.value, self.pick_unit(other))
    }

    pub fn div(&self, other: &Number) -> Number {
        Number::new(self.value / other.value, self.pick_unit(other))
    }

    fn pick_unit(&self, other: &Number) -> Unit {
        if self.is_unitless() {
            other.unit.clone()
        } else {
            self.unit.clone()
        }
    }

    /// Addition/subtraction: same unit or one-unitless compute directly;
    /// differing convertible units convert the right operand into the
    /// left's unit; differing non-convertible units return `None` so the
    /// caller can fall back to a textual expression (spec.md §4.4).
    pub fn add(&self, other: &Number) -> Option<Number> {
        self.combine(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Number) -> Option<Number> {
        self.combine(other, |a, b| a - b)
    }

    fn combine(&self, other: &Number, f: impl Fn(f64, f64) -> f64) -> Option<Number> {
        if self.unit == other.unit {
            return Some(Number::new(f(self.value, other.value), self.unit.clone()));
        }
        if self.is_unitless() {
            return Some(Number::new(f(self.value, other.value), other.unit.clone()));
        }
        if other.is_unitless() {
            return Some(Number::new(f(self.value, other.value), self.unit.clone()));
        }
        let converted = other.unit.convert(other.value, &self.unit)?;
        Some(Number::new(f(self.value, converted), self.unit.clone()))
    }

    /// Numeric ordering/equality for guard comparisons (spec.md §4.4
    /// "Guard evaluation"): mismatched non-empty, non-convertible units are
    /// unequal and non-ordered.
    pub fn compare(&self, other: &Number) -> Option<std::cmp::Ordering> {
        let (a, b) = if self.unit == other.unit {
            (self.value, other.value)
        } else if self.is_unitless() || other.is_unitless() {
            (self.value, other.value)
        } else {
            let converted = other.unit.convert(other.value, &self.unit)?;
            (self.value, converted)
        };
        a.partial_cmp(&b)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_number(self.value), self.unit)
    }
}

/// Trims trailing zeros the way LESS output does: `1.50px` -> `1.5px`,
/// `2.0` -> `2`.
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.5}", value);
        let trimmed = s.trim_end_matches('0');
        let trimmed = trimmed.trim_end_matches('.');
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_unit_adds() {
        let a = Number::new(10.0, Unit::Px);
        let b = Number::new(2.0, Unit::Px);
        assert_eq!(a.add(&b), Some(Number::new(12.0, Unit::Px)));
    }

    #[test]
    fn unitless_plus_dimensioned_carries_unit() {
        let a = Number::unitless(10.0);
        let b = Number::new(2.0, Unit::Px);
        assert_eq!(a.add(&b), Some(Number::new(12.0, Unit::Px)));
    }

    #[test]
    fn mul_keeps_left_unit_regardless() {
        let a = Number::new(10.0, Unit::Px);
        let b = Number::new(2.0, Unit::Pt);
        assert_eq!(a.mul(&b), Number::new(20.0, Unit::Px));
    }

    #[test]
    fn incompatible_units_dont_add() {
        let a = Number::new(10.0, Unit::Px);
        let b = Number::new(2.0, Unit::parse("em"));
        assert_eq!(a.add(&b), None);
    }

    #[test]
    fn division_by_twelve() {
        let a = Number::new(1200.0, Unit::Px);
        let b = Number::unitless(12.0);
        assert_eq!(a.div(&b), Number::new(100.0, Unit::Px));
    }
}
