//! Sample values and provenance tags.

use serde::{Deserialize, Serialize};

/// A single measured quantity, or an explicit gap.
///
/// Serializes as a number or `null`. Non-finite numbers never become
/// `Present`; they are folded into `Missing` on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Value {
    Present(f64),
    #[default]
    Missing,
}

impl Value {
    /// Wrap a number, mapping NaN and infinities to `Missing`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Present(value)
        } else {
            Self::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_present(&self) -> bool {
        !self.is_missing()
    }

    /// The numeric value, if present.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Present(v) => Some(*v),
            Self::Missing => None,
        }
    }

    /// Apply `f` to a present value; missing stays missing.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Present(v) => Self::new(f(v)),
            Self::Missing => Self::Missing,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Option<f64>> for Value {
    fn from(value: Option<f64>) -> Self {
        value.map(Self::new).unwrap_or(Self::Missing)
    }
}

impl From<Value> for Option<f64> {
    fn from(value: Value) -> Self {
        value.as_f64()
    }
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Taken directly from an original sample.
    Measured,
    /// Derived from original samples by interpolation or re-binning.
    Interpolated,
    /// Inside the sampled extent but not usable.
    Missing,
    /// Outside the sampled extent of the core, or the core lacks the
    /// variable entirely.
    OutOfRange,
}

impl Provenance {
    /// Whether a value with this tag carries a number.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Measured | Self::Interpolated)
    }

    /// Tag for a value computed from two tagged inputs.
    pub fn combine(self, other: Self) -> Self {
        use Provenance::*;
        match (self, other) {
            (OutOfRange, _) | (_, OutOfRange) => OutOfRange,
            (Missing, _) | (_, Missing) => Missing,
            (Interpolated, _) | (_, Interpolated) => Interpolated,
            (Measured, Measured) => Measured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_is_missing() {
        assert_eq!(Value::new(f64::NAN), Value::Missing);
        assert_eq!(Value::from(f64::INFINITY), Value::Missing);
        assert_eq!(Value::from(-3.5), Value::Present(-3.5));
        assert_eq!(Value::from(None), Value::Missing);
    }

    #[test]
    fn test_map_keeps_missing() {
        assert_eq!(Value::Missing.map(|v| v * 2.0), Value::Missing);
        assert_eq!(Value::Present(2.0).map(|v| v * 2.0), Value::Present(4.0));
        assert_eq!(Value::Present(0.0).map(|v| 1.0 / v), Value::Missing);
    }

    #[test]
    fn test_provenance_combine() {
        use Provenance::*;
        assert_eq!(Measured.combine(Measured), Measured);
        assert_eq!(Measured.combine(Interpolated), Interpolated);
        assert_eq!(Interpolated.combine(Missing), Missing);
        assert_eq!(Missing.combine(OutOfRange), OutOfRange);
    }

    #[test]
    fn test_value_serializes_as_nullable_number() {
        let json = serde_json::to_string(&vec![Value::Present(1.5), Value::Missing]).unwrap();
        assert_eq!(json, "[1.5,null]");
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Value::Present(1.5), Value::Missing]);
    }
}
