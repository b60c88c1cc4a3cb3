//! Aligned profile: a profile resampled onto a target coordinate.

use serde::Serialize;

use crate::profile::{Provenance, Value};

/// A resampled value and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedValue {
    pub value: Value,
    pub provenance: Provenance,
}

impl AlignedValue {
    pub fn new(value: f64, provenance: Provenance) -> Self {
        match Value::new(value) {
            Value::Present(v) if provenance.is_usable() => Self {
                value: Value::Present(v),
                provenance,
            },
            _ if provenance == Provenance::OutOfRange => Self::out_of_range(),
            _ => Self::missing(),
        }
    }

    pub fn measured(value: f64) -> Self {
        Self::new(value, Provenance::Measured)
    }

    pub fn interpolated(value: f64) -> Self {
        Self::new(value, Provenance::Interpolated)
    }

    pub fn missing() -> Self {
        Self {
            value: Value::Missing,
            provenance: Provenance::Missing,
        }
    }

    pub fn out_of_range() -> Self {
        Self {
            value: Value::Missing,
            provenance: Provenance::OutOfRange,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.value.is_present()
    }
}

/// One core's variable on the shared target coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedProfile {
    core_id: String,
    variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    /// Sampled depth extent of the source profile, if it had any data.
    extent: Option<(f64, f64)>,
    values: Vec<AlignedValue>,
}

impl AlignedProfile {
    pub(crate) fn new(
        core_id: impl Into<String>,
        variable: impl Into<String>,
        unit: Option<String>,
        extent: Option<(f64, f64)>,
        values: Vec<AlignedValue>,
    ) -> Self {
        Self {
            core_id: core_id.into(),
            variable: variable.into(),
            unit,
            extent,
            values,
        }
    }

    /// Row for a core that lacks the variable: out of range everywhere.
    pub(crate) fn absent(
        core_id: impl Into<String>,
        variable: impl Into<String>,
        cells: usize,
    ) -> Self {
        Self::new(core_id, variable, None, None, vec![AlignedValue::out_of_range(); cells])
    }

    /// Keep only the cells at `indices`, in that order.
    pub(crate) fn subset(&self, indices: &[usize]) -> Self {
        Self {
            values: indices.iter().filter_map(|&i| self.values.get(i).copied()).collect(),
            ..self.clone()
        }
    }

    pub fn core_id(&self) -> &str {
        &self.core_id
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn extent(&self) -> Option<(f64, f64)> {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, cell: usize) -> Option<&AlignedValue> {
        self.values.get(cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlignedValue> {
        self.values.iter()
    }

    pub fn values(&self) -> Vec<Value> {
        self.values.iter().map(|v| v.value).collect()
    }

    pub fn provenance(&self) -> Vec<Provenance> {
        self.values.iter().map(|v| v.provenance).collect()
    }

    /// Number of cells carrying a value.
    pub fn usable_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_usable()).count()
    }

    /// Number of cells with the given tag.
    pub fn count(&self, provenance: Provenance) -> usize {
        self.values.iter().filter(|v| v.provenance == provenance).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tags_never_carry_values() {
        assert_eq!(AlignedValue::new(3.0, Provenance::Missing), AlignedValue::missing());
        assert_eq!(AlignedValue::new(3.0, Provenance::OutOfRange), AlignedValue::out_of_range());
        assert_eq!(AlignedValue::interpolated(f64::NAN), AlignedValue::missing());
        assert_eq!(AlignedValue::measured(2.0).value, Value::Present(2.0));
    }

    #[test]
    fn test_absent_row() {
        let row = AlignedProfile::absent("C1", "salinity", 3);
        assert_eq!(row.len(), 3);
        assert_eq!(row.count(Provenance::OutOfRange), 3);
        assert_eq!(row.usable_count(), 0);
        assert_eq!(row.extent(), None);
    }

    #[test]
    fn test_subset_preserves_tags() {
        let row = AlignedProfile::new(
            "C1",
            "temperature",
            Some("degC".to_string()),
            Some((0.0, 1.0)),
            vec![
                AlignedValue::measured(-5.0),
                AlignedValue::interpolated(-4.5),
                AlignedValue::out_of_range(),
            ],
        );
        let sub = row.subset(&[1, 2]);
        assert_eq!(sub.provenance(), vec![Provenance::Interpolated, Provenance::OutOfRange]);
        assert_eq!(sub.values(), vec![Value::Present(-4.5), Value::Missing]);
        assert_eq!(sub.unit(), Some("degC"));
    }
}
