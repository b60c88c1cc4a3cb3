//! A single variable measured along one core.

use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};

use super::depth::{DepthSupport, Ordering};
use super::value::{Provenance, Value};

/// Which end of the ice the depths are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalReference {
    /// Depth 0 is the ice surface, increasing downward.
    #[default]
    IceSurface,
    /// Depth 0 is the ice bottom, increasing upward.
    IceBottom,
}

/// Raw profile data as handed over by an ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub support: DepthSupport,
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Per-sample validity. Derived from the values when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Vec<Provenance>>,
    #[serde(default)]
    pub reference: VerticalReference,
}

impl ProfileData {
    /// Point samples at the given depths.
    pub fn points<V: Into<Value>>(
        depths: impl IntoIterator<Item = f64>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            DepthSupport::Points {
                depths: depths.into_iter().collect(),
            },
            values,
        )
    }

    /// Section samples, each covering `top[i]..bottom[i]`.
    pub fn sections<V: Into<Value>>(
        top: impl IntoIterator<Item = f64>,
        bottom: impl IntoIterator<Item = f64>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            DepthSupport::Sections {
                top: top.into_iter().collect(),
                bottom: bottom.into_iter().collect(),
            },
            values,
        )
    }

    fn new<V: Into<Value>>(support: DepthSupport, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            support,
            values: values.into_iter().map(Into::into).collect(),
            unit: None,
            validity: None,
            reference: VerticalReference::IceSurface,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_validity(mut self, validity: Vec<Provenance>) -> Self {
        self.validity = Some(validity);
        self
    }

    pub fn with_reference(mut self, reference: VerticalReference) -> Self {
        self.reference = reference;
        self
    }
}

/// One variable measured along the depth of one core.
///
/// Samples are always stored top-down. Construction validates the depth
/// support and never repairs it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    core_id: String,
    variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    support: DepthSupport,
    values: Vec<Value>,
    validity: Vec<Provenance>,
}

/// A usable sample, with its depth interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sample {
    pub top: f64,
    pub bottom: f64,
    pub value: f64,
    pub validity: Provenance,
}

impl Sample {
    pub fn center(&self) -> f64 {
        self.top + (self.bottom - self.top) / 2.0
    }
}

impl Profile {
    /// Validate surface-referenced data and build a profile.
    ///
    /// Bottom-referenced data must go through [`crate::Core`], which knows
    /// the ice thickness.
    pub fn new(
        core_id: impl Into<String>,
        variable: impl Into<String>,
        data: ProfileData,
    ) -> Result<Self> {
        let core_id = core_id.into();
        let variable = variable.into();
        let malformed = |reason: String| IceStackError::malformed(&core_id, &variable, reason);

        if data.reference != VerticalReference::IceSurface {
            return Err(malformed(
                "depths must be referenced to the ice surface".to_string(),
            ));
        }

        let ProfileData {
            support,
            values,
            unit,
            validity,
            ..
        } = data;

        if support.len() != values.len() {
            return Err(malformed(format!(
                "{} depths but {} values",
                support.len(),
                values.len()
            )));
        }

        let validity = match validity {
            Some(flags) => {
                if flags.len() != values.len() {
                    return Err(malformed(format!(
                        "{} validity flags but {} values",
                        flags.len(),
                        values.len()
                    )));
                }
                reconcile_validity(&values, flags).map_err(malformed)?
            }
            None => values
                .iter()
                .map(|v| if v.is_present() { Provenance::Measured } else { Provenance::Missing })
                .collect(),
        };

        let ordering = support.validate().map_err(malformed)?;

        let (support, mut values, mut validity) = (support, values, validity);
        let support = if ordering == Ordering::Descending {
            values.reverse();
            validity.reverse();
            support.reversed()
        } else {
            support
        };

        // A present value flagged missing does not count as data.
        for (value, flag) in values.iter_mut().zip(&validity) {
            if *flag == Provenance::Missing {
                *value = Value::Missing;
            }
        }

        Ok(Self {
            core_id,
            variable,
            unit,
            support,
            values,
            validity,
        })
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

    pub fn support(&self) -> &DepthSupport {
        &self.support
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn validity(&self) -> &[Provenance] {
        &self.validity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of samples carrying a value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_present()).count()
    }

    /// Depth range covered by samples carrying a value.
    pub fn extent(&self) -> Option<(f64, f64)> {
        let samples = self.samples();
        let first = samples.first()?;
        let last = samples.last()?;
        Some((first.top, last.bottom))
    }

    /// Vertical resolution: point spacing or section thickness.
    pub fn spacings(&self) -> Vec<f64> {
        let samples = self.samples();
        if self.support.is_sections() {
            samples.iter().map(|s| s.bottom - s.top).collect()
        } else {
            samples.windows(2).map(|w| w[1].top - w[0].top).collect()
        }
    }

    /// Usable samples, top-down. Missing samples are dropped so that holes
    /// in the profile become gaps between neighbours.
    pub(crate) fn samples(&self) -> Vec<Sample> {
        (0..self.len())
            .filter_map(|i| {
                let value = self.values[i].as_f64()?;
                let (top, bottom) = self.support.interval(i)?;
                Some(Sample {
                    top,
                    bottom,
                    value,
                    validity: self.validity[i],
                })
            })
            .collect()
    }
}

fn reconcile_validity(
    values: &[Value],
    flags: Vec<Provenance>,
) -> std::result::Result<Vec<Provenance>, String> {
    for (i, (value, flag)) in values.iter().zip(&flags).enumerate() {
        match flag {
            Provenance::OutOfRange => {
                return Err(format!("sample {} flagged out-of-range on input", i));
            }
            Provenance::Measured | Provenance::Interpolated if value.is_missing() => {
                return Err(format!("sample {} flagged {:?} but has no value", i, flag));
            }
            _ => {}
        }
    }
    Ok(flags)
}
