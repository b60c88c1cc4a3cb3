//! Alignment configuration.

use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};

/// How values between two original samples are filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    /// Linear interpolation between the bracketing samples.
    #[default]
    Linear,
    /// Value of the closer bracketing sample. Ties pick the shallower one.
    Nearest,
    /// No interpolation: only coincident samples are used.
    None,
}

/// How to derive a target coordinate when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BinPolicy {
    /// Bin width is the median of every observed sample spacing.
    #[default]
    MedianSpacing,
    /// Bin width is the smallest observed spacing.
    FinestSpacing,
    /// Bin width is the largest observed spacing.
    CoarsestSpacing,
    /// Fixed bin width.
    Width { width: f64 },
    /// Fixed number of equal bins over the union span.
    Count { count: usize },
}

/// Configuration for the alignment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    /// Interpolation mode between original samples.
    pub interpolation: InterpolationMode,
    /// Largest separation between two original samples that may be
    /// bridged. Wider gaps yield missing values. Same unit as depth.
    pub max_gap: f64,
    /// Distance within which a target depth is considered to coincide with
    /// an original sample.
    pub match_tolerance: f64,
    /// Minimum fraction of a target bin that section samples must cover
    /// for the re-binned value to be kept.
    pub min_coverage: f64,
    /// Target coordinate derivation when none is given.
    pub bin_policy: BinPolicy,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMode::Linear,
            max_gap: 0.1,
            match_tolerance: 1e-6,
            min_coverage: 0.5,
            bin_policy: BinPolicy::MedianSpacing,
        }
    }
}

impl AlignConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }

    pub fn with_max_gap(mut self, max_gap: f64) -> Self {
        self.max_gap = max_gap;
        self
    }

    pub fn with_match_tolerance(mut self, tolerance: f64) -> Self {
        self.match_tolerance = tolerance;
        self
    }

    pub fn with_min_coverage(mut self, coverage: f64) -> Self {
        self.min_coverage = coverage;
        self
    }

    pub fn with_bin_policy(mut self, policy: BinPolicy) -> Self {
        self.bin_policy = policy;
        self
    }

    /// Check every parameter is inside its domain.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_gap >= 0.0) {
            return Err(IceStackError::InvalidConfig(format!(
                "max_gap must be non-negative, got {}",
                self.max_gap
            )));
        }
        if !(self.match_tolerance >= 0.0 && self.match_tolerance.is_finite()) {
            return Err(IceStackError::InvalidConfig(format!(
                "match_tolerance must be finite and non-negative, got {}",
                self.match_tolerance
            )));
        }
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(IceStackError::InvalidConfig(format!(
                "min_coverage must be within [0, 1], got {}",
                self.min_coverage
            )));
        }
        match self.bin_policy {
            BinPolicy::Width { width } if !(width > 0.0 && width.is_finite()) => {
                Err(IceStackError::InvalidConfig(format!(
                    "bin width must be positive, got {}",
                    width
                )))
            }
            BinPolicy::Count { count: 0 } => Err(IceStackError::InvalidConfig(
                "bin count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AlignConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interpolation, InterpolationMode::Linear);
        assert_eq!(config.bin_policy, BinPolicy::MedianSpacing);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(AlignConfig::new().with_max_gap(-1.0).validate().is_err());
        assert!(AlignConfig::new().with_max_gap(f64::NAN).validate().is_err());
        assert!(AlignConfig::new().with_min_coverage(1.5).validate().is_err());
        assert!(AlignConfig::new()
            .with_bin_policy(BinPolicy::Width { width: 0.0 })
            .validate()
            .is_err());
        assert!(AlignConfig::new()
            .with_bin_policy(BinPolicy::Count { count: 0 })
            .validate()
            .is_err());
    }

    #[test]
    fn test_infinite_gap_allowed() {
        assert!(AlignConfig::new().with_max_gap(f64::INFINITY).validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: AlignConfig =
            serde_json::from_str(r#"{"max_gap": 0.2, "bin_policy": {"policy": "count", "count": 10}}"#)
                .unwrap();
        assert_eq!(config.max_gap, 0.2);
        assert_eq!(config.bin_policy, BinPolicy::Count { count: 10 });
        assert_eq!(config.interpolation, InterpolationMode::Linear);
    }
}
