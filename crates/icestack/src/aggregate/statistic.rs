//! Statistics and aggregation configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};

/// A bin-wise statistic across cores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statistic {
    /// Number of contributing cores. Missing, never zero, below `min_count`.
    Count,
    Mean,
    /// Standard deviation with the configured degrees-of-freedom correction.
    Std,
    Median,
    Min,
    Max,
    /// Quantile `q` in `[0, 1]`, linear between order statistics.
    Quantile(f64),
}

impl Statistic {
    /// Compute over values sorted ascending. `None` when undefined.
    pub(crate) fn compute(&self, sorted: &[f64], ddof: usize) -> Option<f64> {
        let n = sorted.len();
        match self {
            _ if n == 0 => None,
            Self::Count => Some(n as f64),
            Self::Mean => Some(mean(sorted)),
            Self::Std => {
                if n <= ddof {
                    return None;
                }
                let m = mean(sorted);
                let squares: f64 = sorted.iter().map(|v| (v - m) * (v - m)).sum();
                Some((squares / (n - ddof) as f64).sqrt())
            }
            Self::Median => quantile(sorted, 0.5),
            Self::Min => sorted.first().copied(),
            Self::Max => sorted.last().copied(),
            Self::Quantile(q) => quantile(sorted, *q),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Mean => write!(f, "mean"),
            Self::Std => write!(f, "std"),
            Self::Median => write!(f, "median"),
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
            Self::Quantile(q) => write!(f, "q{}", q),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Linear interpolation between order statistics (`h = (n - 1) q`).
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    let fraction = h - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Configuration for the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Statistics to compute, in output order.
    pub statistics: Vec<Statistic>,
    /// Minimum contributing cores for a statistic to be defined.
    pub min_count: usize,
    /// Delta degrees of freedom for the standard deviation.
    pub ddof: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            statistics: vec![Statistic::Mean, Statistic::Std, Statistic::Count],
            min_count: 1,
            ddof: 1,
        }
    }
}

impl AggregateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statistics(mut self, statistics: impl IntoIterator<Item = Statistic>) -> Self {
        self.statistics = statistics.into_iter().collect();
        self
    }

    pub fn with_min_count(mut self, min_count: usize) -> Self {
        self.min_count = min_count;
        self
    }

    pub fn with_ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_count == 0 {
            return Err(IceStackError::InvalidConfig(
                "min_count must be at least 1".to_string(),
            ));
        }
        for statistic in &self.statistics {
            if let Statistic::Quantile(q) = statistic {
                if !(0.0..=1.0).contains(q) {
                    return Err(IceStackError::InvalidConfig(format!(
                        "quantile must be within [0, 1], got {}",
                        q
                    )));
                }
            }
        }
        Ok(())
    }
}
