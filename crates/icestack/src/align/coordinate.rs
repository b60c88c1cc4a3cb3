//! Target depth coordinates shared by aligned profiles.

use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};
use crate::profile::Profile;

use super::config::BinPolicy;

/// Upper bound on derived bins, to catch a width far below the span scale.
const MAX_DERIVED_BINS: usize = 1_000_000;

/// Shared depth grid onto which profiles are resampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetCoordinate {
    /// Discrete target depths.
    Points { depths: Vec<f64> },
    /// Contiguous bins given by their edges: `n + 1` edges make `n` bins.
    Bins { edges: Vec<f64> },
}

/// One cell of a target coordinate. Points have `top == bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub top: f64,
    pub bottom: f64,
}

impl Cell {
    pub fn center(&self) -> f64 {
        self.top + (self.bottom - self.top) / 2.0
    }

    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn is_point(&self) -> bool {
        self.top == self.bottom
    }
}

impl TargetCoordinate {
    /// Validated point coordinate.
    pub fn points(depths: Vec<f64>) -> Result<Self> {
        let coordinate = Self::Points { depths };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Validated bin coordinate from edges.
    pub fn bins(edges: Vec<f64>) -> Result<Self> {
        let coordinate = Self::Bins { edges };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Coordinate with no cells.
    pub fn empty() -> Self {
        Self::Points { depths: Vec::new() }
    }

    /// Check depths are finite and strictly increasing.
    pub fn validate(&self) -> Result<()> {
        let values = match self {
            Self::Points { depths } => depths,
            Self::Bins { edges } => {
                if edges.len() == 1 {
                    return Err(IceStackError::InvalidCoordinate(
                        "bins need at least two edges".to_string(),
                    ));
                }
                edges
            }
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(IceStackError::InvalidCoordinate(
                "depths must be finite".to_string(),
            ));
        }
        if let Some(i) = values.windows(2).position(|w| w[1] <= w[0]) {
            return Err(IceStackError::InvalidCoordinate(format!(
                "depths must be strictly increasing (index {})",
                i + 1
            )));
        }
        Ok(())
    }

    pub fn is_bins(&self) -> bool {
        matches!(self, Self::Bins { .. })
    }

    /// Number of cells (points or bins).
    pub fn cell_count(&self) -> usize {
        match self {
            Self::Points { depths } => depths.len(),
            Self::Bins { edges } => edges.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        match self {
            Self::Points { depths } => depths.get(index).map(|&d| Cell { top: d, bottom: d }),
            Self::Bins { edges } => Some(Cell {
                top: *edges.get(index)?,
                bottom: *edges.get(index + 1)?,
            }),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.cell_count()).filter_map(move |i| self.cell(i))
    }

    /// Representative depth of each cell: the point, or the bin midpoint.
    pub fn centers(&self) -> Vec<f64> {
        self.cells().map(|c| c.center()).collect()
    }

    /// Overall depth range covered by the coordinate.
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = self.cell(0)?;
        let last = self.cell(self.cell_count() - 1)?;
        Some((first.top, last.bottom))
    }

    /// Cells lying inside `[top, bottom]`, with their original indices.
    ///
    /// Points inside the range are kept; bins are kept when both edges lie
    /// inside it. Kept bins stay contiguous.
    pub fn restrict(&self, top: f64, bottom: f64, tolerance: f64) -> (Self, Vec<usize>) {
        let inside = |d: f64| d >= top - tolerance && d <= bottom + tolerance;
        let indices: Vec<usize> = self
            .cells()
            .enumerate()
            .filter(|(_, c)| inside(c.top) && inside(c.bottom))
            .map(|(i, _)| i)
            .collect();

        let restricted = match self {
            Self::Points { depths } => Self::Points {
                depths: indices.iter().map(|&i| depths[i]).collect(),
            },
            Self::Bins { edges } => match (indices.first(), indices.last()) {
                (Some(&first), Some(&last)) => Self::Bins {
                    edges: edges[first..=last + 1].to_vec(),
                },
                _ => Self::Bins { edges: Vec::new() },
            },
        };
        (restricted, indices)
    }

    /// Derive contiguous bins covering the union extent of `profiles`.
    pub fn derive<'a>(
        profiles: impl IntoIterator<Item = &'a Profile>,
        policy: BinPolicy,
    ) -> Result<Self> {
        let mut span: Option<(f64, f64)> = None;
        let mut spacings = Vec::new();
        for profile in profiles {
            let Some((top, bottom)) = profile.extent() else {
                continue;
            };
            span = Some(match span {
                Some((t, b)) => (t.min(top), b.max(bottom)),
                None => (top, bottom),
            });
            spacings.extend(profile.spacings().into_iter().filter(|s| *s > 0.0));
        }

        let Some((top, bottom)) = span else {
            return Ok(Self::empty());
        };
        let length = bottom - top;
        if length <= 0.0 {
            return Ok(Self::Points { depths: vec![top] });
        }

        spacings.sort_by(f64::total_cmp);
        let width = match policy {
            BinPolicy::MedianSpacing => median(&spacings),
            BinPolicy::FinestSpacing => spacings.first().copied(),
            BinPolicy::CoarsestSpacing => spacings.last().copied(),
            BinPolicy::Width { width } => Some(width),
            BinPolicy::Count { count } => Some(length / count.max(1) as f64),
        };
        let Some(width) = width.filter(|w| *w > 0.0 && w.is_finite()) else {
            return Ok(Self::Bins { edges: vec![top, bottom] });
        };

        // Tolerate a span that is an exact multiple of the width up to
        // floating point noise.
        let count = ((length / width) - 1e-9).ceil().max(1.0);
        if count > MAX_DERIVED_BINS as f64 {
            return Err(IceStackError::InvalidConfig(format!(
                "bin width {} would produce more than {} bins",
                width, MAX_DERIVED_BINS
            )));
        }
        let count = count as usize;

        let mut edges: Vec<f64> = (0..count).map(|k| top + k as f64 * width).collect();
        edges.push(bottom);
        Ok(Self::Bins { edges })
    }
}

/// Median of sorted values.
pub(crate) fn median(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
