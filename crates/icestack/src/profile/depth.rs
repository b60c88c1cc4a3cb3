//! Depth supports: where along the core each sample was taken.

use serde::{Deserialize, Serialize};

/// Vertical support of a profile's samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DepthSupport {
    /// Point samples, e.g. a temperature string.
    Points { depths: Vec<f64> },
    /// Samples representative of a depth interval, e.g. salinity measured
    /// on a melted core section.
    Sections { top: Vec<f64>, bottom: Vec<f64> },
}

/// Direction of a monotonic depth sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ordering {
    Ascending,
    Descending,
}

impl DepthSupport {
    /// Number of samples described by this support.
    pub fn len(&self) -> usize {
        match self {
            Self::Points { depths } => depths.len(),
            Self::Sections { top, .. } => top.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_sections(&self) -> bool {
        matches!(self, Self::Sections { .. })
    }

    /// Upper and lower depth of sample `index`. Points are degenerate.
    pub fn interval(&self, index: usize) -> Option<(f64, f64)> {
        match self {
            Self::Points { depths } => depths.get(index).map(|&d| (d, d)),
            Self::Sections { top, bottom } => {
                Some((*top.get(index)?, *bottom.get(index)?))
            }
        }
    }

    /// Representative depth of each sample (section midpoints).
    pub fn centers(&self) -> Vec<f64> {
        match self {
            Self::Points { depths } => depths.clone(),
            Self::Sections { top, bottom } => top
                .iter()
                .zip(bottom)
                .map(|(t, b)| t + (b - t) / 2.0)
                .collect(),
        }
    }

    /// Check the structural invariants and report the ordering.
    pub(crate) fn validate(&self) -> std::result::Result<Ordering, String> {
        match self {
            Self::Points { depths } => monotonic(depths),
            Self::Sections { top, bottom } => {
                if top.len() != bottom.len() {
                    return Err(format!(
                        "{} section tops but {} section bottoms",
                        top.len(),
                        bottom.len()
                    ));
                }
                for (i, (t, b)) in top.iter().zip(bottom).enumerate() {
                    if !b.is_finite() {
                        return Err(format!("non-finite depth at sample {}", i));
                    }
                    if t >= b {
                        return Err(format!(
                            "section {} has top {} not above bottom {}",
                            i, t, b
                        ));
                    }
                }
                let ordering = monotonic(top)?;
                let overlap = (0..top.len().saturating_sub(1)).find(|&i| match ordering {
                    Ordering::Ascending => bottom[i] > top[i + 1],
                    Ordering::Descending => bottom[i + 1] > top[i],
                });
                if let Some(i) = overlap {
                    return Err(format!("sections {} and {} overlap", i, i + 1));
                }
                Ok(ordering)
            }
        }
    }

    /// Reverse sample order. Used to store descending input top-down.
    pub(crate) fn reversed(self) -> Self {
        match self {
            Self::Points { mut depths } => {
                depths.reverse();
                Self::Points { depths }
            }
            Self::Sections { mut top, mut bottom } => {
                top.reverse();
                bottom.reverse();
                Self::Sections { top, bottom }
            }
        }
    }

    /// Convert depths measured upward from the ice bottom into depths
    /// measured downward from the ice surface, given the ice thickness.
    pub(crate) fn from_bottom(self, thickness: f64) -> Self {
        match self {
            Self::Points { depths } => Self::Points {
                depths: depths.into_iter().map(|d| thickness - d).collect(),
            },
            // The section nearest the bottom becomes the deepest one.
            Self::Sections { top, bottom } => Self::Sections {
                top: bottom.iter().map(|b| thickness - b).collect(),
                bottom: top.iter().map(|t| thickness - t).collect(),
            },
        }
    }
}

fn monotonic(depths: &[f64]) -> std::result::Result<Ordering, String> {
    if let Some(i) = depths.iter().position(|d| !d.is_finite()) {
        return Err(format!("non-finite depth at sample {}", i));
    }

    let mut ordering = None;
    for (i, pair) in depths.windows(2).enumerate() {
        let step = if pair[1] > pair[0] {
            Ordering::Ascending
        } else if pair[1] < pair[0] {
            Ordering::Descending
        } else {
            return Err(format!("duplicate depth {} at samples {} and {}", pair[0], i, i + 1));
        };
        match ordering {
            None => ordering = Some(step),
            Some(o) if o != step => {
                return Err(format!("depths not monotonic at sample {}", i + 1));
            }
            Some(_) => {}
        }
    }

    Ok(ordering.unwrap_or(Ordering::Ascending))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(depths: &[f64]) -> DepthSupport {
        DepthSupport::Points { depths: depths.to_vec() }
    }

    #[test]
    fn test_points_ordering() {
        assert_eq!(points(&[0.0, 0.1, 0.3]).validate(), Ok(Ordering::Ascending));
        assert_eq!(points(&[0.3, 0.1]).validate(), Ok(Ordering::Descending));
        assert_eq!(points(&[0.5]).validate(), Ok(Ordering::Ascending));
        assert!(points(&[0.0, 0.2, 0.1]).validate().is_err());
    }

    #[test]
    fn test_duplicate_depth_rejected() {
        let err = points(&[0.0, 0.1, 0.1]).validate().unwrap_err();
        assert!(err.contains("duplicate"));
    }

    #[test]
    fn test_non_finite_depth_rejected() {
        assert!(points(&[0.0, f64::NAN]).validate().is_err());
    }

    #[test]
    fn test_sections_validation() {
        let ok = DepthSupport::Sections {
            top: vec![0.0, 0.05, 0.15],
            bottom: vec![0.05, 0.1, 0.2],
        };
        assert_eq!(ok.validate(), Ok(Ordering::Ascending));

        let inverted = DepthSupport::Sections {
            top: vec![0.0, 0.1],
            bottom: vec![0.05, 0.05],
        };
        assert!(inverted.validate().is_err());

        let overlapping = DepthSupport::Sections {
            top: vec![0.0, 0.04],
            bottom: vec![0.05, 0.1],
        };
        assert!(overlapping.validate().unwrap_err().contains("overlap"));
    }

    #[test]
    fn test_from_bottom_flips_sections() {
        let support = DepthSupport::Sections {
            top: vec![0.0, 0.1],
            bottom: vec![0.1, 0.2],
        };
        let flipped = support.from_bottom(1.0);
        assert_eq!(
            flipped,
            DepthSupport::Sections {
                top: vec![0.9, 0.8],
                bottom: vec![1.0, 0.9],
            }
        );
        assert_eq!(flipped.validate(), Ok(Ordering::Descending));
    }

    #[test]
    fn test_centers() {
        let support = DepthSupport::Sections {
            top: vec![0.0, 0.1],
            bottom: vec![0.1, 0.3],
        };
        let centers = support.centers();
        assert!((centers[0] - 0.05).abs() < 1e-12);
        assert!((centers[1] - 0.2).abs() < 1e-12);
    }
}
