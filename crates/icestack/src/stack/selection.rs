//! Sub-view requests on a core stack.

use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};

/// Which rows and cells of a stack to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Cores to keep (None = all).
    pub core_ids: Option<Vec<String>>,
    /// Closed depth range to keep (None = all cells).
    pub depth_range: Option<(f64, f64)>,
    /// Slack when comparing cell edges with the range bounds.
    pub tolerance: f64,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            core_ids: None,
            depth_range: None,
            tolerance: 1e-6,
        }
    }
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cores<S: Into<String>>(mut self, core_ids: impl IntoIterator<Item = S>) -> Self {
        self.core_ids = Some(core_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_depth_range(mut self, top: f64, bottom: f64) -> Self {
        self.depth_range = Some((top, bottom));
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some((top, bottom)) = self.depth_range {
            if !(top.is_finite() && bottom.is_finite()) || top > bottom {
                return Err(IceStackError::InvalidConfig(format!(
                    "invalid depth range [{}, {}]",
                    top, bottom
                )));
            }
        }
        if !(self.tolerance >= 0.0) {
            return Err(IceStackError::InvalidConfig(format!(
                "selection tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let selection = Selection::new().with_cores(["A", "B"]).with_depth_range(0.0, 0.5);
        assert_eq!(selection.core_ids, Some(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(selection.depth_range, Some((0.0, 0.5)));
        assert!(selection.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(Selection::new().with_depth_range(1.0, 0.0).validate().is_err());
        assert!(Selection::new().with_depth_range(0.0, f64::NAN).validate().is_err());
    }
}
