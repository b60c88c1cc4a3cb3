//! Bin-wise aggregation of a core stack.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::align::{Cell, TargetCoordinate};
use crate::error::{IceStackError, Result};
use crate::profile::{Provenance, Value};
use crate::stack::{CoreStack, Selection};

use super::statistic::{AggregateConfig, Statistic};

/// Summary of one cell across cores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBin {
    /// Cores with a usable value in this cell.
    pub count: usize,
    /// How many of those values were interpolated.
    pub interpolated: usize,
    /// Contributing core ids, sorted.
    pub contributors: Vec<String>,
    /// One value per configured statistic, in configuration order.
    pub values: Vec<Value>,
}

impl AggregateBin {
    /// Share of contributing values that were interpolated.
    pub fn interpolated_fraction(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.interpolated as f64 / self.count as f64
        }
    }
}

/// A per-cell summary profile on the stack's coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateProfile {
    variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    coordinate: TargetCoordinate,
    statistics: Vec<Statistic>,
    min_count: usize,
    bins: Vec<AggregateBin>,
}

impl AggregateProfile {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn coordinate(&self) -> &TargetCoordinate {
        &self.coordinate
    }

    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    pub fn bins(&self) -> &[AggregateBin] {
        &self.bins
    }

    pub fn bin(&self, cell: usize) -> Option<&AggregateBin> {
        self.bins.get(cell)
    }

    pub fn cell_count(&self) -> usize {
        self.bins.len()
    }

    /// Value of `statistic` in `cell`, if that statistic was computed.
    pub fn get(&self, cell: usize, statistic: &Statistic) -> Option<Value> {
        let column = self.column_of(statistic)?;
        self.bins.get(cell)?.values.get(column).copied()
    }

    /// One statistic down the whole coordinate.
    pub fn series(&self, statistic: &Statistic) -> Option<Vec<Value>> {
        let column = self.column_of(statistic)?;
        Some(self.bins.iter().map(|b| b.values[column]).collect())
    }

    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|b| b.count).collect()
    }

    /// Cells paired with their summaries, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &AggregateBin)> {
        self.coordinate.cells().zip(self.bins.iter())
    }

    fn column_of(&self, statistic: &Statistic) -> Option<usize> {
        self.statistics.iter().position(|s| s == statistic)
    }
}

/// Reduces a stack to per-cell statistics across cores.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregateConfig,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::with_config(AggregateConfig::default())
    }

    pub fn with_config(config: AggregateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AggregateConfig {
        &self.config
    }

    /// Summarize every cell of `stack`.
    ///
    /// Only measured and interpolated entries contribute. Contributions are
    /// sorted before reduction, so results do not depend on row order.
    pub fn aggregate(&self, stack: &CoreStack) -> Result<AggregateProfile> {
        self.config.validate()?;

        let counts = stack.provenance_counts();
        if counts.usable() == 0 {
            warn!(variable = stack.variable(), cores = stack.len(), "stack has no usable values");
            return Err(IceStackError::NoData(format!(
                "stack '{}' has no usable values",
                stack.variable()
            )));
        }

        let bins: Vec<AggregateBin> = (0..stack.cell_count())
            .map(|cell| self.summarize_cell(stack, cell))
            .collect();

        debug!(
            variable = stack.variable(),
            cells = bins.len(),
            cores = stack.len(),
            "aggregated stack"
        );

        Ok(AggregateProfile {
            variable: stack.variable().to_string(),
            unit: stack.unit().map(str::to_string),
            coordinate: stack.coordinate().clone(),
            statistics: self.config.statistics.clone(),
            min_count: self.config.min_count,
            bins,
        })
    }

    /// Aggregate named groups of cores separately.
    ///
    /// Each group is selected out of `stack` and summarized on its own;
    /// the first group that fails (unknown core, no usable values) aborts.
    pub fn aggregate_groups<S: AsRef<str>>(
        &self,
        stack: &CoreStack,
        groups: &IndexMap<String, Vec<S>>,
    ) -> Result<IndexMap<String, AggregateProfile>> {
        let mut profiles = IndexMap::with_capacity(groups.len());
        for (name, members) in groups {
            let selection = Selection::new().with_cores(members.iter().map(|m| m.as_ref()));
            let profile = self.aggregate(&stack.select(&selection)?)?;
            profiles.insert(name.clone(), profile);
        }
        Ok(profiles)
    }

    fn summarize_cell(&self, stack: &CoreStack, cell: usize) -> AggregateBin {
        let mut contributions: Vec<(&str, f64, Provenance)> = stack
            .column(cell)
            .filter_map(|(core, v)| v.value.as_f64().map(|x| (core, x, v.provenance)))
            .collect();
        contributions.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        let sorted: Vec<f64> = contributions.iter().map(|c| c.1).collect();
        let count = sorted.len();
        let interpolated = contributions
            .iter()
            .filter(|c| c.2 == Provenance::Interpolated)
            .count();
        let mut contributors: Vec<String> = contributions.iter().map(|c| c.0.to_string()).collect();
        contributors.sort();

        let values = self
            .config
            .statistics
            .iter()
            .map(|statistic| {
                if count < self.config.min_count {
                    return Value::Missing;
                }
                statistic
                    .compute(&sorted, self.config.ddof)
                    .map_or(Value::Missing, Value::new)
            })
            .collect();

        AggregateBin {
            count,
            interpolated,
            contributors,
            values,
        }
    }
}
