//! Bin-wise statistics across the cores of a stack.

mod aggregator;
mod statistic;

pub use aggregator::{AggregateBin, AggregateProfile, Aggregator};
pub use statistic::{AggregateConfig, Statistic};
