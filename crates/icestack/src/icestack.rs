//! Main IceStack struct and public API.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{AggregateConfig, AggregateProfile, Aggregator};
use crate::align::{AlignConfig, AlignedCore, AlignedProfile, AlignmentEngine, TargetCoordinate};
use crate::error::Result;
use crate::profile::Core;
use crate::property::{self as properties, PropertyFunction};
use crate::stack::{CoreStack, ProvenanceCounts, Selection};

/// Configuration for IceStack processing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceStackConfig {
    /// Alignment configuration.
    pub align: AlignConfig,
    /// Aggregation configuration.
    pub aggregate: AggregateConfig,
}

impl IceStackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_align(mut self, align: AlignConfig) -> Self {
        self.align = align;
        self
    }

    pub fn with_aggregate(mut self, aggregate: AggregateConfig) -> Self {
        self.aggregate = aggregate;
        self
    }
}

/// A stack together with its aggregate and provenance counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSummary {
    pub stack: CoreStack,
    pub aggregate: AggregateProfile,
    pub counts: ProvenanceCounts,
}

/// The main IceStack engine.
#[derive(Debug, Clone, Default)]
pub struct IceStack {
    config: IceStackConfig,
    engine: AlignmentEngine,
    aggregator: Aggregator,
}

impl IceStack {
    /// Create a new IceStack instance with default configuration.
    pub fn new() -> Self {
        Self::with_config(IceStackConfig::default())
    }

    /// Create an IceStack instance with custom configuration.
    pub fn with_config(config: IceStackConfig) -> Self {
        let engine = AlignmentEngine::with_config(config.align.clone());
        let aggregator = Aggregator::with_config(config.aggregate.clone());
        Self {
            config,
            engine,
            aggregator,
        }
    }

    pub fn config(&self) -> &IceStackConfig {
        &self.config
    }

    /// Align `variable` of every core onto one coordinate.
    pub fn build_stack<'a>(
        &self,
        variable: &str,
        cores: impl IntoIterator<Item = &'a Core>,
        target: Option<&TargetCoordinate>,
    ) -> Result<CoreStack> {
        CoreStack::build(&self.engine, variable, cores, target)
    }

    /// Restrict a stack to some cores and/or a depth range.
    pub fn select(&self, stack: &CoreStack, selection: &Selection) -> Result<CoreStack> {
        stack.select(selection)
    }

    /// Bin-wise statistics across the cores of a stack.
    pub fn aggregate(&self, stack: &CoreStack) -> Result<AggregateProfile> {
        self.aggregator.aggregate(stack)
    }

    /// Build, then aggregate, one variable across cores.
    pub fn summarize<'a>(
        &self,
        variable: &str,
        cores: impl IntoIterator<Item = &'a Core>,
        target: Option<&TargetCoordinate>,
    ) -> Result<StackSummary> {
        let stack = self.build_stack(variable, cores, target)?;
        let aggregate = self.aggregate(&stack)?;
        let counts = stack.provenance_counts();
        debug!(
            variable,
            cores = stack.len(),
            cells = stack.cell_count(),
            measured = counts.measured,
            interpolated = counts.interpolated,
            "summarized stack"
        );
        Ok(StackSummary {
            stack,
            aggregate,
            counts,
        })
    }

    /// Align several variables of one core onto one coordinate.
    pub fn align_core(
        &self,
        core: &Core,
        variables: &[&str],
        target: Option<&TargetCoordinate>,
    ) -> Result<AlignedCore> {
        self.engine.align_core(core, variables, target)
    }

    /// Align a property's inputs for one core and compute it cell by cell.
    pub fn derive_property(
        &self,
        core: &Core,
        property: &dyn PropertyFunction,
        target: Option<&TargetCoordinate>,
    ) -> Result<AlignedProfile> {
        let inputs: Vec<&str> = property.inputs().iter().map(String::as_str).collect();
        let aligned = self.align_core(core, &inputs, target)?;
        properties::derive(&aligned, property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Statistic;
    use crate::profile::{CoreMetadata, ProfileData, Provenance, Value};
    use crate::property::FnProperty;

    fn cores() -> Vec<Core> {
        vec![
            Core::new("A", CoreMetadata::new())
                .with_profile("salinity", ProfileData::points(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 3.0]))
                .unwrap(),
            Core::new("B", CoreMetadata::new())
                .with_profile("salinity", ProfileData::points(vec![5.0, 15.0], vec![4.0, 5.0]))
                .unwrap(),
            Core::new("C", CoreMetadata::new())
                .with_profile(
                    "salinity",
                    ProfileData::points(vec![0.0, 10.0, 20.0, 30.0], vec![10.0, 20.0, 30.0, 40.0]),
                )
                .unwrap(),
        ]
    }

    fn icestack() -> IceStack {
        IceStack::with_config(
            IceStackConfig::new().with_align(AlignConfig::new().with_max_gap(12.0)),
        )
    }

    #[test]
    fn test_summarize() {
        let cores = cores();
        let target = TargetCoordinate::points(vec![0.0, 10.0, 20.0, 30.0]).unwrap();
        let summary = icestack().summarize("salinity", &cores, Some(&target)).unwrap();

        assert_eq!(summary.stack.len(), 3);
        assert_eq!(summary.counts.interpolated, 1);
        assert_eq!(summary.aggregate.get(0, &Statistic::Mean), Some(Value::Present(5.5)));
        assert_eq!(summary.aggregate.get(3, &Statistic::Count), Some(Value::Present(1.0)));
    }

    #[test]
    fn test_config_flows_into_engines() {
        let config = IceStackConfig::new()
            .with_aggregate(AggregateConfig::new().with_statistics([Statistic::Max]));
        let icestack = IceStack::with_config(config.clone());
        assert_eq!(icestack.config(), &config);

        let cores = cores();
        let target = TargetCoordinate::points(vec![0.0]).unwrap();
        let stack = icestack.build_stack("salinity", &cores, Some(&target)).unwrap();
        let aggregate = icestack.aggregate(&stack).unwrap();
        assert_eq!(aggregate.statistics(), &[Statistic::Max]);
        assert_eq!(aggregate.get(0, &Statistic::Max), Some(Value::Present(10.0)));
    }

    #[test]
    fn test_select_delegates() {
        let cores = cores();
        let icestack = icestack();
        let stack = icestack.build_stack("salinity", &cores, None).unwrap();
        let sub = icestack.select(&stack, &Selection::new().with_cores(["B"])).unwrap();
        assert_eq!(sub.core_ids().collect::<Vec<_>>(), vec!["B"]);
        assert_eq!(sub.coordinate(), stack.coordinate());
    }

    #[test]
    fn test_derive_property() {
        let core = Core::new("A", CoreMetadata::new())
            .with_profile("temperature", ProfileData::points(vec![0.0, 0.1], vec![-4.0, -2.0]))
            .unwrap();
        let warming = FnProperty::new("warming", ["temperature"], |x: &[f64]| Some(x[0] + 1.0));
        let target = TargetCoordinate::points(vec![0.0, 0.1, 0.2]).unwrap();
        let derived = IceStack::new().derive_property(&core, &warming, Some(&target)).unwrap();

        assert_eq!(
            derived.values(),
            vec![Value::Present(-3.0), Value::Present(-1.0), Value::Missing]
        );
        assert_eq!(derived.get(2).map(|v| v.provenance), Some(Provenance::OutOfRange));
    }
}
