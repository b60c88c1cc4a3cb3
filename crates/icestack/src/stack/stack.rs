//! Rectangular stack of aligned profiles for one variable.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::align::{AlignedProfile, AlignedValue, AlignmentEngine, TargetCoordinate};
use crate::error::{IceStackError, Result};
use crate::profile::{Core, Profile, Provenance};

use super::selection::Selection;

/// Counts of aligned cells by provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvenanceCounts {
    pub measured: usize,
    pub interpolated: usize,
    pub missing: usize,
    pub out_of_range: usize,
}

impl ProvenanceCounts {
    pub fn total(&self) -> usize {
        self.measured + self.interpolated + self.missing + self.out_of_range
    }

    /// Cells that carry a value.
    pub fn usable(&self) -> usize {
        self.measured + self.interpolated
    }
}

/// Many cores' profiles of one variable on one target coordinate.
///
/// Every row has exactly one entry per cell of the coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreStack {
    variable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    coordinate: TargetCoordinate,
    rows: Vec<AlignedProfile>,
}

impl CoreStack {
    /// Align `variable` of every core onto one coordinate.
    ///
    /// Without an explicit target the coordinate is derived from the cores'
    /// profiles using the engine's bin policy. A core lacking the variable
    /// contributes a row that is out of range everywhere. If no core holds a
    /// usable sample of the variable the build fails with
    /// [`IceStackError::NoData`].
    pub fn build<'a>(
        engine: &AlignmentEngine,
        variable: &str,
        cores: impl IntoIterator<Item = &'a Core>,
        target: Option<&TargetCoordinate>,
    ) -> Result<Self> {
        let cores: Vec<&Core> = cores.into_iter().collect();

        let mut seen = HashSet::new();
        for core in &cores {
            if !seen.insert(core.id()) {
                return Err(IceStackError::DuplicateCore(core.id().to_string()));
            }
        }

        let present: Vec<&Profile> = cores.iter().filter_map(|c| c.profile(variable)).collect();
        if present.is_empty() && !cores.is_empty() {
            return Err(IceStackError::NoData(format!(
                "none of the {} cores has a '{}' profile",
                cores.len(),
                variable
            )));
        }
        if !present.is_empty() && present.iter().all(|p| p.valid_count() == 0) {
            warn!(variable, cores = cores.len(), "no usable samples in any core");
            return Err(IceStackError::NoData(format!(
                "no core has a usable '{}' sample",
                variable
            )));
        }

        let unit = present.iter().find_map(|p| p.unit()).map(str::to_string);
        if let Some(ref unit) = unit {
            if let Some(other) = present.iter().find(|p| p.unit().is_some_and(|u| u != unit.as_str())) {
                warn!(
                    variable,
                    unit = unit.as_str(),
                    core = other.core_id(),
                    other_unit = other.unit().unwrap_or_default(),
                    "mixed units in stack"
                );
            }
        }

        let coordinate = engine.resolve_coordinate(present.iter().copied(), target)?;
        let rows = cores
            .iter()
            .map(|core| match core.profile(variable) {
                Some(profile) => engine.align_profile(profile, &coordinate),
                None => {
                    debug!(core = core.id(), variable, "variable absent from core");
                    AlignedProfile::absent(core.id(), variable, coordinate.cell_count())
                }
            })
            .collect();

        Ok(Self {
            variable: variable.to_string(),
            unit,
            coordinate,
            rows,
        })
    }

    /// Restrict to a subset of cores and/or a depth sub-range.
    ///
    /// Values and provenance are copied unchanged; rows keep the stack order.
    pub fn select(&self, selection: &Selection) -> Result<Self> {
        selection.validate()?;

        let rows: Vec<&AlignedProfile> = match &selection.core_ids {
            Some(ids) => {
                if let Some(unknown) = ids.iter().find(|id| self.row(id).is_none()) {
                    return Err(IceStackError::UnknownCore(unknown.clone()));
                }
                self.rows
                    .iter()
                    .filter(|row| ids.iter().any(|id| id == row.core_id()))
                    .collect()
            }
            None => self.rows.iter().collect(),
        };

        let (coordinate, rows): (TargetCoordinate, Vec<AlignedProfile>) = match selection.depth_range {
            Some((top, bottom)) => {
                let (coordinate, indices) = self.coordinate.restrict(top, bottom, selection.tolerance);
                let rows = rows.into_iter().map(|row| row.subset(&indices)).collect();
                (coordinate, rows)
            }
            None => (self.coordinate.clone(), rows.into_iter().cloned().collect()),
        };

        Ok(Self {
            variable: self.variable.clone(),
            unit: self.unit.clone(),
            coordinate,
            rows,
        })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn coordinate(&self) -> &TargetCoordinate {
        &self.coordinate
    }

    pub fn rows(&self) -> &[AlignedProfile] {
        &self.rows
    }

    pub fn row(&self, core_id: &str) -> Option<&AlignedProfile> {
        self.rows.iter().find(|r| r.core_id() == core_id)
    }

    /// Entry at (core, cell).
    pub fn get(&self, core_id: &str, cell: usize) -> Option<&AlignedValue> {
        self.row(core_id)?.get(cell)
    }

    /// All cores' entries for one cell, in row order.
    pub fn column(&self, cell: usize) -> impl Iterator<Item = (&str, &AlignedValue)> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(cell).map(|v| (row.core_id(), v)))
    }

    pub fn core_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.core_id())
    }

    /// Number of rows (cores).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.coordinate.cell_count()
    }

    pub fn provenance_counts(&self) -> ProvenanceCounts {
        let mut counts = ProvenanceCounts::default();
        for value in self.rows.iter().flat_map(|r| r.iter()) {
            match value.provenance {
                Provenance::Measured => counts.measured += 1,
                Provenance::Interpolated => counts.interpolated += 1,
                Provenance::Missing => counts.missing += 1,
                Provenance::OutOfRange => counts.out_of_range += 1,
            }
        }
        counts
    }

    /// Share of all cells taken directly from original samples.
    pub fn measured_fraction(&self) -> f64 {
        let counts = self.provenance_counts();
        if counts.total() == 0 {
            0.0
        } else {
            counts.measured as f64 / counts.total() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::AlignConfig;
    use crate::profile::{CoreMetadata, ProfileData, Value};

    fn core(id: &str, depths: Vec<f64>, values: Vec<f64>) -> Core {
        Core::new(id, CoreMetadata::new())
            .with_profile("salinity", ProfileData::points(depths, values).with_unit("psu"))
            .unwrap()
    }

    fn cores() -> Vec<Core> {
        vec![
            core("A", vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 3.0]),
            core("B", vec![5.0, 15.0], vec![4.0, 5.0]),
            core("C", vec![0.0, 10.0, 20.0, 30.0], vec![10.0, 20.0, 30.0, 40.0]),
        ]
    }

    fn engine() -> AlignmentEngine {
        AlignmentEngine::with_config(AlignConfig::new().with_max_gap(12.0))
    }

    fn target() -> TargetCoordinate {
        TargetCoordinate::points(vec![0.0, 10.0, 20.0, 30.0]).unwrap()
    }

    #[test]
    fn test_build_is_rectangular() {
        let cores = cores();
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.unit(), Some("psu"));
        assert!(stack.rows().iter().all(|r| r.len() == 4));
        assert_eq!(stack.get("B", 1), Some(&AlignedValue::interpolated(4.5)));
        assert_eq!(
            stack.column(0).map(|(_, v)| v.value).collect::<Vec<_>>(),
            vec![Value::Present(1.0), Value::Missing, Value::Present(10.0)]
        );
    }

    #[test]
    fn test_absent_variable_gives_missing_row() {
        let mut cores = cores();
        cores.push(
            Core::new("D", CoreMetadata::new())
                .with_profile("temperature", ProfileData::points(vec![0.0], vec![-3.0]))
                .unwrap(),
        );
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        let row = stack.row("D").unwrap();
        assert_eq!(row.count(Provenance::OutOfRange), 4);
    }

    #[test]
    fn test_all_absent_is_no_data() {
        let cores = cores();
        let err = CoreStack::build(&engine(), "temperature", &cores, None).unwrap_err();
        assert!(matches!(err, IceStackError::NoData(_)));
    }

    #[test]
    fn test_all_samples_missing_is_no_data() {
        let empty = |id: &str| {
            Core::new(id, CoreMetadata::new())
                .with_profile(
                    "salinity",
                    ProfileData::points(vec![0.0, 10.0], vec![None::<f64>, None]),
                )
                .unwrap()
        };
        let cores = vec![
            empty("A"),
            Core::new("B", CoreMetadata::new())
                .with_profile("salinity", ProfileData::points(vec![0.0, 10.0], vec![f64::NAN, f64::NAN]))
                .unwrap(),
        ];

        let derived = CoreStack::build(&engine(), "salinity", &cores, None).unwrap_err();
        assert!(matches!(derived, IceStackError::NoData(_)));
        let explicit = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap_err();
        assert!(matches!(explicit, IceStackError::NoData(_)));

        // one usable core is enough
        let mut cores = cores;
        cores.push(core("C", vec![0.0], vec![1.0]));
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        assert_eq!(stack.row("A").unwrap().count(Provenance::OutOfRange), 4);
    }

    #[test]
    fn test_empty_input_keeps_coordinate() {
        let none: Vec<Core> = Vec::new();
        let stack = CoreStack::build(&engine(), "salinity", &none, Some(&target())).unwrap();
        assert!(stack.is_empty());
        assert_eq!(stack.cell_count(), 4);
    }

    #[test]
    fn test_duplicate_core_rejected() {
        let mut cores = cores();
        cores.push(core("A", vec![0.0], vec![1.0]));
        let err = CoreStack::build(&engine(), "salinity", &cores, None).unwrap_err();
        assert!(matches!(err, IceStackError::DuplicateCore(id) if id == "A"));
    }

    #[test]
    fn test_select_cores_and_depths() {
        let cores = cores();
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        let selection = Selection::new().with_cores(["C", "B"]).with_depth_range(10.0, 20.0);
        let sub = stack.select(&selection).unwrap();

        assert_eq!(sub.core_ids().collect::<Vec<_>>(), vec!["B", "C"]);
        assert_eq!(sub.coordinate().centers(), vec![10.0, 20.0]);
        assert_eq!(sub.get("B", 0), stack.get("B", 1));
        assert_eq!(sub.get("C", 1), stack.get("C", 2));
    }

    #[test]
    fn test_select_everything_is_identity() {
        let cores = cores();
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        assert_eq!(stack.select(&Selection::new()).unwrap(), stack);
    }

    #[test]
    fn test_select_unknown_core() {
        let cores = cores();
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        let err = stack.select(&Selection::new().with_cores(["Z"])).unwrap_err();
        assert!(matches!(err, IceStackError::UnknownCore(id) if id == "Z"));
    }

    #[test]
    fn test_provenance_counts() {
        let cores = cores();
        let stack = CoreStack::build(&engine(), "salinity", &cores, Some(&target())).unwrap();
        let counts = stack.provenance_counts();
        assert_eq!(counts.measured, 7);
        assert_eq!(counts.interpolated, 1);
        assert_eq!(counts.out_of_range, 4);
        assert_eq!(counts.total(), 12);
        assert!((stack.measured_fraction() - 7.0 / 12.0).abs() < 1e-12);
    }
}
