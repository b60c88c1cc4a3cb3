//! Alignment engine: shared coordinate resolution and per-core resampling.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{IceStackError, Result};
use crate::profile::{Core, Profile};

use super::aligned::AlignedProfile;
use super::config::AlignConfig;
use super::coordinate::TargetCoordinate;
use super::resample::resample;

/// Profiles of one variable resampled onto one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub coordinate: TargetCoordinate,
    pub profiles: Vec<AlignedProfile>,
}

/// Several variables of one core on one coordinate. Cell `i` of every
/// profile refers to the same depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedCore {
    core_id: String,
    coordinate: TargetCoordinate,
    profiles: IndexMap<String, AlignedProfile>,
}

impl AlignedCore {
    pub fn core_id(&self) -> &str {
        &self.core_id
    }

    pub fn coordinate(&self) -> &TargetCoordinate {
        &self.coordinate
    }

    pub fn profile(&self, variable: &str) -> Option<&AlignedProfile> {
        self.profiles.get(variable)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &AlignedProfile> {
        self.profiles.values()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    pub fn cell_count(&self) -> usize {
        self.coordinate.cell_count()
    }

    /// Add a profile that already lies on this core's coordinate.
    pub(crate) fn insert(&mut self, profile: AlignedProfile) -> Result<()> {
        if profile.len() != self.cell_count() {
            return Err(IceStackError::InvalidCoordinate(format!(
                "profile '{}' has {} cells, core '{}' has {}",
                profile.variable(),
                profile.len(),
                self.core_id,
                self.cell_count()
            )));
        }
        if self.profiles.contains_key(profile.variable()) {
            return Err(IceStackError::DuplicateVariable {
                core: self.core_id.clone(),
                variable: profile.variable().to_string(),
            });
        }
        self.profiles.insert(profile.variable().to_string(), profile);
        Ok(())
    }
}

/// Resamples profiles onto a shared target coordinate.
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    config: AlignConfig,
}

impl AlignmentEngine {
    /// Create an engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(AlignConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: AlignConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Validate an explicit coordinate, or derive one from the profiles
    /// using the configured bin policy.
    pub fn resolve_coordinate<'a>(
        &self,
        profiles: impl IntoIterator<Item = &'a Profile>,
        target: Option<&TargetCoordinate>,
    ) -> Result<TargetCoordinate> {
        self.config.validate()?;
        match target {
            Some(coordinate) => {
                coordinate.validate()?;
                Ok(coordinate.clone())
            }
            None => TargetCoordinate::derive(profiles, self.config.bin_policy),
        }
    }

    /// Resample a single profile onto an already resolved coordinate.
    pub fn align_profile(&self, profile: &Profile, coordinate: &TargetCoordinate) -> AlignedProfile {
        debug!(
            core = profile.core_id(),
            variable = profile.variable(),
            cells = coordinate.cell_count(),
            "aligning profile"
        );
        AlignedProfile::new(
            profile.core_id(),
            profile.variable(),
            profile.unit().map(str::to_string),
            profile.extent(),
            resample(profile, coordinate, &self.config),
        )
    }

    /// Align profiles of one variable, one per core.
    pub fn align(&self, profiles: &[&Profile], target: Option<&TargetCoordinate>) -> Result<Alignment> {
        let coordinate = self.resolve_coordinate(profiles.iter().copied(), target)?;
        let profiles = profiles
            .iter()
            .map(|profile| self.align_profile(profile, &coordinate))
            .collect();
        Ok(Alignment { coordinate, profiles })
    }

    /// Align several variables of one core onto one coordinate.
    ///
    /// Without an explicit target, the coordinate is derived from the
    /// requested variables of this core. Variables the core lacks get a
    /// row that is out of range everywhere.
    pub fn align_core(
        &self,
        core: &Core,
        variables: &[&str],
        target: Option<&TargetCoordinate>,
    ) -> Result<AlignedCore> {
        let present: Vec<&Profile> = variables.iter().filter_map(|v| core.profile(v)).collect();
        if present.is_empty() && !variables.is_empty() {
            return Err(IceStackError::NoData(format!(
                "core '{}' has none of the variables {:?}",
                core.id(),
                variables
            )));
        }

        let coordinate = self.resolve_coordinate(present.iter().copied(), target)?;
        let mut profiles = IndexMap::new();
        for &variable in variables {
            let aligned = match core.profile(variable) {
                Some(profile) => self.align_profile(profile, &coordinate),
                None => {
                    debug!(core = core.id(), variable, "variable absent from core");
                    AlignedProfile::absent(core.id(), variable, coordinate.cell_count())
                }
            };
            profiles.insert(variable.to_string(), aligned);
        }

        Ok(AlignedCore {
            core_id: core.id().to_string(),
            coordinate,
            profiles,
        })
    }
}
