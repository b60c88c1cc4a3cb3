//! Ice core: one physical sample with many profiles.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{IceStackError, Result};

use super::profile::{Profile, ProfileData, VerticalReference};

/// Geographic position of a coring site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Collection metadata. Opaque to alignment, except for the thickness
/// used to convert bottom-referenced depths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
    /// Ice thickness at the coring site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_thickness: Option<f64>,
    /// Length of the extracted core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// Free-form annotations such as ice type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub annotations: IndexMap<String, String>,
}

impl CoreMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(Location { latitude, longitude });
        self
    }

    pub fn with_collected_at(mut self, at: DateTime<Utc>) -> Self {
        self.collected_at = Some(at);
        self
    }

    pub fn with_ice_thickness(mut self, thickness: f64) -> Self {
        self.ice_thickness = Some(thickness);
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Thickness used as the bottom reference: ice thickness, or the core
    /// length when thickness was not recorded.
    pub fn reference_thickness(&self) -> Option<f64> {
        self.ice_thickness
            .filter(|h| h.is_finite())
            .or(self.length.filter(|l| l.is_finite()))
    }
}

/// A named collection of profiles from one core, keyed by variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Core {
    id: String,
    metadata: CoreMetadata,
    profiles: IndexMap<String, Profile>,
}

impl Core {
    /// Create a core with no profiles.
    pub fn new(id: impl Into<String>, metadata: CoreMetadata) -> Self {
        Self {
            id: id.into(),
            metadata,
            profiles: IndexMap::new(),
        }
    }

    /// Build a core from ingestion data, validating every profile.
    pub fn from_data(
        id: impl Into<String>,
        metadata: CoreMetadata,
        profiles: impl IntoIterator<Item = (String, ProfileData)>,
    ) -> Result<Self> {
        profiles
            .into_iter()
            .try_fold(Self::new(id, metadata), |core, (variable, data)| {
                core.with_profile(variable, data)
            })
    }

    /// Add a profile from ingestion data.
    ///
    /// Bottom-referenced depths are converted using
    /// [`CoreMetadata::reference_thickness`].
    pub fn with_profile(self, variable: impl Into<String>, data: ProfileData) -> Result<Self> {
        let variable = variable.into();
        let data = match data.reference {
            VerticalReference::IceSurface => data,
            VerticalReference::IceBottom => {
                let thickness = self.metadata.reference_thickness().ok_or_else(|| {
                    IceStackError::malformed(
                        &self.id,
                        &variable,
                        "bottom-referenced depths need ice thickness or core length",
                    )
                })?;
                ProfileData {
                    support: data.support.from_bottom(thickness),
                    reference: VerticalReference::IceSurface,
                    ..data
                }
            }
        };
        let profile = Profile::new(self.id.clone(), variable, data)?;
        self.insert(profile)
    }

    /// Add an already validated profile.
    pub fn insert(mut self, profile: Profile) -> Result<Self> {
        if profile.core_id() != self.id {
            return Err(IceStackError::CoreMismatch {
                expected: self.id,
                found: profile.core_id().to_string(),
            });
        }
        if self.profiles.contains_key(profile.variable()) {
            return Err(IceStackError::DuplicateVariable {
                core: self.id,
                variable: profile.variable().to_string(),
            });
        }
        self.profiles.insert(profile.variable().to_string(), profile);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &CoreMetadata {
        &self.metadata
    }

    pub fn profile(&self, variable: &str) -> Option<&Profile> {
        self.profiles.get(variable)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    /// Variable names in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(|k| k.as_str())
    }

    pub fn has_variable(&self, variable: &str) -> bool {
        self.profiles.contains_key(variable)
    }
}
