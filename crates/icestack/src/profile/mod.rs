//! Profile and core data model.

mod ice_core;
mod depth;
mod profile;
mod value;

pub use ice_core::{Core, CoreMetadata, Location};
pub use depth::DepthSupport;
pub use profile::{Profile, ProfileData, VerticalReference};
pub use value::{Provenance, Value};

pub(crate) use profile::Sample;
