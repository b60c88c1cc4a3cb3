//! IceStack: depth alignment and cross-core aggregation of sea-ice core profiles.
//!
//! Sea-ice cores are sampled irregularly: every core has its own depth range,
//! spacing and gaps, and some variables are point measurements while others
//! are averages over cut sections. IceStack resamples such profiles onto a
//! shared depth coordinate and summarizes many cores bin by bin.
//!
//! # Core Principles
//!
//! - **No fabrication**: values outside a core's sampled extent are never
//!   extrapolated, and gaps wider than the configured limit stay missing
//! - **Full provenance**: every aligned value is tagged measured,
//!   interpolated, missing or out of range, and aggregates record which
//!   cores contributed
//! - **Deterministic**: aggregation does not depend on core order
//!
//! # Example
//!
//! ```
//! use icestack::{Core, CoreMetadata, IceStack, ProfileData, Statistic, TargetCoordinate, Value};
//!
//! let cores = vec![
//!     Core::new("A", CoreMetadata::new())
//!         .with_profile("salinity", ProfileData::points(vec![0.0, 0.1, 0.2], vec![6.0, 5.0, 4.0]))
//!         .unwrap(),
//!     Core::new("B", CoreMetadata::new())
//!         .with_profile("salinity", ProfileData::points(vec![0.0, 0.1], vec![8.0, 7.0]))
//!         .unwrap(),
//! ];
//!
//! let icestack = IceStack::new();
//! let target = TargetCoordinate::points(vec![0.0, 0.1, 0.2]).unwrap();
//! let summary = icestack.summarize("salinity", &cores, Some(&target)).unwrap();
//!
//! assert_eq!(summary.aggregate.get(0, &Statistic::Mean), Some(Value::Present(7.0)));
//! assert_eq!(summary.aggregate.get(2, &Statistic::Count), Some(Value::Present(1.0)));
//! ```

pub mod aggregate;
pub mod align;
pub mod error;
pub mod profile;
pub mod property;
pub mod stack;
pub mod table;

mod icestack;

pub use crate::icestack::{IceStack, IceStackConfig, StackSummary};
pub use aggregate::{AggregateBin, AggregateConfig, AggregateProfile, Aggregator, Statistic};
pub use align::{
    AlignConfig, AlignedCore, AlignedProfile, AlignedValue, Alignment, AlignmentEngine, BinPolicy,
    Cell, InterpolationMode, TargetCoordinate,
};
pub use error::{IceStackError, Result};
pub use profile::{
    Core, CoreMetadata, DepthSupport, Location, Profile, ProfileData, Provenance, Value,
    VerticalReference,
};
pub use property::{FnProperty, PropertyFunction};
pub use stack::{CoreStack, ProvenanceCounts, Selection};
