//! Alignment of irregular profiles onto shared depth coordinates.

mod aligned;
mod config;
mod coordinate;
mod engine;
mod resample;

pub use aligned::{AlignedProfile, AlignedValue};
pub use config::{AlignConfig, BinPolicy, InterpolationMode};
pub use coordinate::{Cell, TargetCoordinate};
pub use engine::{AlignedCore, Alignment, AlignmentEngine};
