//! Core stacks: aligned profiles of many cores for one variable.

mod selection;
mod stack;

pub use selection::Selection;
pub use stack::{CoreStack, ProvenanceCounts};
