//! Secondary properties derived from aligned variables of one core.

mod derive;
mod function;

pub use derive::{derive, derive_into};
pub use function::{FnProperty, PropertyFunction};
