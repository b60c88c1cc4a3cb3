//! Pluggable property functions.

use std::fmt;

/// A secondary property computed cell by cell from aligned variables.
///
/// Implementations are pure: the same inputs always give the same output.
pub trait PropertyFunction {
    /// Name of the derived variable.
    fn name(&self) -> &str;

    /// Input variables, in the order `compute` receives them.
    fn inputs(&self) -> &[String];

    /// Unit of the derived variable.
    fn unit(&self) -> Option<&str> {
        None
    }

    /// Compute the property from one cell's input values.
    ///
    /// Only called when every input is present. `None` marks the result
    /// undefined (outside the equation's validity range, for example).
    fn compute(&self, inputs: &[f64]) -> Option<f64>;
}

/// Adapts a closure into a [`PropertyFunction`].
pub struct FnProperty<F> {
    name: String,
    inputs: Vec<String>,
    unit: Option<String>,
    function: F,
}

impl<F> FnProperty<F>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        inputs: impl IntoIterator<Item = S>,
        function: F,
    ) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
            unit: None,
            function,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl<F> PropertyFunction for FnProperty<F>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> &[String] {
        &self.inputs
    }

    fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    fn compute(&self, inputs: &[f64]) -> Option<f64> {
        (self.function)(inputs)
    }
}

impl<F> fmt::Debug for FnProperty<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProperty")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("unit", &self.unit)
            .finish_non_exhaustive()
    }
}
