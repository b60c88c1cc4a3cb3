//! Element-wise derivation of properties on an aligned core.

use tracing::debug;

use crate::align::{AlignedCore, AlignedProfile, AlignedValue};
use crate::error::{IceStackError, Result};
use crate::profile::Provenance;

use super::function::PropertyFunction;

/// Compute `property` in every cell of `core`.
///
/// Each output cell carries the combined provenance of its inputs. A cell
/// with any unusable input is missing (or out of range), and so is a cell
/// where the function returns `None` or a non-finite number.
pub fn derive(core: &AlignedCore, property: &dyn PropertyFunction) -> Result<AlignedProfile> {
    if property.inputs().is_empty() {
        return Err(IceStackError::InvalidConfig(format!(
            "property '{}' declares no inputs",
            property.name()
        )));
    }

    let inputs: Vec<&AlignedProfile> = property
        .inputs()
        .iter()
        .map(|variable| {
            core.profile(variable).ok_or_else(|| {
                IceStackError::NoData(format!(
                    "property '{}' needs '{}', which core '{}' was not aligned with",
                    property.name(),
                    variable,
                    core.core_id()
                ))
            })
        })
        .collect::<Result<_>>()?;

    let mut arguments = Vec::with_capacity(inputs.len());
    let values = (0..core.cell_count())
        .map(|cell| {
            arguments.clear();
            let mut provenance = Provenance::Measured;
            for input in &inputs {
                let entry = input.get(cell).copied().unwrap_or_else(AlignedValue::out_of_range);
                provenance = provenance.combine(entry.provenance);
                if let Some(v) = entry.value.as_f64() {
                    arguments.push(v);
                }
            }
            match provenance {
                Provenance::OutOfRange => AlignedValue::out_of_range(),
                Provenance::Missing => AlignedValue::missing(),
                usable => match property.compute(&arguments) {
                    Some(v) => AlignedValue::new(v, usable),
                    None => AlignedValue::missing(),
                },
            }
        })
        .collect();

    debug!(
        core = core.core_id(),
        property = property.name(),
        inputs = inputs.len(),
        "derived property"
    );

    Ok(AlignedProfile::new(
        core.core_id(),
        property.name(),
        property.unit().map(str::to_string),
        shared_extent(&inputs),
        values,
    ))
}

/// Derive `property` and add it to `core`, so later properties can use it.
pub fn derive_into(mut core: AlignedCore, property: &dyn PropertyFunction) -> Result<AlignedCore> {
    let derived = derive(&core, property)?;
    core.insert(derived)?;
    Ok(core)
}

/// Depth range covered by every input.
fn shared_extent(inputs: &[&AlignedProfile]) -> Option<(f64, f64)> {
    let mut extent: Option<(f64, f64)> = None;
    for input in inputs {
        let (top, bottom) = input.extent()?;
        extent = Some(match extent {
            Some((t, b)) => (t.max(top), b.min(bottom)),
            None => (top, bottom),
        });
    }
    extent.filter(|(top, bottom)| top <= bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignConfig, AlignmentEngine, TargetCoordinate};
    use crate::profile::{Core, CoreMetadata, ProfileData, Value};
    use crate::property::FnProperty;

    fn aligned() -> AlignedCore {
        let core = Core::new("BRW-2", CoreMetadata::new())
            .with_profile(
                "temperature",
                ProfileData::points(vec![0.0, 0.2, 0.4], vec![-10.0, -6.0, -2.0]).with_unit("degC"),
            )
            .unwrap()
            .with_profile(
                "salinity",
                ProfileData::sections(vec![0.0, 0.1], vec![0.1, 0.3], vec![8.0, 5.0]).with_unit("psu"),
            )
            .unwrap();
        let target = TargetCoordinate::points(vec![0.0, 0.1, 0.2, 0.4]).unwrap();
        AlignmentEngine::with_config(AlignConfig::new().with_max_gap(0.5))
            .align_core(&core, &["temperature", "salinity"], Some(&target))
            .unwrap()
    }

    fn ratio() -> FnProperty<impl Fn(&[f64]) -> Option<f64>> {
        FnProperty::new("ratio", ["salinity", "temperature"], |x: &[f64]| {
            (x[1] != 0.0).then(|| x[0] / -x[1])
        })
    }

    #[test]
    fn test_elementwise_with_combined_provenance() {
        let derived = derive(&aligned(), &ratio()).unwrap();
        assert_eq!(derived.variable(), "ratio");
        assert_eq!(derived.core_id(), "BRW-2");
        assert_eq!(derived.get(0), Some(&AlignedValue::measured(0.8)));
        // temperature at 0.1 is interpolated between 0.0 and 0.2
        assert_eq!(derived.get(1).map(|v| v.provenance), Some(Provenance::Interpolated));
        assert_eq!(derived.get(2), Some(&AlignedValue::measured(5.0 / 6.0)));
        // salinity ends at 0.3
        assert_eq!(derived.get(3), Some(&AlignedValue::out_of_range()));
        assert_eq!(derived.extent(), Some((0.0, 0.3)));
    }

    #[test]
    fn test_undefined_result_is_missing() {
        let never = FnProperty::new("never", ["temperature"], |_: &[f64]| None);
        let derived = derive(&aligned(), &never).unwrap();
        assert_eq!(derived.values(), vec![Value::Missing; 4]);
        assert_eq!(derived.count(Provenance::Missing), 4);
    }

    #[test]
    fn test_unaligned_input_rejected() {
        let bad = FnProperty::new("bad", ["density"], |x: &[f64]| Some(x[0]));
        assert!(matches!(derive(&aligned(), &bad), Err(IceStackError::NoData(_))));

        let empty = FnProperty::new("empty", Vec::<String>::new(), |_: &[f64]| Some(1.0));
        assert!(matches!(derive(&aligned(), &empty), Err(IceStackError::InvalidConfig(_))));
    }

    #[test]
    fn test_derived_values_chain() {
        let core = derive_into(aligned(), &ratio()).unwrap();
        let doubled = FnProperty::new("doubled", ["ratio"], |x: &[f64]| Some(2.0 * x[0]));
        let core = derive_into(core, &doubled).unwrap();
        assert_eq!(
            core.profile("doubled").unwrap().get(0),
            Some(&AlignedValue::measured(1.6))
        );

        let err = derive_into(core, &ratio()).unwrap_err();
        assert!(matches!(err, IceStackError::DuplicateVariable { .. }));
    }
}
