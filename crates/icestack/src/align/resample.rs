//! Per-profile resampling onto a target coordinate.
//!
//! Everything here is a pure function of one profile, the coordinate and
//! the configuration. Values are never extrapolated past the sampled
//! extent of the profile.

use crate::profile::{Profile, Provenance, Sample};

use super::aligned::AlignedValue;
use super::config::{AlignConfig, InterpolationMode};
use super::coordinate::{Cell, TargetCoordinate};

/// Resample `profile` onto every cell of `coordinate`.
pub(crate) fn resample(
    profile: &Profile,
    coordinate: &TargetCoordinate,
    config: &AlignConfig,
) -> Vec<AlignedValue> {
    let samples = profile.samples();
    let (Some(first), Some(last)) = (samples.first(), samples.last()) else {
        return vec![AlignedValue::out_of_range(); coordinate.cell_count()];
    };

    let support = Support {
        samples: &samples,
        extent: (first.top, last.bottom),
        sections: profile.support().is_sections(),
        config,
    };

    coordinate
        .cells()
        .map(|cell| {
            if cell.is_point() {
                support.at(cell.top)
            } else if support.sections {
                support.rebin(cell)
            } else {
                support.bin_points(cell)
            }
        })
        .collect()
}

struct Support<'a> {
    samples: &'a [Sample],
    extent: (f64, f64),
    sections: bool,
    config: &'a AlignConfig,
}

impl Support<'_> {
    fn tol(&self) -> f64 {
        self.config.match_tolerance
    }

    fn outside(&self, depth: f64) -> bool {
        depth < self.extent.0 - self.tol() || depth > self.extent.1 + self.tol()
    }

    /// Value at a single depth.
    fn at(&self, depth: f64) -> AlignedValue {
        if self.outside(depth) {
            return AlignedValue::out_of_range();
        }
        if self.sections {
            self.section_at(depth)
        } else {
            self.point_at(depth)
        }
    }

    fn point_at(&self, depth: f64) -> AlignedValue {
        let samples = self.samples;
        let next = samples.partition_point(|s| s.top < depth);

        // Coincident sample on either side of the insertion point.
        let candidates = [next.checked_sub(1), Some(next)];
        let matched = candidates
            .into_iter()
            .flatten()
            .filter_map(|i| samples.get(i))
            .filter(|s| (s.top - depth).abs() <= self.tol())
            .min_by(|a, b| (a.top - depth).abs().total_cmp(&(b.top - depth).abs()));
        if let Some(sample) = matched {
            return AlignedValue::new(sample.value, sample.validity);
        }

        match (next.checked_sub(1).and_then(|i| samples.get(i)), samples.get(next)) {
            (Some(above), Some(below)) => self.bridge(depth, above, above.top, below, below.top),
            _ => AlignedValue::out_of_range(),
        }
    }

    fn section_at(&self, depth: f64) -> AlignedValue {
        let samples = self.samples;
        // Deepest section starting at or above `depth`; shared boundaries
        // resolve to the lower section.
        let Some(index) = samples.iter().rposition(|s| s.top - self.tol() <= depth) else {
            return AlignedValue::out_of_range();
        };
        let section = &samples[index];
        if depth <= section.bottom + self.tol() {
            return AlignedValue::new(section.value, section.validity);
        }
        match samples.get(index + 1) {
            Some(below) => self.bridge(depth, section, section.center(), below, below.center()),
            None => AlignedValue::out_of_range(),
        }
    }

    /// Fill `depth` strictly between two usable samples.
    fn bridge(
        &self,
        depth: f64,
        above: &Sample,
        above_depth: f64,
        below: &Sample,
        below_depth: f64,
    ) -> AlignedValue {
        let separation = below_depth - above_depth;
        if separation > self.config.max_gap || separation <= 0.0 {
            return AlignedValue::missing();
        }
        match self.config.interpolation {
            InterpolationMode::Linear => {
                let fraction = ((depth - above_depth) / separation).clamp(0.0, 1.0);
                AlignedValue::interpolated(above.value + (below.value - above.value) * fraction)
            }
            InterpolationMode::Nearest => {
                if depth - above_depth <= below_depth - depth {
                    AlignedValue::interpolated(above.value)
                } else {
                    AlignedValue::interpolated(below.value)
                }
            }
            InterpolationMode::None => AlignedValue::missing(),
        }
    }

    /// Point samples onto a bin: evaluated at the bin midpoint.
    fn bin_points(&self, cell: Cell) -> AlignedValue {
        if let [only] = self.samples {
            if only.top >= cell.top - self.tol() && only.top <= cell.bottom + self.tol() {
                return AlignedValue::new(only.value, only.validity);
            }
        }
        self.at(cell.center())
    }

    /// Section samples onto a bin: length-weighted mean of the overlap.
    ///
    /// Without interpolation only a bin inside one section gets a value.
    fn rebin(&self, cell: Cell) -> AlignedValue {
        let center = cell.center();
        if self.outside(center) {
            return AlignedValue::out_of_range();
        }

        let mut weighted = 0.0;
        let mut covered = 0.0;
        let mut contributing: Vec<&Sample> = Vec::new();
        for sample in self.samples {
            let overlap = sample.bottom.min(cell.bottom) - sample.top.max(cell.top);
            if overlap > self.tol() {
                weighted += overlap * sample.value;
                covered += overlap;
                contributing.push(sample);
            }
        }

        let interpolates = self.config.interpolation != InterpolationMode::None;
        if contributing.is_empty() {
            // Bin lies inside a hole between sections.
            if !interpolates {
                return AlignedValue::missing();
            }
            return self.section_at(center);
        }
        if covered / cell.thickness() + f64::EPSILON < self.config.min_coverage {
            return AlignedValue::missing();
        }

        if let [only] = contributing.as_slice() {
            if only.top <= cell.top + self.tol() && only.bottom >= cell.bottom - self.tol() {
                return AlignedValue::new(only.value, only.validity);
            }
        }

        if !interpolates {
            return AlignedValue::missing();
        }
        AlignedValue::new(weighted / covered, Provenance::Interpolated)
    }
}
