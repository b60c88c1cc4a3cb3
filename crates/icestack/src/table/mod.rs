//! Long-format delimited export of stacks and aggregates.
//!
//! One record per (core, cell) for a stack and one per (cell, statistic)
//! for an aggregate. Missing values are empty fields.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregateProfile;
use crate::error::Result;
use crate::profile::Provenance;
use crate::stack::CoreStack;

/// Configuration for table export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Field delimiter.
    pub delimiter: u8,
    /// Write a header record first.
    pub has_header: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    fn writer<W: Write>(&self, sink: W) -> csv::Writer<W> {
        csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .from_writer(sink)
    }
}

#[derive(Serialize)]
struct StackRecord<'a> {
    core_id: &'a str,
    variable: &'a str,
    unit: Option<&'a str>,
    cell: usize,
    top: f64,
    bottom: f64,
    value: Option<f64>,
    provenance: Provenance,
}

#[derive(Serialize)]
struct AggregateRecord<'a> {
    variable: &'a str,
    unit: Option<&'a str>,
    cell: usize,
    top: f64,
    bottom: f64,
    statistic: String,
    value: Option<f64>,
    count: usize,
    interpolated: usize,
    contributors: String,
}

/// Write a stack as comma-separated records with a header.
pub fn write_stack<W: Write>(stack: &CoreStack, sink: W) -> Result<()> {
    write_stack_with(stack, sink, &TableConfig::default())
}

pub fn write_stack_with<W: Write>(stack: &CoreStack, sink: W, config: &TableConfig) -> Result<()> {
    let mut writer = config.writer(sink);
    for row in stack.rows() {
        for (index, (cell, entry)) in stack.coordinate().cells().zip(row.iter()).enumerate() {
            writer.serialize(StackRecord {
                core_id: row.core_id(),
                variable: stack.variable(),
                unit: row.unit().or(stack.unit()),
                cell: index,
                top: cell.top,
                bottom: cell.bottom,
                value: entry.value.as_f64(),
                provenance: entry.provenance,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write an aggregate as comma-separated records with a header.
///
/// Contributors are joined with `;`.
pub fn write_aggregate<W: Write>(aggregate: &AggregateProfile, sink: W) -> Result<()> {
    write_aggregate_with(aggregate, sink, &TableConfig::default())
}

pub fn write_aggregate_with<W: Write>(
    aggregate: &AggregateProfile,
    sink: W,
    config: &TableConfig,
) -> Result<()> {
    let mut writer = config.writer(sink);
    for (index, (cell, bin)) in aggregate.iter().enumerate() {
        let contributors = bin.contributors.join(";");
        for (statistic, value) in aggregate.statistics().iter().zip(&bin.values) {
            writer.serialize(AggregateRecord {
                variable: aggregate.variable(),
                unit: aggregate.unit(),
                cell: index,
                top: cell.top,
                bottom: cell.bottom,
                statistic: statistic.to_string(),
                value: value.as_f64(),
                count: bin.count,
                interpolated: bin.interpolated,
                contributors: contributors.clone(),
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{AggregateConfig, Aggregator, Statistic};
    use crate::align::{AlignmentEngine, TargetCoordinate};
    use crate::profile::{Core, CoreMetadata, ProfileData};

    fn stack() -> CoreStack {
        let cores = vec![
            Core::new("A", CoreMetadata::new())
                .with_profile("salinity", ProfileData::points(vec![0.0, 0.1], vec![5.0, 6.0]).with_unit("psu"))
                .unwrap(),
            Core::new("B", CoreMetadata::new())
                .with_profile("salinity", ProfileData::points(vec![0.1], vec![7.0]))
                .unwrap(),
        ];
        let target = TargetCoordinate::points(vec![0.0, 0.1]).unwrap();
        CoreStack::build(&AlignmentEngine::new(), "salinity", &cores, Some(&target)).unwrap()
    }

    #[test]
    fn test_write_stack() {
        let mut out = Vec::new();
        write_stack(&stack(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "core_id,variable,unit,cell,top,bottom,value,provenance");
        assert_eq!(lines[1], "A,salinity,psu,0,0.0,0.0,5.0,measured");
        assert_eq!(lines[3], "B,salinity,psu,0,0.0,0.0,,out_of_range");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_write_aggregate() {
        let config = AggregateConfig::new().with_statistics([Statistic::Mean, Statistic::Count]);
        let aggregate = Aggregator::with_config(config).aggregate(&stack()).unwrap();
        let mut out = Vec::new();
        write_aggregate(&aggregate, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "variable,unit,cell,top,bottom,statistic,value,count,interpolated,contributors"
        );
        assert_eq!(lines[1], "salinity,psu,0,0.0,0.0,mean,5.0,1,0,A");
        assert_eq!(lines[3], "salinity,psu,1,0.1,0.1,mean,6.5,2,0,A;B");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_custom_delimiter_without_header() {
        let config = TableConfig::new().with_delimiter(b'\t').with_header(false);
        let mut out = Vec::new();
        write_stack_with(&stack(), &mut out, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("A\tsalinity\tpsu\t0\t"));
        assert_eq!(text.lines().count(), 4);
    }
}
