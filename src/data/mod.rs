//! Parsers for the plugin's delimited text files
//!
//! - [`samples`]: acceleration streams (`seq sample x y z` plus a trailing
//!   `# {...}` metadata line carrying the sensor output data rate)
//! - [`fft`]: per-axis FFT files (`freq_hz fft`) and the three-axis merge
//! - [`spectrum`]: local FFT of a stream for recordings without FFT files

pub mod fft;
pub mod samples;
pub mod spectrum;

pub use fft::{merge_axes, parse_fft, FftPoint, FftSample};
pub use samples::{parse_stream, AccelerationData, Sample, StreamMetadata};

use crate::config::DataFormat;
use crate::{Error, Result};
use log::warn;

/// Header plus numeric rows of a delimited file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    /// Position of a named column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::MalformedTable {
                line: 1,
                reason: format!("missing column '{}' (have: {})", name, self.columns.join(", ")),
            })
    }
}

/// Parse a header row and numeric data rows
///
/// Comment lines and blank lines are ignored. Rows with the wrong number of
/// fields or unparsable numbers are dropped with a warning; streams that were
/// cut off mid-recording end in such a row.
pub fn parse_table(text: &str, format: &DataFormat) -> Result<Table> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with(format.comment_marker));

    let (_, header) = lines.next().ok_or(Error::MalformedTable {
        line: 1,
        reason: "no header row".to_string(),
    })?;
    let columns: Vec<String> = split(header, format.delimiter).map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = split(line, format.delimiter).collect();
        if fields.len() != columns.len() {
            warn!("line {}: expected {} fields, got {}", line_no, columns.len(), fields.len());
            continue;
        }
        match fields.iter().map(|f| f.parse::<f64>()).collect::<std::result::Result<Vec<_>, _>>() {
            Ok(row) => rows.push(row),
            Err(e) => warn!("line {}: {}", line_no, e),
        }
    }

    Ok(Table { columns, rows })
}

fn split(line: &str, delimiter: char) -> impl Iterator<Item = &str> {
    line.split(delimiter).map(str::trim).filter(|f| !f.is_empty())
}
