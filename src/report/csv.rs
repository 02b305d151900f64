//! CSV report: one row per plotted point

use crate::chart::SeriesSet;
use crate::report::ReportData;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, data: &ReportData) -> io::Result<()> {
    writeln!(writer, "stream,file,chart,series,domain,value")?;

    for stream in &data.streams {
        for set in [stream.acceleration.data(), stream.fft.data()] {
            write_set(writer, stream.index, &stream.selection.file_name, set)?;
        }
    }

    Ok(())
}

fn write_set<W: Write>(writer: &mut W, index: usize, file: &str, set: &SeriesSet) -> io::Result<()> {
    let file = escape_field(file);
    for series in &set.series {
        for (domain, value) in set.domain.iter().zip(&series.values) {
            if !(domain.is_finite() && value.is_finite()) {
                continue;
            }
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                index,
                file,
                set.kind.id(),
                escape_field(&series.name),
                domain,
                value
            )?;
        }
    }
    Ok(())
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
