//! Per-axis FFT files and the three-axis merge

use super::parse_table;
use crate::config::DataFormat;
use crate::Result;
use log::warn;
use serde::Serialize;

/// One row of a single-axis FFT file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FftPoint {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

/// One frequency bin with the magnitude of all three axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FftSample {
    pub frequency_hz: f64,
    pub magnitude_x: f64,
    pub magnitude_y: f64,
    pub magnitude_z: f64,
}

/// Parse a `freq_hz fft` file
pub fn parse_fft(text: &str, format: &DataFormat) -> Result<Vec<FftPoint>> {
    let table = parse_table(text, format)?;
    let freq = table.column("freq_hz")?;
    let fft = table.column("fft")?;
    Ok(table
        .rows
        .iter()
        .map(|row| FftPoint { frequency_hz: row[freq], magnitude: row[fft] })
        .collect())
}

/// Zip three axes by position
///
/// All three files are expected to share one frequency column. The merge
/// stops at the first bin where they disagree, or where one of them ends,
/// so all three series always come out with the same length.
pub fn merge_axes(x: &[FftPoint], y: &[FftPoint], z: &[FftPoint]) -> Vec<FftSample> {
    if x.len() != y.len() || y.len() != z.len() {
        warn!("fft length mismatch: x={} y={} z={}", x.len(), y.len(), z.len());
    }

    let mut merged = Vec::with_capacity(x.len().min(y.len()).min(z.len()));
    for (i, ((px, py), pz)) in x.iter().zip(y).zip(z).enumerate() {
        if px.frequency_hz != py.frequency_hz || py.frequency_hz != pz.frequency_hz {
            warn!(
                "fft mismatch at bin {}: x={}Hz y={}Hz z={}Hz",
                i, px.frequency_hz, py.frequency_hz, pz.frequency_hz
            );
            break;
        }
        merged.push(FftSample {
            frequency_hz: px.frequency_hz,
            magnitude_x: px.magnitude,
            magnitude_y: py.magnitude,
            magnitude_z: pz.magnitude,
        });
    }
    merged
}
