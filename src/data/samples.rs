//! Acceleration stream files
//!
//! ```text
//! seq sample x y z
//! 0 0 -12 4 1002
//! 0 1 -10 6 998
//! ...
//! # {"rate": "ODR800", "range": "RANGE2G", ...}
//! ```
//!
//! The sample rate only exists in the trailing comment record, which is
//! written when a stream completes. Timestamps are
//! `sample * 1000 / rate` milliseconds.

use super::parse_table;
use crate::config::DataFormat;
use crate::Result;
use log::warn;
use serde::Serialize;
use serde_json::{Map, Value};

/// How many trailing lines may hold the metadata record
const METADATA_SEARCH_LINES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub sequence_number: f64,
    pub sample_index: f64,
    pub timestamp_ms: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamMetadata {
    /// Output data rate in Hz, when the `rate` field parsed
    pub rate_hz: Option<f64>,
    /// The whole record as written by the device
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccelerationData {
    pub samples: Vec<Sample>,
    pub metadata: Option<StreamMetadata>,
}

impl AccelerationData {
    pub fn rate_hz(&self) -> Option<f64> {
        self.metadata.as_ref().and_then(|m| m.rate_hz)
    }
}

/// Find and parse the trailing `# {...}` record
pub fn parse_metadata(text: &str, format: &DataFormat) -> Option<StreamMetadata> {
    let tail = text
        .lines()
        .rev()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(METADATA_SEARCH_LINES);

    for line in tail {
        let Some(body) = line.strip_prefix(format.comment_marker) else {
            continue;
        };
        match serde_json::from_str::<Map<String, Value>>(body.trim()) {
            Ok(fields) => {
                let rate_hz = fields.get("rate").and_then(|r| parse_rate(r, &format.rate_prefix));
                if rate_hz.is_none() {
                    warn!("stream metadata has no usable rate: {:?}", fields.get("rate"));
                }
                return Some(StreamMetadata { rate_hz, fields });
            }
            Err(e) => warn!("failed to parse stream metadata: {}", e),
        }
    }
    None
}

/// `"ODR800"` → 800.0 with prefix `ODR`; plain numbers pass through
pub fn parse_rate(rate: &Value, prefix: &str) -> Option<f64> {
    let hz = match rate {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            s.strip_prefix(prefix).unwrap_or(s).trim().parse::<f64>().ok()?
        }
        _ => return None,
    };
    (hz.is_finite() && hz > 0.0).then_some(hz)
}

/// Parse a complete acceleration stream file
pub fn parse_stream(text: &str, format: &DataFormat) -> Result<AccelerationData> {
    let table = parse_table(text, format)?;
    let seq = table.column("seq")?;
    let sample = table.column("sample")?;
    let (x, y, z) = (table.column("x")?, table.column("y")?, table.column("z")?);

    let metadata = parse_metadata(text, format);
    let rate_hz = metadata.as_ref().and_then(|m| m.rate_hz);
    if rate_hz.is_none() {
        warn!("no sample rate in stream, using sample index as time axis");
    }

    let samples = table
        .rows
        .iter()
        .map(|row| Sample {
            sequence_number: row[seq],
            sample_index: row[sample],
            timestamp_ms: match rate_hz {
                Some(rate) => row[sample] * 1000.0 / rate,
                None => row[sample],
            },
            x: row[x],
            y: row[y],
            z: row[z],
        })
        .collect();

    Ok(AccelerationData { samples, metadata })
}
