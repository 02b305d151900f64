//! Recording control surface of the plugin
//!
//! Sweep parameters as exchanged with `get_parameters` / `set_values`, the
//! duration estimate, and the push messages the plugin emits while recording
//! and post-processing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names accepted by `set_values`
pub const PARAMETER_NAMES: &[&str] = &[
    "do_sample_x",
    "do_sample_y",
    "do_sample_z",
    "step_count",
    "sequence_count",
    "distance_x_mm",
    "distance_y_mm",
    "distance_z_mm",
    "speed_x_mm_s",
    "speed_y_mm_s",
    "speed_z_mm_s",
    "acceleration_x_mm_ss",
    "acceleration_y_mm_ss",
    "acceleration_z_mm_ss",
    "start_frequency_hz",
    "stop_frequency_hz",
    "step_frequency_hz",
    "start_zeta_em2",
    "stop_zeta_em2",
    "step_zeta_em2",
    "recording_timespan_s",
    "sequence_separation_s",
    "step_separation_s",
    "sensor_output_data_rate_hz",
    "auto_home",
    "go_start",
    "return_start",
    "data_remove_before_run",
    "do_dry_run",
];

/// Sweep settings; every field is optional since the plugin may answer
/// with a subset (`get_parameters?v=...`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample_x: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample_y: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_sample_z: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_x_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_y_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_z_mm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_x_mm_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_y_mm_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_z_mm_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_x_mm_ss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_y_mm_ss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acceleration_z_mm_ss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_frequency_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_zeta_em2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_zeta_em2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_zeta_em2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording_timespan_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_separation_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_separation_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensor_output_data_rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_home: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_start: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_remove_before_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_dry_run: Option<bool>,

    // read-only, reported by the plugin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices_seen: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl Parameters {
    /// Frequency steps of the sweep, when start/stop/step are all known
    pub fn frequency_steps(&self) -> Option<i64> {
        effective_steps(self.start_frequency_hz?, self.stop_frequency_hz?, self.step_frequency_hz?)
    }

    /// Damping steps of the sweep
    pub fn zeta_steps(&self) -> Option<i64> {
        effective_steps(self.start_zeta_em2?, self.stop_zeta_em2?, self.step_zeta_em2?)
    }

    /// Device the plugin currently records from, `-` when none
    pub fn device_label(&self) -> &str {
        self.device.as_deref().unwrap_or("-")
    }
}

/// Reply of `get_parameters`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParametersResponse {
    pub parameters: Parameters,
    pub estimate: Option<f64>,
}

/// Reply of `get_estimate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Estimate {
    /// Expected recording duration in seconds
    pub estimate: Option<f64>,
}

/// Number of whole steps between `start` and `stop`
///
/// `None` for a zero, negative or non-finite increment.
pub fn effective_steps(start: f64, stop: f64, increment: f64) -> Option<i64> {
    if !increment.is_finite() || increment <= 0.0 {
        return None;
    }
    let steps = ((stop - start) / increment).floor();
    steps.is_finite().then_some(steps as i64)
}

/// `65.0` → `"1m 5.0s"`; empty parts are left out, so `60.0` → `"1m"`
pub fn seconds_to_readable(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return String::new();
    }
    let minutes = (seconds / 60.0).floor();
    let rest = format!("{:.1}", seconds - minutes * 60.0);

    let mut parts = Vec::new();
    if minutes > 0.0 {
        parts.push(format!("{}m", minutes));
    }
    if rest.parse::<f64>().map_or(false, |r| r > 0.0) {
        parts.push(format!("{}s", rest));
    }
    parts.join(" ")
}

/// Parse `name=value` assignments for `set_values`
///
/// Values are read as JSON where possible (`true`, `10`, `0.5`) and as
/// plain strings otherwise. Unknown names are rejected.
pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Map<String, Value>> {
    let mut values = Map::new();
    for item in assignments {
        let item = item.as_ref();
        let (name, raw) = item
            .split_once('=')
            .ok_or_else(|| Error::BadRequest(format!("expected name=value, got '{}'", item)))?;
        let name = name.trim();
        if !PARAMETER_NAMES.contains(&name) {
            return Err(Error::BadRequest(format!("unknown parameter '{}'", name)));
        }
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        values.insert(name.to_string(), value);
    }

    // type check against the known fields
    serde_json::from_value::<Parameters>(Value::Object(values.clone()))
        .map_err(|e| Error::BadRequest(e.to_string()))?;
    Ok(values)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingEventType {
    Starting,
    Processing,
    ProcessingFinished,
    FifoOverrun,
    UnhandledException,
    Aborting,
    Aborted,
}

impl RecordingEventType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Starting => 1,
            Self::Processing => 2,
            Self::ProcessingFinished => 3,
            Self::FifoOverrun => 11,
            Self::UnhandledException => 12,
            Self::Aborting => 21,
            Self::Aborted => 22,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Starting,
            2 => Self::Processing,
            3 => Self::ProcessingFinished,
            11 => Self::FifoOverrun,
            12 => Self::UnhandledException,
            21 => Self::Aborting,
            22 => Self::Aborted,
            _ => return None,
        })
    }

    pub fn is_exceptional(&self) -> bool {
        matches!(self, Self::FifoOverrun | Self::UnhandledException)
    }

    /// A recording that ended this way leaves files to post-process
    pub fn triggers_processing(&self) -> bool {
        matches!(self, Self::ProcessingFinished | Self::UnhandledException | Self::Aborted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataProcessingEventType {
    Starting,
    Processing,
    ProcessingFinished,
    UnhandledException,
    Aborting,
    Aborted,
}

impl DataProcessingEventType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Starting => 1,
            Self::Processing => 2,
            Self::ProcessingFinished => 3,
            Self::UnhandledException => 12,
            Self::Aborting => 21,
            Self::Aborted => 22,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Starting,
            2 => Self::Processing,
            3 => Self::ProcessingFinished,
            12 => Self::UnhandledException,
            21 => Self::Aborting,
            22 => Self::Aborted,
            _ => return None,
        })
    }
}

/// Plugin push message; any subset of the keys may be present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushMessage {
    #[serde(rename = "RecordingEventType", deserialize_with = "event_name_or_code")]
    pub recording_event: Option<RecordingEventType>,
    #[serde(rename = "DataProcessingEventType", deserialize_with = "event_name_or_code")]
    pub processing_event: Option<DataProcessingEventType>,
    #[serde(rename = "LAST_DATA_RECORDING_DURATION_S")]
    pub last_recording_duration_s: Option<f64>,
    #[serde(rename = "LAST_DATA_PROCESSING_DURATION_S")]
    pub last_processing_duration_s: Option<f64>,
    #[serde(rename = "FILES_TOTAL_COUNT")]
    pub files_total: Option<u64>,
    #[serde(rename = "FILES_PROCESSED_COUNT")]
    pub files_processed: Option<u64>,
    #[serde(rename = "FILES_SKIPPED_COUNT")]
    pub files_skipped: Option<u64>,
}

trait EventCode: Sized {
    fn from_code(code: u8) -> Option<Self>;
}

impl EventCode for RecordingEventType {
    fn from_code(code: u8) -> Option<Self> {
        RecordingEventType::from_code(code)
    }
}

impl EventCode for DataProcessingEventType {
    fn from_code(code: u8) -> Option<Self> {
        DataProcessingEventType::from_code(code)
    }
}

/// Events arrive by name (`"ABORTED"`) or by numeric value (`22`)
fn event_name_or_code<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned + EventCode,
{
    use serde::de::Error as _;
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => {
            let code = n.as_u64().and_then(|c| u8::try_from(c).ok());
            code.and_then(T::from_code)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown event code {}", n)))
        }
        other => serde_json::from_value(other).map(Some).map_err(D::Error::custom),
    }
}

impl PushMessage {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether the viewer should request data processing now
    pub fn wants_processing(&self) -> bool {
        self.recording_event.map_or(false, |e| e.triggers_processing())
    }

    /// One-line status summary
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(e) = self.recording_event {
            parts.push(format!("recording: {:?}", e));
        }
        if let Some(e) = self.processing_event {
            parts.push(format!("processing: {:?}", e));
        }
        if let Some(s) = self.last_recording_duration_s {
            parts.push(format!("recorded in {}", seconds_to_readable(s)));
        }
        if let Some(s) = self.last_processing_duration_s {
            parts.push(format!("processed in {}", seconds_to_readable(s)));
        }
        if let Some(total) = self.files_total {
            parts.push(format!(
                "files {}/{} ({} skipped)",
                self.files_processed.unwrap_or(0),
                total,
                self.files_skipped.unwrap_or(0)
            ));
        }
        parts.join(", ")
    }
}
