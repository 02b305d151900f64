//! Viewer configuration
//!
//! Endpoints, parsing conventions and chart geometry. Nothing here is a
//! global: a [`Config`] is built once in `main` (defaults, then an optional
//! JSON file, then CLI flags) and handed to whoever needs it.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/plugin/octoprint_accelerometer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugin blueprint URL, e.g. `http://octopi.local/plugin/octoprint_accelerometer`
    pub base_url: String,
    /// Path of the listing endpoint below `base_url`
    pub listing_path: String,
    /// Path of the file download endpoint below `base_url`
    pub download_path: String,
    /// OctoPrint API key, sent as `X-Api-Key`
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub data: DataFormat,
    pub tree: TreeStyle,
    pub chart: ChartConfig,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            listing_path: "get_data_listing".to_string(),
            download_path: "download".to_string(),
            api_key: None,
            timeout_secs: 30,
            data: DataFormat::default(),
            tree: TreeStyle::default(),
            chart: ChartConfig::default(),
            port: 3002,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn listing_url(&self) -> String {
        self.endpoint(&self.listing_path)
    }

    pub fn download_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.endpoint(&self.download_path), file_name)
    }
}

/// Conventions of the plugin's delimited text files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFormat {
    pub delimiter: char,
    pub comment_marker: char,
    /// Tag in front of the numeric sample rate, e.g. `ODR` in `"ODR800"`
    pub rate_prefix: String,
}

impl Default for DataFormat {
    fn default() -> Self {
        Self {
            delimiter: ' ',
            comment_marker: '#',
            rate_prefix: "ODR".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeStyle {
    pub row_height: f64,
    pub width: f64,
}

impl Default for TreeStyle {
    fn default() -> Self {
        Self { row_height: 17.0, width: 360.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    /// Allowed zoom factors, `[min, max]`
    pub scale_extent: [f64; 2],
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 400.0,
            margin_top: 20.0,
            margin_right: 20.0,
            margin_bottom: 30.0,
            margin_left: 40.0,
            scale_extent: [1.0, 32.0],
        }
    }
}

impl ChartConfig {
    /// Pixel range of the domain (horizontal) axis
    pub fn domain_range(&self) -> [f64; 2] {
        [self.margin_left, self.width - self.margin_right]
    }

    /// Pixel range of the value (vertical) axis, bottom to top
    pub fn value_range(&self) -> [f64; 2] {
        [self.height - self.margin_bottom, self.margin_top]
    }

    pub fn domain_ticks(&self) -> usize {
        ((self.width / 80.0) as usize).max(2)
    }

    pub fn value_ticks(&self) -> usize {
        ((self.height / 40.0) as usize).max(2)
    }
}
