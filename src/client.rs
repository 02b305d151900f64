//! Where listings and data files come from
//!
//! [`DataSource`] is the seam between the viewer and its collaborator:
//! - [`PluginClient`] talks to the plugin's HTTP API (blocking `reqwest`)
//! - [`DirSource`] reads a directory of recorded `.tsv` files and builds the
//!   listing from their file names
//! - [`MemorySource`] serves fixed content
//!
//! The fetch helpers at the bottom turn a [`StreamSelection`] into parsed
//! chart input; the three FFT downloads of a stream run in parallel.

use crate::config::{Config, DataFormat};
use crate::control::{Estimate, ParametersResponse};
use crate::data::{self, AccelerationData, FftSample};
use crate::hierarchy::{FftFiles, StreamSelection, Timestamp};
use crate::{Error, Result};
use log::{debug, warn};
use rayon::prelude::*;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub trait DataSource: Sync {
    /// Nested run → sequence → stream → fft listing
    fn listing(&self) -> Result<Value>;

    /// Raw text of one data file
    fn download(&self, file_name: &str) -> Result<String>;

    /// Where the data comes from, for banners and report headers
    fn describe(&self) -> String {
        "data source".to_string()
    }
}

// ============================================================================
// PLUGIN HTTP API
// ============================================================================

/// Which flat file listing to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilesListing {
    All,
    Streams,
    Ffts,
}

impl FilesListing {
    fn path(&self) -> &'static str {
        match self {
            FilesListing::All => "get_files_listing",
            FilesListing::Streams => "get_stream_files_listing",
            FilesListing::Ffts => "get_fft_files_listing",
        }
    }
}

pub struct PluginClient {
    config: Config,
    http: Client,
}

impl PluginClient {
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(key)
                .map_err(|e| Error::BadRequest(format!("invalid api key: {}", e)))?;
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }
        let http = Client::builder()
            .user_agent(concat!("accelview/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn check(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::FileNotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Status { status: status.as_u16(), url: url.to_string() });
        }
        Ok(response)
    }

    fn get_url(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.http.get(url).send()?;
        Self::check(response, url)
    }

    pub fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.config.endpoint(path);
        Ok(self.get_url(&url)?.json()?)
    }

    /// POST a JSON body; an empty reply reads as `null`
    pub fn post_json(&self, command: &str, body: &Value) -> Result<Value> {
        let url = self.config.endpoint(command);
        debug!("POST {}", url);
        let response = Self::check(self.http.post(&url).json(body).send()?, &url)?;
        let text = response.text()?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// All parameters, or only the named ones
    pub fn parameters(&self, names: &[&str]) -> Result<ParametersResponse> {
        let path = if names.is_empty() {
            "get_parameters".to_string()
        } else {
            format!("get_parameters?v={}", names.join(","))
        };
        Ok(serde_json::from_value(self.get_json(&path)?)?)
    }

    pub fn estimate(&self) -> Result<Estimate> {
        Ok(serde_json::from_value(self.get_json("get_estimate")?)?)
    }

    pub fn set_values(&self, values: &Map<String, Value>) -> Result<Value> {
        self.post_json("set_values", &Value::Object(values.clone()))
    }

    pub fn start_recording(&self) -> Result<Value> {
        self.post_json("start_recording", &json!({}))
    }

    pub fn abort_recording(&self) -> Result<Value> {
        self.post_json("abort_recording", &json!({}))
    }

    pub fn start_data_processing(&self) -> Result<Value> {
        self.post_json("start_data_processing", &json!({}))
    }

    pub fn files_listing(&self, which: FilesListing) -> Result<Value> {
        self.get_json(which.path())
    }
}

impl DataSource for PluginClient {
    fn listing(&self) -> Result<Value> {
        self.get_json(&self.config.listing_path)
    }

    fn describe(&self) -> String {
        self.config.base_url.clone()
    }

    fn download(&self, file_name: &str) -> Result<String> {
        let url = self.config.download_url(file_name);
        Ok(self.get_url(&url)?.text()?)
    }
}

// ============================================================================
// DATA DIRECTORY
// ============================================================================

/// Parsed `axxel-…` / `fft-…` file name
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub run: String,
    pub started: Timestamp,
    pub sequence: u32,
    pub axis: String,
    pub frequency_hz: u32,
    pub zeta_em2: u32,
    /// Axis of the spectrum for FFT files, `None` for streams
    pub fft_axis: Option<String>,
}

impl FileMeta {
    fn stream_key(&self) -> String {
        format!("a{}-f{}-z{}", self.axis, self.frequency_hz, self.zeta_em2)
    }
}

/// `axxel-<run>-<YYYYMMDD>-<HHMMSSmmm>-s<seq>-a<axis>-f<freq>-z<zeta>.tsv`,
/// FFT files as `fft-<same fields>-<fftAxis>.tsv`
pub fn parse_file_name(name: &str) -> Option<FileMeta> {
    let stem = name.strip_suffix(".tsv")?;
    let parts: Vec<&str> = stem.split('-').collect();
    let fft_axis = match (parts.first().copied(), parts.len()) {
        (Some("axxel"), 8) => None,
        (Some("fft"), 9) => Some(parts[8].to_string()),
        _ => return None,
    };

    let (date, time) = (parts[2], parts[3]);
    // byte slicing below needs single-byte chars
    if !date.is_ascii() || !time.is_ascii() || date.len() != 8 || time.len() != 9 {
        return None;
    }
    let num = |s: &str| s.parse::<u32>().ok();
    let started = Timestamp {
        year: date[0..4].parse().ok()?,
        month: num(&date[4..6])?,
        day: num(&date[6..8])?,
        hour: num(&time[0..2])?,
        minute: num(&time[2..4])?,
        second: num(&time[4..6])?,
        milli_second: num(&time[6..9])?,
    };

    Some(FileMeta {
        run: parts[1].to_string(),
        started,
        sequence: num(parts[4].strip_prefix('s')?)?,
        axis: parts[5].strip_prefix('a')?.to_string(),
        frequency_hz: num(parts[6].strip_prefix('f')?)?,
        zeta_em2: num(parts[7].strip_prefix('z')?)?,
        fft_axis,
    })
}

struct StreamEntry {
    key: String,
    meta: FileMeta,
    file: Option<String>,
    ffts: Vec<(String, String)>,
}

struct RunEntry {
    id: String,
    started: Timestamp,
    sequences: Vec<(u32, Vec<StreamEntry>)>,
}

/// Builds the nested listing from file names
///
/// Runs are ordered by start time, sequences by number, streams by
/// file name.
pub fn listing_from_file_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Value {
    let mut runs: Vec<RunEntry> = Vec::new();

    for name in names {
        let Some(meta) = parse_file_name(name) else {
            debug!("skipping {}", name);
            continue;
        };

        let run = match runs.iter().position(|r| r.id == meta.run) {
            Some(i) => &mut runs[i],
            None => {
                runs.push(RunEntry { id: meta.run.clone(), started: meta.started, sequences: Vec::new() });
                let last = runs.len() - 1;
                &mut runs[last]
            }
        };
        let streams = match run.sequences.iter().position(|(s, _)| *s == meta.sequence) {
            Some(i) => &mut run.sequences[i].1,
            None => {
                run.sequences.push((meta.sequence, Vec::new()));
                let last = run.sequences.len() - 1;
                &mut run.sequences[last].1
            }
        };
        let key = meta.stream_key();
        let stream = match streams.iter().position(|s| s.key == key) {
            Some(i) => &mut streams[i],
            None => {
                streams.push(StreamEntry { key, meta: meta.clone(), file: None, ffts: Vec::new() });
                let last = streams.len() - 1;
                &mut streams[last]
            }
        };
        match &meta.fft_axis {
            Some(axis) => stream.ffts.push((axis.clone(), name.to_string())),
            None => stream.file = Some(name.to_string()),
        }
    }

    runs.sort_by_key(|r| {
        let t = r.started;
        (t.year, t.month, t.day, t.hour, t.minute, t.second, t.milli_second)
    });

    let mut run_map = Map::new();
    for mut run in runs {
        run.sequences.sort_by_key(|(s, _)| *s);
        let mut seq_map = Map::new();
        for (seq, streams) in run.sequences {
            let mut stream_map = Map::new();
            for stream in streams {
                let mut fft_map = Map::new();
                for (axis, file) in &stream.ffts {
                    fft_map.insert(
                        axis.clone(),
                        json!({
                            "file": { "filename_ext": file },
                            "meta": {
                                "fft_axis": axis,
                                "sequence_frequency_hz": stream.meta.frequency_hz,
                                "sequence_zeta_em2": stream.meta.zeta_em2,
                            }
                        }),
                    );
                }
                let mut descriptor = json!({
                    "meta": {
                        "sequence_axis": stream.meta.axis,
                        "sequence_frequency_hz": stream.meta.frequency_hz,
                        "sequence_zeta_em2": stream.meta.zeta_em2,
                    },
                    "ffts": Value::Object(fft_map),
                });
                if let (Some(file), Value::Object(d)) = (&stream.file, &mut descriptor) {
                    d.insert("file".to_string(), json!({ "filename_ext": file }));
                }
                stream_map.insert(stream.key, descriptor);
            }
            seq_map.insert(seq.to_string(), json!({ "streams": Value::Object(stream_map) }));
        }
        run_map.insert(
            run.id,
            json!({ "started": run.started, "sequences": Value::Object(seq_map) }),
        );
    }

    json!({ "data_sets": { "runs": Value::Object(run_map) } })
}

/// Recorded files in a local directory
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    fn files(&self) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("tsv"))
            .map(|e| e.path().to_path_buf())
            .collect()
    }
}

impl DataSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn listing(&self) -> Result<Value> {
        if !self.root.is_dir() {
            return Err(Error::FileNotFound(self.root.display().to_string()));
        }
        let files = self.files();
        let names: Vec<&str> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        Ok(listing_from_file_names(names))
    }

    fn download(&self, file_name: &str) -> Result<String> {
        // plain names only, no escaping the data directory
        if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
            return Err(Error::BadRequest(format!("invalid file name '{}'", file_name)));
        }
        let path = self
            .files()
            .into_iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(file_name))
            .ok_or_else(|| Error::FileNotFound(file_name.to_string()))?;
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Fixed listing and file contents
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub listing: Value,
    pub files: HashMap<String, String>,
}

impl MemorySource {
    pub fn new(listing: Value) -> Self {
        Self { listing, files: HashMap::new() }
    }

    pub fn with_file(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.files.insert(name.into(), text.into());
        self
    }
}

impl DataSource for MemorySource {
    fn describe(&self) -> String {
        "in-memory listing".to_string()
    }

    fn listing(&self) -> Result<Value> {
        Ok(self.listing.clone())
    }

    fn download(&self, file_name: &str) -> Result<String> {
        self.files.get(file_name).cloned().ok_or_else(|| Error::FileNotFound(file_name.to_string()))
    }
}

// ============================================================================
// FETCH HELPERS
// ============================================================================

pub fn fetch_acceleration(source: &dyn DataSource, file_name: &str, format: &DataFormat) -> Result<AccelerationData> {
    let text = source.download(file_name)?;
    data::parse_stream(&text, format)
}

/// Download the three per-axis FFT files in parallel and merge them
pub fn fetch_fft(source: &dyn DataSource, files: &FftFiles, format: &DataFormat) -> Result<Vec<FftSample>> {
    let names = [files.x.as_str(), files.y.as_str(), files.z.as_str()];
    let mut axes = names
        .par_iter()
        .map(|name| {
            let text = source.download(name)?;
            data::parse_fft(&text, format)
        })
        .collect::<Result<Vec<_>>>()?;

    let z = axes.pop().unwrap_or_default();
    let y = axes.pop().unwrap_or_default();
    let x = axes.pop().unwrap_or_default();
    Ok(data::merge_axes(&x, &y, &z))
}

/// FFT files when the stream has them, a locally computed spectrum otherwise
pub fn fetch_spectrum(
    source: &dyn DataSource,
    selection: &StreamSelection,
    acceleration: Option<&AccelerationData>,
    format: &DataFormat,
) -> Result<Vec<FftSample>> {
    if let Some(files) = &selection.fft_files {
        return fetch_fft(source, files, format);
    }
    let owned;
    let acceleration = match acceleration {
        Some(a) => a,
        None => {
            owned = fetch_acceleration(source, &selection.file_name, format)?;
            &owned
        }
    };
    match acceleration.rate_hz() {
        Some(rate) => Ok(data::spectrum::compute(&acceleration.samples, rate)),
        None => {
            warn!("{} has neither FFT files nor a sample rate", selection.file_name);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::build_tree;
    use std::fs;

    const STREAM: &str = "seq sample x y z\n0 0 1 2 3\n0 1 4 5 6\n# {\"rate\": \"ODR800\"}\n";

    fn fft_text(scale: f64) -> String {
        let mut text = "freq_hz fft\n".to_string();
        for i in 0..8 {
            text.push_str(&format!("{} {}\n", i as f64 * 0.5, i as f64 * scale));
        }
        text
    }

    // ==========================================================================
    // FILE NAMES
    // ==========================================================================

    #[test]
    fn test_parse_stream_file_name() {
        let meta = parse_file_name("axxel-a1b2c3-20231127-235625233-s000-ax-f010-z015.tsv").unwrap();
        assert_eq!(meta.run, "a1b2c3");
        assert_eq!(meta.started.year, 2023);
        assert_eq!(meta.started.second, 25);
        assert_eq!(meta.started.milli_second, 233);
        assert_eq!(meta.sequence, 0);
        assert_eq!(meta.axis, "x");
        assert_eq!(meta.frequency_hz, 10);
        assert_eq!(meta.zeta_em2, 15);
        assert!(meta.fft_axis.is_none());
    }

    #[test]
    fn test_parse_fft_file_name() {
        let meta = parse_file_name("fft-a1b2c3-20231127-235625233-s001-ay-f020-z010-z.tsv").unwrap();
        assert_eq!(meta.sequence, 1);
        assert_eq!(meta.axis, "y");
        assert_eq!(meta.fft_axis.as_deref(), Some("z"));
    }

    #[test]
    fn test_parse_foreign_file_names() {
        assert!(parse_file_name("notes.txt").is_none());
        assert!(parse_file_name("axxel-run.tsv").is_none());
        assert!(parse_file_name("axxel-r-2023-235625233-s0-ax-f10-z15.tsv").is_none());
        assert!(parse_file_name("axxel-r-20231127-235625233-0-ax-f10-z15.tsv").is_none());
    }

    #[test]
    fn test_parse_non_ascii_timestamp_fields() {
        // 'é' is two bytes, so both fields still have the expected byte length
        assert!(parse_file_name("axxel-r-202é123-235625233-s000-ax-f010-z015.tsv").is_none());
        assert!(parse_file_name("axxel-r-20231127-2356é233-s000-ax-f010-z015.tsv").is_none());
        assert!(parse_file_name("fft-r-202é123-235625233-s000-ax-f010-z015-x.tsv").is_none());
    }

    #[test]
    fn test_listing_from_file_names_builds_tree() {
        let names = [
            "axxel-r2-20231128-100000000-s000-ax-f010-z015.tsv",
            "axxel-r1-20231127-235625233-s000-ax-f010-z015.tsv",
            "axxel-r1-20231127-235625233-s000-ay-f010-z015.tsv",
            "fft-r1-20231127-235625233-s000-ax-f010-z015-x.tsv",
            "fft-r1-20231127-235625233-s000-ax-f010-z015-y.tsv",
            "fft-r1-20231127-235625233-s000-ax-f010-z015-z.tsv",
            "README.md",
        ];
        let tree = build_tree(&listing_from_file_names(names));

        // r1 started first
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].name, "2023.11.27 23:56:25.233");
        let seq = &tree.children[0].children[0];
        assert_eq!(seq.children.len(), 2);
        assert_eq!(seq.children[0].children.len(), 3);

        let selection = seq.children[0].selection().unwrap();
        assert_eq!(selection.file_name, "axxel-r1-20231127-235625233-s000-ax-f010-z015.tsv");
        assert_eq!(selection.fft_files.unwrap().z, "fft-r1-20231127-235625233-s000-ax-f010-z015-z.tsv");
        assert!(seq.children[1].selection().unwrap().fft_files.is_none());
    }

    // ==========================================================================
    // SOURCES
    // ==========================================================================

    #[test]
    fn test_dir_source() {
        let dir = tempfile::tempdir().unwrap();
        let name = "axxel-r1-20231127-235625233-s000-ax-f010-z015.tsv";
        fs::write(dir.path().join(name), STREAM).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("fft-r1-20231127-235625233-s000-ax-f010-z015-x.tsv"), fft_text(1.0))
            .unwrap();

        let source = DirSource::new(dir.path());
        let tree = build_tree(&source.listing().unwrap());
        assert_eq!(tree.node_count(), 1 + 1 + 1 + 1 + 1);
        assert_eq!(source.download(name).unwrap(), STREAM);
        assert!(matches!(source.download("missing.tsv"), Err(Error::FileNotFound(_))));
        assert!(matches!(source.download("../etc/passwd"), Err(Error::BadRequest(_))));
    }

    #[test]
    fn test_dir_source_skips_non_ascii_names() {
        let dir = tempfile::tempdir().unwrap();
        let good = "axxel-r1-20231127-235625233-s000-ax-f010-z015.tsv";
        fs::write(dir.path().join(good), STREAM).unwrap();
        fs::write(dir.path().join("axxel-r-202é123-235625233-s000-ax-f010-z015.tsv"), STREAM).unwrap();

        let tree = build_tree(&DirSource::new(dir.path()).listing().unwrap());
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_sources_describe_themselves() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(DirSource::new(dir.path()).describe(), dir.path().display().to_string());
        assert_eq!(MemorySource::default().describe(), "in-memory listing");
        let client = PluginClient::new(Config::default().with_base_url("http://octopi.local/plugin/x/")).unwrap();
        assert_eq!(client.describe(), "http://octopi.local/plugin/x");
    }

    #[test]
    fn test_dir_source_missing_directory() {
        let source = DirSource::new("/definitely/not/here");
        assert!(source.listing().is_err());
    }

    #[test]
    fn test_memory_source() {
        let source = MemorySource::new(json!({})).with_file("a.tsv", STREAM);
        assert_eq!(source.download("a.tsv").unwrap(), STREAM);
        assert!(source.download("b.tsv").is_err());
    }

    // ==========================================================================
    // FETCHING
    // ==========================================================================

    #[test]
    fn test_fetch_fft_merges_three_axes() {
        let source = MemorySource::new(json!({}))
            .with_file("x.tsv", fft_text(1.0))
            .with_file("y.tsv", fft_text(2.0))
            .with_file("z.tsv", fft_text(3.0));
        let files = FftFiles { x: "x.tsv".into(), y: "y.tsv".into(), z: "z.tsv".into() };
        let merged = fetch_fft(&source, &files, &DataFormat::default()).unwrap();
        assert_eq!(merged.len(), 8);
        assert_eq!(merged[2].magnitude_x, 2.0);
        assert_eq!(merged[2].magnitude_y, 4.0);
        assert_eq!(merged[2].magnitude_z, 6.0);
    }

    #[test]
    fn test_fetch_fft_missing_axis_fails() {
        let source = MemorySource::new(json!({})).with_file("x.tsv", fft_text(1.0));
        let files = FftFiles { x: "x.tsv".into(), y: "y.tsv".into(), z: "z.tsv".into() };
        assert!(fetch_fft(&source, &files, &DataFormat::default()).is_err());
    }

    #[test]
    fn test_fetch_spectrum_falls_back_to_local_fft() {
        let source = MemorySource::new(json!({})).with_file("a.tsv", STREAM);
        let selection = StreamSelection { file_name: "a.tsv".into(), fft_files: None };
        let spectrum = fetch_spectrum(&source, &selection, None, &DataFormat::default()).unwrap();
        // two samples → bins 0 and 1
        assert_eq!(spectrum.len(), 2);
        assert_eq!(spectrum[1].frequency_hz, 400.0);
    }

    #[test]
    fn test_fetch_spectrum_without_rate_is_empty() {
        let source = MemorySource::new(json!({})).with_file("a.tsv", "seq sample x y z\n0 0 1 2 3\n0 1 1 2 3\n");
        let selection = StreamSelection { file_name: "a.tsv".into(), fft_files: None };
        assert!(fetch_spectrum(&source, &selection, None, &DataFormat::default()).unwrap().is_empty());
    }

    #[test]
    fn test_client_sends_to_configured_base() {
        let client = PluginClient::new(Config::default().with_base_url("http://octopi.local/plugin/acc")).unwrap();
        assert_eq!(client.config().listing_url(), "http://octopi.local/plugin/acc/get_data_listing");
        assert_eq!(FilesListing::Streams.path(), "get_stream_files_listing");
    }

    #[test]
    fn test_client_rejects_bad_api_key() {
        let config = Config::default().with_api_key("bad\nkey");
        assert!(matches!(PluginClient::new(config), Err(Error::BadRequest(_))));
    }
}
