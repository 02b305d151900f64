//! Crate-wide error type
//!
//! Everything that can fail on the way from the plugin to a rendered chart
//! ends up here. Most of these are recovered close to where they happen
//! (an empty chart, a skipped subtree); the CLI prints whatever escapes.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("plugin answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed table line {line}: {reason}")]
    MalformedTable { line: usize, reason: String },
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("stale generation {requested} (current {current})")]
    StaleGeneration { requested: u64, current: u64 },
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl Error {
    /// HTTP status used when this error is reported by the viewer server
    pub fn status_code(&self) -> u16 {
        match self {
            Error::StaleGeneration { .. } => 409,
            Error::BadRequest(_) => 400,
            Error::FileNotFound(_) => 404,
            Error::Status { .. } | Error::Http(_) => 502,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::StaleGeneration { requested: 1, current: 2 }.status_code(), 409);
        assert_eq!(Error::BadRequest("x".into()).status_code(), 400);
        assert_eq!(Error::FileNotFound("a.tsv".into()).status_code(), 404);
        assert_eq!(Error::Status { status: 500, url: "u".into() }.status_code(), 502);
    }

    #[test]
    fn test_display_names_offending_line() {
        let err = Error::MalformedTable { line: 3, reason: "expected 5 columns".into() };
        assert_eq!(err.to_string(), "malformed table line 3: expected 5 columns");
    }
}
