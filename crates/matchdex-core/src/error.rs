//! Configuration errors
//!
//! Everything here is fatal and reported before the first frame is read.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("layout `{name}` not found at {path:?}")]
    LayoutNotFound { name: String, path: PathBuf },

    #[error("failed to read layout {path:?}")]
    LayoutRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout {path:?}")]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("layout scale must be a positive number, got {0}")]
    InvalidScale(f64),

    #[error("detection threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("{what} region has an empty size ({width}x{height})")]
    EmptyRegion {
        what: &'static str,
        width: i32,
        height: i32,
    },

    #[error("{what} region has a negative origin ({x}, {y})")]
    NegativeOrigin { what: &'static str, x: i32, y: i32 },

    #[error("clock detection requested but the layout has no `{0}`")]
    MissingClockGeometry(&'static str),

    #[error("{what} region {region} lies outside the {width}x{height} frame")]
    RegionOutOfFrame {
        what: &'static str,
        region: crate::layout::Region,
        width: i32,
        height: i32,
    },

    #[error("{name} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("video reports an unusable frame rate ({0})")]
    InvalidFrameRate(f64),

    #[error("analyzer offers {candidates} {side} templates but the roster has {characters} characters")]
    CandidateCountMismatch {
        side: crate::roster::Side,
        candidates: usize,
        characters: usize,
    },
}
