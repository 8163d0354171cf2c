//! Matchdex Computer Vision Library
//!
//! OpenCV side of the indexer: video decoding, template loading, region
//! matching and the optional preview window.

pub mod bbox;
pub mod detection;
pub mod preview;
pub mod template;
pub mod utils;
pub mod video;

// Re-export commonly used types
pub use bbox::BBox;
pub use detection::{DetectionConfig, TemplateAnalyzer};
pub use preview::{Overlay, PreviewWindow};
pub use template::{RegionMatcher, TemplateError, TemplateLibrary, TemplateLoader};
pub use video::VideoSource;

// Error handling
pub type Result<T> = anyhow::Result<T>;
