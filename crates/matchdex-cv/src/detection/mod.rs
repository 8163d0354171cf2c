//! Per-frame detection

pub mod config;
pub mod detector;

pub use config::DetectionConfig;
pub use detector::TemplateAnalyzer;
