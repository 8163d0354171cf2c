//! Screen layout configuration
//!
//! A layout describes where the two character portraits and the match clock
//! sit on screen for one particular broadcast overlay. Layouts are JSON files
//! living in a layouts directory and are selected by name on the command line.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Similarity threshold used when a layout does not set one.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Axis-aligned rectangle in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the whole rectangle fits inside a `width` x `height` frame.
    pub fn fits_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width && self.bottom() <= height
    }

    fn validate(&self, what: &'static str) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::EmptyRegion {
                what,
                width: self.width,
                height: self.height,
            });
        }
        if self.x < 0 || self.y < 0 {
            return Err(ConfigError::NegativeOrigin {
                what,
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// Region-of-interest geometry and matching parameters for one overlay.
///
/// `scale` applies to template images only; the ROI geometry is already
/// expressed in frame pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub scale: f64,
    pub origin_player1: (i32, i32),
    pub origin_player2: (i32, i32),
    #[serde(default)]
    pub origin_clock: Option<(i32, i32)>,
    pub width_portrait: i32,
    pub height_portrait: i32,
    #[serde(default)]
    pub width_clock: Option<i32>,
    #[serde(default)]
    pub height_clock: Option<i32>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Layout {
    /// Resolve `<dir>/<name>.json` and load it.
    pub fn find<P: AsRef<Path>>(dir: P, name: &str) -> Result<Self, ConfigError> {
        let path = dir.as_ref().join(format!("{name}.json"));
        if !path.is_file() {
            return Err(ConfigError::LayoutNotFound {
                name: name.to_string(),
                path,
            });
        }
        Self::load(&path)
    }

    /// Load a layout from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::LayoutRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::LayoutParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn player1_region(&self) -> Region {
        let (x, y) = self.origin_player1;
        Region::new(x, y, self.width_portrait, self.height_portrait)
    }

    pub fn player2_region(&self) -> Region {
        let (x, y) = self.origin_player2;
        Region::new(x, y, self.width_portrait, self.height_portrait)
    }

    /// Clock region, if the layout carries complete clock geometry.
    pub fn clock_region(&self) -> Option<Region> {
        let (x, y) = self.origin_clock?;
        Some(Region::new(x, y, self.width_clock?, self.height_clock?))
    }

    /// Check values that do not depend on the video.
    pub fn validate(&self, include_clock: bool) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        self.player1_region().validate("player 1")?;
        self.player2_region().validate("player 2")?;

        if include_clock {
            if self.origin_clock.is_none() {
                return Err(ConfigError::MissingClockGeometry("originClock"));
            }
            if self.width_clock.is_none() {
                return Err(ConfigError::MissingClockGeometry("widthClock"));
            }
            if self.height_clock.is_none() {
                return Err(ConfigError::MissingClockGeometry("heightClock"));
            }
            if let Some(clock) = self.clock_region() {
                clock.validate("clock")?;
            }
        }

        Ok(())
    }

    /// Check that every region used for this run lies inside the frame.
    pub fn check_fits(&self, width: i32, height: i32, include_clock: bool) -> Result<(), ConfigError> {
        let mut regions = vec![
            ("player 1", self.player1_region()),
            ("player 2", self.player2_region()),
        ];
        if include_clock {
            if let Some(clock) = self.clock_region() {
                regions.push(("clock", clock));
            }
        }

        for (what, region) in regions {
            if !region.fits_within(width, height) {
                return Err(ConfigError::RegionOutOfFrame {
                    what,
                    region,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }
}
