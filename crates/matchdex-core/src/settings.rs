//! Run settings and frame-domain thresholds

use crate::error::ConfigError;

/// Some recorders report 62.5 fps for 60 fps captures.
const MISREPORTED_FPS: f64 = 62.5;

/// When an open session is flushed as a match at end of stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// Both players still present. The clock is not consulted.
    #[default]
    PlayersPresent,
    /// Both players and the clock still present.
    AllSignalsPresent,
    /// Any open session, regardless of current presence.
    AnyOpenSession,
}

/// Per-run flags that sit beside the layout.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub include_clock: bool,
    /// Frames between samples. `0` samples every frame.
    pub frame_skip: u32,
    /// Seconds a locked character may go unseen before presence is lost.
    pub detect_threshold_sec: f64,
    /// Seconds the clock must hold a new state before it flips.
    pub clock_threshold_sec: f64,
    pub flush_policy: FlushPolicy,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            include_clock: false,
            frame_skip: 30,
            detect_threshold_sec: 6.0,
            clock_threshold_sec: 1.0,
            flush_policy: FlushPolicy::default(),
        }
    }
}

impl RunSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("detect threshold", self.detect_threshold_sec),
            ("clock threshold", self.clock_threshold_sec),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }
        Ok(())
    }

    /// Convert the second-based thresholds into frame counts at `fps`.
    pub fn thresholds(&self, fps: f64) -> Thresholds {
        Thresholds {
            detect: self.detect_threshold_sec * fps,
            clock: self.clock_threshold_sec * fps,
            step: 1 + u64::from(self.frame_skip),
        }
    }
}

/// Hysteresis limits expressed in frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub detect: f64,
    pub clock: f64,
    /// Counter increment per sampled frame.
    pub step: u64,
}

/// Validate a reported frame rate, mapping the 62.5 fps mis-report to 60.
pub fn normalize_fps(fps: f64) -> Result<f64, ConfigError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(ConfigError::InvalidFrameRate(fps));
    }
    if fps == MISREPORTED_FPS {
        return Ok(60.0);
    }
    Ok(fps)
}
