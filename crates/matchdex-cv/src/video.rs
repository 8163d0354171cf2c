//! OpenCV video file reader

use crate::Result;
use anyhow::{bail, Context};
use matchdex_core::{FrameSource, VideoInfo};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

pub struct VideoSource {
    capture: VideoCapture,
    info: VideoInfo,
}

impl VideoSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();

        let capture = VideoCapture::from_file(&path_str, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video: {}", path_str))?;
        if !capture.is_opened()? {
            bail!("Failed to open video: {}", path_str);
        }

        let info = VideoInfo {
            fps: capture.get(videoio::CAP_PROP_FPS)?,
            frame_count: capture.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as u64,
            width: capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32,
            height: capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32,
        };

        Ok(Self { capture, info })
    }
}

impl FrameSource for VideoSource {
    type Frame = Mat;

    fn info(&self) -> VideoInfo {
        self.info
    }

    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let read = self.capture.read(&mut frame).context("Failed to decode frame")?;
        if !read || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}
