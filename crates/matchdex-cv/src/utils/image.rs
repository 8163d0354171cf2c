//! Image processing utilities using opencv-match conversions

use crate::Result;
use anyhow::Context;
use matchdex_core::Region;
use opencv::{
    core::{Mat, Rect, Size},
    imgproc,
    prelude::*,
};
use opencv_match::prelude::*;
use std::path::Path;

/// Image utility functions leveraging opencv-match conversions
pub struct ImageUtils;

impl ImageUtils {
    /// Load image as grayscale Mat using opencv-match
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let img = image::open(&path)
            .with_context(|| format!("Failed to open image: {:?}", path.as_ref()))?
            .to_rgba8();

        opencv_match::convert::mat_to_grayscale(&img.try_into_cv()?, true)
            .context("Failed to convert image to grayscale")
    }

    /// Convert a decoded BGR frame to single-channel grayscale.
    pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
        if frame.channels() == 1 {
            return frame.try_clone().context("Failed to copy grayscale frame");
        }

        let code = if frame.channels() == 4 {
            imgproc::COLOR_BGRA2GRAY
        } else {
            imgproc::COLOR_BGR2GRAY
        };
        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, code, 0).context("Grayscale conversion failed")?;
        Ok(gray)
    }

    /// Resize by a uniform factor with bilinear interpolation.
    pub fn scale(image: &Mat, factor: f64) -> Result<Mat> {
        if (factor - 1.0).abs() < f64::EPSILON {
            return image.try_clone().context("Failed to copy image");
        }

        let mut scaled = Mat::default();
        imgproc::resize(
            image,
            &mut scaled,
            Size::new(0, 0),
            factor,
            factor,
            imgproc::INTER_LINEAR,
        )
        .with_context(|| format!("Failed to scale image by {factor}"))?;

        Ok(scaled)
    }

    /// Copy out the pixels under `region`. The region must lie inside the
    /// image.
    pub fn crop(image: &Mat, region: Region) -> Result<Mat> {
        let rect = Rect::new(region.x, region.y, region.width, region.height);
        let roi = Mat::roi(image, rect).with_context(|| format!("Failed to crop {region}"))?;
        roi.try_clone().context("Failed to copy cropped region")
    }

    /// Width and height of a Mat.
    pub fn dimensions(image: &Mat) -> Result<(i32, i32)> {
        let size = image.size()?;
        Ok((size.width, size.height))
    }
}
