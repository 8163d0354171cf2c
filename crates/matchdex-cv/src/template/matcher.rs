//! Region-restricted template matching

use super::Template;
use crate::bbox::BBox;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use matchdex_core::Region;
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};

/// Normalized correlation-coefficient matcher over a frame sub-region.
#[derive(Debug, Clone, Copy)]
pub struct RegionMatcher {
    threshold: f64,
}

impl RegionMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Every location in `region` where `template` scores at or above the
    /// threshold, as boxes in frame coordinates.
    ///
    /// `frame_gray` is the whole grayscale frame; `region` must lie inside it.
    pub fn match_region(&self, frame_gray: &Mat, region: Region, template: &Template) -> Result<Vec<BBox>> {
        let roi = ImageUtils::crop(frame_gray, region)?;

        let mut result = Mat::default();
        imgproc::match_template(
            &roi,
            &template.image,
            &mut result,
            imgproc::TM_CCOEFF_NORMED,
            &core::no_array(),
        )
        .with_context(|| format!("Template matching failed for {}", template.name))?;

        let size = template.size()?;
        let mut hits = Vec::new();

        for y in 0..result.rows() {
            for x in 0..result.cols() {
                let score = f64::from(*result.at_2d::<f32>(y, x)?);
                if score >= self.threshold {
                    hits.push(
                        BBox::new(region.x + x, region.y + y, size.width, size.height, score)
                            .with_class(template.name.as_str()),
                    );
                }
            }
        }

        Ok(hits)
    }
}
