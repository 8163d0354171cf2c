//! OpenCV frame analyzer
//!
//! Answers the frame loop's "does this template match" questions by
//! correlating templates against fixed regions of the grayscale frame.

use super::config::DetectionConfig;
use crate::bbox::BBox;
use crate::preview::{HitKind, Overlay, PreviewWindow};
use crate::template::{RegionMatcher, Template, TemplateLibrary};
use crate::utils::ImageUtils;
use crate::Result;
use matchdex_core::{CharacterId, Flow, FrameAnalyzer, Region, SampleStatus, Side};
use opencv::core::Mat;
use tracing::debug;

/// Template-correlation analyzer for decoded video frames
pub struct TemplateAnalyzer {
    config: DetectionConfig,
    library: TemplateLibrary,
    matcher: RegionMatcher,
    /// Grayscale copy of the frame being analyzed.
    gray: Option<Mat>,
    overlay: Overlay,
    preview: Option<PreviewWindow>,
}

impl TemplateAnalyzer {
    /// Create new analyzer. Fails if any template is larger than the region
    /// it is searched in.
    pub fn new(config: DetectionConfig, library: TemplateLibrary) -> Result<Self> {
        config.check_templates(&library)?;
        let matcher = RegionMatcher::new(config.threshold);

        Ok(Self {
            config,
            library,
            matcher,
            gray: None,
            overlay: Overlay::default(),
            preview: None,
        })
    }

    pub fn with_preview(mut self, preview: PreviewWindow) -> Self {
        self.preview = Some(preview);
        self
    }

    /// Hits found in the current frame. Only populated while previewing.
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    fn probe(
        matcher: &RegionMatcher,
        gray: Option<&Mat>,
        region: Region,
        template: &Template,
    ) -> Option<Vec<BBox>> {
        let gray = gray?;
        match matcher.match_region(gray, region, template) {
            Ok(hits) => Some(hits),
            Err(err) => {
                debug!(template = %template.name, %region, "match failed, treating as absent: {err:#}");
                None
            }
        }
    }

    fn settle(&mut self, kind: HitKind, hits: Option<Vec<BBox>>) -> bool {
        let Some(hits) = hits else {
            return false;
        };
        let found = !hits.is_empty();
        if self.preview.is_some() {
            self.overlay.record(kind, hits);
        }
        found
    }
}

impl FrameAnalyzer for TemplateAnalyzer {
    type Frame = Mat;

    fn candidates(&self, side: Side) -> usize {
        self.library.templates(side).len()
    }

    fn begin_frame(&mut self, frame: &Mat) {
        self.overlay.clear();
        self.gray = match ImageUtils::to_grayscale(frame) {
            Ok(gray) => Some(gray),
            Err(err) => {
                debug!("grayscale conversion failed, skipping detection: {err:#}");
                None
            }
        };
    }

    fn player_matches(&mut self, _frame: &Mat, side: Side, id: CharacterId) -> bool {
        let Some(template) = self.library.get(side, id) else {
            return false;
        };
        let hits = Self::probe(&self.matcher, self.gray.as_ref(), self.config.region(side), template);
        self.settle(HitKind::Player(side), hits)
    }

    fn clock_matches(&mut self, _frame: &Mat) -> bool {
        let (Some(region), Some(template)) = (self.config.clock, self.library.clock()) else {
            return false;
        };
        let hits = Self::probe(&self.matcher, self.gray.as_ref(), region, template);
        self.settle(HitKind::Clock, hits)
    }

    fn end_frame(&mut self, mut frame: Mat, status: &SampleStatus) -> Result<Flow> {
        match &mut self.preview {
            Some(preview) => preview.show(&mut frame, &self.config, &self.overlay, status),
            None => Ok(Flow::Continue),
        }
    }
}
