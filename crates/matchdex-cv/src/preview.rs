//! Live preview window
//!
//! Draws the search regions and the current template hits on top of each
//! sampled frame. Pressing `q` in the window stops indexing.

use crate::bbox::BBox;
use crate::detection::DetectionConfig;
use crate::Result;
use matchdex_core::timecode::hms;
use matchdex_core::{Flow, Region, SampleStatus, Side};
use opencv::{
    core::{Mat, Point, Rect, Scalar},
    highgui,
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};

const WINDOW: &str = "frame";
const WAIT_MS: i32 = 11;
const QUIT_KEY: i32 = b'q' as i32;

const FONT_FACE: i32 = FONT_HERSHEY_SIMPLEX;
const FONT_SCALE: f64 = 0.7;
const FONT_THICKNESS: i32 = 2;
const BORDER_THICKNESS: i32 = 1;
const TEXT_PADDING: i32 = 2;

// BGR
const WHITE: Scalar = Scalar::new(255.0, 255.0, 255.0, 0.0);
const BLUE: Scalar = Scalar::new(255.0, 0.0, 0.0, 0.0);
const RED: Scalar = Scalar::new(0.0, 0.0, 255.0, 0.0);
const CYAN: Scalar = Scalar::new(255.0, 255.0, 0.0, 0.0);

/// Which signal a hit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Player(Side),
    Clock,
}

impl HitKind {
    fn color(self) -> Scalar {
        match self {
            HitKind::Player(Side::Player1) => RED,
            HitKind::Player(Side::Player2) | HitKind::Clock => BLUE,
        }
    }
}

/// Hits collected while analyzing the current frame.
#[derive(Debug, Default, Clone)]
pub struct Overlay {
    hits: Vec<(HitKind, BBox)>,
}

impl Overlay {
    pub fn clear(&mut self) {
        self.hits.clear();
    }

    pub fn record(&mut self, kind: HitKind, hits: Vec<BBox>) {
        self.hits.extend(hits.into_iter().map(|hit| (kind, hit)));
    }

    pub fn hits(&self) -> impl Iterator<Item = &(HitKind, BBox)> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Open preview window. Dropping it closes the window.
pub struct PreviewWindow {
    _window: (),
}

impl PreviewWindow {
    /// Open a resizable window for a `width` x `height` video, at half size
    /// when `zoom_out` is set.
    pub fn open(width: i32, height: i32, zoom_out: bool) -> Result<Self> {
        let (width, height) = if zoom_out {
            (width / 2, height / 2)
        } else {
            (width, height)
        };

        highgui::named_window(WINDOW, highgui::WINDOW_NORMAL)?;
        highgui::resize_window(WINDOW, width, height)?;

        Ok(Self { _window: () })
    }

    /// Annotate and display `frame`, then poll the keyboard.
    pub fn show(
        &mut self,
        frame: &mut Mat,
        config: &DetectionConfig,
        overlay: &Overlay,
        status: &SampleStatus,
    ) -> Result<Flow> {
        let mut regions = vec![config.player1, config.player2];
        regions.extend(config.clock);
        for region in regions {
            draw_region(frame, region)?;
        }

        for (kind, hit) in overlay.hits() {
            imgproc::rectangle(frame, hit.to_rect(), kind.color(), BORDER_THICKNESS, LINE_8, 0)?;
            if let HitKind::Player(_) = kind {
                draw_label(frame, &hit.class_id, hit.top_left(), kind.color())?;
            }
        }

        let caption = if status.in_match {
            format!("{} match", hms(status.time))
        } else {
            hms(status.time)
        };
        let rows = frame.rows();
        draw_label(frame, &caption, Point::new(TEXT_PADDING, rows - TEXT_PADDING), CYAN)?;

        highgui::imshow(WINDOW, &*frame)?;
        let key = highgui::wait_key(WAIT_MS)?;

        Ok(if key >= 0 && key & 0xFF == QUIT_KEY {
            Flow::Quit
        } else {
            Flow::Continue
        })
    }
}

impl Drop for PreviewWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}

fn draw_region(frame: &mut Mat, region: Region) -> Result<()> {
    let rect = Rect::new(region.x, region.y, region.width, region.height);
    imgproc::rectangle(frame, rect, CYAN, BORDER_THICKNESS, LINE_8, 0)?;
    Ok(())
}

/// Filled label whose bottom-left corner sits on `origin`.
fn draw_label(frame: &mut Mat, text: &str, origin: Point, background: Scalar) -> Result<()> {
    let mut baseline = 0;
    let text_size = imgproc::get_text_size(text, FONT_FACE, FONT_SCALE, FONT_THICKNESS, &mut baseline)?;

    let label = Rect::new(
        origin.x - BORDER_THICKNESS / 2,
        origin.y - text_size.height - BORDER_THICKNESS - TEXT_PADDING * 2,
        text_size.width + TEXT_PADDING * 2,
        text_size.height + BORDER_THICKNESS + TEXT_PADDING * 2,
    );
    imgproc::rectangle(frame, label, background, imgproc::FILLED, LINE_8, 0)?;

    imgproc::put_text(
        frame,
        text,
        Point::new(origin.x + TEXT_PADDING, origin.y - TEXT_PADDING - BORDER_THICKNESS),
        FONT_FACE,
        FONT_SCALE,
        WHITE,
        FONT_THICKNESS,
        LINE_8,
        false,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{self, CV_8UC3};

    #[test]
    fn test_overlay_collects_hits() {
        let mut overlay = Overlay::default();
        overlay.record(
            HitKind::Player(Side::Player1),
            vec![BBox::new(1, 2, 3, 4, 0.9).with_class("Ryu")],
        );
        overlay.record(HitKind::Clock, vec![BBox::new(5, 6, 7, 8, 0.95)]);
        assert_eq!(overlay.len(), 2);

        overlay.clear();
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_label_and_region_drawing() -> Result<()> {
        let mut frame = Mat::new_rows_cols_with_default(120, 200, CV_8UC3, core::Scalar::all(0.0))?;
        draw_label(&mut frame, "Chun-Li", Point::new(20, 60), RED)?;
        draw_region(&mut frame, Region::new(10, 10, 50, 30))?;
        Ok(())
    }
}
