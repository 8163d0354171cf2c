//! Bounding boxes for template hits
//!
//! Hits are stored in frame coordinates so the preview can draw them without
//! knowing which region produced them.

use opencv::core::{Point, Rect};

/// A single template hit
#[derive(Debug, Clone, PartialEq)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub confidence: f64,
    pub class_id: String,
}

impl BBox {
    /// Create a new bounding box
    pub fn new(x: i32, y: i32, width: i32, height: i32, confidence: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence,
            class_id: String::new(),
        }
    }

    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = class_id.into();
        self
    }

    /// Convert to OpenCV Rect
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry() {
        let bbox = BBox::new(10, 20, 30, 40, 0.95).with_class("Ryu");
        assert_eq!(bbox.to_rect(), Rect::new(10, 20, 30, 40));
        assert_eq!(bbox.top_left(), Point::new(10, 20));
        assert_eq!(bbox.class_id, "Ryu");
    }
}
