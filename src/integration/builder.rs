//! Builder for detector outputs given in various box formats.

use crate::integration::RawDetection;

/// Builds a [`RawDetection`], normalizing the box to LTRB.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    ltrb: [f32; 4],
    confidence: f32,
    class_id: i64,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box as left, top, right, bottom.
    pub fn ltrb(mut self, left: f32, top: f32, right: f32, bottom: f32) -> Self {
        self.ltrb = [left, top, right, bottom];
        self
    }

    /// Box as center x, center y, width, height (YOLO head output).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.ltrb = [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0];
        self
    }

    /// Box as left, top, width, height.
    pub fn tlwh(mut self, left: f32, top: f32, w: f32, h: f32) -> Self {
        self.ltrb = [left, top, left + w, top + h];
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn class_id(mut self, class_id: i64) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn build(self) -> RawDetection {
        RawDetection::new(self.ltrb, self.confidence, self.class_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_formats_agree() {
        let a = DetectionBuilder::new().ltrb(10.0, 20.0, 50.0, 80.0).build();
        let b = DetectionBuilder::new().xywh(30.0, 50.0, 40.0, 60.0).build();
        let c = DetectionBuilder::new().tlwh(10.0, 20.0, 40.0, 60.0).build();
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.bbox, c.bbox);
    }

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .ltrb(10.0, 20.0, 50.0, 80.0)
            .confidence(0.95)
            .class_id(7)
            .build();
        assert_eq!(det.confidence, 0.95);
        assert_eq!(det.class_id, 7);
    }
}
