//! Trait for object detection inference backends.

use crate::tracker::Rect;

/// One detector output: box, confidence and class, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Bounding box as `[x1, y1, x2, y2]` (left, top, right, bottom)
    pub bbox: [f32; 4],
    pub confidence: f32,
    /// Detector label id
    pub class_id: i64,
}

impl RawDetection {
    pub fn new(bbox: [f32; 4], confidence: f32, class_id: i64) -> Self {
        Self {
            bbox,
            confidence,
            class_id,
        }
    }

    pub fn rect(&self) -> Rect {
        let [x1, y1, x2, y2] = self.bbox;
        Rect::from_ltrb(x1, y1, x2, y2)
    }

    /// Finite values and a non-inverted box.
    pub fn is_well_formed(&self) -> bool {
        self.confidence.is_finite() && self.rect().is_well_formed()
    }
}

/// Trait for object detection inference backends.
///
/// # Example
///
/// ```ignore
/// use gatecount_rs::{DetectionSource, RawDetection};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<RawDetection>, Self::Error> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    type Error;

    /// Run inference on raw image data.
    ///
    /// Returns every detection the model produced, in detector order; class
    /// and confidence filtering happen downstream.
    fn detect(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawDetection>, Self::Error>;
}
