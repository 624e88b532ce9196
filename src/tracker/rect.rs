use ndarray::Array2;

use crate::geometry::Point;

/// Axis-aligned bounding box stored as top-left corner plus size.
///
/// Conversions cover the formats used across the pipeline:
/// - LTRB: left, top, right, bottom (detector output, rendering)
/// - TLWH: left, top, width, height (tracker input)
/// - XYAH: center x, center y, aspect ratio (w/h), height (Kalman state)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    #[inline]
    pub fn from_xyah(cx: f32, cy: f32, aspect_ratio: f32, height: f32) -> Self {
        let width = aspect_ratio * height;
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn to_ltrb(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    pub fn to_xyah(&self) -> [f64; 4] {
        let center = self.center();
        let aspect_ratio = if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        };
        [
            center.x as f64,
            center.y as f64,
            aspect_ratio as f64,
            self.height as f64,
        ]
    }

    /// Midpoint of the box; the position gates are tested against.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Finite coordinates and a non-negative size.
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }

    pub fn iou(&self, other: &Rect) -> f32 {
        let [l1, t1, r1, b1] = self.to_ltrb();
        let [l2, t2, r2, b2] = other.to_ltrb();

        let inter_w = (r1.min(r2) - l1.max(l2)).max(0.0);
        let inter_h = (b1.min(b2) - t1.max(t2)).max(0.0);
        let inter = inter_w * inter_h;
        let union = self.area() + other.area() - inter;

        if union > 0.0 { inter / union } else { 0.0 }
    }
}

/// Pairwise IoU of two box sets as an (M, N) matrix.
pub fn iou_batch(boxes_a: &[Rect], boxes_b: &[Rect]) -> Array2<f32> {
    Array2::from_shape_fn((boxes_a.len(), boxes_b.len()), |(i, j)| {
        boxes_a[i].iou(&boxes_b[j])
    })
}
