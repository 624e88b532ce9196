//! Detection input and track-to-detection assignment.

use ndarray::Array2;

use crate::tracker::rect::{Rect, iou_batch};

/// A detection handed to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: Rect,
    pub score: f32,
    /// Detector class id, carried through to the track unchanged.
    pub class_id: i64,
}

impl Detection {
    /// Build a detection from LTRB coordinates.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32, class_id: i64) -> Self {
        Self {
            bbox: Rect::from_ltrb(x1, y1, x2, y2),
            score,
            class_id,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32, class_id: i64) -> Self {
        Self {
            bbox,
            score,
            class_id,
        }
    }
}

/// `1 - IoU` for every (track, detection) pair.
pub fn iou_distance(track_boxes: &[Rect], det_boxes: &[Rect]) -> Array2<f32> {
    iou_batch(track_boxes, det_boxes).mapv(|iou| 1.0 - iou)
}

/// Weight IoU similarity by detection confidence.
pub fn fuse_score(cost_matrix: &mut Array2<f32>, scores: &[f32]) {
    for ((_, j), cost) in cost_matrix.indexed_iter_mut() {
        *cost = 1.0 - (1.0 - *cost) * scores[j];
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Minimum-cost assignment; pairs costing more than `thresh` stay unmatched.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (rows, cols) = cost_matrix.dim();
    if rows == 0 || cols == 0 {
        return AssignmentResult {
            matches: Vec::new(),
            unmatched_tracks: (0..rows).collect(),
            unmatched_detections: (0..cols).collect(),
        };
    }

    // lapjv wants a square matrix; pad with a prohibitive cost.
    let size = rows.max(cols);
    let padded = Array2::from_shape_fn((size, size), |(i, j)| {
        if i < rows && j < cols {
            cost_matrix[[i, j]] as f64
        } else {
            1e6
        }
    });

    let mut result = AssignmentResult::default();
    let mut detection_taken = vec![false; cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate().take(rows) {
                if col < cols && cost_matrix[[row, col]] <= thresh {
                    result.matches.push((row, col));
                    detection_taken[col] = true;
                } else {
                    result.unmatched_tracks.push(row);
                }
            }
        }
        Err(_) => result.unmatched_tracks = (0..rows).collect(),
    }

    result.unmatched_detections = detection_taken
        .iter()
        .enumerate()
        .filter_map(|(j, &taken)| (!taken).then_some(j))
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_assignment_respects_threshold() {
        let costs = array![[0.1, 0.9], [0.95, 0.85]];
        let result = linear_assignment(&costs, 0.8);
        assert_eq!(result.matches, vec![(0, 0)]);
        assert_eq!(result.unmatched_tracks, vec![1]);
        assert_eq!(result.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_assignment_rectangular() {
        let costs = array![[0.7, 0.2, 0.9]];
        let result = linear_assignment(&costs, 0.5);
        assert_eq!(result.matches, vec![(0, 1)]);
        assert!(result.unmatched_tracks.is_empty());
        assert_eq!(result.unmatched_detections, vec![0, 2]);
    }

    #[test]
    fn test_assignment_empty() {
        let costs = Array2::<f32>::zeros((0, 3));
        let result = linear_assignment(&costs, 0.5);
        assert!(result.matches.is_empty());
        assert_eq!(result.unmatched_detections, vec![0, 1, 2]);
    }

    #[test]
    fn test_fuse_score() {
        let mut costs = array![[0.5_f32]];
        fuse_score(&mut costs, &[0.5]);
        assert!((costs[[0, 0]] - 0.75).abs() < 1e-6);
    }
}
