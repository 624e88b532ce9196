//! Trait for multi-object trackers feeding the gates.

use crate::tracker::{BYTETracker, Detection, Rect};

/// A track the tracker considers stable enough to report.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedTrack {
    pub track_id: u64,
    /// Class id of the detection most recently associated with the track
    pub det_class: i64,
    pub bbox: Rect,
}

/// Tracker output for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackUpdate {
    pub confirmed: Vec<ConfirmedTrack>,
    /// Identities the tracker dropped during this frame and will not report
    /// again.
    pub retired: Vec<u64>,
}

/// Trait for trackers that assign persistent identities to detections.
pub trait TrackSource {
    fn track(&mut self, detections: Vec<Detection>) -> TrackUpdate;
}

impl TrackSource for BYTETracker {
    fn track(&mut self, detections: Vec<Detection>) -> TrackUpdate {
        let min_hits = self.config().min_hits;
        let confirmed = self
            .update(detections)
            .into_iter()
            .filter(|track| track.is_confirmed(min_hits))
            .map(|track| ConfirmedTrack {
                track_id: track.track_id,
                det_class: track.class_id,
                bbox: track.rect(),
            })
            .collect();

        TrackUpdate {
            confirmed,
            retired: self.take_retired(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerConfig;

    #[test]
    fn test_byte_tracker_confirms_after_min_hits() {
        let mut tracker = BYTETracker::new(TrackerConfig::default());
        let det = |x: f32| Detection::new(x, 100.0, x + 40.0, 140.0, 0.9, 2);

        assert!(tracker.track(vec![det(100.0)]).confirmed.is_empty());
        assert!(tracker.track(vec![det(102.0)]).confirmed.is_empty());

        let update = tracker.track(vec![det(104.0)]);
        assert_eq!(update.confirmed.len(), 1);
        assert_eq!(update.confirmed[0].track_id, 1);
        assert_eq!(update.confirmed[0].det_class, 2);
        assert!(update.retired.is_empty());
    }
}
