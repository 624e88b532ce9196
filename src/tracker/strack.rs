//! Single object track (STrack) for multi-object tracking.

use crate::tracker::kalman_filter::{KalmanFilter, StateCovariance, StateMean};
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;

/// Track lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Created from a detection, no Kalman state yet
    #[default]
    New,
    /// Associated with a detection in the latest frame
    Tracked,
    /// Missed in recent frames, kept for re-association
    Lost,
}

/// Single object track.
#[derive(Debug, Clone)]
pub struct STrack {
    /// Identifier allocated by the owning tracker, 0 until activated
    pub track_id: u64,
    pub state: TrackState,
    /// Whether the track survived its first association
    pub is_activated: bool,
    /// Confidence of the latest associated detection
    pub score: f32,
    /// Class id of the latest associated detection
    pub class_id: i64,
    /// Number of detections associated with this track so far
    pub hits: u32,
    pub frame_id: u32,
    pub start_frame: u32,
    pub tracklet_len: u32,
    /// Box of the detection this track was created from
    pub tlwh: Rect,
    mean: Option<StateMean>,
    covariance: Option<StateCovariance>,
}

impl STrack {
    pub fn new(tlwh: Rect, score: f32, class_id: i64) -> Self {
        Self {
            track_id: 0,
            state: TrackState::New,
            is_activated: false,
            score,
            class_id,
            hits: 0,
            frame_id: 0,
            start_frame: 0,
            tracklet_len: 0,
            tlwh,
            mean: None,
            covariance: None,
        }
    }

    pub fn from_detection(detection: &Detection) -> Self {
        Self::new(detection.bbox, detection.score, detection.class_id)
    }

    /// Current box estimate: the Kalman mean once initialized, otherwise the
    /// originating detection.
    pub fn rect(&self) -> Rect {
        match &self.mean {
            Some(mean) => Rect::from_xyah(
                mean[0] as f32,
                mean[1] as f32,
                mean[2] as f32,
                mean[3] as f32,
            ),
            None => self.tlwh,
        }
    }

    pub fn end_frame(&self) -> u32 {
        self.frame_id
    }

    /// Confirmed once activated and associated at least `min_hits` times.
    pub fn is_confirmed(&self, min_hits: u32) -> bool {
        self.is_activated && self.state == TrackState::Tracked && self.hits >= min_hits
    }

    pub fn activate(&mut self, kalman_filter: &KalmanFilter, frame_id: u32, track_id: u64) {
        self.track_id = track_id;

        let (mean, covariance) = kalman_filter.initiate(self.tlwh.to_xyah());
        self.mean = Some(mean);
        self.covariance = Some(covariance);

        self.hits = 1;
        self.tracklet_len = 0;
        self.state = TrackState::Tracked;
        // Tracks born in the very first frame need no second association.
        if frame_id == 1 {
            self.is_activated = true;
        }
        self.frame_id = frame_id;
        self.start_frame = frame_id;
    }

    /// Resume a lost track with a fresh detection.
    pub fn re_activate(&mut self, detection: &STrack, kalman_filter: &KalmanFilter, frame_id: u32) {
        self.correct(detection, kalman_filter);
        self.tracklet_len = 0;
        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.frame_id = frame_id;
    }

    pub fn update(&mut self, detection: &STrack, kalman_filter: &KalmanFilter, frame_id: u32) {
        self.correct(detection, kalman_filter);
        self.tracklet_len += 1;
        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.frame_id = frame_id;
    }

    fn correct(&mut self, detection: &STrack, kalman_filter: &KalmanFilter) {
        if let (Some(mean), Some(cov)) = (&self.mean, &self.covariance) {
            // A singular innovation keeps the predicted state.
            if let Some((mean, cov)) = kalman_filter.update(mean, cov, detection.tlwh.to_xyah()) {
                self.mean = Some(mean);
                self.covariance = Some(cov);
            }
        }
        self.hits += 1;
        self.score = detection.score;
        self.class_id = detection.class_id;
    }

    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        if let (Some(mean), Some(cov)) = (&self.mean, &self.covariance) {
            let mut mean = *mean;
            if self.state != TrackState::Tracked {
                mean[7] = 0.0;
            }
            let (mean, cov) = kalman_filter.predict(&mean, cov);
            self.mean = Some(mean);
            self.covariance = Some(cov);
        }
    }

    pub fn mark_lost(&mut self) {
        self.state = TrackState::Lost;
    }

    pub fn multi_predict(stracks: &mut [STrack], kalman_filter: &KalmanFilter) {
        for strack in stracks.iter_mut() {
            strack.predict(kalman_filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: f32, class_id: i64) -> STrack {
        STrack::from_detection(&Detection::new(x, 0.0, x + 20.0, 40.0, 0.9, class_id))
    }

    #[test]
    fn test_confirmation_needs_hits() {
        let kf = KalmanFilter::new();
        let mut track = detection(0.0, 2);
        track.activate(&kf, 1, 7);
        assert_eq!(track.track_id, 7);
        assert!(track.is_confirmed(1));
        assert!(!track.is_confirmed(3));

        track.update(&detection(2.0, 2), &kf, 2);
        track.update(&detection(4.0, 2), &kf, 3);
        assert_eq!(track.hits, 3);
        assert!(track.is_confirmed(3));

        track.mark_lost();
        assert!(!track.is_confirmed(3));
    }

    #[test]
    fn test_late_tracks_wait_for_second_association() {
        let kf = KalmanFilter::new();
        let mut track = detection(0.0, 2);
        track.activate(&kf, 5, 1);
        assert!(!track.is_activated);
        track.update(&detection(1.0, 2), &kf, 6);
        assert!(track.is_activated);
    }

    #[test]
    fn test_class_follows_latest_detection() {
        let kf = KalmanFilter::new();
        let mut track = detection(0.0, 2);
        track.activate(&kf, 1, 1);
        track.update(&detection(1.0, 7), &kf, 2);
        assert_eq!(track.class_id, 7);
    }
}
