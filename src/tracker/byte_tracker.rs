//! BYTETracker: two-stage association of high and low confidence detections.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::{Rect, iou_batch};
use crate::tracker::strack::{STrack, TrackState};

/// Configuration for the BYTETracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Detections at or above this score take part in the first association
    pub track_thresh: f32,
    /// Unmatched detections at or above this score start a new track
    pub new_track_thresh: f32,
    /// Maximum fused IoU cost for a first-stage match
    pub match_thresh: f32,
    /// Frames a lost track is kept at 30 fps
    pub track_buffer: u32,
    pub frame_rate: f32,
    /// Associations required before a track is reported as confirmed
    pub min_hits: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            track_thresh: 0.5,
            new_track_thresh: 0.5,
            match_thresh: 0.8,
            track_buffer: 30,
            frame_rate: 30.0,
            min_hits: 3,
        }
    }
}

impl TrackerConfig {
    /// Frames a lost track survives before it is retired.
    pub fn max_time_lost(&self) -> u32 {
        (self.frame_rate / 30.0 * self.track_buffer as f32) as u32
    }
}

pub struct BYTETracker {
    tracked_stracks: Vec<STrack>,
    lost_stracks: Vec<STrack>,
    frame_id: u32,
    next_id: u64,
    config: TrackerConfig,
    max_time_lost: u32,
    kalman_filter: KalmanFilter,
    retired: Vec<u64>,
}

impl BYTETracker {
    pub fn new(config: TrackerConfig) -> Self {
        let max_time_lost = config.max_time_lost();
        Self {
            tracked_stracks: Vec::new(),
            lost_stracks: Vec::new(),
            frame_id: 0,
            next_id: 1,
            config,
            max_time_lost,
            kalman_filter: KalmanFilter::default(),
            retired: Vec::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Identities dropped from the tracker since the last call, each reported
    /// once.
    pub fn take_retired(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.retired)
    }

    /// Advance one frame and return every activated track.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<STrack> {
        self.frame_id += 1;
        let known_ids = self.live_ids();

        let mut activated_stracks = Vec::new();
        let mut refind_stracks = Vec::new();
        let mut lost_stracks = Vec::new();

        // Step 1: split detections by score
        let (high, low): (Vec<_>, Vec<_>) = detections
            .into_iter()
            .filter(|det| det.score > 0.1)
            .partition(|det| det.score >= self.config.track_thresh);
        let detections: Vec<STrack> = high.iter().map(STrack::from_detection).collect();

        let (tracked, mut unconfirmed): (Vec<_>, Vec<_>) = self
            .tracked_stracks
            .drain(..)
            .partition(|track| track.is_activated);
        let mut strack_pool = joint_stracks(tracked, &self.lost_stracks);

        // Step 2: first association, high score detections
        STrack::multi_predict(&mut strack_pool, &self.kalman_filter);

        let mut dists = matching::iou_distance(&rects(&strack_pool), &rects(&detections));
        matching::fuse_score(&mut dists, &scores(&detections));

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::linear_assignment(&dists, self.config.match_thresh);

        for (itracked, idet) in matches {
            let mut track = strack_pool[itracked].clone();
            let was_tracked = track.state == TrackState::Tracked;
            associate(&mut track, &detections[idet], &self.kalman_filter, self.frame_id);
            if was_tracked {
                activated_stracks.push(track);
            } else {
                refind_stracks.push(track);
            }
        }

        // Step 3: second association, low score detections against the
        // tracks still tracked
        let detections_second: Vec<STrack> = low.iter().map(STrack::from_detection).collect();
        let r_tracked_stracks: Vec<STrack> = unmatched_tracks
            .iter()
            .map(|&idx| &strack_pool[idx])
            .filter(|track| track.state == TrackState::Tracked)
            .cloned()
            .collect();

        let dists_second =
            matching::iou_distance(&rects(&r_tracked_stracks), &rects(&detections_second));
        let AssignmentResult {
            matches: matches_second,
            unmatched_tracks: unmatched_tracks_second,
            ..
        } = matching::linear_assignment(&dists_second, 0.5);

        for (itracked, idet) in matches_second {
            let mut track = r_tracked_stracks[itracked].clone();
            associate(
                &mut track,
                &detections_second[idet],
                &self.kalman_filter,
                self.frame_id,
            );
            activated_stracks.push(track);
        }

        for idx in unmatched_tracks_second {
            let mut track = r_tracked_stracks[idx].clone();
            track.mark_lost();
            lost_stracks.push(track);
        }

        // Unconfirmed tracks, usually with only their starting frame
        let detections_rem: Vec<STrack> = unmatched_detections
            .iter()
            .map(|&idx| detections[idx].clone())
            .collect();

        let mut dist_unconfirmed =
            matching::iou_distance(&rects(&unconfirmed), &rects(&detections_rem));
        matching::fuse_score(&mut dist_unconfirmed, &scores(&detections_rem));

        let AssignmentResult {
            matches: matches_unconfirmed,
            unmatched_detections: unmatched_new,
            ..
        } = matching::linear_assignment(&dist_unconfirmed, 0.7);

        for (itracked, idet) in matches_unconfirmed {
            unconfirmed[itracked].update(&detections_rem[idet], &self.kalman_filter, self.frame_id);
            activated_stracks.push(unconfirmed[itracked].clone());
        }

        // Step 4: start new tracks
        for idx in unmatched_new {
            let mut track = detections_rem[idx].clone();
            if track.score < self.config.new_track_thresh {
                continue;
            }
            let track_id = self.allocate_id();
            track.activate(&self.kalman_filter, self.frame_id, track_id);
            activated_stracks.push(track);
        }

        // Step 5: expire lost tracks
        for track in self.lost_stracks.drain(..) {
            if self.frame_id - track.end_frame() <= self.max_time_lost {
                lost_stracks.push(track);
            }
        }

        self.tracked_stracks = activated_stracks
            .into_iter()
            .chain(refind_stracks)
            .filter(|track| track.state == TrackState::Tracked)
            .collect();

        let lost_stracks = sub_stracks(lost_stracks, &self.tracked_stracks);
        let (tracked, lost) = remove_duplicate_stracks(&self.tracked_stracks, &lost_stracks);
        self.tracked_stracks = tracked;
        self.lost_stracks = lost;

        // Anything known before this frame and absent now has been retired:
        // expired, unconfirmed and unmatched, or suppressed as a duplicate.
        let live_ids = self.live_ids();
        let mut retired: Vec<u64> = known_ids.difference(&live_ids).copied().collect();
        retired.sort_unstable();
        self.retired.extend(retired);

        self.tracked_stracks
            .iter()
            .filter(|track| track.is_activated)
            .cloned()
            .collect()
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn live_ids(&self) -> HashSet<u64> {
        self.tracked_stracks
            .iter()
            .chain(&self.lost_stracks)
            .map(|track| track.track_id)
            .collect()
    }
}

/// Update a track already being followed, or resume it if it was lost.
fn associate(track: &mut STrack, detection: &STrack, kalman_filter: &KalmanFilter, frame_id: u32) {
    if track.state == TrackState::Tracked {
        track.update(detection, kalman_filter, frame_id);
    } else {
        track.re_activate(detection, kalman_filter, frame_id);
    }
}

fn rects(tracks: &[STrack]) -> Vec<Rect> {
    tracks.iter().map(STrack::rect).collect()
}

fn scores(tracks: &[STrack]) -> Vec<f32> {
    tracks.iter().map(|track| track.score).collect()
}

pub fn joint_stracks(tlista: Vec<STrack>, tlistb: &[STrack]) -> Vec<STrack> {
    let mut exists: HashSet<u64> = tlista.iter().map(|t| t.track_id).collect();
    let mut res = tlista;
    for t in tlistb {
        if exists.insert(t.track_id) {
            res.push(t.clone());
        }
    }
    res
}

pub fn sub_stracks(tlista: Vec<STrack>, tlistb: &[STrack]) -> Vec<STrack> {
    let b_ids: HashSet<u64> = tlistb.iter().map(|t| t.track_id).collect();
    tlista
        .into_iter()
        .filter(|t| !b_ids.contains(&t.track_id))
        .collect()
}

/// Drop the younger of any tracked/lost pair overlapping by more than 0.85 IoU.
pub fn remove_duplicate_stracks(
    stracksa: &[STrack],
    stracksb: &[STrack],
) -> (Vec<STrack>, Vec<STrack>) {
    if stracksa.is_empty() || stracksb.is_empty() {
        return (stracksa.to_vec(), stracksb.to_vec());
    }

    let ious = iou_batch(&rects(stracksa), &rects(stracksb));
    let mut dupa = vec![false; stracksa.len()];
    let mut dupb = vec![false; stracksb.len()];

    for ((i, j), &iou) in ious.indexed_iter() {
        if iou > 0.85 {
            let age_a = stracksa[i].frame_id - stracksa[i].start_frame;
            let age_b = stracksb[j].frame_id - stracksb[j].start_frame;
            if age_a > age_b {
                dupb[j] = true;
            } else {
                dupa[i] = true;
            }
        }
    }

    let keep = |tracks: &[STrack], dup: &[bool]| -> Vec<STrack> {
        tracks
            .iter()
            .zip(dup)
            .filter(|(_, dup)| !**dup)
            .map(|(t, _)| t.clone())
            .collect()
    };
    (keep(stracksa, &dupa), keep(stracksb, &dupb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x: f32, y: f32) -> Detection {
        Detection::new(x, y, x + 40.0, y + 40.0, 0.9, 2)
    }

    #[test]
    fn test_ids_are_per_tracker() {
        let mut a = BYTETracker::new(TrackerConfig::default());
        let mut b = BYTETracker::new(TrackerConfig::default());
        let ta = a.update(vec![det(0.0, 0.0)]);
        let tb = b.update(vec![det(300.0, 300.0)]);
        assert_eq!(ta[0].track_id, 1);
        assert_eq!(tb[0].track_id, 1);
    }

    #[test]
    fn test_unmatched_unconfirmed_track_is_retired() {
        let mut tracker = BYTETracker::new(TrackerConfig::default());
        tracker.update(vec![det(0.0, 0.0)]);
        // A second object appears on frame 2 and vanishes on frame 3.
        tracker.update(vec![det(2.0, 0.0), det(400.0, 400.0)]);
        assert!(tracker.take_retired().is_empty());

        tracker.update(vec![det(4.0, 0.0)]);
        assert_eq!(tracker.take_retired(), vec![2]);
        assert!(tracker.take_retired().is_empty());
    }

    #[test]
    fn test_new_track_threshold() {
        let weak = |x: f32, score: f32| Detection::new(x, 0.0, x + 40.0, 40.0, score, 2);

        let mut tracker = BYTETracker::new(TrackerConfig::default());
        assert_eq!(tracker.update(vec![weak(0.0, 0.55)]).len(), 1);

        let strict = TrackerConfig {
            new_track_thresh: 0.6,
            ..Default::default()
        };
        let mut tracker = BYTETracker::new(strict);
        assert!(tracker.update(vec![weak(0.0, 0.55)]).is_empty());
        assert!(tracker.update(vec![weak(2.0, 0.55)]).is_empty());
    }

    #[test]
    fn test_lost_track_expires_after_buffer() {
        let config = TrackerConfig {
            track_buffer: 2,
            ..Default::default()
        };
        let mut tracker = BYTETracker::new(config);
        tracker.update(vec![det(0.0, 0.0)]);
        tracker.update(vec![det(1.0, 0.0)]);

        let mut retired = Vec::new();
        for _ in 0..5 {
            assert!(tracker.update(Vec::new()).is_empty());
            retired.extend(tracker.take_retired());
        }
        assert_eq!(retired, vec![1]);
    }
}
