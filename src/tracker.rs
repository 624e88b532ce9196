//! Bundled ByteTrack multi-object tracker.
//!
//! Detections carry a class id through association, every tracker instance
//! allocates its own identities, and identities that leave the tracker are
//! reported through [`BYTETracker::take_retired`].

mod byte_tracker;
mod kalman_filter;
mod matching;
mod rect;
mod strack;

pub use byte_tracker::{BYTETracker, TrackerConfig};
pub use matching::Detection;
pub use rect::Rect;
pub use strack::{STrack, TrackState};
