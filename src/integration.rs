//! Collaborator seams and the per-frame orchestrator.
//!
//! The detector ([`DetectionSource`]), the tracker ([`TrackSource`]) and the
//! input ([`FrameSource`]) are traits so any backend can be plugged in; the
//! bundled [`BYTETracker`](crate::tracker::BYTETracker) implements
//! `TrackSource`. [`FrameOrchestrator`] drives one session over them.

mod builder;
mod detector;
mod pipeline;
mod source;
mod tracks;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, RawDetection};
pub use pipeline::{
    AnnotatedTrack, FrameOrchestrator, FrameReport, FrameStride, GateEvent, SessionSummary,
};
pub use source::{Frame, FrameSource};
pub use tracks::{ConfirmedTrack, TrackSource, TrackUpdate};

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnDetector, BurnDetectorError, BurnModel};
