//! Traffic gate counting on top of multi-object tracking.
//!
//! Detections from an object detector are filtered and handed to a tracker;
//! every confirmed track is then run through two horizontal gates (entry and
//! exit) and a dwell-time monitor. The result per frame is a pair of
//! monotonic counters plus the set of identities that have been present long
//! enough to be considered blocking.
//!
//! ```ignore
//! use gatecount_rs::{FrameOrchestrator, SessionConfig};
//!
//! let config = SessionConfig::load("gates.yaml")?;
//! let mut orchestrator = FrameOrchestrator::with_byte_tracker(detector, config)?;
//! let report = orchestrator.process_frame(&pixels, 640, 360, now)?;
//! println!("entries={} exits={}", report.counts.entries, report.counts.exits);
//! ```

pub mod config;
pub mod error;
pub mod gates;
pub mod geometry;
pub mod integration;
pub mod tracker;
pub mod vehicle;

pub use config::SessionConfig;
pub use error::{ConfigError, SessionError};
pub use gates::{
    BlockingMonitor, CountAggregator, CountSnapshot, CrossingTransition, Gate, GateSession,
    TrackId, TrackObservation, TrackPhase, TrackRecord, TrackStateStore,
};
pub use geometry::{LineSegment, Point, has_crossed};
pub use integration::{
    AnnotatedTrack, ConfirmedTrack, DetectionBuilder, DetectionSource, Frame, FrameOrchestrator,
    FrameReport, FrameSource, FrameStride, GateEvent, RawDetection, SessionSummary, TrackSource,
    TrackUpdate,
};
pub use tracker::{BYTETracker, Detection, Rect, STrack, TrackState, TrackerConfig};
pub use vehicle::VehicleClass;
