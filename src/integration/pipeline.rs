//! FrameOrchestrator: detection, tracking and gate events for one session.

use std::ops::ControlFlow;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::error::{BoxError, ConfigError, SessionError};
use crate::gates::{CountSnapshot, CrossingTransition, Gate, GateSession, TrackId};
use crate::integration::{DetectionSource, FrameSource, RawDetection, TrackSource};
use crate::tracker::{BYTETracker, Detection, Rect};
use crate::vehicle::VehicleClass;

/// A confirmed track as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTrack {
    pub identity: TrackId,
    pub class: VehicleClass,
    pub bbox: Rect,
    pub blocking: bool,
}

/// A gate that latched during the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateEvent {
    pub identity: TrackId,
    pub gate: Gate,
}

/// Everything the output side needs to render one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Zero-based index among processed (not skipped) frames
    pub sequence: u64,
    pub counts: CountSnapshot,
    pub tracks: Vec<AnnotatedTrack>,
    pub events: Vec<GateEvent>,
}

impl FrameReport {
    pub fn blocking_ids(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks
            .iter()
            .filter(|track| track.blocking)
            .map(|track| track.identity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub counts: CountSnapshot,
    pub frames_processed: u64,
    pub frames_skipped: u64,
    /// Track records still held when the session ended
    pub active_records: usize,
}

/// Admits every `stride`-th frame, starting with the first.
#[derive(Debug, Clone)]
pub struct FrameStride {
    stride: u64,
    seen: u64,
}

impl FrameStride {
    pub fn new(stride: u32) -> Self {
        Self {
            stride: u64::from(stride.max(1)),
            seen: 0,
        }
    }

    pub fn admit(&mut self) -> bool {
        let admitted = self.seen % self.stride == 0;
        self.seen += 1;
        admitted
    }
}

/// Runs one session: detector, tracker and gate session in sequence, one
/// frame at a time.
///
/// Counters and records are consistent between any two calls, so a session
/// can be abandoned at any frame boundary.
pub struct FrameOrchestrator<D: DetectionSource, T: TrackSource = BYTETracker> {
    detector: D,
    tracker: T,
    session: GateSession,
    config: SessionConfig,
    frames_processed: u64,
    frames_skipped: u64,
}

impl<D: DetectionSource> FrameOrchestrator<D, BYTETracker> {
    /// Build an orchestrator around the bundled ByteTrack tracker.
    pub fn with_byte_tracker(detector: D, config: SessionConfig) -> Result<Self, ConfigError> {
        let tracker = BYTETracker::new(config.tracker.clone());
        Self::new(detector, tracker, config)
    }

    /// Load a YAML session config and build an orchestrator from it.
    pub fn from_config_file(detector: D, path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let config = SessionConfig::load(path)?;
        Ok(Self::with_byte_tracker(detector, config)?)
    }
}

impl<D: DetectionSource, T: TrackSource> FrameOrchestrator<D, T> {
    /// Validate `config` and start a fresh session.
    pub fn new(detector: D, tracker: T, config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        for (gate, line) in [("entry", &config.entry_line), ("exit", &config.exit_line)] {
            if !line.is_horizontal() {
                warn!(gate, ?line, "gate line is not horizontal and will never register a crossing");
            }
        }
        info!(
            dwell_secs = config.blocking_dwell_secs,
            confidence = config.confidence_threshold,
            stride = config.frame_stride,
            "gate session started"
        );

        Ok(Self {
            detector,
            tracker,
            session: GateSession::new(
                config.entry_line,
                config.exit_line,
                config.blocking_dwell_secs,
            ),
            config,
            frames_processed: 0,
            frames_skipped: 0,
        })
    }

    /// Detect, track and evaluate one frame captured at `now` (seconds).
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        now: f64,
    ) -> Result<FrameReport, D::Error> {
        let detections = self.detector.detect(input, width, height)?;
        Ok(self.process_detections(detections, now))
    }

    /// Run already-computed detector output through tracking and the gates.
    pub fn process_detections(&mut self, detections: Vec<RawDetection>, now: f64) -> FrameReport {
        let detections: Vec<Detection> = detections
            .iter()
            .filter_map(|det| self.admit_detection(det))
            .collect();

        let update = self.tracker.track(detections);

        let mut tracks = Vec::with_capacity(update.confirmed.len());
        let mut events = Vec::new();
        for track in update.confirmed {
            if !track.bbox.is_well_formed() {
                warn!(track = track.track_id, bbox = ?track.bbox, "dropping malformed track");
                continue;
            }
            let class = VehicleClass::from_class_id(track.det_class);
            if !self.config.is_recognized(class) {
                warn!(
                    track = track.track_id,
                    class_id = track.det_class,
                    "dropping track with unrecognized class"
                );
                continue;
            }

            let identity = TrackId(track.track_id);
            let observation = self
                .session
                .observe(identity, class, track.bbox.center(), now);
            if let CrossingTransition::Crossed(gate) = observation.transition {
                events.push(GateEvent { identity, gate });
            }
            tracks.push(AnnotatedTrack {
                identity,
                class,
                bbox: track.bbox,
                blocking: observation.blocking,
            });
        }

        for id in update.retired {
            if self.session.evict(TrackId(id)) {
                debug!(track = id, "evicted retired track");
            }
        }
        if let Some(ttl) = self.config.record_ttl_secs {
            let evicted = self.session.evict_idle(now, ttl);
            if evicted > 0 {
                debug!(evicted, "evicted idle tracks");
            }
        }

        let sequence = self.frames_processed;
        self.frames_processed += 1;
        FrameReport {
            sequence,
            counts: self.session.snapshot(),
            tracks,
            events,
        }
    }

    /// Process a whole input, admitting frames per the configured stride.
    ///
    /// `sink` sees each report and may stop the session early by returning
    /// `ControlFlow::Break`.
    pub fn run<S, F>(&mut self, source: &mut S, mut sink: F) -> Result<SessionSummary, SessionError>
    where
        S: FrameSource,
        S::Error: Into<BoxError>,
        D::Error: Into<BoxError>,
        F: FnMut(&FrameReport) -> ControlFlow<()>,
    {
        let mut stride = FrameStride::new(self.config.frame_stride);

        while let Some(frame) = source.next_frame().map_err(SessionError::source_error)? {
            if !stride.admit() {
                self.frames_skipped += 1;
                continue;
            }
            let report = self
                .process_frame(&frame.data, frame.width, frame.height, frame.timestamp)
                .map_err(SessionError::detector_error)?;
            if sink(&report).is_break() {
                info!(sequence = report.sequence, "session stopped by caller");
                break;
            }
        }

        let summary = self.summary();
        info!(
            entries = summary.counts.entries,
            exits = summary.counts.exits,
            frames = summary.frames_processed,
            "gate session finished"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            counts: self.session.snapshot(),
            frames_processed: self.frames_processed,
            frames_skipped: self.frames_skipped,
            active_records: self.session.store().len(),
        }
    }

    fn admit_detection(&self, det: &RawDetection) -> Option<Detection> {
        if !det.is_well_formed() {
            warn!(bbox = ?det.bbox, confidence = det.confidence, "dropping malformed detection");
            return None;
        }
        let class = VehicleClass::from_class_id(det.class_id);
        if !self.config.is_recognized(class) || det.confidence <= self.config.confidence_threshold
        {
            trace!(class_id = det.class_id, confidence = det.confidence, "detection filtered");
            return None;
        }
        Some(Detection::from_rect(det.rect(), det.confidence, det.class_id))
    }

    pub fn counts(&self) -> CountSnapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &GateSession {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        &mut self.tracker
    }
}
