use crate::gates::store::TrackRecord;

/// Flags identities that have stayed in view longer than a dwell threshold.
///
/// The threshold shares the unit of the timestamps passed to the store
/// (seconds throughout this crate).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockingMonitor {
    dwell_threshold: f64,
}

impl BlockingMonitor {
    pub fn new(dwell_threshold: f64) -> Self {
        Self { dwell_threshold }
    }

    pub fn dwell_threshold(&self) -> f64 {
        self.dwell_threshold
    }

    /// Time elapsed since the record was first seen. Clock skew never yields
    /// a negative dwell.
    pub fn dwell(record: &TrackRecord, now: f64) -> f64 {
        (now - record.first_seen_at).max(0.0)
    }

    /// `true` once the dwell strictly exceeds the threshold.
    pub fn is_blocking(&self, record: &TrackRecord, now: f64) -> bool {
        Self::dwell(record, now) > self.dwell_threshold
    }
}
