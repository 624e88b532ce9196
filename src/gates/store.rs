//! Per-identity track records and gate latches.

use std::collections::HashMap;

use tracing::debug;

use crate::geometry::{LineSegment, Point, has_crossed};
use crate::vehicle::VehicleClass;

/// Opaque identity assigned by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(pub u64);

impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One of the two directional gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Entry,
    Exit,
}

/// Outcome of feeding one observation into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossingTransition {
    /// First sighting of the identity; only the baseline position was stored.
    Baseline,
    /// Known identity, no gate latched during this update.
    NoCrossing,
    /// The given gate was unlatched and has just been crossed.
    Crossed(Gate),
}

/// Latch state of a single identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    Unlatched,
    EntryLatched,
    ExitLatched,
    BothLatched,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub identity: TrackId,
    pub vehicle_class: VehicleClass,
    /// Center of the most recent bounding box.
    pub last_center: Point,
    pub entry_crossed: bool,
    pub exit_crossed: bool,
    pub first_seen_at: f64,
    pub last_seen_at: f64,
}

impl TrackRecord {
    fn new(identity: TrackId, vehicle_class: VehicleClass, center: Point, now: f64) -> Self {
        Self {
            identity,
            vehicle_class,
            last_center: center,
            entry_crossed: false,
            exit_crossed: false,
            first_seen_at: now,
            last_seen_at: now,
        }
    }

    pub fn phase(&self) -> TrackPhase {
        match (self.entry_crossed, self.exit_crossed) {
            (false, false) => TrackPhase::Unlatched,
            (true, false) => TrackPhase::EntryLatched,
            (false, true) => TrackPhase::ExitLatched,
            (true, true) => TrackPhase::BothLatched,
        }
    }

    pub fn is_latched(&self, gate: Gate) -> bool {
        match gate {
            Gate::Entry => self.entry_crossed,
            Gate::Exit => self.exit_crossed,
        }
    }
}

/// Owned table of track records keyed by identity, scoped to one session.
#[derive(Debug, Clone)]
pub struct TrackStateStore {
    entry_line: LineSegment,
    exit_line: LineSegment,
    records: HashMap<TrackId, TrackRecord>,
}

impl TrackStateStore {
    pub fn new(entry_line: LineSegment, exit_line: LineSegment) -> Self {
        Self {
            entry_line,
            exit_line,
            records: HashMap::new(),
        }
    }

    /// Record an observation of `identity` and report which gate, if any,
    /// latched because of it.
    ///
    /// The entry gate is tested first. When it latches in this call the exit
    /// gate is not tested, so at most one gate latches per update.
    pub fn upsert(
        &mut self,
        identity: TrackId,
        vehicle_class: VehicleClass,
        center: Point,
        now: f64,
    ) -> CrossingTransition {
        let Some(record) = self.records.get_mut(&identity) else {
            self.records.insert(
                identity,
                TrackRecord::new(identity, vehicle_class, center, now),
            );
            return CrossingTransition::Baseline;
        };

        let previous = record.last_center;
        let transition = if !record.entry_crossed && has_crossed(previous, center, &self.entry_line)
        {
            record.entry_crossed = true;
            CrossingTransition::Crossed(Gate::Entry)
        } else if !record.exit_crossed && has_crossed(previous, center, &self.exit_line) {
            record.exit_crossed = true;
            CrossingTransition::Crossed(Gate::Exit)
        } else {
            CrossingTransition::NoCrossing
        };

        record.vehicle_class = vehicle_class;
        record.last_center = center;
        record.last_seen_at = now;

        if let CrossingTransition::Crossed(gate) = transition {
            debug!(track = %identity, ?gate, y = center.y, "gate latched");
        }
        transition
    }

    pub fn get(&self, identity: TrackId) -> Option<&TrackRecord> {
        self.records.get(&identity)
    }

    /// Drop the record of an identity the tracker has retired.
    pub fn evict(&mut self, identity: TrackId) -> Option<TrackRecord> {
        self.records.remove(&identity)
    }

    /// Drop every record not observed within `max_idle` of `now`.
    /// Returns the number of evicted records.
    pub fn evict_idle(&mut self, now: f64, max_idle: f64) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| now - record.last_seen_at <= max_idle);
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TrackRecord> {
        self.records.values()
    }

    pub fn entry_line(&self) -> &LineSegment {
        &self.entry_line
    }

    pub fn exit_line(&self) -> &LineSegment {
        &self.exit_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TrackStateStore {
        TrackStateStore::new(
            LineSegment::new((170.0, 50.0), (260.0, 50.0)),
            LineSegment::new((300.0, 120.0), (450.0, 120.0)),
        )
    }

    fn observe(store: &mut TrackStateStore, id: u64, y: f32, now: f64) -> CrossingTransition {
        store.upsert(TrackId(id), VehicleClass::Car, Point::new(200.0, y), now)
    }

    #[test]
    fn test_first_observation_is_baseline() {
        let mut store = store();
        // Already below both gates: still no crossing without a prior point.
        assert_eq!(observe(&mut store, 1, 500.0, 0.0), CrossingTransition::Baseline);

        let record = store.get(TrackId(1)).unwrap();
        assert_eq!(record.phase(), TrackPhase::Unlatched);
        assert_eq!(record.first_seen_at, 0.0);
        assert_eq!(record.last_seen_at, 0.0);
        assert!(store.get(TrackId(2)).is_none());
    }

    #[test]
    fn test_entry_latches_once() {
        let mut store = store();
        observe(&mut store, 1, 40.0, 0.0);
        assert_eq!(
            observe(&mut store, 1, 55.0, 1.0),
            CrossingTransition::Crossed(Gate::Entry)
        );
        assert_eq!(observe(&mut store, 1, 60.0, 2.0), CrossingTransition::NoCrossing);

        // Back above and down again: the latch holds.
        observe(&mut store, 1, 30.0, 3.0);
        assert_eq!(observe(&mut store, 1, 52.0, 4.0), CrossingTransition::NoCrossing);

        let record = store.get(TrackId(1)).unwrap();
        assert_eq!(record.phase(), TrackPhase::EntryLatched);
        assert_eq!(record.last_center, Point::new(200.0, 52.0));
        assert_eq!(record.first_seen_at, 0.0);
        assert_eq!(record.last_seen_at, 4.0);
    }

    #[test]
    fn test_exit_after_entry() {
        let mut store = store();
        observe(&mut store, 7, 10.0, 0.0);
        observe(&mut store, 7, 60.0, 1.0);
        assert_eq!(
            observe(&mut store, 7, 130.0, 2.0),
            CrossingTransition::Crossed(Gate::Exit)
        );
        assert_eq!(store.get(TrackId(7)).unwrap().phase(), TrackPhase::BothLatched);
    }

    #[test]
    fn test_entry_wins_simultaneous_crossing() {
        let mut store = store();
        observe(&mut store, 3, 10.0, 0.0);
        // One step across both gates.
        assert_eq!(
            observe(&mut store, 3, 200.0, 1.0),
            CrossingTransition::Crossed(Gate::Entry)
        );
        let record = store.get(TrackId(3)).unwrap();
        assert!(record.entry_crossed);
        assert!(!record.exit_crossed);
    }

    #[test]
    fn test_exit_only_track() {
        let mut store = store();
        observe(&mut store, 4, 100.0, 0.0);
        assert_eq!(
            observe(&mut store, 4, 125.0, 1.0),
            CrossingTransition::Crossed(Gate::Exit)
        );
        assert_eq!(store.get(TrackId(4)).unwrap().phase(), TrackPhase::ExitLatched);
    }

    #[test]
    fn test_class_follows_latest_observation() {
        let mut store = store();
        store.upsert(TrackId(1), VehicleClass::Car, Point::new(0.0, 0.0), 0.0);
        store.upsert(TrackId(1), VehicleClass::Truck, Point::new(0.0, 1.0), 1.0);
        assert_eq!(store.get(TrackId(1)).unwrap().vehicle_class, VehicleClass::Truck);
    }

    #[test]
    fn test_eviction() {
        let mut store = store();
        observe(&mut store, 1, 10.0, 0.0);
        observe(&mut store, 2, 10.0, 5.0);
        observe(&mut store, 3, 10.0, 9.0);

        assert!(store.evict(TrackId(2)).is_some());
        assert!(store.evict(TrackId(2)).is_none());
        assert_eq!(store.len(), 2);

        assert_eq!(store.evict_idle(10.0, 3.0), 1);
        assert!(store.get(TrackId(1)).is_none());
        assert!(store.get(TrackId(3)).is_some());

        // An evicted identity that comes back starts over from a baseline.
        assert_eq!(observe(&mut store, 1, 60.0, 11.0), CrossingTransition::Baseline);
    }
}
