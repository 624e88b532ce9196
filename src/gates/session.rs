//! Session context bundling the store, the blocking monitor and the counters.

use crate::gates::blocking::BlockingMonitor;
use crate::gates::counts::{CountAggregator, CountSnapshot};
use crate::gates::store::{CrossingTransition, Gate, TrackId, TrackStateStore};
use crate::geometry::{LineSegment, Point};
use crate::vehicle::VehicleClass;

/// What a single observation of a track produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackObservation {
    pub transition: CrossingTransition,
    pub blocking: bool,
}

/// All mutable state of one processing run.
///
/// Two sessions never share counters or records; a new run starts from a new
/// `GateSession`.
#[derive(Debug, Clone)]
pub struct GateSession {
    store: TrackStateStore,
    monitor: BlockingMonitor,
    counts: CountAggregator,
}

impl GateSession {
    pub fn new(entry_line: LineSegment, exit_line: LineSegment, dwell_threshold: f64) -> Self {
        Self {
            store: TrackStateStore::new(entry_line, exit_line),
            monitor: BlockingMonitor::new(dwell_threshold),
            counts: CountAggregator::new(),
        }
    }

    /// Feed one confirmed track observation through the gates and the dwell
    /// monitor, bumping a counter when a gate newly latches.
    pub fn observe(
        &mut self,
        identity: TrackId,
        vehicle_class: VehicleClass,
        center: Point,
        now: f64,
    ) -> TrackObservation {
        let latched_before = self.store.get(identity).map(|record| {
            (
                record.is_latched(Gate::Entry),
                record.is_latched(Gate::Exit),
            )
        });
        let transition = self.store.upsert(identity, vehicle_class, center, now);

        if let CrossingTransition::Crossed(gate) = transition {
            let relatched = match (gate, latched_before) {
                (Gate::Entry, Some((entry, _))) => entry,
                (Gate::Exit, Some((_, exit))) => exit,
                (_, None) => false,
            };
            debug_assert!(
                !relatched,
                "{gate:?} gate reported a second crossing for track {identity}"
            );
        }

        let blocking = self
            .store
            .get(identity)
            .is_some_and(|record| self.monitor.is_blocking(record, now));

        match transition {
            CrossingTransition::Crossed(Gate::Entry) => self.counts.record_entry(),
            CrossingTransition::Crossed(Gate::Exit) => self.counts.record_exit(),
            CrossingTransition::Baseline | CrossingTransition::NoCrossing => {}
        }

        TrackObservation {
            transition,
            blocking,
        }
    }

    /// Whether a known identity currently counts as blocking.
    pub fn is_blocking(&self, identity: TrackId, now: f64) -> bool {
        self.store
            .get(identity)
            .is_some_and(|record| self.monitor.is_blocking(record, now))
    }

    pub fn evict(&mut self, identity: TrackId) -> bool {
        self.store.evict(identity).is_some()
    }

    pub fn evict_idle(&mut self, now: f64, max_idle: f64) -> usize {
        self.store.evict_idle(now, max_idle)
    }

    pub fn snapshot(&self) -> CountSnapshot {
        self.counts.snapshot()
    }

    pub fn store(&self) -> &TrackStateStore {
        &self.store
    }

    pub fn monitor(&self) -> &BlockingMonitor {
        &self.monitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::store::TrackPhase;

    fn session() -> GateSession {
        GateSession::new(
            LineSegment::new((170.0, 50.0), (260.0, 50.0)),
            LineSegment::new((300.0, 50.0), (450.0, 50.0)),
            100.0,
        )
    }

    #[test]
    fn test_entry_scenario() {
        let mut session = session();
        let a = TrackId(1);

        session.observe(a, VehicleClass::Car, Point::new(200.0, 40.0), 0.0);
        assert_eq!(session.snapshot().entries, 0);

        let obs = session.observe(a, VehicleClass::Car, Point::new(200.0, 55.0), 0.1);
        assert_eq!(obs.transition, CrossingTransition::Crossed(Gate::Entry));
        assert_eq!(session.snapshot().entries, 1);

        session.observe(a, VehicleClass::Car, Point::new(200.0, 60.0), 0.2);
        assert_eq!(
            session.snapshot(),
            CountSnapshot {
                entries: 1,
                exits: 0
            }
        );
    }

    #[test]
    fn test_shared_gate_height_counts_entry_only() {
        // Both reference gates sit at y = 50, so the first downward step
        // latches entry and the exit gate never sees an above-to-below move.
        let mut session = session();
        let id = TrackId(5);
        session.observe(id, VehicleClass::Truck, Point::new(350.0, 10.0), 0.0);
        session.observe(id, VehicleClass::Truck, Point::new(350.0, 80.0), 1.0);
        session.observe(id, VehicleClass::Truck, Point::new(350.0, 120.0), 2.0);
        assert_eq!(
            session.snapshot(),
            CountSnapshot {
                entries: 1,
                exits: 0
            }
        );
    }

    #[test]
    fn test_counts_match_latches_under_oscillation() {
        let mut session = session();
        let id = TrackId(9);
        let ys = [40.0, 55.0, 45.0, 52.0, 30.0, 70.0, 49.0, 50.0];
        for (i, y) in ys.into_iter().enumerate() {
            session.observe(id, VehicleClass::Car, Point::new(200.0, y), i as f64);
        }
        // The second downward pass latches the exit gate at the same height;
        // every later pass latches nothing.
        let record = session.store().get(id).unwrap();
        assert_eq!(record.phase(), TrackPhase::BothLatched);
        assert_eq!(
            session.snapshot(),
            CountSnapshot {
                entries: 1,
                exits: 1
            }
        );
    }

    #[test]
    fn test_blocking_is_sticky_while_active() {
        let mut session = session();
        let b = TrackId(2);

        let first = session.observe(b, VehicleClass::Car, Point::new(10.0, 300.0), 0.0);
        assert!(!first.blocking);
        assert!(!session.is_blocking(b, 90.0));
        assert!(session.is_blocking(b, 150.0));

        let mut now = 150.0;
        for step in 0..20 {
            // Stationary for a while, then moving again.
            let x = if step < 10 { 10.0 } else { 10.0 + step as f32 * 15.0 };
            let obs = session.observe(b, VehicleClass::Car, Point::new(x, 300.0), now);
            assert!(obs.blocking);
            now += 1.0;
        }
    }

    #[test]
    fn test_evicted_identity_loses_blocking() {
        let mut session = session();
        let id = TrackId(3);
        session.observe(id, VehicleClass::Bicycle, Point::new(0.0, 0.0), 0.0);
        assert!(session.is_blocking(id, 500.0));

        assert!(session.evict(id));
        assert!(!session.evict(id));
        assert!(!session.is_blocking(id, 500.0));
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut first = session();
        let second = session();
        first.observe(TrackId(1), VehicleClass::Car, Point::new(200.0, 40.0), 0.0);
        first.observe(TrackId(1), VehicleClass::Car, Point::new(200.0, 55.0), 1.0);

        assert_eq!(first.snapshot().entries, 1);
        assert_eq!(second.snapshot(), CountSnapshot::default());
        assert!(second.store().get(TrackId(1)).is_none());
    }
}
