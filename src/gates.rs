//! Per-identity gate state and the event engine built on it.
//!
//! The [`TrackStateStore`] is the only writer of per-track state. The
//! [`BlockingMonitor`] and [`CountAggregator`] derive events from what the
//! store reports, and [`GateSession`] bundles all three into one explicit
//! session context.

mod blocking;
mod counts;
mod session;
mod store;

pub use blocking::BlockingMonitor;
pub use counts::{CountAggregator, CountSnapshot};
pub use session::{GateSession, TrackObservation};
pub use store::{CrossingTransition, Gate, TrackId, TrackPhase, TrackRecord, TrackStateStore};
