/// Entry and exit counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountSnapshot {
    pub entries: u64,
    pub exits: u64,
}

/// Monotonic entry/exit counters.
///
/// Only increments exist; the counters reset by starting a new session.
#[derive(Debug, Clone, Default)]
pub struct CountAggregator {
    counts: CountSnapshot,
}

impl CountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entry(&mut self) {
        self.counts.entries += 1;
    }

    pub fn record_exit(&mut self) {
        self.counts.exits += 1;
    }

    pub fn snapshot(&self) -> CountSnapshot {
        self.counts
    }
}
