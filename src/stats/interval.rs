/// Accumulates the total length of a condition that switches on and off
/// (buffer full, at least one server busy).
///
/// Only an open interval is ever accumulated, so a stray `close` or a
/// repeated `open` cannot make the total go backwards or count twice.
#[derive(Debug, Clone, Default)]
pub struct IntervalTracker {
    accumulated: f64,
    open_since: Option<f64>,
    intervals: u64,
}

impl IntervalTracker {
    pub fn new() -> Self {
        IntervalTracker::default()
    }

    /// Returns `false` if an interval was already open.
    pub fn open(&mut self, now: f64) -> bool {
        if self.open_since.is_some() {
            return false;
        }
        self.open_since = Some(now);
        true
    }

    /// Returns the length of the closed interval, if one was open.
    pub fn close(&mut self, now: f64) -> Option<f64> {
        self.open_since.take().map(|start| {
            let elapsed = (now - start).max(0.);
            self.accumulated += elapsed;
            self.intervals += 1;
            elapsed
        })
    }

    pub fn is_open(&self) -> bool {
        self.open_since.is_some()
    }

    /// Sum of closed intervals only.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    pub fn closed_intervals(&self) -> u64 {
        self.intervals
    }

    /// `accumulated / now`, defined as 0 at the origin.
    pub fn fraction_of_time(&self, now: f64) -> f64 {
        if now <= 0. {
            0.
        } else {
            self.accumulated / now
        }
    }
}
