use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::queues::job::{Job, JobId};
use crate::queues::ArrivalSource;

/// Replays a fixed, time-ordered list of arrivals.
pub struct TraceGenerator {
    arrivals: VecDeque<f64>,
    nb_generated: u64,
}

impl TraceGenerator {
    /// Times are sorted; NaNs are discarded.
    pub fn from_times<I: IntoIterator<Item = f64>>(times: I) -> Self {
        let mut times: Vec<f64> = times.into_iter().filter(|t| !t.is_nan()).collect();
        times.sort_by(|a, b| a.total_cmp(b));
        TraceGenerator {
            arrivals: times.into(),
            nb_generated: 0,
        }
    }

    /// One arrival per line, arrival time in the first column. Lines whose
    /// first column is not a number are skipped.
    pub fn from_csv<P: AsRef<Path>>(path: P, delimiter: char) -> io::Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut times = Vec::new();

        for (nb, line) in reader.lines().enumerate() {
            let line = line?;
            let first = line.split(delimiter).next().unwrap_or("").trim();
            match first.parse::<f64>() {
                Ok(t) => times.push(t),
                Err(_) => warn!(line = nb + 1, "skipping unparsable trace line"),
            }
        }

        Ok(TraceGenerator::from_times(times))
    }

    pub fn remaining(&self) -> usize {
        self.arrivals.len()
    }
}

impl ArrivalSource for TraceGenerator {
    fn read_next_arrival(&self) -> Option<f64> {
        self.arrivals.front().cloned()
    }

    fn pop_next_arrival(&mut self) -> Option<(f64, Job)> {
        let t = self.arrivals.pop_front()?;
        self.nb_generated += 1;
        Some((t, Job::new(JobId(self.nb_generated), t)))
    }
}
