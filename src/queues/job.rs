use serde::Serialize;
use std::fmt;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "message-{}", self.0)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
pub enum Stage {
    Arrived,
    Queued,
    ServiceStarted,
    Completed,
    Dropped,
}

type LogEntry = (f64, Stage);

#[derive(PartialEq, Clone, Debug, Serialize)]
pub struct Job {
    id: JobId,
    created_at: f64,
    arrival: Option<f64>,
    log: Vec<LogEntry>,
}

impl Job {
    pub fn new(id: JobId, created_at: f64) -> Self {
        Job {
            id,
            created_at,
            arrival: None,
            log: Vec::new(),
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    /// Sets the arrival timestamp on first admission; later calls keep the first value.
    pub fn stamp_arrival(&mut self, time: f64) -> f64 {
        let arrival = *self.arrival.get_or_insert(time);
        self.add_log_entry(time, Stage::Arrived);
        arrival
    }

    pub fn arrival(&self) -> Option<f64> {
        self.arrival
    }

    /// Time spent in the station so far. Unstamped jobs count from creation.
    pub fn sojourn(&self, now: f64) -> f64 {
        now - self.arrival.unwrap_or(self.created_at)
    }

    pub fn add_log_entry(&mut self, time: f64, stage: Stage) {
        self.log.push((time, stage));
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn time_of(&self, stage: Stage) -> Option<f64> {
        self.log.iter().rev().find(|(_, s)| *s == stage).map(|(t, _)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_is_stamped_once() {
        let mut job = Job::new(JobId(1), 0.);
        assert_eq!(job.stamp_arrival(1.5), 1.5);
        assert_eq!(job.stamp_arrival(4.0), 1.5);
        assert_eq!(job.arrival(), Some(1.5));
        assert!((job.sojourn(3.0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn log_keeps_stage_times() {
        let mut job = Job::new(JobId(7), 0.);
        job.stamp_arrival(0.);
        job.add_log_entry(0.5, Stage::ServiceStarted);
        job.add_log_entry(1.5, Stage::Completed);
        assert_eq!(job.time_of(Stage::ServiceStarted), Some(0.5));
        assert_eq!(job.time_of(Stage::Completed), Some(1.5));
        assert_eq!(job.time_of(Stage::Dropped), None);
        assert_eq!(job.log().len(), 3);
        assert_eq!(job.id().to_string(), "message-7");
    }
}
