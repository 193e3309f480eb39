use tracing::trace;

use crate::queues::job::Job;
use crate::queues::Downstream;

/// Keeps completed jobs in departure order.
#[derive(Default)]
pub struct Collector {
    jobs: Vec<Job>,
}

impl Collector {
    pub fn new() -> Self {
        Collector::default()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }
}

impl Downstream for Collector {
    fn forward(&mut self, job: Job) {
        self.jobs.push(job);
    }
}

/// Counts completed jobs and destroys them.
#[derive(Default)]
pub struct Discard {
    count: u64,
}

impl Discard {
    pub fn new() -> Self {
        Discard::default()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Downstream for Discard {
    fn forward(&mut self, job: Job) {
        trace!(job = %job.id(), "discarded downstream");
        self.count += 1;
    }
}
