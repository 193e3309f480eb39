use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, StationError};
use crate::queues::job::Job;

/// Order in which waiting jobs enter service.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Policy {
    Fcfs,
    Lcfs,
}

impl FromStr for Policy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FCFS" => Ok(Policy::Fcfs),
            "LCFS" => Ok(Policy::Lcfs),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Policy::Fcfs => write!(f, "FCFS"),
            Policy::Lcfs => write!(f, "LCFS"),
        }
    }
}

/// Waiting room of a station, in insertion order.
pub struct BufferStore {
    jobs: VecDeque<Job>,
    policy: Policy,
}

impl BufferStore {
    pub fn new(policy: Policy) -> Self {
        BufferStore {
            jobs: VecDeque::new(),
            policy,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn insert(&mut self, job: Job) {
        self.jobs.push_back(job)
    }

    pub fn remove_by_policy(&mut self) -> Result<Job, StationError> {
        let next = match self.policy {
            Policy::Fcfs => self.jobs.pop_front(),
            Policy::Lcfs => self.jobs.pop_back(),
        };
        next.ok_or(StationError::EmptyBuffer)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// `None` stands for an unbounded waiting room, which is never full.
    pub fn is_full(&self, queue_size: Option<usize>) -> bool {
        match queue_size {
            Some(size) => self.jobs.len() >= size,
            None => false,
        }
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Job> + '_ {
        self.jobs.drain(..)
    }
}
