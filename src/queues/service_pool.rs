use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::StationError;
use crate::queues::job::Job;

/// Handle of a pending completion callback; one per job in service.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "end-service#{}", self.0)
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Capacity {
    Finite(usize),
    Infinite,
}

pub struct ServiceSlot {
    pub job: Job,
    pub started_at: f64,
    pub completes_at: f64,
}

pub struct ServicePool {
    capacity: Capacity,
    slots: HashMap<TimerToken, ServiceSlot>,
    next_token: u64,
}

impl ServicePool {
    pub fn new(capacity: Capacity) -> Self {
        ServicePool {
            capacity,
            slots: HashMap::new(),
            next_token: 0,
        }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub fn has_capacity(&self) -> bool {
        match self.capacity {
            Capacity::Finite(c) => self.slots.len() < c,
            Capacity::Infinite => true,
        }
    }

    /// Puts `job` in service until `now + duration` and returns the token its
    /// completion must be scheduled under. Callers check `has_capacity` first.
    pub fn admit(&mut self, job: Job, now: f64, duration: f64) -> Result<(TimerToken, f64), StationError> {
        if let Capacity::Finite(c) = self.capacity {
            if self.slots.len() >= c {
                return Err(StationError::CapacityExceeded { capacity: c });
            }
        }

        let token = TimerToken(self.next_token);
        self.next_token += 1;

        let completes_at = now + duration;
        self.slots.insert(token, ServiceSlot {
            job,
            started_at: now,
            completes_at,
        });
        Ok((token, completes_at))
    }

    pub fn release(&mut self, token: TimerToken) -> Result<ServiceSlot, StationError> {
        self.slots.remove(&token).ok_or(StationError::UnknownToken(token))
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn tokens(&self) -> Vec<TimerToken> {
        let mut tokens: Vec<TimerToken> = self.slots.keys().cloned().collect();
        tokens.sort();
        tokens
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (TimerToken, ServiceSlot)> + '_ {
        self.slots.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queues::job::JobId;

    fn job(id: u64) -> Job {
        Job::new(JobId(id), 0.)
    }

    #[test]
    fn finite_pool_rejects_beyond_capacity() {
        let mut pool = ServicePool::new(Capacity::Finite(2));
        assert!(pool.admit(job(1), 0., 1.).is_ok());
        assert!(pool.admit(job(2), 0., 1.).is_ok());
        assert!(!pool.has_capacity());
        assert_eq!(
            pool.admit(job(3), 0., 1.).err(),
            Some(StationError::CapacityExceeded { capacity: 2 })
        );
        assert_eq!(pool.size(), 2);
    }

    #[test]
    fn each_token_resolves_its_own_job() {
        let mut pool = ServicePool::new(Capacity::Finite(3));
        let (t1, c1) = pool.admit(job(1), 0., 2.).unwrap();
        let (t2, c2) = pool.admit(job(2), 0.5, 0.5).unwrap();
        assert_ne!(t1, t2);
        assert_eq!(c1, 2.);
        assert_eq!(c2, 1.);

        let slot = pool.release(t2).unwrap();
        assert_eq!(slot.job.id(), JobId(2));
        assert_eq!(slot.started_at, 0.5);
        assert_eq!(pool.release(t2).err(), Some(StationError::UnknownToken(t2)));

        assert_eq!(pool.release(t1).unwrap().job.id(), JobId(1));
        assert!(pool.is_empty());
    }

    #[test]
    fn infinite_pool_has_no_bound() {
        let mut pool = ServicePool::new(Capacity::Infinite);
        for i in 0..1000 {
            pool.admit(job(i), 0., 1.).unwrap();
        }
        assert!(pool.has_capacity());
        assert_eq!(pool.size(), 1000);
        assert_eq!(pool.tokens().len(), 1000);
    }
}
