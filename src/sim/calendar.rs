use std::collections::HashSet;

use crate::error::SimError;
use crate::helpers::float_binaryheap::FloatBinaryHeap;
use crate::queues::job::Job;
use crate::queues::service_pool::TimerToken;

/// Clock and timer services a station needs from its environment.
pub trait Scheduler {
    fn now(&self) -> f64;

    /// Requests an `EndService(token)` event at `at` (never before `now`).
    fn schedule_completion(&mut self, token: TimerToken, at: f64);

    /// Returns `false` if the token is not pending.
    fn cancel_completion(&mut self, token: TimerToken) -> bool;
}

/// An arriving job is owned by its event until delivery.
#[derive(PartialEq, Clone, Debug)]
pub enum Event {
    Arrival(Job),
    EndService(TimerToken),
}

/// Future event list. Events at equal times are delivered in the order they
/// were scheduled; cancelled completions are skipped when they reach the head.
pub struct EventCalendar {
    now: f64,
    events: FloatBinaryHeap<Event>,
    pending: HashSet<TimerToken>,
    cancelled: HashSet<TimerToken>,
}

impl EventCalendar {
    pub fn new() -> Self {
        EventCalendar {
            now: 0.,
            events: FloatBinaryHeap::new(),
            pending: HashSet::new(),
            cancelled: HashSet::new(),
        }
    }

    pub fn schedule(&mut self, at: f64, event: Event) -> Result<(), SimError> {
        if at < self.now {
            return Err(SimError::ScheduleInPast { at, now: self.now });
        }
        if let Event::EndService(token) = &event {
            self.pending.insert(*token);
        }
        self.events.push(at, event);
        Ok(())
    }

    fn discard_cancelled(&mut self) {
        while let Some((_, &Event::EndService(token))) = self.events.peek() {
            if !self.cancelled.remove(&token) {
                break;
            }
            self.events.pop();
        }
    }

    pub fn peek_time(&mut self) -> Option<f64> {
        self.discard_cancelled();
        self.events.peek().map(|(t, _)| t)
    }

    /// Removes the next live event and moves the clock to its time.
    pub fn pop(&mut self) -> Option<(f64, Event)> {
        self.discard_cancelled();
        let (time, event) = self.events.pop()?;
        if let Event::EndService(token) = &event {
            self.pending.remove(token);
        }
        self.now = time;
        Some((time, event))
    }

    pub fn pending_completions(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.peek_time().is_none()
    }
}

impl Default for EventCalendar {
    fn default() -> Self {
        EventCalendar::new()
    }
}

impl Scheduler for EventCalendar {
    fn now(&self) -> f64 {
        self.now
    }

    fn schedule_completion(&mut self, token: TimerToken, at: f64) {
        assert!(
            at >= self.now,
            "completion {} scheduled at {} before current time {}",
            token,
            at,
            self.now
        );
        self.pending.insert(token);
        self.events.push(at, Event::EndService(token));
    }

    fn cancel_completion(&mut self, token: TimerToken) -> bool {
        if self.pending.remove(&token) {
            self.cancelled.insert(token);
            true
        } else {
            false
        }
    }
}
