//! Queueing station engine: admission, blocking and departure handling for
//! `c` parallel servers (or infinitely many) in front of a bounded buffer.
//!
//! A job is owned by exactly one place at a time: the buffer, a service slot,
//! or the downstream collaborator once it has completed. Dropped jobs are
//! destroyed on the spot. All transitions are driven by the caller, one event
//! at a time, with the clock read from the [`Scheduler`].

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::StationConfig;
use crate::error::StationError;
use crate::helpers::time_average::TimeWeightedAverage;
use crate::queues::buffer::BufferStore;
use crate::queues::job::{Job, JobId, Stage};
use crate::queues::service_pool::{Capacity, ServicePool, TimerToken};
use crate::queues::Downstream;
use crate::sim::calendar::Scheduler;
use crate::stats::emitter::{drop_fraction, mean_active_servers, MetricSink, StatisticsEmitter};
use crate::stats::interval::IntervalTracker;

/// A completed job as seen by the engine once it has been forwarded.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Departure {
    pub job: JobId,
    pub response_time: f64,
}

/// Outcome of an arrival.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Admission {
    Served(TimerToken),
    Queued,
    Dropped,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default, Serialize)]
pub struct StationCounters {
    pub total: u64,
    pub dropped: u64,
    /// Jobs that entered service, directly or from the buffer.
    pub admitted: u64,
    pub departed: u64,
}

#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    pub time: f64,
    pub queue_length: usize,
    pub in_service: usize,
    pub busy: bool,
    pub total: u64,
    pub dropped: u64,
    pub dropped_perc: f64,
    pub time_congestion: f64,
    pub avg_utilization: f64,
    pub avg_active_servers: f64,
    pub mean_queue_length: f64,
    pub mean_busy_slots: f64,
}

pub struct Station<D, M> {
    config: StationConfig,
    buffer: BufferStore,
    pool: ServicePool,
    congestion: IntervalTracker,
    busy: IntervalTracker,
    queue_length: TimeWeightedAverage,
    busy_slots: TimeWeightedAverage,
    counters: StationCounters,
    downstream: D,
    stats: StatisticsEmitter<M>,
}

impl<D, M> Station<D, M>
where
    D: Downstream,
    M: MetricSink,
{
    pub fn new(config: StationConfig, downstream: D, sink: M) -> Self {
        Station {
            config,
            buffer: BufferStore::new(config.policy),
            pool: ServicePool::new(config.servers),
            congestion: IntervalTracker::new(),
            busy: IntervalTracker::new(),
            queue_length: TimeWeightedAverage::new(),
            busy_slots: TimeWeightedAverage::new(),
            counters: StationCounters::default(),
            downstream,
            stats: StatisticsEmitter::new(sink),
        }
    }

    pub fn arrival<S: Scheduler>(&mut self, mut job: Job, scheduler: &mut S) -> Result<Admission, StationError> {
        let now = scheduler.now();
        job.stamp_arrival(now);
        self.counters.total += 1;

        if self.pool.has_capacity() {
            // Free servers are only observable once the departure path has
            // drained every waiting job into them.
            if !self.buffer.is_empty() {
                return Err(StationError::BufferNotEmpty { len: self.buffer.len() });
            }
            self.stats.queueing_time(now, 0.);
            let token = self.start_service(job, now, scheduler)?;
            return Ok(Admission::Served(token));
        }

        let admission = if self.buffer.is_full(self.config.queue_size) {
            job.add_log_entry(now, Stage::Dropped);
            self.counters.dropped += 1;
            debug!(job = %job.id(), time = now, "rejected, buffer full");
            self.stats.dropped(now, self.counters.dropped);
            Admission::Dropped
        } else {
            job.add_log_entry(now, Stage::Queued);
            trace!(job = %job.id(), time = now, "enters queue");
            self.buffer.insert(job);
            self.queue_length.update(now, self.buffer.len() as f64);

            if self.buffer.is_full(self.config.queue_size) && self.congestion.open(now) {
                debug!(time = now, "buffer full, congestion starts");
                let fraction = self.congestion_fraction(now);
                self.stats.congestion(now, fraction);
            }
            self.stats.queue_length(now, self.buffer.len());
            Admission::Queued
        };

        self.stats.dropped_perc(now, self.counters.dropped, self.counters.total);
        Ok(admission)
    }

    pub fn departure<S: Scheduler>(&mut self, token: TimerToken, scheduler: &mut S) -> Result<Departure, StationError> {
        let now = scheduler.now();
        let slot = self.pool.release(token)?;
        self.busy_slots.update(now, self.pool.size() as f64);

        let mut job = slot.job;
        job.add_log_entry(now, Stage::Completed);
        debug!(job = %job.id(), time = now, "completed service");
        let departure = Departure {
            job: job.id(),
            response_time: job.sojourn(now),
        };
        self.stats.response_time(now, departure.response_time);
        self.counters.departed += 1;

        let was_blocked = !self.buffer.is_empty() && self.buffer.is_full(self.config.queue_size);
        self.downstream.forward(job);

        if self.buffer.is_empty() {
            if self.pool.is_empty() && self.busy.close(now).is_some() {
                debug!(time = now, "empty queue, server goes idle");
                let (utilization, active) = (self.utilization(now), self.active_servers(now));
                self.stats.busy(now, false, utilization, active);
            }
            return Ok(departure);
        }

        if was_blocked {
            if let Some(elapsed) = self.congestion.close(now) {
                debug!(time = now, elapsed, "congestion ends");
                let fraction = self.congestion_fraction(now);
                self.stats.congestion(now, fraction);
            }
        }

        let next = self.buffer.remove_by_policy()?;
        self.queue_length.update(now, self.buffer.len() as f64);
        self.stats.queue_length(now, self.buffer.len());
        self.stats.queueing_time(now, next.sojourn(now));
        self.start_service(next, now, scheduler)?;

        Ok(departure)
    }

    fn start_service<S: Scheduler>(&mut self, mut job: Job, now: f64, scheduler: &mut S) -> Result<TimerToken, StationError> {
        let id = job.id();
        job.add_log_entry(now, Stage::ServiceStarted);

        let (token, completes_at) = self.pool.admit(job, now, self.config.service_duration())?;
        scheduler.schedule_completion(token, completes_at);
        self.counters.admitted += 1;
        self.busy_slots.update(now, self.pool.size() as f64);
        debug!(job = %id, %token, time = now, completes_at, "starting service");

        if self.busy.open(now) {
            let (utilization, active) = (self.utilization(now), self.active_servers(now));
            self.stats.busy(now, true, utilization, active);
        }
        Ok(token)
    }

    /// Cancels every pending completion and destroys all jobs still held.
    /// Returns the number of jobs discarded.
    pub fn shutdown<S: Scheduler>(&mut self, scheduler: &mut S) -> usize {
        let now = scheduler.now();
        let mut discarded = 0;

        for (token, slot) in self.pool.drain() {
            if !scheduler.cancel_completion(token) {
                debug!(%token, job = %slot.job.id(), completes_at = slot.completes_at, "completion was not pending at shutdown");
            } else {
                trace!(%token, job = %slot.job.id(), completes_at = slot.completes_at, "completion cancelled");
            }
            discarded += 1;
        }
        discarded += self.buffer.drain().count();

        self.busy.close(now);
        self.congestion.close(now);
        self.queue_length.update(now, 0.);
        self.busy_slots.update(now, 0.);
        debug!(time = now, discarded, "station shut down");
        discarded
    }

    /// Closed busy time over elapsed time; 0 with infinite servers.
    fn utilization(&self, now: f64) -> f64 {
        match self.config.servers {
            Capacity::Finite(_) => self.busy.fraction_of_time(now),
            Capacity::Infinite => 0.,
        }
    }

    fn congestion_fraction(&self, now: f64) -> f64 {
        self.congestion.fraction_of_time(now)
    }

    fn active_servers(&self, now: f64) -> f64 {
        mean_active_servers(self.utilization(now), self.config.servers)
    }

    pub fn snapshot(&self, now: f64) -> StationSnapshot {
        StationSnapshot {
            time: now,
            queue_length: self.buffer.len(),
            in_service: self.pool.size(),
            busy: !self.pool.is_empty(),
            total: self.counters.total,
            dropped: self.counters.dropped,
            dropped_perc: drop_fraction(self.counters.dropped, self.counters.total),
            time_congestion: self.congestion_fraction(now),
            avg_utilization: self.utilization(now),
            avg_active_servers: self.active_servers(now),
            mean_queue_length: self.queue_length.average(now),
            mean_busy_slots: self.busy_slots.average(now),
        }
    }

    /// Pushes every gauge with its current value.
    pub fn publish(&mut self, now: f64) -> StationSnapshot {
        use crate::stats::emitter::Metric;

        let snap = self.snapshot(now);
        self.stats.queue_length(now, snap.queue_length);
        self.stats.busy(now, snap.busy, snap.avg_utilization, snap.avg_active_servers);
        self.stats.dropped(now, snap.dropped);
        self.stats.dropped_perc(now, snap.dropped, snap.total);
        self.stats.congestion(now, snap.time_congestion);
        self.stats.emit(now, Metric::MeanQueueLength, snap.mean_queue_length);
        self.stats.emit(now, Metric::MeanBusySlots, snap.mean_busy_slots);
        snap
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn capacity(&self) -> Capacity {
        self.pool.capacity()
    }

    pub fn counters(&self) -> StationCounters {
        self.counters
    }

    pub fn queue_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn in_service(&self) -> usize {
        self.pool.size()
    }

    pub fn pending_tokens(&self) -> Vec<TimerToken> {
        self.pool.tokens()
    }

    pub fn congestion(&self) -> &IntervalTracker {
        &self.congestion
    }

    pub fn busy_intervals(&self) -> &IntervalTracker {
        &self.busy
    }

    pub fn downstream(&self) -> &D {
        &self.downstream
    }

    pub fn sink(&self) -> &M {
        self.stats.sink()
    }

    pub fn into_parts(self) -> (D, M) {
        (self.downstream, self.stats.into_sink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queues::buffer::Policy;
    use crate::queues::sink::Collector;
    use crate::sim::calendar::{Event, EventCalendar};
    use crate::stats::emitter::Metric;
    use crate::stats::recorder::MetricRecorder;

    type TestStation = Station<Collector, MetricRecorder>;

    fn station(config: StationConfig) -> TestStation {
        Station::new(config, Collector::new(), MetricRecorder::new())
    }

    fn job(id: u64) -> Job {
        Job::new(JobId(id), 0.)
    }

    fn fire_next(st: &mut TestStation, cal: &mut EventCalendar) -> Option<JobId> {
        match cal.pop()? {
            (_, Event::EndService(token)) => Some(st.departure(token, cal).unwrap().job),
            (_, Event::Arrival(_)) => panic!("no arrivals scheduled in these tests"),
        }
    }

    #[test]
    fn idle_station_serves_directly() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(2., 2, 1, Policy::Fcfs).unwrap());

        let admission = st.arrival(job(1), &mut cal).unwrap();
        assert!(matches!(admission, Admission::Served(_)));
        assert_eq!(st.in_service(), 1);
        assert_eq!(st.sink().last(Metric::QueueingTime), Some(0.));
        assert_eq!(st.sink().last(Metric::Busy), Some(1.));
        // serviceTime split over the two servers
        assert_eq!(cal.peek_time(), Some(1.));
    }

    #[test]
    fn full_buffer_opens_and_closes_congestion() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(1., 1, 1, Policy::Fcfs).unwrap());

        st.arrival(job(1), &mut cal).unwrap();
        assert_eq!(st.arrival(job(2), &mut cal).unwrap(), Admission::Queued);
        assert!(st.congestion().is_open());
        assert_eq!(st.arrival(job(3), &mut cal).unwrap(), Admission::Dropped);

        assert_eq!(fire_next(&mut st, &mut cal), Some(JobId(1)));
        assert!(!st.congestion().is_open());
        assert_eq!(st.congestion().accumulated(), 1.);
        assert_eq!(st.queue_len(), 0);
        assert_eq!(st.in_service(), 1);

        assert_eq!(fire_next(&mut st, &mut cal), Some(JobId(2)));
        assert_eq!(st.busy_intervals().accumulated(), 2.);

        let c = st.counters();
        assert_eq!((c.total, c.dropped, c.admitted, c.departed), (3, 1, 2, 2));
    }

    #[test]
    fn free_capacity_with_waiting_jobs_is_reported() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(1., 1, 5, Policy::Fcfs).unwrap());
        st.arrival(job(1), &mut cal).unwrap();
        st.arrival(job(2), &mut cal).unwrap();

        // Release the in-service job behind the engine's back.
        let token = st.pending_tokens()[0];
        st.pool.release(token).unwrap();

        assert_eq!(
            st.arrival(job(3), &mut cal),
            Err(StationError::BufferNotEmpty { len: 1 })
        );
    }

    #[test]
    fn unknown_token_is_an_error() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::single_server(1.).unwrap());
        assert_eq!(
            st.departure(TimerToken(42), &mut cal).map(|d| d.job),
            Err(StationError::UnknownToken(TimerToken(42)))
        );
    }

    #[test]
    fn shutdown_cancels_pending_completions() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(1., 2, 3, Policy::Lcfs).unwrap());
        for i in 0..4 {
            st.arrival(job(i), &mut cal).unwrap();
        }
        assert_eq!(cal.pending_completions(), 2);

        assert_eq!(st.shutdown(&mut cal), 4);
        assert_eq!(cal.pending_completions(), 0);
        assert!(cal.pop().is_none());
        assert!(st.downstream().jobs().is_empty());
    }

    #[test]
    fn publish_is_idempotent() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(1., 1, 2, Policy::Fcfs).unwrap());
        for i in 0..4 {
            st.arrival(job(i), &mut cal).unwrap();
        }
        let first = st.publish(0.5);
        let second = st.publish(0.5);
        assert_eq!(first, second);
        assert_eq!(first.dropped, 1);
        assert_eq!(first.dropped_perc, 0.25);
    }

    #[test]
    fn fractions_count_closed_intervals_only() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::multi_server(1., 1, 1, Policy::Fcfs).unwrap());
        st.arrival(job(1), &mut cal).unwrap();
        assert_eq!(fire_next(&mut st, &mut cal), Some(JobId(1)));

        cal.schedule(3., Event::Arrival(job(2))).unwrap();
        cal.schedule(3., Event::Arrival(job(3))).unwrap();
        for _ in 0..2 {
            match cal.pop() {
                Some((_, Event::Arrival(j))) => {
                    st.arrival(j, &mut cal).unwrap();
                }
                other => panic!("expected an arrival, got {:?}", other.map(|(t, _)| t)),
            }
        }
        assert!(st.busy_intervals().is_open());
        assert!(st.congestion().is_open());

        let snap = st.snapshot(3.5);
        assert!((snap.avg_utilization - 1. / 3.5).abs() < 1e-12);
        assert_eq!(snap.avg_active_servers, snap.avg_utilization);
        assert_eq!(snap.time_congestion, 0.);
    }

    #[test]
    fn infinite_servers_publish_zero_utilization() {
        let mut cal = EventCalendar::new();
        let mut st = station(StationConfig::infinite_servers(2.).unwrap());
        for i in 0..5 {
            st.arrival(job(i), &mut cal).unwrap();
        }
        while fire_next(&mut st, &mut cal).is_some() {}
        assert_eq!(st.busy_intervals().accumulated(), 2.);

        let snap = st.publish(4.);
        assert_eq!(snap.avg_utilization, 0.);
        assert_eq!(snap.avg_active_servers, 0.);
        assert!(st.sink().values(Metric::AvgUtilization).iter().all(|&v| v == 0.));
    }
}
