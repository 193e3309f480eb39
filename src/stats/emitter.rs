//! Push-style publication of station metrics.
//!
//! The station calls into [`StatisticsEmitter`] on every state transition that
//! changes a metric; nothing is polled. Derived values (drop fraction, active
//! servers) are computed by the free functions below so that the station
//! snapshot and the pushed samples always agree.

use serde::Serialize;
use std::fmt;

use crate::queues::service_pool::Capacity;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord, Serialize)]
pub enum Metric {
    QueueLength,
    Busy,
    QueueingTime,
    ResponseTime,
    Dropped,
    DroppedPerc,
    TimeCongestion,
    AvgUtilization,
    AvgActiveServers,
    MeanQueueLength,
    MeanBusySlots,
}

impl Metric {
    pub fn signal_name(&self) -> &'static str {
        match self {
            Metric::QueueLength => "qlen",
            Metric::Busy => "busy",
            Metric::QueueingTime => "queueingTime",
            Metric::ResponseTime => "responseTime",
            Metric::Dropped => "dropped",
            Metric::DroppedPerc => "droppedPerc",
            Metric::TimeCongestion => "timeCongestion",
            Metric::AvgUtilization => "avgUtilization",
            Metric::AvgActiveServers => "avgActiveServers",
            Metric::MeanQueueLength => "meanQueueLength",
            Metric::MeanBusySlots => "meanBusySlots",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.signal_name())
    }
}

#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
pub struct Sample {
    pub time: f64,
    pub metric: Metric,
    pub value: f64,
}

pub trait MetricSink {
    fn record(&mut self, sample: Sample);
}

/// `dropped / total`, 0 before the first arrival.
pub fn drop_fraction(dropped: u64, total: u64) -> f64 {
    if total == 0 {
        0.
    } else {
        dropped as f64 / total as f64
    }
}

/// Busy fraction scaled by the server count. Infinite-server stations have no
/// meaningful bound and always report 0.
pub fn mean_active_servers(busy_fraction: f64, capacity: Capacity) -> f64 {
    match capacity {
        Capacity::Finite(c) => busy_fraction * c as f64,
        Capacity::Infinite => 0.,
    }
}

pub struct StatisticsEmitter<M> {
    sink: M,
}

impl<M> StatisticsEmitter<M>
where
    M: MetricSink,
{
    pub fn new(sink: M) -> Self {
        StatisticsEmitter { sink }
    }

    pub fn emit(&mut self, time: f64, metric: Metric, value: f64) {
        self.sink.record(Sample { time, metric, value });
    }

    pub fn queue_length(&mut self, time: f64, len: usize) {
        self.emit(time, Metric::QueueLength, len as f64);
    }

    pub fn busy(&mut self, time: f64, busy: bool, utilization: f64, active_servers: f64) {
        self.emit(time, Metric::Busy, if busy { 1. } else { 0. });
        self.emit(time, Metric::AvgUtilization, utilization);
        self.emit(time, Metric::AvgActiveServers, active_servers);
    }

    pub fn queueing_time(&mut self, time: f64, waited: f64) {
        self.emit(time, Metric::QueueingTime, waited);
    }

    pub fn response_time(&mut self, time: f64, response: f64) {
        self.emit(time, Metric::ResponseTime, response);
    }

    pub fn dropped(&mut self, time: f64, dropped: u64) {
        self.emit(time, Metric::Dropped, dropped as f64);
    }

    pub fn dropped_perc(&mut self, time: f64, dropped: u64, total: u64) {
        self.emit(time, Metric::DroppedPerc, drop_fraction(dropped, total));
    }

    pub fn congestion(&mut self, time: f64, fraction: f64) {
        self.emit(time, Metric::TimeCongestion, fraction);
    }

    pub fn sink(&self) -> &M {
        &self.sink
    }

    pub fn into_sink(self) -> M {
        self.sink
    }
}
