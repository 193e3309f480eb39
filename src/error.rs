//! Error types for station configuration and simulation runs.
//!
//! Dropping a job on a full buffer is an ordinary outcome and never shows up
//! here; it is counted and published as a metric.

use crate::queues::service_pool::TimerToken;
use thiserror::Error;

/// Problems detected while validating a configuration. Always fatal at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown queueing policy {0:?} (expected \"FCFS\" or \"LCFS\")")]
    UnknownPolicy(String),

    #[error("queueSize must be non-negative, got {0}")]
    NegativeQueueSize(i64),

    #[error("nbServer must be a positive integer, got {0}")]
    NonPositiveServerCount(i64),

    #[error("serviceTime must be a positive finite number, got {0}")]
    InvalidServiceTime(f64),

    #[error("interArrivalTime must be a positive finite number, got {0}")]
    InvalidInterArrivalTime(f64),

    #[error("horizon must be a non-negative finite number, got {0}")]
    InvalidHorizon(f64),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Internal invariant breaches of the station engine.
///
/// None of these can happen when the engine drives its own buffer and pool;
/// they report bookkeeping bugs or a scheduler delivering foreign tokens.
#[derive(Debug, Error, PartialEq)]
pub enum StationError {
    #[error("service pool is full ({capacity} slots in use)")]
    CapacityExceeded { capacity: usize },

    #[error("policy-based removal from an empty buffer")]
    EmptyBuffer,

    #[error("completion fired for unknown timer token {0}")]
    UnknownToken(TimerToken),

    #[error("free service capacity while {len} jobs are still waiting")]
    BufferNotEmpty { len: usize },
}

/// Top-level error for a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("station error: {0}")]
    Station(#[from] StationError),

    #[error("cannot schedule an event at {at} before current time {now}")]
    ScheduleInPast { at: f64, now: f64 },
}
