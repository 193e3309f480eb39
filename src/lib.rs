//! Discrete-event model of a single queueing station: jobs arrive, wait in a
//! bounded FCFS or LCFS buffer while all servers are busy, get served by one
//! of `c` parallel servers (or by infinitely many), and leave.
//!
//! The station publishes its metrics (queue length, busy flag, queueing and
//! response times, drops, congestion, utilization) on every transition.

pub mod config;
pub mod distribution;
pub mod error;
pub mod helpers;
pub mod logging;
pub mod queues;
pub mod sim;
pub mod stats;

pub use config::{ArrivalLaw, SimulationConfig, SourceConfig, StationConfig};
pub use error::{ConfigError, SimError, StationError};
pub use queues::buffer::Policy;
pub use queues::job::{Job, JobId};
pub use queues::service_pool::{Capacity, TimerToken};
pub use queues::station::{Admission, Station, StationSnapshot};
pub use sim::{EventCalendar, RunSummary, Scheduler, Simulation};
