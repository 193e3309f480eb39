pub mod buffer;
pub mod generator;
pub mod job;
pub mod service_pool;
pub mod sink;
pub mod station;
pub mod trace_generator;

use self::job::Job;

/// Exogenous source of jobs, read one arrival ahead.
pub trait ArrivalSource {
    fn read_next_arrival(&self) -> Option<f64>;
    fn pop_next_arrival(&mut self) -> Option<(f64, Job)>;
}

/// Receiver of completed jobs. Fire-and-forget: ownership moves on.
pub trait Downstream {
    fn forward(&mut self, job: Job);
}
