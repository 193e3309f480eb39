use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::queues::job::{Job, JobId};
use crate::queues::ArrivalSource;

/// Renewal arrival process: a first job at time 0, then one job every
/// `iat_distribution` sample.
pub struct Generator<T>
where
    T: Distribution<f64>,
{
    iat_distribution: T,
    rng: StdRng,
    nb_generated: u64,
    next_arrival: f64,
}

impl<T> Generator<T>
where
    T: Distribution<f64>,
{
    pub fn new(iat_distribution: T, seed: u64) -> Self {
        Generator {
            iat_distribution,
            rng: StdRng::seed_from_u64(seed),
            nb_generated: 0,
            next_arrival: 0.,
        }
    }

    fn draw_arrival(&mut self) {
        self.next_arrival += self.iat_distribution.sample(&mut self.rng);
    }

    pub fn nb_generated(&self) -> u64 {
        self.nb_generated
    }
}

impl<T> ArrivalSource for Generator<T>
where
    T: Distribution<f64>,
{
    fn read_next_arrival(&self) -> Option<f64> {
        Some(self.next_arrival)
    }

    fn pop_next_arrival(&mut self) -> Option<(f64, Job)> {
        self.nb_generated += 1;
        let arrival = self.next_arrival;
        let job = Job::new(JobId(self.nb_generated), arrival);
        self.draw_arrival();
        Some((arrival, job))
    }
}
