use rand::distributions::{Distribution, Exp};
use rand::Rng;

use crate::config::ArrivalLaw;

pub struct ConstantDistribution<T>
where
    T: Copy,
{
    value: T,
}

impl<T> Distribution<T> for ConstantDistribution<T>
where
    T: Copy,
{
    fn sample<R: Rng + ?Sized>(&self, _: &mut R) -> T {
        self.value
    }
}

impl<T> ConstantDistribution<T>
where
    T: Copy,
{
    pub fn new(value: T) -> Self {
        ConstantDistribution { value }
    }
}

/// Inter-arrival law with a given mean.
pub enum InterArrival {
    Constant(ConstantDistribution<f64>),
    Exponential(Exp),
}

impl InterArrival {
    pub fn new(law: ArrivalLaw, mean: f64) -> Self {
        match law {
            ArrivalLaw::Constant => InterArrival::Constant(ConstantDistribution::new(mean)),
            ArrivalLaw::Exponential => InterArrival::Exponential(Exp::new(1. / mean)),
        }
    }
}

impl Distribution<f64> for InterArrival {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            InterArrival::Constant(d) => d.sample(rng),
            InterArrival::Exponential(d) => d.sample(rng),
        }
    }
}
