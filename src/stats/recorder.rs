use serde::Serialize;
use std::collections::BTreeMap;

use crate::stats::emitter::{Metric, MetricSink, Sample};

/// Discards everything.
pub struct NullSink;

impl MetricSink for NullSink {
    fn record(&mut self, _: Sample) {}
}

#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Option<MetricSummary> {
        if values.is_empty() {
            return None;
        }
        let mean = statistical::mean(values);
        let std_dev = if values.len() < 2 {
            0.
        } else {
            statistical::standard_deviation(values, Some(mean))
        };
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(MetricSummary {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
        })
    }
}

/// Keeps every pushed sample as a per-metric time series.
#[derive(Default)]
pub struct MetricRecorder {
    series: BTreeMap<Metric, Vec<(f64, f64)>>,
}

impl MetricRecorder {
    pub fn new() -> Self {
        MetricRecorder::default()
    }

    pub fn series(&self, metric: Metric) -> &[(f64, f64)] {
        self.series.get(&metric).map(|s| s.as_slice()).unwrap_or(&[])
    }

    pub fn values(&self, metric: Metric) -> Vec<f64> {
        self.series(metric).iter().map(|&(_, v)| v).collect()
    }

    pub fn last(&self, metric: Metric) -> Option<f64> {
        self.series(metric).last().map(|&(_, v)| v)
    }

    pub fn count(&self, metric: Metric) -> usize {
        self.series(metric).len()
    }

    pub fn summary(&self, metric: Metric) -> Option<MetricSummary> {
        MetricSummary::from_values(&self.values(metric))
    }
}

impl MetricSink for MetricRecorder {
    fn record(&mut self, sample: Sample) {
        self.series
            .entry(sample.metric)
            .or_insert_with(Vec::new)
            .push((sample.time, sample.value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, metric: Metric, value: f64) -> Sample {
        Sample { time, metric, value }
    }

    #[test]
    fn keeps_series_per_metric() {
        let mut rec = MetricRecorder::new();
        rec.record(sample(0., Metric::QueueLength, 0.));
        rec.record(sample(1., Metric::QueueLength, 2.));
        rec.record(sample(1., Metric::ResponseTime, 0.7));

        assert_eq!(rec.series(Metric::QueueLength), &[(0., 0.), (1., 2.)]);
        assert_eq!(rec.last(Metric::ResponseTime), Some(0.7));
        assert_eq!(rec.last(Metric::Dropped), None);
        assert_eq!(rec.count(Metric::QueueLength), 2);
    }

    #[test]
    fn summary_of_response_times() {
        let mut rec = MetricRecorder::new();
        for v in &[1.0, 2.0, 3.0] {
            rec.record(sample(0., Metric::ResponseTime, *v));
        }
        let summary = rec.summary(Metric::ResponseTime).unwrap();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 2.0).abs() < 1e-12);
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert!(rec.summary(Metric::QueueingTime).is_none());
    }

    #[test]
    fn single_value_has_zero_spread() {
        let summary = MetricSummary::from_values(&[4.2]).unwrap();
        assert_eq!(summary.std_dev, 0.);
        assert_eq!(summary.mean, 4.2);
    }
}
