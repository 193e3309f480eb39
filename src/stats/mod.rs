pub mod emitter;
pub mod interval;
pub mod recorder;

pub use self::emitter::{Metric, MetricSink, Sample, StatisticsEmitter};
pub use self::interval::IntervalTracker;
pub use self::recorder::{MetricRecorder, MetricSummary, NullSink};
