use serde::Serialize;
use tracing::{debug, info};

use crate::config::StationConfig;
use crate::error::SimError;
use crate::queues::job::JobId;
use crate::queues::station::{Admission, Departure, Station, StationSnapshot};
use crate::queues::{ArrivalSource, Downstream};
use crate::sim::calendar::{Event, EventCalendar, Scheduler};
use crate::stats::emitter::MetricSink;
use crate::stats::recorder::MetricSummary;

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Transition {
    Arrival { time: f64, job: JobId, admission: Admission },
    Departure { time: f64, departure: Departure },
}

impl Transition {
    pub fn time(&self) -> f64 {
        match self {
            Transition::Arrival { time, .. } | Transition::Departure { time, .. } => *time,
        }
    }
}

#[derive(PartialEq, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub station: StationSnapshot,
    pub departed: u64,
    pub dropped: u64,
    pub events: u64,
    pub response_time: Option<MetricSummary>,
}

/// One station fed by one arrival source, driven by its own event calendar.
pub struct Simulation<D, M> {
    calendar: EventCalendar,
    source: Box<dyn ArrivalSource>,
    station: Station<D, M>,
    response_times: Vec<f64>,
    events: u64,
}

impl<D, M> Simulation<D, M>
where
    D: Downstream,
    M: MetricSink,
{
    pub fn new(config: StationConfig, source: Box<dyn ArrivalSource>, downstream: D, sink: M) -> Result<Self, SimError> {
        let mut sim = Simulation {
            calendar: EventCalendar::new(),
            source,
            station: Station::new(config, downstream, sink),
            response_times: Vec::new(),
            events: 0,
        };
        sim.station.publish(0.);
        sim.schedule_next_arrival()?;
        Ok(sim)
    }

    fn schedule_next_arrival(&mut self) -> Result<(), SimError> {
        if let Some((time, job)) = self.source.pop_next_arrival() {
            self.calendar.schedule(time, Event::Arrival(job))?;
        }
        Ok(())
    }

    pub fn now(&self) -> f64 {
        self.calendar.now()
    }

    pub fn next_event_time(&mut self) -> Option<f64> {
        self.calendar.peek_time()
    }

    /// Delivers the next event to the station. `Ok(None)` once nothing is left.
    pub fn make_transition(&mut self) -> Result<Option<Transition>, SimError> {
        let (time, event) = match self.calendar.pop() {
            Some(next) => next,
            None => return Ok(None),
        };
        self.events += 1;

        let transition = match event {
            Event::Arrival(job) => {
                let id = job.id();
                let admission = self.station.arrival(job, &mut self.calendar)?;
                self.schedule_next_arrival()?;
                Transition::Arrival { time, job: id, admission }
            }
            Event::EndService(token) => {
                let departure = self.station.departure(token, &mut self.calendar)?;
                self.response_times.push(departure.response_time);
                Transition::Departure { time, departure }
            }
        };
        Ok(Some(transition))
    }

    /// Runs every event up to and including `horizon`, then publishes the
    /// final state of the station at `horizon`.
    pub fn run_until(&mut self, horizon: f64) -> Result<RunSummary, SimError> {
        info!(horizon, "simulation starts");
        while let Some(t) = self.calendar.peek_time() {
            if t > horizon {
                break;
            }
            self.make_transition()?;
        }

        let end = horizon.max(self.calendar.now());
        let snapshot = self.station.publish(end);
        let counters = self.station.counters();
        debug!(events = self.events, departed = counters.departed, dropped = counters.dropped, "simulation ends");

        Ok(RunSummary {
            station: snapshot,
            departed: counters.departed,
            dropped: counters.dropped,
            events: self.events,
            response_time: MetricSummary::from_values(&self.response_times),
        })
    }

    /// Tears the station down, cancelling its pending completions.
    pub fn shutdown(&mut self) -> usize {
        self.station.shutdown(&mut self.calendar)
    }

    pub fn station(&self) -> &Station<D, M> {
        &self.station
    }

    pub fn calendar(&self) -> &EventCalendar {
        &self.calendar
    }

    pub fn into_station(self) -> Station<D, M> {
        self.station
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queues::buffer::Policy;
    use crate::queues::sink::Discard;
    use crate::queues::trace_generator::TraceGenerator;
    use crate::stats::recorder::NullSink;

    #[test]
    fn arrivals_are_fed_one_ahead() {
        let config = StationConfig::multi_server(1., 1, 0, Policy::Fcfs).unwrap();
        let source = Box::new(TraceGenerator::from_times(vec![0., 0.5, 2.]));
        let mut sim = Simulation::new(config, source, Discard::new(), NullSink).unwrap();

        let t1 = sim.make_transition().unwrap().unwrap();
        assert!(matches!(t1, Transition::Arrival { admission: Admission::Served(_), .. }));
        let t2 = sim.make_transition().unwrap().unwrap();
        assert!(matches!(t2, Transition::Arrival { admission: Admission::Dropped, .. }));
        let t3 = sim.make_transition().unwrap().unwrap();
        assert!(matches!(t3, Transition::Departure { .. }));
        assert_eq!(t3.time(), 1.);

        let summary = sim.run_until(10.).unwrap();
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.departed, 2);
        assert_eq!(summary.events, 5);
        assert!(sim.make_transition().unwrap().is_none());
    }

    #[test]
    fn horizon_stops_before_later_events() {
        let config = StationConfig::single_server(5.).unwrap();
        let source = Box::new(TraceGenerator::from_times(vec![0., 1.]));
        let mut sim = Simulation::new(config, source, Discard::new(), NullSink).unwrap();

        let summary = sim.run_until(2.).unwrap();
        assert_eq!(summary.departed, 0);
        assert_eq!(summary.station.in_service, 1);
        assert_eq!(summary.station.queue_length, 1);
        assert!(summary.response_time.is_none());

        assert_eq!(sim.shutdown(), 2);
        assert_eq!(sim.calendar().pending_completions(), 0);
    }
}
