// Time-weighted mean of a piecewise-constant signal (queue length, busy slots...)
pub struct TimeWeightedAverage {
    area: f64,
    current_value: f64,
    last_event_time: f64,
}

impl TimeWeightedAverage {
    pub fn new() -> Self {
        TimeWeightedAverage {
            area: 0.,
            current_value: 0.,
            last_event_time: 0.,
        }
    }

    /// Records that the signal takes `value` from `time` on.
    pub fn update(&mut self, time: f64, value: f64) {
        self.advance(time);
        self.current_value = value;
    }

    fn advance(&mut self, time: f64) {
        if time > self.last_event_time {
            self.area += (time - self.last_event_time) * self.current_value;
            self.last_event_time = time;
        }
    }

    /// Mean value over `[0, time]`. Does not mutate, so it can be read repeatedly.
    pub fn average(&self, time: f64) -> f64 {
        if time <= 0. {
            return 0.;
        }
        let pending = if time > self.last_event_time {
            (time - self.last_event_time) * self.current_value
        } else {
            0.
        };
        (self.area + pending) / time
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }
}

impl Default for TimeWeightedAverage {
    fn default() -> Self {
        TimeWeightedAverage::new()
    }
}
