pub mod calendar;
pub mod simulation;

pub use self::calendar::{Event, EventCalendar, Scheduler};
pub use self::simulation::{RunSummary, Simulation, Transition};
