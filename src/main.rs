use std::env;
use std::process;

use tracing::error;

use queue_station::distribution::InterArrival;
use queue_station::logging;
use queue_station::queues::generator::Generator;
use queue_station::queues::sink::Discard;
use queue_station::stats::NullSink;
use queue_station::{RunSummary, SimError, SimulationConfig, Simulation};

fn run(path: &str) -> Result<RunSummary, SimError> {
    let config = SimulationConfig::from_file(path)?;
    let source = Generator::new(
        InterArrival::new(config.source.law, config.source.inter_arrival_time),
        config.seed,
    );

    let mut sim = Simulation::new(config.station, Box::new(source), Discard::new(), NullSink)?;
    let summary = sim.run_until(config.horizon)?;
    sim.shutdown();

    Ok(summary)
}

fn main() {
    logging::init_logging("info");

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: {} <config.json>", args[0]);
        process::exit(2);
    }

    match run(&args[1]) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(report) => println!("{}", report),
            Err(e) => {
                eprintln!("cannot serialize summary: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!(%e, "simulation aborted");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}
