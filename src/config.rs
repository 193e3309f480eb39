//! Station and run configuration.
//!
//! Configuration is read as loosely-typed JSON (`Raw*` structs, camelCase keys)
//! and validated once into the typed structs the engine consumes. Nothing is
//! silently defaulted past validation: negative sizes and unknown policy names
//! are rejected here.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::queues::buffer::Policy;
use crate::queues::service_pool::Capacity;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStationConfig {
    pub service_time: f64,
    #[serde(default = "default_nb_server")]
    pub nb_server: i64,
    #[serde(default)]
    pub inf_servers: bool,
    #[serde(default)]
    pub queue_size: Option<i64>,
    #[serde(default = "default_policy")]
    pub policy: String,
}

fn default_nb_server() -> i64 {
    1
}

fn default_policy() -> String {
    "FCFS".to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationConfig {
    pub service_time: f64,
    pub servers: Capacity,
    /// `None` is an unbounded waiting room.
    pub queue_size: Option<usize>,
    pub policy: Policy,
}

impl StationConfig {
    pub fn new(
        service_time: f64,
        servers: Capacity,
        queue_size: Option<usize>,
        policy: Policy,
    ) -> Result<Self, ConfigError> {
        if !(service_time.is_finite() && service_time > 0.) {
            return Err(ConfigError::InvalidServiceTime(service_time));
        }
        if servers == Capacity::Finite(0) {
            return Err(ConfigError::NonPositiveServerCount(0));
        }
        Ok(StationConfig {
            service_time,
            servers,
            queue_size,
            policy,
        })
    }

    /// One server, unbounded FCFS waiting room.
    pub fn single_server(service_time: f64) -> Result<Self, ConfigError> {
        StationConfig::new(service_time, Capacity::Finite(1), None, Policy::Fcfs)
    }

    pub fn multi_server(
        service_time: f64,
        nb_server: usize,
        queue_size: usize,
        policy: Policy,
    ) -> Result<Self, ConfigError> {
        StationConfig::new(service_time, Capacity::Finite(nb_server), Some(queue_size), policy)
    }

    pub fn infinite_servers(service_time: f64) -> Result<Self, ConfigError> {
        StationConfig::new(service_time, Capacity::Infinite, Some(0), Policy::Fcfs)
    }

    /// Time one job spends in service: the base time split across the `c`
    /// servers in finite mode, the base time itself with infinite servers.
    pub fn service_duration(&self) -> f64 {
        match self.servers {
            Capacity::Finite(c) => self.service_time / c as f64,
            Capacity::Infinite => self.service_time,
        }
    }
}

impl TryFrom<RawStationConfig> for StationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawStationConfig) -> Result<Self, Self::Error> {
        let policy: Policy = raw.policy.parse()?;

        let servers = if raw.inf_servers {
            Capacity::Infinite
        } else if raw.nb_server <= 0 {
            return Err(ConfigError::NonPositiveServerCount(raw.nb_server));
        } else {
            Capacity::Finite(raw.nb_server as usize)
        };

        let queue_size = match raw.queue_size {
            Some(q) if q < 0 => return Err(ConfigError::NegativeQueueSize(q)),
            Some(q) => Some(q as usize),
            None => None,
        };

        StationConfig::new(raw.service_time, servers, queue_size, policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrivalLaw {
    Constant,
    Exponential,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSourceConfig {
    #[serde(default = "default_law")]
    pub law: ArrivalLaw,
    pub inter_arrival_time: f64,
}

fn default_law() -> ArrivalLaw {
    ArrivalLaw::Exponential
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceConfig {
    pub law: ArrivalLaw,
    /// Mean time between two jobs.
    pub inter_arrival_time: f64,
}

impl TryFrom<RawSourceConfig> for SourceConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSourceConfig) -> Result<Self, Self::Error> {
        if !(raw.inter_arrival_time.is_finite() && raw.inter_arrival_time > 0.) {
            return Err(ConfigError::InvalidInterArrivalTime(raw.inter_arrival_time));
        }
        Ok(SourceConfig {
            law: raw.law,
            inter_arrival_time: raw.inter_arrival_time,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSimulationConfig {
    pub station: RawStationConfig,
    pub source: RawSourceConfig,
    pub horizon: f64,
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub station: StationConfig,
    pub source: SourceConfig,
    pub horizon: f64,
    pub seed: u64,
}

impl TryFrom<RawSimulationConfig> for SimulationConfig {
    type Error = ConfigError;

    fn try_from(raw: RawSimulationConfig) -> Result<Self, Self::Error> {
        if !(raw.horizon.is_finite() && raw.horizon >= 0.) {
            return Err(ConfigError::InvalidHorizon(raw.horizon));
        }
        Ok(SimulationConfig {
            station: raw.station.try_into()?,
            source: raw.source.try_into()?,
            horizon: raw.horizon,
            seed: raw.seed,
        })
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: RawSimulationConfig = serde_json::from_str(json)?;
        raw.try_into()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        SimulationConfig::from_json_str(&contents)
    }
}
