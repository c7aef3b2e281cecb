//! Hardware backend selection from config.

use std::sync::Arc;
use std::time::Duration;

use lift_config::{Backend, Config};
use lift_hardware::{ElevioDriver, SimHandle, SimulatedElevator};
use lift_traits::{Clock, ElevatorIo, FLOOR_COUNT};

pub struct Selected {
    pub io: Box<dyn ElevatorIo>,
    /// Control handle when the backend is the simulator.
    pub sim: Option<SimHandle>,
}

pub fn name(backend: Backend) -> &'static str {
    match backend {
        Backend::Sim => "sim",
        Backend::Elevio => "elevio",
    }
}

/// Build the configured backend. Nothing is connected until `ElevatorIo::init`.
pub fn open(cfg: &Config, clock: Arc<dyn Clock + Send + Sync>) -> Selected {
    match cfg.hardware.backend {
        Backend::Sim => {
            let sim = SimulatedElevator::new(
                FLOOR_COUNT,
                cfg.sim.start_floor,
                Duration::from_millis(cfg.sim.travel_ms),
                clock,
            );
            let handle = sim.handle();
            Selected {
                io: Box::new(sim),
                sim: Some(handle),
            }
        }
        Backend::Elevio => Selected {
            io: Box::new(ElevioDriver::new(
                cfg.hardware.addr.clone(),
                FLOOR_COUNT,
                Duration::from_millis(cfg.hardware.io_timeout_ms),
            )),
            sim: None,
        },
    }
}
