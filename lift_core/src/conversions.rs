//! `From` conversions from `lift_config` TOML types to core runtime types.

use crate::config::{DoorCfg, RunnerCfg};

impl From<&lift_config::Door> for DoorCfg {
    fn from(d: &lift_config::Door) -> Self {
        DoorCfg {
            open_interval_ms: d.open_ms,
        }
    }
}

impl From<&lift_config::Runner> for RunnerCfg {
    fn from(r: &lift_config::Runner) -> Self {
        RunnerCfg {
            tick_hz: r.tick_hz,
            max_ticks: None,
        }
    }
}
