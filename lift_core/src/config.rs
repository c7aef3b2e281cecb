//! Configuration types for the control loop.
//!
//! These are the runtime configuration structs used by `Controller` and the
//! runner. They are separate from the TOML-deserialized config in `lift_config`.

use std::time::Duration;

/// Door dwell configuration.
#[derive(Debug, Clone)]
pub struct DoorCfg {
    /// Open interval in ms; restarted in full by every open request or obstruction.
    pub open_interval_ms: u64,
}

impl DoorCfg {
    pub fn open_interval(&self) -> Duration {
        Duration::from_millis(self.open_interval_ms)
    }
}

impl Default for DoorCfg {
    fn default() -> Self {
        Self {
            open_interval_ms: 3000,
        }
    }
}

/// Loop pacing.
#[derive(Debug, Clone)]
pub struct RunnerCfg {
    /// Target tick rate of the control loop.
    pub tick_hz: u32,
    /// Stop after this many ticks (None = until interrupted).
    pub max_ticks: Option<u64>,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            tick_hz: 200,
            max_ticks: None,
        }
    }
}
