#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the elevator controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; a missing file section falls back to defaults.
//! - Unknown sections and keys are rejected, so a misspelt key never silently means "default".
//! - The floor count is a build-time constant and deliberately not configurable here.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Door {
    /// How long the door stays open after the last open request or obstruction (ms)
    pub open_ms: u64,
}

impl Default for Door {
    fn default() -> Self {
        Self { open_ms: 3000 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Runner {
    /// Control loop rate in ticks per second
    pub tick_hz: u32,
}

impl Default for Runner {
    fn default() -> Self {
        Self { tick_hz: 200 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process simulated cabin
    #[default]
    Sim,
    /// TCP elevator server (hardware rig or its simulator)
    Elevio,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Hardware {
    pub backend: Backend,
    /// host:port of the elevator server (elevio backend only)
    pub addr: String,
    /// Socket connect/read/write timeout (ms)
    pub io_timeout_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            backend: Backend::Sim,
            addr: "localhost:15657".to_string(),
            io_timeout_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sim {
    /// Initial cabin height in floors (fractional = between floors)
    pub start_floor: f64,
    /// Time to travel one floor (ms)
    pub travel_ms: u64,
}

impl Default for Sim {
    fn default() -> Self {
        Self {
            start_floor: 1.5,
            travel_ms: 2000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub door: Door,
    pub runner: Runner,
    pub hardware: Hardware,
    pub sim: Sim,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Validate ranges against a cabin with `floor_count` floors.
    pub fn validate(&self, floor_count: u8) -> eyre::Result<()> {
        // Door
        if self.door.open_ms == 0 {
            eyre::bail!("door.open_ms must be >= 1");
        }
        if self.door.open_ms > 60_000 {
            eyre::bail!("door.open_ms is unreasonably large (>60s)");
        }

        // Runner
        if self.runner.tick_hz == 0 {
            eyre::bail!("runner.tick_hz must be > 0");
        }
        if self.runner.tick_hz > 10_000 {
            eyre::bail!("runner.tick_hz must be <= 10000");
        }

        // Hardware
        if self.hardware.io_timeout_ms == 0 {
            eyre::bail!("hardware.io_timeout_ms must be >= 1");
        }
        if self.hardware.backend == Backend::Elevio && self.hardware.addr.trim().is_empty() {
            eyre::bail!("hardware.addr must be set for the elevio backend");
        }

        // Sim
        let top = f64::from(floor_count.saturating_sub(1));
        if !self.sim.start_floor.is_finite() || !(0.0..=top).contains(&self.sim.start_floor) {
            eyre::bail!("sim.start_floor must be in [0.0, {top}]");
        }
        if self.sim.travel_ms == 0 {
            eyre::bail!("sim.travel_ms must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// Read and parse a config file. A missing file yields the defaults.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {:?}: {}", path, e))
}
