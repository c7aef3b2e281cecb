//! `lift run`: assemble the controller and drive the control loop.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use lift_config::Config;
use lift_core::{ControllerBuilder, DoorCfg, RunOutcome, RunnerCfg, StopReason};
use lift_traits::{Clock, MonotonicClock};

use crate::backend;
use crate::cli::{Press, json_mode};

pub fn run_lift(
    cfg: &Config,
    presses: &[Press],
    max_ticks: Option<u64>,
    shutdown: &AtomicBool,
) -> eyre::Result<RunOutcome> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let backend::Selected { io, sim } = backend::open(cfg, Arc::clone(&clock));
    if !presses.is_empty() && sim.is_none() {
        eyre::bail!("--press is only available with the sim backend");
    }

    // Config mapping via From impls from lift_core::conversions
    let door: DoorCfg = (&cfg.door).into();
    let mut runner: RunnerCfg = (&cfg.runner).into();
    runner.max_ticks = max_ticks;

    let mut controller = ControllerBuilder::new()
        .with_io(io)
        .with_door(door)
        .with_clock(clock)
        .build()?;
    controller.init_hardware()?;

    if let Some(sim) = &sim {
        for p in presses {
            tracing::debug!(floor = p.floor, kind = ?p.kind, "scripted press");
            sim.press(p.floor, p.kind);
        }
    }

    tracing::info!(
        backend = backend::name(cfg.hardware.backend),
        open_ms = cfg.door.open_ms,
        tick_hz = runner.tick_hz,
        "controller start"
    );
    lift_core::run(&mut controller, shutdown, &runner)
}

fn reason_name(r: StopReason) -> &'static str {
    match r {
        StopReason::Interrupted => "interrupted",
        StopReason::TickLimit => "tick_limit",
    }
}

/// Print the end-of-run summary on stdout.
pub fn print_summary(out: &RunOutcome) {
    if json_mode() {
        let line = serde_json::json!({
            "ticks": out.ticks,
            "state": out.state.as_str(),
            "floor": out.position.floor,
            "offset": format!("{:?}", out.position.offset),
            "reason": reason_name(out.reason),
        });
        println!("{line}");
        return;
    }
    let floor = out
        .position
        .floor
        .map_or_else(|| "unknown".to_string(), |f| f.to_string());
    if out.reason == StopReason::Interrupted {
        println!("Interrupted: motor stopped.");
    }
    println!(
        "run complete: ticks={} state={} floor={}",
        out.ticks, out.state, floor
    );
}
