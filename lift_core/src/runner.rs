//! The polled control loop.

use std::sync::atomic::{AtomicBool, Ordering};

use lift_traits::ElevatorIo;

use crate::config::RunnerCfg;
use crate::error::Result;
use crate::fsm::{Controller, State};
use crate::position::Position;

/// Why the loop returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown flag was raised (operator interrupt).
    Interrupted,
    /// `max_ticks` was reached.
    TickLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub ticks: u64,
    pub state: State,
    /// Position seen on the last tick.
    pub position: Position,
    pub reason: StopReason,
}

/// Tick `controller` until `shutdown` is raised, `max_ticks` is reached, or a
/// sensor read fails. The motor is commanded to stop on every way out.
///
/// Hardware must already be initialized (`Controller::init_hardware`).
pub fn run<I: ElevatorIo>(
    controller: &mut Controller<I>,
    shutdown: &AtomicBool,
    cfg: &RunnerCfg,
) -> Result<RunOutcome> {
    let period = crate::util::tick_period(cfg.tick_hz);
    let clock = std::sync::Arc::clone(controller.clock());
    let mut ticks: u64 = 0;
    let mut position = Position::UNKNOWN;

    tracing::info!(tick_hz = cfg.tick_hz, max_ticks = ?cfg.max_ticks, "control loop start");

    let reason = loop {
        if shutdown.load(Ordering::Relaxed) {
            break StopReason::Interrupted;
        }
        if cfg.max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::TickLimit;
        }

        let started = clock.now();
        match controller.step() {
            Ok(tick) => position = tick.position,
            Err(e) => {
                if let Err(halt_err) = controller.halt() {
                    tracing::warn!(error = %halt_err, "motor stop failed after hardware error");
                }
                tracing::error!(error = %e, ticks, "control loop aborted");
                return Err(e);
            }
        }
        ticks += 1;

        let spent = clock.now().saturating_duration_since(started);
        clock.sleep(period.saturating_sub(spent));
    };

    if let Err(e) = controller.halt() {
        tracing::warn!(error = %e, "motor stop failed on shutdown");
    }
    let outcome = RunOutcome {
        ticks,
        state: controller.state(),
        position,
        reason,
    };
    tracing::info!(ticks, state = %outcome.state, reason = ?reason, "control loop stopped");
    Ok(outcome)
}
