#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Elevator control core (hardware-agnostic).
//!
//! All hardware interaction goes through `lift_traits::ElevatorIo`.
//!
//! ## Architecture
//!
//! - **Position**: floor + offset derived from the floor sensors (`position`)
//! - **Orders**: dispatch queue with on-the-way promotion and per-floor dedup (`queue`)
//! - **Door**: dwell timer restarted by obstruction (`door`)
//! - **FSM**: `Controller` owns all control state and runs one tick per `step()` (`fsm`)
//! - **Loop**: paced ticking with shutdown handling (`runner`)

pub mod builder;
pub mod config;
pub mod conversions;
pub mod door;
pub mod error;
pub mod fsm;
pub mod hw_error;
pub mod mocks;
pub mod position;
pub mod queue;
pub mod runner;
pub mod status;
pub mod util;

pub use builder::{ControllerBuilder, Missing};
pub use config::{DoorCfg, RunnerCfg};
pub use door::{DEFAULT_OPEN_INTERVAL, DoorTimer};
pub use error::{BuildError, LiftError, Report, Result};
pub use fsm::{Controller, State};
pub use position::{Offset, Position, decide_position};
pub use queue::{Order, OrderQueue, is_on_the_way};
pub use runner::{RunOutcome, StopReason, run};
pub use status::Tick;

pub use lift_traits::{Clock, Direction, ElevatorIo, FLOOR_COUNT, Movement, MonotonicClock};
