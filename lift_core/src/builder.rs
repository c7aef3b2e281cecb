//! Type-state builder for `Controller`.
//!
//! `build()` only exists once a hardware handle has been supplied with
//! `with_io`; everything else has a default.

use std::sync::Arc;

use lift_traits::{Clock, ElevatorIo, FLOOR_COUNT, Movement, MonotonicClock};

use crate::config::DoorCfg;
use crate::door::DoorTimer;
use crate::error::{BuildError, Result};
use crate::fsm::{Controller, State};
use crate::queue::OrderQueue;

/// Marker for a builder that has no hardware yet.
pub struct Missing;

pub struct ControllerBuilder<I> {
    io: Option<I>,
    door: Option<DoorCfg>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    floor_count: u8,
    state: State,
}

impl Default for ControllerBuilder<Missing> {
    fn default() -> Self {
        Self {
            io: None,
            door: None,
            clock: None,
            floor_count: FLOOR_COUNT,
            state: State::Undefined,
        }
    }
}

impl ControllerBuilder<Missing> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the hardware; this unlocks `build()`.
    pub fn with_io<J: ElevatorIo>(self, io: J) -> ControllerBuilder<J> {
        ControllerBuilder {
            io: Some(io),
            door: self.door,
            clock: self.clock,
            floor_count: self.floor_count,
            state: self.state,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<I> ControllerBuilder<I> {
    pub fn with_door(mut self, door: DoorCfg) -> Self {
        self.door = Some(door);
        self
    }

    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the build-time floor count (tests and alternate rigs).
    pub fn with_floor_count(mut self, floors: u8) -> Self {
        self.floor_count = floors;
        self
    }

    /// Start in a given state instead of `Undefined`.
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }
}

impl<I: ElevatorIo> ControllerBuilder<I> {
    pub fn build(self) -> Result<Controller<I>> {
        let Some(io) = self.io else {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "hardware handle missing",
            )));
        };
        let door = self.door.unwrap_or_default();
        if door.open_interval_ms == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "door open interval must be >= 1 ms",
            )));
        }
        if self.floor_count < 2 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "floor count must be >= 2",
            )));
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(Controller {
            io,
            floor_count: self.floor_count,
            state: self.state,
            last_floor: None,
            movement: Movement::Stop,
            movement_when_left_floor: None,
            was_at_floor: false,
            indicated_floor: None,
            door: DoorTimer::new(door.open_interval(), Arc::clone(&clock)),
            queue: OrderQueue::new(self.floor_count),
            clock,
        })
    }
}
