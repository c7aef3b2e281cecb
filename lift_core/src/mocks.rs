//! Test and helper mocks for lift_core

use std::collections::HashSet;

use lift_traits::{Direction, ElevatorIo, Movement};

pub use lift_traits::ManualClock;

type IoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// In-memory panel: inputs are plain fields, every command is recorded.
///
/// Buttons in `pressed` behave like held buttons: they read high until removed.
#[derive(Debug, Default)]
pub struct PanelIo {
    pub floors: u8,
    pub at_floor: Option<u8>,
    pub stop: bool,
    pub obstruction: bool,
    pub pressed: HashSet<(u8, Direction)>,
    /// When set, every sensor read fails.
    pub fail_reads: bool,
    /// When set, every command fails.
    pub fail_commands: bool,

    pub initialized: bool,
    pub movements: Vec<Movement>,
    pub door_open: bool,
    pub order_lamps: HashSet<(u8, Direction)>,
    pub floor_indicator: Option<u8>,
    pub stop_lamp: bool,
}

impl PanelIo {
    pub fn new(floors: u8) -> Self {
        Self {
            floors,
            ..Self::default()
        }
    }

    /// Last motor command, if any.
    pub fn movement(&self) -> Option<Movement> {
        self.movements.last().copied()
    }

    fn input<T>(&self, v: T) -> IoResult<T> {
        if self.fail_reads {
            return Err(Box::new(std::io::Error::other("panel read failed")));
        }
        Ok(v)
    }

    fn output(&self) -> IoResult<()> {
        if self.fail_commands {
            return Err(Box::new(std::io::Error::other("panel write failed")));
        }
        Ok(())
    }
}

impl ElevatorIo for PanelIo {
    fn init(&mut self) -> IoResult<()> {
        self.output()?;
        self.initialized = true;
        Ok(())
    }

    fn floor_sensor(&mut self, floor: u8) -> IoResult<bool> {
        self.input(self.at_floor == Some(floor))
    }

    fn stop_signal(&mut self) -> IoResult<bool> {
        self.input(self.stop)
    }

    fn obstruction_signal(&mut self) -> IoResult<bool> {
        self.input(self.obstruction)
    }

    fn order_button(&mut self, floor: u8, direction: Direction) -> IoResult<bool> {
        self.input(self.pressed.contains(&(floor, direction)))
    }

    fn set_movement(&mut self, movement: Movement) -> IoResult<()> {
        self.output()?;
        self.movements.push(movement);
        Ok(())
    }

    fn set_door(&mut self, open: bool) -> IoResult<()> {
        self.output()?;
        self.door_open = open;
        Ok(())
    }

    fn set_order_lamp(&mut self, floor: u8, direction: Direction, on: bool) -> IoResult<()> {
        self.output()?;
        if on {
            self.order_lamps.insert((floor, direction));
        } else {
            self.order_lamps.remove(&(floor, direction));
        }
        Ok(())
    }

    fn set_floor_indicator(&mut self, floor: u8) -> IoResult<()> {
        self.output()?;
        self.floor_indicator = Some(floor);
        Ok(())
    }

    fn set_stop_lamp(&mut self, on: bool) -> IoResult<()> {
        self.output()?;
        self.stop_lamp = on;
        Ok(())
    }
}
