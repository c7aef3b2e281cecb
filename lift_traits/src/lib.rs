pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

/// Number of floors served by the cabin. Fixed at build time.
pub const FLOOR_COUNT: u8 = 4;

type IoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Kind of order button: hall call up, hall call down, or cab panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    /// Placed from inside the cabin; has no preferred direction.
    Inside,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Up, Direction::Down, Direction::Inside];
}

/// Motor command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Up,
    Down,
    Stop,
}

/// Hardware surface of a single elevator cabin.
///
/// Reads are sensor polls; `set_*` methods are write-only commands with no
/// acknowledgment. Repeating an identical command is harmless.
pub trait ElevatorIo {
    /// Called once before the control loop starts.
    fn init(&mut self) -> IoResult<()>;

    fn floor_sensor(&mut self, floor: u8) -> IoResult<bool>;
    fn stop_signal(&mut self) -> IoResult<bool>;
    fn obstruction_signal(&mut self) -> IoResult<bool>;
    fn order_button(&mut self, floor: u8, direction: Direction) -> IoResult<bool>;

    fn set_movement(&mut self, movement: Movement) -> IoResult<()>;
    fn set_door(&mut self, open: bool) -> IoResult<()>;
    fn set_order_lamp(&mut self, floor: u8, direction: Direction, on: bool) -> IoResult<()>;
    fn set_floor_indicator(&mut self, floor: u8) -> IoResult<()>;
    fn set_stop_lamp(&mut self, on: bool) -> IoResult<()>;
}

impl<T: ElevatorIo + ?Sized> ElevatorIo for Box<T> {
    fn init(&mut self) -> IoResult<()> {
        (**self).init()
    }
    fn floor_sensor(&mut self, floor: u8) -> IoResult<bool> {
        (**self).floor_sensor(floor)
    }
    fn stop_signal(&mut self) -> IoResult<bool> {
        (**self).stop_signal()
    }
    fn obstruction_signal(&mut self) -> IoResult<bool> {
        (**self).obstruction_signal()
    }
    fn order_button(&mut self, floor: u8, direction: Direction) -> IoResult<bool> {
        (**self).order_button(floor, direction)
    }
    fn set_movement(&mut self, movement: Movement) -> IoResult<()> {
        (**self).set_movement(movement)
    }
    fn set_door(&mut self, open: bool) -> IoResult<()> {
        (**self).set_door(open)
    }
    fn set_order_lamp(&mut self, floor: u8, direction: Direction, on: bool) -> IoResult<()> {
        (**self).set_order_lamp(floor, direction, on)
    }
    fn set_floor_indicator(&mut self, floor: u8) -> IoResult<()> {
        (**self).set_floor_indicator(floor)
    }
    fn set_stop_lamp(&mut self, on: bool) -> IoResult<()> {
        (**self).set_stop_lamp(on)
    }
}
