//! Position tracking from floor sensors and the last movement away from a floor.

use lift_traits::{ElevatorIo, Movement};

use crate::error::Result;
use crate::hw_error::read_input;

/// Where the cabin is relative to `Position::floor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Offset {
    /// A floor sensor is asserted right now.
    AtFloor,
    /// Left `floor` moving down and has not reached the next sensor yet.
    Below,
    /// Left `floor` moving up and has not reached the next sensor yet.
    Above,
    /// No directional history (e.g. startup between floors).
    Undefined,
}

/// Last known floor qualified by an offset.
///
/// Between the 3rd and the 2nd floor going down this is `(3, Below)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub floor: Option<u8>,
    pub offset: Offset,
}

impl Position {
    pub const UNKNOWN: Position = Position {
        floor: None,
        offset: Offset::Undefined,
    };

    pub const fn at(floor: u8) -> Self {
        Self {
            floor: Some(floor),
            offset: Offset::AtFloor,
        }
    }

    /// Off any sensor, last seen at `floor`, having left it with `movement`.
    pub fn between(floor: Option<u8>, movement: Option<Movement>) -> Self {
        let offset = match movement {
            Some(Movement::Down) => Offset::Below,
            Some(Movement::Up) => Offset::Above,
            Some(Movement::Stop) | None => Offset::Undefined,
        };
        Self { floor, offset }
    }

    #[inline]
    pub fn is_at_floor(&self) -> bool {
        self.offset == Offset::AtFloor
    }

    /// The floor is known and the offset carries usable direction information.
    #[inline]
    pub fn is_known(&self) -> bool {
        self.floor.is_some() && self.offset != Offset::Undefined
    }

    /// Floor number when a sensor is asserted.
    #[inline]
    pub fn sensor_floor(&self) -> Option<u8> {
        if self.is_at_floor() { self.floor } else { None }
    }
}

/// Poll the floor sensors in increasing order and derive the cabin position.
///
/// `last_floor` is sticky: it only changes when a sensor fires.
pub fn decide_position<I: ElevatorIo + ?Sized>(
    io: &mut I,
    floor_count: u8,
    last_floor: &mut Option<u8>,
    movement_when_left_floor: Option<Movement>,
) -> Result<Position> {
    for floor in 0..floor_count {
        if read_input(io.floor_sensor(floor), "reading floor sensor")? {
            *last_floor = Some(floor);
            return Ok(Position::at(floor));
        }
    }
    Ok(Position::between(*last_floor, movement_when_left_floor))
}
