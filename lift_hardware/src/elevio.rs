//! TCP client for the elevator server (`elevatorserver` / `SimElevatorServer`).
//!
//! Every request is a 4-byte frame `[cmd, a, b, c]`; reads get a 4-byte reply
//! whose payload starts at byte 1.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use lift_traits::{Direction, ElevatorIo, Movement};
use tracing::trace;

use crate::error::{HwError, Result};

/// Default address of a locally running elevator server.
pub const DEFAULT_ADDR: &str = "localhost:15657";

const CMD_MOTOR: u8 = 1;
const CMD_ORDER_LAMP: u8 = 2;
const CMD_FLOOR_INDICATOR: u8 = 3;
const CMD_DOOR_LAMP: u8 = 4;
const CMD_STOP_LAMP: u8 = 5;
const CMD_ORDER_BUTTON: u8 = 6;
const CMD_FLOOR_SENSOR: u8 = 7;
const CMD_STOP_BUTTON: u8 = 8;
const CMD_OBSTRUCTION: u8 = 9;

type IoResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn movement_code(m: Movement) -> u8 {
    match m {
        Movement::Up => 1,
        Movement::Down => u8::MAX,
        Movement::Stop => 0,
    }
}

fn button_code(d: Direction) -> u8 {
    match d {
        Direction::Up => 0,
        Direction::Down => 1,
        Direction::Inside => 2,
    }
}

pub struct ElevioDriver {
    addr: String,
    io_timeout: Duration,
    floors: u8,
    stream: Option<TcpStream>,
}

impl ElevioDriver {
    pub fn new(addr: impl Into<String>, floors: u8, io_timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            io_timeout,
            floors,
            stream: None,
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn connect(&mut self) -> Result<()> {
        let mut last_err = None;
        for sa in self.addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&sa, self.io_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.io_timeout))?;
                    stream.set_write_timeout(Some(self.io_timeout))?;
                    stream.set_nodelay(true)?;
                    tracing::info!(addr = %sa, "connected to elevator server");
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.map(HwError::Io).unwrap_or_else(|| {
            HwError::Protocol(format!("address {} did not resolve", self.addr))
        }))
    }

    fn check_floor(&self, floor: u8) -> Result<()> {
        if floor >= self.floors {
            return Err(HwError::InvalidFloor(floor));
        }
        Ok(())
    }

    fn send(&mut self, frame: [u8; 4]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(HwError::Disconnected)?;
        trace!(?frame, "elevio tx");
        stream.write_all(&frame)?;
        Ok(())
    }

    fn request(&mut self, frame: [u8; 4]) -> Result<[u8; 4]> {
        self.send(frame)?;
        let stream = self.stream.as_mut().ok_or(HwError::Disconnected)?;
        let mut reply = [0u8; 4];
        stream.read_exact(&mut reply)?;
        trace!(?reply, "elevio rx");
        if reply[0] != frame[0] {
            return Err(HwError::Protocol(format!(
                "reply to command {} carried command {}",
                frame[0], reply[0]
            )));
        }
        Ok(reply)
    }
}

impl ElevatorIo for ElevioDriver {
    fn init(&mut self) -> IoResult<()> {
        self.connect()?;
        self.send([CMD_MOTOR, movement_code(Movement::Stop), 0, 0])?;
        self.send([CMD_DOOR_LAMP, 0, 0, 0])?;
        self.send([CMD_STOP_LAMP, 0, 0, 0])?;
        for floor in 0..self.floors {
            for d in Direction::ALL {
                self.send([CMD_ORDER_LAMP, button_code(d), floor, 0])?;
            }
        }
        Ok(())
    }

    fn floor_sensor(&mut self, floor: u8) -> IoResult<bool> {
        self.check_floor(floor)?;
        let reply = self.request([CMD_FLOOR_SENSOR, 0, 0, 0])?;
        Ok(reply[1] != 0 && reply[2] == floor)
    }

    fn stop_signal(&mut self) -> IoResult<bool> {
        Ok(self.request([CMD_STOP_BUTTON, 0, 0, 0])?[1] != 0)
    }

    fn obstruction_signal(&mut self) -> IoResult<bool> {
        Ok(self.request([CMD_OBSTRUCTION, 0, 0, 0])?[1] != 0)
    }

    fn order_button(&mut self, floor: u8, direction: Direction) -> IoResult<bool> {
        self.check_floor(floor)?;
        let reply = self.request([CMD_ORDER_BUTTON, button_code(direction), floor, 0])?;
        Ok(reply[1] != 0)
    }

    fn set_movement(&mut self, movement: Movement) -> IoResult<()> {
        Ok(self.send([CMD_MOTOR, movement_code(movement), 0, 0])?)
    }

    fn set_door(&mut self, open: bool) -> IoResult<()> {
        Ok(self.send([CMD_DOOR_LAMP, u8::from(open), 0, 0])?)
    }

    fn set_order_lamp(&mut self, floor: u8, direction: Direction, on: bool) -> IoResult<()> {
        self.check_floor(floor)?;
        Ok(self.send([CMD_ORDER_LAMP, button_code(direction), floor, u8::from(on)])?)
    }

    fn set_floor_indicator(&mut self, floor: u8) -> IoResult<()> {
        self.check_floor(floor)?;
        Ok(self.send([CMD_FLOOR_INDICATOR, floor, 0, 0])?)
    }

    fn set_stop_lamp(&mut self, on: bool) -> IoResult<()> {
        Ok(self.send([CMD_STOP_LAMP, u8::from(on), 0, 0])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Movement::Up, 1)]
    #[case(Movement::Down, 255)]
    #[case(Movement::Stop, 0)]
    fn motor_codes_match_server_protocol(#[case] m: Movement, #[case] code: u8) {
        assert_eq!(movement_code(m), code);
    }

    #[rstest]
    #[case(Direction::Up, 0)]
    #[case(Direction::Down, 1)]
    #[case(Direction::Inside, 2)]
    fn button_codes_match_server_protocol(#[case] d: Direction, #[case] code: u8) {
        assert_eq!(button_code(d), code);
    }

    #[test]
    fn commands_before_init_report_disconnected() {
        let mut drv = ElevioDriver::new(DEFAULT_ADDR, 4, Duration::from_millis(10));
        let err = drv.set_stop_lamp(true).unwrap_err();
        assert!(err.to_string().contains("not connected"));
    }
}
