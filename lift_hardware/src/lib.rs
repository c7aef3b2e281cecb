//! Concrete `ElevatorIo` backends.
//!
//! - `SimulatedElevator`: in-process cabin physics, driven by a `Clock`.
//! - `ElevioDriver`: TCP client for the 4-byte elevator-server protocol.

pub mod elevio;
pub mod error;
pub mod sim;

pub use elevio::{DEFAULT_ADDR, ElevioDriver};
pub use sim::{SimHandle, SimulatedElevator};
