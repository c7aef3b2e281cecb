//! Outcome of a single control-loop tick.

use crate::fsm::State;
use crate::position::Position;

/// What one call to `Controller::step` observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// State after the tick.
    pub state: State,
    /// Position sampled at the start of the tick.
    pub position: Position,
    /// `(from, to)` when the tick changed state.
    pub transition: Option<(State, State)>,
}
