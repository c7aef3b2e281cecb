//! Elevator state machine and its control context.
//!
//! `Controller` owns every piece of mutable control state (FSM state, last
//! floor, last movement, door timer, order queue) together with the hardware
//! handle. One call to [`Controller::step`] is one tick of the control loop:
//!
//! 1. sample the position from the floor sensors
//! 2. decide the next state (the stop signal always wins)
//! 3. run exit/enter actions when the state changes
//! 4. run the per-state update (button polling, re-opening the door)
//! 5. update the door timer

use std::fmt;
use std::sync::Arc;

use lift_traits::{Clock, Direction, ElevatorIo, Movement};

use crate::door::DoorTimer;
use crate::error::{LiftError, Result};
use crate::hw_error::{fire_and_forget, map_hw_error, read_input};
use crate::position::{Offset, Position, decide_position};
use crate::queue::{Order, OrderQueue};
use crate::status::Tick;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    /// Before the first tick.
    #[default]
    Undefined,
    /// Seeking a reference floor; buttons are ignored.
    Startup,
    Idle,
    Move,
    DoorOpen,
    /// Stop switch engaged.
    Stop,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Undefined => "undefined",
            State::Startup => "startup",
            State::Idle => "idle",
            State::Move => "move",
            State::DoorOpen => "door_open",
            State::Stop => "stop",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Controller<I: ElevatorIo> {
    pub(crate) io: I,
    pub(crate) floor_count: u8,
    pub(crate) state: State,
    pub(crate) last_floor: Option<u8>,
    pub(crate) movement: Movement,
    pub(crate) movement_when_left_floor: Option<Movement>,
    pub(crate) was_at_floor: bool,
    pub(crate) indicated_floor: Option<u8>,
    pub(crate) door: DoorTimer,
    pub(crate) queue: OrderQueue,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
}

impl<I: ElevatorIo> fmt::Debug for Controller<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("state", &self.state)
            .field("last_floor", &self.last_floor)
            .field("movement", &self.movement)
            .field("movement_when_left_floor", &self.movement_when_left_floor)
            .field("door", &self.door)
            .field("queue", &format_args!("{}", self.queue))
            .finish()
    }
}

impl<I: ElevatorIo> Controller<I> {
    /// Initialize the hardware. Must succeed before the first tick.
    pub fn init_hardware(&mut self) -> Result<()> {
        self.io
            .init()
            .map_err(|e| eyre::Report::new(LiftError::Init(e.to_string())))?;
        tracing::info!(floors = self.floor_count, "hardware initialized");
        Ok(())
    }

    /// One control-loop tick.
    pub fn step(&mut self) -> Result<Tick> {
        let position = self.sample_position()?;
        self.update_floor_indicator(&position);

        let from = self.state;
        let to = self.decide_next_state(&position)?;
        let transition = if to != from {
            self.transition(from, to, &position);
            Some((from, to))
        } else {
            None
        };

        self.state_update(&position)?;
        self.door.update(&mut self.io)?;

        Ok(Tick {
            state: self.state,
            position,
            transition,
        })
    }

    /// Read the floor sensors and qualify the result with the departure direction.
    pub fn sample_position(&mut self) -> Result<Position> {
        let mut position = decide_position(
            &mut self.io,
            self.floor_count,
            &mut self.last_floor,
            self.movement_when_left_floor,
        )?;
        // Sensor just de-asserted under power: that is the departure direction.
        if self.was_at_floor && !position.is_at_floor() && self.movement != Movement::Stop {
            self.movement_when_left_floor = Some(self.movement);
            position = Position::between(self.last_floor, self.movement_when_left_floor);
        }
        self.was_at_floor = position.is_at_floor();
        Ok(position)
    }

    /// Pick the next state from the current one. The stop signal overrides every guard.
    pub fn decide_next_state(&mut self, position: &Position) -> Result<State> {
        if self.state == State::Undefined {
            return Ok(State::Startup);
        }
        let stop = read_input(self.io.stop_signal(), "reading stop signal")?;
        let door_open = self.door.is_open();

        let next = match self.state {
            State::Stop if stop => State::Stop,
            State::Stop if door_open => State::DoorOpen,
            State::Stop if position.is_known() => State::Idle,
            State::Stop => State::Startup,
            _ if stop => State::Stop,
            State::Startup if position.is_at_floor() => State::Idle,
            State::Idle if !self.queue.is_empty() => State::Move,
            State::Move if self.target_reached(position) => State::DoorOpen,
            State::DoorOpen if !door_open && self.queue.is_empty() => State::Idle,
            State::DoorOpen if !door_open => State::Move,
            unchanged => unchanged,
        };
        Ok(next)
    }

    /// Run the exit actions of `from`, then the enter actions of `to`.
    pub fn transition(&mut self, from: State, to: State, position: &Position) {
        match from {
            State::Startup | State::Move => self.command_movement(Movement::Stop),
            State::Stop => fire_and_forget(self.io.set_stop_lamp(false), "set_stop_lamp"),
            _ => {}
        }

        match to {
            State::Startup => {
                self.clear_all_lamps();
                if !position.is_at_floor() {
                    self.command_movement(Movement::Down);
                    self.movement_when_left_floor = Some(Movement::Down);
                }
            }
            State::Move => self.enter_move(position),
            State::DoorOpen => {
                if !self.queue.is_empty() {
                    self.serve_head(position);
                }
                self.door.request_open_and_autoclose(&mut self.io);
            }
            State::Stop => {
                self.command_movement(Movement::Stop);
                fire_and_forget(self.io.set_stop_lamp(true), "set_stop_lamp");
                self.clear_all_lamps();
                self.queue.clear();
            }
            State::Idle | State::Undefined => {}
        }

        tracing::info!(
            from = %from,
            to = %to,
            floor = ?position.floor,
            offset = ?position.offset,
            "state transition"
        );
        self.state = to;
    }

    /// Per-tick work of the current state.
    pub fn state_update(&mut self, position: &Position) -> Result<()> {
        match self.state {
            State::Idle => self.poll_buttons(position)?,
            State::Move => {
                let target = self.queue.head().copied();
                self.poll_buttons(position)?;
                // A new head may lie behind the cabin, and a cabin that stopped
                // short of its target must be driven again.
                let stalled = self.movement == Movement::Stop
                    && !position.is_at_floor()
                    && position.is_known();
                if self.queue.head().copied() != target || stalled {
                    self.enter_move(position);
                }
            }
            State::DoorOpen => {
                self.poll_buttons(position)?;
                if self.target_reached(position) {
                    self.serve_head(position);
                    self.door.request_open_and_autoclose(&mut self.io);
                }
            }
            State::Stop => {
                if position.is_at_floor() {
                    self.door.request_open_and_autoclose(&mut self.io);
                }
            }
            State::Startup | State::Undefined => {}
        }
        Ok(())
    }

    /// Command the motor to stop.
    pub fn halt(&mut self) -> Result<()> {
        self.movement = Movement::Stop;
        self.io
            .set_movement(Movement::Stop)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
    }

    /// Open the door for a full dwell, as if a floor had just been served.
    pub fn open_door(&mut self) {
        self.door.request_open_and_autoclose(&mut self.io);
    }

    pub fn state(&self) -> State {
        self.state
    }
    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }
    pub fn queue_mut(&mut self) -> &mut OrderQueue {
        &mut self.queue
    }
    pub fn door(&self) -> &DoorTimer {
        &self.door
    }
    pub fn io(&self) -> &I {
        &self.io
    }
    pub fn io_mut(&mut self) -> &mut I {
        &mut self.io
    }
    pub fn floor_count(&self) -> u8 {
        self.floor_count
    }
    pub fn last_floor(&self) -> Option<u8> {
        self.last_floor
    }
    /// Last motor command.
    pub fn movement(&self) -> Movement {
        self.movement
    }
    pub fn movement_when_left_floor(&self) -> Option<Movement> {
        self.movement_when_left_floor
    }
    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    fn enter_move(&mut self, position: &Position) {
        let (Some(target), Some(current)) = (self.queue.head().copied(), position.floor) else {
            self.command_movement(Movement::Stop);
            return;
        };
        let movement = if target.floor == current {
            match position.offset {
                // Overshot while docking: keep going and come back.
                Offset::Below => Movement::Up,
                Offset::Above => Movement::Down,
                Offset::AtFloor | Offset::Undefined => Movement::Stop,
            }
        } else if target.floor < current {
            Movement::Down
        } else {
            Movement::Up
        };
        self.command_movement(movement);
        if position.is_at_floor() && movement != Movement::Stop {
            self.movement_when_left_floor = Some(movement);
        }
        tracing::debug!(%target, ?movement, "heading to target");
    }

    fn target_reached(&self, position: &Position) -> bool {
        match (self.queue.head(), position.sensor_floor()) {
            (Some(target), Some(floor)) => target.floor == floor,
            _ => false,
        }
    }

    fn serve_head(&mut self, position: &Position) {
        if let Some(head) = self.queue.head().copied() {
            self.clear_floor_lamps(head.floor);
        }
        self.queue.pop(*position);
    }

    fn poll_buttons(&mut self, position: &Position) -> Result<()> {
        for floor in 0..self.floor_count {
            for direction in Direction::ALL {
                if !read_input(self.io.order_button(floor, direction), "reading order button")? {
                    continue;
                }
                let order = Order::new(floor, direction);
                if self.queue.contains(&order) {
                    continue;
                }
                tracing::debug!(%order, "button pressed");
                self.queue.add_order(order, *position);
                fire_and_forget(
                    self.io.set_order_lamp(floor, direction, true),
                    "set_order_lamp",
                );
            }
        }
        Ok(())
    }

    fn update_floor_indicator(&mut self, position: &Position) {
        if let Some(floor) = position.sensor_floor()
            && self.indicated_floor != Some(floor)
        {
            fire_and_forget(self.io.set_floor_indicator(floor), "set_floor_indicator");
            self.indicated_floor = Some(floor);
        }
    }

    fn command_movement(&mut self, movement: Movement) {
        fire_and_forget(self.io.set_movement(movement), "set_movement");
        self.movement = movement;
    }

    fn clear_floor_lamps(&mut self, floor: u8) {
        for direction in Direction::ALL {
            fire_and_forget(
                self.io.set_order_lamp(floor, direction, false),
                "set_order_lamp",
            );
        }
    }

    fn clear_all_lamps(&mut self) {
        for floor in 0..self.floor_count {
            self.clear_floor_lamps(floor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ControllerBuilder;
    use crate::mocks::{ManualClock, PanelIo};
    use rstest::rstest;

    fn controller(state: State) -> Controller<PanelIo> {
        ControllerBuilder::new()
            .with_io(PanelIo::new(4))
            .with_clock(Arc::new(ManualClock::new()))
            .with_state(state)
            .build()
            .unwrap()
    }

    #[test]
    fn first_tick_enters_startup_and_seeks_down() {
        let mut c = controller(State::Undefined);
        let tick = c.step().unwrap();
        assert_eq!(tick.transition, Some((State::Undefined, State::Startup)));
        assert_eq!(c.io().movement(), Some(Movement::Down));
        assert_eq!(c.movement_when_left_floor(), Some(Movement::Down));
    }

    #[test]
    fn startup_at_floor_does_not_move() {
        let mut c = controller(State::Undefined);
        c.io_mut().at_floor = Some(2);
        c.step().unwrap();
        assert!(c.io().movements.is_empty());
        let tick = c.step().unwrap();
        assert_eq!(tick.state, State::Idle);
        assert_eq!(c.io().floor_indicator, Some(2));
    }

    #[rstest]
    #[case(Position::between(Some(2), Some(Movement::Down)), 2, Movement::Up)]
    #[case(Position::between(Some(2), Some(Movement::Up)), 2, Movement::Down)]
    #[case(Position::at(2), 0, Movement::Down)]
    #[case(Position::at(2), 3, Movement::Up)]
    #[case(Position::at(2), 2, Movement::Stop)]
    fn move_direction(#[case] pos: Position, #[case] target: u8, #[case] expected: Movement) {
        let mut c = controller(State::Idle);
        c.queue_mut().add_order(Order::new(target, Direction::Inside), pos);
        c.transition(State::Idle, State::Move, &pos);
        assert_eq!(c.movement(), expected);
        assert_eq!(c.io().movement(), Some(expected));
    }

    #[test]
    fn departure_direction_recorded_only_when_leaving_a_floor() {
        let mut c = controller(State::Idle);
        let between = Position::between(Some(1), Some(Movement::Down));
        c.movement_when_left_floor = Some(Movement::Down);
        c.queue_mut().add_order(Order::new(3, Direction::Inside), between);
        c.transition(State::Idle, State::Move, &between);
        assert_eq!(c.movement_when_left_floor(), Some(Movement::Down));

        let mut c = controller(State::Idle);
        c.queue_mut().add_order(Order::new(3, Direction::Inside), Position::at(1));
        c.transition(State::Idle, State::Move, &Position::at(1));
        assert_eq!(c.movement_when_left_floor(), Some(Movement::Up));
    }

    #[test]
    fn passing_a_floor_updates_the_offset() {
        let mut c = controller(State::Move);
        c.io_mut().at_floor = Some(1);
        c.movement = Movement::Up;
        c.movement_when_left_floor = Some(Movement::Down);
        assert_eq!(c.sample_position().unwrap(), Position::at(1));
        c.io_mut().at_floor = None;
        let p = c.sample_position().unwrap();
        assert_eq!(p, Position::between(Some(1), Some(Movement::Up)));
    }

    #[test]
    fn enter_stop_clears_queue_and_lamps() {
        let mut c = controller(State::Move);
        c.io_mut().order_lamps.insert((3, Direction::Up));
        c.queue_mut().add_order(Order::new(3, Direction::Up), Position::at(0));
        c.transition(State::Move, State::Stop, &Position::at(0));
        assert!(c.queue().is_empty());
        assert!(c.io().order_lamps.is_empty());
        assert!(c.io().stop_lamp);
        assert_eq!(c.movement(), Movement::Stop);
    }

    #[test]
    fn leaving_stop_turns_lamp_off() {
        let mut c = controller(State::Stop);
        c.io_mut().stop_lamp = true;
        c.transition(State::Stop, State::Idle, &Position::at(0));
        assert!(!c.io().stop_lamp);
    }

    #[test]
    fn read_failure_surfaces_from_step() {
        let mut c = controller(State::Idle);
        c.io_mut().fail_reads = true;
        let err = c.step().unwrap_err();
        assert!(matches!(err.downcast_ref::<LiftError>(), Some(LiftError::Hardware(_))));
    }

    #[test]
    fn command_failures_do_not_stop_the_loop() {
        let mut c = controller(State::Undefined);
        c.io_mut().fail_commands = true;
        c.io_mut().at_floor = Some(0);
        c.step().unwrap();
        assert_eq!(c.step().unwrap().state, State::Idle);
    }

    #[test]
    fn init_failure_maps_to_init_error() {
        let mut c = controller(State::Undefined);
        c.io_mut().fail_commands = true;
        let err = c.init_hardware().unwrap_err();
        assert!(matches!(err.downcast_ref::<LiftError>(), Some(LiftError::Init(_))));
    }

    #[test]
    fn state_names() {
        assert_eq!(State::DoorOpen.to_string(), "door_open");
        assert_eq!(State::default(), State::Undefined);
    }
}
