//! Simulated cabin: time-driven shaft physics behind the `ElevatorIo` trait.
//!
//! The cabin height is tracked in floors (0.0 = ground floor). While the motor
//! runs, height moves by `elapsed / travel` floors per update, clamped to the
//! shaft. A floor sensor reads high within `SENSOR_BAND` of an integer height.
//! Button presses are momentary: latched until the controller polls them once.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lift_traits::{Clock, Direction, ElevatorIo, Movement};

use crate::error::HwError;

/// Half-width of the band (in floors) in which a floor sensor is asserted.
pub const SENSOR_BAND: f64 = 0.05;

type IoResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug)]
struct SimState {
    floors: u8,
    height: f64,
    travel: Duration,
    last_update: Instant,
    movement: Movement,
    door_open: bool,
    stop: bool,
    obstruction: bool,
    pressed: HashSet<(u8, Direction)>,
    order_lamps: HashSet<(u8, Direction)>,
    floor_indicator: Option<u8>,
    stop_lamp: bool,
    initialized: bool,
}

impl SimState {
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_update);
        self.last_update = now;
        let travel_s = self.travel.as_secs_f64().max(f64::EPSILON);
        let delta = dt.as_secs_f64() / travel_s;
        let top = f64::from(self.floors.saturating_sub(1));
        match self.movement {
            Movement::Up => self.height = (self.height + delta).min(top),
            Movement::Down => self.height = (self.height - delta).max(0.0),
            Movement::Stop => {}
        }
    }

    fn sensor_floor(&self) -> Option<u8> {
        let nearest = self.height.round();
        if (self.height - nearest).abs() <= SENSOR_BAND {
            Some(nearest as u8)
        } else {
            None
        }
    }

    fn check_floor(&self, floor: u8) -> Result<(), HwError> {
        if floor >= self.floors {
            return Err(HwError::InvalidFloor(floor));
        }
        Ok(())
    }
}

/// Shared control/observation handle for a `SimulatedElevator`.
///
/// Tests and the CLI use it to press buttons, toggle the stop and obstruction
/// switches, and inspect what the controller commanded.
#[derive(Debug, Clone)]
pub struct SimHandle {
    state: Rc<RefCell<SimState>>,
}

impl SimHandle {
    pub fn press(&self, floor: u8, direction: Direction) {
        self.state.borrow_mut().pressed.insert((floor, direction));
    }

    pub fn set_stop(&self, on: bool) {
        self.state.borrow_mut().stop = on;
    }

    pub fn set_obstruction(&self, on: bool) {
        self.state.borrow_mut().obstruction = on;
    }

    pub fn height(&self) -> f64 {
        self.state.borrow().height
    }

    /// Floor whose sensor is currently asserted, if any.
    pub fn sensor_floor(&self) -> Option<u8> {
        self.state.borrow().sensor_floor()
    }

    pub fn movement(&self) -> Movement {
        self.state.borrow().movement
    }

    pub fn door_open(&self) -> bool {
        self.state.borrow().door_open
    }

    pub fn order_lamp(&self, floor: u8, direction: Direction) -> bool {
        self.state.borrow().order_lamps.contains(&(floor, direction))
    }

    pub fn lit_order_lamps(&self) -> usize {
        self.state.borrow().order_lamps.len()
    }

    pub fn stop_lamp(&self) -> bool {
        self.state.borrow().stop_lamp
    }

    pub fn floor_indicator(&self) -> Option<u8> {
        self.state.borrow().floor_indicator
    }

    pub fn initialized(&self) -> bool {
        self.state.borrow().initialized
    }
}

/// Simulated elevator implementation
pub struct SimulatedElevator {
    state: Rc<RefCell<SimState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl SimulatedElevator {
    /// Create a cabin at `start_height` (in floors) that needs `travel` to move one floor.
    pub fn new(
        floors: u8,
        start_height: f64,
        travel: Duration,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        let top = f64::from(floors.saturating_sub(1));
        let state = SimState {
            floors,
            height: start_height.clamp(0.0, top),
            travel,
            last_update: clock.now(),
            movement: Movement::Stop,
            door_open: false,
            stop: false,
            obstruction: false,
            pressed: HashSet::new(),
            order_lamps: HashSet::new(),
            floor_indicator: None,
            stop_lamp: false,
            initialized: false,
        };
        Self {
            state: Rc::new(RefCell::new(state)),
            clock,
        }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle {
            state: Rc::clone(&self.state),
        }
    }

    fn tick(&self) -> std::cell::RefMut<'_, SimState> {
        let now = self.clock.now();
        let mut st = self.state.borrow_mut();
        st.advance(now);
        st
    }
}

impl ElevatorIo for SimulatedElevator {
    fn init(&mut self) -> IoResult<()> {
        let mut st = self.tick();
        st.initialized = true;
        st.movement = Movement::Stop;
        st.door_open = false;
        st.stop_lamp = false;
        st.order_lamps.clear();
        tracing::debug!(height = st.height, "simulated cabin initialized");
        Ok(())
    }

    fn floor_sensor(&mut self, floor: u8) -> IoResult<bool> {
        let st = self.tick();
        st.check_floor(floor)?;
        Ok(st.sensor_floor() == Some(floor))
    }

    fn stop_signal(&mut self) -> IoResult<bool> {
        Ok(self.tick().stop)
    }

    fn obstruction_signal(&mut self) -> IoResult<bool> {
        Ok(self.tick().obstruction)
    }

    fn order_button(&mut self, floor: u8, direction: Direction) -> IoResult<bool> {
        let mut st = self.tick();
        st.check_floor(floor)?;
        Ok(st.pressed.remove(&(floor, direction)))
    }

    fn set_movement(&mut self, movement: Movement) -> IoResult<()> {
        let mut st = self.tick();
        if st.movement != movement {
            tracing::trace!(?movement, height = st.height, "sim motor");
        }
        st.movement = movement;
        Ok(())
    }

    fn set_door(&mut self, open: bool) -> IoResult<()> {
        self.tick().door_open = open;
        Ok(())
    }

    fn set_order_lamp(&mut self, floor: u8, direction: Direction, on: bool) -> IoResult<()> {
        let mut st = self.tick();
        st.check_floor(floor)?;
        if on {
            st.order_lamps.insert((floor, direction));
        } else {
            st.order_lamps.remove(&(floor, direction));
        }
        Ok(())
    }

    fn set_floor_indicator(&mut self, floor: u8) -> IoResult<()> {
        let mut st = self.tick();
        st.check_floor(floor)?;
        st.floor_indicator = Some(floor);
        Ok(())
    }

    fn set_stop_lamp(&mut self, on: bool) -> IoResult<()> {
        self.tick().stop_lamp = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_traits::ManualClock;

    #[test]
    fn cabin_moves_with_elapsed_time() {
        let clock = Arc::new(ManualClock::new());
        let mut sim = SimulatedElevator::new(4, 0.0, Duration::from_millis(1000), clock.clone());
        let h = sim.handle();
        assert!(sim.floor_sensor(0).unwrap());

        sim.set_movement(Movement::Up).unwrap();
        clock.sleep(Duration::from_millis(500));
        assert!(!sim.floor_sensor(0).unwrap());
        assert!((h.height() - 0.5).abs() < 1e-9);

        clock.sleep(Duration::from_millis(500));
        assert!(sim.floor_sensor(1).unwrap());
    }

    #[test]
    fn cabin_is_clamped_to_shaft() {
        let clock = Arc::new(ManualClock::new());
        let mut sim = SimulatedElevator::new(4, 0.5, Duration::from_millis(100), clock.clone());
        sim.set_movement(Movement::Down).unwrap();
        clock.sleep(Duration::from_secs(10));
        assert!(sim.floor_sensor(0).unwrap());
        assert_eq!(sim.handle().height(), 0.0);
    }

    #[test]
    fn presses_are_momentary() {
        let clock = Arc::new(ManualClock::new());
        let mut sim = SimulatedElevator::new(4, 0.0, Duration::from_millis(100), clock);
        let h = sim.handle();
        h.press(2, Direction::Down);
        assert!(sim.order_button(2, Direction::Down).unwrap());
        assert!(!sim.order_button(2, Direction::Down).unwrap());
    }

    #[test]
    fn out_of_range_floor_is_rejected() {
        let clock = Arc::new(ManualClock::new());
        let mut sim = SimulatedElevator::new(4, 0.0, Duration::from_millis(100), clock);
        let err = sim.floor_sensor(4).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn lamps_are_observable_through_handle() {
        let clock = Arc::new(ManualClock::new());
        let mut sim = SimulatedElevator::new(4, 0.0, Duration::from_millis(100), clock);
        let h = sim.handle();
        sim.set_order_lamp(3, Direction::Inside, true).unwrap();
        sim.set_stop_lamp(true).unwrap();
        sim.set_floor_indicator(0).unwrap();
        assert!(h.order_lamp(3, Direction::Inside));
        assert!(h.stop_lamp());
        assert_eq!(h.floor_indicator(), Some(0));
        sim.set_order_lamp(3, Direction::Inside, false).unwrap();
        assert_eq!(h.lit_order_lamps(), 0);
    }
}
