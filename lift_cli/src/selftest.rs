//! `lift self-test` and `lift self-check`.

use std::sync::Arc;
use std::time::Duration;

use eyre::ensure;
use lift_config::{Backend, Config};
use lift_core::error::LiftError;
use lift_core::hw_error::read_input;
use lift_core::mocks::{ManualClock, PanelIo};
use lift_core::{
    ControllerBuilder, Direction, DoorCfg, DoorTimer, Movement, Order, OrderQueue, Position, State,
};
use lift_hardware::SimulatedElevator;
use lift_traits::{ElevatorIo, FLOOR_COUNT, MonotonicClock};

use crate::backend;
use crate::cli::json_mode;

const TICK: Duration = Duration::from_millis(10);

enum Outcome {
    Passed,
    Skipped(&'static str),
}

type Check = fn(&Config) -> eyre::Result<Outcome>;

fn report(name: &str, status: &str, detail: Option<&str>) {
    if json_mode() {
        println!(
            "{}",
            serde_json::json!({ "check": name, "status": status, "detail": detail })
        );
    } else {
        match detail {
            Some(d) => println!("{name:<10} {status} ({d})"),
            None => println!("{name:<10} {status}"),
        }
    }
}

/// Run every check; stop at the first failure.
pub fn self_test(cfg: &Config) -> eyre::Result<()> {
    let checks: [(&str, Check); 4] = [
        ("door", door_check),
        ("fsm", fsm_check),
        ("queue", queue_check),
        ("scenario", scenario_check),
    ];
    for (name, check) in checks {
        match check(cfg) {
            Ok(Outcome::Passed) => report(name, "ok", None),
            Ok(Outcome::Skipped(why)) => report(name, "skipped", Some(why)),
            Err(e) => {
                report(name, "FAILED", None);
                return Err(e.wrap_err(format!("self-test {name} failed")));
            }
        }
    }
    tracing::info!("self-test passed");
    Ok(())
}

/// Door stays open while obstructed and closes one interval after release.
fn door_check(cfg: &Config) -> eyre::Result<Outcome> {
    if cfg.hardware.backend != Backend::Sim {
        return Ok(Outcome::Skipped("obstruction needs the sim backend"));
    }
    let interval = DoorCfg::from(&cfg.door).open_interval();
    let clock = Arc::new(ManualClock::new());
    let mut sim = SimulatedElevator::new(
        FLOOR_COUNT,
        0.0,
        Duration::from_millis(cfg.sim.travel_ms),
        clock.clone(),
    );
    let handle = sim.handle();
    let mut door = DoorTimer::new(interval, clock.clone());

    door.request_open_and_autoclose(&mut sim);
    handle.set_obstruction(true);
    clock.advance(interval * 2);
    door.update(&mut sim)?;
    ensure!(door.is_open() && handle.door_open(), "door closed while obstructed");

    handle.set_obstruction(false);
    clock.advance(interval.saturating_sub(Duration::from_millis(1)));
    door.update(&mut sim)?;
    ensure!(door.is_open(), "door closed before the interval elapsed");

    clock.advance(Duration::from_millis(1));
    door.update(&mut sim)?;
    ensure!(!door.is_open() && !handle.door_open(), "door did not close after the interval");
    Ok(Outcome::Passed)
}

struct Row {
    from: State,
    at: Position,
    stop: bool,
    door_open: bool,
    pending: bool,
    expect: State,
}

/// Guard table of the state machine, checked on an in-memory panel.
fn fsm_check(_cfg: &Config) -> eyre::Result<Outcome> {
    let between = Position::between(Some(1), Some(Movement::Up));
    let row = |from, at, stop, door_open, pending, expect| Row {
        from,
        at,
        stop,
        door_open,
        pending,
        expect,
    };
    let rows = [
        row(State::Undefined, Position::UNKNOWN, false, false, false, State::Startup),
        row(State::Startup, Position::UNKNOWN, false, false, false, State::Startup),
        row(State::Startup, Position::at(0), false, false, false, State::Idle),
        row(State::Idle, Position::at(0), false, false, true, State::Move),
        row(State::Move, between, false, false, true, State::Move),
        row(State::Move, Position::at(3), false, false, true, State::DoorOpen),
        row(State::DoorOpen, Position::at(3), false, true, true, State::DoorOpen),
        row(State::DoorOpen, Position::at(3), false, false, false, State::Idle),
        row(State::DoorOpen, Position::at(3), false, false, true, State::Move),
        row(State::Startup, between, true, false, false, State::Stop),
        row(State::Idle, Position::at(0), true, false, false, State::Stop),
        row(State::Move, between, true, false, true, State::Stop),
        row(State::DoorOpen, Position::at(3), true, true, false, State::Stop),
        row(State::Stop, Position::at(3), true, false, false, State::Stop),
        row(State::Stop, Position::at(3), false, true, false, State::DoorOpen),
        row(State::Stop, between, false, false, false, State::Idle),
        row(State::Stop, Position::UNKNOWN, false, false, false, State::Startup),
    ];

    for r in rows {
        let mut c = ControllerBuilder::new()
            .with_io(PanelIo::new(FLOOR_COUNT))
            .with_clock(Arc::new(ManualClock::new()))
            .with_state(r.from)
            .build()?;
        c.io_mut().stop = r.stop;
        if r.door_open {
            c.open_door();
        }
        if r.pending {
            c.queue_mut()
                .add_order(Order::new(3, Direction::Inside), Position::at(0));
        }
        let got = c.decide_next_state(&r.at)?;
        ensure!(
            got == r.expect,
            "{} at {:?}: expected {}, got {got}",
            r.from,
            r.at,
            r.expect
        );
    }
    Ok(Outcome::Passed)
}

/// Dispatch policy: detours first, one order per floor, reorder on pop.
fn queue_check(_cfg: &Config) -> eyre::Result<Outcome> {
    let mut q = OrderQueue::new(FLOOR_COUNT);
    let ground = Position::at(0);
    q.add_order(Order::new(3, Direction::Inside), ground);
    q.add_order(Order::new(2, Direction::Up), ground);
    ensure!(
        q.head() == Some(&Order::new(2, Direction::Up)),
        "order on the way was not promoted: {q}"
    );
    q.add_order(Order::new(2, Direction::Down), ground);
    ensure!(q.len() == 2, "duplicate floor kept: {q}");
    q.add_order(Order::new(1, Direction::Down), ground);
    ensure!(
        q.iter().last() == Some(&Order::new(1, Direction::Down)),
        "conflicting order not appended: {q}"
    );

    q.pop(Position::at(2));
    let floors: Vec<u8> = q.iter().map(|o| o.floor).collect();
    ensure!(floors == [3, 1], "unexpected order after pop: {q}");

    q.clear();
    ensure!(q.is_empty(), "clear left orders behind: {q}");
    Ok(Outcome::Passed)
}

/// One ride from the ground floor to the top on the simulated cabin.
fn scenario_check(cfg: &Config) -> eyre::Result<Outcome> {
    if cfg.hardware.backend != Backend::Sim {
        return Ok(Outcome::Skipped("needs the sim backend"));
    }
    let clock = Arc::new(ManualClock::new());
    let sim = SimulatedElevator::new(
        FLOOR_COUNT,
        0.0,
        Duration::from_millis(cfg.sim.travel_ms),
        clock.clone(),
    );
    let handle = sim.handle();
    let mut c = ControllerBuilder::new()
        .with_io(sim)
        .with_door((&cfg.door).into())
        .with_clock(clock.clone())
        .build()?;
    c.init_hardware()?;

    let top = FLOOR_COUNT - 1;
    handle.press(top, Direction::Inside);
    // Generous bound: travel to the top plus one door cycle, in ticks.
    let budget = (cfg.sim.travel_ms * u64::from(top) + cfg.door.open_ms) * 2 / 10 + 100;
    let mut served = false;
    for _ in 0..budget {
        clock.advance(TICK);
        let tick = c.step()?;
        if tick.state == State::DoorOpen && handle.sensor_floor() == Some(top) {
            served = true;
        }
        if served && tick.state == State::Idle {
            ensure!(!handle.door_open(), "door left open in idle");
            return Ok(Outcome::Passed);
        }
    }
    eyre::bail!(
        "cabin did not serve floor {top} (state {}, height {:.2})",
        c.state(),
        handle.height()
    )
}

/// Initialize the configured backend and read every sensor once.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let backend::Selected { mut io, .. } = backend::open(cfg, Arc::new(MonotonicClock::new()));
    io.init()
        .map_err(|e| eyre::Report::new(LiftError::Init(e.to_string())))?;

    let mut floor = None;
    for f in 0..FLOOR_COUNT {
        if read_input(io.floor_sensor(f), "reading floor sensor")? {
            floor = Some(f);
            break;
        }
    }
    let stop = read_input(io.stop_signal(), "reading stop signal")?;
    let obstruction = read_input(io.obstruction_signal(), "reading obstruction signal")?;
    let name = backend::name(cfg.hardware.backend);

    if json_mode() {
        println!(
            "{}",
            serde_json::json!({
                "backend": name,
                "floor": floor,
                "stop": stop,
                "obstruction": obstruction,
            })
        );
    } else {
        let floor = floor.map_or_else(|| "between floors".to_string(), |f| f.to_string());
        println!(
            "self-check ok: backend={name} floor={floor} stop={stop} obstruction={obstruction}"
        );
    }
    Ok(())
}
