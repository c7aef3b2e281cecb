#![no_main]
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use lift_core::{Order, OrderQueue, Position};
use lift_traits::{Direction, FLOOR_COUNT, Movement};

#[derive(Debug, Arbitrary)]
enum Op {
    Add { floor: u8, kind: u8, at: u8, moving: Option<bool> },
    Pop { at: u8 },
    Clear,
}

fn position(at: u8, moving: Option<bool>) -> Position {
    let floor = at % FLOOR_COUNT;
    match moving {
        None => Position::at(floor),
        Some(up) => Position::between(
            Some(floor),
            Some(if up { Movement::Up } else { Movement::Down }),
        ),
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut q = OrderQueue::new(FLOOR_COUNT);
    for op in ops {
        match op {
            Op::Add { floor, kind, at, moving } => {
                let direction = Direction::ALL[usize::from(kind % 3)];
                q.add_order(Order::new(floor, direction), position(at, moving));
            }
            Op::Pop { at } => {
                q.pop(Position::at(at % FLOOR_COUNT));
            }
            Op::Clear => q.clear(),
        }

        let mut seen = [false; FLOOR_COUNT as usize];
        for o in q.iter() {
            assert!(o.floor < FLOOR_COUNT, "out-of-range order queued: {q}");
            assert!(!seen[usize::from(o.floor)], "two orders for one floor: {q}");
            seen[usize::from(o.floor)] = true;
        }
    }
});
