use std::collections::HashSet;

use lift_core::{Direction, Movement, Order, OrderQueue, Position};
use proptest::prelude::*;

const FLOORS: u8 = 6;

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Inside)
    ]
}

fn position() -> impl Strategy<Value = Position> {
    prop_oneof![
        (0..FLOORS).prop_map(Position::at),
        (0..FLOORS).prop_map(|f| Position::between(Some(f), Some(Movement::Up))),
        (0..FLOORS).prop_map(|f| Position::between(Some(f), Some(Movement::Down))),
        Just(Position::UNKNOWN),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Add(u8, Direction, Position),
    Pop(Position),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..FLOORS + 2, direction(), position()).prop_map(|(f, d, p)| Op::Add(f, d, p)),
        2 => position().prop_map(Op::Pop),
        1 => Just(Op::Clear),
    ]
}

fn assert_one_per_floor(q: &OrderQueue) {
    let mut seen = HashSet::new();
    for o in q.iter() {
        assert!(seen.insert(o.floor), "floor {} queued twice in {q}", o.floor);
        assert!(o.floor < FLOORS);
    }
}

proptest! {
    #[test]
    fn queue_never_holds_two_orders_for_one_floor(ops in prop::collection::vec(op(), 0..64)) {
        let mut q = OrderQueue::new(FLOORS);
        for op in ops {
            match op {
                Op::Add(f, d, p) => q.add_order(Order::new(f, d), p),
                Op::Pop(p) => { q.pop(p); }
                Op::Clear => q.clear(),
            }
            assert_one_per_floor(&q);
            prop_assert!(q.len() <= usize::from(FLOORS));
        }
    }

    #[test]
    fn clear_always_empties(orders in prop::collection::vec((0..FLOORS, direction()), 0..20), pos in position()) {
        let mut q = OrderQueue::new(FLOORS);
        for (f, d) in orders {
            q.add_order(Order::new(f, d), pos);
        }
        q.clear();
        prop_assert!(q.is_empty());
        prop_assert_eq!(q.len(), 0);
    }

    #[test]
    fn pop_removes_exactly_the_head(orders in prop::collection::vec((0..FLOORS, direction()), 1..20), pos in position()) {
        let mut q = OrderQueue::new(FLOORS);
        for (f, d) in orders {
            q.add_order(Order::new(f, d), pos);
        }
        let before: HashSet<Order> = q.iter().copied().collect();
        let head = q.head().copied();
        let popped = q.pop(pos);
        prop_assert_eq!(popped, head);
        let after: HashSet<Order> = q.iter().copied().collect();
        prop_assert_eq!(after.len() + 1, before.len());
        prop_assert!(after.is_subset(&before));
    }

    #[test]
    fn detour_between_cabin_and_target_is_served_first(
        cur in 0..FLOORS - 2,
        gap in 2..FLOORS,
        d in prop_oneof![Just(Direction::Up), Just(Direction::Inside)],
    ) {
        let target = (cur + gap).min(FLOORS - 1);
        prop_assume!(target > cur + 1);
        let here = Position::at(cur);
        let mut q = OrderQueue::new(FLOORS);
        q.add_order(Order::new(target, Direction::Inside), here);
        let detour = Order::new(cur + 1, d);
        q.add_order(detour, here);
        prop_assert_eq!(q.head(), Some(&detour));
    }
}

#[test]
fn pop_on_empty_is_noop() {
    let mut q = OrderQueue::new(FLOORS);
    assert_eq!(q.pop(Position::UNKNOWN), None);
    assert!(q.is_empty());
}
