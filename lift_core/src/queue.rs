//! Order queue and dispatch policy.
//!
//! The head of the queue is the current target. A new order that lies on the
//! way to the target (between the cabin and the target, with a compatible
//! direction) is served first; anything else waits at the tail. A floor is
//! stopped at once per pass, so the queue never holds two orders for the same
//! floor: the earlier (higher priority) one wins.

use std::collections::VecDeque;
use std::fmt;

use lift_traits::Direction;

use crate::position::{Offset, Position};

/// One outstanding service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    pub floor: u8,
    pub direction: Direction,
}

impl Order {
    pub const fn new(floor: u8, direction: Direction) -> Self {
        Self { floor, direction }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.floor, self.direction)
    }
}

/// Whether `order` can be served as a detour on the way from `position` to `target`.
///
/// The floor the cabin occupies only counts while a sensor is asserted there;
/// passing it between sensors is too late to stop.
pub fn is_on_the_way(order: &Order, target: &Order, position: &Position) -> bool {
    let Some(cur) = position.floor else {
        return false;
    };
    let here = order.floor == cur && position.offset == Offset::AtFloor;
    if target.floor > cur {
        let between = order.floor > cur && order.floor < target.floor;
        (between || here) && order.direction != Direction::Down
    } else if target.floor < cur {
        let between = order.floor < cur && order.floor > target.floor;
        (between || here) && order.direction != Direction::Up
    } else {
        false
    }
}

/// Pending orders; the head is the current target.
#[derive(Debug, Clone)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
    floor_count: u8,
}

impl OrderQueue {
    pub fn new(floor_count: u8) -> Self {
        Self {
            orders: VecDeque::with_capacity(usize::from(floor_count)),
            floor_count,
        }
    }

    pub fn floor_count(&self) -> u8 {
        self.floor_count
    }

    /// The current target.
    pub fn head(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn contains(&self, order: &Order) -> bool {
        self.orders.contains(order)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Insert `order` ahead of the target when it is on the way, else at the tail,
    /// then drop later orders for floors already queued.
    pub fn add_order(&mut self, order: Order, position: Position) {
        if order.floor >= self.floor_count {
            tracing::warn!(%order, floor_count = self.floor_count, "dropping order for unknown floor");
            return;
        }
        self.insert(order, &position);
        self.dedup_floors();
        tracing::debug!(queue = %self, "order added");
    }

    /// Remove the served head and re-prioritise the rest against the new target.
    ///
    /// Returns the removed order; popping an empty queue is a no-op.
    pub fn pop(&mut self, position: Position) -> Option<Order> {
        let served = self.orders.pop_front()?;
        if self.orders.len() > 1 {
            let rest: Vec<Order> = self.orders.drain(1..).collect();
            for order in rest {
                self.insert(order, &position);
            }
            self.dedup_floors();
        }
        tracing::debug!(%served, queue = %self, "order served");
        Some(served)
    }

    /// Drop every pending order.
    pub fn clear(&mut self) {
        if !self.orders.is_empty() {
            tracing::debug!(dropped = self.orders.len(), "queue cleared");
        }
        self.orders.clear();
    }

    fn insert(&mut self, order: Order, position: &Position) {
        match self.orders.front() {
            Some(target) if is_on_the_way(&order, target, position) => {
                self.orders.push_front(order)
            }
            _ => self.orders.push_back(order),
        }
    }

    fn dedup_floors(&mut self) {
        let mut seen = vec![false; usize::from(self.floor_count)];
        self.orders.retain(|o| {
            let slot = &mut seen[usize::from(o.floor)];
            !std::mem::replace(slot, true)
        });
    }
}

impl fmt::Display for OrderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.orders.is_empty() {
            return f.write_str("[]");
        }
        f.write_str("[")?;
        for (i, o) in self.orders.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{o}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn floors(q: &OrderQueue) -> Vec<u8> {
        q.iter().map(|o| o.floor).collect()
    }

    #[test]
    fn first_order_becomes_target() {
        let mut q = OrderQueue::new(4);
        q.add_order(Order::new(3, Direction::Up), Position::at(0));
        assert_eq!(q.head(), Some(&Order::new(3, Direction::Up)));
    }

    #[rstest]
    // going up from 0 to 3
    #[case(Position::at(0), 3, Order::new(1, Direction::Up), true)]
    #[case(Position::at(0), 3, Order::new(2, Direction::Inside), true)]
    #[case(Position::at(0), 3, Order::new(2, Direction::Down), false)]
    #[case(Position::at(1), 3, Order::new(1, Direction::Up), true)]
    #[case(Position::between(Some(1), Some(lift_traits::Movement::Up)), 3, Order::new(1, Direction::Up), false)]
    #[case(Position::between(Some(1), Some(lift_traits::Movement::Up)), 3, Order::new(2, Direction::Up), true)]
    // going down from 3 to 0
    #[case(Position::at(3), 0, Order::new(1, Direction::Down), true)]
    #[case(Position::at(3), 0, Order::new(2, Direction::Inside), true)]
    #[case(Position::at(3), 0, Order::new(2, Direction::Up), false)]
    // target at the current floor: no travel direction
    #[case(Position::at(2), 2, Order::new(1, Direction::Inside), false)]
    #[case(Position::UNKNOWN, 2, Order::new(1, Direction::Inside), false)]
    fn on_the_way_cases(
        #[case] pos: Position,
        #[case] target_floor: u8,
        #[case] order: Order,
        #[case] expected: bool,
    ) {
        let target = Order::new(target_floor, Direction::Inside);
        assert_eq!(is_on_the_way(&order, &target, &pos), expected);
    }

    #[test]
    fn detour_is_served_before_target() {
        let mut q = OrderQueue::new(4);
        q.add_order(Order::new(3, Direction::Inside), Position::at(0));
        q.add_order(Order::new(2, Direction::Up), Position::at(0));
        assert_eq!(floors(&q), vec![2, 3]);
    }

    #[test]
    fn conflicting_order_goes_to_tail() {
        let mut q = OrderQueue::new(6);
        q.add_order(Order::new(5, Direction::Inside), Position::at(3));
        q.add_order(Order::new(2, Direction::Up), Position::at(3));
        q.add_order(Order::new(4, Direction::Down), Position::at(3));
        assert_eq!(floors(&q), vec![5, 2, 4]);
    }

    #[test]
    fn dedup_keeps_first_order_per_floor() {
        let mut q = OrderQueue::new(4);
        q.add_order(Order::new(3, Direction::Down), Position::at(0));
        q.add_order(Order::new(3, Direction::Inside), Position::at(0));
        q.add_order(Order::new(1, Direction::Up), Position::at(0));
        q.add_order(Order::new(1, Direction::Inside), Position::at(0));
        assert_eq!(q.len(), 2);
        assert_eq!(q.head(), Some(&Order::new(1, Direction::Up)));
        assert!(q.contains(&Order::new(3, Direction::Down)));
    }

    #[test]
    fn pop_promotes_orders_on_the_way_to_new_target() {
        let mut q = OrderQueue::new(6);
        q.add_order(Order::new(1, Direction::Inside), Position::at(0));
        q.add_order(Order::new(5, Direction::Inside), Position::at(0));
        q.add_order(Order::new(3, Direction::Inside), Position::at(0));
        assert_eq!(floors(&q), vec![1, 5, 3]);

        let served = q.pop(Position::at(1));
        assert_eq!(served, Some(Order::new(1, Direction::Inside)));
        assert_eq!(floors(&q), vec![3, 5]);
    }

    #[test]
    fn pop_single_and_empty() {
        let mut q = OrderQueue::new(4);
        assert_eq!(q.pop(Position::at(0)), None);
        q.add_order(Order::new(2, Direction::Up), Position::at(0));
        assert!(q.pop(Position::at(2)).is_some());
        assert!(q.is_empty());
    }

    #[test]
    fn out_of_range_order_is_dropped() {
        let mut q = OrderQueue::new(4);
        q.add_order(Order::new(4, Direction::Inside), Position::at(0));
        assert!(q.is_empty());
    }

    #[test]
    fn display_lists_orders_in_service_order() {
        let mut q = OrderQueue::new(4);
        assert_eq!(q.to_string(), "[]");
        q.add_order(Order::new(3, Direction::Up), Position::at(0));
        q.add_order(Order::new(0, Direction::Inside), Position::at(0));
        assert_eq!(q.to_string(), "[3:Up, 0:Inside]");
    }
}
