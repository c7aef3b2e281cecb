use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use lift_core::{Direction, Movement, Order, OrderQueue, Position};

const FLOORS: u8 = 32;

// Deterministic pseudo-random presses
fn synth_orders(n: usize, seed: u32) -> Vec<(Order, Position)> {
    let mut state = seed.max(1);
    let mut next = || {
        let mut x = state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        state = x;
        x
    };
    (0..n)
        .map(|_| {
            let floor = (next() % u32::from(FLOORS)) as u8;
            let direction = Direction::ALL[(next() % 3) as usize];
            let here = (next() % u32::from(FLOORS)) as u8;
            let position = if next() % 2 == 0 {
                Position::at(here)
            } else {
                Position::between(Some(here), Some(Movement::Up))
            };
            (Order::new(floor, direction), position)
        })
        .collect()
}

pub fn bench_add_order(c: &mut Criterion) {
    let orders = synth_orders(256, 0xC0FFEE);
    c.bench_function("queue_add_order_256", |b| {
        b.iter_batched(
            || OrderQueue::new(FLOORS),
            |mut q| {
                for (o, p) in &orders {
                    q.add_order(black_box(*o), *p);
                }
                q
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn bench_pop_reorder(c: &mut Criterion) {
    let orders = synth_orders(256, 7);
    let mut full = OrderQueue::new(FLOORS);
    for (o, p) in &orders {
        full.add_order(*o, *p);
    }
    c.bench_function("queue_drain_with_reorder", |b| {
        b.iter_batched(
            || full.clone(),
            |mut q| {
                let mut floor = 0;
                while let Some(o) = q.pop(Position::at(floor)) {
                    floor = o.floor;
                }
                black_box(floor)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_add_order, bench_pop_reorder);
criterion_main!(benches);
