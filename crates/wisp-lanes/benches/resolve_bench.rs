use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use wisp_core::math::Rect;
use wisp_core::physics::{CollisionMask, EntityTable, EventList, RegionTable};
use wisp_lanes::physics_lane::{IntentPhysicsLane, PhysicsLane};

/// A grid of small movers drifting right, half of them on a collision course.
fn populate(count: usize) -> EntityTable {
    let mut entities = EntityTable::with_capacity(count);
    for i in 0..count as i32 {
        let x = (i % 16) * 12;
        let y = (i / 16) * 12;
        if let Some(id) = entities.spawn(Rect::from_xywh(x, y, 8, 8), CollisionMask::ALL, CollisionMask::ALL) {
            if let Some(e) = entities.get_mut(id) {
                e.set_velocity(if i % 2 == 0 { 3 } else { 0 }, 0);
            }
        }
    }
    entities
}

fn bench_resolve(c: &mut Criterion) {
    let regions = RegionTable::with_capacity(1);
    let mut group = c.benchmark_group("Intent Resolution");

    for count in [16usize, 64, 128] {
        let entities = populate(count);
        group.bench_with_input(BenchmarkId::new("predict+detect+resolve", count), &count, |b, _| {
            let mut lane = IntentPhysicsLane::new(count);
            let mut events = EventList::with_capacity(count * 4);
            b.iter(|| {
                events.clear();
                lane.predict(&entities);
                lane.detect(&entities, &regions, &mut events);
                lane.resolve();
                black_box(lane.intents().len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
