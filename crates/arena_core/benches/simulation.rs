//! Simulation benchmarks for arena_core.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arena_core::prelude::*;

fn full_tick_throughput(c: &mut Criterion) {
    let stats = StatTable::builtin();
    let table = build_level_table(&stats);

    let mut group = c.benchmark_group("tick");
    for level in [1u32, 8, 16] {
        let config = *table.get(level).unwrap();
        group.bench_function(format!("level_{level}"), |b| {
            let mut sim = Simulation::new(&config, &stats, 42).unwrap();
            let player = sim.player().id;
            b.iter(|| {
                let _ = sim.set_direction(player, Direction::Right);
                black_box(sim.tick());
            });
        });
    }
    group.finish();
}

fn arena_generation(c: &mut Criterion) {
    c.bench_function("generate_procedural", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(Arena::generate(ArenaVariant::Procedural, seed))
        });
    });
}

criterion_group!(benches, full_tick_throughput, arena_generation);
criterion_main!(benches);
