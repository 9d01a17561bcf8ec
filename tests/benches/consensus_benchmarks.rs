//! # Hashgraph Consensus Benchmarks
//!
//! | Benchmark | Measures |
//! |-----------|----------|
//! | `add_event` | Full pipeline throughput for N-node random gossip |
//! | `replay_after_snapshot` | Restart cost: snapshot load plus replay of recent events |
//! | `snapshot_codec` | bincode encode and decode of a round snapshot |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hg_consensus::test_utils::EventEmitter;
use hg_consensus::{ConsensusEngineApi, ConsensusSnapshot, PlatformEvent};
use hg_tests::integration::fixtures::{engine_for, Simulation};
use std::sync::Arc;
use std::time::Duration;

const EVENTS: usize = 2_000;

/// Emitter and emitted events of a finished random-gossip run.
fn recorded_run(nodes: u64, seed: u64) -> (EventEmitter, Vec<Arc<PlatformEvent>>) {
    let mut sim = Simulation::new(nodes, seed).expect("simulation");
    sim.run(EVENTS).expect("run");
    let events = sim.emitter.emitted().to_vec();
    (sim.emitter, events)
}

fn bench_add_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-consensus-add-event");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    for nodes in [4u64, 10, 25] {
        let (emitter, events) = recorded_run(nodes, 7);
        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(BenchmarkId::new("add_event", nodes), &events, |b, events| {
            b.iter(|| {
                let mut engine = engine_for(&emitter).expect("engine");
                for event in events {
                    black_box(engine.add_event(Arc::clone(event)).expect("add_event"));
                }
                engine.last_decided_round()
            })
        });
    }
    group.finish();
}

fn bench_replay_after_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-consensus-restart");
    group.sample_size(20);

    let mut sim = Simulation::new(4, 11).expect("simulation");
    sim.run(EVENTS).expect("run");
    let rounds = sim.rounds();
    let snapshot = rounds[rounds.len() / 2].snapshot.clone();
    let events = sim.emitter.emitted().to_vec();

    group.bench_function("replay_after_snapshot", |b| {
        b.iter(|| {
            let mut engine = engine_for(&sim.emitter).expect("engine");
            engine
                .out_of_band_snapshot_update(&snapshot)
                .expect("snapshot");
            for event in &events {
                black_box(engine.add_event(Arc::clone(event)).expect("add_event"));
            }
            engine.last_decided_round()
        })
    });
    group.finish();
}

fn bench_snapshot_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("hg-consensus-snapshot");

    let mut sim = Simulation::new(25, 3).expect("simulation");
    sim.run(EVENTS).expect("run");
    let snapshot = sim.engine.snapshot().expect("decided round");
    let bytes = snapshot.to_bytes().expect("encode");

    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode", |b| {
        b.iter(|| black_box(snapshot.to_bytes().expect("encode")))
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(ConsensusSnapshot::from_bytes(&bytes).expect("decode")))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_add_event,
    bench_replay_after_snapshot,
    bench_snapshot_codec
);
criterion_main!(benches);
