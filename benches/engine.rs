//! Benchmarks for the hot per-message and per-tick paths
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use protoplay_rs::simulator::LayerParameterSimulator;
use protoplay_rs::stats::StatisticsAggregator;
use protoplay_rs::types::{
    Direction, Layer, MessageDefinition, MessageFilter, ValidationStatus,
};

fn sample_message(step: u32) -> MessageDefinition {
    MessageDefinition {
        step_order: step,
        timestamp_ms: u64::from(step) * 50,
        layer: Layer::ALL[step as usize % Layer::ALL.len()],
        direction: if step % 2 == 0 {
            Direction::Uplink
        } else {
            Direction::Downlink
        },
        protocol: "5G-NR".to_string(),
        message_type: "RRCSetupRequest".to_string(),
        message_name: "RRC Setup Request".to_string(),
        payload: serde_json::json!({ "step": step }),
        information_elements: None,
        layer_parameters: None,
        validation_status: ValidationStatus::Valid,
    }
}

fn bench_statistics_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics_update");
    group.throughput(Throughput::Elements(1));

    group.bench_function("on_message_emitted", |b| {
        let mut stats = StatisticsAggregator::new();
        let message = sample_message(1);
        b.iter(|| stats.on_message_emitted(black_box(&message)));
    });

    group.bench_function("snapshot", |b| {
        let mut stats = StatisticsAggregator::new();
        for step in 0..1000 {
            stats.on_message_emitted(&sample_message(step));
        }
        b.iter(|| black_box(stats.snapshot()));
    });

    group.finish();
}

fn bench_filter_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_match");
    group.throughput(Throughput::Elements(1));

    let message = sample_message(4);
    let filters = [
        ("match_all", MessageFilter::match_all()),
        ("layer", MessageFilter::for_layer(Layer::Rrc)),
        (
            "time_range",
            MessageFilter {
                time_range_ms: Some((0, 10_000)),
                ..Default::default()
            },
        ),
    ];
    for (name, filter) in filters {
        group.bench_with_input(BenchmarkId::new("matches", name), &filter, |b, filter| {
            b.iter(|| black_box(filter.matches(black_box(&message))));
        });
    }

    group.finish();
}

fn bench_simulator_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator_tick");

    for layers in [1usize, 7] {
        let selected = &Layer::ALL[..layers];
        let mut sim = LayerParameterSimulator::new(selected, 100, 42);
        group.throughput(Throughput::Elements(sim.parameter_count() as u64));
        group.bench_with_input(BenchmarkId::new("layers", layers), &(), |b, _| {
            let mut timestamp = 0u64;
            b.iter(|| {
                timestamp += 15_000;
                black_box(sim.tick(timestamp))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_statistics_update,
    bench_filter_match,
    bench_simulator_tick
);
criterion_main!(benches);
