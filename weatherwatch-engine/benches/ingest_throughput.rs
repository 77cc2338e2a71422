use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::thread;
use weatherwatch_engine::{EngineConfig, Ingestor, LocalZone, StationStore};

fn config() -> EngineConfig {
    EngineConfig::builder()
        .zone(LocalZone::utc())
        .build()
        .unwrap()
}

fn payload(station: usize, i: usize) -> Vec<u8> {
    format!(
        r#"{{"stationId":"S{}","temperature":{}.5,"humidity":"{}","timestamp":"2024-01-02T12:34:56Z"}}"#,
        station,
        i % 40,
        i % 100
    )
    .into_bytes()
}

/// Single-threaded decode + validate + upsert
fn bench_ingest_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_single");
    let payloads: Vec<_> = (0..1000).map(|i| payload(i % 10, i)).collect();

    group.throughput(Throughput::Elements(payloads.len() as u64));
    group.bench_function("1000_payloads_10_stations", |b| {
        let ingestor = Ingestor::new(StationStore::new(config()));
        b.iter(|| {
            for p in &payloads {
                black_box(ingestor.ingest(black_box(p)));
            }
        });
    });
    group.finish();
}

/// Concurrent ingest with varying thread counts, one station per thread
fn bench_ingest_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_concurrent");

    for thread_count in [1, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(*thread_count as u64 * 1000));
        group.bench_with_input(
            BenchmarkId::new("threads", thread_count),
            thread_count,
            |b, &thread_count| {
                b.iter(|| {
                    let ingestor = Ingestor::new(StationStore::new(config()));

                    let mut handles_vec = vec![];
                    for t in 0..thread_count {
                        let ingestor = ingestor.clone();
                        let payloads: Vec<_> = (0..1000).map(|i| payload(t, i)).collect();
                        handles_vec.push(thread::spawn(move || {
                            for p in &payloads {
                                black_box(ingestor.ingest(p));
                            }
                        }));
                    }

                    for join_handle in handles_vec {
                        join_handle.join().unwrap();
                    }
                });
            },
        );
    }
    group.finish();
}

/// Snapshot cost with full buffers while a writer keeps ingesting
fn bench_snapshot_under_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_under_load");

    for station_count in [10, 100].iter() {
        let store = Arc::new(StationStore::new(config()));
        let ingestor = Ingestor::with_store(store.clone());
        for i in 0..2000 {
            for s in 0..*station_count {
                ingestor.ingest(&payload(s, i));
            }
        }

        group.bench_with_input(
            BenchmarkId::new("stations", station_count),
            station_count,
            |b, &station_count| {
                let writer = {
                    let ingestor = ingestor.clone();
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            ingestor.ingest(&payload(i % station_count, i));
                        }
                    })
                };
                b.iter(|| black_box(store.snapshot()));
                writer.join().unwrap();
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ingest_single,
    bench_ingest_concurrent,
    bench_snapshot_under_load
);
criterion_main!(benches);
