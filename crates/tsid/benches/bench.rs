use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use std::{thread::scope, time::Instant};
use tsid::{
    AtomicTsidFactory, FastGenerator, IdGenStatus, MonotonicClock, SystemClock, ThreadRandom,
    TimeSource, Tsid, TsidFactory, TsidFactoryBuilder, TsidGenerator, ZeroRandom,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource<u64> for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// 22 counter bits with zero seeds: a fixed clock never runs out.
fn fixed_builder() -> TsidFactoryBuilder<FixedMockTime, ZeroRandom> {
    TsidFactoryBuilder::new()
        .with_node_bits(0)
        .with_node(0)
        .with_time_source(FixedMockTime {
            millis: 1_700_000_000_000,
        })
        .with_random(ZeroRandom)
}

/// Benchmarks a hot path where ids are always `Ready`.
fn bench_generator<G: TsidGenerator>(c: &mut Criterion, group_name: &str, make: impl Fn() -> G) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator = make();
                for _ in 0..TOTAL_IDS {
                    match generator.try_next_id() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks generators on a real clock, spinning through rollover.
fn bench_generator_create<G: TsidGenerator>(c: &mut Criterion, group_name: &str, make: impl Fn() -> G) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let generator = make();
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.create());
            }
        });
    });

    group.finish();
}

/// Benchmarks one shared generator hammered from several threads.
fn bench_generator_threaded<G: TsidGenerator + Sync>(
    c: &mut Criterion,
    group_name: &str,
    make: impl Fn() -> G,
) {
    let mut group = c.benchmark_group(group_name);
    for threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));
        group.bench_function(format!("threads/{threads}"), |b| {
            let generator = make();
            b.iter(|| {
                scope(|s| {
                    for _ in 0..threads {
                        s.spawn(|| {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.create());
                            }
                        });
                    }
                });
            });
        });
    }
    group.finish();
}

fn bench_fast(c: &mut Criterion) {
    let mut group = c.benchmark_group("fast");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));
    group.bench_function(format!("global/elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(Tsid::fast());
            }
        });
    });
    group.bench_function(format!("fixed/elems/{TOTAL_IDS}"), |b| {
        let generator = FastGenerator::new(FixedMockTime { millis: 1_700_000_000_000 }, &ThreadRandom);
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id());
            }
        });
    });
    group.finish();
}

fn bench_codecs(c: &mut Criterion) {
    let id = Tsid::from_raw(0x0577_2439_BB9F_9074);
    let text = id.to_string();
    let mut group = c.benchmark_group("codec");
    group.bench_function("canonical/encode", |b| b.iter(|| black_box(id).to_string()));
    group.bench_function("canonical/decode", |b| {
        b.iter(|| black_box(text.as_str()).parse::<Tsid>())
    });
    group.bench_function("base62/encode", |b| b.iter(|| black_box(id).encode(62)));
    group.bench_function("format/hex", |b| b.iter(|| black_box(id).format("DOC-%X.PDF")));
    group.finish();
}

fn benchmarks(c: &mut Criterion) {
    bench_generator(c, "mock/lock", || -> TsidFactory<_, _> {
        fixed_builder().build().unwrap()
    });
    bench_generator(c, "mock/atomic", || -> AtomicTsidFactory<_, _> {
        fixed_builder().build_atomic().unwrap()
    });

    bench_generator_create(c, "system/lock", || {
        TsidFactoryBuilder::new().with_node(1).build().unwrap()
    });
    bench_generator_create(c, "monotonic/atomic", || {
        TsidFactoryBuilder::new()
            .with_node(1)
            .with_time_source(MonotonicClock::new())
            .build_atomic()
            .unwrap()
    });

    bench_generator_threaded(c, "threaded/lock", || {
        TsidFactoryBuilder::new()
            .with_node_bits(10)
            .with_node(1)
            .with_time_source(SystemClock)
            .build()
            .unwrap()
    });
    bench_generator_threaded(c, "threaded/atomic", || {
        TsidFactoryBuilder::new()
            .with_node_bits(10)
            .with_node(1)
            .build_atomic()
            .unwrap()
    });

    bench_fast(c);
    bench_codecs(c);
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
