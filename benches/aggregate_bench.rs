use std::collections::{BTreeSet, HashMap};
use std::hint::black_box;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use procscope::report;
use procscope::system::aggregate::aggregate;
use procscope::system::category::{Categorizer, Category};
use procscope::system::cpu::CpuUsageCalculator;
use procscope::system::platform::CpuTicks;
use procscope::system::process::ProcessRecord;
use procscope::system::snapshot::Snapshot;
use procscope::system::timebase::TimeBase;

const NAMES: [&str; 8] = [
    "launchd",
    "Safari",
    "cargo",
    "Slack",
    "kworker/0:1",
    "python3",
    "mystery",
    "Code Helper (Renderer)",
];

fn make_records(n: usize) -> Vec<ProcessRecord> {
    (0..n)
        .map(|i| ProcessRecord {
            pid: i as u32 + 1,
            name: format!("proc_{i}"),
            path: PathBuf::from(format!("/usr/bin/proc_{i}")),
            bundle_identifier: None,
            cpu_usage_percent: (i % 400) as f64 * 0.75,
            memory_usage_bytes: ((n - i) as u64 + 1) * 4096,
            category: Category::ALL[i % Category::ALL.len()],
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let records = make_records(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(aggregate(black_box(records), 5)))
        });
    }

    group.finish();
}

fn bench_cpu_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_update_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let alive: BTreeSet<u32> = (1..=size as u32).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &alive, |b, alive| {
            let mut calc = CpuUsageCalculator::new(TimeBase::IDENTITY);
            let mut now = Instant::now();
            let mut busy: HashMap<u32, u64> = HashMap::new();
            b.iter(|| {
                now += Duration::from_secs(3);
                for &pid in alive {
                    let ticks = busy.entry(pid).or_default();
                    *ticks += u64::from(pid) * 1_000;
                    black_box(calc.update(
                        pid,
                        CpuTicks {
                            user: *ticks,
                            system: 0,
                        },
                        now,
                    ));
                }
                black_box(calc.retain_alive(alive));
            })
        });
    }

    group.finish();
}

fn bench_categorize(c: &mut Criterion) {
    let categorizer = Categorizer::default();
    c.bench_function("categorize_builtin_rules", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(categorizer.categorize(black_box(name), None));
            }
        })
    });
}

fn bench_report_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_render_500_1000_2000");

    for size in [500usize, 1000, 2000] {
        let snapshot = Snapshot::build(
            1,
            SystemTime::UNIX_EPOCH,
            Duration::ZERO,
            make_records(size),
            5,
        );
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| black_box(report::render(black_box(snapshot))))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_aggregate,
    bench_cpu_update,
    bench_categorize,
    bench_report_render
);
criterion_main!(benches);
