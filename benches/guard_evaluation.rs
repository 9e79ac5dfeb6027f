//! Benchmarks for the guard chain hot path
//!
//! This benchmark measures:
//! - Version string comparison
//! - Full guard evaluation for each outcome
//! - Capability predicate

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mini_apps_guard::{
    compare_versions, CallSite, Environment, FixedEnvironment, GuardContext, MountSignal, Scope,
    Version, VersionRequirement,
};

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("version_compare");

    for (a, b) in [("6.0", "6.1"), ("10", "6.1"), ("7.10.2", "7.10")] {
        group.bench_with_input(
            BenchmarkId::new("compare_versions", format!("{a}_vs_{b}")),
            &(a, b),
            |bench, (a, b)| bench.iter(|| compare_versions(black_box(a), black_box(b))),
        );
    }

    group.bench_function("parse", |b| b.iter(|| Version::parse(black_box("7.10.2")).unwrap()));

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mounted = MountSignal::new();
    let ctx = GuardContext::versioned(
        CallSite::method("Bar", "foo"),
        VersionRequirement::new(Version::new(6, 1)).with_mount_signal(mounted.clone()),
    );

    let mut group = c.benchmark_group("guard_evaluate");

    let outside = Scope::new(FixedEnvironment(Environment::Server));
    group.bench_function("unknown_env", |b| {
        b.iter(|| black_box(&outside).evaluate(black_box(&ctx)).is_err())
    });

    let uninitialized = Scope::new(FixedEnvironment(Environment::MiniApp));
    group.bench_function("not_initialized", |b| {
        b.iter(|| black_box(&uninitialized).evaluate(black_box(&ctx)).is_err())
    });

    let ready = Scope::new(FixedEnvironment(Environment::MiniApp));
    ready.init(Version::new(6, 1));
    group.bench_function("not_mounted", |b| {
        b.iter(|| black_box(&ready).evaluate(black_box(&ctx)).is_err())
    });

    mounted.mount();
    group.bench_function("pass", |b| {
        b.iter(|| black_box(&ready).evaluate(black_box(&ctx)).is_ok())
    });

    let min = Version::new(6, 1);
    group.bench_function("is_supported", |b| {
        b.iter(|| black_box(&ready).is_supported(black_box(&min)))
    });

    group.finish();
}

criterion_group!(benches, bench_compare, bench_evaluate);
criterion_main!(benches);
