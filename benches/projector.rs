//! Projection benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use footprint::{project, Arch, MetricKind, Sample};

fn samples(languages: usize) -> Vec<Sample> {
    (0..languages)
        .flat_map(|i| {
            Arch::ALL.into_iter().map(move |arch| Sample {
                language: format!("lang-{}", i),
                arch,
                version: "1.0".to_string(),
                value: if (i + arch as usize) % 7 == 0 {
                    None
                } else {
                    Some(((i * 7919) % 4096) as f64)
                },
            })
        })
        .collect()
}

fn bench_project(c: &mut Criterion) {
    let small = samples(40);
    let large = samples(400);

    c.bench_function("project::languages_40", |b| {
        b.iter(|| project(black_box(&small), MetricKind::BinarySize))
    });

    c.bench_function("project::languages_400", |b| {
        b.iter(|| project(black_box(&large), MetricKind::MemoryUsage))
    });
}

criterion_group!(projector, bench_project);
criterion_main!(projector);
