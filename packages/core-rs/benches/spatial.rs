use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mlmat_core::{Matrix, PaddingMode};

fn image(side: usize) -> Matrix<f32> {
    let data: Vec<f32> = (0..side * side).map(|i| (i % 13) as f32).collect();
    Matrix::from_vec(data, side, side).expect("image")
}

fn bench_convn(c: &mut Criterion) {
    let kernel = Matrix::from_slice(&[1.0f32, 0.0, -1.0, 2.0, 0.0, -2.0, 1.0, 0.0, -1.0], 3, 3)
        .expect("kernel");
    let mut group = c.benchmark_group("convn");
    for &side in &[28usize, 128] {
        let src = image(side);
        for mode in [PaddingMode::Valid, PaddingMode::Full] {
            group.bench_with_input(BenchmarkId::new(mode.as_str(), side), &src, |b, src| {
                b.iter(|| {
                    let mut m = src.clone();
                    m.convn(black_box(&kernel), 1, mode).expect("convn");
                    black_box(m);
                });
            });
        }
    }
    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    let src = image(64);
    c.bench_function("expand_2x2", |b| {
        b.iter(|| {
            let mut m = src.clone();
            m.expand(2, 2).expect("expand");
            black_box(m);
        });
    });
}

criterion_group!(benches, bench_convn, bench_expand);
criterion_main!(benches);
