use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndarray::prelude::*;
use ndarray_astroconv::*;
use ndarray_rand::{rand_distr::Uniform, RandomExt};

fn criterion_benchmark(c: &mut Criterion) {
    let x = Array::random((256, 512), Uniform::new(0f64, 1.));
    let k = Array::random((11, 21), Uniform::new(0f64, 1.));

    c.bench_function("direct_fill", |b| {
        b.iter(|| black_box(x.convolve(&k, Boundary::Fill(0.0), false)))
    });

    c.bench_function("direct_extend", |b| {
        b.iter(|| black_box(x.convolve(&k, Boundary::Extend, true)))
    });

    let options = FftConvOptions {
        fft_type: Some(FftType::Default),
        ..Default::default()
    };
    c.bench_function("fft", |b| {
        b.iter(|| black_box(x.convolve_fft(&k, &options)))
    });

    let options = FftConvOptions {
        interpolate_nan: true,
        normalize_kernel: Normalization::Sum,
        quiet: true,
        ..options
    };
    c.bench_function("fft_interpolate_nan", |b| {
        b.iter(|| black_box(x.convolve_fft(&k, &options)))
    });

    #[cfg(feature = "threaded")]
    {
        let mut convolver = FftConvolver::new(
            FftConvOptions {
                fft_type: Some(FftType::NativeThreaded),
                nthreads: Some(4),
                ..Default::default()
            },
            &FftConfig::default(),
        )
        .unwrap();
        c.bench_function("fft_threaded", |b| {
            b.iter(|| black_box(convolver.convolve(&x, &k)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
