//! Benchmarks of the encoding hot paths.
//!
//! Run with: `cargo bench --bench encoding_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use resin::pattern::signal;
use resin::prelude::*;

fn random_series(rng: &mut Random, len: usize) -> Vec<Real> {
    (0..len).map(|_| rng.uniform(&Interval::SYMMETRIC_UNIT)).collect()
}

// =============================================================================
// SPIKE CODING
// =============================================================================

fn bench_spike_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("spike_code");
    let mut rng = Random::new(42);
    let values = random_series(&mut rng, 1000);

    for half in [4usize, 8, 16, 32] {
        let mut code = SpikeCode::new(&SpikeCodeParams {
            component_half_code_length: half,
            delta_component: true,
            binary_component: true,
            ..Default::default()
        })
        .unwrap();

        group.throughput(Throughput::Elements(values.len() as u64));
        group.bench_with_input(BenchmarkId::new("encode_all_components", half), &values, |b, values| {
            b.iter(|| {
                for &v in values {
                    black_box(code.encode(v));
                }
            });
        });
    }
    group.finish();
}

// =============================================================================
// FEATURE FILTERS
// =============================================================================

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_filter");
    let mut rng = Random::new(7);
    let values: Vec<Real> = random_series(&mut rng, 1000).iter().map(|v| v * 100.0).collect();

    let mut filter = FeatureFilter::new(Interval::SYMMETRIC_UNIT, &FeatureFilterParams::default()).unwrap();
    for &v in &values {
        filter.update(v).unwrap();
    }

    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("real_apply", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(filter.apply(v).unwrap());
            }
        });
    });
    group.finish();
}

// =============================================================================
// PATTERN UNIFICATION
// =============================================================================

fn bench_unification(c: &mut Criterion) {
    let mut group = c.benchmark_group("unification");
    let mut rng = Random::new(3);

    for len in [64usize, 256, 1024] {
        let series = random_series(&mut rng, len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("resample_linear", len), &series, |b, series| {
            b.iter(|| black_box(signal::resample(series, 100, ResamplingMethod::Linear).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("detrend", len), &series, |b, series| {
            b.iter(|| {
                let mut s = series.clone();
                signal::detrend(&mut s);
                black_box(s)
            });
        });
    }

    let pattern = InputPattern::new((0..8).map(|_| random_series(&mut rng, 256)).collect()).unwrap();
    let unifier = PatternUnifier::new(UnificationParams {
        detrend: true,
        unify_amplitudes: true,
        resampling: Some(ResamplingParams {
            signal_begin_threshold: 0.05,
            signal_end_threshold: 0.05,
            target_time_points: 64,
            ..Default::default()
        }),
    })
    .unwrap();
    group.bench_function("unify_8x256", |b| {
        b.iter(|| black_box(unifier.unify(&pattern, None).unwrap()));
    });
    group.finish();
}

// =============================================================================
// INPUT ENCODER
// =============================================================================

fn encoder_params(num_fields: usize, feeding: FeedingParams) -> InputEncoderParams {
    InputEncoderParams {
        feeding,
        fields: (0..num_fields)
            .map(|i| FieldParams::external(format!("f{i}")).routed())
            .collect(),
        ..Default::default()
    }
}

fn bench_encoder(c: &mut Criterion) {
    let mut group = c.benchmark_group("input_encoder");
    let mut rng = Random::new(11);

    for num_fields in [4usize, 32] {
        let params = encoder_params(num_fields, FeedingParams::Continuous(Default::default()));
        let samples: Vec<Vec<Real>> = (0..64).map(|_| random_series(&mut rng, num_fields)).collect();

        group.bench_with_input(BenchmarkId::new("initialize", num_fields), &samples, |b, samples| {
            let mut encoder = InputEncoder::new(&params).unwrap();
            b.iter(|| encoder.initialize(samples).unwrap());
        });

        let mut encoder = InputEncoder::new(&params).unwrap();
        encoder.initialize(&samples).unwrap();
        let mut routed = vec![0.0; encoder.num_routed_values()];
        group.bench_with_input(BenchmarkId::new("continuous_step", num_fields), &samples, |b, samples| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % samples.len();
                encoder.store_new_data(&samples[i]).unwrap();
                encoder.encode_next_input_data(true).unwrap();
                encoder.copy_routed_input_data_to(&mut routed, 0).unwrap();
            });
        });
    }

    let params = encoder_params(
        4,
        FeedingParams::Patterned(PatternedFeedingParams {
            bidir: true,
            ..Default::default()
        }),
    );
    let samples: Vec<Vec<Real>> = (0..16).map(|_| random_series(&mut rng, 4 * 100)).collect();
    let mut encoder = InputEncoder::new(&params).unwrap();
    encoder.initialize(&samples).unwrap();
    group.bench_function("patterned_bidir_cycle", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % samples.len();
            encoder.store_new_data(&samples[i]).unwrap();
            while encoder.encode_next_input_data(true).unwrap() {}
            encoder.set_reverse_mode().unwrap();
            while encoder.encode_next_input_data(true).unwrap() {}
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_spike_code,
    bench_filters,
    bench_unification,
    bench_encoder
);
criterion_main!(benches);
