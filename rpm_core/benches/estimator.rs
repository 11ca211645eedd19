use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use rpm_core::{SmoothingCfg, SmoothingEstimator, SmoothingPolicy, SyntheticCfg, SyntheticGenerator};

// Ramp + wow/flutter + noise at 120 Hz, seeded so runs compare.
fn synth_trace(n: usize, seed: u64) -> Vec<f64> {
    let mut g = SyntheticGenerator::new(SyntheticCfg {
        seed: Some(seed),
        noise_pct: 1.0,
        ..SyntheticCfg::default()
    });
    (0..n).map(|i| g.sample(i as f64 / 120.0)).collect()
}

pub fn bench_ingest(c: &mut Criterion) {
    let mut g = c.benchmark_group("estimator_ingest");
    // Allow quick tweaking without CLI flags (Criterion 0.5):
    //   BENCH_SAMPLE_SIZE=10 BENCH_MEAS_MS=50 cargo bench -p rpm_core --bench estimator
    if let Ok(ss) = std::env::var("BENCH_SAMPLE_SIZE") {
        if let Ok(n) = ss.parse::<usize>() {
            g.sample_size(n.max(1));
        }
    } else {
        g.sample_size(50);
    }
    if let Ok(ms) = std::env::var("BENCH_MEAS_MS")
        && let Ok(ms_u64) = ms.parse::<u64>()
    {
        g.measurement_time(std::time::Duration::from_millis(ms_u64));
    }

    let trace = synth_trace(12_000, 0xC0FFEE);

    for (name, policy) in [("mean", SmoothingPolicy::Mean), ("robust", SmoothingPolicy::Robust)] {
        for &window in &[30usize, 120, 480] {
            g.bench_function(format!("{name}_window_{window}"), |b| {
                b.iter_batched(
                    || {
                        SmoothingEstimator::new(SmoothingCfg {
                            window,
                            policy,
                            ..SmoothingCfg::default()
                        })
                    },
                    |mut est| {
                        for &w in &trace {
                            black_box(est.ingest(black_box(w)));
                        }
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    g.finish();
}

criterion_group!(estimator, bench_ingest);
criterion_main!(estimator);
