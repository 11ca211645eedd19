#![no_main]
use libfuzzer_sys::fuzz_target;
use rpm_core::{MeasurementSession, Sample, SmoothingCfg, SmoothingPolicy};

fuzz_target!(|input: (bool, u8, Vec<(f64, f64)>)| {
    let (robust, window, samples) = input;
    let smoothing = SmoothingCfg {
        window: usize::from(window.max(1)),
        policy: if robust {
            SmoothingPolicy::Robust
        } else {
            SmoothingPolicy::Mean
        },
        ..SmoothingCfg::default()
    };
    let Ok(mut session) = MeasurementSession::builder()
        .with_smoothing(smoothing)
        .build()
    else {
        return;
    };
    session.start();
    for (t, w) in samples {
        let snap = session.ingest(Sample::new(t, w));
        assert!(snap.deviation_history.len() <= 100);
    }
    session.stop();
    assert_eq!(session.snapshot().samples, 0);
});
