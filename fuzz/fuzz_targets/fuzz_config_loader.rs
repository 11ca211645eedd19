#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = rpm_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A config that validates must also build a session.
            let built = rpm_core::MeasurementSession::builder()
                .with_smoothing((&cfg.smoothing).into())
                .with_targets((&cfg.targets).into())
                .with_history((&cfg.history).into())
                .build();
            assert!(built.is_ok(), "validated config rejected: {built:?}");
        }
    }
});
