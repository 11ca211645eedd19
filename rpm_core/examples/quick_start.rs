//! Quick Start Example
//!
//! Feeds the synthetic spin-up signal through a measurement session and
//! prints the display speed and grade every quarter second.
//!
//! Run with `cargo run -p rpm_core --example quick_start`.

use rpm_core::{MeasurementSession, Sample, SyntheticCfg, SyntheticGenerator};

fn main() -> Result<(), eyre::Report> {
    let mut generator = SyntheticGenerator::new(SyntheticCfg {
        seed: Some(42),
        ..SyntheticCfg::default()
    });
    let mut session = MeasurementSession::builder()
        .with_target_speeds([33.33, 45.0])
        .build()?;
    session.start();

    // 8 s at 120 Hz: enough to finish the default ramp and fill the window
    let hz = 120.0;
    for i in 0..960_u32 {
        let t = f64::from(i) / hz;
        let snap = session.ingest(Sample::new(t, generator.sample(t)));
        if i % 30 == 0 {
            println!(
                "t = {t:5.2} s  {:6.2} rpm  {:>11}  rotation {:8.1} deg",
                snap.display_rpm, snap.grade, snap.rotation_deg
            );
        }
    }

    let snap = session.snapshot();
    match snap.current_match {
        Some(m) => println!(
            "settled on {:.2} rpm ({:+.2}%), stable = {}",
            m.target, m.percent_deviation, snap.is_stable
        ),
        None => println!("no target within range"),
    }
    session.stop();
    Ok(())
}
