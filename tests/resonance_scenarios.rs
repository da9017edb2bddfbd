use ppn_resonance::{frequency_grid, run_once, sweep, ResonanceConfig};

fn clean_config() -> ResonanceConfig {
    ResonanceConfig {
        fs_hz: 2000.0,
        seconds: 30.0,
        chamber_f0_hz: 25.0,
        chamber_q: 12.0,
        stone_f0_hz: 32.0,
        stone_q: 18.0,
        drive_noise: 0.0,
        nonlinearity: 0.0,
        ..ResonanceConfig::default()
    }
}

#[test]
fn driving_at_chamber_resonance_amplifies_both_stages() {
    let config = clean_config();
    let on = run_once(&config.with_drive_hz(25.0), 1).unwrap();
    let off = run_once(&config.with_drive_hz(1.0), 1).unwrap();

    assert!(on.chamber_rms > 10.0 * off.chamber_rms, "{on:?} vs {off:?}");
    assert!(on.vib_rms > 10.0 * off.vib_rms, "{on:?} vs {off:?}");
    assert!(on.em_rms > off.em_rms);
}

#[test]
fn em_rms_peaks_between_the_resonators() {
    let config = ResonanceConfig {
        seconds: 5.0,
        ..clean_config()
    };
    let drives = frequency_grid(1.0, 150.0, 1.0).unwrap();
    let results = sweep(&config, &drives, 1).unwrap();
    assert_eq!(results.len(), 150);

    let best = results
        .iter()
        .max_by(|a, b| a.em_rms.total_cmp(&b.em_rms))
        .unwrap();
    assert!(
        (20.0..=37.0).contains(&best.drive_hz),
        "em_rms peak at {} Hz",
        best.drive_hz
    );
    assert!(best.em_rms > results[0].em_rms);
    assert!(best.em_rms > results[149].em_rms);
}

#[test]
fn default_noisy_sweep_is_deterministic() {
    let config = ResonanceConfig {
        seconds: 2.0,
        ..ResonanceConfig::default()
    };
    let drives = [10.0, 25.0, 32.0, 60.0];
    let a = sweep(&config, &drives, 7).unwrap();
    let b = sweep(&config, &drives, 7).unwrap();
    assert_eq!(a, b);

    let shifted = sweep(&config, &drives, 8).unwrap();
    assert_ne!(a, shifted);
}
