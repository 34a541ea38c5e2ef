// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — End-to-End Pulse Scenarios
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Full simulate → process runs on the reference apparatus.

use emission_core::engine::PulseSimulation;
use emission_core::report::write_bin_records;
use emission_types::config::PulseConfig;
use emission_types::error::EmissionError;

const REFERENCE_JSON: &str = r#"{
    "generator": "simulated",
    "apparatus": {
        "tau_s": 1e-13,
        "num_electrons": 1e6,
        "work_function_ev": 4.25,
        "photon_energy_ev": 4.75,
        "dc_field_v_per_m": 1e6
    },
    "simulation": {
        "num_space_bins": 200,
        "num_time_slices": 200,
        "num_taus": 6,
        "simple_mode": false
    }
}"#;

/// Reference run: 200 x 200 physical mode, default tolerances.
const REF_SIGMA: f64 = 1.48933e-15;
const REF_ETA: f64 = 2.15397e-51;
const REF_GAMMA: f64 = 3.27118e-33;
const REF_GAMMA_OFFSET: f64 = 1.00058e-25;
const REF_X_PEAK: f64 = 8.6403e-8;
const REF_V_PEAK: f64 = 3.35411e5;
const REF_BINNED: f64 = 9.999867e5;

/// Relative tolerance against the reference row. The row carries six
/// significant figures, so 1e-3 leaves room for summation order only.
const REF_RTOL: f64 = 1e-3;

fn reference_config() -> PulseConfig {
    PulseConfig::from_json_str(REFERENCE_JSON).unwrap()
}

fn assert_close(name: &str, got: f64, expected: f64) {
    let rel = ((got - expected) / expected).abs();
    assert!(
        rel < REF_RTOL,
        "{name} = {got:.6e}, reference {expected:.6e}, relative error {rel:.3e}"
    );
}

#[test]
fn reference_physical_run_is_well_formed() {
    let config = reference_config();
    let mut sim = PulseSimulation::from_config(&config).unwrap();
    sim.simulate().unwrap();
    let summary = sim.process().unwrap();

    let dmax = sim.dmax();
    let vmax = sim.apparatus().max_velocity();

    assert!(summary.x_peak > 0.0 && summary.x_peak < dmax, "x_peak = {}", summary.x_peak);
    assert!(summary.v_peak > 0.0 && summary.v_peak < vmax, "v_peak = {}", summary.v_peak);
    assert!(summary.sigma > 0.0 && summary.sigma < dmax * dmax, "sigma = {}", summary.sigma);
    assert!(summary.eta.is_finite() && summary.eta >= 0.0, "eta = {}", summary.eta);
    assert!(summary.gamma.is_finite(), "gamma = {}", summary.gamma);
    assert!(summary.gamma_offset.is_finite());
    assert!(summary.sigma_coeff > 0.0);
    // Faster electrons run ahead: momentum grows with position.
    assert!(summary.gamma > 0.0, "expected positive chirp, gamma = {}", summary.gamma);

    let allocated = sim.total_electrons_allocated();
    assert!(
        (allocated - 1e6).abs() / 1e6 < 1e-2,
        "allocated {allocated} of 1e6 electrons"
    );
    assert!(sim.vnorm().unwrap() > 0.0);
}

#[test]
fn reference_physical_run_matches_reference_values() {
    let config = reference_config();
    let mut sim = PulseSimulation::from_config(&config).unwrap();
    sim.simulate().unwrap();
    let summary = sim.process().unwrap();

    assert_close("sigma", summary.sigma, REF_SIGMA);
    assert_close("eta", summary.eta, REF_ETA);
    assert_close("gamma", summary.gamma, REF_GAMMA);
    assert_close("gamma_offset", summary.gamma_offset, REF_GAMMA_OFFSET);
    assert_close("x_peak", summary.x_peak, REF_X_PEAK);
    assert_close("v_peak", summary.v_peak, REF_V_PEAK);
    assert_close("binned electrons", sim.histogram().sum(), REF_BINNED);
}

#[test]
fn reference_run_is_deterministic() {
    let config = reference_config();
    let mut a = PulseSimulation::from_config(&config).unwrap();
    let mut b = PulseSimulation::from_config(&config).unwrap();
    a.simulate().unwrap();
    b.simulate().unwrap();
    assert_eq!(a.process().unwrap(), b.process().unwrap());
}

#[test]
fn simplified_mode_conserves_electrons_at_high_resolution() {
    let mut config = reference_config();
    config.simulation.simple_mode = true;
    config.simulation.num_space_bins = 1000;
    config.simulation.num_time_slices = 1000;
    let mut sim = PulseSimulation::from_config(&config).unwrap();
    sim.simulate().unwrap();

    let total: f64 = sim.histogram().sum();
    let rel = (total - 1e6).abs() / 1e6;
    assert!(rel < 1e-2, "binned {total} electrons, relative error {rel}");
    assert!(sim.vnorm().is_none());
}

#[test]
fn simplified_and_physical_runs_agree_on_peak_region() {
    let mut physical_cfg = reference_config();
    physical_cfg.simulation.num_space_bins = 100;
    physical_cfg.simulation.num_time_slices = 100;
    let mut simple_cfg = physical_cfg.clone();
    simple_cfg.simulation.simple_mode = true;

    let mut physical = PulseSimulation::from_config(&physical_cfg).unwrap();
    let mut simple = PulseSimulation::from_config(&simple_cfg).unwrap();
    physical.simulate().unwrap();
    simple.simulate().unwrap();
    let p = physical.process().unwrap();
    let s = simple.process().unwrap();

    let dmax = physical.dmax();
    assert!((p.x_peak - s.x_peak).abs() < 0.5 * dmax, "{} vs {}", p.x_peak, s.x_peak);
    let ratio = p.sigma / s.sigma;
    assert!(ratio > 0.1 && ratio < 10.0, "sigma ratio {ratio}");
}

#[test]
fn phases_enforced_across_full_run() {
    let mut config = reference_config();
    config.simulation.simple_mode = true;
    let mut sim = PulseSimulation::from_config(&config).unwrap();

    assert!(matches!(sim.process(), Err(EmissionError::Sequence { .. })));
    sim.simulate().unwrap();
    sim.process().unwrap();
    assert!(matches!(sim.simulate(), Err(EmissionError::Sequence { .. })));
}

#[test]
fn unreachable_tolerance_fails_at_setup() {
    let mut config = reference_config();
    config.simulation.num_space_bins = 20;
    config.simulation.num_time_slices = 20;
    config.integration.eps_abs = 1e-300;
    config.integration.max_subdivisions = 1;
    let err = PulseSimulation::from_config(&config).unwrap_err();
    assert!(matches!(err, EmissionError::Integration { .. }), "got {err}");
}

#[test]
fn record_stream_matches_histogram() {
    let mut config = reference_config();
    config.simulation.simple_mode = true;
    config.simulation.num_space_bins = 50;
    config.simulation.num_time_slices = 50;
    let mut sim = PulseSimulation::from_config(&config).unwrap();
    sim.simulate().unwrap();

    let records = sim.records().unwrap();
    let histogram = sim.histogram();
    assert_eq!(records.len(), 50);
    for (record, &count) in records.iter().zip(histogram.iter()) {
        assert_eq!(record.total_count, count);
    }
    assert_eq!(records.last().unwrap().position, sim.dmax());

    let mut buf = Vec::new();
    write_bin_records(&mut buf, &records).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 51);
}
