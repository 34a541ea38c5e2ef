// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Simulation Engine
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Time-sliced deposition of a photoemitted pulse onto spatial bins.
//!
//! The laser window [0, num_taus·tau] is cut into `num_time_slices` slices.
//! Electrons emitted in slice j (Gaussian cumulative profile centred at
//! num_taus·tau/2) propagate for the remaining time t under constant
//! acceleration a. An electron found at x after t left the cathode with
//!   vᵢ(x) = x/t − a·t/2
//! so the share of slice j landing in bin [x₀, x₁) is the fraction of the
//! emission velocity distribution inside [max(vᵢ(x₀), 0), min(vᵢ(x₁), vmax)].
//!
//! Algorithm:
//! 1. Build the velocity model (computes vnorm in physical mode)
//! 2. For each slice, in order:
//!    a. n_slice = N·(erf((t_j − num_taus·tau/2)/tau) + 1)/2 − n_before
//!    b. Sweep all bins (rayon when `parallel`), each bin owned by one worker
//!    c. Reduce the deposited counts into the allocated total
//! 3. `process()` extracts the AG parameters from the filled histogram

use crate::apparatus::ApparatusParameters;
use crate::bins::Bin;
use crate::processor::process_bins;
use crate::velocity::VelocityModel;
use emission_types::config::{IntegrationConfig, PulseConfig, SimulationConfig};
use emission_types::error::{EmissionError, EmissionResult};
use emission_types::state::{BinRecord, ResultSummary};
use log::{debug, info};
use ndarray::Array1;
use rayon::prelude::*;
use statrs::function::erf::erf;

/// Number of debug progress lines emitted per run.
const PROGRESS_CHECKPOINTS: usize = 10;

/// Lifecycle of a [`PulseSimulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,
    Simulated,
    Processed,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Simulated => "simulated",
            Phase::Processed => "processed",
        }
    }
}

/// Quantities shared by every bin within one time slice.
#[derive(Debug, Clone, Copy)]
struct SliceKinematics {
    propagation_time: f64,
    num_in_slice: f64,
    acceleration: f64,
    max_velocity: f64,
}

impl SliceKinematics {
    fn emission_velocity(&self, x: f64) -> f64 {
        x / self.propagation_time - 0.5 * self.acceleration * self.propagation_time
    }

    fn arrival_velocity(&self, x: f64) -> f64 {
        let vi = self.emission_velocity(x);
        (vi * vi + 2.0 * self.acceleration * x).sqrt()
    }

    /// Adds this slice's share to `bin` and returns the deposited count.
    /// Bins outside the reachable window receive nothing.
    fn deposit(&self, bin: &mut Bin, model: &VelocityModel) -> EmissionResult<f64> {
        if self.num_in_slice <= 0.0 {
            return Ok(0.0);
        }
        let v_low = self.emission_velocity(bin.begin()).max(0.0);
        let v_high = self.emission_velocity(bin.end()).min(self.max_velocity);
        if v_low > self.max_velocity || v_high < 0.0 || v_low >= v_high {
            return Ok(0.0);
        }

        let fraction = model.fraction(v_low, v_high)?;
        let count = (self.num_in_slice * fraction).max(0.0);
        if count == 0.0 {
            return Ok(0.0);
        }
        bin.add_slice(
            count,
            self.arrival_velocity(bin.begin()),
            self.arrival_velocity(bin.end()),
        );
        Ok(count)
    }
}

/// Photoemission pulse simulation: `simulate()` then `process()`.
#[derive(Debug, Clone)]
pub struct PulseSimulation {
    apparatus: ApparatusParameters,
    settings: SimulationConfig,
    velocity: VelocityModel,
    bins: Vec<Bin>,
    end_time: f64,
    dmax: f64,
    bin_width: f64,
    slice_duration: f64,
    total_electrons_allocated: f64,
    phase: Phase,
    summary: Option<ResultSummary>,
}

impl PulseSimulation {
    pub fn new(
        apparatus: ApparatusParameters,
        settings: SimulationConfig,
        integration: IntegrationConfig,
    ) -> EmissionResult<Self> {
        settings.validate()?;
        let velocity = VelocityModel::new(&apparatus, settings.simple_mode, integration)?;

        let end_time = settings.num_taus * apparatus.tau();
        let dmax = apparatus.max_velocity() * end_time
            + 0.5 * apparatus.acceleration() * end_time * end_time;
        let bin_width = dmax / settings.num_space_bins as f64;
        let slice_duration = end_time / settings.num_time_slices as f64;
        let bins = build_bins(settings.num_space_bins, bin_width, dmax);

        info!(
            "pulse simulation: {} bins x {} slices, {} mode, end_time={:.4e} s, dmax={:.4e} m",
            settings.num_space_bins,
            settings.num_time_slices,
            if velocity.is_simplified() { "simplified" } else { "physical" },
            end_time,
            dmax
        );
        debug!(
            "vmax={:.6e} m/s, acc={:.6e} m/s^2, bin_width={:.6e} m, slice_duration={:.6e} s",
            apparatus.max_velocity(),
            apparatus.acceleration(),
            bin_width,
            slice_duration
        );

        Ok(PulseSimulation {
            apparatus,
            settings,
            velocity,
            bins,
            end_time,
            dmax,
            bin_width,
            slice_duration,
            total_electrons_allocated: 0.0,
            phase: Phase::Ready,
            summary: None,
        })
    }

    /// Build from a validated [`PulseConfig`].
    pub fn from_config(config: &PulseConfig) -> EmissionResult<Self> {
        let apparatus = ApparatusParameters::from_config(&config.apparatus)?;
        Self::new(apparatus, config.simulation.clone(), config.integration)
    }

    /// Electrons emitted before `elapsed` under the Gaussian laser profile.
    fn cumulative_emitted(&self, elapsed: f64) -> f64 {
        let tau = self.apparatus.tau();
        let centre = 0.5 * self.settings.num_taus * tau;
        0.5 * self.apparatus.num_electrons() * (erf((elapsed - centre) / tau) + 1.0)
    }

    /// Run the full slice loop. May be called once.
    pub fn simulate(&mut self) -> EmissionResult<()> {
        self.simulate_with_progress(|_, _| {})
    }

    /// As [`simulate`](Self::simulate), calling `on_slice(done, total)`
    /// after every completed time slice.
    pub fn simulate_with_progress<F>(&mut self, on_slice: F) -> EmissionResult<()>
    where
        F: FnMut(usize, usize),
    {
        if self.phase != Phase::Ready {
            return Err(EmissionError::Sequence {
                expected: Phase::Ready.name(),
                found: self.phase.name(),
            });
        }

        match self.run_slices(on_slice) {
            Ok(allocated) => {
                self.total_electrons_allocated = allocated;
                self.phase = Phase::Simulated;
                info!(
                    "simulation complete: {:.6e} of {:.6e} electrons allocated",
                    allocated,
                    self.apparatus.num_electrons()
                );
                Ok(())
            }
            Err(err) => {
                // Leave the engine re-runnable with fresh bins.
                self.bins = build_bins(self.settings.num_space_bins, self.bin_width, self.dmax);
                Err(err)
            }
        }
    }

    fn run_slices<F>(&mut self, mut on_slice: F) -> EmissionResult<f64>
    where
        F: FnMut(usize, usize),
    {
        let num_slices = self.settings.num_time_slices;
        let checkpoint = (num_slices / PROGRESS_CHECKPOINTS).max(1);
        let mut num_before_slice = 0.0;
        let mut allocated = 0.0;

        for j in 0..num_slices {
            let elapsed = j as f64 * self.slice_duration;
            let cumulative = self.cumulative_emitted(elapsed);
            let kinematics = SliceKinematics {
                propagation_time: self.end_time - elapsed,
                num_in_slice: (cumulative - num_before_slice).max(0.0),
                acceleration: self.apparatus.acceleration(),
                max_velocity: self.apparatus.max_velocity(),
            };
            num_before_slice = cumulative;

            let model = &self.velocity;
            let deposited = if self.settings.parallel {
                self.bins
                    .par_iter_mut()
                    .map(|bin| kinematics.deposit(bin, model))
                    .try_reduce(|| 0.0, |a, b| Ok(a + b))?
            } else {
                let mut sum = 0.0;
                for bin in self.bins.iter_mut() {
                    sum += kinematics.deposit(bin, model)?;
                }
                sum
            };
            allocated += deposited;

            on_slice(j + 1, num_slices);
            if (j + 1) % checkpoint == 0 {
                debug!(
                    "slice {}/{}: {:.4e} electrons in slice, {:.4e} allocated so far",
                    j + 1,
                    num_slices,
                    kinematics.num_in_slice,
                    allocated
                );
            }
        }

        Ok(allocated)
    }

    /// Extract the pulse summary. Requires a prior `simulate()`; repeated
    /// calls return the stored summary.
    pub fn process(&mut self) -> EmissionResult<ResultSummary> {
        match self.phase {
            Phase::Ready => Err(EmissionError::Sequence {
                expected: Phase::Simulated.name(),
                found: Phase::Ready.name(),
            }),
            Phase::Processed => self.summary.ok_or(EmissionError::Sequence {
                expected: Phase::Simulated.name(),
                found: Phase::Processed.name(),
            }),
            Phase::Simulated => {
                let summary = process_bins(
                    &mut self.bins,
                    self.apparatus.num_electrons(),
                    self.bin_width,
                )?;
                info!(
                    "pulse summary: sigma={:.4e} m^2, eta={:.4e}, gamma={:.4e}, x_peak={:.4e} m",
                    summary.sigma, summary.eta, summary.gamma, summary.x_peak
                );
                self.summary = Some(summary);
                self.phase = Phase::Processed;
                Ok(summary)
            }
        }
    }

    /// Per-bin output rows in spatial order. Requires a prior `simulate()`.
    pub fn records(&mut self) -> EmissionResult<Vec<BinRecord>> {
        if self.phase == Phase::Ready {
            return Err(EmissionError::Sequence {
                expected: Phase::Simulated.name(),
                found: Phase::Ready.name(),
            });
        }
        Ok(self.bins.iter_mut().map(Bin::record).collect())
    }

    /// Bin positions (far edges) in spatial order.
    pub fn positions(&self) -> Array1<f64> {
        self.bins.iter().map(Bin::position).collect()
    }

    /// Electron count per bin in spatial order.
    pub fn histogram(&mut self) -> Array1<f64> {
        self.bins.iter_mut().map(|bin| bin.result().total_count).collect()
    }

    /// Time the host propagation run must add to its clock origin.
    pub fn emission_time_offset(&self) -> f64 {
        self.end_time
    }

    pub fn total_electrons_allocated(&self) -> f64 {
        self.total_electrons_allocated
    }

    pub fn summary(&self) -> Option<ResultSummary> {
        self.summary
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn apparatus(&self) -> &ApparatusParameters {
        &self.apparatus
    }

    pub fn settings(&self) -> &SimulationConfig {
        &self.settings
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Velocity normalisation; `None` in simplified mode.
    pub fn vnorm(&self) -> Option<f64> {
        self.velocity.vnorm()
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn dmax(&self) -> f64 {
        self.dmax
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn slice_duration(&self) -> f64 {
        self.slice_duration
    }
}

/// Contiguous bins over [0, dmax); the last edge is pinned to dmax.
fn build_bins(num_bins: usize, bin_width: f64, dmax: f64) -> Vec<Bin> {
    (0..num_bins)
        .map(|i| {
            let begin = i as f64 * bin_width;
            let end = if i + 1 == num_bins {
                dmax
            } else {
                (i + 1) as f64 * bin_width
            };
            Bin::new(begin, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(bins: usize, slices: usize, simple: bool, parallel: bool) -> SimulationConfig {
        SimulationConfig {
            num_space_bins: bins,
            num_time_slices: slices,
            num_taus: 6.0,
            simple_mode: simple,
            parallel,
        }
    }

    fn simulation(bins: usize, slices: usize, simple: bool) -> PulseSimulation {
        let apparatus = ApparatusParameters::new(100e-15, 1e6, 4.25, 4.75, 1e6).unwrap();
        PulseSimulation::new(
            apparatus,
            settings(bins, slices, simple, true),
            IntegrationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_bins_tile_zero_to_dmax() {
        let sim = simulation(37, 10, true);
        let bins = sim.bins();
        assert_eq!(bins.len(), 37);
        assert_eq!(bins[0].begin(), 0.0);
        assert_eq!(bins[36].end(), sim.dmax());
        for pair in bins.windows(2) {
            assert_eq!(pair[0].end(), pair[1].begin(), "bins must be contiguous");
        }
        assert!((sim.bin_width() * 37.0 - sim.dmax()).abs() < 1e-12 * sim.dmax());
    }

    #[test]
    fn test_derived_times() {
        let sim = simulation(10, 40, true);
        assert!((sim.end_time() - 600e-15).abs() < 1e-27);
        assert!((sim.slice_duration() - 15e-15).abs() < 1e-27);
        assert_eq!(sim.emission_time_offset(), sim.end_time());
        let app = sim.apparatus();
        let expected_dmax =
            app.max_velocity() * 600e-15 + 0.5 * app.acceleration() * 600e-15 * 600e-15;
        assert!((sim.dmax() - expected_dmax).abs() < 1e-12 * expected_dmax);
    }

    #[test]
    fn test_fastest_electron_reaches_dmax() {
        let sim = simulation(10, 10, true);
        let kin = SliceKinematics {
            propagation_time: sim.end_time(),
            num_in_slice: 1.0,
            acceleration: sim.apparatus().acceleration(),
            max_velocity: sim.apparatus().max_velocity(),
        };
        let vmax = sim.apparatus().max_velocity();
        assert!((kin.emission_velocity(sim.dmax()) - vmax).abs() < 1e-6 * vmax);
        // vf = vi + a·t
        let expected_vf = vmax + sim.apparatus().acceleration() * sim.end_time();
        assert!((kin.arrival_velocity(sim.dmax()) - expected_vf).abs() < 1e-6 * expected_vf);
    }

    #[test]
    fn test_unreachable_bin_gets_nothing() {
        let sim = simulation(10, 10, true);
        let kin = SliceKinematics {
            propagation_time: 0.1 * sim.end_time(),
            num_in_slice: 100.0,
            acceleration: sim.apparatus().acceleration(),
            max_velocity: sim.apparatus().max_velocity(),
        };
        let mut far = Bin::new(0.9 * sim.dmax(), sim.dmax());
        let added = kin.deposit(&mut far, &sim.velocity).unwrap();
        assert_eq!(added, 0.0);
        assert!(far.slices().is_empty());
    }

    #[test]
    fn test_process_before_simulate_is_sequence_error() {
        let mut sim = simulation(20, 20, true);
        let err = sim.process().unwrap_err();
        assert!(matches!(err, EmissionError::Sequence { .. }), "got {err}");
        assert!(matches!(sim.records(), Err(EmissionError::Sequence { .. })));
    }

    #[test]
    fn test_simulate_twice_is_sequence_error() {
        let mut sim = simulation(20, 20, true);
        sim.simulate().unwrap();
        assert_eq!(sim.phase(), Phase::Simulated);
        assert!(matches!(sim.simulate(), Err(EmissionError::Sequence { .. })));
    }

    #[test]
    fn test_simple_mode_conserves_emitted_electrons() {
        let mut sim = simulation(200, 200, true);
        sim.simulate().unwrap();
        let total: f64 = sim.histogram().sum();
        let rel = (total - 1e6).abs() / 1e6;
        assert!(rel < 1e-3, "allocated {total}, rel err {rel}");
        assert!((total - sim.total_electrons_allocated()).abs() < 1e-6 * total);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let apparatus = ApparatusParameters::new(100e-15, 1e6, 4.25, 4.75, 1e6).unwrap();
        let mut par = PulseSimulation::new(
            apparatus,
            settings(64, 48, true, true),
            IntegrationConfig::default(),
        )
        .unwrap();
        let mut seq = PulseSimulation::new(
            apparatus,
            settings(64, 48, true, false),
            IntegrationConfig::default(),
        )
        .unwrap();
        par.simulate().unwrap();
        seq.simulate().unwrap();
        let hp = par.histogram();
        let hs = seq.histogram();
        for (a, b) in hp.iter().zip(hs.iter()) {
            assert_eq!(a, b, "per-bin deposits must not depend on scheduling");
        }
    }

    #[test]
    fn test_progress_callback_sees_every_slice() {
        let mut sim = simulation(16, 25, true);
        let mut seen = Vec::new();
        sim.simulate_with_progress(|done, total| seen.push((done, total)))
            .unwrap();
        assert_eq!(seen.len(), 25);
        assert_eq!(seen.first(), Some(&(1, 25)));
        assert_eq!(seen.last(), Some(&(25, 25)));
    }

    #[test]
    fn test_process_is_idempotent() {
        let mut sim = simulation(100, 100, true);
        sim.simulate().unwrap();
        let first = sim.process().unwrap();
        assert_eq!(sim.phase(), Phase::Processed);
        let second = sim.process().unwrap();
        assert_eq!(first, second);
        assert_eq!(sim.summary(), Some(first));
    }

    #[test]
    fn test_records_follow_bins() {
        let mut sim = simulation(30, 30, true);
        sim.simulate().unwrap();
        let records = sim.records().unwrap();
        let positions = sim.positions();
        assert_eq!(records.len(), 30);
        for (rec, pos) in records.iter().zip(positions.iter()) {
            assert_eq!(rec.position, *pos);
            assert!(!rec.avg_momentum.is_nan());
            assert!(!rec.momentum_uncertainty.is_nan());
        }
    }
}
