// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Apparatus
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Laser/cathode inputs and the kinematic quantities derived from them.

use emission_types::config::ApparatusConfig;
use emission_types::constants::{HBAR, M_ELECTRON, Q_ELECTRON};
use emission_types::error::EmissionResult;

/// Validated apparatus inputs with derived quantities computed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApparatusParameters {
    tau_s: f64,
    num_electrons: f64,
    work_function_ev: f64,
    photon_energy_ev: f64,
    dc_field_v_per_m: f64,
    max_energy_j: f64,
    acceleration: f64,
    max_velocity: f64,
    barrier_wavevector: f64,
}

impl ApparatusParameters {
    /// Rejects photon energies at or below the work function, since no
    /// electron would leave the surface.
    pub fn new(
        tau_s: f64,
        num_electrons: f64,
        work_function_ev: f64,
        photon_energy_ev: f64,
        dc_field_v_per_m: f64,
    ) -> EmissionResult<Self> {
        Self::from_config(&ApparatusConfig {
            tau_s,
            num_electrons,
            work_function_ev,
            photon_energy_ev,
            dc_field_v_per_m,
        })
    }

    pub fn from_config(config: &ApparatusConfig) -> EmissionResult<Self> {
        config.validate()?;

        let max_energy_j = Q_ELECTRON * (config.photon_energy_ev - config.work_function_ev);
        let acceleration = Q_ELECTRON * config.dc_field_v_per_m / M_ELECTRON;
        let max_velocity = (2.0 * max_energy_j / M_ELECTRON).sqrt();
        let barrier_wavevector =
            (2.0 * M_ELECTRON * Q_ELECTRON * config.work_function_ev).sqrt() / HBAR;

        Ok(ApparatusParameters {
            tau_s: config.tau_s,
            num_electrons: config.num_electrons,
            work_function_ev: config.work_function_ev,
            photon_energy_ev: config.photon_energy_ev,
            dc_field_v_per_m: config.dc_field_v_per_m,
            max_energy_j,
            acceleration,
            max_velocity,
            barrier_wavevector,
        })
    }

    pub fn tau(&self) -> f64 {
        self.tau_s
    }

    pub fn num_electrons(&self) -> f64 {
        self.num_electrons
    }

    pub fn work_function_ev(&self) -> f64 {
        self.work_function_ev
    }

    pub fn photon_energy_ev(&self) -> f64 {
        self.photon_energy_ev
    }

    pub fn dc_field(&self) -> f64 {
        self.dc_field_v_per_m
    }

    /// Excess photon energy q·(hν − W) (J).
    pub fn max_energy(&self) -> f64 {
        self.max_energy_j
    }

    /// q·E/m (m/s²).
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// √(2·Emax/m) (m/s).
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// kV = √(2·m·q·W)/ħ (1/m), the barrier momentum scale in the
    /// transmission coefficient.
    pub fn barrier_wavevector(&self) -> f64 {
        self.barrier_wavevector
    }
}
