// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{EmissionError, EmissionResult};
use serde::{Deserialize, Serialize};

/// Top-level pulse configuration, loaded from JSON.
///
/// Every section except `apparatus` may be omitted; the defaults reproduce
/// the reference run (100 fs pulse, 1e6 electrons, 4.25 eV work function,
/// 4.75 eV photons, 1 MV/m extraction field, 200 x 200 discretisation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    #[serde(default)]
    pub generator: GeneratorKind,
    #[serde(default)]
    pub apparatus: ApparatusConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
    /// Required when `generator` is `analytic`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytic: Option<AnalyticConfig>,
}

/// Which pulse generator variant builds the AG parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Analytic,
    #[default]
    Simulated,
}

/// Laser and cathode inputs. Energies in eV, field in V/m.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApparatusConfig {
    /// Laser pulse duration (s).
    #[serde(default = "default_tau")]
    pub tau_s: f64,
    #[serde(default = "default_num_electrons")]
    pub num_electrons: f64,
    #[serde(default = "default_work_function")]
    pub work_function_ev: f64,
    #[serde(default = "default_photon_energy")]
    pub photon_energy_ev: f64,
    #[serde(default = "default_dc_field")]
    pub dc_field_v_per_m: f64,
}

fn default_tau() -> f64 {
    100e-15
}
fn default_num_electrons() -> f64 {
    1e6
}
fn default_work_function() -> f64 {
    4.25
}
fn default_photon_energy() -> f64 {
    4.75
}
fn default_dc_field() -> f64 {
    1e6
}

impl Default for ApparatusConfig {
    fn default() -> Self {
        ApparatusConfig {
            tau_s: default_tau(),
            num_electrons: default_num_electrons(),
            work_function_ev: default_work_function(),
            photon_energy_ev: default_photon_energy(),
            dc_field_v_per_m: default_dc_field(),
        }
    }
}

/// Discretisation of the time-sliced deposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_num_space_bins")]
    pub num_space_bins: usize,
    #[serde(default = "default_num_time_slices")]
    pub num_time_slices: usize,
    /// Simulated window length in units of tau; the emission peak sits at
    /// half of it.
    #[serde(default = "default_num_taus")]
    pub num_taus: f64,
    /// Use the closed-form (v/vmax)^5 velocity fraction instead of the
    /// transmission-weighted double integral.
    #[serde(default)]
    pub simple_mode: bool,
    /// Sweep bins on the rayon pool within each time slice.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_num_space_bins() -> usize {
    200
}
fn default_num_time_slices() -> usize {
    200
}
fn default_num_taus() -> f64 {
    6.0
}
fn default_parallel() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_space_bins: default_num_space_bins(),
            num_time_slices: default_num_time_slices(),
            num_taus: default_num_taus(),
            simple_mode: false,
            parallel: default_parallel(),
        }
    }
}

/// Tolerances for the adaptive quadrature behind the velocity distribution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegrationConfig {
    #[serde(default = "default_eps_abs")]
    pub eps_abs: f64,
    #[serde(default)]
    pub eps_rel: f64,
    #[serde(default = "default_max_subdivisions")]
    pub max_subdivisions: usize,
}

fn default_eps_abs() -> f64 {
    1e-6
}
fn default_max_subdivisions() -> usize {
    50
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        IntegrationConfig {
            eps_abs: default_eps_abs(),
            eps_rel: 0.0,
            max_subdivisions: default_max_subdivisions(),
        }
    }
}

/// User-specified AG model parameters for the analytic generator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyticConfig {
    /// Longitudinal variance (m^2).
    pub sigma_z: f64,
    /// Momentum uncertainty term ((kg m/s)^2).
    pub eta_z: f64,
    /// Momentum-position correlation (kg m^2/s).
    pub gamma_z: f64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        PulseConfig {
            generator: GeneratorKind::default(),
            apparatus: ApparatusConfig::default(),
            simulation: SimulationConfig::default(),
            integration: IntegrationConfig::default(),
            analytic: None,
        }
    }
}

fn require_positive(value: f64, name: &str) -> EmissionResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EmissionError::Domain(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

impl PulseConfig {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> EmissionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json_str(contents: &str) -> EmissionResult<Self> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EmissionResult<()> {
        self.apparatus.validate()?;
        self.simulation.validate()?;
        self.integration.validate()?;
        match (self.generator, &self.analytic) {
            (GeneratorKind::Analytic, None) => Err(EmissionError::Config(
                "generator \"analytic\" requires an \"analytic\" section".to_string(),
            )),
            (GeneratorKind::Analytic, Some(analytic)) => analytic.validate(),
            (GeneratorKind::Simulated, _) => Ok(()),
        }
    }
}

impl ApparatusConfig {
    pub fn validate(&self) -> EmissionResult<()> {
        require_positive(self.tau_s, "tau_s")?;
        require_positive(self.num_electrons, "num_electrons")?;
        require_positive(self.work_function_ev, "work_function_ev")?;
        require_positive(self.photon_energy_ev, "photon_energy_ev")?;
        if self.photon_energy_ev <= self.work_function_ev {
            return Err(EmissionError::Domain(format!(
                "photon energy {} eV must exceed work function {} eV",
                self.photon_energy_ev, self.work_function_ev
            )));
        }
        if !self.dc_field_v_per_m.is_finite() || self.dc_field_v_per_m < 0.0 {
            return Err(EmissionError::Domain(format!(
                "dc_field_v_per_m must be finite and >= 0, got {}",
                self.dc_field_v_per_m
            )));
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> EmissionResult<()> {
        if self.num_space_bins == 0 {
            return Err(EmissionError::Domain(
                "num_space_bins must be >= 1".to_string(),
            ));
        }
        if self.num_time_slices == 0 {
            return Err(EmissionError::Domain(
                "num_time_slices must be >= 1".to_string(),
            ));
        }
        require_positive(self.num_taus, "num_taus")
    }
}

impl IntegrationConfig {
    pub fn validate(&self) -> EmissionResult<()> {
        if !self.eps_abs.is_finite() || self.eps_abs < 0.0 {
            return Err(EmissionError::Config(format!(
                "eps_abs must be finite and >= 0, got {}",
                self.eps_abs
            )));
        }
        if !self.eps_rel.is_finite() || self.eps_rel < 0.0 {
            return Err(EmissionError::Config(format!(
                "eps_rel must be finite and >= 0, got {}",
                self.eps_rel
            )));
        }
        if self.eps_abs == 0.0 && self.eps_rel == 0.0 {
            return Err(EmissionError::Config(
                "eps_abs and eps_rel cannot both be zero".to_string(),
            ));
        }
        if self.max_subdivisions == 0 {
            return Err(EmissionError::Config(
                "max_subdivisions must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl AnalyticConfig {
    pub fn validate(&self) -> EmissionResult<()> {
        require_positive(self.sigma_z, "analytic.sigma_z")?;
        if !self.eta_z.is_finite() || self.eta_z < 0.0 {
            return Err(EmissionError::Domain(format!(
                "analytic.eta_z must be finite and >= 0, got {}",
                self.eta_z
            )));
        }
        if !self.gamma_z.is_finite() {
            return Err(EmissionError::Domain(
                "analytic.gamma_z must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
