// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Pulse Generators
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sources of AG-model parameters for a host propagation run.
//!
//! The analytic generator passes user parameters through unchanged; the
//! simulated generator derives them from a full photoemission run.

use crate::apparatus::ApparatusParameters;
use crate::engine::PulseSimulation;
use emission_types::config::{GeneratorKind, IntegrationConfig, PulseConfig, SimulationConfig};
use emission_types::error::{EmissionError, EmissionResult};
use emission_types::state::{AgParameters, BinRecord, PulseParameters};
use log::info;

/// Parameters plus, for simulated pulses, the per-bin record stream.
#[derive(Debug, Clone)]
pub struct GeneratedPulse {
    pub parameters: PulseParameters,
    pub records: Vec<BinRecord>,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalyticPulseGenerator {
    ag: AgParameters,
}

impl AnalyticPulseGenerator {
    pub fn new(ag: AgParameters) -> EmissionResult<Self> {
        if !ag.num_electrons.is_finite() || ag.num_electrons <= 0.0 {
            return Err(EmissionError::Domain(format!(
                "num_electrons must be finite and > 0, got {}",
                ag.num_electrons
            )));
        }
        if !ag.sigma_z.is_finite() || ag.sigma_z <= 0.0 {
            return Err(EmissionError::Domain(format!(
                "sigma_z must be finite and > 0, got {}",
                ag.sigma_z
            )));
        }
        if !ag.eta_z.is_finite() || !ag.gamma_z.is_finite() {
            return Err(EmissionError::Domain(
                "eta_z and gamma_z must be finite".into(),
            ));
        }
        Ok(AnalyticPulseGenerator { ag })
    }

    pub fn generate(&self) -> PulseParameters {
        PulseParameters {
            ag: self.ag,
            emission_time_offset: 0.0,
            summary: None,
        }
    }
}

/// Runs simulate → process on a fresh engine per call.
#[derive(Debug, Clone)]
pub struct SimulatedPulseGenerator {
    apparatus: ApparatusParameters,
    settings: SimulationConfig,
    integration: IntegrationConfig,
}

impl SimulatedPulseGenerator {
    pub fn new(
        apparatus: ApparatusParameters,
        settings: SimulationConfig,
        integration: IntegrationConfig,
    ) -> EmissionResult<Self> {
        settings.validate()?;
        integration.validate()?;
        Ok(SimulatedPulseGenerator {
            apparatus,
            settings,
            integration,
        })
    }

    pub fn generate_with_progress<F>(&self, on_slice: F) -> EmissionResult<GeneratedPulse>
    where
        F: FnMut(usize, usize),
    {
        let mut simulation =
            PulseSimulation::new(self.apparatus, self.settings.clone(), self.integration)?;
        simulation.simulate_with_progress(on_slice)?;
        let summary = simulation.process()?;
        let records = simulation.records()?;

        let parameters = PulseParameters {
            ag: AgParameters {
                num_electrons: self.apparatus.num_electrons(),
                sigma_z: summary.sigma,
                eta_z: summary.eta,
                gamma_z: summary.gamma,
            },
            emission_time_offset: simulation.emission_time_offset(),
            summary: Some(summary),
        };
        Ok(GeneratedPulse {
            parameters,
            records,
        })
    }

    pub fn generate(&self) -> EmissionResult<PulseParameters> {
        Ok(self.generate_with_progress(|_, _| {})?.parameters)
    }
}

/// Generator variant selected by configuration.
#[derive(Debug, Clone)]
pub enum PulseGenerator {
    Analytic(AnalyticPulseGenerator),
    Simulated(SimulatedPulseGenerator),
}

impl PulseGenerator {
    pub fn from_config(config: &PulseConfig) -> EmissionResult<Self> {
        config.validate()?;
        let apparatus = ApparatusParameters::from_config(&config.apparatus)?;
        match config.generator {
            GeneratorKind::Analytic => {
                let analytic = config.analytic.ok_or_else(|| {
                    EmissionError::Config("generator \"analytic\" needs an [analytic] section".into())
                })?;
                let generator = AnalyticPulseGenerator::new(AgParameters {
                    num_electrons: apparatus.num_electrons(),
                    sigma_z: analytic.sigma_z,
                    eta_z: analytic.eta_z,
                    gamma_z: analytic.gamma_z,
                })?;
                Ok(PulseGenerator::Analytic(generator))
            }
            GeneratorKind::Simulated => Ok(PulseGenerator::Simulated(SimulatedPulseGenerator::new(
                apparatus,
                config.simulation.clone(),
                config.integration,
            )?)),
        }
    }

    pub fn generate(&self) -> EmissionResult<PulseParameters> {
        Ok(self.generate_with_progress(|_, _| {})?.parameters)
    }

    /// `on_slice` is only invoked by the simulated variant.
    pub fn generate_with_progress<F>(&self, on_slice: F) -> EmissionResult<GeneratedPulse>
    where
        F: FnMut(usize, usize),
    {
        let pulse = match self {
            PulseGenerator::Analytic(generator) => GeneratedPulse {
                parameters: generator.generate(),
                records: Vec::new(),
            },
            PulseGenerator::Simulated(generator) => generator.generate_with_progress(on_slice)?,
        };
        info!(
            "{} pulse: sigma_z={:.4e} m^2, eta_z={:.4e}, gamma_z={:.4e}, offset={:.4e} s",
            self.kind_name(),
            pulse.parameters.ag.sigma_z,
            pulse.parameters.ag.eta_z,
            pulse.parameters.ag.gamma_z,
            pulse.parameters.emission_time_offset
        );
        Ok(pulse)
    }

    /// Number of time slices the run will report through `on_slice`.
    pub fn num_time_slices(&self) -> usize {
        match self {
            PulseGenerator::Analytic(_) => 0,
            PulseGenerator::Simulated(generator) => generator.settings.num_time_slices,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PulseGenerator::Analytic(_) => "analytic",
            PulseGenerator::Simulated(_) => "simulated",
        }
    }
}
