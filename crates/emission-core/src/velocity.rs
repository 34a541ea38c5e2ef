// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Velocity Distribution
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Emission velocity distribution along the cathode normal.
//!
//! Physical model: an electron with speed v moving at angle θ to the normal
//! escapes with probability T(m·v·cosθ/ħ). Averaging over the hemisphere
//! and integrating over speed gives the (unnormalised) CDF
//!   F(v₁, v₂) = ∫_{v₁}^{v₂} ∫_0^{π/2} T(m·v·cosθ/ħ)·sinθ dθ dv
//! and the fraction of electrons in [v₁, v₂] is F(v₁, v₂)/F(0, vmax).
//!
//! Simplified model: closed form (v₂/vmax)⁵ − (v₁/vmax)⁵, used as a cheap
//! cross-check of the deposition scheme.

use crate::apparatus::ApparatusParameters;
use crate::transmission::transmission;
use emission_math::quadrature::{try_integrate, QuadConfig, QuadOutcome};
use emission_types::config::IntegrationConfig;
use emission_types::constants::{HBAR, M_ELECTRON, PI};
use emission_types::error::{EmissionError, EmissionResult};
use log::debug;

fn quad_config(config: IntegrationConfig) -> QuadConfig {
    QuadConfig {
        eps_abs: config.eps_abs,
        eps_rel: config.eps_rel,
        max_subdivisions: config.max_subdivisions,
    }
}

fn require_converged(
    outcome: QuadOutcome,
    config: QuadConfig,
    lower: f64,
    upper: f64,
) -> EmissionResult<f64> {
    if !outcome.converged {
        return Err(EmissionError::Integration {
            eps_abs: config.eps_abs,
            eps_rel: config.eps_rel,
            achieved: outcome.abs_error,
            lower,
            upper,
            subdivisions: outcome.subdivisions,
        });
    }
    Ok(outcome.value)
}

/// Nested angle/speed integrator with the normalisation computed at setup.
#[derive(Debug, Clone, Copy)]
pub struct VelocityIntegrator {
    barrier_wavevector: f64,
    max_velocity: f64,
    quad: QuadConfig,
    vnorm: f64,
}

impl VelocityIntegrator {
    /// Builds the integrator and evaluates vnorm = F(0, vmax).
    pub fn new(apparatus: &ApparatusParameters, config: IntegrationConfig) -> EmissionResult<Self> {
        config.validate()?;
        let mut integrator = VelocityIntegrator {
            barrier_wavevector: apparatus.barrier_wavevector(),
            max_velocity: apparatus.max_velocity(),
            quad: quad_config(config),
            vnorm: 1.0,
        };
        let vnorm = integrator.velocity_integral(0.0, integrator.max_velocity)?;
        if !vnorm.is_finite() || vnorm <= 0.0 {
            return Err(EmissionError::Domain(format!(
                "velocity normalisation must be finite and > 0, got {vnorm}"
            )));
        }
        integrator.vnorm = vnorm;
        debug!(
            "velocity integrator: vmax={:.6e} m/s, kV={:.6e} 1/m, vnorm={:.6e}",
            integrator.max_velocity, integrator.barrier_wavevector, vnorm
        );
        Ok(integrator)
    }

    /// Hemisphere-averaged transmission ∫_0^{π/2} T(m·v·cosθ/ħ)·sinθ dθ.
    pub fn theta_integral(&self, v: f64) -> EmissionResult<f64> {
        if v == 0.0 {
            return Ok(0.0);
        }
        let k = M_ELECTRON * v / HBAR;
        let kv = self.barrier_wavevector;
        let outcome = try_integrate(
            |theta: f64| Ok::<f64, EmissionError>(transmission(k * theta.cos().max(0.0), kv) * theta.sin()),
            0.0,
            PI / 2.0,
            self.quad,
        )?;
        require_converged(outcome, self.quad, 0.0, PI / 2.0)
    }

    /// ∫_{v_low}^{v_high} theta_integral(v) dv. Requires v_low <= v_high.
    pub fn velocity_integral(&self, v_low: f64, v_high: f64) -> EmissionResult<f64> {
        if !v_low.is_finite() || !v_high.is_finite() || v_low > v_high {
            return Err(EmissionError::Domain(format!(
                "velocity window must satisfy v_low <= v_high, got [{v_low}, {v_high}]"
            )));
        }
        let outcome = try_integrate(|v| self.theta_integral(v), v_low, v_high, self.quad)?;
        require_converged(outcome, self.quad, v_low, v_high)
    }

    /// Fraction of emitted electrons with velocity in [v_low, v_high].
    pub fn normalized_fraction(&self, v_low: f64, v_high: f64) -> EmissionResult<f64> {
        Ok(self.velocity_integral(v_low, v_high)? / self.vnorm)
    }

    pub fn vnorm(&self) -> f64 {
        self.vnorm
    }

    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }
}

/// Closed-form (v₂/vmax)⁵ − (v₁/vmax)⁵.
pub fn simple_fraction(v_low: f64, v_high: f64, max_velocity: f64) -> f64 {
    (v_high / max_velocity).powi(5) - (v_low / max_velocity).powi(5)
}

/// Velocity-window model selected by configuration.
#[derive(Debug, Clone, Copy)]
pub enum VelocityModel {
    Physical(VelocityIntegrator),
    Simplified { max_velocity: f64 },
}

impl VelocityModel {
    pub fn new(
        apparatus: &ApparatusParameters,
        simple_mode: bool,
        config: IntegrationConfig,
    ) -> EmissionResult<Self> {
        if simple_mode {
            Ok(VelocityModel::Simplified {
                max_velocity: apparatus.max_velocity(),
            })
        } else {
            Ok(VelocityModel::Physical(VelocityIntegrator::new(apparatus, config)?))
        }
    }

    /// Fraction of emitted electrons with velocity in [v_low, v_high].
    pub fn fraction(&self, v_low: f64, v_high: f64) -> EmissionResult<f64> {
        match self {
            VelocityModel::Physical(integrator) => integrator.normalized_fraction(v_low, v_high),
            VelocityModel::Simplified { max_velocity } => {
                Ok(simple_fraction(v_low, v_high, *max_velocity))
            }
        }
    }

    /// Normalisation constant; `None` in simplified mode.
    pub fn vnorm(&self) -> Option<f64> {
        match self {
            VelocityModel::Physical(integrator) => Some(integrator.vnorm()),
            VelocityModel::Simplified { .. } => None,
        }
    }

    pub fn is_simplified(&self) -> bool {
        matches!(self, VelocityModel::Simplified { .. })
    }
}
