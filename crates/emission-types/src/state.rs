// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Serialize};

/// Aggregate of every slice deposited in one spatial bin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BinResult {
    pub total_count: f64,
    /// Count-weighted mean momentum (kg m/s).
    pub avg_momentum: f64,
    /// Count-weighted momentum standard deviation (kg m/s).
    pub momentum_uncertainty: f64,
}

/// One row of the per-bin output stream.
/// Field names serialize to the column headers used by the CSV report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    #[serde(rename = "bin position")]
    pub position: f64,
    #[serde(rename = "number of electrons")]
    pub total_count: f64,
    #[serde(rename = "bin average momentum")]
    pub avg_momentum: f64,
    #[serde(rename = "bin momentum uncertainty")]
    pub momentum_uncertainty: f64,
}

/// Pulse-shape parameters extracted from the simulated histogram.
///
/// density(x)  ≈ sigma_coeff · exp(-(x - x_peak)² / (2·sigma))
/// momentum(x) ≈ (gamma / sigma) · x + gamma_offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    /// Longitudinal variance (m^2).
    pub sigma: f64,
    /// Peak electrons per bin of the fitted Gaussian.
    pub sigma_coeff: f64,
    /// Mean squared momentum spread in the fit window ((kg m/s)^2).
    pub eta: f64,
    pub gamma: f64,
    pub gamma_offset: f64,
    /// End of the most populated bin (m).
    pub x_peak: f64,
    /// Mean velocity in the most populated bin (m/s).
    pub v_peak: f64,
}

/// AG model parameters handed to a propagation simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgParameters {
    pub num_electrons: f64,
    /// Longitudinal variance (m^2).
    pub sigma_z: f64,
    pub eta_z: f64,
    pub gamma_z: f64,
}

/// Everything a host propagation run needs from pulse generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseParameters {
    pub ag: AgParameters,
    /// Time (s) the host must add to its clock origin: the simulated
    /// emission window `num_taus · tau`, zero for analytic pulses.
    pub emission_time_offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ResultSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_result_default_is_zero() {
        let r = BinResult::default();
        assert_eq!(r.total_count, 0.0);
        assert_eq!(r.avg_momentum, 0.0);
        assert_eq!(r.momentum_uncertainty, 0.0);
    }

    #[test]
    fn test_bin_record_column_names() {
        let record = BinRecord {
            position: 1e-9,
            total_count: 12.0,
            avg_momentum: 3e-25,
            momentum_uncertainty: 1e-26,
        };
        let json = serde_json::to_value(record).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("bin position"));
        assert!(obj.contains_key("number of electrons"));
        assert!(obj.contains_key("bin average momentum"));
        assert!(obj.contains_key("bin momentum uncertainty"));
    }

    #[test]
    fn test_pulse_parameters_omit_missing_summary() {
        let params = PulseParameters {
            ag: AgParameters {
                num_electrons: 1e6,
                sigma_z: 1e-14,
                eta_z: 0.0,
                gamma_z: 0.0,
            },
            emission_time_offset: 0.0,
            summary: None,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(!json.contains("summary"));
        let back: PulseParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
