// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Result Processor
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! AG-model parameter extraction from a filled bin histogram.
//!
//! Positions are bin far edges throughout. The spread is the second central
//! moment of position normalised by the emitted electron count; the
//! momentum-position correlation comes from a weighted straight-line fit of
//! bin mean momentum against position inside ±√(2σ) of the peak.

use crate::bins::Bin;
use emission_math::regression::weighted_linear_fit;
use emission_types::constants::{M_ELECTRON, PI};
use emission_types::error::{EmissionError, EmissionResult};
use emission_types::state::ResultSummary;
use log::{debug, warn};
use ndarray::Array1;

/// Output of the windowed momentum fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOutcome {
    pub slope: f64,
    pub intercept: f64,
    /// Count-weighted mean squared momentum uncertainty over the window.
    pub eta: f64,
    /// Populated bins that entered the regression.
    pub window_bins: usize,
    pub lower: f64,
    pub upper: f64,
}

/// Scan `bins` in spatial order and derive the pulse summary.
///
/// `num_electrons` normalises the position moments; `bin_width` scales the
/// Gaussian density amplitude.
pub fn process_bins(
    bins: &mut [Bin],
    num_electrons: f64,
    bin_width: f64,
) -> EmissionResult<ResultSummary> {
    let mut max_count = 0.0;
    let mut peak = None;
    let mut sum_x = 0.0;
    let mut sum_x2 = 0.0;
    let mut total = 0.0;

    for bin in bins.iter_mut() {
        let result = bin.result();
        let x = bin.position();
        if result.total_count > max_count {
            max_count = result.total_count;
            peak = Some((x, result.avg_momentum / M_ELECTRON));
        }
        sum_x += result.total_count * x;
        sum_x2 += result.total_count * x * x;
        total += result.total_count;
    }

    let Some((x_peak, v_peak)) = peak else {
        return Err(EmissionError::InsufficientData { bins: 0 });
    };

    let mean = sum_x / num_electrons;
    let sigma = sum_x2 / num_electrons - mean * mean;
    debug!(
        "histogram: total={:.6e}, peak count={:.6e} at x={:.6e} m, sigma={:.6e} m^2",
        total, max_count, x_peak, sigma
    );

    let fit = fit_routine(bins, x_peak, sigma, max_count)?;
    let sigma_coeff = total * bin_width / (2.0 * PI * sigma).sqrt();

    Ok(ResultSummary {
        sigma,
        sigma_coeff,
        eta: fit.eta,
        gamma: sigma * fit.slope,
        gamma_offset: fit.intercept,
        x_peak,
        v_peak,
    })
}

/// Weighted fit of mean momentum against position over the bins lying
/// wholly inside [x_peak − √(2σ), x_peak + √(2σ)].
///
/// Weights are (count/max_count)^(−1/2). Zero-count bins carry no momentum
/// and are skipped; fewer than two populated bins is `InsufficientData`.
pub fn fit_routine(
    bins: &mut [Bin],
    x_peak: f64,
    sigma: f64,
    max_count: f64,
) -> EmissionResult<FitOutcome> {
    let half_width = if sigma > 0.0 { (2.0 * sigma).sqrt() } else { 0.0 };
    let lower = x_peak - half_width;
    let upper = x_peak + half_width;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut ws = Vec::new();
    let mut window_count = 0.0;
    let mut uncertainty_moment = 0.0;
    let mut empty = 0usize;

    for bin in bins.iter_mut() {
        if bin.begin() < lower || bin.end() > upper {
            continue;
        }
        let result = bin.result();
        if result.total_count <= 0.0 {
            empty += 1;
            continue;
        }
        xs.push(bin.position());
        ys.push(result.avg_momentum);
        ws.push((result.total_count / max_count).powf(-0.5));
        window_count += result.total_count;
        uncertainty_moment += result.total_count * result.momentum_uncertainty.powi(2);
    }

    if empty > 0 {
        warn!(
            "{} empty bins inside fit window [{:.6e}, {:.6e}] m excluded",
            empty, lower, upper
        );
    }
    let window_bins = xs.len();
    if window_bins < 2 {
        return Err(EmissionError::InsufficientData { bins: window_bins });
    }

    let x = Array1::from(xs);
    let y = Array1::from(ys);
    let w = Array1::from(ws);
    let line = weighted_linear_fit(x.view(), y.view(), w.view())
        .ok_or(EmissionError::InsufficientData { bins: window_bins })?;

    debug!(
        "fit window [{:.6e}, {:.6e}] m: {} bins, slope={:.6e}, intercept={:.6e}",
        lower, upper, window_bins, line.slope, line.intercept
    );

    Ok(FitOutcome {
        slope: line.slope,
        intercept: line.intercept,
        eta: uncertainty_moment / window_count,
        window_bins,
        lower,
        upper,
    })
}
