// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Weighted Regression
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Weighted straight-line least squares.
//!
//! Weight convention matches `numpy.polyfit(x, y, 1, w=w)`: each weight
//! multiplies the unsquared residual, so the minimised quantity is
//! Σ (w_i · (y_i - slope·x_i - intercept))².

use ndarray::ArrayView1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of points with non-zero weight.
    pub points: usize,
}

impl LinearFit {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit y ≈ slope·x + intercept.
///
/// Returns `None` for mismatched lengths, fewer than two usable points,
/// non-finite input, or a degenerate design (all x equal).
pub fn weighted_linear_fit(
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    w: ArrayView1<f64>,
) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() != w.len() {
        return None;
    }

    let mut sum_w = 0.0;
    let mut sum_wx = 0.0;
    let mut sum_wy = 0.0;
    let mut points = 0usize;
    for ((&xi, &yi), &wi) in x.iter().zip(y.iter()).zip(w.iter()) {
        if !xi.is_finite() || !yi.is_finite() || !wi.is_finite() {
            return None;
        }
        let wsq = wi * wi;
        if wsq == 0.0 {
            continue;
        }
        sum_w += wsq;
        sum_wx += wsq * xi;
        sum_wy += wsq * yi;
        points += 1;
    }
    if points < 2 || sum_w <= 0.0 {
        return None;
    }

    let x_mean = sum_wx / sum_w;
    let y_mean = sum_wy / sum_w;

    // Centred sums avoid cancellation when x is far from the origin.
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for ((&xi, &yi), &wi) in x.iter().zip(y.iter()).zip(w.iter()) {
        let wsq = wi * wi;
        let dx = xi - x_mean;
        sxx += wsq * dx * dx;
        sxy += wsq * dx * (yi - y_mean);
    }
    if sxx.is_nan() || sxx <= 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return None;
    }

    Some(LinearFit {
        slope,
        intercept,
        points,
    })
}
