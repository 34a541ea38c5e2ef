// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Spatial Bins
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Spatial histogram bin accumulating time-slice deposits.

use emission_types::constants::M_ELECTRON;
use emission_types::state::{BinRecord, BinResult};

/// Electrons from one time slice landing in one bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slice {
    count: f64,
    avg_velocity: f64,
}

impl Slice {
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Mean arrival velocity across the bin (m/s).
    pub fn avg_velocity(&self) -> f64 {
        self.avg_velocity
    }
}

/// Position interval [begin, end) with a memoised aggregate.
#[derive(Debug, Clone)]
pub struct Bin {
    begin: f64,
    end: f64,
    slices: Vec<Slice>,
    cached: Option<BinResult>,
}

impl Bin {
    pub fn new(begin: f64, end: f64) -> Self {
        debug_assert!(begin < end, "bin requires begin < end, got [{begin}, {end})");
        Bin {
            begin,
            end,
            slices: Vec::new(),
            cached: None,
        }
    }

    /// Record `count` electrons arriving with velocities spanning
    /// [v_begin, v_end] across the bin. Invalidates the cached result.
    pub fn add_slice(&mut self, count: f64, v_begin: f64, v_end: f64) {
        debug_assert!(count >= 0.0, "slice count must be >= 0, got {count}");
        self.slices.push(Slice {
            count,
            avg_velocity: 0.5 * (v_begin + v_end),
        });
        self.cached = None;
    }

    /// Aggregate over all slices, recomputed only after an `add_slice`.
    ///
    /// An empty or zero-count bin yields {0, 0, 0}.
    pub fn result(&mut self) -> BinResult {
        if let Some(cached) = self.cached {
            return cached;
        }
        let result = self.compute();
        self.cached = Some(result);
        result
    }

    fn compute(&self) -> BinResult {
        let mut total = 0.0;
        let mut first_moment = 0.0;
        let mut second_moment = 0.0;
        for slice in &self.slices {
            total += slice.count;
            first_moment += slice.count * slice.avg_velocity;
            second_moment += slice.count * slice.avg_velocity * slice.avg_velocity;
        }
        if total <= 0.0 {
            return BinResult::default();
        }

        let avg_momentum = M_ELECTRON * first_moment / total;
        let mean_sq_momentum = M_ELECTRON * M_ELECTRON * second_moment / total;
        // abs() absorbs roundoff when every slice has the same velocity.
        let momentum_uncertainty = (mean_sq_momentum - avg_momentum * avg_momentum).abs().sqrt();

        BinResult {
            total_count: total,
            avg_momentum,
            momentum_uncertainty,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn begin(&self) -> f64 {
        self.begin
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn width(&self) -> f64 {
        self.end - self.begin
    }

    /// Reported bin position: the far edge.
    pub fn position(&self) -> f64 {
        self.end
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn record(&mut self) -> BinRecord {
        let result = self.result();
        BinRecord {
            position: self.position(),
            total_count: result.total_count,
            avg_momentum: result.avg_momentum,
            momentum_uncertainty: result.momentum_uncertainty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bin_is_zero_not_nan() {
        let mut bin = Bin::new(0.0, 1e-9);
        let r = bin.result();
        assert_eq!(r, BinResult::default());
        assert!(!r.avg_momentum.is_nan());
        assert!(!r.momentum_uncertainty.is_nan());
    }

    #[test]
    fn test_zero_count_slices_are_zero_not_nan() {
        let mut bin = Bin::new(0.0, 1e-9);
        bin.add_slice(0.0, 1e5, 2e5);
        bin.add_slice(0.0, 3e5, 4e5);
        assert_eq!(bin.result(), BinResult::default());
    }

    #[test]
    fn test_single_slice_has_no_spread() {
        let mut bin = Bin::new(0.0, 1e-9);
        bin.add_slice(10.0, 1e5, 3e5);
        let r = bin.result();
        assert_eq!(r.total_count, 10.0);
        assert!((r.avg_momentum - M_ELECTRON * 2e5).abs() < 1e-12 * M_ELECTRON * 2e5);
        assert!(r.momentum_uncertainty < 1e-6 * r.avg_momentum);
    }

    #[test]
    fn test_two_slices_mean_and_spread() {
        let mut bin = Bin::new(0.0, 1e-9);
        bin.add_slice(1.0, 1e5, 1e5);
        bin.add_slice(3.0, 3e5, 3e5);
        let r = bin.result();
        // mean v = (1e5 + 9e5)/4 = 2.5e5; var = (1e10 + 27e10)/4 - 6.25e10 = 0.75e10
        let expected_mean = M_ELECTRON * 2.5e5;
        let expected_std = M_ELECTRON * (0.75e10_f64).sqrt();
        assert!(((r.avg_momentum - expected_mean) / expected_mean).abs() < 1e-12);
        assert!(((r.momentum_uncertainty - expected_std) / expected_std).abs() < 1e-9);
    }

    #[test]
    fn test_cache_is_stable_and_invalidated() {
        let mut bin = Bin::new(0.0, 1e-9);
        bin.add_slice(5.0, 1e5, 2e5);
        assert!(!bin.is_cached());
        let first = bin.result();
        assert!(bin.is_cached());
        let second = bin.result();
        assert_eq!(first, second);

        bin.add_slice(5.0, 3e5, 4e5);
        assert!(!bin.is_cached());
        let third = bin.result();
        assert_ne!(first, third);
        assert_eq!(third.total_count, 10.0);
    }

    #[test]
    fn test_record_uses_bin_end_as_position() {
        let mut bin = Bin::new(2e-9, 3e-9);
        bin.add_slice(4.0, 1e5, 1e5);
        let rec = bin.record();
        assert_eq!(rec.position, 3e-9);
        assert_eq!(rec.total_count, 4.0);
        assert!((bin.width() - 1e-9).abs() < 1e-24);
        assert_eq!(bin.slices().len(), 1);
        assert_eq!(bin.slices()[0].count(), 4.0);
        assert_eq!(bin.slices()[0].avg_velocity(), 1e5);
    }
}
