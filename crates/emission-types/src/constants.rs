// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Electron rest mass (kg), CODATA 2018.
pub const M_ELECTRON: f64 = 9.109_383_701_5e-31;

/// Elementary charge (C). Also the J/eV conversion factor.
pub const Q_ELECTRON: f64 = 1.602_176_634e-19;

/// Reduced Planck constant (J s).
pub const HBAR: f64 = 1.054_571_817e-34;

/// Re-exported so physics modules pull every constant from one place.
pub const PI: f64 = std::f64::consts::PI;
