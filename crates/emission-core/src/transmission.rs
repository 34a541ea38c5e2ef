// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Transmission
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Quantum transmission across the surface potential step.
//!
//! An electron with normal wavevector kz inside the metal sees a step of
//! height set by kV. With s = √(kV² + kz²):
//!   T(kz) = 4·s·kz / (s + kz)²
//! T rises monotonically from 0 at kz → 0⁺ to 1 as kz → ∞.

/// Transmission probability for normal wavevector `kz` (1/m) against
/// barrier wavevector `kv` (1/m).
///
/// Evaluates to exactly 0 at kz = 0 for kv > 0.
pub fn transmission(kz: f64, kv: f64) -> f64 {
    debug_assert!(kz >= 0.0, "transmission requires kz >= 0, got {kz}");
    let s = kv.hypot(kz);
    let denom = s + kz;
    4.0 * s * kz / (denom * denom)
}
