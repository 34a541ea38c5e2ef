//! Numerical primitives for SCPN Photoemission.

pub mod quadrature;
pub mod regression;
