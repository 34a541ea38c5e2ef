// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Adaptive Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Globally adaptive Gauss-Kronrod quadrature.
//!
//! 21-point Kronrod rule with embedded 10-point Gauss rule, error estimate
//! and bisection strategy as in QUADPACK QAG (Piessens et al., 1983).
//! Matches `scipy.integrate.quad` on smooth integrands.
//!
//! The interval with the largest error estimate is bisected until the total
//! estimate satisfies err <= max(eps_abs, eps_rel * |result|) or the number
//! of sub-intervals reaches `max_subdivisions`.

use std::convert::Infallible;

/// Kronrod abscissae on [-1, 1], descending; xgk[1], xgk[3], .. are the
/// Gauss nodes.
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// Kronrod weights.
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_208_838_117_160,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// 10-point Gauss weights for the nodes xgk[1], xgk[3], .., xgk[9].
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    pub eps_abs: f64,
    pub eps_rel: f64,
    /// Upper bound on the number of sub-intervals (scipy's `limit`).
    pub max_subdivisions: usize,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            eps_abs: 1e-6,
            eps_rel: 0.0,
            max_subdivisions: 50,
        }
    }
}

impl QuadConfig {
    /// Error target for a given running estimate of the integral.
    pub fn tolerance(&self, result: f64) -> f64 {
        self.eps_abs.max(self.eps_rel * result.abs())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuadOutcome {
    pub converged: bool,
    pub value: f64,
    pub abs_error: f64,
    pub subdivisions: usize,
    pub evaluations: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    result: f64,
    error: f64,
}

/// Apply the 21-point rule on [a, b]. Returns (result, error estimate).
fn gauss_kronrod_21<F, E>(f: &mut F, a: f64, b: f64) -> Result<(f64, f64), E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let center = 0.5 * (a + b);
    let half_length = 0.5 * (b - a);
    let abs_half_length = half_length.abs();

    let fc = f(center)?;
    let mut res_gauss = 0.0;
    let mut res_kronrod = WGK[10] * fc;
    let mut res_abs = res_kronrod.abs();

    let mut fv1 = [0.0; 10];
    let mut fv2 = [0.0; 10];

    for j in 0..10 {
        let dx = half_length * XGK[j];
        let f1 = f(center - dx)?;
        let f2 = f(center + dx)?;
        fv1[j] = f1;
        fv2[j] = f2;
        let sum = f1 + f2;
        res_kronrod += WGK[j] * sum;
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_gauss += WG[j / 2] * sum;
        }
    }

    let mean = 0.5 * res_kronrod;
    let mut res_asc = WGK[10] * (fc - mean).abs();
    for j in 0..10 {
        res_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    let result = res_kronrod * half_length;
    res_abs *= abs_half_length;
    res_asc *= abs_half_length;

    let mut error = ((res_kronrod - res_gauss) * half_length).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }

    Ok((result, error))
}

/// Integrate a fallible integrand over [a, b].
///
/// The first error returned by `f` aborts the integration and is passed
/// through unchanged; non-convergence is reported via `converged = false`.
/// Reversed limits integrate over [b, a] and negate.
pub fn try_integrate<F, E>(mut f: F, a: f64, b: f64, config: QuadConfig) -> Result<QuadOutcome, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    if a == b {
        return Ok(QuadOutcome {
            converged: true,
            value: 0.0,
            abs_error: 0.0,
            subdivisions: 0,
            evaluations: 0,
        });
    }
    if a > b {
        let outcome = try_integrate(f, b, a, config)?;
        return Ok(QuadOutcome {
            value: -outcome.value,
            ..outcome
        });
    }

    let max_segments = config.max_subdivisions.max(1);
    let (result, error) = gauss_kronrod_21(&mut f, a, b)?;
    let mut segments = Vec::with_capacity(max_segments);
    segments.push(Segment {
        a,
        b,
        result,
        error,
    });
    let mut evaluations = 21usize;
    let mut total = result;
    let mut total_error = error;

    loop {
        if !total.is_finite() || !total_error.is_finite() {
            return Ok(QuadOutcome {
                converged: false,
                value: total,
                abs_error: total_error,
                subdivisions: segments.len(),
                evaluations,
            });
        }
        if total_error <= config.tolerance(total) {
            return Ok(QuadOutcome {
                converged: true,
                value: total,
                abs_error: total_error,
                subdivisions: segments.len(),
                evaluations,
            });
        }
        if segments.len() >= max_segments {
            return Ok(QuadOutcome {
                converged: false,
                value: total,
                abs_error: total_error,
                subdivisions: segments.len(),
                evaluations,
            });
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, s), (_, t)| s.error.total_cmp(&t.error))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let parent = segments.swap_remove(worst);
        let mid = 0.5 * (parent.a + parent.b);

        // Interval too narrow to split further in double precision.
        if mid <= parent.a || mid >= parent.b {
            segments.push(parent);
            return Ok(QuadOutcome {
                converged: false,
                value: total,
                abs_error: total_error,
                subdivisions: segments.len(),
                evaluations,
            });
        }

        let (left_result, left_error) = gauss_kronrod_21(&mut f, parent.a, mid)?;
        let (right_result, right_error) = gauss_kronrod_21(&mut f, mid, parent.b)?;
        evaluations += 42;

        total += left_result + right_result - parent.result;
        total_error += left_error + right_error - parent.error;
        segments.push(Segment {
            a: parent.a,
            b: mid,
            result: left_result,
            error: left_error,
        });
        segments.push(Segment {
            a: mid,
            b: parent.b,
            result: right_result,
            error: right_error,
        });

        // Re-sum periodically so the running totals do not drift.
        if segments.len() % 16 == 0 {
            total = segments.iter().map(|s| s.result).sum();
            total_error = segments.iter().map(|s| s.error).sum();
        }
    }
}

/// Integrate an infallible integrand over [a, b].
pub fn integrate<F>(mut f: F, a: f64, b: f64, config: QuadConfig) -> QuadOutcome
where
    F: FnMut(f64) -> f64,
{
    match try_integrate(|x| Ok::<f64, Infallible>(f(x)), a, b, config) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}
