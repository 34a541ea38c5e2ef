// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Reports
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bin record CSV, human-readable summary, and pulse-parameter JSON.

use emission_types::error::EmissionResult;
use emission_types::state::{BinRecord, PulseParameters, ResultSummary};
use std::io::Write;

/// Column names of the per-bin record stream, in order.
pub const BIN_RECORD_HEADER: [&str; 4] = [
    "bin position",
    "number of electrons",
    "bin average momentum",
    "bin momentum uncertainty",
];

/// Write `records` as CSV with [`BIN_RECORD_HEADER`] as the first row.
/// Header fields are quoted, numeric fields are not.
pub fn write_bin_records<W: Write>(writer: W, records: &[BinRecord]) -> EmissionResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(writer);
    csv_writer.write_record(BIN_RECORD_HEADER)?;
    for record in records {
        csv_writer.serialize((
            record.position,
            record.total_count,
            record.avg_momentum,
            record.momentum_uncertainty,
        ))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Fitted density and momentum profiles as text.
pub fn render_summary(summary: &ResultSummary) -> String {
    format!(
        "density(x)  ~ {:.6e} * exp(-(x - {:.6e})^2 / (2 * {:.6e}))\n\
         momentum(x) ~ {:.6e} * x + {:.6e}\n\
         sigma = {:.6e} m^2, eta = {:.6e}, gamma = {:.6e}\n\
         peak: x = {:.6e} m, v = {:.6e} m/s\n",
        summary.sigma_coeff,
        summary.x_peak,
        summary.sigma,
        summary.gamma / summary.sigma,
        summary.gamma_offset,
        summary.sigma,
        summary.eta,
        summary.gamma,
        summary.x_peak,
        summary.v_peak,
    )
}

/// Pretty-printed JSON of the pulse parameters. Flushes `writer` so a
/// buffered write error surfaces here.
pub fn write_summary_json<W: Write>(
    mut writer: W,
    parameters: &PulseParameters,
) -> EmissionResult<()> {
    serde_json::to_writer_pretty(&mut writer, parameters)?;
    writer.flush()?;
    Ok(())
}
