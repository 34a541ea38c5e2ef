// ─────────────────────────────────────────────────────────────────────
// SCPN Photoemission — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `photoemission-sim`: run a pulse generator and write its reports.
//!
//! Order is fixed: simulate, process, then write the bin records, the
//! summary text, and the optional parameter JSON.

use anyhow::{Context, Result};
use clap::Parser;
use emission_core::generator::PulseGenerator;
use emission_core::report::{render_summary, write_bin_records, write_summary_json};
use emission_types::config::PulseConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "photoemission-sim")]
#[command(version = VERSION)]
#[command(about = "Time-sliced photoemission pulse simulation with AG-model fit", long_about = None)]
struct Args {
    /// Pulse configuration JSON; built-in reference values when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Per-bin CSV output path
    #[arg(short, long, default_value = "emission_bins.csv")]
    output: String,

    /// Write pulse parameters as JSON to this path
    #[arg(short, long)]
    summary: Option<String>,

    /// Use the closed-form (v/vmax)^5 velocity model
    #[arg(long)]
    simple: bool,

    /// Override the number of spatial bins
    #[arg(long)]
    bins: Option<usize>,

    /// Override the number of time slices
    #[arg(long)]
    slices: Option<usize>,

    /// Sweep bins on a single thread
    #[arg(long)]
    sequential: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<PulseConfig> {
    let mut config = match &args.config {
        Some(path) => PulseConfig::from_file(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => PulseConfig::default(),
    };
    if args.simple {
        config.simulation.simple_mode = true;
    }
    if let Some(bins) = args.bins {
        config.simulation.num_space_bins = bins;
    }
    if let Some(slices) = args.slices {
        config.simulation.num_time_slices = slices;
    }
    if args.sequential {
        config.simulation.parallel = false;
    }
    config.validate().context("invalid configuration after overrides")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("photoemission-sim {} - starting", VERSION);
    let config = load_config(&args)?;
    let generator = PulseGenerator::from_config(&config)?;

    let progress = ProgressBar::new(generator.num_time_slices() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{bar:40.cyan/blue} {pos}/{len} slices ({eta})")?
            .progress_chars("##-"),
    );
    progress.set_message(format!("{} pulse", generator.kind_name()));

    let pulse = generator
        .generate_with_progress(|done, _| progress.set_position(done as u64))
        .context("pulse generation failed")?;
    progress.finish_and_clear();

    if pulse.records.is_empty() {
        log::info!("analytic pulse: no bin records to write");
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output))?;
        write_bin_records(BufWriter::new(file), &pulse.records)?;
        log::info!("wrote {} bin records to {}", pulse.records.len(), args.output);
    }

    if let Some(summary) = &pulse.parameters.summary {
        print!("{}", render_summary(summary));
    }
    println!(
        "AG parameters: N={:.4e}, sigma_z={:.6e} m^2, eta_z={:.6e}, gamma_z={:.6e}",
        pulse.parameters.ag.num_electrons,
        pulse.parameters.ag.sigma_z,
        pulse.parameters.ag.eta_z,
        pulse.parameters.ag.gamma_z
    );
    println!(
        "emission time offset: {:.6e} s",
        pulse.parameters.emission_time_offset
    );

    if let Some(path) = &args.summary {
        let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
        write_summary_json(BufWriter::new(file), &pulse.parameters)?;
        log::info!("wrote pulse parameters to {path}");
    }

    Ok(())
}
