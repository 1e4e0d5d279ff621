//! Debug script to dump band colors across the record as ASCII

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use zonal_report::bands::band_colors;
use zonal_report::colormap::Colormap;
use zonal_report::logging;
use zonal_report::ObservationTable;

#[derive(Parser, Debug)]
#[command(about = "Print accumulated band values every few years")]
struct Args {
    #[arg(short, long)]
    input: PathBuf,

    /// Years between printed rows
    #[arg(short, long, default_value_t = 10)]
    step: usize,
}

/// One character per normalized value: cold ' . : - = + * # %' warm
fn shade(norm: f64) -> char {
    const RAMP: &[u8] = b" .:-=+*#%@";
    let i = (norm.clamp(0.0, 1.0) * (RAMP.len() - 1) as f64).round() as usize;
    RAMP[i] as char
}

fn main() -> Result<()> {
    logging::init_stderr("warn");
    let args = Args::parse();

    let table = ObservationTable::load(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let cmap = Colormap::balance();
    let (first, last) = table.year_range();

    println!("=== BAND DEBUG {}..{} every {} years ===", first, last, args.step);
    println!("Bands north to south, '?' marks a missing value");
    println!();

    for &year in table.years().iter().step_by(args.step.max(1)) {
        let bands = band_colors(&table, year, &cmap);
        let ramp: String = bands
            .iter()
            .map(|b| if b.missing { '?' } else { shade(b.norm) })
            .collect();
        let values: Vec<String> = bands
            .iter()
            .map(|b| if b.missing { "   ---".to_string() } else { format!("{:>+6.2}", b.value) })
            .collect();
        println!("{} |{}| {}", year, ramp, values.join(" "));
    }

    // Stats
    let last_bands = band_colors(&table, last, &cmap);
    let missing = last_bands.iter().filter(|b| b.missing).count();
    println!();
    println!("Last year {}: {} of {} bands missing", last, missing, last_bands.len());
    if let Some(warmest) = last_bands
        .iter()
        .filter(|b| !b.missing)
        .max_by(|a, b| a.value.total_cmp(&b.value))
    {
        println!("Warmest band: {} ({:+.2})", warmest.zone.label(), warmest.value);
    }
    Ok(())
}
