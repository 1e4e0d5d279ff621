use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use tracing::{info, warn};

use zonal_report::bands::band_colors;
use zonal_report::charts::PlotFormat;
use zonal_report::colormap::Colormap;
use zonal_report::config::ReportConfig;
use zonal_report::selection::parse_column_list;
use zonal_report::summary::BandSummary;
use zonal_report::{explorer, logging, report, ColumnKey, ObservationTable, SeriesKind};

#[derive(Parser, Debug)]
#[command(name = "zonal_report")]
#[command(about = "Charts and latitude band maps of zonal annual temperature anomalies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every chart, the band map and a JSON summary
    Render(RenderArgs),
    /// Browse the report interactively in the terminal
    Explore(ExploreArgs),
    /// Print accumulated temperature per latitude band for one year
    Bands(BandsArgs),
    /// Print the first rows of the raw, diff and accum columns
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Zonal annual means CSV (e.g. ZonAnn.Ts+dSST.csv)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output directory (overrides config)
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    out: Option<PathBuf>,

    /// Image format (overrides config)
    #[arg(long, value_enum)]
    format: Option<PlotFormat>,

    /// Year shown on the band map, clamped to the data's range
    #[arg(short, long)]
    year: Option<i32>,

    /// Zones for the trend comparison, comma separated (empty to skip)
    #[arg(long)]
    zones: Option<String>,

    /// Zone for the single trend chart
    #[arg(long)]
    solo: Option<String>,

    /// Columns for the growth comparison, e.g. 64N-90N_diff,90S-64S_diff
    #[arg(long)]
    growth: Option<String>,

    /// JSON config file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Also write the bare band overlay PNG
    #[arg(long)]
    overlay: bool,
}

#[derive(Parser, Debug)]
struct ExploreArgs {
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// JSON config file
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Write logs to this file while the explorer runs
    #[arg(long, value_hint = ValueHint::FilePath)]
    log_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BandsArgs {
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    #[arg(short, long)]
    year: i32,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Number of rows per table
    #[arg(short, long, default_value_t = 5)]
    rows: usize,
}

fn load_config(path: Option<&PathBuf>) -> Result<ReportConfig> {
    match path {
        Some(p) => ReportConfig::load(p).with_context(|| format!("failed to read config {}", p.display())),
        None => Ok(ReportConfig::default()),
    }
}

fn load_table(path: &PathBuf) -> Result<ObservationTable> {
    ObservationTable::load(path).with_context(|| format!("failed to load {}", path.display()))
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    if let Some(format) = args.format {
        config.format = format;
    }
    if args.overlay {
        config.overlay = true;
    }

    let table = load_table(&args.input)?;
    let mut selection = config.selection(&table)?;

    let trend = args.zones.as_deref().map(parse_column_list).transpose()?;
    let growth = args.growth.as_deref().map(parse_column_list).transpose()?;
    let solo = args.solo.as_deref().map(str::parse::<ColumnKey>).transpose()?;
    selection.apply(trend.as_deref(), solo, growth.as_deref(), args.year)?;

    if let Some(requested) = args.year {
        if requested != selection.year.value() {
            warn!("Year {} is outside the data, using {}", requested, selection.year.value());
        }
    }

    let outcome = report::render_report(&table, &selection, &config, Some(&args.input))
        .context("failed to render report")?;

    for warning in &outcome.warnings {
        println!("Warning: {}", warning);
    }
    println!("Wrote {} files to {}", outcome.files.len(), config.output_dir.display());
    Ok(())
}

fn handle_explore(args: ExploreArgs) -> Result<()> {
    if let Some(ref log_file) = args.log_file {
        logging::init_file(log_file, "info")
            .with_context(|| format!("failed to open log file {}", log_file.display()))?;
    }

    let config = load_config(args.config.as_ref())?;
    let table = load_table(&args.input)?;
    let selection = config.selection(&table)?;

    explorer::run_explorer(&table, selection, config).map_err(|e| anyhow!("explorer error: {}", e))
}

fn handle_bands(args: BandsArgs) -> Result<()> {
    let table = load_table(&args.input)?;
    let bands = band_colors(&table, args.year, &Colormap::balance());

    if args.json {
        let summaries: Vec<BandSummary> = bands.iter().map(BandSummary::from).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("Accumulated temperature by latitude band, {}", args.year);
    println!("{:<8} {:>6} {:>6} {:>9} {:>6}  {}", "Zone", "Min", "Max", "Accum", "Norm", "Color");
    for band in &bands {
        let value = if band.missing {
            format!("{:>9}", "missing")
        } else {
            format!("{:>+9.3}", band.value)
        };
        println!(
            "{:<8} {:>6.0} {:>6.0} {} {:>6.3}  {}",
            band.zone.column_name(),
            band.lat_min,
            band.lat_max,
            value,
            band.norm,
            band.color.hex()
        );
    }
    Ok(())
}

fn handle_preview(args: PreviewArgs) -> Result<()> {
    let table = load_table(&args.input)?;

    println!("Variables");
    print!("{}", report::variable_table());
    for (title, kind) in [
        ("Anomalies", SeriesKind::Raw),
        ("Yearly change (_diff)", SeriesKind::Diff),
        ("Accumulated change (_accum)", SeriesKind::Accum),
    ] {
        println!();
        println!("{}", title);
        print!("{}", report::preview_table(&table, kind, args.rows));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The explorer owns the terminal, so it only logs when given a file
    if !matches!(cli.command, Command::Explore(_)) {
        logging::init_stderr("info");
    }
    info!("zonal_report {}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Explore(args) => handle_explore(args),
        Command::Bands(args) => handle_bands(args),
        Command::Preview(args) => handle_preview(args),
    }
}
