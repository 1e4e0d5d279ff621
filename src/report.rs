//! Batch report: every chart, the band map and a JSON summary
//!
//! Sections follow the reading order of the report:
//! 1. anomaly trends (fixed comparisons, multi-zone, solo)
//! 2. temperature growth (fixed comparisons, multi-zone)
//! 3. accumulated temperature: narrow-zone comparison, then the map for the
//!    selected year

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::bands::{band_colors, BandColor};
use crate::charts::{self, render_chart, ChartOutcome, ChartSpec};
use crate::colormap::Colormap;
use crate::config::ReportConfig;
use crate::error::Result;
use crate::map_export::{export_band_overlay, render_band_map};
use crate::selection::ReportSelection;
use crate::summary::ReportSummary;
use crate::table::{ColumnKey, ObservationTable, SeriesKind, YEAR_COLUMN};
use crate::zones::Zone;

/// What a report run produced.
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub bands: Vec<BandColor>,
}

/// Charts in report order: presets and interactive charts interleaved by section
pub fn report_charts(selection: &ReportSelection) -> Vec<ChartOutcome> {
    let mut presets = charts::preset_charts().into_iter().map(ChartOutcome::Chart);
    let mut interactive = charts::interactive_charts(selection).into_iter();

    let mut out = Vec::new();
    // Trends: two presets, multi-zone, solo
    out.extend(presets.by_ref().take(2));
    out.extend(interactive.by_ref().take(2));
    // Growth: two presets, multi-zone
    out.extend(presets.by_ref().take(2));
    out.extend(interactive);
    // Accumulated change, ahead of the map
    out.extend(presets);
    out
}

fn output_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    dir.join(format!("{}.{}", stem, ext))
}

/// Render the full report for `selection` into `config.output_dir`.
pub fn render_report(
    table: &ObservationTable,
    selection: &ReportSelection,
    config: &ReportConfig,
    source: Option<&Path>,
) -> Result<ReportOutcome> {
    let dir = &config.output_dir;
    fs::create_dir_all(dir)?;
    let ext = config.format.extension();
    let mut outcome = ReportOutcome::default();

    for chart in report_charts(selection) {
        match chart {
            ChartOutcome::Chart(spec) => {
                let path = output_path(dir, &spec.slug, ext);
                render_chart(table, &spec, &path, config.format, config.chart_size)?;
                info!("Exported chart {} to {}", describe_chart(&spec), path.display());
                outcome.files.push(path);
            }
            ChartOutcome::Warning(msg) => {
                warn!("Skipped chart: {}", msg);
                outcome.warnings.push(msg);
            }
        }
    }

    let year = selection.year.value();
    let cmap = Colormap::balance();
    let bands = band_colors(table, year, &cmap);
    if bands.iter().any(|b| b.missing) {
        outcome.warnings.push(format!("Some bands have no data for {}; they use the placeholder value", year));
    }

    let map_path = output_path(dir, &format!("accumulated_map_{}", year), ext);
    render_band_map(&bands, year, &cmap, &map_path, config.format, config.map_size)?;
    outcome.files.push(map_path);

    if config.overlay {
        let (w, h) = config.overlay_size;
        let overlay_path = output_path(dir, &format!("band_overlay_{}", year), "png");
        export_band_overlay(&bands, &overlay_path, w, h)?;
        outcome.files.push(overlay_path);
    }

    let summary_path = dir.join("summary.json");
    let mut summary = ReportSummary::new(source.map(Path::to_path_buf), table.year_range(), selection, &bands);
    summary.warnings = outcome.warnings.clone();
    summary.files = outcome.files.clone();
    summary.write(&summary_path)?;
    outcome.files.push(summary_path);

    outcome.bands = bands;
    info!(
        "Report complete: {} files, {} warnings",
        outcome.files.len(),
        outcome.warnings.len()
    );
    Ok(outcome)
}

fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "NaN".to_string(),
    }
}

/// First `rows` rows of every column of one series kind, as aligned text.
pub fn preview_table(table: &ObservationTable, kind: SeriesKind, rows: usize) -> String {
    let keys: Vec<ColumnKey> = Zone::all().iter().map(|z| ColumnKey { zone: *z, kind }).collect();
    let names: Vec<String> = keys.iter().map(|k| k.name()).collect();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0).max(8);

    let mut out = String::new();
    let _ = write!(out, "{:>6}", YEAR_COLUMN);
    for name in &names {
        let _ = write!(out, " {:>width$}", name, width = width);
    }
    out.push('\n');

    for (row, year) in table.years().iter().take(rows).enumerate() {
        let _ = write!(out, "{:>6}", year);
        for key in &keys {
            let _ = write!(out, " {:>width$}", format_cell(table.value(*key, row)), width = width);
        }
        out.push('\n');
    }
    out
}

/// Index, name and description of every variable in the source file
pub fn variable_table() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>2}  {:<8}  {}", 0, YEAR_COLUMN, "The year for which the data is reported.");
    for (i, zone) in Zone::all().iter().enumerate() {
        let _ = writeln!(out, "{:>2}  {:<8}  {}", i + 1, zone.column_name(), zone.description());
    }
    out
}

/// Chart titles paired with the columns they show, for logging and the explorer
pub fn describe_chart(spec: &ChartSpec) -> String {
    let names: Vec<String> = spec.series.iter().map(|s| s.key.name()).collect();
    format!("{} [{}]", spec.title, names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ReportSelection;
    use crate::table::tests::sample_table;

    #[test]
    fn test_report_order() {
        let table = sample_table();
        let selection = ReportSelection::defaults(&table).unwrap();
        let slugs: Vec<String> = report_charts(&selection)
            .into_iter()
            .map(|c| match c {
                ChartOutcome::Chart(spec) => spec.slug,
                ChartOutcome::Warning(w) => w,
            })
            .collect();
        assert_eq!(
            slugs,
            vec![
                "large_zones_trend",
                "northern_zones_trend",
                "multi_zone_trend",
                "solo_trend",
                "large_zones_growth",
                "northern_zones_growth",
                "multi_zone_growth",
                "narrow_zones_accum",
            ]
        );
    }

    #[test]
    fn test_empty_selection_in_report_order() {
        let table = sample_table();
        let mut selection = ReportSelection::defaults(&table).unwrap();
        selection.trend.clear();
        let outcomes = report_charts(&selection);
        assert_eq!(outcomes.len(), 8);
        assert_eq!(outcomes[2], ChartOutcome::Warning(charts::TREND_WARNING.to_string()));
    }

    #[test]
    fn test_preview_diff_rows() {
        let table = sample_table();
        let text = preview_table(&table, SeriesKind::Diff, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Glob_diff"));
        assert!(lines[0].contains("90S-64S_diff"));
        assert!(lines[1].starts_with("  1880"));
        assert!(lines[1].contains("NaN"));
        assert!(lines[2].contains("0.080"));
    }

    #[test]
    fn test_preview_accum_starts_at_zero() {
        let table = sample_table();
        let text = preview_table(&table, SeriesKind::Accum, 1);
        let first_row = text.lines().nth(1).unwrap();
        assert_eq!(first_row.matches("0.000").count(), 14);
    }

    #[test]
    fn test_variable_table_lists_every_column() {
        let text = variable_table();
        assert_eq!(text.lines().count(), 15);
        assert!(text.contains("Arctic Circle"));
    }
}
