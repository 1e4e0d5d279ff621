//! Line charts of zone series over time
//!
//! `ChartSpec` describes a chart independently of the output backend.
//! The fixed comparison charts come from `preset_charts`; the interactive
//! ones are built from the current selection and turn into a warning when
//! a multi-select is empty.

use std::panic;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::selection::{MultiSelect, ReportSelection};
use crate::table::{ColumnKey, ObservationTable, SeriesKind};
use crate::zones::{Zone, LATITUDE_BANDS};

pub const TREND_WARNING: &str = "You must select at least one latitudinal zone for comparison.";
pub const GROWTH_WARNING: &str = "You may select at least one latitudinal zones for comparison.";

/// Line colors, cycled per series
const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

pub fn series_color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

/// Output image format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    #[default]
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub key: ColumnKey,
    pub label: String,
}

/// Backend-independent description of a line chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    /// File stem used when the chart is written to disk
    pub slug: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub markers: bool,
    pub grid: bool,
}

impl ChartSpec {
    pub fn keys(&self) -> Vec<ColumnKey> {
        self.series.iter().map(|s| s.key).collect()
    }
}

/// Either a chart to draw or the warning shown instead of it.
#[derive(Clone, Debug, PartialEq)]
pub enum ChartOutcome {
    Chart(ChartSpec),
    Warning(String),
}

fn zone_comparison(slug: &str, title: &str, y_label: &str, zones: &[Zone], kind: SeriesKind) -> ChartSpec {
    ChartSpec {
        slug: slug.to_string(),
        title: title.to_string(),
        x_label: "Year".to_string(),
        y_label: y_label.to_string(),
        series: zones
            .iter()
            .map(|z| ChartSeries {
                key: ColumnKey { zone: *z, kind },
                label: z.label().to_string(),
            })
            .collect(),
        markers: true,
        grid: true,
    }
}

const LARGE_ZONES: [Zone; 3] = [Zone::N24To90, Zone::S24ToN24, Zone::S90To24];
const NORTHERN_ZONES: [Zone; 4] = [Zone::N64To90, Zone::N44To64, Zone::N24To44, Zone::EquTo24N];

/// The fixed comparison charts: raw and growth for the large and northern
/// zones, then the accumulated change of the eight narrow bands
pub fn preset_charts() -> Vec<ChartSpec> {
    let narrow: Vec<Zone> = LATITUDE_BANDS.iter().map(|b| b.zone).collect();
    vec![
        zone_comparison(
            "large_zones_trend",
            "Latitudinal Zones Comparison Over Time",
            "Yearly Average Temperature",
            &LARGE_ZONES,
            SeriesKind::Raw,
        ),
        zone_comparison(
            "northern_zones_trend",
            "North Hemisphere Comparison Over Time",
            "Yearly Average Temperature",
            &NORTHERN_ZONES,
            SeriesKind::Raw,
        ),
        zone_comparison(
            "large_zones_growth",
            "Three Large Latitudinal Zones Temperature Growth Comparison Over Time",
            "Yearly Average Temperature Change",
            &LARGE_ZONES,
            SeriesKind::Diff,
        ),
        zone_comparison(
            "northern_zones_growth",
            "North Hemisphere Temperature Growth Comparison Over Time",
            "Yearly Average Temperature Change",
            &NORTHERN_ZONES,
            SeriesKind::Diff,
        ),
        zone_comparison(
            "narrow_zones_accum",
            "Accumulated Temperature Change by Latitudinal Zone Over Time",
            "Accumulated Temperature Change",
            &narrow,
            SeriesKind::Accum,
        ),
    ]
}

fn multi_chart(slug: &str, title: &str, y_label: &str, select: &MultiSelect, warning: &str) -> ChartOutcome {
    if select.is_empty() {
        debug!("{} has no columns selected", slug);
        return ChartOutcome::Warning(warning.to_string());
    }
    ChartOutcome::Chart(ChartSpec {
        slug: slug.to_string(),
        title: title.to_string(),
        x_label: "Year".to_string(),
        y_label: y_label.to_string(),
        series: select
            .selected()
            .iter()
            .map(|k| ChartSeries { key: *k, label: k.name() })
            .collect(),
        markers: false,
        grid: false,
    })
}

pub fn trend_chart(select: &MultiSelect) -> ChartOutcome {
    multi_chart(
        "multi_zone_trend",
        "Various Latitudinal Zones Temperature Trends Comparison Over Time",
        "Temperature",
        select,
        TREND_WARNING,
    )
}

pub fn growth_chart(select: &MultiSelect) -> ChartOutcome {
    multi_chart(
        "multi_zone_growth",
        "Various Latitudinal Zones Temperature Growth Comparison Over Time",
        "Temperature/Yearly Average Temperature Change",
        select,
        GROWTH_WARNING,
    )
}

pub fn solo_chart(key: ColumnKey) -> ChartSpec {
    ChartSpec {
        slug: "solo_trend".to_string(),
        title: format!("{} over Time", key.name()),
        x_label: "Year".to_string(),
        y_label: "Temperature".to_string(),
        series: vec![ChartSeries { key, label: key.name() }],
        markers: false,
        grid: false,
    }
}

/// Interactive charts for a selection, in report order
pub fn interactive_charts(selection: &ReportSelection) -> Vec<ChartOutcome> {
    vec![
        trend_chart(&selection.trend),
        ChartOutcome::Chart(solo_chart(selection.solo.selected())),
        growth_chart(&selection.growth),
    ]
}

/// Y range over the chart's series, padded so lines don't touch the frame
pub fn y_bounds(table: &ObservationTable, spec: &ChartSpec) -> (f64, f64) {
    let (lo, hi) = table.value_range(&spec.keys()).unwrap_or((-1.0, 1.0));
    let pad = ((hi - lo) * 0.05).max(0.05);
    (lo - pad, hi + pad)
}

fn draw_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    table: &ObservationTable,
    spec: &ChartSpec,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (first, last) = table.year_range();
    let (y_min, y_max) = y_bounds(table, spec);
    // A single-year table still needs a non-empty x range
    let x_max = if last > first { last as f64 } else { first as f64 + 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(44)
        .y_label_area_size(64)
        .build_cartesian_2d(first as f64..x_max, y_min..y_max)?;

    let year_fmt = |x: &f64| format!("{:.0}", x);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_label_formatter(&year_fmt)
            .light_line_style(BLACK.mix(0.08));
        if !spec.grid {
            mesh.disable_mesh();
        }
        mesh.draw()?;
    }

    for (i, series) in spec.series.iter().enumerate() {
        let color = series_color(i);
        let mut labelled = false;
        for segment in table.segments(series.key) {
            if spec.markers {
                chart.draw_series(segment.iter().map(|&p| Circle::new(p, 2, color.filled())))?;
            }
            let anno = chart.draw_series(LineSeries::new(segment, color.stroke_width(2)))?;
            if !labelled {
                anno.label(series.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                labelled = true;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Draw `spec` to `path`. Backend panics (e.g. no usable font) become errors.
pub fn render_chart(
    table: &ObservationTable,
    spec: &ChartSpec,
    path: &Path,
    format: PlotFormat,
    size: (u32, u32),
) -> Result<()> {
    debug!("Rendering chart '{}' to {}", spec.slug, path.display());
    let render = || match format {
        PlotFormat::Png => draw_chart(BitMapBackend::new(path, size).into_drawing_area(), table, spec)
            .map_err(|e| e.to_string()),
        PlotFormat::Svg => draw_chart(SVGBackend::new(path, size).into_drawing_area(), table, spec)
            .map_err(|e| e.to_string()),
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| ReportError::Plot("plotting backend panicked".to_string()))?
        .map_err(ReportError::Plot)
}
