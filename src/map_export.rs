//! World map export for accumulated temperature by latitude band
//!
//! Two outputs:
//! - an annotated figure (equirectangular frame, graticule, tinted bands and
//!   a horizontal colorbar) drawn with plotters
//! - a bare RGBA band overlay in equirectangular projection, suitable as a
//!   texture on top of an external basemap

use std::panic;
use std::path::Path;

use image::{ImageBuffer, Rgba, RgbaImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::bands::{color_at_latitude, BandColor};
use crate::charts::PlotFormat;
use crate::colormap::{denormalize, Colormap, Rgb8, DOMAIN_MAX, DOMAIN_MIN};
use crate::error::{ReportError, Result};

pub const COLORBAR_LABEL: &str = "Temperature Variation (°C)";

/// Opacity of the band tint over the background
pub const BAND_ALPHA: f64 = 0.9;

const OCEAN: RGBColor = RGBColor(173, 216, 230);
const GRATICULE_STEP: i32 = 30;
const COLORBAR_STEPS: usize = 256;

fn to_plot_color(c: Rgb8) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// Figure title; flags the year when no band has data
pub fn map_title(bands: &[BandColor], year: i32) -> String {
    if !bands.is_empty() && bands.iter().all(|b| b.missing) {
        format!("Accumulated Temperature by Latitude Band, {} (no data)", year)
    } else {
        format!("Accumulated Temperature by Latitude Band, {}", year)
    }
}

fn draw_band_map<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    bands: &[BandColor],
    year: i32,
    cmap: &Colormap,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let (_, height) = root.dim_in_pixel();
    let (map_area, bar_area) = root.split_vertically(height * 4 / 5);

    let mut map = ChartBuilder::on(&map_area)
        .caption(map_title(bands, year), ("sans-serif", 22))
        .margin(16)
        .x_label_area_size(30)
        .y_label_area_size(48)
        .build_cartesian_2d(-180f64..180f64, -90f64..90f64)?;

    map.plotting_area().fill(&OCEAN)?;

    map.draw_series(bands.iter().map(|b| {
        Rectangle::new(
            [(-180.0, b.lat_min), (180.0, b.lat_max)],
            to_plot_color(b.color).mix(BAND_ALPHA).filled(),
        )
    }))?;

    // Graticule on top of the bands
    let grid = BLACK.mix(0.25);
    for lon in (-180..=180).step_by(GRATICULE_STEP as usize) {
        let lon = lon as f64;
        map.draw_series(LineSeries::new(vec![(lon, -90.0), (lon, 90.0)], grid))?;
    }
    for lat in (-90..=90).step_by(GRATICULE_STEP as usize) {
        let lat = lat as f64;
        map.draw_series(LineSeries::new(vec![(-180.0, lat), (180.0, lat)], grid))?;
    }

    let degree_fmt = |v: &f64| format!("{:.0}°", v);
    map.configure_mesh()
        .disable_mesh()
        .x_labels(13)
        .y_labels(7)
        .x_label_formatter(&degree_fmt)
        .y_label_formatter(&degree_fmt)
        .draw()?;

    let mut bar = ChartBuilder::on(&bar_area)
        .margin_left(64)
        .margin_right(32)
        .margin_top(8)
        .margin_bottom(8)
        .x_label_area_size(44)
        .build_cartesian_2d(DOMAIN_MIN..DOMAIN_MAX, 0f64..1f64)?;

    bar.draw_series((0..COLORBAR_STEPS).map(|i| {
        let t0 = i as f64 / COLORBAR_STEPS as f64;
        let t1 = (i + 1) as f64 / COLORBAR_STEPS as f64;
        let color = to_plot_color(cmap.sample((t0 + t1) / 2.0));
        Rectangle::new([(denormalize(t0), 0.0), (denormalize(t1), 1.0)], color.filled())
    }))?;

    bar.configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .x_labels(9)
        .x_desc(COLORBAR_LABEL)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Draw the annotated band map for `year` to `path`.
pub fn render_band_map(
    bands: &[BandColor],
    year: i32,
    cmap: &Colormap,
    path: &Path,
    format: PlotFormat,
    size: (u32, u32),
) -> Result<()> {
    debug!("Rendering band map for {} to {}", year, path.display());
    let render = || match format {
        PlotFormat::Png => draw_band_map(BitMapBackend::new(path, size).into_drawing_area(), bands, year, cmap)
            .map_err(|e| e.to_string()),
        PlotFormat::Svg => draw_band_map(SVGBackend::new(path, size).into_drawing_area(), bands, year, cmap)
            .map_err(|e| e.to_string()),
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| ReportError::Plot("plotting backend panicked".to_string()))?
        .map_err(ReportError::Plot)?;
    info!("Exported band map to {}", path.display());
    Ok(())
}

/// Rasterize the bands; row `y` samples the latitude at the pixel centre.
pub fn render_band_raster(bands: &[BandColor], width: u32, height: u32) -> RgbaImage {
    let alpha = (BAND_ALPHA * 255.0).round() as u8;
    let mut img: RgbaImage = ImageBuffer::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    for y in 0..height {
        let lat = 90.0 - (y as f64 + 0.5) / height as f64 * 180.0;
        let Some(band) = color_at_latitude(bands, lat) else {
            continue;
        };
        let c = band.color;
        for x in 0..width {
            img.put_pixel(x, y, Rgba([c.r, c.g, c.b, alpha]));
        }
    }

    img
}

/// Write the bare band overlay as a PNG.
pub fn export_band_overlay(bands: &[BandColor], path: &Path, width: u32, height: u32) -> Result<()> {
    let img = render_band_raster(bands, width, height);
    img.save(path)?;
    info!("Exported band overlay to {} ({}x{})", path.display(), width, height);
    Ok(())
}
