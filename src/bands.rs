//! Latitude band colors for the accumulated temperature map

use serde::Serialize;
use tracing::warn;

use crate::colormap::{normalize, Colormap, Rgb8};
use crate::table::{ColumnKey, ObservationTable};
use crate::zones::{band_at_latitude, Zone, LATITUDE_BANDS};

/// Value used for a band when the selected year has no row, or no
/// measurement for that band.
///
/// It is colored like any other number (almost exactly the neutral centre of
/// the scale); `BandColor::missing` records that it is not a measurement.
pub const MISSING_SENTINEL: f64 = 0.001;

/// Render-ready tint for one latitude band.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandColor {
    pub zone: Zone,
    pub lat_min: f64,
    pub lat_max: f64,
    /// Accumulated anomaly (°C), or the sentinel when missing
    pub value: f64,
    pub missing: bool,
    /// Position on the color scale, in [0, 1]
    pub norm: f64,
    pub color: Rgb8,
}

/// Compute the eight band colors for `year`, north to south.
pub fn band_colors(table: &ObservationTable, year: i32, cmap: &Colormap) -> Vec<BandColor> {
    let row = table.row_for_year(year);
    if row.is_none() {
        warn!("No row for year {}, using sentinel {} for every band", year, MISSING_SENTINEL);
    }

    LATITUDE_BANDS
        .iter()
        .map(|band| {
            // A band without a measurement for the year shows the sentinel,
            // not the total carried over from earlier years
            let value = row
                .filter(|&r| table.value(ColumnKey::raw(band.zone), r).is_some())
                .and_then(|r| table.value(ColumnKey::accum(band.zone), r));
            let (value, missing) = match value {
                Some(v) => (v, false),
                None => (MISSING_SENTINEL, true),
            };
            let norm = normalize(value);
            BandColor {
                zone: band.zone,
                lat_min: band.lat_min,
                lat_max: band.lat_max,
                value,
                missing,
                norm,
                color: cmap.sample(norm),
            }
        })
        .collect()
}

/// Tint at a latitude, if any band covers it
pub fn color_at_latitude(bands: &[BandColor], lat: f64) -> Option<&BandColor> {
    let band = band_at_latitude(lat)?;
    bands.iter().find(|b| b.zone == band.zone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;

    #[test]
    fn test_band_colors_for_present_year() {
        let table = sample_table();
        let cmap = Colormap::balance();
        let bands = band_colors(&table, 1882, &cmap);

        assert_eq!(bands.len(), 8);
        assert_eq!(bands[0].zone, Zone::N64To90);
        assert_eq!(bands[7].zone, Zone::S90To64);
        assert!(bands.iter().all(|b| !b.missing));

        // 64N-90N: -1.40 - -0.80
        assert!((bands[0].value - -0.60).abs() < 1e-9);
        assert!((bands[0].norm - normalize(-0.60)).abs() < 1e-12);
        assert_eq!(bands[0].color, cmap.color_for(bands[0].value));
    }

    #[test]
    fn test_first_year_is_neutral() {
        let table = sample_table();
        let bands = band_colors(&table, 1880, &Colormap::balance());
        assert!(bands.iter().all(|b| b.value == 0.0 && b.norm == 0.5));
    }

    #[test]
    fn test_absent_year_uses_sentinel() {
        let table = sample_table();
        let bands = band_colors(&table, 1999, &Colormap::balance());
        assert_eq!(bands.len(), 8);
        for band in &bands {
            assert!(band.missing);
            assert_eq!(band.value, MISSING_SENTINEL);
            assert!((band.norm - 0.500125).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unmeasured_band_uses_sentinel() {
        let table = sample_table();
        let bands = band_colors(&table, 1883, &Colormap::balance());
        let south = bands.iter().find(|b| b.zone == Zone::S90To64).unwrap();
        assert!(south.missing);
        assert_eq!(south.value, MISSING_SENTINEL);
        // The accum column itself still carries the earlier total
        assert!(table.value(ColumnKey::accum(Zone::S90To64), 3).is_some());
        assert_eq!(bands.iter().filter(|b| b.missing).count(), 1);
    }

    #[test]
    fn test_lookup_by_latitude() {
        let table = sample_table();
        let bands = band_colors(&table, 1881, &Colormap::balance());
        assert_eq!(color_at_latitude(&bands, 70.0).unwrap().zone, Zone::N64To90);
        assert_eq!(color_at_latitude(&bands, -30.0).unwrap().zone, Zone::S44To24);
    }
}
