//! JSON summary of a rendered report

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::bands::BandColor;
use crate::error::Result;
use crate::selection::ReportSelection;

#[derive(Clone, Debug, Serialize)]
pub struct BandSummary {
    pub zone: String,
    pub lat_min: f64,
    pub lat_max: f64,
    pub accumulated: f64,
    pub missing: bool,
    pub norm: f64,
    pub color: String,
}

impl From<&BandColor> for BandSummary {
    fn from(band: &BandColor) -> Self {
        Self {
            zone: band.zone.column_name().to_string(),
            lat_min: band.lat_min,
            lat_max: band.lat_max,
            accumulated: band.value,
            missing: band.missing,
            norm: band.norm,
            color: band.color.hex(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportSummary {
    pub source: Option<PathBuf>,
    pub generated_at: String,
    pub year_range: (i32, i32),
    pub selection: ReportSelection,
    pub bands: Vec<BandSummary>,
    pub warnings: Vec<String>,
    pub files: Vec<PathBuf>,
}

impl ReportSummary {
    pub fn new(
        source: Option<PathBuf>,
        year_range: (i32, i32),
        selection: &ReportSelection,
        bands: &[BandColor],
    ) -> Self {
        Self {
            source,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            year_range,
            selection: selection.clone(),
            bands: bands.iter().map(BandSummary::from).collect(),
            warnings: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        info!("Wrote summary to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::band_colors;
    use crate::colormap::Colormap;
    use crate::table::tests::sample_table;

    #[test]
    fn test_summary_json_shape() {
        let table = sample_table();
        let selection = ReportSelection::defaults(&table).unwrap();
        let bands = band_colors(&table, 1999, &Colormap::balance());
        let summary = ReportSummary::new(None, table.year_range(), &selection, &bands);

        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(value["year_range"], serde_json::json!([1880, 1883]));
        assert_eq!(value["bands"].as_array().unwrap().len(), 8);
        assert_eq!(value["bands"][0]["zone"], "64N-90N");
        assert_eq!(value["bands"][0]["missing"], true);
        assert_eq!(value["selection"]["trend"]["selected"][0], "Glob");
        assert_eq!(value["selection"]["growth"]["selected"][1], "90S-64S_diff");
        assert_eq!(value["selection"]["year"]["value"], 1883);
        assert!(value["generated_at"].as_str().unwrap().ends_with('Z'));
    }
}
