//! Report configuration
//!
//! Built-in defaults, optionally overridden by a JSON file; command-line
//! flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::charts::PlotFormat;
use crate::error::{ReportError, Result};
use crate::selection::{default_growth_columns, default_trend_columns, ReportSelection, DEFAULT_YEAR};
use crate::table::{ColumnKey, ObservationTable, SeriesKind};
use crate::zones::Zone;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory charts, map and summary are written to
    pub output_dir: PathBuf,
    pub format: PlotFormat,
    /// Line chart size in pixels (width, height)
    pub chart_size: (u32, u32),
    /// Map figure size in pixels (width, height)
    pub map_size: (u32, u32),
    /// Also write the bare band overlay raster
    pub overlay: bool,
    pub overlay_size: (u32, u32),
    pub trend_columns: Vec<ColumnKey>,
    pub solo_column: ColumnKey,
    pub growth_columns: Vec<ColumnKey>,
    pub year: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("report"),
            format: PlotFormat::Png,
            chart_size: (1000, 600),
            map_size: (1200, 760),
            overlay: false,
            overlay_size: (1440, 720),
            trend_columns: default_trend_columns(),
            solo_column: ColumnKey::raw(Zone::Glob),
            growth_columns: default_growth_columns(),
            year: DEFAULT_YEAR,
        }
    }
}

impl ReportConfig {
    /// Read a JSON config file; absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Reading config from {}", path.display());
        let text = fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, (w, h)) in [
            ("chart_size", self.chart_size),
            ("map_size", self.map_size),
            ("overlay_size", self.overlay_size),
        ] {
            if w == 0 || h == 0 {
                return Err(ReportError::Config(format!("{} must be non-zero, got {}x{}", name, w, h)));
            }
        }
        if self.solo_column.kind != SeriesKind::Raw {
            return Err(ReportError::Config(format!(
                "solo_column must be a raw zone column, got {}",
                self.solo_column
            )));
        }
        Ok(())
    }

    /// Selection for `table` seeded from this config
    pub fn selection(&self, table: &ObservationTable) -> Result<ReportSelection> {
        let mut selection = ReportSelection::with_year(table, self.year)?;
        selection.apply(
            Some(&self.trend_columns),
            Some(self.solo_column),
            Some(&self.growth_columns),
            None,
        )?;
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::sample_table;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "format": "svg", "year": 1881, "growth_columns": ["Glob_diff"] }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.format, PlotFormat::Svg);
        assert_eq!(config.year, 1881);
        assert_eq!(config.growth_columns, vec![ColumnKey::diff(Zone::Glob)]);
        assert_eq!(config.trend_columns, default_trend_columns());
        assert_eq!(config.chart_size, (1000, 600));
    }

    #[test]
    fn test_unknown_column_fails_to_parse() {
        let json = r#"{ "trend_columns": ["Glob", "Atlantis"] }"#;
        assert!(serde_json::from_str::<ReportConfig>(json).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = ReportConfig::default();
        assert!(config.validate().is_ok());
        config.map_size = (0, 100);
        assert!(config.validate().is_err());

        let config = ReportConfig { solo_column: ColumnKey::diff(Zone::Glob), ..Default::default() };
        assert!(matches!(config.validate(), Err(ReportError::Config(_))));
    }

    #[test]
    fn test_selection_from_config() {
        let table = sample_table();
        let config = ReportConfig {
            trend_columns: vec![ColumnKey::raw(Zone::NHem)],
            year: 1700,
            ..Default::default()
        };
        let selection = config.selection(&table).unwrap();
        assert_eq!(selection.trend.selected(), &[ColumnKey::raw(Zone::NHem)]);
        assert_eq!(selection.year.value(), 1880);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        fs::write(&path, r#"{ "output_dir": "out", "overlay": true }"#).unwrap();
        let config = ReportConfig::load(&path).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.overlay);
    }
}
