//! Observation table loaded from the zonal annual means CSV
//!
//! Rows are keyed by year. Every zone column holds an optional anomaly
//! (°C relative to the baseline); blank cells and placeholder tokens such as
//! `***` load as missing. Diff and accum columns are derived once, when the
//! table is constructed, and the table is immutable afterwards.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::derive::DerivedColumns;
use crate::error::{ReportError, Result};
use crate::zones::Zone;

pub const YEAR_COLUMN: &str = "Year";

/// Which transform of a zone series a column holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Raw,
    Diff,
    Accum,
}

impl SeriesKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            SeriesKind::Raw => "",
            SeriesKind::Diff => "_diff",
            SeriesKind::Accum => "_accum",
        }
    }
}

/// A named column of the table: a zone plus a series kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub zone: Zone,
    pub kind: SeriesKind,
}

impl ColumnKey {
    pub fn raw(zone: Zone) -> Self {
        Self { zone, kind: SeriesKind::Raw }
    }

    pub fn diff(zone: Zone) -> Self {
        Self { zone, kind: SeriesKind::Diff }
    }

    pub fn accum(zone: Zone) -> Self {
        Self { zone, kind: SeriesKind::Accum }
    }

    /// Column name, e.g. `64N-90N_diff`
    pub fn name(&self) -> String {
        format!("{}{}", self.zone.column_name(), self.kind.suffix())
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColumnKey {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (base, kind) = if let Some(base) = s.strip_suffix("_diff") {
            (base, SeriesKind::Diff)
        } else if let Some(base) = s.strip_suffix("_accum") {
            (base, SeriesKind::Accum)
        } else {
            (s, SeriesKind::Raw)
        };
        Zone::from_column_name(base)
            .map(|zone| ColumnKey { zone, kind })
            .ok_or_else(|| ReportError::UnknownColumn(s.to_string()))
    }
}

impl Serialize for ColumnKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> Deserialize<'de> for ColumnKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Annual zonal means, one row per year.
#[derive(Clone, Debug)]
pub struct ObservationTable {
    years: Vec<i32>,
    /// Raw zone columns, indexed by `Zone::index()`
    raw: Vec<Vec<Option<f64>>>,
    derived: DerivedColumns,
}

impl ObservationTable {
    /// Build a table from years and raw columns in `Zone::all()` order.
    pub fn from_columns(years: Vec<i32>, raw: Vec<Vec<Option<f64>>>) -> Result<Self> {
        if years.is_empty() {
            return Err(ReportError::EmptyTable);
        }
        if raw.len() != Zone::all().len() {
            return Err(ReportError::TableShape(format!(
                "expected {} zone columns, got {}",
                Zone::all().len(),
                raw.len()
            )));
        }
        if let Some(col) = raw.iter().position(|c| c.len() != years.len()) {
            return Err(ReportError::TableShape(format!(
                "column {} has {} rows, expected {}",
                Zone::all()[col],
                raw[col].len(),
                years.len()
            )));
        }
        for (i, pair) in years.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ReportError::NonIncreasingYear {
                    year: pair[1],
                    previous: pair[0],
                    line: i as u64 + 3,
                });
            }
        }

        let derived = DerivedColumns::build(&raw);
        Ok(Self { years, raw, derived })
    }

    /// Load the table from a CSV file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading zonal means from {}", path.display());
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        let (first, last) = table.year_range();
        info!("Loaded {} years ({}-{})", table.len(), first, last);
        Ok(table)
    }

    /// Parse CSV from any reader. Requires a `Year` column and every zone column.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| ReportError::MissingColumn(name.to_string()))
        };
        let year_idx = find(YEAR_COLUMN)?;
        let zone_idx: Vec<usize> = Zone::all()
            .iter()
            .map(|z| find(z.column_name()))
            .collect::<Result<_>>()?;

        let mut years = Vec::new();
        let mut raw: Vec<Vec<Option<f64>>> = vec![Vec::new(); Zone::all().len()];
        let mut previous: Option<i32> = None;

        for record in rdr.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let year_field = record.get(year_idx).unwrap_or("");
            let year: i32 = year_field.parse().map_err(|_| ReportError::InvalidYear {
                value: year_field.to_string(),
                line,
            })?;
            if let Some(prev) = previous {
                if year <= prev {
                    return Err(ReportError::NonIncreasingYear { year, previous: prev, line });
                }
            }
            previous = Some(year);
            years.push(year);

            for (column, &idx) in raw.iter_mut().zip(&zone_idx) {
                column.push(parse_cell(record.get(idx).unwrap_or("")));
            }
        }

        debug!("Parsed {} rows with {} columns", years.len(), headers.len());
        Self::from_columns(years, raw)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Inclusive (first, last) year
    pub fn year_range(&self) -> (i32, i32) {
        // from_columns rejects empty tables
        (self.years[0], self.years[self.years.len() - 1])
    }

    pub fn row_for_year(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// Value of a column at a row; accum columns are defined on every row.
    pub fn value(&self, key: ColumnKey, row: usize) -> Option<f64> {
        match key.kind {
            SeriesKind::Raw => self.raw[key.zone.index()].get(row).copied().flatten(),
            SeriesKind::Diff => self.derived.diff(key.zone).get(row).copied().flatten(),
            SeriesKind::Accum => self.derived.accum(key.zone).get(row).copied(),
        }
    }

    /// Full column aligned with `years()`
    pub fn series(&self, key: ColumnKey) -> Vec<Option<f64>> {
        (0..self.len()).map(|row| self.value(key, row)).collect()
    }

    /// (year, value) pairs with missing values dropped
    pub fn points(&self, key: ColumnKey) -> Vec<(f64, f64)> {
        self.years
            .iter()
            .enumerate()
            .filter_map(|(row, &year)| self.value(key, row).map(|v| (year as f64, v)))
            .collect()
    }

    /// Runs of consecutive non-missing points; a missing value starts a new run.
    pub fn segments(&self, key: ColumnKey) -> Vec<Vec<(f64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for (row, &year) in self.years.iter().enumerate() {
            match self.value(key, row) {
                Some(v) => current.push((year as f64, v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Min and max over the non-missing values of several columns
    pub fn value_range(&self, keys: &[ColumnKey]) -> Option<(f64, f64)> {
        keys.iter()
            .flat_map(|k| self.series(*k).into_iter().flatten())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn parse_cell(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}
