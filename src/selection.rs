//! User-controlled report parameters
//!
//! Multi-selects for comparison charts, a single select for the solo trend
//! and a year slider bounded by the data's year range.

use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::table::{ColumnKey, ObservationTable, SeriesKind};
use crate::zones::Zone;

/// Default year for the map slider
pub const DEFAULT_YEAR: i32 = 2024;

pub fn default_trend_columns() -> Vec<ColumnKey> {
    vec![
        ColumnKey::raw(Zone::Glob),
        ColumnKey::raw(Zone::S90To64),
        ColumnKey::raw(Zone::N64To90),
    ]
}

pub fn default_growth_columns() -> Vec<ColumnKey> {
    vec![ColumnKey::diff(Zone::N64To90), ColumnKey::diff(Zone::S90To64)]
}

/// Every raw zone column, in file order
pub fn raw_columns() -> Vec<ColumnKey> {
    Zone::all().iter().map(|z| ColumnKey::raw(*z)).collect()
}

/// Raw columns followed by their first differences
pub fn raw_and_diff_columns() -> Vec<ColumnKey> {
    let mut keys = raw_columns();
    keys.extend(Zone::all().iter().map(|z| ColumnKey::diff(*z)));
    keys
}

/// Ordered options with a selected subset.
#[derive(Clone, Debug, Serialize)]
pub struct MultiSelect {
    #[serde(skip)]
    options: Vec<ColumnKey>,
    selected: Vec<ColumnKey>,
}

impl MultiSelect {
    pub fn new(options: Vec<ColumnKey>) -> Self {
        Self { options, selected: Vec::new() }
    }

    /// Create with an initial selection; every default must be an option.
    pub fn with_defaults(options: Vec<ColumnKey>, defaults: &[ColumnKey]) -> Result<Self> {
        let mut select = Self::new(options);
        select.set(defaults)?;
        Ok(select)
    }

    pub fn options(&self) -> &[ColumnKey] {
        &self.options
    }

    /// Selected columns, in the order they were picked
    pub fn selected(&self) -> &[ColumnKey] {
        &self.selected
    }

    pub fn is_selected(&self, key: ColumnKey) -> bool {
        self.selected.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Add a column. Duplicates are ignored.
    pub fn select(&mut self, key: ColumnKey) -> Result<()> {
        if !self.options.contains(&key) {
            return Err(ReportError::UnknownColumn(key.name()));
        }
        if !self.selected.contains(&key) {
            self.selected.push(key);
        }
        Ok(())
    }

    pub fn deselect(&mut self, key: ColumnKey) {
        self.selected.retain(|k| *k != key);
    }

    /// Flip membership of the option at `index`
    pub fn toggle(&mut self, index: usize) {
        if let Some(&key) = self.options.get(index) {
            if self.is_selected(key) {
                self.deselect(key);
            } else {
                self.selected.push(key);
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the whole selection
    pub fn set(&mut self, keys: &[ColumnKey]) -> Result<()> {
        if let Some(bad) = keys.iter().find(|k| !self.options.contains(k)) {
            return Err(ReportError::UnknownColumn(bad.name()));
        }
        self.selected.clear();
        for key in keys {
            if !self.selected.contains(key) {
                self.selected.push(*key);
            }
        }
        Ok(())
    }
}

/// One value out of a fixed option list.
#[derive(Clone, Debug, Serialize)]
pub struct SingleSelect {
    #[serde(skip)]
    options: Vec<ColumnKey>,
    #[serde(skip)]
    index: usize,
    selected: ColumnKey,
}

impl SingleSelect {
    /// Defaults to the first option.
    pub fn new(options: Vec<ColumnKey>) -> Result<Self> {
        let selected = *options
            .first()
            .ok_or_else(|| ReportError::Config("single select needs at least one option".into()))?;
        Ok(Self { options, index: 0, selected })
    }

    pub fn options(&self) -> &[ColumnKey] {
        &self.options
    }

    pub fn selected(&self) -> ColumnKey {
        self.selected
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set(&mut self, key: ColumnKey) -> Result<()> {
        let index = self
            .options
            .iter()
            .position(|k| *k == key)
            .ok_or_else(|| ReportError::UnknownColumn(key.name()))?;
        self.index = index;
        self.selected = key;
        Ok(())
    }

    /// Move by `delta` options, wrapping at both ends
    pub fn step(&mut self, delta: i32) {
        let n = self.options.len() as i32;
        let index = (self.index as i32 + delta).rem_euclid(n) as usize;
        self.index = index;
        self.selected = self.options[index];
    }
}

/// Year picker clamped to `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct YearSlider {
    min: i32,
    max: i32,
    value: i32,
}

impl YearSlider {
    pub fn new(min: i32, max: i32, value: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { min, max, value: value.clamp(min, max) }
    }

    /// Bounds from the table's year range
    pub fn for_table(table: &ObservationTable, value: i32) -> Self {
        let (min, max) = table.year_range();
        Self::new(min, max, value)
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.min, self.max)
    }

    /// Set, clamping into bounds; returns the stored year
    pub fn set(&mut self, year: i32) -> i32 {
        self.value = year.clamp(self.min, self.max);
        self.value
    }

    pub fn step(&mut self, delta: i32) -> i32 {
        self.set(self.value.saturating_add(delta))
    }
}

/// Every control of the report in one place.
#[derive(Clone, Debug, Serialize)]
pub struct ReportSelection {
    pub trend: MultiSelect,
    pub solo: SingleSelect,
    pub growth: MultiSelect,
    pub year: YearSlider,
}

impl ReportSelection {
    /// Defaults: trends Glob/90S-64S/64N-90N, solo Glob, growth of both polar zones.
    pub fn defaults(table: &ObservationTable) -> Result<Self> {
        Self::with_year(table, DEFAULT_YEAR)
    }

    pub fn with_year(table: &ObservationTable, year: i32) -> Result<Self> {
        Ok(Self {
            trend: MultiSelect::with_defaults(raw_columns(), &default_trend_columns())?,
            solo: SingleSelect::new(raw_columns())?,
            growth: MultiSelect::with_defaults(raw_and_diff_columns(), &default_growth_columns())?,
            year: YearSlider::for_table(table, year),
        })
    }

    /// Apply optional overrides on top of the current values
    pub fn apply(
        &mut self,
        trend: Option<&[ColumnKey]>,
        solo: Option<ColumnKey>,
        growth: Option<&[ColumnKey]>,
        year: Option<i32>,
    ) -> Result<()> {
        if let Some(keys) = trend {
            self.trend.set(keys)?;
        }
        if let Some(key) = solo {
            if key.kind != SeriesKind::Raw {
                return Err(ReportError::UnknownColumn(key.name()));
            }
            self.solo.set(key)?;
        }
        if let Some(keys) = growth {
            self.growth.set(keys)?;
        }
        if let Some(year) = year {
            self.year.set(year);
        }
        Ok(())
    }
}

/// Parse a comma separated column list, e.g. `Glob,64N-90N_diff`
pub fn parse_column_list(list: &str) -> Result<Vec<ColumnKey>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
