//! Year-over-year differences and their running total
//!
//! For a zone series `Z`:
//! - `Z_diff[t] = Z[t] - Z[t-1]`, missing at the first row and wherever
//!   either operand is missing
//! - `Z_accum[t] = Z_diff[0] + ... + Z_diff[t]`, with missing differences
//!   contributing nothing, so the accumulation starts at 0 and is defined on
//!   every row

use crate::zones::Zone;

/// First difference of a series, aligned by row.
pub fn first_difference(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    if series.is_empty() {
        return out;
    }
    out.push(None);
    for pair in series.windows(2) {
        out.push(match (pair[0], pair[1]) {
            (Some(prev), Some(curr)) => Some(curr - prev),
            _ => None,
        });
    }
    out
}

/// Running total of a series where missing entries add zero.
pub fn running_total(series: &[Option<f64>]) -> Vec<f64> {
    series
        .iter()
        .scan(0.0, |total, v| {
            *total += v.unwrap_or(0.0);
            Some(*total)
        })
        .collect()
}

/// Diff and accum series for every zone, indexed by `Zone::index()`.
#[derive(Clone, Debug, Default)]
pub struct DerivedColumns {
    diff: Vec<Vec<Option<f64>>>,
    accum: Vec<Vec<f64>>,
}

impl DerivedColumns {
    /// Build from raw zone columns given in `Zone::all()` order.
    pub fn build(raw: &[Vec<Option<f64>>]) -> Self {
        let diff: Vec<Vec<Option<f64>>> = raw.iter().map(|s| first_difference(s)).collect();
        let accum = diff.iter().map(|d| running_total(d)).collect();
        Self { diff, accum }
    }

    pub fn diff(&self, zone: Zone) -> &[Option<f64>] {
        &self.diff[zone.index()]
    }

    pub fn accum(&self, zone: Zone) -> &[f64] {
        &self.accum[zone.index()]
    }
}
