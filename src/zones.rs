//! Latitudinal zones of the GISTEMP zonal annual means table
//!
//! Each zone is one data column of the source CSV. The eight narrow zones
//! additionally own a latitude band used when tinting the world map.

use serde::{Deserialize, Serialize};

/// A data column of the zonal means table, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    Glob,
    NHem,
    SHem,
    N24To90,
    S24ToN24,
    S90To24,
    N64To90,
    N44To64,
    N24To44,
    EquTo24N,
    S24ToEqu,
    S44To24,
    S64To44,
    S90To64,
}

impl Zone {
    /// All zones in the column order of the source file.
    pub fn all() -> &'static [Zone] {
        &[
            Zone::Glob,
            Zone::NHem,
            Zone::SHem,
            Zone::N24To90,
            Zone::S24ToN24,
            Zone::S90To24,
            Zone::N64To90,
            Zone::N44To64,
            Zone::N24To44,
            Zone::EquTo24N,
            Zone::S24ToEqu,
            Zone::S44To24,
            Zone::S64To44,
            Zone::S90To64,
        ]
    }

    /// Position of the zone in `Zone::all()`
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Column header as it appears in the CSV
    pub fn column_name(&self) -> &'static str {
        match self {
            Zone::Glob => "Glob",
            Zone::NHem => "NHem",
            Zone::SHem => "SHem",
            Zone::N24To90 => "24N-90N",
            Zone::S24ToN24 => "24S-24N",
            Zone::S90To24 => "90S-24S",
            Zone::N64To90 => "64N-90N",
            Zone::N44To64 => "44N-64N",
            Zone::N24To44 => "24N-44N",
            Zone::EquTo24N => "EQU-24N",
            Zone::S24ToEqu => "24S-EQU",
            Zone::S44To24 => "44S-24S",
            Zone::S64To44 => "64S-44S",
            Zone::S90To64 => "90S-64S",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Zone> {
        Zone::all().iter().copied().find(|z| z.column_name() == name.trim())
    }

    /// Human-readable legend label used on the fixed comparison charts
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Glob => "Global",
            Zone::NHem => "Northern Hemisphere",
            Zone::SHem => "Southern Hemisphere",
            Zone::N24To90 => "Northern Extratropics Zone",
            Zone::S24ToN24 => "Tropical and Subtropical Zone",
            Zone::S90To24 => "Southern Extratropics Zone",
            Zone::N64To90 => "Northern Polar Zone",
            Zone::N44To64 => "Northern Temperate Zone",
            Zone::N24To44 => "Northern Subtropical Zone",
            Zone::EquTo24N => "Northern Tropical Zone",
            Zone::S24ToEqu => "Southern Tropical Zone",
            Zone::S44To24 => "Southern Subtropical Zone",
            Zone::S64To44 => "Southern Temperate Zone",
            Zone::S90To64 => "Southern Polar Zone",
        }
    }

    /// Description of the variable, as shown in the variable table
    pub fn description(&self) -> &'static str {
        match self {
            Zone::Glob => "Global average of the parameter (averaged over the entire Earth).",
            Zone::NHem => "Northern Hemisphere average of the parameter (averaged from 0°N to 90°N).",
            Zone::SHem => "Southern Hemisphere average of the parameter (averaged from 0°S to 90°S).",
            Zone::N24To90 => "Average of the parameter for the latitudinal band from 24°N to 90°N.",
            Zone::S24ToN24 => {
                "Average of the parameter for the latitudinal band from 24°S to 24°N. \
                 Covers the tropics and subtropics, including the equatorial region."
            }
            Zone::S90To24 => "Average of the parameter for the latitudinal band from 90°S to 24°S.",
            Zone::N64To90 => {
                "Average of the parameter for the latitudinal band from 64°N to 90°N. \
                 Focuses on the Arctic Circle and polar regions in the Northern Hemisphere."
            }
            Zone::N44To64 => {
                "Average of the parameter for the latitudinal band from 44°N to 64°N. \
                 Covers the mid-latitudes in the Northern Hemisphere, including temperate regions."
            }
            Zone::N24To44 => {
                "Average of the parameter for the latitudinal band from 24°N to 44°N. \
                 Covers the subtropical and warm temperate regions in the Northern Hemisphere."
            }
            Zone::EquTo24N => {
                "Average of the parameter for the latitudinal band from the Equator (0°) to 24°N. \
                 Focuses on the northern tropics, from the equator to 24°N."
            }
            Zone::S24ToEqu => {
                "Average of the parameter for the latitudinal band from 24°S to the Equator (0°). \
                 Focuses on the southern tropics, from 24°S to the equator."
            }
            Zone::S44To24 => {
                "Average of the parameter for the latitudinal band from 44°S to 24°S. \
                 Covers the subtropical and warm temperate regions in the Southern Hemisphere."
            }
            Zone::S64To44 => {
                "Average of the parameter for the latitudinal band from 64°S to 44°S. \
                 Covers the mid-latitudes in the Southern Hemisphere, including temperate regions."
            }
            Zone::S90To64 => {
                "Average of the parameter for the latitudinal band from 90°S to 64°S. \
                 Focuses on the Antarctic Circle and polar regions in the Southern Hemisphere."
            }
        }
    }

    /// Latitude band drawn on the map, only defined for the eight narrow zones
    pub fn latitude_band(&self) -> Option<LatitudeBand> {
        LATITUDE_BANDS.iter().copied().find(|b| b.zone == *self)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

/// Degree interval covered by one narrow zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatitudeBand {
    pub zone: Zone,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl LatitudeBand {
    const fn new(zone: Zone, lat_min: f64, lat_max: f64) -> Self {
        Self { zone, lat_min, lat_max }
    }

    pub fn contains(&self, lat: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max
    }
}

/// North to south. Together the intervals tile [-90, 90].
pub const LATITUDE_BANDS: [LatitudeBand; 8] = [
    LatitudeBand::new(Zone::N64To90, 64.0, 90.0),
    LatitudeBand::new(Zone::N44To64, 44.0, 64.0),
    LatitudeBand::new(Zone::N24To44, 24.0, 44.0),
    LatitudeBand::new(Zone::EquTo24N, 0.0, 24.0),
    LatitudeBand::new(Zone::S24ToEqu, -24.0, 0.0),
    LatitudeBand::new(Zone::S44To24, -44.0, -24.0),
    LatitudeBand::new(Zone::S64To44, -64.0, -44.0),
    LatitudeBand::new(Zone::S90To64, -90.0, -64.0),
];

/// Find the band covering a latitude; shared edges resolve to the northern band.
pub fn band_at_latitude(lat: f64) -> Option<&'static LatitudeBand> {
    LATITUDE_BANDS.iter().find(|b| b.contains(lat))
}
