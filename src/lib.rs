//! Zonal anomaly report library
//!
//! Re-exports modules for use by binaries and tools.

pub mod bands;
pub mod charts;
pub mod colormap;
pub mod config;
pub mod derive;
pub mod error;
pub mod explorer;
pub mod logging;
pub mod map_export;
pub mod report;
pub mod selection;
pub mod summary;
pub mod table;
pub mod zones;

pub use error::{ReportError, Result};
pub use table::{ColumnKey, ObservationTable, SeriesKind};
pub use zones::Zone;
