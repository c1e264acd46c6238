//! Catalog: the operations built on top of the store and index
//!
//! - `build`: delimited dataset to store plus index
//! - `lookup`: key lookups, and `Catalog` with its rebuild path
//! - `export`: store back to CSV
//! - `extremes`: per-state extremes report
//!
//! Nothing here writes to a store after it has been built. The index
//! is produced once per build and read-only afterwards.

mod build;
mod errors;
mod export;
mod extremes;
mod lookup;

pub use build::{build_store_and_index, convert_source, write_lines, BuildReport, ConvertedRows};
pub use errors::{CatalogError, CatalogResult};
pub use export::{export_to_csv, ExportReport, EXPORT_HEADER};
pub use extremes::{extremes_of, state_extremes, ExtremePoint, ExtremesReport, StateExtremes};
pub use lookup::{lookup_by_key, Catalog};
