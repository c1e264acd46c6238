//! zipstore - a binary record store of length-prefixed postal code
//! records with a persisted key to offset index
//!
//! - `store`: header layouts plus frame writer and reader
//! - `index`: index builder, in-memory index and its file format
//! - `codec`: postal code record codec
//! - `catalog`: build, lookup, export and report operations
//! - `config`, `observability`, `cli`: ambient layers

pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod index;
pub mod observability;
pub mod store;

pub use catalog::{lookup_by_key, Catalog, CatalogError, CatalogResult};
pub use codec::ZipCodeRecord;
pub use config::Config;
pub use index::{build_index, read_index, write_index, OffsetIndex, StoreOffset};
pub use store::{StoreHeader, StoreReader, StoreWriter};
