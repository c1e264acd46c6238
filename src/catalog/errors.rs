//! Catalog errors
//!
//! Wraps the store, index and codec errors raised while driving a
//! conversion or a lookup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::codec::DecodeError;
use crate::index::IndexError;
use crate::store::StoreError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Index(#[from] IndexError),

    #[error("Record at offset {offset} could not be decoded: {source}")]
    Decode {
        offset: u64,
        #[source]
        source: DecodeError,
    },

    #[error("Index entry for {key} points at a record keyed {found} (offset {offset}); rebuild the index")]
    StaleIndex {
        key: String,
        found: String,
        offset: u64,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} records exceed the store's u32 record count")]
    TooManyRecords(usize),

    #[error("Store {0} does not exist and no source dataset is configured")]
    NotInitialized(PathBuf),
}
