//! Offset index for the record store
//!
//! Maps a record's natural key (its postal code) to the byte offset of
//! its frame in the store, so a lookup is one seek instead of a scan.
//!
//! # Design Principles
//!
//! - Derived state: rebuilt from the store, never updated in place
//! - Persisted next to the store in its own binary file
//! - Deterministic: key-ordered iteration and file layout
//! - Absence is `None`, never a sentinel offset
//!
//! An index file is only valid for the exact store file it was built
//! from; keeping the two in step is the caller's job.

mod builder;
mod errors;
mod offsets;
mod persist;

pub use builder::{build_index, build_index_with_stats, BuildStats};
pub use errors::{IndexError, IndexErrorCode, IndexResult};
pub use offsets::{Iter, OffsetIndex, StoreOffset};
pub use persist::{decode_index, encode_index, read_index, write_index};
