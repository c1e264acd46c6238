//! Binary record store
//!
//! A store file is a header followed by contiguous length-prefixed
//! frames, one per record. It is written once by a single conversion
//! pass and read-only afterwards.
//!
//! # Design Principles
//!
//! - Little-endian integers everywhere
//! - Header written exactly once, before any frame
//! - No padding between frames
//! - Readers branch on the header version byte
//! - Payloads are opaque to the store

mod errors;
mod frame;
mod header;
mod reader;
mod writer;

pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use frame::LENGTH_PREFIX_SIZE;
pub use header::{
    FieldDescriptor, FieldType, HeaderLayout, SchemaLayout, StoreHeader, CREATION_DATE_FORMAT,
    HEADER_VERSION_MINIMAL, HEADER_VERSION_SCHEMA,
};
pub use reader::{read_header, read_record_at, Frame, StoreReader};
pub use writer::{write_store, StoreWriter};

pub(crate) use frame::{read_u16, read_u32, read_u64};
