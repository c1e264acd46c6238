//! Record codec for postal-code rows
//!
//! Turns one delimited text line into a typed [`ZipCodeRecord`] and back.
//! The store never interprets payload bytes itself; it hands them here.
//!
//! # Rules
//!
//! - Six fields: zip, place name, state, county, latitude, longitude
//! - Fields are trimmed of whitespace and `"` quotes
//! - Over-long fields are truncated to their column limit
//! - Header rows are reported as [`DecodeError::HeaderRow`]

mod errors;
mod record;

pub use errors::{DecodeError, DecodeResult};
pub use record::{
    decode, encode, extract_key, ZipCodeRecord, COUNTY_LENGTH, FIELD_COUNT, FIELD_DELIMITER,
    LAT_LONG_LENGTH, PLACE_NAME_LENGTH, STATE_LENGTH, ZIP_CODE_LENGTH,
};
