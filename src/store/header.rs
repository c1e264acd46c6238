//! Store header layouts
//!
//! The header is written once at the start of the store file. Its first
//! byte is a version discriminant; readers branch on it.
//!
//! ```text
//! Version 1 (minimal)             Version 2 (schema)
//! +----------------------+        +----------------------------+
//! | version        (u8)  |        | version        (u8) = 2    |
//! | record_count   (u32) |        | record_count   (u32)       |
//! | creation_date  (str) |        | creation_date  (str)       |
//! +----------------------+        | index_file_name (str)      |
//!                                 | primary_key_field (u8)     |
//!                                 | field_count    (u16)       |
//!                                 | { name (str), type (u8) }* |
//!                                 +----------------------------+
//! ```

use std::io::{self, Read};

use chrono::Utc;

use super::errors::{StoreError, StoreResult};
use super::frame::{put_string, read_string, read_u16, read_u32, read_u8};

/// Version byte of the minimal layout
pub const HEADER_VERSION_MINIMAL: u8 = 1;
/// Version byte of the schema-carrying layout
pub const HEADER_VERSION_SCHEMA: u8 = 2;

/// Format used for `creation_date`
pub const CREATION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Declared type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Float,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
        }
    }

    fn tag(self) -> u8 {
        match self {
            FieldType::Text => 0,
            FieldType::Integer => 1,
            FieldType::Float => 2,
        }
    }

    fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(FieldType::Text),
            1 => Some(FieldType::Integer),
            2 => Some(FieldType::Float),
            _ => None,
        }
    }
}

/// One column of the record schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Extra metadata carried by the version 2 header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLayout {
    /// File name of the index built for this store
    pub index_file_name: String,
    /// Position in `fields` of the lookup key. Index builds only accept 0,
    /// the field `extract_key` reads.
    pub primary_key_field_index: u8,
    /// Ordered record schema
    pub fields: Vec<FieldDescriptor>,
}

impl SchemaLayout {
    /// Schema of the postal-code dataset, keyed on the zip code.
    pub fn zip_codes(index_file_name: impl Into<String>) -> Self {
        Self {
            index_file_name: index_file_name.into(),
            primary_key_field_index: 0,
            fields: vec![
                FieldDescriptor::new("ZipCode", FieldType::Text),
                FieldDescriptor::new("PlaceName", FieldType::Text),
                FieldDescriptor::new("State", FieldType::Text),
                FieldDescriptor::new("County", FieldType::Text),
                FieldDescriptor::new("Latitude", FieldType::Float),
                FieldDescriptor::new("Longitude", FieldType::Float),
            ],
        }
    }

    /// Returns the descriptor of the key field.
    pub fn key_field(&self) -> Option<&FieldDescriptor> {
        self.fields.get(self.primary_key_field_index as usize)
    }
}

/// Header layout variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLayout {
    Minimal,
    Schema(SchemaLayout),
}

/// Metadata at the start of every store file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHeader {
    /// Number of frames following the header
    pub record_count: u32,
    /// Creation timestamp, UTC
    pub creation_date: String,
    pub layout: HeaderLayout,
}

impl StoreHeader {
    /// Creates a header stamped with the current UTC time.
    pub fn new(layout: HeaderLayout, record_count: u32) -> Self {
        Self {
            record_count,
            creation_date: Utc::now().format(CREATION_DATE_FORMAT).to_string(),
            layout,
        }
    }

    /// Version discriminant written as the first byte.
    pub fn version(&self) -> u8 {
        match self.layout {
            HeaderLayout::Minimal => HEADER_VERSION_MINIMAL,
            HeaderLayout::Schema(_) => HEADER_VERSION_SCHEMA,
        }
    }

    /// Returns the schema metadata, if this is a version 2 header.
    pub fn schema(&self) -> Option<&SchemaLayout> {
        match &self.layout {
            HeaderLayout::Minimal => None,
            HeaderLayout::Schema(schema) => Some(schema),
        }
    }

    /// Serializes the header.
    ///
    /// Fails if a string is too long for its `u16` length prefix or the
    /// schema has more fields than fit in `u16`.
    pub fn serialize(&self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(64);
        buf.push(self.version());
        buf.extend_from_slice(&self.record_count.to_le_bytes());
        put_string(&mut buf, &self.creation_date)?;

        if let HeaderLayout::Schema(schema) = &self.layout {
            put_string(&mut buf, &schema.index_file_name)?;
            buf.push(schema.primary_key_field_index);

            let field_count = u16::try_from(schema.fields.len()).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidInput, "Too many schema fields")
            })?;
            buf.extend_from_slice(&field_count.to_le_bytes());
            for field in &schema.fields {
                put_string(&mut buf, &field.name)?;
                buf.push(field.field_type.tag());
            }
        }

        Ok(buf)
    }

    /// Size in bytes of the serialized header; the first frame starts here.
    pub fn encoded_len(&self) -> u64 {
        let mut len = 1 + 4 + 2 + self.creation_date.len() as u64;
        if let HeaderLayout::Schema(schema) = &self.layout {
            len += 2 + schema.index_file_name.len() as u64 + 1 + 2;
            for field in &schema.fields {
                len += 2 + field.name.len() as u64 + 1;
            }
        }
        len
    }

    /// Reads a header from the start of a stream.
    pub fn read_from<R: Read>(reader: &mut R) -> StoreResult<Self> {
        let version = read_u8(reader).map_err(header_read_error)?;
        if version != HEADER_VERSION_MINIMAL && version != HEADER_VERSION_SCHEMA {
            return Err(StoreError::unsupported_version(version));
        }

        let record_count = read_u32(reader).map_err(header_read_error)?;
        let creation_date = read_string(reader).map_err(header_read_error)?;

        let layout = match version {
            HEADER_VERSION_SCHEMA => HeaderLayout::Schema(read_schema(reader)?),
            _ => HeaderLayout::Minimal,
        };

        Ok(Self {
            record_count,
            creation_date,
            layout,
        })
    }
}

fn read_schema<R: Read>(reader: &mut R) -> StoreResult<SchemaLayout> {
    let index_file_name = read_string(reader).map_err(header_read_error)?;
    let primary_key_field_index = read_u8(reader).map_err(header_read_error)?;
    let field_count = read_u16(reader).map_err(header_read_error)?;

    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let name = read_string(reader).map_err(header_read_error)?;
        let tag = read_u8(reader).map_err(header_read_error)?;
        let field_type = FieldType::from_tag(tag).ok_or_else(|| {
            StoreError::invalid_header(format!("Unknown field type tag {} for {}", tag, name))
        })?;
        fields.push(FieldDescriptor { name, field_type });
    }

    if primary_key_field_index as usize >= fields.len() {
        return Err(StoreError::invalid_header(format!(
            "Primary key field index {} out of range for {} fields",
            primary_key_field_index,
            fields.len()
        )));
    }

    Ok(SchemaLayout {
        index_file_name,
        primary_key_field_index,
        fields,
    })
}

fn header_read_error(e: io::Error) -> StoreError {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => StoreError::truncated("Store header is truncated"),
        io::ErrorKind::InvalidData => StoreError::invalid_header(e.to_string()),
        _ => StoreError::io_error("Failed to read store header", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorCode;
    use std::io::Cursor;

    fn minimal() -> StoreHeader {
        StoreHeader {
            record_count: 3,
            creation_date: "2025-10-11 12:00:00".to_string(),
            layout: HeaderLayout::Minimal,
        }
    }

    fn schema() -> StoreHeader {
        StoreHeader {
            layout: HeaderLayout::Schema(SchemaLayout::zip_codes("zip.idx")),
            ..minimal()
        }
    }

    #[test]
    fn test_version_follows_layout() {
        assert_eq!(minimal().version(), HEADER_VERSION_MINIMAL);
        assert_eq!(schema().version(), HEADER_VERSION_SCHEMA);
    }

    #[test]
    fn test_encoded_len_matches_serialized() {
        for header in [minimal(), schema()] {
            let bytes = header.serialize().unwrap();
            assert_eq!(bytes.len() as u64, header.encoded_len());
        }
    }

    #[test]
    fn test_read_back_both_layouts() {
        for header in [minimal(), schema()] {
            let bytes = header.serialize().unwrap();
            let parsed = StoreHeader::read_from(&mut Cursor::new(bytes)).unwrap();
            assert_eq!(parsed, header);
        }
    }

    #[test]
    fn test_schema_key_field() {
        let header = schema();
        let key = header.schema().unwrap().key_field().unwrap();
        assert_eq!(key.name, "ZipCode");
        assert!(minimal().schema().is_none());
    }

    #[test]
    fn test_new_stamps_creation_date() {
        let header = StoreHeader::new(HeaderLayout::Minimal, 0);
        assert!(chrono::NaiveDateTime::parse_from_str(&header.creation_date, CREATION_DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_truncated_header() {
        let bytes = schema().serialize().unwrap();
        for cut in [0, 1, 4, 8, bytes.len() - 1] {
            let err = StoreHeader::read_from(&mut Cursor::new(&bytes[..cut])).unwrap_err();
            assert_eq!(err.code(), StoreErrorCode::Truncated, "cut at {}", cut);
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut bytes = minimal().serialize().unwrap();
        bytes[0] = 7;
        let err = StoreHeader::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::UnsupportedVersion);
    }

    #[test]
    fn test_key_field_out_of_range_rejected() {
        let mut layout = SchemaLayout::zip_codes("zip.idx");
        layout.primary_key_field_index = 6;
        let header = StoreHeader {
            layout: HeaderLayout::Schema(layout),
            ..minimal()
        };
        let bytes = header.serialize().unwrap();
        let err = StoreHeader::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::InvalidHeader);
    }
}
