//! Index file persistence
//!
//! ```text
//! +------------------+
//! | Entry Count      | (u32 LE)
//! +------------------+
//! | Key Length       | (u16 LE)  \
//! | Key Bytes        |            > repeated Entry Count times,
//! | Offset           | (u64 LE)  /  ascending key order
//! +------------------+
//! ```
//!
//! Loading is all-or-nothing: entries are collected into a fresh index
//! that is only returned once the whole file has been validated.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use super::errors::{IndexError, IndexResult};
use super::offsets::OffsetIndex;
use crate::observability::Logger;
use crate::store::{read_u16, read_u32, read_u64};

const ENTRY_COUNT_SIZE: u64 = 4;
const KEY_LENGTH_SIZE: u64 = 2;
const OFFSET_SIZE: u64 = 8;
/// Smallest possible entry: empty key plus offset
const MIN_ENTRY_SIZE: u64 = KEY_LENGTH_SIZE + OFFSET_SIZE;

/// Serializes an index to bytes.
pub fn encode_index(index: &OffsetIndex) -> IndexResult<Vec<u8>> {
    let count = u32::try_from(index.len()).map_err(|_| IndexError::too_many_entries(index.len()))?;

    let mut buf = Vec::with_capacity(4 + index.len() * 16);
    buf.extend_from_slice(&count.to_le_bytes());

    for (key, offset) in index.iter() {
        let key_len = u16::try_from(key.len()).map_err(|_| IndexError::key_too_long(key.len()))?;
        buf.extend_from_slice(&key_len.to_le_bytes());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(&offset.to_le_bytes());
    }

    Ok(buf)
}

/// Parses index bytes.
///
/// Fails with `Truncated` if the data ends before `entry_count` entries
/// (including a key length that runs past the end), `TrailingData` if
/// bytes remain afterwards and `InvalidKey` for non-UTF-8 keys.
pub fn decode_index(data: &[u8]) -> IndexResult<OffsetIndex> {
    let total = data.len() as u64;
    let mut cursor = Cursor::new(data);

    let count = read_u32(&mut cursor)
        .map_err(|_| IndexError::truncated(0, "Index file shorter than its entry count"))?;

    let remaining = total.saturating_sub(ENTRY_COUNT_SIZE);
    if (count as u64) * MIN_ENTRY_SIZE > remaining {
        return Err(IndexError::truncated(
            ENTRY_COUNT_SIZE,
            format!(
                "{} entries declared but only {} bytes follow",
                count, remaining
            ),
        ));
    }

    let mut index = OffsetIndex::new();

    for entry in 0..count {
        let entry_start = cursor.position();

        let key_len = read_u16(&mut cursor).map_err(|_| {
            IndexError::truncated(entry_start, format!("Entry {} missing key length", entry))
        })? as u64;

        let key_start = cursor.position();
        if key_len + OFFSET_SIZE > total - key_start {
            return Err(IndexError::truncated(
                entry_start,
                format!(
                    "Entry {} declares {} key bytes, only {} bytes remain",
                    entry,
                    key_len,
                    total - key_start
                ),
            ));
        }

        let key_end = (key_start + key_len) as usize;
        let key = std::str::from_utf8(&data[key_start as usize..key_end])
            .map_err(|_| IndexError::invalid_key(key_start))?
            .to_string();
        cursor.set_position(key_end as u64);

        let offset = read_u64(&mut cursor).map_err(|_| {
            IndexError::truncated(entry_start, format!("Entry {} missing offset", entry))
        })?;

        index.insert(key, offset);
    }

    let consumed = cursor.position();
    if consumed != total {
        return Err(IndexError::trailing_data(consumed, total - consumed));
    }

    Ok(index)
}

/// Writes an index file, replacing any existing file.
///
/// Entries are written in ascending key order. The file is fsynced.
pub fn write_index(index: &OffsetIndex, index_path: &Path) -> IndexResult<()> {
    let bytes = encode_index(index)?;

    if let Some(parent) = index_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                IndexError::io_error(
                    format!("Failed to create directory: {}", parent.display()),
                    e,
                )
            })?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(index_path)
        .map_err(|e| {
            IndexError::io_error(
                format!("Failed to create index file: {}", index_path.display()),
                e,
            )
        })?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .map_err(|e| IndexError::io_error("Failed to write index file", e))?;
    writer
        .flush()
        .map_err(|e| IndexError::io_error("Failed to flush index file", e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| IndexError::io_error("fsync failed on index file", e))?;

    let entries = index.len().to_string();
    let bytes_len = bytes.len().to_string();
    Logger::info(
        "INDEX_WRITTEN",
        &[
            ("bytes", bytes_len.as_str()),
            ("entries", entries.as_str()),
            ("path", index_path.display().to_string().as_str()),
        ],
    );

    Ok(())
}

/// Reads an index file.
pub fn read_index(index_path: &Path) -> IndexResult<OffsetIndex> {
    let data = read_file(index_path)?;
    let index = decode_index(&data)?;

    let entries = index.len().to_string();
    Logger::info(
        "INDEX_LOADED",
        &[
            ("entries", entries.as_str()),
            ("path", index_path.display().to_string().as_str()),
        ],
    );

    Ok(index)
}

fn read_file(index_path: &Path) -> IndexResult<Vec<u8>> {
    let mut file = File::open(index_path).map_err(|e| {
        IndexError::io_error(
            format!("Failed to open index file: {}", index_path.display()),
            e,
        )
    })?;
    let mut data = Vec::new();
    std::io::Read::read_to_end(&mut file, &mut data)
        .map_err(|e| IndexError::io_error("Failed to read index file", e))?;
    Ok(data)
}
