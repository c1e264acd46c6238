//! Index builder
//!
//! Scans a store file frame by frame and maps each record's key to the
//! offset of its frame.
//!
//! Behavior:
//! - The header must read cleanly, otherwise nothing is indexed
//! - A schema header must name field 0 as the key
//! - The offset captured is the frame start (its length prefix)
//! - Keys must be non-empty and all digits; other records are skipped
//! - Duplicate keys: the last frame in file order wins
//! - A missing or partial length prefix ends the scan normally
//! - A payload cut short by end of file ends the scan; that frame is
//!   not indexed

use std::fs::File;
use std::path::Path;

use super::errors::{IndexError, IndexResult};
use super::offsets::OffsetIndex;
use crate::codec::extract_key;
use crate::observability::Logger;
use crate::store::{StoreError, StoreReader};

/// Field the key is read from; schema headers naming another field are
/// rejected
const KEY_FIELD_POSITION: u8 = 0;

/// Counters collected during a build scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Frames read from the store
    pub frames_scanned: u64,
    /// Frames whose key was empty or not numeric
    pub keys_rejected: u64,
    /// Entries overwritten by a later frame with the same key
    pub duplicates_replaced: u64,
    /// Whether the scan ended on a read failure rather than end of file
    pub stopped_early: bool,
}

/// Builds the key to offset index for a store file.
pub fn build_index(store_path: &Path) -> IndexResult<OffsetIndex> {
    build_index_with_stats(store_path).map(|(index, _)| index)
}

/// Builds the index and returns the scan counters alongside it.
pub fn build_index_with_stats(store_path: &Path) -> IndexResult<(OffsetIndex, BuildStats)> {
    let file = File::open(store_path).map_err(|e| {
        IndexError::io_error(
            format!("Failed to open store for indexing: {}", store_path.display()),
            e,
        )
    })?;

    let mut reader = StoreReader::from_file(file, store_path).map_err(IndexError::build_header)?;

    if let Some(schema) = reader.header().schema() {
        if schema.primary_key_field_index != KEY_FIELD_POSITION {
            return Err(IndexError::build_header(StoreError::invalid_header(format!(
                "Key field {} is not supported; keys are read from field {}",
                schema.primary_key_field_index, KEY_FIELD_POSITION
            ))));
        }
    }

    let mut index = OffsetIndex::new();
    let mut stats = BuildStats::default();

    loop {
        let frame = match reader.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                let offset = reader.current_offset().to_string();
                let reason = e.to_string();
                Logger::warn(
                    "INDEX_SCAN_STOPPED",
                    &[("byte_offset", offset.as_str()), ("reason", reason.as_str())],
                );
                stats.stopped_early = true;
                break;
            }
        };
        stats.frames_scanned += 1;

        match extract_key(&frame.payload) {
            Some(key) => {
                if index.insert(key, frame.offset).is_some() {
                    stats.duplicates_replaced += 1;
                }
            }
            None => stats.keys_rejected += 1,
        }
    }

    let entries = index.len().to_string();
    let frames = stats.frames_scanned.to_string();
    let rejected = stats.keys_rejected.to_string();
    Logger::info(
        "INDEX_BUILT",
        &[
            ("entries", entries.as_str()),
            ("frames", frames.as_str()),
            ("keys_rejected", rejected.as_str()),
            ("store", store_path.display().to_string().as_str()),
        ],
    );

    Ok((index, stats))
}
