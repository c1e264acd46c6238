//! Store writer
//!
//! Creates (or truncates) the store file, writes the header once, then
//! appends one `[length][payload]` frame per record. The file is fsynced
//! before `finish` returns.
//!
//! The writer does not inspect payloads; they are expected to be
//! validated by the record codec upstream.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::frame::write_frame;
use super::header::StoreHeader;

/// Sequential writer for a new store file.
pub struct StoreWriter {
    /// Path to the store file
    store_path: PathBuf,
    /// Buffered file handle
    writer: BufWriter<File>,
    /// Offset where the next frame starts
    current_offset: u64,
    /// Record count promised by the header
    declared_records: u32,
    /// Frames written so far
    written_records: u64,
}

impl StoreWriter {
    /// Creates the store file and writes its header.
    ///
    /// Parent directories are created if missing. An existing file at
    /// `store_path` is truncated.
    pub fn create(store_path: &Path, header: &StoreHeader) -> StoreResult<Self> {
        if let Some(parent) = store_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::io_error(
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
            .open(store_path)
            .map_err(|e| {
                StoreError::io_error(
                    format!("Failed to create store file: {}", store_path.display()),
                    e,
                )
            })?;

        let header_bytes = header
            .serialize()
            .map_err(|e| StoreError::invalid_header(e.to_string()))?;

        let mut writer = BufWriter::new(file);
        writer
            .write_all(&header_bytes)
            .map_err(|e| StoreError::io_error("Failed to write store header", e))?;

        Ok(Self {
            store_path: store_path.to_path_buf(),
            writer,
            current_offset: header_bytes.len() as u64,
            declared_records: header.record_count,
            written_records: 0,
        })
    }

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Returns the offset where the next frame will start.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Appends one frame.
    ///
    /// # Returns
    ///
    /// The byte offset of the frame's length prefix.
    pub fn write_record(&mut self, payload: &[u8]) -> StoreResult<u64> {
        let offset = self.current_offset;
        let frame_len = write_frame(&mut self.writer, payload).map_err(|e| {
            StoreError::io_error(format!("Failed to write record at offset {}", offset), e)
        })?;

        self.current_offset += frame_len;
        self.written_records += 1;
        Ok(offset)
    }

    /// Flushes and fsyncs the store.
    ///
    /// Fails with `CountMismatch` if the number of frames written differs
    /// from the header's `record_count`. Returns the final file length.
    pub fn finish(mut self) -> StoreResult<u64> {
        if self.written_records != self.declared_records as u64 {
            return Err(StoreError::count_mismatch(
                self.declared_records,
                self.written_records,
            ));
        }

        self.writer
            .flush()
            .map_err(|e| StoreError::io_error("Failed to flush store file", e))?;

        // fsync - mandatory for durability
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| StoreError::io_error("fsync failed on store file", e))?;

        Ok(self.current_offset)
    }
}

/// Writes a complete store: header, then every record in order.
///
/// Returns the offset of each frame, in record order.
pub fn write_store<T: AsRef<[u8]>>(
    store_path: &Path,
    header: &StoreHeader,
    records: &[T],
) -> StoreResult<Vec<u64>> {
    let mut writer = StoreWriter::create(store_path, header)?;
    let mut offsets = Vec::with_capacity(records.len());
    for record in records {
        offsets.push(writer.write_record(record.as_ref())?);
    }
    writer.finish()?;
    Ok(offsets)
}
