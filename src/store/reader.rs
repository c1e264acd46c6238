//! Store reader
//!
//! The header must be read before any record. Records are fetched either
//! sequentially (scans, export, index build) or by the byte offset of
//! their frame (index lookups). The reader never interprets payloads.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};
use super::frame::{read_length_prefix, read_u32, LENGTH_PREFIX_SIZE};
use super::header::StoreHeader;

/// One frame read from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Offset of the frame's length prefix
    pub offset: u64,
    /// Raw payload bytes
    pub payload: Vec<u8>,
}

/// Reads the store header from the start of a stream.
///
/// Fails with `Truncated` if the stream ends inside the header.
pub fn read_header<R: Read>(stream: &mut R) -> StoreResult<StoreHeader> {
    StoreHeader::read_from(stream)
}

/// Reads the payload of the frame starting at `offset`.
///
/// Fails with `Seek` if `offset` is at or past the end of the stream and
/// with `Truncated` if the length prefix or payload runs past the end.
pub fn read_record_at<R: Read + Seek>(stream: &mut R, offset: u64) -> StoreResult<Vec<u8>> {
    let file_len = stream
        .seek(SeekFrom::End(0))
        .map_err(|e| StoreError::seek_failed(offset, e))?;
    read_frame_at(stream, offset, file_len)
}

fn read_frame_at<R: Read + Seek>(stream: &mut R, offset: u64, file_len: u64) -> StoreResult<Vec<u8>> {
    if offset >= file_len {
        return Err(StoreError::seek_out_of_bounds(offset, file_len));
    }

    stream
        .seek(SeekFrom::Start(offset))
        .map_err(|e| StoreError::seek_failed(offset, e))?;

    let remaining = file_len - offset;
    if remaining < LENGTH_PREFIX_SIZE {
        return Err(StoreError::truncated_at(
            offset,
            format!("{} bytes remaining, length prefix needs 4", remaining),
        ));
    }

    let record_length = read_u32(stream)
        .map_err(|e| StoreError::from_read("record length", offset, e))? as u64;

    if record_length > remaining - LENGTH_PREFIX_SIZE {
        return Err(StoreError::truncated_at(
            offset,
            format!(
                "Record length {} exceeds remaining file size {}",
                record_length,
                remaining - LENGTH_PREFIX_SIZE
            ),
        ));
    }

    let mut payload = vec![0u8; record_length as usize];
    stream
        .read_exact(&mut payload)
        .map_err(|e| StoreError::from_read("record payload", offset, e))?;

    Ok(payload)
}

/// Store reader for sequential scans and offset lookups.
pub struct StoreReader {
    /// Path to the store file
    store_path: PathBuf,
    /// Buffered reader
    reader: BufReader<File>,
    /// Header read at open
    header: StoreHeader,
    /// Offset of the first frame
    data_start: u64,
    /// Current byte offset
    current_offset: u64,
    /// Total file size
    file_size: u64,
}

impl StoreReader {
    /// Opens the store file and reads its header.
    ///
    /// The file handle is dropped before returning if the header is bad.
    pub fn open(store_path: &Path) -> StoreResult<Self> {
        let file = File::open(store_path).map_err(|e| {
            StoreError::io_error(
                format!("Failed to open store file: {}", store_path.display()),
                e,
            )
        })?;
        Self::from_file(file, store_path)
    }

    /// Reads the header of an already opened store file.
    pub fn from_file(file: File, store_path: &Path) -> StoreResult<Self> {
        let file_size = file
            .metadata()
            .map_err(|e| StoreError::io_error("Failed to read file metadata", e))?
            .len();

        let mut reader = BufReader::new(file);
        let header = read_header(&mut reader)?;
        let data_start = header.encoded_len();

        Ok(Self {
            store_path: store_path.to_path_buf(),
            reader,
            header,
            data_start,
            current_offset: data_start,
            file_size,
        })
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Returns the header read at open.
    pub fn header(&self) -> &StoreHeader {
        &self.header
    }

    /// Returns the offset of the first frame.
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns the store file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Reads the next frame.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(frame))` if a frame was read
    /// - `Ok(None)` at end of file, including a partial length prefix
    /// - `Err(Truncated)` if the payload runs past the end of file
    pub fn read_next(&mut self) -> StoreResult<Option<Frame>> {
        let offset = self.current_offset;

        let record_length = match read_length_prefix(&mut self.reader)
            .map_err(|e| StoreError::io_error("Failed to read record length", e))?
        {
            Some(len) => len as u64,
            None => {
                self.current_offset = self.file_size;
                return Ok(None);
            }
        };

        let remaining = self.file_size.saturating_sub(offset + LENGTH_PREFIX_SIZE);
        if record_length > remaining {
            return Err(StoreError::truncated_at(
                offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut payload = vec![0u8; record_length as usize];
        self.reader
            .read_exact(&mut payload)
            .map_err(|e| StoreError::from_read("record payload", offset, e))?;

        self.current_offset = offset + LENGTH_PREFIX_SIZE + record_length;

        Ok(Some(Frame { offset, payload }))
    }

    /// Reads every remaining frame.
    pub fn read_all(&mut self) -> StoreResult<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = self.read_next()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Reads the payload of the frame at `offset`.
    ///
    /// Offsets inside the header are rejected the same way as offsets
    /// past the end of the file.
    pub fn read_at(&mut self, offset: u64) -> StoreResult<Vec<u8>> {
        if offset < self.data_start {
            return Err(StoreError::seek_out_of_bounds(offset, self.file_size));
        }
        let payload = read_frame_at(&mut self.reader, offset, self.file_size)?;
        self.current_offset = offset + LENGTH_PREFIX_SIZE + payload.len() as u64;
        Ok(payload)
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) -> StoreResult<()> {
        self.reader
            .seek(SeekFrom::Start(self.data_start))
            .map_err(|e| StoreError::seek_failed(self.data_start, e))?;
        self.current_offset = self.data_start;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::header::{HeaderLayout, SchemaLayout};
    use super::super::writer::write_store;
    use super::*;
    use crate::store::StoreErrorCode;
    use std::fs::{self, OpenOptions};
    use std::io::Cursor;
    use tempfile::TempDir;

    const LINES: [&str; 3] = [
        "00501,Holtsville,NY,Suffolk,40.8154,-73.0451",
        "00601,Adjuntas,PR,Adjuntas,18.1788,-66.7516",
        "99950,Ketchikan,AK,Ketchikan Gateway,55.5401,-131.4153",
    ];

    fn write_sample(temp_dir: &TempDir) -> (PathBuf, Vec<u64>) {
        let path = temp_dir.path().join("zip.dat");
        let header = StoreHeader::new(
            HeaderLayout::Schema(SchemaLayout::zip_codes("zip.idx")),
            LINES.len() as u32,
        );
        let offsets = write_store(&path, &header, &LINES).unwrap();
        (path, offsets)
    }

    #[test]
    fn test_sequential_read_reproduces_payloads() {
        let temp_dir = TempDir::new().unwrap();
        let (path, offsets) = write_sample(&temp_dir);

        let mut reader = StoreReader::open(&path).unwrap();
        assert_eq!(reader.header().record_count, 3);

        let frames = reader.read_all().unwrap();
        assert_eq!(frames.len(), 3);
        for ((frame, line), offset) in frames.iter().zip(LINES).zip(offsets) {
            assert_eq!(frame.payload, line.as_bytes());
            assert_eq!(frame.offset, offset);
        }
        assert!(reader.read_next().unwrap().is_none());
    }

    #[test]
    fn test_read_at_each_offset() {
        let temp_dir = TempDir::new().unwrap();
        let (path, offsets) = write_sample(&temp_dir);

        let mut reader = StoreReader::open(&path).unwrap();
        for (offset, line) in offsets.iter().rev().zip(LINES.iter().rev()) {
            assert_eq!(reader.read_at(*offset).unwrap(), line.as_bytes());
        }
    }

    #[test]
    fn test_reset_restarts_scan() {
        let temp_dir = TempDir::new().unwrap();
        let (path, _) = write_sample(&temp_dir);

        let mut reader = StoreReader::open(&path).unwrap();
        reader.read_all().unwrap();
        reader.reset().unwrap();
        assert_eq!(reader.read_next().unwrap().unwrap().payload, LINES[0].as_bytes());
    }

    #[test]
    fn test_read_at_out_of_bounds() {
        let temp_dir = TempDir::new().unwrap();
        let (path, _) = write_sample(&temp_dir);

        let mut reader = StoreReader::open(&path).unwrap();
        let size = reader.file_size();
        assert_eq!(reader.read_at(size).unwrap_err().code(), StoreErrorCode::Seek);
        assert_eq!(reader.read_at(size + 100).unwrap_err().code(), StoreErrorCode::Seek);
        assert_eq!(reader.read_at(0).unwrap_err().code(), StoreErrorCode::Seek);
    }

    #[test]
    fn test_read_record_at_on_cursor() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(b"abc");
        buf.extend_from_slice(&10u32.to_le_bytes());
        buf.extend_from_slice(b"short");

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_record_at(&mut cursor, 0).unwrap(), b"abc");

        let err = read_record_at(&mut cursor, 7).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::Truncated);

        let err = read_record_at(&mut cursor, 14).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::Truncated);

        let err = read_record_at(&mut cursor, 16).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::Seek);
    }

    #[test]
    fn test_truncated_payload_detected() {
        let temp_dir = TempDir::new().unwrap();
        let (path, offsets) = write_sample(&temp_dir);

        let len = fs::metadata(&path).unwrap().len();
        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 5).unwrap();
        drop(file);

        let mut reader = StoreReader::open(&path).unwrap();
        assert!(reader.read_next().unwrap().is_some());
        assert!(reader.read_next().unwrap().is_some());
        let err = reader.read_next().unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::Truncated);

        let err = reader.read_at(offsets[2]).unwrap_err();
        assert_eq!(err.code(), StoreErrorCode::Truncated);
    }

    #[test]
    fn test_truncated_header_fails_open() {
        let temp_dir = TempDir::new().unwrap();
        let (path, _) = write_sample(&temp_dir);

        let file = OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(3).unwrap();
        drop(file);

        let err = StoreReader::open(&path).err().unwrap();
        assert_eq!(err.code(), StoreErrorCode::Truncated);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = StoreReader::open(&temp_dir.path().join("absent.dat")).err().unwrap();
        assert_eq!(err.code(), StoreErrorCode::Io);
    }
}
