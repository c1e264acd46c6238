//! Store to CSV export
//!
//! Reads up to `record_count` frames and writes one CSV row per frame,
//! prefixed with the stored payload length. A frame that does not decode
//! is logged and skipped. A frame cut short by end of file ends the
//! export.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::errors::{CatalogError, CatalogResult};
use crate::codec::ZipCodeRecord;
use crate::observability::Logger;
use crate::store::StoreReader;

/// CSV header row written before the records
pub const EXPORT_HEADER: &str = "RecordLength,ZipCode,PlaceName,State,County,Latitude,Longitude";

/// Counters for one export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    /// Record count declared by the store header
    pub declared: u32,
    pub records_written: u64,
    pub records_failed: u64,
    /// Whether the store ended before `declared` frames were read
    pub stopped_early: bool,
}

/// Exports a store to a CSV file at `output_path`.
pub fn export_to_csv(store_path: &Path, output_path: &Path) -> CatalogResult<ExportReport> {
    let write_err = |source| CatalogError::Write {
        path: output_path.to_path_buf(),
        source,
    };

    let mut reader = StoreReader::open(store_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
    }
    let file = File::create(output_path).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    let report = export_frames(&mut reader, &mut out).map_err(|e| match e {
        ExportFailure::Store(e) => CatalogError::Store(e),
        ExportFailure::Write(source) => write_err(source),
    })?;
    out.flush().map_err(write_err)?;

    Logger::info(
        "EXPORT_COMPLETE",
        &[
            ("declared", report.declared.to_string().as_str()),
            ("failed", report.records_failed.to_string().as_str()),
            ("output", output_path.display().to_string().as_str()),
            ("records", report.records_written.to_string().as_str()),
        ],
    );

    Ok(report)
}

enum ExportFailure {
    Store(crate::store::StoreError),
    Write(std::io::Error),
}

/// Writes the CSV rows for every frame of `reader` to `out`.
fn export_frames<W: Write>(
    reader: &mut StoreReader,
    out: &mut W,
) -> Result<ExportReport, ExportFailure> {
    let mut report = ExportReport {
        declared: reader.header().record_count,
        ..ExportReport::default()
    };

    writeln!(out, "{}", EXPORT_HEADER).map_err(ExportFailure::Write)?;

    for position in 0..report.declared {
        let frame = match reader.read_next() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                report.stopped_early = true;
                Logger::warn(
                    "EXPORT_STOPPED",
                    &[
                        ("read", position.to_string().as_str()),
                        ("reason", "end of file before declared record count"),
                    ],
                );
                break;
            }
            Err(e) if e.code().is_format() => {
                report.stopped_early = true;
                Logger::warn(
                    "EXPORT_STOPPED",
                    &[
                        ("read", position.to_string().as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
                break;
            }
            Err(e) => return Err(ExportFailure::Store(e)),
        };

        match ZipCodeRecord::from_payload(&frame.payload) {
            Ok(record) => {
                writeln!(out, "{},{}", frame.payload.len(), record.to_line())
                    .map_err(ExportFailure::Write)?;
                report.records_written += 1;
            }
            Err(e) => {
                report.records_failed += 1;
                Logger::warn(
                    "RECORD_SKIPPED",
                    &[
                        ("byte_offset", frame.offset.to_string().as_str()),
                        ("reason", e.to_string().as_str()),
                    ],
                );
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{write_store, HeaderLayout, StoreHeader};
    use std::fs::OpenOptions;
    use tempfile::TempDir;

    const LINES: [&str; 3] = [
        "00501,Holtsville,NY,Suffolk,40.8154,-73.0451",
        "garbage",
        "99950,Ketchikan,AK,Ketchikan Gateway,55.5401,-131.4153",
    ];

    #[test]
    fn test_export_writes_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("zip.dat");
        let output = temp_dir.path().join("out/zips.csv");
        let header = StoreHeader::new(HeaderLayout::Minimal, 3);
        write_store(&store, &header, &LINES).unwrap();

        let report = export_to_csv(&store, &output).unwrap();
        assert_eq!(report.declared, 3);
        assert_eq!(report.records_written, 2);
        assert_eq!(report.records_failed, 1);
        assert!(!report.stopped_early);

        let text = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows[0], EXPORT_HEADER);
        assert_eq!(rows[1], format!("{},{}", LINES[0].len(), LINES[0]));
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_export_stops_on_short_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("zip.dat");
        let output = temp_dir.path().join("zips.csv");
        let header = StoreHeader::new(HeaderLayout::Minimal, 2);
        write_store(&store, &header, &[LINES[0], LINES[2]]).unwrap();

        let len = fs::metadata(&store).unwrap().len();
        let file = OpenOptions::new().write(true).open(&store).unwrap();
        file.set_len(len - 5).unwrap();
        drop(file);

        let report = export_to_csv(&store, &output).unwrap();
        assert_eq!(report.records_written, 1);
        assert!(report.stopped_early);
    }

    #[test]
    fn test_export_missing_store() {
        let temp_dir = TempDir::new().unwrap();
        let err = export_to_csv(
            &temp_dir.path().join("absent.dat"),
            &temp_dir.path().join("zips.csv"),
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Store(_)));
    }
}
