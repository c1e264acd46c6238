//! Conversion from a delimited dataset to a store plus its index
//!
//! Order of operations:
//! 1. Decode every source line; header rows are dropped quietly, other
//!    undecodable rows are logged and dropped
//! 2. Write the canonical form of each accepted row as one frame
//! 3. Scan the new store to build the index
//! 4. Persist the index
//!
//! The index file is only valid for the store written in the same run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

use super::errors::{CatalogError, CatalogResult};
use crate::codec::decode;
use crate::index::{build_index_with_stats, write_index};
use crate::observability::{Logger, ObservationScope, Severity};
use crate::store::{write_store, HeaderLayout, StoreHeader};

/// Outcome of decoding a source dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedRows {
    /// Canonical lines, in source order
    pub lines: Vec<String>,
    /// Non-blank lines seen
    pub rows_read: u64,
    /// Lines recognised as header rows
    pub header_rows: u64,
    /// Lines that failed to decode for any other reason
    pub rows_rejected: u64,
}

/// Counters for one store + index build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub rows_read: u64,
    pub header_rows: u64,
    pub rows_rejected: u64,
    pub records_written: u64,
    pub index_entries: usize,
    /// Stored records left out of the index for a non-numeric key
    pub keys_rejected: u64,
    pub duplicate_keys: u64,
}

/// Reads and decodes a delimited dataset.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the
/// whole file.
pub fn convert_source(source_path: &Path) -> CatalogResult<ConvertedRows> {
    let read_err = |source| CatalogError::Read {
        path: source_path.to_path_buf(),
        source,
    };

    let file = File::open(source_path).map_err(read_err)?;
    let mut reader = BufReader::new(file);

    let mut rows = ConvertedRows::default();
    let mut buf = Vec::new();
    let mut line_number: u64 = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(read_err)? == 0 {
            break;
        }
        line_number += 1;

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        rows.rows_read += 1;

        match decode(&line) {
            Ok(record) => rows.lines.push(record.to_line()),
            Err(e) if e.is_header() => {
                rows.header_rows += 1;
                if Logger::enabled(Severity::Trace) {
                    let line_no = line_number.to_string();
                    Logger::trace("HEADER_ROW_SKIPPED", &[("line", line_no.as_str())]);
                }
            }
            Err(e) => {
                rows.rows_rejected += 1;
                let line_no = line_number.to_string();
                let reason = e.to_string();
                Logger::warn(
                    "RECORD_SKIPPED",
                    &[("line", line_no.as_str()), ("reason", reason.as_str())],
                );
            }
        }
    }

    Ok(rows)
}

/// Writes a store from already canonical lines.
pub fn write_lines(store_path: &Path, layout: HeaderLayout, lines: &[String]) -> CatalogResult<u64> {
    let count = u32::try_from(lines.len()).map_err(|_| CatalogError::TooManyRecords(lines.len()))?;
    let header = StoreHeader::new(layout, count);
    write_store(store_path, &header, lines)?;

    Logger::info(
        "STORE_WRITTEN",
        &[
            ("path", store_path.display().to_string().as_str()),
            ("records", count.to_string().as_str()),
            ("version", header.version().to_string().as_str()),
        ],
    );
    Ok(count as u64)
}

/// Converts a dataset into a store and writes the store's index.
pub fn build_store_and_index(
    source_path: &Path,
    store_path: &Path,
    index_path: &Path,
    layout: HeaderLayout,
) -> CatalogResult<BuildReport> {
    let source = source_path.display().to_string();
    let scope = ObservationScope::with_fields("STORE_BUILD", &[("source", source.as_str())]);

    match run_build(source_path, store_path, index_path, layout) {
        Ok(report) => {
            scope.complete_with_fields(&[
                ("index_entries", report.index_entries.to_string().as_str()),
                ("records", report.records_written.to_string().as_str()),
            ]);
            Ok(report)
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(e)
        }
    }
}

fn run_build(
    source_path: &Path,
    store_path: &Path,
    index_path: &Path,
    layout: HeaderLayout,
) -> CatalogResult<BuildReport> {
    let rows = convert_source(source_path)?;
    let records_written = write_lines(store_path, layout, &rows.lines)?;

    let (index, stats) = build_index_with_stats(store_path)?;
    write_index(&index, index_path)?;

    Ok(BuildReport {
        rows_read: rows.rows_read,
        header_rows: rows.header_rows,
        rows_rejected: rows.rows_rejected,
        records_written,
        index_entries: index.len(),
        keys_rejected: stats.keys_rejected,
        duplicate_keys: stats.duplicates_replaced,
    })
}
