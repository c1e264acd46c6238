//! Key lookups against a store and its index
//!
//! A lookup resolves the key through the in-memory index, seeks to the
//! frame, and decodes the payload. A key that is not indexed is
//! `Ok(None)`, not an error.
//!
//! `Catalog::open` is the rebuild path: a missing index is rebuilt from
//! the store, and a missing store is rebuilt from the configured source.

use std::path::Path;

use super::build::{build_store_and_index, BuildReport};
use super::errors::{CatalogError, CatalogResult};
use crate::codec::ZipCodeRecord;
use crate::config::Config;
use crate::index::{build_index, read_index, write_index, OffsetIndex, StoreOffset};
use crate::observability::{Logger, ObservationScope};
use crate::store::{StoreHeader, StoreReader};

/// Looks up one key using the index and store files on disk.
pub fn lookup_by_key(
    index_path: &Path,
    store_path: &Path,
    key: &str,
) -> CatalogResult<Option<ZipCodeRecord>> {
    let index = read_index(index_path)?;
    let Some(offset) = index.find_offset(key) else {
        return Ok(None);
    };

    let mut reader = StoreReader::open(store_path)?;
    fetch_record(&mut reader, key, offset).map(Some)
}

/// Reads and decodes the frame at `offset`, checking it carries `key`.
fn fetch_record(
    reader: &mut StoreReader,
    key: &str,
    offset: StoreOffset,
) -> CatalogResult<ZipCodeRecord> {
    let payload = reader.read_at(offset)?;
    let record = ZipCodeRecord::from_payload(&payload)
        .map_err(|source| CatalogError::Decode { offset, source })?;

    if record.zip_code != key {
        return Err(CatalogError::StaleIndex {
            key: key.to_string(),
            found: record.zip_code,
            offset,
        });
    }

    Ok(record)
}

/// An opened store with its index loaded.
///
/// The index is read-only for the life of the catalog.
pub struct Catalog {
    index: OffsetIndex,
    reader: StoreReader,
}

impl Catalog {
    /// Opens the store and index named by `config`, rebuilding what is
    /// missing.
    ///
    /// - Store missing, source configured and present: full rebuild
    /// - Store missing, no usable source: `NotInitialized`
    /// - Index missing: rebuilt from the store and persisted
    /// - Index present but malformed: error, no silent rebuild
    pub fn open(config: &Config) -> CatalogResult<Self> {
        if !config.store_path.exists() {
            match &config.source_path {
                Some(source) if source.exists() => {
                    Logger::warn(
                        "STORE_MISSING",
                        &[("store", config.store_path.display().to_string().as_str())],
                    );
                    Self::rebuild(config)?;
                }
                _ => return Err(CatalogError::NotInitialized(config.store_path.clone())),
            }
        }

        let index = match read_index(&config.index_path) {
            Ok(index) => index,
            Err(e) if e.is_not_found() => Self::rebuild_index(config)?,
            Err(e) => return Err(e.into()),
        };

        let reader = StoreReader::open(&config.store_path)?;

        Ok(Self { index, reader })
    }

    /// Rebuilds store and index from the configured source dataset.
    pub fn rebuild(config: &Config) -> CatalogResult<BuildReport> {
        let source = config
            .source_path
            .as_deref()
            .ok_or_else(|| CatalogError::NotInitialized(config.store_path.clone()))?;

        build_store_and_index(
            source,
            &config.store_path,
            &config.index_path,
            config.header_layout(),
        )
    }

    /// Rebuilds and persists the index from the existing store.
    pub fn rebuild_index(config: &Config) -> CatalogResult<OffsetIndex> {
        let store = config.store_path.display().to_string();
        let scope = ObservationScope::with_fields("INDEX_REBUILD", &[("store", store.as_str())]);

        let result = build_index(&config.store_path)
            .and_then(|index| write_index(&index, &config.index_path).map(|_| index));

        match result {
            Ok(index) => {
                let entries = index.len().to_string();
                scope.complete_with_fields(&[("entries", entries.as_str())]);
                Ok(index)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e.into())
            }
        }
    }

    /// Looks up one key.
    pub fn lookup(&mut self, key: &str) -> CatalogResult<Option<ZipCodeRecord>> {
        match self.index.find_offset(key) {
            Some(offset) => fetch_record(&mut self.reader, key, offset).map(Some),
            None => Ok(None),
        }
    }

    /// Looks up several keys, preserving their order.
    pub fn lookup_many<S: AsRef<str>>(
        &mut self,
        keys: &[S],
    ) -> CatalogResult<Vec<(String, Option<ZipCodeRecord>)>> {
        keys.iter()
            .map(|key| {
                let key = key.as_ref();
                self.lookup(key).map(|record| (key.to_string(), record))
            })
            .collect()
    }

    /// The loaded index
    pub fn index(&self) -> &OffsetIndex {
        &self.index
    }

    /// Number of indexed keys
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Header of the opened store
    pub fn header(&self) -> &StoreHeader {
        self.reader.header()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{write_store, HeaderLayout};
    use std::fs;
    use tempfile::TempDir;

    const LINES: [&str; 3] = [
        "00501,Holtsville,NY,Suffolk,40.8154,-73.0451",
        "00601,Adjuntas,PR,Adjuntas,18.1788,-66.7516",
        "99950,Ketchikan,AK,Ketchikan Gateway,55.5401,-131.4153",
    ];

    fn config(temp_dir: &TempDir) -> Config {
        Config::with_paths(
            temp_dir.path().join("zip.dat"),
            temp_dir.path().join("zip.idx"),
        )
    }

    fn write_sample_store(config: &Config) {
        let header = StoreHeader::new(HeaderLayout::Minimal, LINES.len() as u32);
        write_store(&config.store_path, &header, &LINES).unwrap();
    }

    #[test]
    fn test_lookup_by_key() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        write_sample_store(&config);
        write_index(&build_index(&config.store_path).unwrap(), &config.index_path).unwrap();

        let record = lookup_by_key(&config.index_path, &config.store_path, "00601")
            .unwrap()
            .unwrap();
        assert_eq!(record.place_name, "Adjuntas");

        let missing = lookup_by_key(&config.index_path, &config.store_path, "00000").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_open_rebuilds_missing_index() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        write_sample_store(&config);
        assert!(!config.index_path.exists());

        let mut catalog = Catalog::open(&config).unwrap();
        assert!(config.index_path.exists());
        assert_eq!(catalog.index_len(), 3);
        assert_eq!(catalog.lookup("99950").unwrap().unwrap().state, "AK");
    }

    #[test]
    fn test_open_rebuilds_missing_store_from_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("zips.csv");
        fs::write(&source, LINES.join("\n")).unwrap();

        let config = Config {
            source_path: Some(source),
            ..config(&temp_dir)
        };

        let catalog = Catalog::open(&config).unwrap();
        assert_eq!(catalog.index_len(), 3);
        assert_eq!(catalog.header().version(), 2);
    }

    #[test]
    fn test_open_without_store_or_source() {
        let temp_dir = TempDir::new().unwrap();
        let err = Catalog::open(&config(&temp_dir)).err().unwrap();
        assert!(matches!(err, CatalogError::NotInitialized(_)));
    }

    #[test]
    fn test_open_rejects_corrupt_index() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        write_sample_store(&config);
        fs::write(&config.index_path, [5u8, 0, 0, 0, 1]).unwrap();

        let err = Catalog::open(&config).err().unwrap();
        assert!(matches!(err, CatalogError::Index(_)));
    }

    #[test]
    fn test_stale_index_detected() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        write_sample_store(&config);
        let index = build_index(&config.store_path).unwrap();
        let offsets: Vec<u64> = index.iter().map(|(_, o)| o).collect();

        let swapped: OffsetIndex = [("00501", offsets[1])].into_iter().collect();
        write_index(&swapped, &config.index_path).unwrap();

        let err = lookup_by_key(&config.index_path, &config.store_path, "00501").unwrap_err();
        assert!(matches!(err, CatalogError::StaleIndex { .. }));
    }

    #[test]
    fn test_lookup_many_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let config = config(&temp_dir);
        write_sample_store(&config);

        let mut catalog = Catalog::open(&config).unwrap();
        let results = catalog.lookup_many(&["99950", "", "00501"]).unwrap();
        assert_eq!(results[0].0, "99950");
        assert!(results[0].1.is_some());
        assert!(results[1].1.is_none());
        assert_eq!(results[2].1.as_ref().unwrap().place_name, "Holtsville");
    }
}
