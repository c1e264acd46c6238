//! Per-state extremes report
//!
//! For every state, the postal codes lying furthest east and west (by
//! longitude) and furthest north and south (by latitude). Ties keep the
//! record seen first in store order.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use super::errors::CatalogResult;
use crate::codec::ZipCodeRecord;
use crate::observability::Logger;
use crate::store::StoreReader;

/// One postal code and its coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremePoint {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&ZipCodeRecord> for ExtremePoint {
    fn from(record: &ZipCodeRecord) -> Self {
        Self {
            zip_code: record.zip_code.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

/// Extremes for one state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateExtremes {
    pub easternmost: ExtremePoint,
    pub westernmost: ExtremePoint,
    pub northernmost: ExtremePoint,
    pub southernmost: ExtremePoint,
}

impl StateExtremes {
    fn new(record: &ZipCodeRecord) -> Self {
        let point = ExtremePoint::from(record);
        Self {
            easternmost: point.clone(),
            westernmost: point.clone(),
            northernmost: point.clone(),
            southernmost: point,
        }
    }

    fn observe(&mut self, record: &ZipCodeRecord) {
        if record.longitude > self.easternmost.longitude {
            self.easternmost = record.into();
        }
        if record.longitude < self.westernmost.longitude {
            self.westernmost = record.into();
        }
        if record.latitude > self.northernmost.latitude {
            self.northernmost = record.into();
        }
        if record.latitude < self.southernmost.latitude {
            self.southernmost = record.into();
        }
    }
}

/// Extremes keyed by state code, in state order
pub type ExtremesReport = BTreeMap<String, StateExtremes>;

/// Folds records into per-state extremes.
pub fn extremes_of<'a, I>(records: I) -> ExtremesReport
where
    I: IntoIterator<Item = &'a ZipCodeRecord>,
{
    let mut report = ExtremesReport::new();
    for record in records {
        match report.get_mut(&record.state) {
            Some(extremes) => extremes.observe(record),
            None => {
                report.insert(record.state.clone(), StateExtremes::new(record));
            }
        }
    }
    report
}

/// Computes the extremes report from every decodable record of a store.
///
/// Frames that do not decode are skipped. A frame cut short by end of
/// file is an error.
pub fn state_extremes(store_path: &Path) -> CatalogResult<ExtremesReport> {
    let mut reader = StoreReader::open(store_path)?;

    let mut records = Vec::new();
    let mut skipped: u64 = 0;
    while let Some(frame) = reader.read_next()? {
        match ZipCodeRecord::from_payload(&frame.payload) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }

    let report = extremes_of(&records);

    Logger::info(
        "EXTREMES_COMPUTED",
        &[
            ("records", records.len().to_string().as_str()),
            ("skipped", skipped.to_string().as_str()),
            ("states", report.len().to_string().as_str()),
        ],
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::store::{write_store, HeaderLayout, StoreHeader};
    use tempfile::TempDir;

    fn records(lines: &[&str]) -> Vec<ZipCodeRecord> {
        lines.iter().map(|l| decode(l).unwrap()).collect()
    }

    #[test]
    fn test_extremes_per_state() {
        let records = records(&[
            "10001,New York,NY,New York,40.7484,-73.9967",
            "00501,Holtsville,NY,Suffolk,40.8154,-73.0451",
            "14701,Jamestown,NY,Chautauqua,42.0970,-79.2353",
            "12901,Plattsburgh,NY,Clinton,44.6995,-73.4529",
            "99950,Ketchikan,AK,Ketchikan Gateway,55.5401,-131.4153",
        ]);

        let report = extremes_of(&records);
        assert_eq!(report.len(), 2);

        let ny = &report["NY"];
        assert_eq!(ny.easternmost.zip_code, "00501");
        assert_eq!(ny.westernmost.zip_code, "14701");
        assert_eq!(ny.northernmost.zip_code, "12901");
        assert_eq!(ny.southernmost.zip_code, "10001");

        let ak = &report["AK"];
        assert_eq!(ak.easternmost, ak.westernmost);
        assert_eq!(ak.northernmost.zip_code, "99950");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let records = records(&[
            "00001,First,ZZ,County,10.0,20.0",
            "00002,Second,ZZ,County,10.0,20.0",
        ]);

        let report = extremes_of(&records);
        assert_eq!(report["ZZ"].easternmost.zip_code, "00001");
        assert_eq!(report["ZZ"].southernmost.zip_code, "00001");
    }

    #[test]
    fn test_state_extremes_from_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = temp_dir.path().join("zip.dat");
        let lines = [
            "00501,Holtsville,NY,Suffolk,40.8154,-73.0451",
            "not a record",
            "00601,Adjuntas,PR,Adjuntas,18.1788,-66.7516",
        ];
        let header = StoreHeader::new(HeaderLayout::Minimal, lines.len() as u32);
        write_store(&store, &header, &lines).unwrap();

        let report = state_extremes(&store).unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(report["PR"].northernmost.zip_code, "00601");
    }
}
