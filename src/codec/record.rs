//! Postal-code record type and its delimited text form
//!
//! ```text
//! ZipCode,PlaceName,State,County,Latitude,Longitude
//! 00501,Holtsville,NY,Suffolk,40.8154,-73.0451
//! ```

use serde::Serialize;

use super::errors::{DecodeError, DecodeResult};

/// Field separator in source lines and store payloads
pub const FIELD_DELIMITER: char = ',';

/// Number of fields in one record
pub const FIELD_COUNT: usize = 6;

/// Column limits, in characters
pub const ZIP_CODE_LENGTH: usize = 5;
pub const PLACE_NAME_LENGTH: usize = 50;
pub const STATE_LENGTH: usize = 2;
pub const COUNTY_LENGTH: usize = 50;
pub const LAT_LONG_LENGTH: usize = 10;

const FIELD_LIMITS: [usize; FIELD_COUNT] = [
    ZIP_CODE_LENGTH,
    PLACE_NAME_LENGTH,
    STATE_LENGTH,
    COUNTY_LENGTH,
    LAT_LONG_LENGTH,
    LAT_LONG_LENGTH,
];

/// One decoded postal-code row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipCodeRecord {
    /// Natural key; digits only for rows that can be indexed
    pub zip_code: String,
    pub place_name: String,
    pub state: String,
    pub county: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ZipCodeRecord {
    /// Decodes raw store payload bytes.
    pub fn from_payload(payload: &[u8]) -> DecodeResult<Self> {
        let line = std::str::from_utf8(payload).map_err(|_| DecodeError::InvalidUtf8)?;
        decode(line)
    }

    /// Canonical delimited form of this record.
    pub fn to_line(&self) -> String {
        encode(self)
    }
}

/// Strips surrounding whitespace and quote characters.
fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

fn truncate_chars(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

/// Normal form of the zip field: quotes and all whitespace removed, then
/// cut to the column limit. `decode` and `extract_key` both use it, so a
/// stored record always decodes to the key it is indexed under.
fn normalize_zip(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '"' && !c.is_whitespace())
        .take(ZIP_CODE_LENGTH)
        .collect()
}

fn looks_numeric(value: &str) -> bool {
    value
        .chars()
        .next()
        .map(|c| c == '-' || c.is_ascii_digit())
        .unwrap_or(false)
}

fn parse_coordinate(field: &'static str, value: &str) -> DecodeResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DecodeError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

/// Decodes one delimited line into a record.
///
/// Extra fields past the sixth are ignored. A row whose first field
/// mentions `ZIP`, or whose coordinates do not start like numbers, is a
/// header row.
pub fn decode(line: &str) -> DecodeResult<ZipCodeRecord> {
    let mut fields: Vec<String> = Vec::with_capacity(FIELD_COUNT);
    for (position, (raw, limit)) in line.split(FIELD_DELIMITER).zip(FIELD_LIMITS).enumerate() {
        if position == 0 {
            fields.push(normalize_zip(raw));
        } else {
            fields.push(truncate_chars(clean_field(raw), limit));
        }
    }

    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount {
            expected: FIELD_COUNT,
            found: fields.len(),
        });
    }

    if fields[0].to_uppercase().contains("ZIP")
        || !looks_numeric(&fields[4])
        || !looks_numeric(&fields[5])
    {
        return Err(DecodeError::HeaderRow);
    }

    let latitude = parse_coordinate("latitude", &fields[4])?;
    let longitude = parse_coordinate("longitude", &fields[5])?;

    let mut fields = fields.into_iter();
    Ok(ZipCodeRecord {
        zip_code: fields.next().unwrap_or_default(),
        place_name: fields.next().unwrap_or_default(),
        state: fields.next().unwrap_or_default(),
        county: fields.next().unwrap_or_default(),
        latitude,
        longitude,
    })
}

/// Encodes a record as a delimited line without a trailing newline.
pub fn encode(record: &ZipCodeRecord) -> String {
    format!(
        "{zip}{d}{place}{d}{state}{d}{county}{d}{lat}{d}{lon}",
        d = FIELD_DELIMITER,
        zip = record.zip_code,
        place = record.place_name,
        state = record.state,
        county = record.county,
        lat = record.latitude,
        lon = record.longitude,
    )
}

/// Extracts the index key from a raw payload.
///
/// Applies the same zip normalization as [`decode`] to the first
/// delimited field and accepts the result only if it is non-empty and
/// all ASCII digits. Payloads that are not UTF-8 cannot be decoded, so
/// they have no key either.
pub fn extract_key(payload: &[u8]) -> Option<String> {
    let line = std::str::from_utf8(payload).ok()?;
    let first = line.split(FIELD_DELIMITER).next().unwrap_or_default();
    let key = normalize_zip(first);

    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        Some(key)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLTSVILLE: &str = "00501,Holtsville,NY,Suffolk,40.8154,-73.0451";

    #[test]
    fn test_decode_valid_line() {
        let record = decode(HOLTSVILLE).unwrap();
        assert_eq!(record.zip_code, "00501");
        assert_eq!(record.place_name, "Holtsville");
        assert_eq!(record.state, "NY");
        assert_eq!(record.county, "Suffolk");
        assert_eq!(record.latitude, 40.8154);
        assert_eq!(record.longitude, -73.0451);
    }

    #[test]
    fn test_decode_strips_quotes_and_whitespace() {
        let record = decode("\"00601\" , \"Adjuntas\",PR, Adjuntas ,18.1788,-66.7516\r").unwrap();
        assert_eq!(record.zip_code, "00601");
        assert_eq!(record.place_name, "Adjuntas");
        assert_eq!(record.county, "Adjuntas");
        assert_eq!(record.longitude, -66.7516);
    }

    #[test]
    fn test_decode_truncates_long_fields() {
        let line = "1234567,Somewhere,NYC,County,12.3456789012,-1.23456789012";
        let record = decode(line).unwrap();
        assert_eq!(record.zip_code, "12345");
        assert_eq!(record.state, "NY");
        assert_eq!(record.latitude, 12.3456789);
        assert_eq!(record.longitude, -1.2345678);
    }

    #[test]
    fn test_decode_ignores_extra_fields() {
        let record = decode("00501,Holtsville,NY,Suffolk,40.8154,-73.0451,extra").unwrap();
        assert_eq!(record.longitude, -73.0451);
    }

    #[test]
    fn test_decode_too_few_fields() {
        let err = decode("00501,Holtsville,NY").unwrap_err();
        assert_eq!(
            err,
            DecodeError::FieldCount {
                expected: FIELD_COUNT,
                found: 3
            }
        );
    }

    #[test]
    fn test_decode_detects_header_row() {
        let err = decode("ZipCode,PlaceName,State,County,Lat,Long").unwrap_err();
        assert!(err.is_header());

        let err = decode("12345,Name,ST,County,Lat,Long").unwrap_err();
        assert!(err.is_header());
    }

    #[test]
    fn test_decode_rejects_bad_coordinate() {
        let err = decode("00501,Holtsville,NY,Suffolk,4x.81,-73.0451").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidCoordinate {
                field: "latitude",
                ..
            }
        ));
    }

    #[test]
    fn test_encode_decode_is_stable() {
        let record = decode(HOLTSVILLE).unwrap();
        assert_eq!(encode(&record), HOLTSVILLE);
        assert_eq!(decode(&record.to_line()).unwrap(), record);
    }

    #[test]
    fn test_from_payload_rejects_invalid_utf8() {
        let err = ZipCodeRecord::from_payload(&[0xff, 0xfe, b',']).unwrap_err();
        assert_eq!(err, DecodeError::InvalidUtf8);
    }

    #[test]
    fn test_extract_key() {
        assert_eq!(extract_key(HOLTSVILLE.as_bytes()), Some("00501".to_string()));
        assert_eq!(extract_key(b"\" 00601 \",Adjuntas"), Some("00601".to_string()));
        assert_eq!(extract_key(b",Nowhere,XX"), None);
        assert_eq!(extract_key(b"A0501,Nowhere"), None);
        assert_eq!(extract_key(b"\"\",Nowhere"), None);
        assert_eq!(extract_key(b""), None);
        assert_eq!(extract_key(&[b'0', 0xff, b',']), None);
    }

    #[test]
    fn test_key_matches_decoded_zip() {
        let lines = [
            "0 501,Holtsville,NY,Suffolk,40.8154,-73.0451",
            "00\"601,Adjuntas,PR,Adjuntas,18.1788,-66.7516",
            " \" 99950 \" ,Ketchikan,AK,Ketchikan Gateway,55.5401,-131.4153",
            "1234567,Somewhere,NY,County,12.3456,-1.2345",
        ];

        for line in lines {
            let record = decode(line).unwrap();
            let key = extract_key(line.as_bytes()).unwrap();
            assert_eq!(record.zip_code, key, "line {:?}", line);
        }
        assert_eq!(decode(lines[0]).unwrap().zip_code, "0501");
        assert_eq!(decode(lines[1]).unwrap().zip_code, "00601");
        assert_eq!(decode(lines[3]).unwrap().zip_code, "12345");
    }
}
