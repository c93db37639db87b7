//! One-shot transforms from the museum export into the fixtures the story
//! and gallery render.
//!
//! Every transform is a pure function over parsed records. Records that do
//! not fit are logged and skipped; only unreadable input fails a run.

pub mod collected_year;
pub mod found_spots;
pub mod gallery;
pub mod geojson;
pub mod locations;
pub mod museum;
pub mod pages;
pub mod portraits;
pub mod specimens;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use museum::MuseumRecord;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a top-level array of records")]
    NotAnArray,
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("input: {0}")]
    Input(#[from] InputError),
    #[error("specimens: {0}")]
    Specimen(#[from] specimens::SpecimenError),
    #[error("geojson: {0}")]
    GeoJson(#[from] geojson::GeoJsonError),
    #[error("portraits: {0}")]
    Portrait(#[from] portraits::PortraitError),
    #[error("pages: {0}")]
    Pages(#[from] pages::PageError),
}

/// Parse a JSON array, keeping the elements that deserialize as `T`.
///
/// Elements that don't are logged with their position and dropped.
pub fn parse_array<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>, InputError> {
    let value: Value = serde_json::from_slice(data)?;
    let Value::Array(items) = value else {
        return Err(InputError::NotAnArray);
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(index, %error, "skipping malformed record");
                None
            }
        })
        .collect();

    if parsed.len() < total {
        tracing::info!(kept = parsed.len(), total, "parsed records with some skipped");
    }
    Ok(parsed)
}

/// Parse the raw museum export.
pub fn parse_records(data: &[u8]) -> Result<Vec<MuseumRecord>, InputError> {
    parse_array(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_records_are_skipped() {
        let data = br#"[{"id":"a"},{"title":"no id"},{"id":"b"},7]"#;
        let records = parse_records(data).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn non_array_input_is_rejected() {
        assert!(matches!(
            parse_records(br#"{"id":"a"}"#),
            Err(InputError::NotAnArray)
        ));
        assert!(matches!(parse_records(b"not json"), Err(InputError::Json(_))));
    }

    #[test]
    fn input_errors_convert() {
        let err: EtlError = InputError::NotAnArray.into();
        assert_eq!(err.to_string(), "input: expected a top-level array of records");
    }
}
