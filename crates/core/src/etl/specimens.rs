//! Specimen extraction and cleansing.
//!
//! Extraction keeps the museum's text as-is, with `"N/A"` for anything
//! missing. Cleansing drops rows without coordinates or weight, converts
//! the weight to grams and reduces the collection date to a year.

use thiserror::Error;

use super::MuseumRecord;
use super::museum::Coordinate;
use crate::model::{Meteorite, NOT_AVAILABLE, SpecimenRow};

#[derive(Debug, Error, PartialEq)]
pub enum SpecimenError {
    #[error("{id}: invalid coordinate {value:?}")]
    InvalidCoordinate { id: String, value: String },
    #[error("invalid weight {0:?}")]
    InvalidWeight(String),
    #[error("unknown weight unit {0:?}")]
    UnknownUnit(String),
    #[error("invalid collection date {0:?}")]
    InvalidDate(String),
}

pub fn extract_specimen(record: &MuseumRecord) -> SpecimenRow {
    let point = record.first_point();
    let coordinate = |c: Option<&Coordinate>| {
        c.and_then(Coordinate::as_text)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };
    let descriptions = &record.freetext().physical_description;
    let weight = descriptions
        .iter()
        .find(|d| d.label.eq_ignore_ascii_case("weight"))
        .or_else(|| descriptions.first())
        .map(|d| d.content.trim())
        .filter(|w| !w.is_empty())
        .unwrap_or(NOT_AVAILABLE);

    SpecimenRow {
        id: record.id.clone(),
        title: record.title.clone(),
        latitude: coordinate(point.and_then(|p| p.latitude.as_ref())),
        longitude: coordinate(point.and_then(|p| p.longitude.as_ref())),
        weight: weight.to_string(),
        collection_date: record.freetext().date.first().map(|d| d.content.clone()),
        link: record.record_link().map(str::to_string),
    }
}

pub fn extract_specimens(records: &[MuseumRecord]) -> Vec<SpecimenRow> {
    records.iter().map(extract_specimen).collect()
}

/// Convert `"<number> <unit>"` to grams. Units are `g`, `kg` and `mg`, in
/// any case; the space is optional.
pub fn weight_to_grams(weight: &str) -> Result<f64, SpecimenError> {
    let invalid = || SpecimenError::InvalidWeight(weight.to_string());
    let number_end = weight
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(weight.len());
    if number_end == 0 {
        return Err(invalid());
    }
    let value: f64 = weight[..number_end].parse().map_err(|_| invalid())?;

    let rest = weight[number_end..].trim_start();
    let unit_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let unit = rest[..unit_end].to_lowercase();
    match unit.as_str() {
        "g" => Ok(value),
        "kg" => Ok(value * 1000.0),
        "mg" => Ok(value / 1000.0),
        "" => Err(invalid()),
        _ => Err(SpecimenError::UnknownUnit(unit)),
    }
}

/// The leading four-digit year of a collection date.
pub fn collection_year(date: &str) -> Result<i32, SpecimenError> {
    let digits = date.get(..4).filter(|d| d.bytes().all(|b| b.is_ascii_digit()));
    digits
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| SpecimenError::InvalidDate(date.to_string()))
}

fn round_to_milligram(grams: f64) -> f64 {
    (grams * 1000.0).round() / 1000.0
}

/// Cleanse one row. `Ok(None)` means the row lacks coordinates or weight.
pub fn cleanse_row(row: &SpecimenRow) -> Result<Option<Meteorite>, SpecimenError> {
    if [&row.latitude, &row.longitude, &row.weight]
        .iter()
        .any(|v| v.as_str() == NOT_AVAILABLE)
    {
        return Ok(None);
    }
    let coordinate = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| SpecimenError::InvalidCoordinate {
                id: row.id.clone(),
                value: value.to_string(),
            })
    };
    let latitude = coordinate(&row.latitude)?;
    let longitude = coordinate(&row.longitude)?;
    let weight_gram = round_to_milligram(weight_to_grams(&row.weight)?);
    let collection_year = row
        .collection_date
        .as_deref()
        .map(collection_year)
        .transpose()?;

    Ok(Some(Meteorite {
        id: row.id.clone(),
        title: row.title.clone(),
        latitude,
        longitude,
        weight_gram,
        collection_year,
        link: row.link.clone(),
    }))
}

/// Cleanse every row, logging and skipping the ones that fail.
pub fn cleanse(rows: &[SpecimenRow]) -> Vec<Meteorite> {
    let mut skipped = 0usize;
    let cleansed: Vec<Meteorite> = rows
        .iter()
        .filter_map(|row| match cleanse_row(row) {
            Ok(meteorite) => meteorite,
            Err(error) => {
                tracing::warn!(id = %row.id, %error, "skipping specimen");
                skipped += 1;
                None
            }
        })
        .collect();
    tracing::debug!(kept = cleansed.len(), skipped, "cleansed specimens");
    cleansed
}

/// Like [`cleanse`] but fails on the first invalid row.
pub fn cleanse_strict(rows: &[SpecimenRow]) -> Result<Vec<Meteorite>, SpecimenError> {
    let mut cleansed = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(meteorite) = cleanse_row(row)? {
            cleansed.push(meteorite);
        }
    }
    Ok(cleansed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::parse_records;

    fn row(lat: &str, lon: &str, weight: &str, date: Option<&str>) -> SpecimenRow {
        SpecimenRow {
            id: "nmnh-1".into(),
            title: "ALH 84001".into(),
            latitude: lat.into(),
            longitude: lon.into(),
            weight: weight.into(),
            collection_date: date.map(String::from),
            link: None,
        }
    }

    #[test]
    fn weights_convert_to_grams() {
        assert_eq!(weight_to_grams("32.988 g"), Ok(32.988));
        assert_eq!(weight_to_grams("0.5 kg"), Ok(500.0));
        assert_eq!(weight_to_grams("250mg"), Ok(0.25));
        assert_eq!(weight_to_grams("2 KG"), Ok(2000.0));
        assert_eq!(
            weight_to_grams("3 lb"),
            Err(SpecimenError::UnknownUnit("lb".into()))
        );
        assert!(weight_to_grams("heavy").is_err());
        assert!(weight_to_grams("1.2.3 g").is_err());
        assert!(weight_to_grams("12").is_err());
    }

    #[test]
    fn years_are_leading_digits() {
        assert_eq!(collection_year("1984-12-27"), Ok(1984));
        assert_eq!(collection_year("2003"), Ok(2003));
        assert!(collection_year("Dec 1984").is_err());
        assert!(collection_year("84").is_err());
    }

    #[test]
    fn cleansing_rules() {
        let good = cleanse_row(&row("-76.9", "159.4", "1.23456 kg", Some("1984")))
            .unwrap()
            .unwrap();
        assert_eq!(good.weight_gram, 1234.56);
        assert_eq!(good.collection_year, Some(1984));
        assert_eq!(good.latitude, -76.9);

        assert_eq!(cleanse_row(&row("N/A", "1", "1 g", None)), Ok(None));
        assert_eq!(
            cleanse_row(&row("1", "2", "1 g", None)).unwrap().unwrap().collection_year,
            None
        );
        assert!(cleanse_row(&row("1", "2", "1 g", Some("undated"))).is_err());

        let rows = vec![
            row("1", "2", "1 g", Some("1999")),
            row("1", "2", "1 g", Some("undated")),
            row("N/A", "2", "1 g", None),
            row("x", "2", "1 g", None),
        ];
        assert_eq!(cleanse(&rows).len(), 1);
        assert!(cleanse_strict(&rows).is_err());
    }

    #[test]
    fn extraction_fills_missing_with_placeholder() {
        let data = br#"[
            {"id":"a","title":"Allan Hills 84001","content":{
                "freetext":{"date":[{"content":"1984"}],
                            "physicalDescription":[{"label":"Dimensions","content":"4 x 5 cm"},{"label":"Weight","content":"1930.9 g"}]},
                "indexedStructured":{"geoLocation":[{"points":{"point":{"latitude":{"content":"-76.9"},"longitude":{"content":"159.4"}}}}]},
                "descriptiveNonRepeating":{"record_link":"http://n2t.net/ark:/65665/3"}}},
            {"id":"b"}
        ]"#;
        let rows = extract_specimens(&parse_records(data).unwrap());
        assert_eq!(rows[0].weight, "1930.9 g");
        assert_eq!(rows[0].latitude, "-76.9");
        assert_eq!(rows[0].collection_date.as_deref(), Some("1984"));
        assert_eq!(rows[0].link.as_deref(), Some("http://n2t.net/ark:/65665/3"));
        assert_eq!(rows[1].latitude, NOT_AVAILABLE);
        assert_eq!(rows[1].weight, NOT_AVAILABLE);
    }
}
