//! Typed view over the museum open-access export.
//!
//! Only the members the transforms read are modelled, and every one of them
//! is optional: records in the export are wildly inconsistent.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MuseumRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Content,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub freetext: Freetext,
    #[serde(default)]
    pub indexed_structured: IndexedStructured,
    #[serde(default)]
    pub descriptive_non_repeating: DescriptiveNonRepeating,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freetext {
    #[serde(default)]
    pub place: Vec<LabelledText>,
    #[serde(default)]
    pub date: Vec<LabelledText>,
    #[serde(default)]
    pub name: Vec<LabelledText>,
    #[serde(default)]
    pub object_type: Vec<LabelledText>,
    #[serde(default)]
    pub topic: Vec<LabelledText>,
    #[serde(default)]
    pub physical_description: Vec<LabelledText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelledText {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedStructured {
    #[serde(default)]
    pub geo_location: Vec<GeoLocation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoLocation {
    #[serde(rename = "L1", default)]
    pub l1: Option<TypedText>,
    #[serde(default)]
    pub points: Option<Points>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypedText {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Points {
    #[serde(default)]
    pub point: Option<GeoPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeoPoint {
    #[serde(default)]
    pub latitude: Option<Coordinate>,
    #[serde(default)]
    pub longitude: Option<Coordinate>,
}

/// A coordinate the export writes either as a number or as a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coordinate {
    #[serde(default)]
    pub content: Value,
}

impl Coordinate {
    /// Numeric value, coercing strings. Blank strings and anything
    /// unparsable give `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match &self.content {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The coordinate as text, the way the export wrote it.
    pub fn as_text(&self) -> Option<String> {
        match &self.content {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptiveNonRepeating {
    #[serde(default)]
    pub record_link: Option<String>,
    #[serde(default)]
    pub online_media: Option<OnlineMedia>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OnlineMedia {
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub content: String,
}

impl MuseumRecord {
    pub fn freetext(&self) -> &Freetext {
        &self.content.freetext
    }

    pub fn first_geo_location(&self) -> Option<&GeoLocation> {
        self.content.indexed_structured.geo_location.first()
    }

    pub fn first_point(&self) -> Option<&GeoPoint> {
        self.first_geo_location()?.points.as_ref()?.point.as_ref()
    }

    pub fn record_link(&self) -> Option<&str> {
        self.content
            .descriptive_non_repeating
            .record_link
            .as_deref()
    }

    pub fn first_media(&self) -> Option<&str> {
        self.content
            .descriptive_non_repeating
            .online_media
            .as_ref()?
            .media
            .first()
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_parses() {
        let record: MuseumRecord = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(record.freetext().place.is_empty());
        assert!(record.first_point().is_none());
        assert!(record.first_media().is_none());
    }

    #[test]
    fn coordinates_coerce() {
        let json = r#"{"id":"x","content":{"indexedStructured":{"geoLocation":[
            {"L1":{"type":"Continent","content":"Antarctica"},
             "points":{"point":{"latitude":{"content":"-76.5"},"longitude":{"content":159.2}}}}]}}}"#;
        let record: MuseumRecord = serde_json::from_str(json).unwrap();
        let point = record.first_point().unwrap();
        assert_eq!(point.latitude.as_ref().and_then(Coordinate::as_f64), Some(-76.5));
        assert_eq!(point.longitude.as_ref().and_then(Coordinate::as_f64), Some(159.2));
        assert_eq!(
            point.longitude.as_ref().and_then(Coordinate::as_text).as_deref(),
            Some("159.2")
        );
    }
}
