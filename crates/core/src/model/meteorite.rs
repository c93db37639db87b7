use serde::{Deserialize, Serialize};

/// Share of the collection attributed to one continent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareStats {
    pub length: usize,
    pub length_ratio: f64,
}

/// `[continent, {length, length_ratio}]` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationShare(pub String, pub ShareStats);

impl LocationShare {
    pub fn continent(&self) -> &str {
        &self.0
    }

    pub fn ratio(&self) -> f64 {
        self.1.length_ratio
    }
}

/// `[year, count]` on the wire. The year is kept as the museum wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount(pub String, pub usize);

/// Where a specimen was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundSpot {
    pub id: String,
    pub continent: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Placeholder for a field the museum record does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// A specimen as extracted from the museum export, before cleansing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRow {
    pub id: String,
    pub title: String,
    pub latitude: String,
    pub longitude: String,
    pub weight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A cleansed specimen ready for the histograms and heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meteorite {
    pub id: String,
    pub title: String,
    pub latitude: f64,
    pub longitude: f64,
    pub weight_gram: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}
