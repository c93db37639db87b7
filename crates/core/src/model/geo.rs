use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A GeoJSON position. Only the first two ordinates are used; any extra
/// (altitude) is carried through untouched.
pub type Position = Vec<f64>;
pub type Ring = Vec<Position>;
pub type PolygonRings = Vec<Ring>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Polygon { coordinates: PolygonRings },
    MultiPolygon { coordinates: Vec<PolygonRings> },
    /// Points, lines and collections are not drawn.
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// Every polygon in the geometry, as ring lists.
    pub fn polygons(&self) -> Vec<&PolygonRings> {
        match self {
            Geometry::Polygon { coordinates } => vec![coordinates],
            Geometry::MultiPolygon { coordinates } => coordinates.iter().collect(),
            Geometry::Unsupported => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn number_property(&self, key: &str) -> Option<f64> {
        self.properties.as_ref()?.get(key)?.as_f64()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    /// Legacy named CRS member; dropped by the ETL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Value>,
}

pub fn xy(position: &[f64]) -> Option<(f64, f64)> {
    match position {
        [x, y, ..] => Some((*x, *y)),
        _ => None,
    }
}

/// Shoelace signed area; positive for counter-clockwise rings with y up.
pub fn signed_area(ring: &[Position]) -> f64 {
    let points: Vec<(f64, f64)> = ring.iter().filter_map(|p| xy(p)).collect();
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        twice += x0 * y1 - x1 * y0;
    }
    twice / 2.0
}
