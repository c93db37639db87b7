//! Map outline cleanup.

use thiserror::Error;

use crate::model::geo::signed_area;
use crate::model::{Feature, FeatureCollection, Geometry, PolygonRings};

/// Smallest exterior ring kept when simplifying the continent outline.
pub const DEFAULT_MIN_POINTS: usize = 10;

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_feature_collection(data: &[u8]) -> Result<FeatureCollection, GeoJsonError> {
    Ok(serde_json::from_slice(data)?)
}

/// Drop polygons whose exterior ring has fewer than `min_points` positions.
///
/// A multipolygon left with one polygon becomes a polygon. Features left
/// with nothing, and features with other geometry types, are removed.
/// Feature properties are dropped.
pub fn simplify(collection: &FeatureCollection, min_points: usize) -> FeatureCollection {
    let large_enough =
        |polygon: &PolygonRings| polygon.first().is_some_and(|ring| ring.len() >= min_points);

    let features: Vec<Feature> = collection
        .features
        .iter()
        .filter_map(|feature| {
            let geometry = match &feature.geometry {
                Geometry::Polygon { coordinates } if large_enough(coordinates) => {
                    Geometry::Polygon {
                        coordinates: coordinates.clone(),
                    }
                }
                Geometry::MultiPolygon { coordinates } => {
                    let mut kept: Vec<PolygonRings> =
                        coordinates.iter().filter(|p| large_enough(p)).cloned().collect();
                    match kept.len() {
                        0 => return None,
                        1 => Geometry::Polygon {
                            coordinates: kept.remove(0),
                        },
                        _ => Geometry::MultiPolygon { coordinates: kept },
                    }
                }
                _ => return None,
            };
            Some(Feature {
                geometry,
                properties: None,
            })
        })
        .collect();

    tracing::debug!(
        before = collection.features.len(),
        after = features.len(),
        min_points,
        "simplified feature collection"
    );
    FeatureCollection {
        features,
        crs: None,
    }
}

/// Remove the legacy `crs` member.
pub fn strip_crs(collection: &mut FeatureCollection) {
    if collection.crs.take().is_some() {
        tracing::debug!("stripped crs member");
    }
}

/// Wind exterior rings clockwise and holes counter-clockwise (with y up),
/// the orientation spherical renderers expect.
pub fn rewind(collection: &mut FeatureCollection) {
    for feature in &mut collection.features {
        match &mut feature.geometry {
            Geometry::Polygon { coordinates } => rewind_polygon(coordinates),
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter_mut().for_each(rewind_polygon);
            }
            Geometry::Unsupported => {}
        }
    }
}

fn rewind_polygon(polygon: &mut PolygonRings) {
    for (i, ring) in polygon.iter_mut().enumerate() {
        let area = signed_area(ring);
        let exterior = i == 0;
        if (exterior && area > 0.0) || (!exterior && area < 0.0) {
            ring.reverse();
        }
    }
}
