//! Coordinates of specimens found in Antarctica.

use super::MuseumRecord;
use super::museum::Coordinate;
use crate::model::FoundSpot;

const ANTARCTICA: &str = "Antarctica";

/// The record's first geolocation, when it carries a point.
///
/// The continent comes from the top-level division when that division is a
/// continent. Coordinates that do not parse become NaN.
pub fn found_spot(record: &MuseumRecord) -> Option<FoundSpot> {
    let location = record.first_geo_location()?;
    let point = location.points.as_ref()?.point.as_ref()?;
    let continent = location
        .l1
        .as_ref()
        .filter(|l1| l1.kind == "Continent")
        .map(|l1| l1.content.clone());
    let coerce = |c: Option<&Coordinate>| c.and_then(Coordinate::as_f64).unwrap_or(f64::NAN);

    Some(FoundSpot {
        id: record.id.clone(),
        continent,
        latitude: coerce(point.latitude.as_ref()),
        longitude: coerce(point.longitude.as_ref()),
    })
}

/// Found spots on the Antarctic continent.
pub fn antarctic_found_spots(records: &[MuseumRecord]) -> Vec<FoundSpot> {
    let spots: Vec<FoundSpot> = records
        .iter()
        .filter_map(found_spot)
        .filter(|spot| spot.continent.as_deref() == Some(ANTARCTICA))
        .collect();
    let unparsed = spots
        .iter()
        .filter(|s| s.latitude.is_nan() || s.longitude.is_nan())
        .count();
    if unparsed > 0 {
        tracing::warn!(unparsed, "found spots with unparsable coordinates");
    }
    spots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::parse_records;

    fn record(id: &str, l1_type: &str, l1: &str, lat: &str) -> String {
        format!(
            r#"{{"id":"{id}","content":{{"indexedStructured":{{"geoLocation":[{{
                "L1":{{"type":"{l1_type}","content":"{l1}"}},
                "points":{{"point":{{"latitude":{{"content":"{lat}"}},"longitude":{{"content":"160.1"}}}}}}}}]}}}}}}"#
        )
    }

    #[test]
    fn keeps_antarctic_points_only() {
        let data = format!(
            "[{},{},{},{}]",
            record("a", "Continent", "Antarctica", "-77.1"),
            record("b", "Continent", "Africa", "1.0"),
            record("c", "Ocean", "Antarctica", "-60.0"),
            r#"{"id":"d","content":{"indexedStructured":{"geoLocation":[{"L1":{"type":"Continent","content":"Antarctica"}}]}}}"#,
        );
        let spots = antarctic_found_spots(&parse_records(data.as_bytes()).unwrap());
        assert_eq!(spots.len(), 1);
        assert_eq!(spots[0].id, "a");
        assert_eq!(spots[0].latitude, -77.1);
        assert_eq!(spots[0].longitude, 160.1);
    }

    #[test]
    fn unparsable_coordinates_become_nan() {
        let data = format!("[{}]", record("a", "Continent", "Antarctica", "n/a"));
        let records = parse_records(data.as_bytes()).unwrap();
        let spot = found_spot(&records[0]).unwrap();
        assert!(spot.latitude.is_nan());
    }
}
