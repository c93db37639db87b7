//! Map layers for the story's Antarctica panels.
//!
//! Every layer takes a [`Projection`] so the same outline, contour and
//! found-spot data can be drawn in any frame. Only exterior rings are
//! drawn; holes are painted over by the layers above them.

use icefield_protocol::{Color, Point, Rect, RenderCommand, SharedStr, ThemeToken};

use crate::encoding::{BLUE_ICE_FILL, LAND_FILL, color_for_count, color_for_elevation};
use crate::hexbin::Hexbin;
use crate::model::geo::xy;
use crate::model::{Feature, FeatureCollection, FoundSpot, Ring};
use crate::projection::Projection;

/// Outer size of a map panel.
pub const MAP_WIDTH: f64 = 600.0;
pub const MAP_HEIGHT: f64 = 550.0;
const MAP_CORNER_RADIUS: f64 = 10.0;
const HEX_STROKE_WIDTH: f64 = 0.5;

fn project_ring(ring: &Ring, projection: &impl Projection) -> Vec<Point> {
    ring.iter()
        .filter_map(|position| xy(position))
        .filter_map(|(x, y)| projection.project(x, y))
        .collect()
}

fn push_polygons(
    commands: &mut Vec<RenderCommand>,
    collection: &FeatureCollection,
    projection: &impl Projection,
    fill_for: impl Fn(&Feature) -> Option<Color>,
) {
    for feature in &collection.features {
        let Some(fill) = fill_for(feature) else {
            continue;
        };
        for polygon in feature.geometry.polygons() {
            let Some(exterior) = polygon.first() else {
                continue;
            };
            let points = project_ring(exterior, projection);
            if points.len() < 3 {
                continue;
            }
            commands.push(RenderCommand::DrawPolygon {
                points,
                fill,
                stroke: None,
                stroke_width: 0.0,
            });
        }
    }
}

fn group(id: &str, mut body: Vec<RenderCommand>) -> Vec<RenderCommand> {
    if body.is_empty() {
        return body;
    }
    let mut commands = Vec::with_capacity(body.len() + 2);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from(id),
        label: None,
    });
    commands.append(&mut body);
    commands.push(RenderCommand::EndGroup);
    commands
}

/// Rounded accent-coloured panel behind a map.
pub fn render_map_background() -> Vec<RenderCommand> {
    vec![RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, MAP_WIDTH, MAP_HEIGHT),
        color: ThemeToken::MapBackground,
        border_color: None,
        label: None,
        corner_radius: MAP_CORNER_RADIUS,
    }]
}

/// The continent outline, filled white.
pub fn render_land(outline: &FeatureCollection, projection: &impl Projection) -> Vec<RenderCommand> {
    let mut body = Vec::new();
    push_polygons(&mut body, outline, projection, |_| Some(LAND_FILL));
    group("land", body)
}

/// Elevation contour bands shaded by their `elevation` property.
pub fn render_elevation(
    contours: &FeatureCollection,
    projection: &impl Projection,
) -> Vec<RenderCommand> {
    let mut body = Vec::new();
    push_polygons(&mut body, contours, projection, |feature| {
        feature
            .number_property("elevation")
            .and_then(color_for_elevation)
    });
    group("elevation", body)
}

/// Blue ice area polygons.
pub fn render_blue_ice(areas: &FeatureCollection, projection: &impl Projection) -> Vec<RenderCommand> {
    let mut body = Vec::new();
    push_polygons(&mut body, areas, projection, |_| Some(BLUE_ICE_FILL));
    group("blue-ice", body)
}

/// Small hexbins over the places meteorites were found, colored by count.
pub fn render_found_spots(
    spots: &[FoundSpot],
    projection: &impl Projection,
    radius: f64,
) -> Vec<RenderCommand> {
    let hexbin = Hexbin::new(radius);
    let projected = spots
        .iter()
        .filter_map(|spot| projection.project(spot.longitude, spot.latitude));
    let body: Vec<RenderCommand> = hexbin
        .bin(projected, |p| *p)
        .into_iter()
        .filter_map(|bin| {
            color_for_count(bin.len()).map(|fill| RenderCommand::DrawPolygon {
                points: hexbin.hexagon_at(bin.center),
                fill,
                stroke: Some(ThemeToken::HexStroke),
                stroke_width: HEX_STROKE_WIDTH,
            })
        })
        .collect();
    group("found-spots", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::HEX_LOW;
    use crate::model::Geometry;
    use crate::projection::FitToBox;
    use icefield_protocol::Viewport;

    fn square(x: f64, y: f64, size: f64) -> Ring {
        vec![
            vec![x, y],
            vec![x + size, y],
            vec![x + size, y + size],
            vec![x, y + size],
            vec![x, y],
        ]
    }

    fn contours() -> FeatureCollection {
        let feature = |elevation: f64, ring: Ring| {
            let mut properties = serde_json::Map::new();
            properties.insert("elevation".into(), serde_json::json!(elevation));
            Feature {
                geometry: Geometry::Polygon {
                    coordinates: vec![ring],
                },
                properties: Some(properties),
            }
        };
        FeatureCollection {
            features: vec![
                feature(0.0, square(0.0, 0.0, 10.0)),
                feature(1500.0, square(1.0, 1.0, 5.0)),
                feature(3000.0, square(2.0, 2.0, 2.0)),
            ],
            crs: None,
        }
    }

    fn fills(commands: &[RenderCommand]) -> Vec<Color> {
        commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawPolygon { fill, .. } => Some(*fill),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unlisted_elevations_are_not_drawn() {
        let data = contours();
        let projection =
            FitToBox::fit([(0.0, 0.0), (10.0, 10.0)], &Viewport::sized(100.0, 100.0), 0.0).unwrap();
        let commands = render_elevation(&data, &projection);
        assert_eq!(fills(&commands), vec![Color::WHITE, Color::rgb(0xC6, 0xC6, 0xC6)]);
    }

    #[test]
    fn found_spots_are_binned() {
        let projection =
            FitToBox::fit([(0.0, 0.0), (10.0, 10.0)], &Viewport::sized(100.0, 100.0), 0.0).unwrap();
        let spot = |lon: f64, lat: f64| FoundSpot {
            id: String::new(),
            continent: Some("Antarctica".into()),
            latitude: lat,
            longitude: lon,
        };
        let spots = vec![spot(5.0, 5.0), spot(5.0, 5.0), spot(f64::NAN, 1.0)];
        let commands = render_found_spots(&spots, &projection, 3.0);
        assert_eq!(fills(&commands), vec![HEX_LOW]);
    }

    #[test]
    fn empty_layers_emit_nothing() {
        let empty = FeatureCollection {
            features: Vec::new(),
            crs: None,
        };
        let projection =
            FitToBox::fit([(0.0, 0.0), (1.0, 1.0)], &Viewport::sized(10.0, 10.0), 0.0).unwrap();
        assert!(render_land(&empty, &projection).is_empty());
        assert!(render_blue_ice(&empty, &projection).is_empty());
    }
}
