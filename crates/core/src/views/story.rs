//! The scrollytelling narrative as a step table.
//!
//! Each [`StepId`] owns a caption and a chart. The table is
//! [`StepId::ALL`]; rendering a step is an exhaustive match, so adding a
//! step without a handler does not compile. Nothing is cached between
//! scroll events: callers compute a fresh [`RenderState`] per event and
//! render from it.

use icefield_protocol::{Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken, Viewport};
use serde::{Deserialize, Serialize};

use crate::config::StoryConfig;
use crate::model::geo::xy;
use crate::model::{FeatureCollection, FoundSpot, LocationShare};
use crate::projection::FitToBox;
use crate::scroll::{RenderState, ScrollStep};

use super::locations::{CHART_WIDTH, render_locations};
use super::map::{
    MAP_HEIGHT, MAP_WIDTH, render_blue_ice, render_elevation, render_found_spots, render_land,
    render_map_background,
};

const CAPTION_X: f64 = 25.0;
const CAPTION_TOP: f64 = 5.0;
const CAPTION_FONT_SIZE: f64 = 20.0;
const CAPTION_LINE_HEIGHT: f64 = 28.0;
const CAPTION_BAR_WIDTH: f64 = 10.0;
const CAPTION_HEIGHT: f64 = 100.0;
/// Rough glyph width used to wrap captions.
const CHAR_WIDTH: f64 = 10.0;
const CHART_TOP: f64 = CAPTION_HEIGHT + 30.0;
const MAP_PADDING: f64 = 20.0;

const TITLE: &str = "Why are meteorites always found in Antarctica?";
const TITLE_FONT_SIZE: f64 = 72.0;

/// Positions of the meteorite markers scattered over the ice, in map
/// panel coordinates.
const CONTRAST_MARKERS: [(f64, f64); 8] = [
    (150.0, 250.0),
    (250.0, 110.0),
    (250.0, 230.0),
    (350.0, 170.0),
    (350.0, 290.0),
    (450.0, 230.0),
    (450.0, 350.0),
    (400.0, 420.0),
];
const MARKER_RADIUS: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Title,
    CollectionStats,
    CollectedLocation,
    Climate,
    VisualContrast,
    CollectionSpot,
    Elevation,
    SnowFlow,
    BlueIceAreas,
    BiaIllustration,
    CollectedMeteorites,
    Alh84001,
    GlobalWarming,
    LastComment,
}

impl StepId {
    pub const ALL: [StepId; 14] = [
        StepId::Title,
        StepId::CollectionStats,
        StepId::CollectedLocation,
        StepId::Climate,
        StepId::VisualContrast,
        StepId::CollectionSpot,
        StepId::Elevation,
        StepId::SnowFlow,
        StepId::BlueIceAreas,
        StepId::BiaIllustration,
        StepId::CollectedMeteorites,
        StepId::Alh84001,
        StepId::GlobalWarming,
        StepId::LastComment,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or_default()
    }

    /// Stable identifier used for group ids and file names.
    pub fn slug(self) -> &'static str {
        match self {
            StepId::Title => "title",
            StepId::CollectionStats => "collection_stats",
            StepId::CollectedLocation => "collected_location",
            StepId::Climate => "climate",
            StepId::VisualContrast => "visual_contrast",
            StepId::CollectionSpot => "collection_spot",
            StepId::Elevation => "elevation",
            StepId::SnowFlow => "snow_flow",
            StepId::BlueIceAreas => "blue_ice_areas",
            StepId::BiaIllustration => "bia_illustration",
            StepId::CollectedMeteorites => "collected_meteorites",
            StepId::Alh84001 => "alh84001",
            StepId::GlobalWarming => "global_warming",
            StepId::LastComment => "last_comment",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            StepId::Title => TITLE,
            StepId::CollectionStats => {
                "The Smithsonian holds one of the largest meteorite collections: over 55,000 specimens from more than 20,000 distinct meteorites."
            }
            StepId::CollectedLocation => {
                "Most of them, 71%, were found in Antarctica, far more than on any other continent."
            }
            StepId::Climate => {
                "Extreme cold slows weathering and the dry air limits chemical change, so meteorites stay pristine for a very long time."
            }
            StepId::VisualContrast => {
                "Dark meteorites stand out against white ice far better than against soil, gravel or cities."
            }
            StepId::CollectionSpot => {
                "Finds are not spread evenly across the continent. Most come from the highlighted areas."
            }
            StepId::Elevation => {
                "These areas lie low. Less snow settles there, so meteorites stay on the surface."
            }
            StepId::SnowFlow => {
                "Over thousands of years ice flows from high ground to low, carrying meteorites with it."
            }
            StepId::BlueIceAreas => {
                "Above all, these are Blue Ice Areas, where conditions bring meteorites to the surface."
            }
            StepId::BiaIllustration => {
                "Wind and terrain strip the surface away until old blue ice, and the meteorites inside it, are exposed."
            }
            StepId::CollectedMeteorites => {
                "Expeditions recover about 1,000 meteorites a year from these areas, and many more are still waiting."
            }
            StepId::Alh84001 => {
                "ALH 84001, which hinted at ancient life on Mars, was found in an Antarctic blue ice area."
            }
            StepId::GlobalWarming => {
                "Warming is melting the ice, and meteorites in blue ice areas are sinking out of reach."
            }
            StepId::LastComment => {
                "Losing Antarctic meteorites is like losing data: once they are gone, so are some of the secrets of the universe."
            }
        }
    }

    /// Render this step at `state.opacity`.
    pub fn render(
        self,
        state: &RenderState<StepId>,
        data: &StoryData,
        config: &StoryConfig,
        viewport: &Viewport,
    ) -> Vec<RenderCommand> {
        let mut commands = vec![
            RenderCommand::BeginGroup {
                id: SharedStr::from(self.slug()),
                label: Some(SharedStr::from(format!("Step {}", state.index + 1))),
            },
            RenderCommand::PushOpacity {
                alpha: state.opacity,
            },
        ];

        if self != StepId::Title {
            caption(&mut commands, self.caption(), viewport);
        }

        match self {
            StepId::Title => title(&mut commands, viewport),
            StepId::CollectionStats => metrics(
                &mut commands,
                viewport,
                &[("Specimen", "55,000+"), ("Distinct Meteorite", "20,000+")],
            ),
            StepId::CollectedLocation => {
                let origin = Point::new(centered(viewport, CHART_WIDTH), CHART_TOP);
                commands.push(RenderCommand::DrawText {
                    position: origin.offset(55.0, -10.0),
                    text: SharedStr::from("Attributed Locations"),
                    color: ThemeToken::TextPrimary,
                    font_size: 16.0,
                    align: TextAlign::Left,
                    bold: false,
                });
                translated(&mut commands, origin.offset(0.0, 20.0), render_locations(&data.locations));
            }
            StepId::Climate => {
                let mut map = data.base_map(&[]);
                map_headline(&mut map, ("Avg. Temp.", 20.0, 290.0, 240.0), ("-71 °F", 64.0, 285.0, 300.0));
                place_map(&mut commands, viewport, map);
            }
            StepId::VisualContrast => {
                let mut map = data.base_map(&[]);
                map.extend(CONTRAST_MARKERS.iter().map(|&(x, y)| RenderCommand::DrawCircle {
                    center: Point::new(x, y),
                    radius: MARKER_RADIUS,
                    color: ThemeToken::MeteoriteMarker,
                }));
                place_map(&mut commands, viewport, map);
            }
            StepId::CollectionSpot | StepId::LastComment => {
                let map = data.base_map(&[Layer::FoundSpots(config.hexbin.spot_radius)]);
                place_map(&mut commands, viewport, map);
            }
            StepId::Elevation | StepId::SnowFlow => {
                let map = data.base_map(&[
                    Layer::Elevation,
                    Layer::FoundSpots(config.hexbin.spot_radius),
                ]);
                place_map(&mut commands, viewport, map);
            }
            StepId::BlueIceAreas => {
                let map = data.base_map(&[Layer::BlueIce]);
                place_map(&mut commands, viewport, map);
            }
            StepId::CollectedMeteorites => {
                let mut map = data.base_map(&[]);
                map_headline(&mut map, ("1,000", 60.0, 290.0, 270.0), ("Meteorites/Year", 18.0, 290.0, 310.0));
                place_map(&mut commands, viewport, map);
            }
            StepId::Alh84001 => {
                commands.push(RenderCommand::DrawText {
                    position: Point::new(viewport.width / 2.0, CHART_TOP + 20.0),
                    text: SharedStr::from("image source : airandspace.si.edu"),
                    color: ThemeToken::TextMuted,
                    font_size: 14.0,
                    align: TextAlign::Center,
                    bold: false,
                });
            }
            // Illustration-only steps: the caption carries them.
            StepId::BiaIllustration | StepId::GlobalWarming => {}
        }

        commands.push(RenderCommand::PopOpacity);
        commands.push(RenderCommand::EndGroup);
        commands
    }
}

/// Everything the story's charts draw from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryData {
    pub locations: Vec<LocationShare>,
    pub found_spots: Vec<FoundSpot>,
    pub outline: Option<FeatureCollection>,
    pub elevation: Option<FeatureCollection>,
    pub blue_ice: Option<FeatureCollection>,
}

enum Layer {
    Elevation,
    BlueIce,
    FoundSpots(f64),
}

impl StoryData {
    /// Projection fitting the continent outline into a map panel.
    pub fn map_projection(&self) -> Option<FitToBox> {
        let outline = self.outline.as_ref()?;
        let coords = outline
            .features
            .iter()
            .flat_map(|f| f.geometry.polygons())
            .flatten()
            .flatten()
            .filter_map(|position| xy(position));
        FitToBox::fit(coords, &Viewport::sized(MAP_WIDTH, MAP_HEIGHT), MAP_PADDING)
    }

    /// Map panel in its own coordinates: background, land, then `layers`.
    fn base_map(&self, layers: &[Layer]) -> Vec<RenderCommand> {
        let mut map = render_map_background();
        let (Some(projection), Some(outline)) = (self.map_projection(), self.outline.as_ref())
        else {
            return map;
        };
        map.extend(render_land(outline, &projection));
        for layer in layers {
            match layer {
                Layer::Elevation => {
                    if let Some(contours) = &self.elevation {
                        map.extend(render_elevation(contours, &projection));
                    }
                }
                Layer::BlueIce => {
                    if let Some(areas) = &self.blue_ice {
                        map.extend(render_blue_ice(areas, &projection));
                    }
                }
                Layer::FoundSpots(radius) => {
                    map.extend(render_found_spots(&self.found_spots, &projection, *radius));
                }
            }
        }
        map
    }
}

/// Render whichever step `scroll` points at. Out-of-range indices render
/// nothing.
pub fn render_scroll(
    scroll: ScrollStep,
    data: &StoryData,
    config: &StoryConfig,
    viewport: &Viewport,
) -> Vec<RenderCommand> {
    let Some(step) = StepId::from_index(scroll.index) else {
        tracing::debug!(index = scroll.index, "scroll index past the last step");
        return Vec::new();
    };
    let state = RenderState::compute(step, scroll, &config.fade);
    step.render(&state, data, config, viewport)
}

fn centered(viewport: &Viewport, width: f64) -> f64 {
    ((viewport.width - width) / 2.0).max(0.0)
}

fn translated(commands: &mut Vec<RenderCommand>, origin: Point, body: Vec<RenderCommand>) {
    commands.push(RenderCommand::PushTransform {
        translate: origin,
        scale: Point::new(1.0, 1.0),
    });
    commands.extend(body);
    commands.push(RenderCommand::PopTransform);
}

fn place_map(commands: &mut Vec<RenderCommand>, viewport: &Viewport, map: Vec<RenderCommand>) {
    let origin = Point::new(centered(viewport, MAP_WIDTH), CHART_TOP);
    translated(commands, origin, map);
}

type Headline = (&'static str, f64, f64, f64);

fn map_headline(map: &mut Vec<RenderCommand>, name: Headline, value: Headline) {
    for (text, font_size, x, y) in [value, name] {
        map.push(RenderCommand::DrawText {
            position: Point::new(x, y),
            text: SharedStr::from(text),
            color: ThemeToken::AccentText,
            font_size,
            align: TextAlign::Left,
            bold: false,
        });
    }
}

/// Split `text` into lines of at most `max_chars` characters, breaking at
/// spaces. Words longer than a line get a line of their own.
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn caption(commands: &mut Vec<RenderCommand>, text: &str, viewport: &Viewport) {
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, CAPTION_BAR_WIDTH, CAPTION_HEIGHT),
        color: ThemeToken::Accent,
        border_color: None,
        label: None,
        corner_radius: 5.0,
    });
    let max_chars = ((viewport.width - CAPTION_X) / CHAR_WIDTH).max(10.0) as usize;
    for (i, line) in wrap(text, max_chars).into_iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(
                CAPTION_X,
                CAPTION_TOP + CAPTION_FONT_SIZE + i as f64 * CAPTION_LINE_HEIGHT,
            ),
            text: SharedStr::from(line),
            color: ThemeToken::TextPrimary,
            font_size: CAPTION_FONT_SIZE,
            align: TextAlign::Left,
            bold: false,
        });
    }
}

fn title(commands: &mut Vec<RenderCommand>, viewport: &Viewport) {
    commands.push(RenderCommand::DrawRect {
        rect: Rect::new(0.0, 0.0, viewport.width, viewport.height),
        color: ThemeToken::Accent,
        border_color: None,
        label: None,
        corner_radius: 0.0,
    });
    let x = viewport.width * 0.05;
    let max_chars = ((viewport.width - 2.0 * x) / (TITLE_FONT_SIZE * 0.5)).max(10.0) as usize;
    let lines = wrap(TITLE, max_chars);
    let first_baseline =
        viewport.height / 2.0 - (lines.len() as f64 - 1.0) * TITLE_FONT_SIZE * 0.6;
    for (i, line) in lines.into_iter().enumerate() {
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, first_baseline + i as f64 * TITLE_FONT_SIZE * 1.2),
            text: SharedStr::from(line),
            color: ThemeToken::TextOnAccent,
            font_size: TITLE_FONT_SIZE,
            align: TextAlign::Left,
            bold: true,
        });
    }
}

fn metrics(commands: &mut Vec<RenderCommand>, viewport: &Viewport, items: &[(&str, &str)]) {
    let column = viewport.width / items.len().max(1) as f64;
    let top = CHART_TOP + (viewport.height - CHART_TOP) / 3.0;
    for (i, (name, value)) in items.iter().enumerate() {
        let x = column * i as f64 + CAPTION_X;
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, top),
            text: SharedStr::from(*name),
            color: ThemeToken::TextMuted,
            font_size: 32.0,
            align: TextAlign::Left,
            bold: false,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(x, top + 90.0),
            text: SharedStr::from(*value),
            color: ThemeToken::TextPrimary,
            font_size: 80.0,
            align: TextAlign::Left,
            bold: false,
        });
    }
}
