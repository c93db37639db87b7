use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Color, Point, Rect};

/// A single, stateless render instruction.
///
/// Views emit a `Vec<RenderCommand>` for each story step or chart. Renderers
/// consume this list sequentially; each command carries all the data it
/// needs apart from the opacity/transform stacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Draw a filled rectangle, optionally with a tooltip label.
    DrawRect {
        rect: Rect,
        color: ThemeToken,
        border_color: Option<ThemeToken>,
        label: Option<SharedStr>,
        corner_radius: f64,
    },

    /// Draw a filled closed polygon with a data-driven fill.
    DrawPolygon {
        points: Vec<Point>,
        fill: Color,
        stroke: Option<ThemeToken>,
        stroke_width: f64,
    },

    /// Point marker, e.g. a timeline dot or a meteorite on the map.
    DrawCircle {
        center: Point,
        radius: f64,
        color: ThemeToken,
    },

    /// Text anchored at `position`, which is the baseline.
    DrawText {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
        bold: bool,
    },

    DrawLine {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Multiply the opacity of all subsequent commands by `alpha` until the
    /// matching `PopOpacity`.
    PushOpacity { alpha: f64 },

    PopOpacity,

    /// Translate then scale every following command until `PopTransform`.
    PushTransform { translate: Point, scale: Point },

    PopTransform,

    /// Open a named group: a story step, a chart or a map layer.
    BeginGroup {
        id: SharedStr,
        label: Option<SharedStr>,
    },

    EndGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_externally_tagged() {
        let cmd = RenderCommand::PushOpacity { alpha: 0.5 };
        let json = serde_json::to_string(&cmd).unwrap_or_default();
        assert_eq!(json, r#"{"PushOpacity":{"alpha":0.5}}"#);
    }
}
