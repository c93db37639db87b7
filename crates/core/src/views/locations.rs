use icefield_protocol::{Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::encoding::bar_token_for;
use crate::model::LocationShare;

pub const CHART_WIDTH: f64 = 750.0;
pub const CHART_HEIGHT: f64 = 400.0;
const AXIS_X: f64 = 200.0;
/// Fraction of a band step left empty around each bar.
const BAND_PADDING: f64 = 0.65;
const TICK_PADDING: f64 = 15.0;
const NAME_FONT_SIZE: f64 = 16.0;
const SHARE_FONT_SIZE: f64 = 24.0;
const SHARE_BASELINE: f64 = 21.0;

/// `0.7149 -> "71%"`.
pub fn format_share(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round())
}

/// Horizontal bar chart of the continents meteorites are attributed to.
///
/// Bars run right from a vertical axis, in input order top to bottom,
/// scaled so the largest share fills the chart. Antarctica is drawn in the
/// accent colour.
pub fn render_locations(shares: &[LocationShare]) -> Vec<RenderCommand> {
    if shares.is_empty() {
        return Vec::new();
    }
    let max_ratio = shares.iter().map(LocationShare::ratio).fold(0.0, f64::max);
    let bar_span = CHART_WIDTH - AXIS_X;
    let n = shares.len() as f64;
    let step = CHART_HEIGHT / (n - BAND_PADDING + 2.0 * BAND_PADDING);
    let bandwidth = step * (1.0 - BAND_PADDING);

    let mut commands = Vec::with_capacity(4 + shares.len() * 3);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from("attributed-locations"),
        label: Some(SharedStr::from("Attributed Locations")),
    });
    commands.push(RenderCommand::DrawLine {
        from: Point::new(AXIS_X, 0.0),
        to: Point::new(AXIS_X, CHART_HEIGHT),
        color: ThemeToken::AxisLine,
        width: 2.0,
    });

    for (i, share) in shares.iter().enumerate() {
        let y = step * BAND_PADDING + step * i as f64;
        let width = if max_ratio > 0.0 {
            share.ratio() / max_ratio * bar_span
        } else {
            0.0
        };
        let (bar, label) = bar_token_for(share.continent());
        commands.push(RenderCommand::DrawText {
            position: Point::new(AXIS_X - TICK_PADDING, y + bandwidth / 2.0 + NAME_FONT_SIZE / 3.0),
            text: SharedStr::from(share.continent()),
            color: ThemeToken::TextPrimary,
            font_size: NAME_FONT_SIZE,
            align: TextAlign::Right,
            bold: false,
        });
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(AXIS_X, y, width, bandwidth),
            color: bar,
            border_color: None,
            label: Some(SharedStr::from(format!(
                "{}: {} meteorites",
                share.continent(),
                share.1.length
            ))),
            corner_radius: 0.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(AXIS_X + width + TICK_PADDING, y + SHARE_BASELINE),
            text: SharedStr::from(format_share(share.ratio())),
            color: label,
            font_size: SHARE_FONT_SIZE,
            align: TextAlign::Left,
            bold: false,
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}
