use icefield_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::encoding::{SequentialRamp, format_si_count, label_token_on};
use crate::hexbin::Hexbin;

const LABEL_FONT_SIZE: f64 = 17.5;
const LABEL_BASELINE: f64 = 7.0;
const STROKE_WIDTH: f64 = 0.5;

/// Labelled hexbin heatmap of already-projected points.
///
/// Bin fills follow a sequential ramp up to the fullest bin; each bin shows
/// its count in SI notation in a color that stays readable on its fill.
pub fn render_heatmap(points: &[Point], radius: f64) -> Vec<RenderCommand> {
    let hexbin = Hexbin::new(radius);
    let bins = hexbin.bin(points.iter().copied(), |p| *p);
    if bins.is_empty() {
        return Vec::new();
    }
    let max = bins.iter().map(|b| b.len()).max().unwrap_or(0);
    let ramp = SequentialRamp::new(max as f64);

    let mut commands = Vec::with_capacity(2 + bins.len() * 2);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from("heatmap"),
        label: Some(SharedStr::from("Meteorites per area")),
    });
    for bin in &bins {
        let fill = ramp.color(bin.len() as f64);
        commands.push(RenderCommand::DrawPolygon {
            points: hexbin.hexagon_at(bin.center),
            fill,
            stroke: Some(ThemeToken::HeatStroke),
            stroke_width: STROKE_WIDTH,
        });
        commands.push(RenderCommand::DrawText {
            position: bin.center.offset(0.0, LABEL_BASELINE),
            text: SharedStr::from(format_si_count(bin.len() as u64)),
            color: label_token_on(fill),
            font_size: LABEL_FONT_SIZE,
            align: TextAlign::Center,
            bold: true,
        });
    }
    commands.push(RenderCommand::EndGroup);
    commands
}
