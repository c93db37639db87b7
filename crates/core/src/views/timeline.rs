use icefield_protocol::{Point, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::config::TimelineConfig;
use crate::model::FinalizedPortrait;
use crate::timeline::{Timeline, TimelineEvent};

/// Horizontal run of the slanted connector from the dot towards the label.
const CONNECTOR_RUN: f64 = 30.0;
/// Gap between the end of the connector and the label text.
const LABEL_GAP: f64 = 10.0;
/// Baseline offset so the text sits centred on its connector.
const BASELINE_OFFSET: f64 = 5.0;

/// Render a laid-out timeline.
///
/// Each event gets a dot at its true position, a connector bending over to
/// its nudged label position, and the label produced by `label`.
pub fn render_timeline(
    timeline: &Timeline,
    config: &TimelineConfig,
    label: impl Fn(&TimelineEvent) -> String,
) -> Vec<RenderCommand> {
    let mut commands = Vec::with_capacity(2 + timeline.events.len() * 4);
    commands.push(RenderCommand::BeginGroup {
        id: SharedStr::from("timeline"),
        label: Some(SharedStr::from("Life events")),
    });
    commands.push(RenderCommand::DrawLine {
        from: Point::new(config.line_x, config.inset),
        to: Point::new(config.line_x, config.height - config.inset),
        color: ThemeToken::TimelineLine,
        width: 2.0,
    });

    let elbow_x = config.line_x + CONNECTOR_RUN;
    for event in &timeline.events {
        let color = if event.is_portrait() {
            ThemeToken::TimelineHighlight
        } else {
            ThemeToken::TimelineMarker
        };
        let dot = Point::new(config.line_x, event.dot_y);
        commands.push(RenderCommand::DrawCircle {
            center: dot,
            radius: config.dot_radius,
            color,
        });
        commands.push(RenderCommand::DrawLine {
            from: dot,
            to: Point::new(elbow_x, event.desc_y),
            color,
            width: 1.0,
        });
        commands.push(RenderCommand::DrawLine {
            from: Point::new(elbow_x, event.desc_y),
            to: Point::new(config.description_x - LABEL_GAP, event.desc_y),
            color,
            width: 1.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(config.description_x, event.desc_y + BASELINE_OFFSET),
            text: SharedStr::from(label(event)),
            color,
            font_size: config.font_size,
            align: TextAlign::Left,
            bold: false,
        });
    }

    commands.push(RenderCommand::EndGroup);
    commands
}

/// Lay out and render a portrait sitter's life events.
pub fn render_portrait_timeline(
    portrait: &FinalizedPortrait,
    config: &TimelineConfig,
) -> Vec<RenderCommand> {
    let layout = match config.layout() {
        Ok(layout) => layout,
        Err(error) => {
            tracing::warn!(%error, id = %portrait.id, "timeline geometry rejected");
            return Vec::new();
        }
    };
    let timeline = portrait.timeline(&layout);
    tracing::debug!(
        id = %portrait.id,
        events = timeline.events.len(),
        status = ?timeline.outcome.status,
        iterations = timeline.outcome.iterations,
        "laid out timeline"
    );
    render_timeline(&timeline, config, |event| portrait.event_label(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(config: &TimelineConfig) -> Timeline {
        let layout = config.layout().unwrap();
        Timeline::build(
            vec![
                TimelineEvent::life(1809, "Born"),
                TimelineEvent::life(1861, "Inaugurated"),
                TimelineEvent::life(1865, "Died"),
            ],
            Some(1864),
            &layout,
        )
    }

    #[test]
    fn one_marker_per_event() {
        let config = TimelineConfig::default();
        let commands = render_timeline(&timeline(&config), &config, |e| e.year.to_string());
        let circles: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawCircle { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(circles.len(), 4);
        assert_eq!(
            circles
                .iter()
                .filter(|c| **c == ThemeToken::TimelineHighlight)
                .count(),
            1
        );
        assert!(matches!(commands.first(), Some(RenderCommand::BeginGroup { .. })));
        assert!(matches!(commands.last(), Some(RenderCommand::EndGroup)));
    }

    #[test]
    fn labels_follow_nudged_positions() {
        let config = TimelineConfig::default();
        let tl = timeline(&config);
        let commands = render_timeline(&tl, &config, |e| e.year.to_string());
        let label_ys: Vec<f64> = commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { position, .. } => Some(position.y),
                _ => None,
            })
            .collect();
        let expected: Vec<f64> = tl.events.iter().map(|e| e.desc_y + 5.0).collect();
        assert_eq!(label_ys, expected);
        for pair in label_ys.windows(2) {
            assert!(pair[1] - pair[0] >= config.minimum_gap - 1e-9);
        }
    }
}
