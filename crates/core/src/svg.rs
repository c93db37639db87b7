//! SVG renderer: converts `RenderCommand` lists into standalone SVG strings.

use icefield_protocol::{Color, RenderCommand, TextAlign, ThemeToken};

/// Render a list of commands as an SVG document string.
///
/// `width` and `height` define the SVG viewBox dimensions.
/// `dark` selects the color palette: the light one is the story page, the
/// dark one the portrait gallery.
pub fn render_svg(commands: &[RenderCommand], width: f64, height: f64, dark: bool) -> String {
    let mut svg = String::with_capacity(commands.len() * 120);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" style="font-family:Arial,sans-serif">"#,
    ));
    svg.push_str(&format!(
        r#"<rect width="{width}" height="{height}" fill="{}"/>"#,
        resolve_color(ThemeToken::Background, dark),
    ));

    // Unbalanced pops are ignored, unclosed pushes are closed at the end.
    let mut open_groups = 0usize;
    for cmd in commands {
        match cmd {
            RenderCommand::DrawRect {
                rect,
                color,
                border_color,
                label,
                corner_radius,
            } => {
                svg.push_str(&format!(
                    r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}""#,
                    rect.x,
                    rect.y,
                    rect.w.max(0.0),
                    rect.h.max(0.0),
                    resolve_color(*color, dark),
                ));
                if *corner_radius > 0.0 {
                    svg.push_str(&format!(r#" rx="{corner_radius}""#));
                }
                if let Some(border) = border_color {
                    svg.push_str(&format!(r#" stroke="{}""#, resolve_color(*border, dark)));
                }
                match label {
                    Some(label) => svg.push_str(&format!(
                        "><title>{}</title></rect>",
                        escape_xml(label)
                    )),
                    None => svg.push_str("/>"),
                }
            }
            RenderCommand::DrawPolygon {
                points,
                fill,
                stroke,
                stroke_width,
            } => {
                let coords: Vec<String> =
                    points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
                svg.push_str(&format!(
                    r#"<polygon points="{}" fill="{}""#,
                    coords.join(" "),
                    fill.to_hex(),
                ));
                if fill.a < 255 {
                    svg.push_str(&format!(r#" fill-opacity="{}""#, alpha_of(*fill)));
                }
                if let Some(stroke) = stroke {
                    svg.push_str(&format!(
                        r#" stroke="{}" stroke-width="{stroke_width}""#,
                        resolve_color(*stroke, dark),
                    ));
                }
                svg.push_str("/>");
            }
            RenderCommand::DrawCircle {
                center,
                radius,
                color,
            } => {
                svg.push_str(&format!(
                    r#"<circle cx="{}" cy="{}" r="{radius}" fill="{}"/>"#,
                    center.x,
                    center.y,
                    resolve_color(*color, dark),
                ));
            }
            RenderCommand::DrawLine {
                from,
                to,
                color,
                width: line_width,
            } => {
                let stroke = resolve_color(*color, dark);
                svg.push_str(&format!(
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{line_width}"/>"#,
                    from.x, from.y, to.x, to.y,
                ));
            }
            RenderCommand::DrawText {
                position,
                text,
                color,
                font_size,
                align,
                bold,
            } => {
                let anchor = match align {
                    TextAlign::Left => "start",
                    TextAlign::Center => "middle",
                    TextAlign::Right => "end",
                };
                let weight = if *bold { r#" font-weight="bold""# } else { "" };
                svg.push_str(&format!(
                    r#"<text x="{}" y="{}" fill="{}" font-size="{font_size}" text-anchor="{anchor}"{weight}>{}</text>"#,
                    position.x,
                    position.y,
                    resolve_color(*color, dark),
                    escape_xml(text),
                ));
            }
            RenderCommand::PushOpacity { alpha } => {
                svg.push_str(&format!(r#"<g opacity="{}">"#, alpha.clamp(0.0, 1.0)));
                open_groups += 1;
            }
            RenderCommand::PushTransform { translate, scale } => {
                svg.push_str(&format!(
                    r#"<g transform="translate({},{}) scale({},{})">"#,
                    translate.x, translate.y, scale.x, scale.y,
                ));
                open_groups += 1;
            }
            RenderCommand::BeginGroup { id, label } => {
                svg.push_str(&format!(r#"<g id="{}">"#, escape_xml(id)));
                if let Some(label) = label {
                    svg.push_str(&format!("<title>{}</title>", escape_xml(label)));
                }
                open_groups += 1;
            }
            RenderCommand::PopOpacity | RenderCommand::PopTransform | RenderCommand::EndGroup => {
                if open_groups > 0 {
                    svg.push_str("</g>");
                    open_groups -= 1;
                }
            }
        }
    }
    for _ in 0..open_groups {
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn alpha_of(color: Color) -> f64 {
    f64::from(color.a) / 255.0
}

fn resolve_color(token: ThemeToken, dark: bool) -> &'static str {
    match token {
        ThemeToken::Accent | ThemeToken::AccentText | ThemeToken::MapBackground => "#36b5c8",
        ThemeToken::TextOnAccent | ThemeToken::HeatStroke | ThemeToken::HeatLabelOnDark => {
            "#ffffff"
        }
        ThemeToken::HeatLabelOnLight => "#343434",
        ThemeToken::BarMuted => "#dbdbdb",
        ThemeToken::BarLabelMuted => "#858585",
        ThemeToken::AxisLine => "#e8e8e8",
        ThemeToken::HexStroke => "#808080",
        ThemeToken::MeteoriteMarker => "#3b3b3b",
        ThemeToken::TimelineHighlight => "#ffcd00",
        ThemeToken::HistogramBar => "#6dcbd3",
        ThemeToken::HistogramAxis => "#d7daeb",
        ThemeToken::HistogramLabel => "#3b6d8c",
        ThemeToken::TextMuted => "#9d9d9d",
        ThemeToken::Background if dark => "#1f1f1f",
        ThemeToken::Background => "#ffffff",
        ThemeToken::TextPrimary if dark => "#ececec",
        ThemeToken::TextPrimary => "#1a1a1a",
        ThemeToken::TimelineLine | ThemeToken::TimelineMarker if dark => "#ffffff",
        ThemeToken::TimelineLine | ThemeToken::TimelineMarker => "#3b6d8c",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use icefield_protocol::{Point, Rect};

    #[test]
    fn basic_svg_output() {
        let commands = vec![RenderCommand::DrawRect {
            rect: Rect::new(10.0, 20.0, 100.0, 18.0),
            color: ThemeToken::Accent,
            border_color: None,
            label: Some("Antarctica".into()),
            corner_radius: 10.0,
        }];
        let svg = render_svg(&commands, 800.0, 400.0, false);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>Antarctica</title>"));
        assert!(svg.contains("#36b5c8"));
        assert!(svg.contains(r#"rx="10""#));
    }

    #[test]
    fn escapes_xml_entities() {
        let commands = vec![RenderCommand::DrawText {
            position: Point::new(0.0, 0.0),
            text: "Politics & <Government>".into(),
            color: ThemeToken::TextPrimary,
            font_size: 12.0,
            align: TextAlign::Left,
            bold: false,
        }];
        let svg = render_svg(&commands, 400.0, 100.0, false);
        assert!(svg.contains("Politics &amp; &lt;Government&gt;"));
    }

    #[test]
    fn stacks_become_nested_groups() {
        let commands = vec![
            RenderCommand::PushOpacity { alpha: 0.5 },
            RenderCommand::PushTransform {
                translate: Point::new(56.0, 20.0),
                scale: Point::new(1.0, 1.0),
            },
            RenderCommand::DrawPolygon {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 1.0)],
                fill: Color::rgb(0xE6, 0x95, 0x5E),
                stroke: Some(ThemeToken::HexStroke),
                stroke_width: 0.5,
            },
            RenderCommand::PopTransform,
            RenderCommand::PopOpacity,
            RenderCommand::PopOpacity,
            RenderCommand::BeginGroup {
                id: "unclosed".into(),
                label: None,
            },
        ];
        let svg = render_svg(&commands, 100.0, 100.0, false);
        assert!(svg.contains(r#"<g opacity="0.5"><g transform="translate(56,20) scale(1,1)">"#));
        assert!(svg.contains(r##"<polygon points="0,0 1,0 0,1" fill="#e6955e" stroke="#808080" stroke-width="0.5"/>"##));
        assert_eq!(svg.matches("<g").count(), svg.matches("</g>").count());
    }

    #[test]
    fn timeline_palette_depends_on_theme() {
        let commands = vec![RenderCommand::DrawCircle {
            center: Point::new(40.0, 10.0),
            radius: 6.0,
            color: ThemeToken::TimelineMarker,
        }];
        assert!(render_svg(&commands, 10.0, 10.0, true).contains(r##"fill="#ffffff""##));
        assert!(render_svg(&commands, 10.0, 10.0, false).contains(r##"fill="#3b6d8c""##));
    }
}
