//! SVG exports of the individual charts.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use icefield_core::model::{FinalizedPortrait, Meteorite};
use icefield_core::projection::{FitToBox, Projection};
use icefield_core::svg::render_svg;
use icefield_core::views::{
    StepId, render_heatmap, render_portrait_timeline, render_scroll, render_weight_histogram,
    render_year_histogram,
};
use icefield_core::{ScrollStep, StoryConfig};
use icefield_protocol::{Point, Viewport};

use crate::{read_array, read_story_data, write_output};

const HEATMAP_PADDING: f64 = 20.0;

#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Finalized portraits JSON array.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Portrait id to draw.
    #[arg(long)]
    id: String,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistogramKind {
    Year,
    Weight,
}

#[derive(Args, Debug)]
pub struct HistogramArgs {
    /// Cleansed specimens JSON array.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, value_enum, default_value_t = HistogramKind::Year)]
    kind: HistogramKind,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct HeatmapArgs {
    /// Cleansed specimens JSON array.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = 900.0)]
    width: f64,

    #[arg(long, default_value_t = 600.0)]
    height: f64,

    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    /// Output of `bundle`.
    #[arg(long)]
    data: PathBuf,

    /// Step slug, e.g. `collection_spot`, or its 0-based position.
    #[arg(long)]
    step: String,

    /// Fraction of the step scrolled through.
    #[arg(long, default_value_t = 0.5)]
    progress: f64,

    #[arg(long, default_value_t = 900.0)]
    width: f64,

    #[arg(long, default_value_t = 800.0)]
    height: f64,

    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn cmd_timeline(args: &TimelineArgs, config: &StoryConfig) -> anyhow::Result<()> {
    let portraits: Vec<FinalizedPortrait> = read_array(&args.in_path)?;
    let portrait = portraits
        .iter()
        .find(|p| p.id == args.id)
        .with_context(|| format!("no portrait '{}' in '{}'", args.id, args.in_path.display()))?;
    let commands = render_portrait_timeline(portrait, &config.timeline);
    let svg = render_svg(&commands, config.timeline.width, config.timeline.height, true);
    write_output(args.out.as_deref(), &svg)
}

pub fn cmd_histogram(args: &HistogramArgs, config: &StoryConfig) -> anyhow::Result<()> {
    let meteorites: Vec<Meteorite> = read_array(&args.in_path)?;
    let chart = &config.histogram;
    let commands = match args.kind {
        HistogramKind::Year => {
            let years: Vec<i32> = meteorites.iter().filter_map(|m| m.collection_year).collect();
            render_year_histogram(&years, chart)
        }
        HistogramKind::Weight => {
            let weights: Vec<f64> = meteorites.iter().map(|m| m.weight_gram).collect();
            render_weight_histogram(&weights, chart)
        }
    };
    tracing::debug!(kind = ?args.kind, commands = commands.len(), "rendered histogram");
    let svg = render_svg(&commands, chart.width, chart.height, false);
    write_output(args.out.as_deref(), &svg)
}

pub fn cmd_heatmap(args: &HeatmapArgs, config: &StoryConfig) -> anyhow::Result<()> {
    let meteorites: Vec<Meteorite> = read_array(&args.in_path)?;
    let viewport = Viewport::sized(args.width, args.height);
    let points = project_positions(&meteorites, &viewport);
    let commands = render_heatmap(&points, config.hexbin.heatmap_radius);
    let svg = render_svg(&commands, args.width, args.height, false);
    write_output(args.out.as_deref(), &svg)
}

pub fn cmd_step(args: &StepArgs, config: &StoryConfig) -> anyhow::Result<()> {
    let step = parse_step(&args.step)
        .with_context(|| format!("unknown step '{}'", args.step))?;
    let data = read_story_data(&args.data)?;
    let viewport = Viewport::sized(args.width, args.height);
    let scroll = ScrollStep::new(step.index(), args.progress);
    let commands = render_scroll(scroll, &data, config, &viewport);
    let svg = render_svg(&commands, args.width, args.height, false);
    write_output(args.out.as_deref(), &svg)
}

/// Longitude/latitude fitted into `viewport`.
fn project_positions(meteorites: &[Meteorite], viewport: &Viewport) -> Vec<Point> {
    let coords = meteorites.iter().map(|m| (m.longitude, m.latitude));
    let Some(projection) = FitToBox::fit(coords.clone(), viewport, HEATMAP_PADDING) else {
        tracing::warn!("no finite coordinates to draw");
        return Vec::new();
    };
    coords
        .filter_map(|(x, y)| projection.project(x, y))
        .collect()
}

fn parse_step(value: &str) -> Option<StepId> {
    if let Ok(index) = value.parse::<usize>() {
        return StepId::from_index(index);
    }
    StepId::ALL.into_iter().find(|step| step.slug() == value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_by_slug_or_position() {
        assert_eq!(parse_step("0"), Some(StepId::Title));
        assert_eq!(
            parse_step(StepId::CollectionSpot.slug()),
            Some(StepId::CollectionSpot)
        );
        assert_eq!(parse_step("99"), None);
        assert_eq!(parse_step("nowhere"), None);
    }

    #[test]
    fn positions_fit_the_viewport() {
        let meteorite = |lon: f64, lat: f64| Meteorite {
            id: String::new(),
            title: String::new(),
            latitude: lat,
            longitude: lon,
            weight_gram: 1.0,
            collection_year: None,
            link: None,
        };
        let viewport = Viewport::sized(200.0, 100.0);
        let points = project_positions(
            &[meteorite(-10.0, -80.0), meteorite(10.0, -70.0), meteorite(f64::NAN, 0.0)],
            &viewport,
        );
        assert_eq!(points.len(), 2);
        for p in &points {
            assert!(p.x >= 0.0 && p.x <= 200.0);
            assert!(p.y >= 0.0 && p.y <= 100.0);
        }
        // North is up.
        assert!(points[1].y < points[0].y);
    }
}
