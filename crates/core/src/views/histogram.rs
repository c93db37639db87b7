use icefield_protocol::{Point, Rect, RenderCommand, SharedStr, TextAlign, ThemeToken};

use crate::config::ChartConfig;
use crate::histogram::{Bin, nice_ceiling, weight_histogram, year_histogram};
use crate::timeline::LinearScale;

const BAR_PADDING: f64 = 5.0;
const MIN_BAR_HEIGHT: f64 = 2.0;
const AXIS_WIDTH: f64 = 3.0;
const TICK_PADDING: f64 = 8.0;
const YEAR_TICK_STEP: i32 = 10;
const YEAR_TICK_FONT: f64 = 15.0;
const WEIGHT_TICK_FONT: f64 = 12.0;
/// Inner and outer padding of the weight band scale, as a fraction of a step.
const BAND_PADDING: f64 = 0.1;

fn open(id: &str, label: &str, chart: &ChartConfig) -> Vec<RenderCommand> {
    vec![
        RenderCommand::BeginGroup {
            id: SharedStr::from(id),
            label: Some(SharedStr::from(label)),
        },
        RenderCommand::PushTransform {
            translate: Point::new(chart.margin_left, chart.margin_top),
            scale: Point::new(1.0, 1.0),
        },
    ]
}

fn close(commands: &mut Vec<RenderCommand>, chart: &ChartConfig) {
    let baseline = chart.inner_height();
    commands.push(RenderCommand::DrawLine {
        from: Point::new(0.0, baseline),
        to: Point::new(chart.inner_width(), baseline),
        color: ThemeToken::HistogramAxis,
        width: AXIS_WIDTH,
    });
    commands.push(RenderCommand::PopTransform);
    commands.push(RenderCommand::EndGroup);
}

/// Bar height for `count` on a y axis running from 0 to `top`.
fn bar_height(count: usize, top: f64, inner_height: f64) -> f64 {
    count as f64 / top * inner_height
}

fn y_top(bins: impl Iterator<Item = usize>) -> f64 {
    nice_ceiling(bins.max().unwrap_or(0) as f64)
}

/// Collected-year histogram with decade ticks.
pub fn render_year_histogram(years: &[i32], chart: &ChartConfig) -> Vec<RenderCommand> {
    let bins = year_histogram(years);
    let (Some(&min_year), Some(&max_year)) = (years.iter().min(), years.iter().max()) else {
        return Vec::new();
    };
    render_year_bins(&bins, (min_year, max_year), chart)
}

fn render_year_bins(bins: &[Bin], (min_year, max_year): (i32, i32), chart: &ChartConfig) -> Vec<RenderCommand> {
    let inner_height = chart.inner_height();
    let x = LinearScale::new(
        (f64::from(min_year), f64::from(max_year)),
        (0.0, chart.inner_width()),
    );
    let top = y_top(bins.iter().map(|b| b.count));

    let mut commands = open("year-histogram", "Collected year", chart);
    for bin in bins {
        let h = bar_height(bin.count, top, inner_height);
        let left = x.apply(bin.x0);
        let width = (x.apply(bin.x1) - left - BAR_PADDING).max(0.0);
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(left + BAR_PADDING / 2.0, inner_height - h, width, h),
            color: ThemeToken::HistogramBar,
            border_color: None,
            label: Some(SharedStr::from(format!(
                "Collected Year: {} - {}\nNumber of Meteorites: {}",
                bin.x0,
                bin.x1 - 1.0,
                bin.count
            ))),
            corner_radius: 0.0,
        });
    }

    let first_tick = (min_year as f64 / f64::from(YEAR_TICK_STEP)).ceil() as i32 * YEAR_TICK_STEP;
    for tick in (first_tick..=max_year).step_by(YEAR_TICK_STEP as usize) {
        commands.push(RenderCommand::DrawText {
            position: Point::new(
                x.apply(f64::from(tick)),
                inner_height + TICK_PADDING + YEAR_TICK_FONT,
            ),
            text: SharedStr::from(tick.to_string()),
            color: ThemeToken::HistogramLabel,
            font_size: YEAR_TICK_FONT,
            align: TextAlign::Center,
            bold: true,
        });
    }

    close(&mut commands, chart);
    commands
}

/// Weight histogram over the fixed gram classes, one band per non-empty
/// class. Bars never shrink below a sliver so single specimens stay
/// visible.
pub fn render_weight_histogram(weights_grams: &[f64], chart: &ChartConfig) -> Vec<RenderCommand> {
    let bins = weight_histogram(weights_grams);
    if bins.is_empty() {
        return Vec::new();
    }
    let inner_height = chart.inner_height();
    let n = bins.len() as f64;
    let step = chart.inner_width() / (n - BAND_PADDING + 2.0 * BAND_PADDING);
    let bandwidth = step * (1.0 - BAND_PADDING);
    let start = step * BAND_PADDING;
    let top = y_top(bins.iter().map(|b| b.bin.count));

    let mut commands = open("weight-histogram", "Weight", chart);
    for (i, weight_bin) in bins.iter().enumerate() {
        let band_x = start + step * i as f64;
        let h = bar_height(weight_bin.bin.count, top, inner_height).max(MIN_BAR_HEIGHT);
        commands.push(RenderCommand::DrawRect {
            rect: Rect::new(
                band_x + BAR_PADDING,
                inner_height - h,
                (bandwidth - BAR_PADDING).max(0.0),
                h,
            ),
            color: ThemeToken::HistogramBar,
            border_color: None,
            label: Some(SharedStr::from(format!(
                "Weight: {}\nNumber of Meteorites: {}",
                weight_bin.label, weight_bin.bin.count
            ))),
            corner_radius: 0.0,
        });
        commands.push(RenderCommand::DrawText {
            position: Point::new(
                band_x + bandwidth / 2.0,
                inner_height + TICK_PADDING + WEIGHT_TICK_FONT,
            ),
            text: SharedStr::from(weight_bin.label.as_str()),
            color: ThemeToken::HistogramLabel,
            font_size: WEIGHT_TICK_FONT,
            align: TextAlign::Center,
            bold: true,
        });
    }

    close(&mut commands, chart);
    commands
}
