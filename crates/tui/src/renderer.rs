//! Terminal preview of the story: render commands painted onto cells.

use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use icefield_core::views::{StepId, StoryData, render_scroll};
use icefield_core::{ScrollStep, StoryConfig};
use icefield_protocol::{Color as Rgba, Point, RenderCommand, TextAlign, ThemeToken, Viewport};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    widgets::Block,
};

/// Logical page the story is laid out on before scaling to the terminal.
const PAGE_WIDTH: f64 = 900.0;
const PAGE_HEIGHT: f64 = 800.0;
/// Progress moved per key press or wheel notch.
const SCROLL_STEP: f64 = 0.05;
const BACKGROUND: (u8, u8, u8) = (16, 18, 22);

fn theme_rgb(token: ThemeToken) -> (u8, u8, u8) {
    match token {
        ThemeToken::Background => BACKGROUND,
        ThemeToken::Accent | ThemeToken::AccentText | ThemeToken::MapBackground => (54, 181, 200),
        ThemeToken::TextOnAccent
        | ThemeToken::HeatStroke
        | ThemeToken::HeatLabelOnDark
        | ThemeToken::TimelineLine
        | ThemeToken::TimelineMarker => (255, 255, 255),
        ThemeToken::TextPrimary => (236, 236, 236),
        ThemeToken::TextMuted => (157, 157, 157),
        ThemeToken::BarMuted => (120, 120, 120),
        ThemeToken::BarLabelMuted => (133, 133, 133),
        ThemeToken::AxisLine => (90, 90, 90),
        ThemeToken::HexStroke => (128, 128, 128),
        ThemeToken::HeatLabelOnLight => (52, 52, 52),
        ThemeToken::MeteoriteMarker => (59, 59, 59),
        ThemeToken::TimelineHighlight => (255, 205, 0),
        ThemeToken::HistogramBar => (109, 203, 211),
        ThemeToken::HistogramAxis => (215, 218, 235),
        ThemeToken::HistogramLabel => (109, 160, 190),
    }
}

/// Mix `rgb` over the page background at `alpha`.
fn blend((r, g, b): (u8, u8, u8), alpha: f64) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |c: u8, bg: u8| (f64::from(bg) + (f64::from(c) - f64::from(bg)) * alpha).round() as u8;
    Color::Rgb(
        mix(r, BACKGROUND.0),
        mix(g, BACKGROUND.1),
        mix(b, BACKGROUND.2),
    )
}

#[derive(Debug, Clone, Copy)]
struct Transform {
    translate: Point,
    scale: Point,
}

impl Transform {
    const IDENTITY: Self = Self {
        translate: Point { x: 0.0, y: 0.0 },
        scale: Point { x: 1.0, y: 1.0 },
    };

    fn then(self, translate: Point, scale: Point) -> Self {
        Self {
            translate: Point::new(
                self.translate.x + self.scale.x * translate.x,
                self.translate.y + self.scale.y * translate.y,
            ),
            scale: Point::new(self.scale.x * scale.x, self.scale.y * scale.y),
        }
    }

    fn apply(self, p: Point) -> Point {
        Point::new(
            self.translate.x + self.scale.x * p.x,
            self.translate.y + self.scale.y * p.y,
        )
    }
}

/// Paints commands laid out on `viewport` into `area` of a buffer.
struct CellPainter<'a> {
    buf: &'a mut Buffer,
    area: Rect,
    cols_per_unit: f64,
    rows_per_unit: f64,
    transforms: Vec<Transform>,
    alphas: Vec<f64>,
}

impl<'a> CellPainter<'a> {
    fn new(buf: &'a mut Buffer, area: Rect, viewport: &Viewport) -> Self {
        Self {
            buf,
            area,
            cols_per_unit: f64::from(area.width) / viewport.width.max(1.0),
            rows_per_unit: f64::from(area.height) / viewport.height.max(1.0),
            transforms: vec![Transform::IDENTITY],
            alphas: vec![1.0],
        }
    }

    fn transform(&self) -> Transform {
        self.transforms.last().copied().unwrap_or(Transform::IDENTITY)
    }

    fn alpha(&self) -> f64 {
        self.alphas.last().copied().unwrap_or(1.0)
    }

    /// Fractional cell coordinates of a point in layout units.
    fn to_cell(&self, p: Point) -> (f64, f64) {
        let p = self.transform().apply(p);
        (p.x * self.cols_per_unit, p.y * self.rows_per_unit)
    }

    fn cell(&mut self, col: f64, row: f64) -> Option<&mut ratatui::buffer::Cell> {
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col.floor() as u16, row.floor() as u16);
        if col >= self.area.width || row >= self.area.height {
            return None;
        }
        self.buf
            .cell_mut(Position::new(self.area.x + col, self.area.y + row))
    }

    fn fill_cell(&mut self, col: f64, row: f64, color: Color) {
        if let Some(cell) = self.cell(col, row) {
            cell.set_char(' ').set_bg(color);
        }
    }

    fn glyph(&mut self, col: f64, row: f64, ch: char, color: Color) {
        if let Some(cell) = self.cell(col, row) {
            cell.set_char(ch).set_fg(color);
        }
    }

    fn paint(&mut self, commands: &[RenderCommand]) {
        for command in commands {
            match command {
                RenderCommand::PushOpacity { alpha } => {
                    let alpha = self.alpha() * alpha.clamp(0.0, 1.0);
                    self.alphas.push(alpha);
                }
                RenderCommand::PopOpacity => {
                    if self.alphas.len() > 1 {
                        self.alphas.pop();
                    }
                }
                RenderCommand::PushTransform { translate, scale } => {
                    let next = self.transform().then(*translate, *scale);
                    self.transforms.push(next);
                }
                RenderCommand::PopTransform => {
                    if self.transforms.len() > 1 {
                        self.transforms.pop();
                    }
                }
                RenderCommand::BeginGroup { .. } | RenderCommand::EndGroup => {}
                _ if self.alpha() <= 0.0 => {}
                RenderCommand::DrawRect { rect, color, .. } => {
                    let color = blend(theme_rgb(*color), self.alpha());
                    let (x0, y0) = self.to_cell(Point::new(rect.x, rect.y));
                    let (x1, y1) = self.to_cell(Point::new(rect.x + rect.w, rect.bottom()));
                    self.fill_box((x0.min(x1), y0.min(y1)), (x0.max(x1), y0.max(y1)), color);
                }
                RenderCommand::DrawPolygon { points, fill, .. } => {
                    let alpha = f64::from(fill.a) / 255.0 * self.alpha();
                    let color = blend(rgb_of(*fill), alpha);
                    let cells: Vec<(f64, f64)> = points.iter().map(|p| self.to_cell(*p)).collect();
                    self.fill_polygon(&cells, color);
                }
                RenderCommand::DrawCircle { center, color, .. } => {
                    let (col, row) = self.to_cell(*center);
                    let color = blend(theme_rgb(*color), self.alpha());
                    self.glyph(col, row, '●', color);
                }
                RenderCommand::DrawLine { from, to, color, .. } => {
                    let color = blend(theme_rgb(*color), self.alpha());
                    let from = self.to_cell(*from);
                    let to = self.to_cell(*to);
                    self.line(from, to, color);
                }
                RenderCommand::DrawText {
                    position,
                    text,
                    color,
                    align,
                    ..
                } => {
                    let color = blend(theme_rgb(*color), self.alpha());
                    let (col, row) = self.to_cell(*position);
                    // Baselines sit at the bottom of the glyph box.
                    let row = (row - 0.5).max(0.0);
                    let width = text.chars().count() as f64;
                    let start = match align {
                        TextAlign::Left => col,
                        TextAlign::Center => col - width / 2.0,
                        TextAlign::Right => col - width,
                    };
                    for (i, ch) in text.chars().enumerate() {
                        self.glyph(start + i as f64, row, ch, color);
                    }
                }
            }
        }
    }

    fn fill_box(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: Color) {
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        let (col0, row0) = (x0.floor(), y0.floor());
        // Anything with area gets at least one cell.
        let cols = ((x1.ceil() - col0) as usize).max(1);
        let rows = ((y1.ceil() - row0) as usize).max(1);
        for r in 0..rows {
            for c in 0..cols {
                self.fill_cell(col0 + c as f64, row0 + r as f64, color);
            }
        }
    }

    fn fill_polygon(&mut self, cells: &[(f64, f64)], color: Color) {
        if cells.len() < 3 {
            return;
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in cells {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        if !min_x.is_finite() || !max_x.is_finite() || !min_y.is_finite() || !max_y.is_finite() {
            return;
        }
        let min_col = min_x.floor().max(0.0);
        let min_row = min_y.floor().max(0.0);
        let max_col = max_x.ceil().min(f64::from(self.area.width));
        let max_row = max_y.ceil().min(f64::from(self.area.height));

        let mut painted = false;
        let mut row = min_row;
        while row < max_row {
            let mut col = min_col;
            while col < max_col {
                if contains(cells, (col + 0.5, row + 0.5)) {
                    self.fill_cell(col, row, color);
                    painted = true;
                }
                col += 1.0;
            }
            row += 1.0;
        }
        // Polygons smaller than a cell still show up as one.
        if !painted {
            self.fill_cell((min_x + max_x) / 2.0, (min_y + max_y) / 2.0, color);
        }
    }

    fn line(&mut self, (x0, y0): (f64, f64), (x1, y1): (f64, f64), color: Color) {
        let (dx, dy) = (x1 - x0, y1 - y0);
        let ch = if dy.abs() < 0.5 {
            '─'
        } else if dx.abs() < 0.5 {
            '│'
        } else {
            '·'
        };
        let steps = dx.abs().max(dy.abs()).ceil().clamp(1.0, 4096.0) as usize;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            self.glyph(x0 + dx * t, y0 + dy * t, ch, color);
        }
    }
}

fn rgb_of(color: Rgba) -> (u8, u8, u8) {
    (color.r, color.g, color.b)
}

/// Even-odd point-in-polygon test.
fn contains(polygon: &[(f64, f64)], (px, py): (f64, f64)) -> bool {
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Paint `commands`, laid out on `viewport`, into `area` of `buf`.
pub fn paint_commands(commands: &[RenderCommand], viewport: &Viewport, area: Rect, buf: &mut Buffer) {
    CellPainter::new(buf, area, viewport).paint(commands);
}

/// Where the reader is in the story, moved by scroll input.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StoryCursor {
    scroll: ScrollStep,
}

impl StoryCursor {
    fn new() -> Self {
        Self {
            scroll: ScrollStep::new(0, 0.0),
        }
    }

    fn last_index() -> usize {
        StepId::ALL.len() - 1
    }

    /// Move by `delta` progress, rolling over into neighbouring steps. The
    /// story is clamped at both ends.
    fn scroll_by(&mut self, delta: f64) {
        let mut index = self.scroll.index;
        let mut progress = self.scroll.progress + delta;
        while progress > 1.0 && index < Self::last_index() {
            progress -= 1.0;
            index += 1;
        }
        while progress < 0.0 && index > 0 {
            progress += 1.0;
            index -= 1;
        }
        self.scroll = ScrollStep::new(index, progress.clamp(0.0, 1.0));
    }

    /// Jump to the middle of the next (`forward`) or previous step.
    fn jump(&mut self, forward: bool) {
        let index = if forward {
            (self.scroll.index + 1).min(Self::last_index())
        } else {
            self.scroll.index.saturating_sub(1)
        };
        self.scroll = ScrollStep::new(index, 0.5);
    }

    fn step(&self) -> StepId {
        StepId::from_index(self.scroll.index).unwrap_or(StepId::Title)
    }
}

/// Interactive story preview. Arrow keys or the mouse wheel scroll, page
/// keys jump between steps, `q` quits.
pub fn run_story(data: &StoryData, config: &StoryConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = story_loop(&mut terminal, data, config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn story_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    data: &StoryData,
    config: &StoryConfig,
) -> Result<()> {
    let viewport = Viewport::sized(PAGE_WIDTH, PAGE_HEIGHT);
    let mut cursor = StoryCursor::new();

    loop {
        let commands = render_scroll(cursor.scroll, data, config, &viewport);
        let step = cursor.step();
        let opacity = config.fade.opacity(cursor.scroll.progress);

        terminal.draw(|frame| {
            let area = frame.area();

            let header_area = Rect::new(0, 0, area.width, 1);
            let header = Block::default()
                .title(format!(
                    " icefield | step {}/{} {} | progress {:.2} opacity {:.2} | ↑↓ scroll  PgUp/PgDn step  q quit ",
                    cursor.scroll.index + 1,
                    StepId::ALL.len(),
                    step.slug(),
                    cursor.scroll.progress,
                    opacity,
                ))
                .style(Style::default().fg(Color::White).bg(Color::DarkGray));
            frame.render_widget(header, header_area);

            let content_area = Rect::new(0, 1, area.width, area.height.saturating_sub(1));
            let background = Block::default().style(Style::default().bg(blend(BACKGROUND, 1.0)));
            frame.render_widget(background, content_area);
            paint_commands(&commands, &viewport, content_area, frame.buffer_mut());
        })?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => cursor.scroll_by(SCROLL_STEP),
                    KeyCode::Up | KeyCode::Char('k') => cursor.scroll_by(-SCROLL_STEP),
                    KeyCode::PageDown | KeyCode::Char(' ') => cursor.jump(true),
                    KeyCode::PageUp => cursor.jump(false),
                    KeyCode::Home => cursor = StoryCursor::new(),
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => cursor.scroll_by(SCROLL_STEP),
                    MouseEventKind::ScrollUp => cursor.scroll_by(-SCROLL_STEP),
                    _ => {}
                },
                _ => {}
            }
            tracing::trace!(index = cursor.scroll.index, progress = cursor.scroll.progress, "scrolled");
        }
    }
    Ok(())
}
