//! Life-event timeline layout.
//!
//! Events sit on a vertical line at their true chronological position
//! (`dot_y`). Their text labels (`desc_y`) start at the same position and are
//! nudged apart until neighbouring labels are at least `minimum_gap` pixels
//! apart, staying inside the line and never swapping order.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Description of the synthesized event marking when the portrait was made.
pub const PORTRAIT_EVENT_DESCRIPTION: &str = "This portrait was drawn";

/// Pixels each label moves per nudge.
pub const NUDGE_STEP: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("line must run downwards: start {start} >= end {end}")]
    InvertedBounds { start: f64, end: f64 },
    #[error("minimum gap must be positive and finite, got {0}")]
    InvalidGap(f64),
}

/// A monotonic increasing mapping from year to pixel position.
pub trait PositionScale {
    fn position(&self, year: f64) -> f64;
}

/// Linear interpolation from a domain onto a range.
///
/// A degenerate domain (both ends equal) maps everything to the middle of
/// the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }
}

impl PositionScale for LinearScale {
    fn position(&self, year: f64) -> f64 {
        self.apply(year)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Life,
    PortraitDrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub year: i32,
    pub description: String,
    pub kind: EventKind,
    /// True position on the line.
    pub dot_y: f64,
    /// Label position after collision resolution.
    pub desc_y: f64,
}

impl TimelineEvent {
    pub fn life(year: i32, description: impl Into<String>) -> Self {
        Self {
            year,
            description: description.into(),
            kind: EventKind::Life,
            dot_y: 0.0,
            desc_y: 0.0,
        }
    }

    pub fn portrait_drawn(year: i32) -> Self {
        Self {
            kind: EventKind::PortraitDrawn,
            ..Self::life(year, PORTRAIT_EVENT_DESCRIPTION)
        }
    }

    pub fn is_portrait(&self) -> bool {
        self.kind == EventKind::PortraitDrawn
    }
}

/// The vertical extent of the timeline line, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineBounds {
    pub start: f64,
    pub end: f64,
}

impl LineBounds {
    pub fn new(start: f64, end: f64) -> Result<Self, TimelineError> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(TimelineError::InvertedBounds { start, end })
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    fn clamp(&self, y: f64) -> f64 {
        y.clamp(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStatus {
    /// The nudging loop reached the minimum gap everywhere.
    Converged,
    /// The loop stalled; the spreading pass satisfied the minimum gap.
    Spread,
    /// The line is too short for every label at the minimum gap. Labels are
    /// in order inside the bounds but some gaps are smaller.
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutOutcome {
    pub status: LayoutStatus,
    pub iterations: usize,
}

/// Label collision resolution along one line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelLayout {
    pub bounds: LineBounds,
    pub minimum_gap: f64,
}

impl LabelLayout {
    pub fn new(bounds: LineBounds, minimum_gap: f64) -> Result<Self, TimelineError> {
        if minimum_gap.is_finite() && minimum_gap > 0.0 {
            Ok(Self {
                bounds,
                minimum_gap,
            })
        } else {
            Err(TimelineError::InvalidGap(minimum_gap))
        }
    }

    /// Whether `count` labels fit on the line at the minimum gap.
    pub fn fits(&self, count: usize) -> bool {
        count < 2 || self.bounds.length() >= self.minimum_gap * (count - 1) as f64
    }

    /// Upper bound on nudge iterations for `count` labels on a line they
    /// fit on: `n * ceil(length / step)`, at least one.
    pub fn iteration_cap(&self, count: usize) -> usize {
        let steps = (self.bounds.length() / NUDGE_STEP).ceil();
        ((count as f64 * steps) as usize).max(1)
    }

    /// Set `dot_y` from `scale` and lay out `desc_y` for events already
    /// sorted by year.
    pub fn apply(&self, events: &mut [TimelineEvent], scale: &impl PositionScale) -> LayoutOutcome {
        for event in events.iter_mut() {
            event.dot_y = scale.position(f64::from(event.year));
        }
        let mut positions: Vec<f64> = events.iter().map(|e| e.dot_y).collect();
        let outcome = self.resolve(&mut positions);
        for (event, y) in events.iter_mut().zip(positions) {
            event.desc_y = y;
        }
        outcome
    }

    /// Resolve label positions in place.
    pub fn resolve(&self, positions: &mut [f64]) -> LayoutOutcome {
        if positions.len() < 2 {
            return LayoutOutcome {
                status: LayoutStatus::Converged,
                iterations: 0,
            };
        }

        // Nudging cannot satisfy the gap on a line that is too short.
        if !self.fits(positions.len()) {
            self.spread(positions);
            tracing::warn!(
                labels = positions.len(),
                length = self.bounds.length(),
                minimum_gap = self.minimum_gap,
                "timeline too short for labels, collapsing"
            );
            return LayoutOutcome {
                status: LayoutStatus::Collapsed,
                iterations: 0,
            };
        }

        let cap = self.iteration_cap(positions.len());
        let mut iterations = 0;
        while iterations < cap {
            let Some((gap, index)) = smallest_gap(positions) else {
                break;
            };
            if gap >= self.minimum_gap {
                tracing::debug!(iterations, "timeline labels converged");
                return LayoutOutcome {
                    status: LayoutStatus::Converged,
                    iterations,
                };
            }
            iterations += 1;
            if !self.nudge(positions, index) {
                tracing::debug!(iterations, index, "timeline nudge made no progress");
                break;
            }
        }

        if smallest_gap(positions).is_some_and(|(gap, _)| gap >= self.minimum_gap) {
            return LayoutOutcome {
                status: LayoutStatus::Converged,
                iterations,
            };
        }

        self.spread(positions);
        LayoutOutcome {
            status: LayoutStatus::Spread,
            iterations,
        }
    }

    /// Push the pair `(index - 1, index)` apart. Returns false when neither
    /// label could move.
    fn nudge(&self, positions: &mut [f64], index: usize) -> bool {
        let (prev, next) = (index - 1, index);
        let before = (positions[prev], positions[next]);
        if positions[prev] <= self.bounds.start {
            positions[next] = self.bounds.clamp(positions[next] + 2.0 * NUDGE_STEP);
        } else if positions[next] >= self.bounds.end {
            positions[prev] = self.bounds.clamp(positions[prev] - 2.0 * NUDGE_STEP);
        } else {
            positions[prev] = self.bounds.clamp(positions[prev] - NUDGE_STEP);
            positions[next] = self.bounds.clamp(positions[next] + NUDGE_STEP);
        }
        before != (positions[prev], positions[next])
    }

    /// Forward then backward sweep enforcing the minimum gap, then clamp.
    fn spread(&self, positions: &mut [f64]) {
        let gap = self.minimum_gap;
        for i in 1..positions.len() {
            positions[i] = positions[i].max(positions[i - 1] + gap);
        }
        if let Some(last) = positions.last_mut() {
            *last = last.min(self.bounds.end);
        }
        for i in (0..positions.len() - 1).rev() {
            positions[i] = positions[i].min(positions[i + 1] - gap);
        }
        for y in positions.iter_mut() {
            *y = self.bounds.clamp(*y);
        }
    }
}

/// Smallest adjacent gap and the index of the later label of that pair.
/// Ties go to the earliest pair.
fn smallest_gap(positions: &[f64]) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    for i in 1..positions.len() {
        let gap = positions[i] - positions[i - 1];
        if best.is_none_or(|(min, _)| gap < min) {
            best = Some((gap, i));
        }
    }
    best
}

/// A laid-out timeline for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
    pub scale: LinearScale,
    pub outcome: LayoutOutcome,
}

impl Timeline {
    /// Merge life events with the portrait marker, sort chronologically and
    /// lay out labels. The scale spans every event, the marker included.
    pub fn build(
        life_events: impl IntoIterator<Item = TimelineEvent>,
        portrait_year: Option<i32>,
        layout: &LabelLayout,
    ) -> Self {
        let mut events: Vec<TimelineEvent> = life_events.into_iter().collect();
        if let Some(year) = portrait_year {
            events.push(TimelineEvent::portrait_drawn(year));
        }
        events.sort_by_key(|e| e.year);

        let min_year = events.first().map_or(0, |e| e.year);
        let max_year = events.last().map_or(0, |e| e.year);
        let scale = LinearScale::new(
            (f64::from(min_year), f64::from(max_year)),
            (layout.bounds.start, layout.bounds.end),
        );
        let outcome = layout.apply(&mut events, &scale);
        Self {
            events,
            scale,
            outcome,
        }
    }
}
