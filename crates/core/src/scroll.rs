//! Scroll progress to visibility.
//!
//! A scroll-tracking source reports, for the step currently in view, its
//! index and how far through the step the reader is. Views never keep
//! state between scroll events: every event produces a fresh
//! [`RenderState`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fraction of a step spent fading at each end when nothing else is
/// configured.
pub const DEFAULT_FADE_THRESHOLD: f64 = 0.25;

#[derive(Debug, Error, PartialEq)]
pub enum ScrollError {
    #[error("fade threshold must be in (0, 0.5], got {0}")]
    InvalidThreshold(f64),
}

/// Position of the reader within the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollStep {
    /// 0-based ordinal of the step in view.
    pub index: usize,
    /// Fraction of the step's scroll height traversed, in `[0, 1]`.
    pub progress: f64,
}

impl ScrollStep {
    pub fn new(index: usize, progress: f64) -> Self {
        Self { index, progress }
    }
}

/// Trapezoidal fade envelope: ramp up over `[0, t)`, hold at 1 over
/// `[t, 1 - t]`, ramp down over `(1 - t, 1]`.
///
/// No validation: NaN in gives NaN out, and progress outside `[0, 1]`
/// extrapolates the nearer ramp, so both `progress < 0` and
/// `progress > 1` give negative opacities. Progress `1` gives exactly `0`.
/// With `threshold >= 0.5` there is no plateau and the envelope
/// degenerates into a triangle peaking at `progress == threshold`.
pub fn opacity_for_progress(progress: f64, threshold: f64) -> f64 {
    if progress < threshold {
        progress / threshold
    } else if progress <= 1.0 - threshold {
        1.0
    } else {
        // Same line as `1 - (p - (1 - t)) / t`, without rounding `1 - t`.
        (1.0 - progress) / threshold
    }
}

/// A validated fade envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeEnvelope {
    threshold: f64,
}

impl FadeEnvelope {
    /// Accepts thresholds in `(0, 0.5]`; `0.5` is the triangular limit with
    /// a single full-opacity point.
    pub fn new(threshold: f64) -> Result<Self, ScrollError> {
        if threshold > 0.0 && threshold <= 0.5 {
            Ok(Self { threshold })
        } else {
            Err(ScrollError::InvalidThreshold(threshold))
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Opacity for `progress`, clamped into `[0, 1]` first.
    pub fn opacity(&self, progress: f64) -> f64 {
        opacity_for_progress(progress.clamp(0.0, 1.0), self.threshold)
    }
}

impl Default for FadeEnvelope {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FADE_THRESHOLD,
        }
    }
}

impl<'de> Deserialize<'de> for FadeEnvelope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            threshold: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        FadeEnvelope::new(raw.threshold).map_err(serde::de::Error::custom)
    }
}

/// Everything a step renderer needs to know about the current scroll
/// position, computed from scratch on each event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderState<S> {
    pub step: S,
    pub index: usize,
    pub progress: f64,
    pub opacity: f64,
}

impl<S: Copy> RenderState<S> {
    pub fn compute(step: S, scroll: ScrollStep, envelope: &FadeEnvelope) -> Self {
        Self {
            step,
            index: scroll.index,
            progress: scroll.progress,
            opacity: envelope.opacity(scroll.progress),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn worked_example_quarter_threshold() {
        let t = 0.25;
        assert_eq!(opacity_for_progress(0.0, t), 0.0);
        assert!(close(opacity_for_progress(0.1, t), 0.4));
        assert_eq!(opacity_for_progress(0.25, t), 1.0);
        assert_eq!(opacity_for_progress(0.5, t), 1.0);
        assert!(close(opacity_for_progress(0.8, t), 0.8));
        assert!(close(opacity_for_progress(1.0, t), 0.0));
    }

    #[test]
    fn plateau_edges_are_exactly_one() {
        for i in 1..50 {
            let t = f64::from(i) / 100.0;
            assert_eq!(opacity_for_progress(t, t), 1.0, "t={t}");
            assert_eq!(opacity_for_progress(1.0 - t, t), 1.0, "t={t}");
        }
    }

    #[test]
    fn ramps_are_monotonic_and_in_range() {
        for i in 1..50 {
            let t = f64::from(i) / 100.0;
            let mut prev = f64::NEG_INFINITY;
            for k in 0..=100 {
                let p = t * f64::from(k) / 100.0;
                let o = opacity_for_progress(p, t);
                assert!(o >= prev, "rising ramp decreased at p={p}, t={t}");
                assert!((0.0..=1.0).contains(&o));
                prev = o;
            }
            let mut prev = f64::INFINITY;
            for k in 0..=100 {
                let p = ((1.0 - t) + t * f64::from(k) / 100.0).min(1.0);
                let o = opacity_for_progress(p, t);
                assert!(o <= prev, "falling ramp increased at p={p}, t={t}");
                assert!((0.0..=1.0).contains(&o));
                prev = o;
            }
        }
    }

    #[test]
    fn out_of_range_progress_extrapolates_both_ramps() {
        for t in [0.1, 0.2, 0.25, 0.3, 0.5] {
            assert_eq!(opacity_for_progress(1.0, t), 0.0, "t={t}");
            assert!(opacity_for_progress(-0.1, t) < 0.0, "t={t}");
            assert!(opacity_for_progress(1.1, t) < 0.0, "t={t}");
        }
        assert!(close(opacity_for_progress(-0.1, 0.25), -0.4));
        assert!(close(opacity_for_progress(1.1, 0.25), -0.4));
        assert_eq!(FadeEnvelope::default().opacity(1.1), 0.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(opacity_for_progress(f64::NAN, 0.25).is_nan());
        assert!(FadeEnvelope::default().opacity(f64::NAN).is_nan());
    }

    #[test]
    fn half_threshold_is_triangular() {
        assert!(close(opacity_for_progress(0.25, 0.5), 0.5));
        assert_eq!(opacity_for_progress(0.5, 0.5), 1.0);
        assert!(close(opacity_for_progress(0.75, 0.5), 0.5));
    }

    #[test]
    fn envelope_rejects_bad_thresholds() {
        assert_eq!(FadeEnvelope::new(0.0), Err(ScrollError::InvalidThreshold(0.0)));
        assert!(FadeEnvelope::new(0.6).is_err());
        assert!(FadeEnvelope::new(f64::NAN).is_err());
        assert!(FadeEnvelope::new(0.5).is_ok());
    }

    #[test]
    fn envelope_clamps_progress() {
        let env = FadeEnvelope::new(0.2).unwrap_or_default();
        assert_eq!(env.opacity(-0.3), 0.0);
        assert!(close(env.opacity(1.7), 0.0));
    }

    #[test]
    fn envelope_deserialization_validates() {
        let ok: Result<FadeEnvelope, _> = serde_json::from_str(r#"{"threshold":0.1}"#);
        assert!(ok.is_ok());
        let bad: Result<FadeEnvelope, _> = serde_json::from_str(r#"{"threshold":0.9}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn render_state_is_recomputed_per_event() {
        let env = FadeEnvelope::default();
        let a = RenderState::compute("climate", ScrollStep::new(3, 0.05), &env);
        let b = RenderState::compute("climate", ScrollStep::new(3, 0.5), &env);
        assert!(close(a.opacity, 0.2));
        assert_eq!(b.opacity, 1.0);
        assert!(a.is_visible());
        assert!(!RenderState::compute("x", ScrollStep::new(0, 0.0), &env).is_visible());
    }
}
