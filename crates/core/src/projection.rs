//! Map coordinates to screen pixels.
//!
//! Real cartographic projections are left to the caller; [`FitToBox`] is
//! a plain linear fit that works for data already in a planar reference
//! system (e.g. polar stereographic metres).

use icefield_protocol::{Point, Viewport};

pub trait Projection {
    /// Screen position of `(x, y)` in source coordinates, or `None` when the
    /// point cannot be projected.
    fn project(&self, x: f64, y: f64) -> Option<Point>;
}

/// Uniform scale plus translation, with the y axis flipped so north is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitToBox {
    scale: f64,
    translate: Point,
}

impl FitToBox {
    /// Fit the bounding box of `coords` into `viewport` minus `padding` on
    /// every side, centred, preserving aspect ratio. Returns `None` for an
    /// empty or non-finite input.
    pub fn fit(coords: impl IntoIterator<Item = (f64, f64)>, viewport: &Viewport, padding: f64) -> Option<Self> {
        let mut min = (f64::INFINITY, f64::INFINITY);
        let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in coords {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }
            min = (min.0.min(x), min.1.min(y));
            max = (max.0.max(x), max.1.max(y));
        }
        if !min.0.is_finite() {
            return None;
        }

        let inner_w = (viewport.width - 2.0 * padding).max(0.0);
        let inner_h = (viewport.height - 2.0 * padding).max(0.0);
        let span_x = max.0 - min.0;
        let span_y = max.1 - min.1;
        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (inner_w / span_x).min(inner_h / span_y),
            (true, false) => inner_w / span_x,
            (false, true) => inner_h / span_y,
            (false, false) => 1.0,
        };

        let center_x = viewport.x + viewport.width / 2.0;
        let center_y = viewport.y + viewport.height / 2.0;
        let mid = ((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0);
        Some(Self {
            scale,
            translate: Point::new(center_x - mid.0 * scale, center_y + mid.1 * scale),
        })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Projection for FitToBox {
    fn project(&self, x: f64, y: f64) -> Option<Point> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Point::new(
            self.translate.x + x * self.scale,
            self.translate.y - y * self.scale,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_and_flips() {
        let vp = Viewport::sized(200.0, 100.0);
        let fit = FitToBox::fit([(0.0, 0.0), (10.0, 10.0)], &vp, 0.0);
        let Some(fit) = fit else {
            panic!("fit failed");
        };
        assert_eq!(fit.scale(), 10.0);
        assert_eq!(fit.project(0.0, 0.0), Some(Point::new(50.0, 100.0)));
        assert_eq!(fit.project(10.0, 10.0), Some(Point::new(150.0, 0.0)));
        assert_eq!(fit.project(f64::NAN, 0.0), None);
    }

    #[test]
    fn empty_input_does_not_fit() {
        let vp = Viewport::sized(10.0, 10.0);
        assert!(FitToBox::fit(std::iter::empty(), &vp, 1.0).is_none());
    }

    #[test]
    fn single_point_is_centred() {
        let vp = Viewport::sized(40.0, 20.0);
        let fit = FitToBox::fit([(5.0, 5.0)], &vp, 2.0);
        assert_eq!(
            fit.and_then(|f| f.project(5.0, 5.0)),
            Some(Point::new(20.0, 10.0))
        );
    }
}
