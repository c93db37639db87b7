//! Hexagonal binning of planar points.
//!
//! Pointy-top hexagons on a grid whose odd rows are shifted half a column.
//! Each point lands in the bin with the nearest centre.

use std::collections::HashMap;
use std::f64::consts::PI;

use icefield_protocol::Point;

/// One occupied hexagon.
#[derive(Debug, Clone, PartialEq)]
pub struct HexBin<T> {
    /// Centre of the hexagon.
    pub center: Point,
    pub members: Vec<T>,
}

impl<T> HexBin<T> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hexbin {
    radius: f64,
    dx: f64,
    dy: f64,
}

impl Hexbin {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            dx: radius * 2.0 * (PI / 3.0).sin(),
            dy: radius * 1.5,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Bin `items`, locating each with `position`. Points with a NaN
    /// coordinate are skipped. Bins come back in the order their first
    /// member was seen.
    pub fn bin<T>(
        &self,
        items: impl IntoIterator<Item = T>,
        position: impl Fn(&T) -> Point,
    ) -> Vec<HexBin<T>> {
        let mut bins: Vec<HexBin<T>> = Vec::new();
        let mut by_cell: HashMap<(i64, i64), usize> = HashMap::new();

        for item in items {
            let p = position(&item);
            if p.x.is_nan() || p.y.is_nan() {
                continue;
            }
            let (col, row) = self.cell(p);
            let slot = *by_cell.entry((col as i64, row as i64)).or_insert_with(|| {
                bins.push(HexBin {
                    center: Point::new((col + row_shift(row)) * self.dx, row * self.dy),
                    members: Vec::new(),
                });
                bins.len() - 1
            });
            bins[slot].members.push(item);
        }
        bins
    }

    /// Grid column and row of the hexagon whose centre is nearest `p`.
    fn cell(&self, p: Point) -> (f64, f64) {
        let py = p.y / self.dy;
        let mut row = js_round(py);
        let px = p.x / self.dx - row_shift(row);
        let mut col = js_round(px);
        let py1 = py - row;

        // Near a row boundary the neighbouring row's centre may be closer.
        if py1.abs() * 3.0 > 1.0 {
            let px1 = px - col;
            let col2 = col + if px < col { -0.5 } else { 0.5 };
            let row2 = row + if py < row { -1.0 } else { 1.0 };
            let px2 = px - col2;
            let py2 = py - row2;
            if px1 * px1 + py1 * py1 > px2 * px2 + py2 * py2 {
                col = col2 + if row_shift(row) > 0.0 { 0.5 } else { -0.5 };
                row = row2;
            }
        }
        (col, row)
    }

    /// Corner offsets of a hexagon relative to its centre, clockwise from
    /// the top.
    pub fn corners(&self) -> [Point; 6] {
        std::array::from_fn(|k| {
            let angle = k as f64 * PI / 3.0;
            Point::new(angle.sin() * self.radius, -angle.cos() * self.radius)
        })
    }

    /// Absolute corners of the hexagon centred on `center`.
    pub fn hexagon_at(&self, center: Point) -> Vec<Point> {
        self.corners()
            .iter()
            .map(|c| center.offset(c.x, c.y))
            .collect()
    }
}

/// Half-column offset of odd rows, negative rows included.
fn row_shift(row: f64) -> f64 {
    if (row as i64).rem_euclid(2) == 1 {
        0.5
    } else {
        0.0
    }
}

/// Round half up, so `-2.5 -> -2` and `2.5 -> 3`.
fn js_round(v: f64) -> f64 {
    (v + 0.5).floor()
}
