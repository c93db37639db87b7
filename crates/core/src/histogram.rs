//! Threshold histograms.
//!
//! Bins are half-open `[x0, x1)` except the last, which also holds values
//! equal to the domain maximum. Values outside the domain are dropped.

use serde::Serialize;

use crate::encoding::format_grouped;

/// Fixed gram thresholds for the specimen weight histogram. The final
/// `max + 1` threshold is appended by [`weight_histogram`].
pub const WEIGHT_THRESHOLDS_GRAMS: [f64; 15] = [
    0.0, 0.1, 1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1000.0, 10_000.0,
    100_000.0,
];

/// Width of a collected-year bin in years.
pub const YEAR_BIN_WIDTH: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

/// Count `values` into bins over `domain` split at `thresholds`.
///
/// Thresholds are sorted and only those in `(x0, x1]` are kept, so `k`
/// surviving thresholds give `k + 1` bins. NaN values are dropped.
pub fn bin_values(values: &[f64], domain: (f64, f64), thresholds: &[f64]) -> Vec<Bin> {
    let (x0, x1) = domain;
    if x0.is_nan() || x1.is_nan() || x0 > x1 {
        return Vec::new();
    }

    let mut cuts: Vec<f64> = thresholds
        .iter()
        .copied()
        .filter(|t| *t > x0 && *t <= x1)
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();

    let mut bins: Vec<Bin> = Vec::with_capacity(cuts.len() + 1);
    let mut lower = x0;
    for &cut in &cuts {
        bins.push(Bin {
            x0: lower,
            x1: cut,
            count: 0,
        });
        lower = cut;
    }
    bins.push(Bin {
        x0: lower,
        x1,
        count: 0,
    });

    for &v in values {
        if v.is_nan() || v < x0 || v > x1 {
            continue;
        }
        // First threshold strictly greater than v.
        let slot = cuts.partition_point(|t| *t <= v);
        bins[slot].count += 1;
    }
    bins
}

/// Smallest and largest non-NaN value.
pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Collected-year histogram with [`YEAR_BIN_WIDTH`]-year bins starting at
/// the earliest year.
pub fn year_histogram(years: &[i32]) -> Vec<Bin> {
    let (Some(&min), Some(&max)) = (years.iter().min(), years.iter().max()) else {
        return Vec::new();
    };
    let thresholds: Vec<f64> = (min..max + 5)
        .step_by(YEAR_BIN_WIDTH as usize)
        .map(f64::from)
        .collect();
    let values: Vec<f64> = years.iter().copied().map(f64::from).collect();
    bin_values(&values, (f64::from(min), f64::from(max)), &thresholds)
}

/// A non-empty weight bin with its axis label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightBin {
    #[serde(flatten)]
    pub bin: Bin,
    pub label: String,
    /// Whether this bin is the open-ended heaviest class.
    pub open_ended: bool,
}

/// Weight histogram in grams over `[0, max + 1]`. Empty bins are dropped.
pub fn weight_histogram(weights_grams: &[f64]) -> Vec<WeightBin> {
    let Some((_, max)) = extent(weights_grams) else {
        return Vec::new();
    };
    let top = max + 1.0;
    let mut thresholds = WEIGHT_THRESHOLDS_GRAMS.to_vec();
    thresholds.push(top);

    bin_values(weights_grams, (0.0, top), &thresholds)
        .into_iter()
        .filter(|b| b.count > 0)
        .map(|bin| {
            let open_ended = bin.x1 == top;
            let label = weight_label(&bin, open_ended);
            WeightBin {
                bin,
                label,
                open_ended,
            }
        })
        .collect()
}

fn weight_label(bin: &Bin, open_ended: bool) -> String {
    if open_ended {
        format!("{}kg <=", format_grouped(bin.x0 / 1000.0, 2))
    } else if bin.x1 >= 1000.0 {
        format!("< {}kg", format_grouped(bin.x1 / 1000.0, 2))
    } else {
        format!("< {}g", format_grouped(bin.x1, 3))
    }
}

/// Round `max` up to a "nice" axis bound (1, 2, 5 or 10 times a power of ten).
pub fn nice_ceiling(max: f64) -> f64 {
    if max.is_nan() || max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    let leading = max / magnitude;
    let nice = if leading <= 1.0 {
        1.0
    } else if leading <= 2.0 {
        2.0
    } else if leading <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_bins_with_inclusive_last() {
        let bins = bin_values(&[0.0, 1.0, 1.5, 2.0, 3.0, 4.0], (0.0, 4.0), &[1.0, 2.0, 3.0]);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 2]);
        assert_eq!((bins[3].x0, bins[3].x1), (3.0, 4.0));
    }

    #[test]
    fn out_of_domain_thresholds_and_values_are_ignored() {
        let bins = bin_values(&[-1.0, 5.0, 11.0, f64::NAN], (0.0, 10.0), &[-5.0, 0.0, 5.0, 20.0]);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].count, 0);
        assert_eq!(bins[1].count, 1);
    }

    #[test]
    fn unsorted_thresholds_are_sorted() {
        let bins = bin_values(&[1.0, 6.0], (0.0, 10.0), &[5.0, 2.0]);
        let edges: Vec<(f64, f64)> = bins.iter().map(|b| (b.x0, b.x1)).collect();
        assert_eq!(edges, vec![(0.0, 2.0), (2.0, 5.0), (5.0, 10.0)]);
    }

    #[test]
    fn years_bin_in_pairs() {
        let bins = year_histogram(&[1970, 1971, 1972, 1975, 1976]);
        let edges: Vec<(f64, f64, usize)> = bins.iter().map(|b| (b.x0, b.x1, b.count)).collect();
        assert_eq!(
            edges,
            vec![
                (1970.0, 1972.0, 2),
                (1972.0, 1974.0, 1),
                (1974.0, 1976.0, 1),
                (1976.0, 1976.0, 1),
            ]
        );
        assert!(year_histogram(&[]).is_empty());
    }

    #[test]
    fn weight_bins_are_labelled() {
        let bins = weight_histogram(&[0.05, 3.0, 3.0, 800.0, 2500.0, 250_000.0]);
        let labels: Vec<&str> = bins.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["< 0.1g", "< 5g", "< 1kg", "< 10kg", "100kg <="]);
        assert_eq!(bins[1].bin.count, 2);
        assert!(bins[4].open_ended);
    }

    #[test]
    fn weight_histogram_below_largest_fixed_threshold() {
        let bins = weight_histogram(&[20.0, 5000.0]);
        let last = bins.last().map(|b| b.label.clone()).unwrap_or_default();
        assert_eq!(last, "1kg <=");
    }

    #[test]
    fn nice_bounds() {
        assert_eq!(nice_ceiling(0.0), 1.0);
        assert_eq!(nice_ceiling(7.0), 10.0);
        assert_eq!(nice_ceiling(130.0), 200.0);
        assert_eq!(nice_ceiling(500.0), 500.0);
    }
}
