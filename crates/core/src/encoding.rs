//! Data-to-visual encoding rules.
//!
//! Kept apart from the views so every threshold and palette is testable
//! without rendering anything.

use icefield_protocol::{Color, ThemeToken};

pub const HEX_HIGH: Color = Color::rgb(0xE6, 0x95, 0x5E);
pub const HEX_MEDIUM: Color = Color::rgb(0xEC, 0xF0, 0x6A);
pub const HEX_LOW: Color = Color::rgb(0x9D, 0xC1, 0x65);

pub const RAMP_LOW: Color = Color::rgb(0xB4, 0xD2, 0xD9);
pub const RAMP_HIGH: Color = Color::rgb(0x06, 0x88, 0xA6);

pub const LAND_FILL: Color = Color::WHITE;
pub const BLUE_ICE_FILL: Color = Color::rgb(0x00, 0x91, 0xFF);

pub const LABEL_ON_DARK: Color = Color::WHITE;
pub const LABEL_ON_LIGHT: Color = Color::rgb(0x34, 0x34, 0x34);

/// Brightness below which a fill gets a light label.
pub const DARK_FILL_BRIGHTNESS: f64 = 150.0;

/// Fill for a hexbin holding `count` meteorites. Empty bins are not drawn.
pub fn color_for_count(count: usize) -> Option<Color> {
    match count {
        0 => None,
        1..=500 => Some(HEX_LOW),
        501..=1000 => Some(HEX_MEDIUM),
        _ => Some(HEX_HIGH),
    }
}

/// Fill for an elevation contour band in metres.
///
/// Bands between the published contours (e.g. 1500 m) have no fill.
pub fn color_for_elevation(elevation: f64) -> Option<Color> {
    if elevation >= 3500.0 {
        Some(Color::rgb(0xBA, 0xBA, 0xBA))
    } else if elevation == 0.0 {
        Some(Color::WHITE)
    } else if elevation == 1000.0 {
        Some(Color::rgb(0xED, 0xED, 0xED))
    } else if elevation == 2000.0 {
        Some(Color::rgb(0xD8, 0xD8, 0xD8))
    } else if elevation == 3000.0 {
        Some(Color::rgb(0xC6, 0xC6, 0xC6))
    } else {
        None
    }
}

/// Bar fill for the attributed-location chart: Antarctica is highlighted.
pub fn bar_token_for(continent: &str) -> (ThemeToken, ThemeToken) {
    if continent == "Antarctica" {
        (ThemeToken::Accent, ThemeToken::AccentText)
    } else {
        (ThemeToken::BarMuted, ThemeToken::BarLabelMuted)
    }
}

/// Linear RGB ramp from [`RAMP_LOW`] at 0 to [`RAMP_HIGH`] at `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialRamp {
    pub low: Color,
    pub high: Color,
    pub max: f64,
}

impl SequentialRamp {
    pub fn new(max: f64) -> Self {
        Self {
            low: RAMP_LOW,
            high: RAMP_HIGH,
            max,
        }
    }

    pub fn color(&self, value: f64) -> Color {
        let t = if self.max > 0.0 {
            (value / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mix = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color::rgb(
            mix(self.low.r, self.high.r),
            mix(self.low.g, self.high.g),
            mix(self.low.b, self.high.b),
        )
    }
}

/// Perceived brightness on a 0-255 scale (ITU-R BT.601 weights).
pub fn brightness(color: Color) -> f64 {
    f64::from(color.r) * 0.299 + f64::from(color.g) * 0.587 + f64::from(color.b) * 0.114
}

/// Label color that stays readable on `fill`.
pub fn label_color_on(fill: Color) -> Color {
    if brightness(fill) < DARK_FILL_BRIGHTNESS {
        LABEL_ON_DARK
    } else {
        LABEL_ON_LIGHT
    }
}

/// Theme token for a label drawn on `fill`, see [`label_color_on`].
pub fn label_token_on(fill: Color) -> ThemeToken {
    if label_color_on(fill) == LABEL_ON_DARK {
        ThemeToken::HeatLabelOnDark
    } else {
        ThemeToken::HeatLabelOnLight
    }
}

const SI_PREFIXES: [&str; 5] = ["", "k", "M", "G", "T"];

/// Count rounded to one significant digit with an SI suffix: `1234 -> "1k"`,
/// `25 -> "30"`, `98765 -> "100k"`.
pub fn format_si_count(count: u64) -> String {
    if count == 0 {
        return "0".to_string();
    }
    let mut exponent = (count as f64).log10().floor() as i32;
    let scale = 10f64.powi(exponent);
    let mut leading = (count as f64 / scale + 0.5).floor();
    if leading >= 10.0 {
        leading = 1.0;
        exponent += 1;
    }
    let group = ((exponent / 3) as usize).min(SI_PREFIXES.len() - 1);
    let value = leading * 10f64.powi(exponent - 3 * group as i32);
    format!("{}{}", value as u64, SI_PREFIXES[group])
}

/// Number with `,` thousands separators and at most `max_fraction` decimal
/// places, trailing zeros trimmed: `1234.5 -> "1,234.5"`, `0.1 -> "0.1"`.
pub fn format_grouped(value: f64, max_fraction: usize) -> String {
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 2);
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_thresholds() {
        assert_eq!(color_for_count(0), None);
        assert_eq!(color_for_count(1), Some(HEX_LOW));
        assert_eq!(color_for_count(500), Some(HEX_LOW));
        assert_eq!(color_for_count(501), Some(HEX_MEDIUM));
        assert_eq!(color_for_count(1000), Some(HEX_MEDIUM));
        assert_eq!(color_for_count(1001), Some(HEX_HIGH));
    }

    #[test]
    fn elevation_bands() {
        assert_eq!(color_for_elevation(0.0), Some(Color::WHITE));
        assert_eq!(color_for_elevation(2000.0).map(Color::to_hex), Some("#d8d8d8".into()));
        assert_eq!(color_for_elevation(4200.0).map(Color::to_hex), Some("#bababa".into()));
        assert_eq!(color_for_elevation(1500.0), None);
    }

    #[test]
    fn ramp_endpoints_and_midpoint() {
        let ramp = SequentialRamp::new(10.0);
        assert_eq!(ramp.color(0.0), RAMP_LOW);
        assert_eq!(ramp.color(10.0), RAMP_HIGH);
        assert_eq!(ramp.color(25.0), RAMP_HIGH);
        // (0xB4 + 0x06) / 2 = 93, (0xD2 + 0x88) / 2 = 173, (0xD9 + 0xA6) / 2 = 191.5
        assert_eq!(ramp.color(5.0), Color::rgb(93, 173, 192));
        assert_eq!(SequentialRamp::new(0.0).color(3.0), RAMP_LOW);
    }

    #[test]
    fn label_contrast() {
        assert_eq!(label_color_on(RAMP_HIGH), LABEL_ON_DARK);
        assert_eq!(label_color_on(RAMP_LOW), LABEL_ON_LIGHT);
        assert!((brightness(Color::WHITE) - 255.0).abs() < 1e-9);
        assert_eq!(label_token_on(RAMP_HIGH), ThemeToken::HeatLabelOnDark);
    }

    #[test]
    fn si_counts() {
        assert_eq!(format_si_count(0), "0");
        assert_eq!(format_si_count(5), "5");
        assert_eq!(format_si_count(25), "30");
        assert_eq!(format_si_count(1234), "1k");
        assert_eq!(format_si_count(1500), "2k");
        assert_eq!(format_si_count(98_765), "100k");
        assert_eq!(format_si_count(2_400_000), "2M");
    }

    #[test]
    fn grouped_numbers() {
        assert_eq!(format_grouped(0.1, 2), "0.1");
        assert_eq!(format_grouped(1000.0, 2), "1,000");
        assert_eq!(format_grouped(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_grouped(100.0, 2), "100");
        assert_eq!(format_grouped(-2500.5, 2), "-2,500.5");
    }

    #[test]
    fn antarctica_is_highlighted() {
        assert_eq!(bar_token_for("Antarctica").0, ThemeToken::Accent);
        assert_eq!(bar_token_for("Asia").0, ThemeToken::BarMuted);
    }
}
