use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active palette.
///
/// Data-driven fills (elevation bands, heatmap bins) travel as
/// [`Color`](crate::Color) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    Background,

    /// The story's signature teal, used for section accents and highlights.
    Accent,
    AccentText,
    /// Text drawn on an accent-filled area.
    TextOnAccent,

    TextPrimary,
    TextMuted,

    // Bar chart
    BarMuted,
    BarLabelMuted,
    AxisLine,

    // Maps
    MapBackground,
    HexStroke,
    HeatStroke,
    HeatLabelOnDark,
    HeatLabelOnLight,
    MeteoriteMarker,

    // Timeline
    TimelineLine,
    TimelineMarker,
    TimelineHighlight,

    // Histograms
    HistogramBar,
    HistogramAxis,
    HistogramLabel,
}
