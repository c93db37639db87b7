//! Core of the icefield story: scroll and layout algorithms, data-to-visual
//! encodings, view transforms and the one-shot ETL over the museum export.

pub mod config;
pub mod encoding;
pub mod etl;
pub mod hexbin;
pub mod histogram;
pub mod model;
pub mod projection;
pub mod scroll;
pub mod svg;
pub mod timeline;
pub mod views;

pub use config::StoryConfig;
pub use scroll::{FadeEnvelope, RenderState, ScrollStep, opacity_for_progress};
pub use timeline::{LabelLayout, LineBounds, Timeline, TimelineEvent};
