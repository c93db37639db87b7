//! View transforms: data in, a flat list of [`RenderCommand`]s out.
//!
//! [`RenderCommand`]: icefield_protocol::RenderCommand

pub mod heatmap;
pub mod histogram;
pub mod locations;
pub mod map;
pub mod story;
pub mod timeline;

pub use heatmap::render_heatmap;
pub use histogram::{render_weight_histogram, render_year_histogram};
pub use locations::render_locations;
pub use story::{StepId, StoryData, render_scroll};
pub use timeline::{render_portrait_timeline, render_timeline};
