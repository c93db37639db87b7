use std::sync::Mutex;

use icefield_core::model::FinalizedPortrait;
use icefield_core::svg::render_svg;
use icefield_core::views::{StepId, StoryData, render_portrait_timeline, render_scroll};
use icefield_core::{FadeEnvelope, ScrollStep, StoryConfig};
use icefield_protocol::{RenderCommand, Viewport};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Loaded story bundles. Unloaded slots are reused by the next load.
static STORIES: Mutex<Vec<Option<StoryData>>> = Mutex::new(Vec::new());

fn insert_slot<T>(slots: &mut Vec<Option<T>>, value: T) -> usize {
    match slots.iter().position(Option::is_none) {
        Some(free) => {
            slots[free] = Some(value);
            free
        }
        None => {
            slots.push(Some(value));
            slots.len() - 1
        }
    }
}

fn take_slot<T>(slots: &mut [Option<T>], handle: usize) -> Option<T> {
    slots.get_mut(handle).and_then(Option::take)
}

fn js_error(error: impl ToString) -> JsError {
    JsError::new(&error.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(js_error)
}

fn config_from(config_json: Option<String>) -> Result<StoryConfig, JsError> {
    match config_json {
        Some(json) => StoryConfig::from_json(json.as_bytes()).map_err(js_error),
        None => Ok(StoryConfig::default()),
    }
}

fn with_story<T>(handle: usize, f: impl FnOnce(&StoryData) -> T) -> Result<T, JsError> {
    let stories = STORIES
        .lock()
        .map_err(|_| JsError::new("story store poisoned"))?;
    let story = stories
        .get(handle)
        .and_then(Option::as_ref)
        .ok_or_else(|| JsError::new("invalid story handle"))?;
    Ok(f(story))
}

/// Opacity of a step at `progress` through it, fading over `threshold` at
/// each end. Rejects thresholds outside `(0, 0.5]`.
#[wasm_bindgen]
pub fn step_opacity(progress: f64, threshold: f64) -> Result<f64, JsError> {
    let envelope = FadeEnvelope::new(threshold).map_err(js_error)?;
    Ok(envelope.opacity(progress))
}

/// Number of steps in the narrative.
#[wasm_bindgen]
pub fn step_count() -> usize {
    StepId::ALL.len()
}

/// Slug of the step at `index`, for element ids.
#[wasm_bindgen]
pub fn step_slug(index: usize) -> Option<String> {
    StepId::from_index(index).map(|step| step.slug().to_string())
}

/// Parse the story data bundle. Returns a handle for later renders.
#[wasm_bindgen]
pub fn load_story(data: &[u8]) -> Result<usize, JsError> {
    let story: StoryData = serde_json::from_slice(data).map_err(js_error)?;
    let mut stories = STORIES
        .lock()
        .map_err(|_| JsError::new("story store poisoned"))?;
    Ok(insert_slot(&mut stories, story))
}

/// Drop a loaded story. Returns false when the handle was not loaded.
#[wasm_bindgen]
pub fn unload_story(handle: usize) -> Result<bool, JsError> {
    let mut stories = STORIES
        .lock()
        .map_err(|_| JsError::new("story store poisoned"))?;
    Ok(take_slot(&mut stories, handle).is_some())
}

fn story_commands(
    handle: usize,
    index: usize,
    progress: f64,
    viewport: &Viewport,
    config: &StoryConfig,
) -> Result<Vec<RenderCommand>, JsError> {
    with_story(handle, |story| {
        render_scroll(ScrollStep::new(index, progress), story, config, viewport)
    })
}

/// Render the step a scroll event points at, as render commands JSON.
#[wasm_bindgen]
pub fn render_step(
    handle: usize,
    index: usize,
    progress: f64,
    width: f64,
    height: f64,
    config_json: Option<String>,
) -> Result<String, JsError> {
    let config = config_from(config_json)?;
    let viewport = Viewport::sized(width, height);
    let commands = story_commands(handle, index, progress, &viewport, &config)?;
    to_json(&commands)
}

/// Same as [`render_step`] but as a standalone SVG document.
#[wasm_bindgen]
pub fn render_step_svg(
    handle: usize,
    index: usize,
    progress: f64,
    width: f64,
    height: f64,
    config_json: Option<String>,
) -> Result<String, JsError> {
    let config = config_from(config_json)?;
    let viewport = Viewport::sized(width, height);
    let commands = story_commands(handle, index, progress, &viewport, &config)?;
    Ok(render_svg(&commands, width, height, false))
}

/// Lay out a finalized portrait's life events. Returns the timeline
/// (events with dot and label positions, scale, outcome) as JSON.
#[wasm_bindgen]
pub fn layout_timeline(portrait_json: &str, config_json: Option<String>) -> Result<String, JsError> {
    let portrait: FinalizedPortrait = serde_json::from_str(portrait_json).map_err(js_error)?;
    let config = config_from(config_json)?;
    let layout = config.timeline.layout().map_err(js_error)?;
    to_json(&portrait.timeline(&layout))
}

/// Render a finalized portrait's timeline as SVG for the gallery modal.
#[wasm_bindgen]
pub fn render_timeline_svg(
    portrait_json: &str,
    config_json: Option<String>,
) -> Result<String, JsError> {
    let portrait: FinalizedPortrait = serde_json::from_str(portrait_json).map_err(js_error)?;
    let config = config_from(config_json)?;
    let commands = render_portrait_timeline(&portrait, &config.timeline);
    Ok(render_svg(
        &commands,
        config.timeline.width,
        config.timeline.height,
        true,
    ))
}
