use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::timeline::{LabelLayout, Timeline, TimelineEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitYear {
    /// All date strings of the record joined with `", "`.
    pub original: String,
    pub year_int: Option<i32>,
    /// Decade bucket such as `"1850s"`, or `"Unknown"`.
    pub year_group: String,
}

/// A single-sitter painting extracted from the museum export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortraitRecord {
    pub id: String,
    pub title: String,
    pub object_type: String,
    pub portrait_year: PortraitYear,
    pub name: String,
    pub period: String,
    pub sex: String,
    pub categories: Vec<String>,
    pub artist_name: String,
    pub is_self_portrait: bool,
    pub image_link: String,
    pub thumbnail_link: String,
    #[serde(default)]
    pub detail_link: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum MainEventError {
    #[error("life event {0:?} is not of the form \"YYYY: description\"")]
    Malformed(String),
}

/// A dated life event from the generated biography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMainEvent")]
pub struct MainEvent {
    pub year: i32,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMainEvent {
    Structured { year: i32, description: String },
    Text(String),
}

impl TryFrom<RawMainEvent> for MainEvent {
    type Error = MainEventError;

    fn try_from(raw: RawMainEvent) -> Result<Self, Self::Error> {
        match raw {
            RawMainEvent::Structured { year, description } => Ok(Self { year, description }),
            RawMainEvent::Text(text) => text.parse(),
        }
    }
}

impl std::str::FromStr for MainEvent {
    type Err = MainEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, description) = s
            .split_once(':')
            .ok_or_else(|| MainEventError::Malformed(s.to_string()))?;
        let year = year
            .trim()
            .parse()
            .map_err(|_| MainEventError::Malformed(s.to_string()))?;
        Ok(Self {
            year,
            description: description.trim().to_string(),
        })
    }
}

/// Generated biography for one portrait, keyed by the portrait id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    pub id: String,
    pub description: String,
    pub main_events: Vec<MainEvent>,
    pub portrait_moment: String,
    #[serde(default, alias = "wikiurl", alias = "wikiURL")]
    pub wiki_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeAtPortrait {
    pub age_int: Option<i32>,
    pub age_group: String,
}

/// A portrait joined with its biography and derived ages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedPortrait {
    pub id: String,
    pub title: String,
    pub object_type: String,
    pub portrait_year: PortraitYear,
    pub name: String,
    pub period: String,
    pub sex: String,
    pub categories: Vec<String>,
    pub artist_name: String,
    /// `"Yes"` or `"No"`.
    pub is_self_portrait: String,
    pub image_link: String,
    pub thumbnail_link: String,
    #[serde(default)]
    pub detail_link: Option<String>,
    pub description: String,
    pub main_events: Vec<MainEvent>,
    pub portrait_moment: String,
    #[serde(default)]
    pub wiki_url: Option<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub age_at_portrait: AgeAtPortrait,
}

impl FinalizedPortrait {
    /// Lay out the sitter's life events plus the portrait marker.
    pub fn timeline(&self, layout: &LabelLayout) -> Timeline {
        let events = self
            .main_events
            .iter()
            .map(|e| TimelineEvent::life(e.year, e.description.clone()));
        Timeline::build(events, self.portrait_year.year_int, layout)
    }

    /// Timeline label: `"1851  (34 y/o) : description"`, without the age
    /// when the birth year is unknown.
    pub fn event_label(&self, event: &TimelineEvent) -> String {
        match self.birth_year {
            Some(birth) => format!(
                "{}  ({} y/o) : {}",
                event.year,
                event.year - birth,
                event.description
            ),
            None => format!("{} : {}", event.year, event.description),
        }
    }
}
