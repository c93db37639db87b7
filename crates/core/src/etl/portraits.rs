//! Portrait extraction and biography join.

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use super::MuseumRecord;
use crate::model::{AgeAtPortrait, AiSummary, FinalizedPortrait, PortraitRecord, PortraitYear};

/// Records whose image metadata is known to be broken.
pub const EXCLUDED_IDS: [&str; 1] = ["ld1-1643399756728-1643399778390-0"];

const SITTER: &str = "Sitter";
const ARTIST: &str = "Artist";
const PAINTING: &str = "Painting";
const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Error)]
pub enum PortraitError {
    #[error("duplicate portrait id {0}")]
    DuplicateId(String),
}

/// The first run of four consecutive ASCII digits in `text`.
fn first_four_digit_run(text: &str) -> Option<i32> {
    four_digit_runs(text).next()
}

/// Non-overlapping runs of four ASCII digits, left to right.
fn four_digit_runs(text: &str) -> impl Iterator<Item = i32> + '_ {
    let bytes = text.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        while i + 4 <= bytes.len() {
            if bytes[i..i + 4].iter().all(u8::is_ascii_digit) {
                let run = &text[i..i + 4];
                i += 4;
                return run.parse().ok();
            }
            i += 1;
        }
        None
    })
}

/// `"1850s"` for 1857.
fn decade_group(value: i32) -> String {
    format!("{}s", value.div_euclid(10) * 10)
}

/// Extract a single-sitter painting with an image and subject topics.
/// Anything else gives `None`.
pub fn extract_portrait(record: &MuseumRecord) -> Option<PortraitRecord> {
    if EXCLUDED_IDS.contains(&record.id.as_str()) {
        return None;
    }
    let freetext = record.freetext();

    let sitter_entries: Vec<&str> = freetext
        .name
        .iter()
        .filter(|n| n.label == SITTER)
        .map(|n| n.content.as_str())
        .collect();
    let [sitter_entry] = sitter_entries.as_slice() else {
        return None;
    };
    let mut sitter_parts = sitter_entry.split(',');
    let name = sitter_parts.next().unwrap_or_default().to_string();
    let period = sitter_parts.next().map(str::trim).unwrap_or_default().to_string();

    let object_type = freetext
        .object_type
        .iter()
        .map(|o| o.content.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if object_type != PAINTING {
        return None;
    }

    let image_link = record.first_media().filter(|m| !m.is_empty())?.to_string();
    let thumbnail_link = format!("{image_link}&max=200");

    let prefix = format!("{name}:");
    let topics: Vec<String> = freetext
        .topic
        .iter()
        .filter_map(|t| t.content.strip_prefix(&prefix))
        .map(|t| t.trim().to_string())
        .collect();
    let sex = topics
        .iter()
        .find(|t| *t == "Male" || *t == "Female")
        .cloned()
        .unwrap_or_default();
    let remaining: Vec<&String> = topics
        .iter()
        .filter(|t| *t != "Male" && *t != "Female")
        .collect();
    if remaining.is_empty() {
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    for topic in remaining {
        let category = topic.split('\\').next().unwrap_or_default();
        if !categories.iter().any(|c| c == category) {
            categories.push(category.to_string());
        }
    }

    let original = freetext
        .date
        .iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let year_int = first_four_digit_run(&original);
    let year_group = year_int
        .filter(|y| *y != 0)
        .map_or_else(|| UNKNOWN_GROUP.to_string(), decade_group);

    let artist_name = freetext
        .name
        .iter()
        .filter(|n| n.label == ARTIST)
        .map(|n| n.content.split(',').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(", ");

    Some(PortraitRecord {
        id: record.id.clone(),
        title: record.title.clone(),
        object_type,
        portrait_year: PortraitYear {
            original,
            year_int,
            year_group,
        },
        name,
        period,
        sex,
        categories,
        artist_name,
        is_self_portrait: record.title.contains("Self-Portrait"),
        image_link,
        thumbnail_link,
        detail_link: record.record_link().map(str::to_string),
    })
}

pub fn extract_portraits(records: &[MuseumRecord]) -> Vec<PortraitRecord> {
    let portraits: Vec<PortraitRecord> = records.iter().filter_map(extract_portrait).collect();
    tracing::info!(
        records = records.len(),
        portraits = portraits.len(),
        "extracted portraits"
    );
    portraits
}

/// Current calendar year (UTC).
pub fn current_year() -> i32 {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    year_from_days((seconds / 86_400) as i64)
}

/// Proleptic Gregorian year of a day count since 1970-01-01.
fn year_from_days(days: i64) -> i32 {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let month_is_jan_or_feb = mp >= 10;
    let year = yoe + era * 400 + i64::from(month_is_jan_or_feb);
    year as i32
}

/// Join biographies onto portraits by id and derive ages.
///
/// Portraits without a biography are dropped; output follows portrait
/// order. Birth and death years come from the first two four-digit runs of
/// the sitter's period and count only when within `[0, current_year]`.
pub fn finalize(
    summaries: Vec<AiSummary>,
    portraits: Vec<PortraitRecord>,
    current_year: i32,
) -> Result<Vec<FinalizedPortrait>, PortraitError> {
    let mut by_id: HashMap<String, AiSummary> = HashMap::with_capacity(summaries.len());
    for summary in summaries {
        if by_id.contains_key(&summary.id) {
            tracing::warn!(id = %summary.id, "duplicate biography, keeping the last");
        }
        by_id.insert(summary.id.clone(), summary);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut finalized = Vec::with_capacity(portraits.len().min(by_id.len()));
    for portrait in portraits {
        if !seen.insert(portrait.id.clone()) {
            return Err(PortraitError::DuplicateId(portrait.id));
        }
        let Some(summary) = by_id.remove(&portrait.id) else {
            tracing::debug!(id = %portrait.id, "no biography for portrait");
            continue;
        };
        finalized.push(finalize_one(portrait, summary, current_year));
    }
    Ok(finalized)
}

fn finalize_one(
    portrait: PortraitRecord,
    summary: AiSummary,
    current_year: i32,
) -> FinalizedPortrait {
    let valid = |year: i32| (0..=current_year).contains(&year).then_some(year);
    let (birth_year, death_year) = {
        let mut years = four_digit_runs(&portrait.period);
        (years.next().and_then(valid), years.next().and_then(valid))
    };

    let age_at_portrait = match (birth_year, portrait.portrait_year.year_int, death_year) {
        (Some(birth), Some(at), Some(death)) if birth <= at && at <= death => {
            let age = at - birth;
            AgeAtPortrait {
                age_int: Some(age),
                age_group: decade_group(age),
            }
        }
        _ => AgeAtPortrait {
            age_int: None,
            age_group: UNKNOWN_GROUP.to_string(),
        },
    };

    FinalizedPortrait {
        id: portrait.id,
        title: portrait.title,
        object_type: portrait.object_type,
        portrait_year: portrait.portrait_year,
        name: portrait.name,
        period: portrait.period,
        sex: portrait.sex,
        categories: portrait
            .categories
            .iter()
            .map(|c| c.replacen(" and ", " & ", 1))
            .collect(),
        artist_name: portrait.artist_name,
        is_self_portrait: if portrait.is_self_portrait { "Yes" } else { "No" }.to_string(),
        image_link: portrait.image_link,
        thumbnail_link: portrait.thumbnail_link,
        detail_link: portrait.detail_link,
        description: summary.description,
        main_events: summary.main_events,
        portrait_moment: summary.portrait_moment,
        wiki_url: summary.wiki_url,
        birth_year,
        death_year,
        age_at_portrait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::parse_records;
    use crate::model::MainEvent;

    const RAW: &[u8] = br#"[
        {"id":"npg-1","title":"Abraham Lincoln","content":{
            "freetext":{
                "name":[{"label":"Sitter","content":"Abraham Lincoln, 12 Feb 1809 - 15 Apr 1865"},
                        {"label":"Artist","content":"George Healy, 1813 - 1894"}],
                "objectType":[{"content":"Painting"}],
                "topic":[{"content":"Abraham Lincoln: Male"},
                         {"content":"Abraham Lincoln: Politics and Government\\President"},
                         {"content":"Abraham Lincoln: Politics and Government\\Congressman"},
                         {"content":"Abraham Lincoln: Law and Law Enforcement\\Lawyer"},
                         {"content":"Interior: Chair"}],
                "date":[{"content":"c. 1869"}]},
            "descriptiveNonRepeating":{"record_link":"https://npg.si.edu/object/npg_1",
                "online_media":{"media":[{"content":"https://ids.si.edu/ids/deliveryService?id=1"}]}}}},
        {"id":"npg-2","title":"Two People","content":{"freetext":{
            "name":[{"label":"Sitter","content":"A, 1800-1850"},{"label":"Sitter","content":"B, 1801-1851"}],
            "objectType":[{"content":"Painting"}]}}},
        {"id":"npg-3","title":"Photo","content":{"freetext":{
            "name":[{"label":"Sitter","content":"C, 1800-1850"}],
            "objectType":[{"content":"Photograph"}]}}},
        {"id":"ld1-1643399756728-1643399778390-0","title":"Excluded"}
    ]"#;

    #[test]
    fn extracts_single_sitter_paintings() {
        let portraits = extract_portraits(&parse_records(RAW).unwrap());
        assert_eq!(portraits.len(), 1);
        let p = &portraits[0];
        assert_eq!(p.name, "Abraham Lincoln");
        assert_eq!(p.period, "12 Feb 1809 - 15 Apr 1865");
        assert_eq!(p.sex, "Male");
        assert_eq!(
            p.categories,
            vec!["Politics and Government", "Law and Law Enforcement"]
        );
        assert_eq!(p.portrait_year.year_int, Some(1869));
        assert_eq!(p.portrait_year.year_group, "1860s");
        assert_eq!(p.artist_name, "George Healy");
        assert!(p.thumbnail_link.ends_with("id=1&max=200"));
        assert!(!p.is_self_portrait);
    }

    #[test]
    fn digit_runs() {
        assert_eq!(first_four_digit_run("c. 1869-70"), Some(1869));
        assert_eq!(first_four_digit_run("12345"), Some(1234));
        assert_eq!(first_four_digit_run("n.d."), None);
        let runs: Vec<i32> = four_digit_runs("1809 - 1865").collect();
        assert_eq!(runs, vec![1809, 1865]);
    }

    #[test]
    fn civil_years() {
        assert_eq!(year_from_days(0), 1970);
        assert_eq!(year_from_days(-1), 1969);
        // 2024-12-31 and 2025-01-01
        assert_eq!(year_from_days(20_088), 2024);
        assert_eq!(year_from_days(20_089), 2025);
        assert!(current_year() >= 2024);
    }

    fn summary(id: &str) -> AiSummary {
        AiSummary {
            id: id.into(),
            description: "Abraham Lincoln is a...".into(),
            main_events: vec![MainEvent {
                year: 1809,
                description: "Born".into(),
            }],
            portrait_moment: "This portrait drawn in 1869...".into(),
            wiki_url: None,
        }
    }

    #[test]
    fn finalize_joins_and_derives_ages() {
        let mut portraits = extract_portraits(&parse_records(RAW).unwrap());
        portraits[0].portrait_year.year_int = Some(1860);
        let mut orphan = portraits[0].clone();
        orphan.id = "npg-orphan".into();
        portraits.push(orphan);

        let finalized = finalize(vec![summary("npg-1"), summary("other")], portraits, 2025).unwrap();
        assert_eq!(finalized.len(), 1);
        let f = &finalized[0];
        assert_eq!(f.birth_year, Some(1809));
        assert_eq!(f.death_year, Some(1865));
        assert!(f.period.contains("1809") && f.period.contains("1865"));
        assert_eq!(f.age_at_portrait.age_int, Some(51));
        assert_eq!(f.age_at_portrait.age_group, "50s");
        assert_eq!(f.is_self_portrait, "No");
        assert_eq!(f.categories[0], "Politics & Government");
        assert_eq!(f.main_events.len(), 1);
    }

    #[test]
    fn posthumous_portrait_has_unknown_age() {
        let portraits = extract_portraits(&parse_records(RAW).unwrap());
        let finalized = finalize(vec![summary("npg-1")], portraits, 2025).unwrap();
        assert_eq!(finalized[0].age_at_portrait.age_int, None);
        assert_eq!(finalized[0].age_at_portrait.age_group, "Unknown");
    }

    #[test]
    fn future_years_are_invalid() {
        let mut portraits = extract_portraits(&parse_records(RAW).unwrap());
        portraits[0].period = "1990-2999".into();
        let finalized = finalize(vec![summary("npg-1")], portraits, 2025).unwrap();
        assert_eq!(finalized[0].birth_year, Some(1990));
        assert_eq!(finalized[0].death_year, None);
    }

    #[test]
    fn duplicate_portraits_are_rejected() {
        let portraits = extract_portraits(&parse_records(RAW).unwrap());
        let doubled = vec![portraits[0].clone(), portraits[0].clone()];
        assert!(matches!(
            finalize(vec![summary("npg-1")], doubled, 2025),
            Err(PortraitError::DuplicateId(_))
        ));
    }
}
