//! Facet counts for the portrait gallery filters.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::FinalizedPortrait;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub genre: Vec<String>,
    pub gender: Vec<String>,
    pub portrait_year: Vec<String>,
    pub age: Vec<String>,
    pub self_portrait: Vec<String>,
}

/// `"label (n)"` entries, most frequent first. Ties keep first-seen order.
fn counted<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert_with(|| {
            order.push(key);
            0
        }) += 1;
    }
    let mut rows: Vec<(&str, usize)> = order
        .into_iter()
        .map(|k| (k, counts.get(k).copied().unwrap_or_default()))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.into_iter()
        .map(|(label, n)| format!("{label} ({n})"))
        .collect()
}

fn sorted(mut entries: Vec<String>) -> Vec<String> {
    entries.sort();
    entries
}

pub fn facets(portraits: &[FinalizedPortrait]) -> Facets {
    let genre = counted(
        portraits
            .iter()
            .filter_map(|p| p.categories.first().map(String::as_str)),
    );
    let gender = counted(portraits.iter().map(|p| p.sex.as_str()));
    let portrait_year = sorted(counted(
        portraits
            .iter()
            .map(|p| p.portrait_year.year_group.as_str()),
    ));
    let age = sorted(counted(
        portraits
            .iter()
            .map(|p| p.age_at_portrait.age_group.as_str()),
    ));
    let mut self_portrait = sorted(counted(
        portraits.iter().map(|p| p.is_self_portrait.as_str()),
    ));
    self_portrait.reverse();

    Facets {
        genre,
        gender,
        portrait_year,
        age,
        self_portrait,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgeAtPortrait, PortraitYear};

    fn portrait(category: &str, sex: &str, decade: &str, age: &str, own: &str) -> FinalizedPortrait {
        FinalizedPortrait {
            id: String::new(),
            title: String::new(),
            object_type: "Painting".into(),
            portrait_year: PortraitYear {
                original: String::new(),
                year_int: None,
                year_group: decade.into(),
            },
            name: String::new(),
            period: String::new(),
            sex: sex.into(),
            categories: vec![category.into()],
            artist_name: String::new(),
            is_self_portrait: own.into(),
            image_link: String::new(),
            thumbnail_link: String::new(),
            detail_link: None,
            description: String::new(),
            main_events: Vec::new(),
            portrait_moment: String::new(),
            wiki_url: None,
            birth_year: None,
            death_year: None,
            age_at_portrait: AgeAtPortrait {
                age_int: None,
                age_group: age.into(),
            },
        }
    }

    #[test]
    fn facet_ordering() {
        let portraits = vec![
            portrait("Arts", "Female", "1900s", "40s", "No"),
            portrait("Politics & Government", "Male", "1850s", "50s", "No"),
            portrait("Politics & Government", "Male", "1850s", "Unknown", "Yes"),
            portrait("Science", "Male", "1990s", "30s", "No"),
        ];
        let f = facets(&portraits);
        assert_eq!(
            f.genre,
            vec!["Politics & Government (2)", "Arts (1)", "Science (1)"]
        );
        assert_eq!(f.gender, vec!["Male (3)", "Female (1)"]);
        assert_eq!(f.portrait_year, vec!["1850s (2)", "1900s (1)", "1990s (1)"]);
        assert_eq!(f.age, vec!["30s (1)", "40s (1)", "50s (1)", "Unknown (1)"]);
        assert_eq!(f.self_portrait, vec!["Yes (1)", "No (3)"]);
    }
}
