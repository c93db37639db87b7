//! Share of the collection attributed to each continent.

use std::collections::HashMap;

use super::MuseumRecord;
use crate::model::{LocationShare, ShareStats};

/// Continents recognised in free-text place names. When a place names
/// several, the one appearing first in the text wins.
pub const CONTINENTS: [&str; 6] = [
    "Antarctica",
    "North America",
    "Asia",
    "Oceania",
    "South America",
    "Africa",
];

/// The continent named in `place`, if any.
pub fn continent_of(place: &str) -> Option<&'static str> {
    CONTINENTS
        .iter()
        .filter_map(|c| place.find(c).map(|at| (at, *c)))
        .min_by_key(|(at, _)| *at)
        .map(|(_, c)| c)
}

/// Group records by the continent of their first attributed place.
///
/// Ratios are over all records, including those without a place or a
/// recognised continent. Sorted by count, largest first; ties keep the
/// order in which continents were first seen.
pub fn attributed_locations(records: &[MuseumRecord]) -> Vec<LocationShare> {
    let total = records.len();
    let mut order: Vec<&'static str> = Vec::new();
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for record in records {
        let Some(place) = record.freetext().place.first() else {
            continue;
        };
        let Some(continent) = continent_of(&place.content) else {
            continue;
        };
        let count = counts.entry(continent).or_insert_with(|| {
            order.push(continent);
            0
        });
        *count += 1;
    }

    let mut shares: Vec<LocationShare> = order
        .into_iter()
        .map(|continent| {
            let length = counts.get(continent).copied().unwrap_or_default();
            LocationShare(
                continent.to_string(),
                ShareStats {
                    length,
                    length_ratio: length as f64 / total as f64,
                },
            )
        })
        .collect();
    shares.sort_by(|a, b| b.1.length.cmp(&a.1.length));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::parse_records;

    #[test]
    fn leftmost_continent_wins() {
        assert_eq!(continent_of("Allan Hills, Antarctica"), Some("Antarctica"));
        assert_eq!(continent_of("Africa; later Asia"), Some("Africa"));
        assert_eq!(continent_of("Asia or Africa"), Some("Asia"));
        assert_eq!(continent_of("Unknown"), None);
    }

    #[test]
    fn shares_are_over_all_records() {
        let data = br#"[
            {"id":"1","content":{"freetext":{"place":[{"content":"Antarctica"}]}}},
            {"id":"2","content":{"freetext":{"place":[{"content":"Queen Alexandra Range, Antarctica"}]}}},
            {"id":"3","content":{"freetext":{"place":[{"content":"Kenya, Africa"}]}}},
            {"id":"4","content":{"freetext":{"place":[{"content":"Mars"}]}}},
            {"id":"5"}
        ]"#;
        let records = parse_records(data).unwrap();
        let shares = attributed_locations(&records);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].continent(), "Antarctica");
        assert_eq!(shares[0].1.length, 2);
        assert!((shares[0].ratio() - 0.4).abs() < 1e-12);
        assert!((shares[1].ratio() - 0.2).abs() < 1e-12);

        let json = serde_json::to_string(&shares[1]).unwrap();
        assert_eq!(json, r#"["Africa",{"length":1,"length_ratio":0.2}]"#);
    }
}
