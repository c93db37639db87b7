//! Specimen counts per collection year.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::MuseumRecord;
use crate::model::YearCount;

/// Count records by their first date, newest first.
///
/// Records without a date are not counted. Years compare numerically;
/// values that are not numbers sort after all numeric ones, in text order.
pub fn collected_years(records: &[MuseumRecord]) -> Vec<YearCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        if let Some(date) = record.freetext().date.first() {
            *counts.entry(date.content.as_str()).or_default() += 1;
        }
    }

    let mut years: Vec<YearCount> = counts
        .into_iter()
        .map(|(year, count)| YearCount(year.to_string(), count))
        .collect();
    years.sort_by(|a, b| newest_first(&a.0, &b.0));
    years
}

fn newest_first(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => y.total_cmp(&x),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::etl::parse_records;

    #[test]
    fn counts_sorted_newest_first() {
        let data = br#"[
            {"id":"1","content":{"freetext":{"date":[{"content":"1988"}]}}},
            {"id":"2","content":{"freetext":{"date":[{"content":"2003"}]}}},
            {"id":"3","content":{"freetext":{"date":[{"content":"1988"}]}}},
            {"id":"4","content":{"freetext":{"date":[{"content":"unknown"}]}}},
            {"id":"5"}
        ]"#;
        let years = collected_years(&parse_records(data).unwrap());
        assert_eq!(
            years,
            vec![
                YearCount("2003".into(), 1),
                YearCount("1988".into(), 2),
                YearCount("unknown".into(), 1),
            ]
        );
    }
}
