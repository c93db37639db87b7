//! Paged export planning and merging.
//!
//! The museum API returns at most `page_size` rows per request. A download
//! is planned as a list of `(start, rows)` requests, then the page
//! responses are merged back into one record array.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PageError {
    #[error("page size must be positive")]
    ZeroPageSize,
    #[error("page {page}: {reason}")]
    InvalidStructure { page: usize, reason: &'static str },
    #[error("expected an array at position {0}")]
    NotAnArray(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub start: usize,
    pub rows: usize,
}

/// Requests covering `row_count` rows. The last page carries the remainder.
pub fn page_plan(row_count: usize, page_size: usize) -> Result<Vec<PageRequest>, PageError> {
    if page_size == 0 {
        return Err(PageError::ZeroPageSize);
    }
    let pages = row_count.div_ceil(page_size);
    Ok((0..pages)
        .map(|i| {
            let start = i * page_size;
            PageRequest {
                start,
                rows: page_size.min(row_count - start),
            }
        })
        .collect())
}

/// The `response.rowCount` of the first page response.
pub fn row_count(first_page: &Value) -> Result<usize, PageError> {
    first_page
        .pointer("/response/rowCount")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or(PageError::InvalidStructure {
            page: 0,
            reason: "response.rowCount is not a number",
        })
}

/// Concatenate `response.rows` of every page, in page order.
pub fn merge_pages(pages: &[Value]) -> Result<Vec<Value>, PageError> {
    let mut merged = Vec::new();
    for (page, response) in pages.iter().enumerate() {
        let rows = response
            .pointer("/response/rows")
            .and_then(Value::as_array)
            .ok_or(PageError::InvalidStructure {
                page,
                reason: "response.rows is not an array",
            })?;
        merged.extend(rows.iter().cloned());
    }
    tracing::debug!(pages = pages.len(), rows = merged.len(), "merged pages");
    Ok(merged)
}

/// Concatenate top-level arrays, e.g. biography batches.
pub fn concat_arrays(arrays: Vec<Value>) -> Result<Vec<Value>, PageError> {
    let mut merged = Vec::new();
    for (index, value) in arrays.into_iter().enumerate() {
        match value {
            Value::Array(items) => merged.extend(items),
            _ => return Err(PageError::NotAnArray(index)),
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_covers_every_row() {
        let plan = page_plan(2350, 1000).unwrap();
        assert_eq!(
            plan,
            vec![
                PageRequest { start: 0, rows: 1000 },
                PageRequest { start: 1000, rows: 1000 },
                PageRequest { start: 2000, rows: 350 },
            ]
        );
        assert_eq!(page_plan(2000, 1000).unwrap().len(), 2);
        assert!(page_plan(0, 1000).unwrap().is_empty());
        assert_eq!(page_plan(5, 0), Err(PageError::ZeroPageSize));
    }

    #[test]
    fn pages_merge_in_order() {
        let pages = vec![
            json!({"response": {"rowCount": 3, "rows": [{"id": "a"}, {"id": "b"}]}}),
            json!({"response": {"rows": [{"id": "c"}]}}),
        ];
        assert_eq!(row_count(&pages[0]), Ok(3));
        let rows = merge_pages(&pages).unwrap();
        let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn malformed_pages_are_rejected() {
        let pages = vec![
            json!({"response": {"rows": []}}),
            json!({"response": {"rows": "oops"}}),
        ];
        assert!(matches!(
            merge_pages(&pages),
            Err(PageError::InvalidStructure { page: 1, .. })
        ));
        assert!(row_count(&pages[0]).is_err());
    }

    #[test]
    fn arrays_concatenate() {
        let merged = concat_arrays(vec![json!([1, 2]), json!([3])]).unwrap();
        assert_eq!(merged, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(
            concat_arrays(vec![json!([]), json!({})]),
            Err(PageError::NotAnArray(1))
        );
    }
}
