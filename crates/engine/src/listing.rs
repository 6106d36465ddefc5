//! Response normalizer for list endpoints, and the pagination view derived
//! from it.
//!
//! The list endpoints are not consistent about where items and pagination
//! numbers live. Items may be the `data` array itself or nested under
//! `data.items` / `data.data` / `items`; `perPage`, `page` and `rows` may sit
//! on the items container, on the envelope, or inside `meta` (an object or a
//! JSON-encoded string).

use api_types::{list::ListResult, query::Pagination};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{MoneyCents, coerce};

/// Parses `meta` into an object. A string is decoded as JSON; anything that
/// does not end up as an object is ignored.
fn meta_object(meta: Option<&Value>) -> Option<Map<String, Value>> {
    match meta? {
        Value::Object(object) => Some(object.clone()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(object)) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

/// First finite number among `candidates`. Blank strings do not count.
fn pick_number(candidates: &[Option<&Value>]) -> Option<f64> {
    candidates.iter().flatten().find_map(|value| match value {
        Value::String(raw) if raw.trim().is_empty() => None,
        other => coerce::strict_number(other),
    })
}

/// Builds a canonical [`ListResult`] out of a list response envelope.
///
/// `requested` is the pagination the request was made with; it fills in
/// `perPage`/`page` when the response has none. `rows` falls back to the
/// number of items received.
pub fn normalize_list<T, F>(
    envelope: &Value,
    requested: Option<&Pagination>,
    normalize_item: F,
) -> ListResult<T>
where
    F: Fn(&Value) -> T,
{
    let data = envelope.get("data");
    let container = data.filter(|value| value.is_object());
    let meta = meta_object(envelope.get("meta"));

    let items_raw: &[Value] = match data {
        Some(Value::Array(items)) => items.as_slice(),
        _ => container
            .and_then(|c| c.get("items").and_then(Value::as_array))
            .or_else(|| container.and_then(|c| c.get("data").and_then(Value::as_array)))
            .or_else(|| envelope.get("items").and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
    };

    let from_sources = |key: &str| {
        pick_number(&[
            container.and_then(|c| c.get(key)),
            envelope.get(key),
            meta.as_ref().and_then(|m| m.get(key)),
        ])
    };

    let per_page = from_sources("perPage")
        .or_else(|| requested.map(|p| f64::from(p.per_page)))
        .unwrap_or(0.0);
    let page = from_sources("page")
        .or_else(|| requested.map(|p| f64::from(p.page)))
        .unwrap_or(1.0);
    let rows = from_sources("rows").unwrap_or(items_raw.len() as f64);

    ListResult {
        items: items_raw.iter().map(normalize_item).collect(),
        per_page: per_page as i64,
        page: page as i64,
        rows: rows as i64,
    }
}

/// Sum of the amounts shown on one page.
pub fn page_total<T>(result: &ListResult<T>, amount: impl Fn(&T) -> i64) -> MoneyCents {
    result
        .items
        .iter()
        .map(|item| MoneyCents::new(amount(item)))
        .sum()
}

/// Pager state shown under a list, reconciling what the server reported with
/// what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: i64,
    pub per_page: i64,
    pub rows: i64,
    pub total_pages: i64,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

impl PageInfo {
    /// Server numbers win; before the first response arrives the requested
    /// pagination is shown with zero rows.
    pub fn reconcile<T>(result: Option<&ListResult<T>>, requested: &Pagination) -> Self {
        let current_page = result
            .map(|r| r.page)
            .unwrap_or_else(|| i64::from(requested.page));
        let per_page = result
            .map(|r| r.per_page)
            .unwrap_or_else(|| i64::from(requested.per_page));
        let rows = result.map(|r| r.rows).unwrap_or(0);

        let total_pages = if per_page > 0 && rows > 0 {
            (rows - 1) / per_page + 1
        } else {
            0
        };

        Self {
            current_page,
            per_page,
            rows,
            total_pages,
            can_go_prev: current_page > 1,
            can_go_next: current_page.saturating_mul(per_page) < rows,
        }
    }
}

/// Page sizes offered to the user: the current one plus the usual choices.
pub fn per_page_options(current: u32) -> Vec<u32> {
    let mut options = vec![current, 10, 20, 50];
    options.sort_unstable();
    options.dedup();
    options
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::records::normalize_expense;

    const REQUESTED: Pagination = Pagination {
        per_page: 20,
        page: 3,
    };

    fn ids(result: &ListResult<api_types::expense::Expense>) -> Vec<i64> {
        result.items.iter().map(|e| e.id).collect()
    }

    #[test]
    fn bare_array_falls_back_to_requested_pagination() {
        let envelope = json!({
            "data": [{"id": 1, "amount": 12.5}, {"id": 2, "amount": 300}],
            "error": null
        });

        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);

        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(result.items[0].amount, 1250);
        assert_eq!(result.items[1].amount, 300);
        assert_eq!(result.per_page, 20);
        assert_eq!(result.page, 3);
        assert_eq!(result.rows, 2);
    }

    #[test]
    fn wrapped_items_with_inline_pagination() {
        let envelope = json!({
            "data": {"items": [{"id": 5}], "perPage": 10, "page": 2, "rows": 41},
            "error": null
        });

        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);

        assert_eq!(ids(&result), vec![5]);
        assert_eq!((result.per_page, result.page, result.rows), (10, 2, 41));
    }

    #[test]
    fn nested_data_array_is_found() {
        let envelope = json!({"data": {"data": [{"id": 8}, {"id": 9}]}, "error": null});
        let result = normalize_list(&envelope, None, normalize_expense);
        assert_eq!(ids(&result), vec![8, 9]);
        assert_eq!((result.per_page, result.page, result.rows), (0, 1, 2));
    }

    #[test]
    fn top_level_items_are_the_last_resort() {
        let envelope = json!({"data": null, "items": [{"id": 4}], "rows": "12"});
        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);
        assert_eq!(ids(&result), vec![4]);
        assert_eq!(result.rows, 12);
    }

    #[test]
    fn meta_string_is_decoded() {
        let envelope = json!({
            "data": [{"id": 1}],
            "error": null,
            "meta": "{\"perPage\": 50, \"page\": 1, \"rows\": 120}"
        });
        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);
        assert_eq!((result.per_page, result.page, result.rows), (50, 1, 120));
    }

    #[test]
    fn broken_meta_is_ignored() {
        let envelope = json!({"data": [{"id": 1}], "error": null, "meta": "{not json"});
        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);
        assert_eq!((result.per_page, result.page, result.rows), (20, 3, 1));
    }

    #[test]
    fn each_number_is_resolved_independently() {
        let envelope = json!({
            "data": {"items": [], "page": 4},
            "perPage": "bad",
            "error": null,
            "meta": {"perPage": 15, "rows": 61, "page": 9}
        });
        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);
        assert_eq!(result.page, 4);
        assert_eq!(result.per_page, 15);
        assert_eq!(result.rows, 61);
    }

    #[test]
    fn missing_items_yield_an_empty_page() {
        let envelope = json!({"data": {"rows": 0}, "error": null});
        let result = normalize_list(&envelope, Some(&REQUESTED), normalize_expense);
        assert!(result.items.is_empty());
        assert_eq!(result.rows, 0);
    }

    #[test]
    fn page_info_from_server_numbers() {
        let result = ListResult::<()> {
            items: vec![],
            per_page: 20,
            page: 2,
            rows: 45,
        };
        let info = PageInfo::reconcile(Some(&result), &REQUESTED);
        assert_eq!(
            info,
            PageInfo {
                current_page: 2,
                per_page: 20,
                rows: 45,
                total_pages: 3,
                can_go_prev: true,
                can_go_next: true,
            }
        );

        let last = ListResult::<()> { page: 3, ..result };
        let info = PageInfo::reconcile(Some(&last), &REQUESTED);
        assert!(!info.can_go_next);
    }

    #[test]
    fn page_info_before_first_response() {
        let info = PageInfo::reconcile::<()>(None, &REQUESTED);
        assert_eq!(info.current_page, 3);
        assert_eq!(info.per_page, 20);
        assert_eq!(info.total_pages, 0);
        assert!(!info.can_go_next);
        assert!(info.can_go_prev);
    }

    #[test]
    fn page_total_sums_amounts() {
        let envelope = json!({"data": [{"amount": 1.5}, {"amount": 250}]});
        let result = normalize_list(&envelope, None, normalize_expense);
        assert_eq!(page_total(&result, |e| e.amount), MoneyCents::new(400));
    }

    #[test]
    fn huge_server_numbers_do_not_overflow() {
        let envelope = json!({
            "data": [{"amount": 1e19}, {"amount": 1e19}],
            "meta": {"perPage": 20, "page": 1, "rows": 1e19}
        });
        let result = normalize_list(&envelope, None, normalize_expense);
        assert_eq!(result.rows, i64::MAX);
        assert_eq!(page_total(&result, |e| e.amount).cents(), i64::MAX);

        let info = PageInfo::reconcile(Some(&result), &REQUESTED);
        assert_eq!(info.total_pages, i64::MAX / 20 + 1);
        assert!(info.can_go_next);

        let negative = ListResult::<()> {
            items: vec![],
            per_page: 20,
            page: 1,
            rows: -5,
        };
        assert_eq!(PageInfo::reconcile(Some(&negative), &REQUESTED).total_pages, 0);
    }

    #[test]
    fn per_page_options_are_sorted_and_unique() {
        assert_eq!(per_page_options(20), vec![10, 20, 50]);
        assert_eq!(per_page_options(25), vec![10, 20, 25, 50]);
    }
}
