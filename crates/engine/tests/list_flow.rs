use api_types::query::{FilterOperator, FilterValue, SortOrder};
use chrono::TimeZone;
use chrono_tz::{Europe::Rome, UTC};
use serde_json::json;

use engine::{
    DatePreset, FixedClock, ListState, MoneyCents, PageInfo, forms, normalize_expense,
    normalize_list, normalize_recurrent_expense, page_total,
};

fn rome_clock() -> FixedClock {
    FixedClock(Rome.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
}

#[test]
fn filtered_listing_request_and_response() {
    let mut state = ListState::expenses(rome_clock(), 20);
    state.set_category_filter("3");
    state.set_date_filter(DatePreset::Today);

    let options = state.query_options().clone();
    let encoded = serde_json::to_value(&options).unwrap();
    assert_eq!(
        encoded,
        json!({
            "filters": {
                "fields": [
                    {"name": "category_id", "value": 3, "operator": "="},
                    {"name": "date", "value": 1_710_457_200, "operator": ">="},
                    {"name": "date", "value": 1_710_457_200 + 86_399, "operator": "<="}
                ],
                "connector": "AND"
            },
            "sorting": {"field": "amount", "order": "desc"},
            "pagination": {"perPage": 20, "page": 1}
        })
    );

    let response = json!({
        "data": [
            {"id": 1, "categoryId": 3, "description": "Coffee", "amount": 3.5, "date": 1_710_496_800},
            {"id": 2, "categoryId": 3, "description": "Lunch", "amount": 1250, "date": "1710496800000"}
        ],
        "error": null
    });
    let result = normalize_list(&response, Some(&options.pagination), normalize_expense);

    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].amount, 350);
    assert_eq!(result.items[1].date, 1_710_496_800);
    assert_eq!((result.per_page, result.page, result.rows), (20, 1, 2));
    assert_eq!(page_total(&result, |e| e.amount), MoneyCents::new(1600));

    let info = PageInfo::reconcile(Some(&result), &options.pagination);
    assert!(!info.can_go_next);
    assert!(!info.can_go_prev);
    assert_eq!(info.total_pages, 1);
}

#[test]
fn paging_through_a_server_reported_result() {
    let clock = FixedClock(UTC.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    let mut state = ListState::recurrent_expenses(clock, 10);
    state.toggle_sort("description");
    assert_eq!(state.sorting().unwrap().order, SortOrder::Desc);

    let response = json!({
        "data": {"items": [{"id": 11, "lastCopyCreated": null}], "rows": 25},
        "error": null,
        "meta": {"perPage": 10, "page": 1}
    });
    let result = normalize_list(
        &response,
        Some(&state.pagination()),
        normalize_recurrent_expense,
    );
    assert_eq!(result.items[0].last_copy_created, None);

    let info = PageInfo::reconcile(Some(&result), &state.pagination());
    assert_eq!(info.total_pages, 3);
    assert!(state.next_page(&info));
    assert_eq!(state.pagination().page, 2);

    state.set_per_page(50);
    assert_eq!(state.pagination().page, 1);
    assert_eq!(state.pagination().per_page, 50);
}

#[test]
fn custom_range_is_cleared_by_a_preset() {
    let mut state = ListState::expenses(rome_clock(), 20);
    state.set_date_filter(DatePreset::Custom);
    state.set_custom_date_range("2024-02-01", "2024-02-29");

    let fields = &state.query_options().filters.as_ref().unwrap().fields;
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].operator, FilterOperator::Ge);
    assert_eq!(fields[0].value, FilterValue::Integer(1_706_742_000));

    state.set_date_filter(DatePreset::All);
    assert_eq!(state.query_options().filters, None);
}

#[test]
fn money_round_trip_through_the_form() {
    let expense = normalize_expense(&json!({"amount": 1250, "date": "2024-03-15"}));
    let values = forms::expense_form_values(&expense, &UTC);
    assert_eq!(values[forms::AMOUNT], "12.50");

    let payload = forms::expense_payload(&values);
    assert_eq!(payload.amount, 1250);
    assert_eq!(payload.date, 1_710_460_800);
    assert_eq!(MoneyCents::new(payload.amount).to_currency_string(), "$12.50");
}
