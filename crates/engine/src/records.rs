//! Record normalizers: loose API JSON in, canonical records out.
//!
//! None of these fail. A missing or malformed field becomes `0`, `""` or
//! `None` so callers always get a structurally valid record.

use api_types::{
    category::Category, expense::Expense, recurrent_expense::RecurrentExpense,
};
use serde_json::Value;

use crate::{
    MoneyCents,
    coerce::{self, field},
    dates,
};

fn text(object: &Value, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn amount(object: &Value) -> i64 {
    MoneyCents::from_api_amount(coerce::lenient_number(object.get("amount"))).cents()
}

pub fn normalize_expense(raw: &Value) -> Expense {
    Expense {
        id: coerce::lenient_integer(raw.get("id")),
        category_id: coerce::lenient_integer(field(raw, &["categoryId", "category_id"])),
        description: text(raw, "description"),
        amount: amount(raw),
        date: dates::normalize_timestamp(raw.get("date")),
    }
}

pub fn normalize_recurrent_expense(raw: &Value) -> RecurrentExpense {
    let last_copy_created = field(raw, &["lastCopyCreated", "last_copy_created"])
        .map(|value| dates::normalize_timestamp(Some(value)));

    RecurrentExpense {
        id: coerce::lenient_integer(raw.get("id")),
        user_id: coerce::lenient_integer(field(raw, &["userId", "user_id"])),
        category_id: coerce::lenient_integer(field(raw, &["categoryId", "category_id"])),
        description: text(raw, "description"),
        amount: amount(raw),
        period: coerce::lenient_integer(raw.get("period")),
        last_copy_created,
        created_at: dates::normalize_timestamp(field(raw, &["createdAt", "created_at"])),
        updated_at: dates::normalize_timestamp(field(raw, &["updatedAt", "updated_at"])),
    }
}

/// Categories fall back on each other: a missing name shows the uid, a
/// missing uid is the id as text.
pub fn normalize_category(raw: &Value) -> Category {
    let id_value = field(raw, &["id"]);
    let id = id_value
        .and_then(coerce::strict_number)
        .map(|id| id.trunc() as i64)
        .unwrap_or(0);

    let uid = raw.get("uid").and_then(Value::as_str).map(str::to_string);
    let name = raw
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| uid.clone())
        .unwrap_or_default();
    let uid = uid.unwrap_or_else(|| match id_value {
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    });

    Category { id, name, uid }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn expense_accepts_snake_case_and_numeric_strings() {
        let expense = normalize_expense(&json!({
            "id": "7",
            "category_id": "3",
            "description": "Groceries",
            "amount": "12.5",
            "date": "2024-03-15"
        }));

        assert_eq!(
            expense,
            Expense {
                id: 7,
                category_id: 3,
                description: "Groceries".to_string(),
                amount: 1250,
                date: 1_710_460_800,
            }
        );
    }

    #[test]
    fn expense_camel_case_wins_over_snake_case() {
        let expense = normalize_expense(&json!({"categoryId": 2, "category_id": 9}));
        assert_eq!(expense.category_id, 2);
    }

    #[test]
    fn expense_amount_dual_interpretation() {
        assert_eq!(normalize_expense(&json!({"amount": 12.5})).amount, 1250);
        assert_eq!(normalize_expense(&json!({"amount": 1250})).amount, 1250);
        assert_eq!(normalize_expense(&json!({"amount": 0})).amount, 0);
        assert_eq!(normalize_expense(&json!({"amount": "n/a"})).amount, 0);
    }

    #[test]
    fn malformed_expense_degrades_to_zero_values() {
        let expense = normalize_expense(&json!({
            "id": {"nested": true},
            "description": 42,
            "date": "soon"
        }));
        assert_eq!(expense, Expense::default());

        assert_eq!(normalize_expense(&json!(null)), Expense::default());
        assert_eq!(normalize_expense(&json!("text")), Expense::default());
    }

    #[test]
    fn expense_date_in_milliseconds() {
        let expense = normalize_expense(&json!({"date": 1_710_460_800_000_i64}));
        assert_eq!(expense.date, 1_710_460_800);
    }

    #[test]
    fn recurrent_expense_reads_both_spellings() {
        let recurrent = normalize_recurrent_expense(&json!({
            "id": 1,
            "user_id": "5",
            "categoryId": 3,
            "description": "Rent",
            "amount": 95000,
            "period": "1",
            "last_copy_created": 1_710_460_800,
            "created_at": "2024-01-01",
            "updatedAt": 1_704_067_200_000_i64
        }));

        assert_eq!(
            recurrent,
            RecurrentExpense {
                id: 1,
                user_id: 5,
                category_id: 3,
                description: "Rent".to_string(),
                amount: 95_000,
                period: 1,
                last_copy_created: Some(1_710_460_800),
                created_at: 1_704_067_200,
                updated_at: 1_704_067_200,
            }
        );
    }

    #[test]
    fn missing_last_copy_is_none_not_zero() {
        let recurrent = normalize_recurrent_expense(&json!({"lastCopyCreated": null}));
        assert_eq!(recurrent.last_copy_created, None);

        let recurrent = normalize_recurrent_expense(&json!({}));
        assert_eq!(recurrent.last_copy_created, None);
        assert_eq!(recurrent.user_id, 0);
        assert_eq!(recurrent.created_at, 0);
    }

    #[test]
    fn unparseable_last_copy_is_zero() {
        let recurrent = normalize_recurrent_expense(&json!({"lastCopyCreated": "never"}));
        assert_eq!(recurrent.last_copy_created, Some(0));
    }

    #[test]
    fn category_fallbacks() {
        assert_eq!(
            normalize_category(&json!({"id": "4", "name": "Food", "uid": "food"})),
            Category {
                id: 4,
                name: "Food".to_string(),
                uid: "food".to_string(),
            }
        );
        assert_eq!(
            normalize_category(&json!({"id": 4, "uid": "food"})),
            Category {
                id: 4,
                name: "food".to_string(),
                uid: "food".to_string(),
            }
        );
        assert_eq!(
            normalize_category(&json!({"id": 9})),
            Category {
                id: 9,
                name: String::new(),
                uid: "9".to_string(),
            }
        );
        assert_eq!(normalize_category(&json!({"id": "x"})).id, 0);
    }
}
