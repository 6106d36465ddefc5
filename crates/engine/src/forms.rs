//! Form payload extraction and form population.
//!
//! A submitted form is a plain `field name -> string` map. Extraction never
//! fails: unreadable numbers become 0, exactly like the list normalizers.

use std::collections::HashMap;

use api_types::{
    auth::SignIn,
    expense::{Expense, ExpensePayload},
    recurrent_expense::{RecurrentExpense, RecurrentExpensePayload},
};
use chrono_tz::Tz;

use crate::{MoneyCents, coerce, dates};

pub type FormFields = HashMap<String, String>;

pub const CATEGORY_ID: &str = "categoryId";
pub const DESCRIPTION: &str = "description";
pub const AMOUNT: &str = "amount";
pub const DATE: &str = "date";
pub const PERIOD: &str = "period";
pub const EMAIL: &str = "email";
pub const PASSWORD: &str = "password";

fn value<'a>(form: &'a FormFields, key: &str) -> &'a str {
    form.get(key).map(String::as_str).unwrap_or("")
}

fn category_id(form: &FormFields) -> i64 {
    coerce::parse_number(value(form, CATEGORY_ID))
        .map(|id| id.trunc() as i64)
        .unwrap_or(0)
}

fn amount(form: &FormFields) -> i64 {
    MoneyCents::from_form_input(value(form, AMOUNT)).cents()
}

pub fn expense_payload(form: &FormFields) -> ExpensePayload {
    ExpensePayload {
        category_id: category_id(form),
        description: value(form, DESCRIPTION).to_string(),
        amount: amount(form),
        date: dates::parse_timestamp(value(form, DATE)).unwrap_or(0),
    }
}

pub fn recurrent_expense_payload(form: &FormFields) -> RecurrentExpensePayload {
    RecurrentExpensePayload {
        category_id: category_id(form),
        description: value(form, DESCRIPTION).to_string(),
        amount: amount(form),
        period: coerce::parse_int_prefix(value(form, PERIOD)).unwrap_or(0),
    }
}

pub fn sign_in_payload(form: &FormFields) -> SignIn {
    SignIn {
        email: value(form, EMAIL).to_string(),
        password: value(form, PASSWORD).to_string(),
    }
}

/// Values to pre-fill an expense form with. The date is the local calendar
/// day in `tz`, so a record stored at UTC midnight shows the day the user
/// picked.
pub fn expense_form_values(expense: &Expense, tz: &Tz) -> FormFields {
    FormFields::from([
        (CATEGORY_ID.to_string(), expense.category_id.to_string()),
        (DESCRIPTION.to_string(), expense.description.clone()),
        (AMOUNT.to_string(), MoneyCents::new(expense.amount).to_string()),
        (DATE.to_string(), dates::local_date_string(expense.date, tz)),
    ])
}

pub fn recurrent_expense_form_values(recurrent: &RecurrentExpense) -> FormFields {
    FormFields::from([
        (CATEGORY_ID.to_string(), recurrent.category_id.to_string()),
        (DESCRIPTION.to_string(), recurrent.description.clone()),
        (AMOUNT.to_string(), MoneyCents::new(recurrent.amount).to_string()),
        (PERIOD.to_string(), recurrent.period.to_string()),
    ])
}

/// Overlays `changes` on `base`, skipping fields that were not provided.
/// Used to edit a record from a partial set of inputs.
pub fn merge(mut base: FormFields, changes: FormFields) -> FormFields {
    base.extend(changes);
    base
}
