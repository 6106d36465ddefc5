//! Query-options builder: turns filter selections into filter clauses.

use std::{fmt, str::FromStr};

use api_types::query::{Connector, FilterField, FilterOperator, FilterValue, Filters, SortOrder};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::{EngineError, dates};

pub const CATEGORY_FIELD: &str = "category_id";
pub const DATE_FIELD: &str = "date";

/// Date ranges offered by the date filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePreset {
    #[default]
    All,
    Today,
    Last7,
    ThisMonth,
    LastMonth,
    NextMonth,
    SixMonths,
    ThisYear,
    Custom,
}

impl DatePreset {
    pub const ALL: [DatePreset; 9] = [
        Self::All,
        Self::Today,
        Self::Last7,
        Self::ThisMonth,
        Self::LastMonth,
        Self::NextMonth,
        Self::SixMonths,
        Self::ThisYear,
        Self::Custom,
    ];

    /// Identifier used on the command line and in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Today => "today",
            Self::Last7 => "last7",
            Self::ThisMonth => "thisMonth",
            Self::LastMonth => "lastMonth",
            Self::NextMonth => "nextMonth",
            Self::SixMonths => "sixMonths",
            Self::ThisYear => "thisYear",
            Self::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All dates",
            Self::Today => "Today",
            Self::Last7 => "Last 7 days",
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::NextMonth => "Next month",
            Self::SixMonths => "Last 6 months",
            Self::ThisYear => "This year (so far)",
            Self::Custom => "Custom range",
        }
    }

    /// Local calendar days covered by the preset, anchored on `now`.
    ///
    /// `All` and `Custom` have no intrinsic range.
    pub fn day_range(self, now: &DateTime<Tz>) -> Option<(NaiveDate, NaiveDate)> {
        let today = now.date_naive();
        match self {
            Self::All | Self::Custom => None,
            Self::Today => Some((today, today)),
            Self::Last7 => Some((today - Duration::days(6), today)),
            Self::ThisMonth => Some((dates::first_of_month(today, 0), today)),
            Self::LastMonth => Some((
                dates::first_of_month(today, -1),
                dates::last_of_month(today, -1),
            )),
            Self::NextMonth => Some((
                dates::first_of_month(today, 1),
                dates::last_of_month(today, 1),
            )),
            Self::SixMonths => Some((
                today.checked_sub_months(Months::new(6)).unwrap_or(today),
                today,
            )),
            Self::ThisYear => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
                today,
            )),
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatePreset {
    type Err = EngineError;

    /// Accepts the camelCase identifiers as well as kebab/snake spellings
    /// (`this-month`, `this_month`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().to_ascii_lowercase() == key)
            .ok_or_else(|| EngineError::InvalidPreset(s.to_string()))
    }
}

/// Parses a sort direction typed by the user (`asc`/`desc`, any case).
pub fn parse_sort_order(raw: &str) -> Result<SortOrder, EngineError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Ok(SortOrder::Asc),
        "desc" | "descending" => Ok(SortOrder::Desc),
        _ => Err(EngineError::InvalidSortOrder(raw.to_string())),
    }
}

/// User selections the filter set is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    /// Category id as typed/selected; empty means any category.
    pub category: String,
    pub date: DatePreset,
    /// Start of a custom range, as entered in a date input.
    pub custom_start: String,
    /// End of a custom range, as entered in a date input.
    pub custom_end: String,
}

/// Builds the filter set for `selection`, with date presets anchored on `now`.
///
/// Returns `None` when no clause applies. Input that cannot be understood
/// (a non-integer category, an unparseable custom date) drops the clause
/// instead of failing.
pub fn build_filters(selection: &FilterSelection, now: &DateTime<Tz>) -> Option<Filters> {
    let tz = now.timezone();
    let mut fields = Vec::new();

    let category = selection.category.trim();
    if !category.is_empty()
        && let Ok(id) = category.parse::<i64>()
    {
        fields.push(FilterField::new(
            CATEGORY_FIELD,
            FilterValue::Integer(id),
            FilterOperator::Eq,
        ));
    }

    let days = match selection.date {
        DatePreset::Custom => custom_range(&selection.custom_start, &selection.custom_end, &tz),
        preset => preset.day_range(now),
    };
    if let Some((start, end)) = days {
        fields.push(FilterField::new(
            DATE_FIELD,
            FilterValue::Integer(dates::start_of_day(start, &tz)),
            FilterOperator::Ge,
        ));
        fields.push(FilterField::new(
            DATE_FIELD,
            FilterValue::Integer(dates::end_of_day(end, &tz)),
            FilterOperator::Le,
        ));
    }

    if fields.is_empty() {
        return None;
    }
    Some(Filters {
        fields,
        connector: Some(Connector::And),
    })
}

fn custom_range(start: &str, end: &str, tz: &Tz) -> Option<(NaiveDate, NaiveDate)> {
    let start = dates::parse_input_date(start, tz)?;
    let end = dates::parse_input_date(end, tz)?;
    Some((start, end))
}
