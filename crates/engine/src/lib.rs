//! Client-side logic of the expense tracker, free of I/O.
//!
//! Everything here is a pure transformation: API JSON into canonical
//! records, filter selections into [`QueryOptions`], form fields into
//! payloads. Time enters only through a [`Clock`].
//!
//! [`QueryOptions`]: api_types::query::QueryOptions

pub use dates::{Clock, FixedClock, SystemClock};
pub use error::EngineError;
pub use forms::FormFields;
pub use list_state::ListState;
pub use listing::{PageInfo, normalize_list, page_total, per_page_options};
pub use money::MoneyCents;
pub use query::{DatePreset, FilterSelection, build_filters, parse_sort_order};
pub use records::{normalize_category, normalize_expense, normalize_recurrent_expense};

pub mod coerce;
pub mod dates;
mod error;
pub mod forms;
pub mod list_state;
pub mod listing;
mod money;
pub mod query;
pub mod records;
