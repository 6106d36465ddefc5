//! Errors returned by the strict parsing entry points of the engine.
//!
//! The normalizers, the query builder and the list controller never fail:
//! malformed input degrades to zero, empty or "no filter". Only explicit
//! parsing of user input ([`MoneyCents`], [`DatePreset`], [`SortOrder`]) can
//! report an error.
//!
//!  [`MoneyCents`]: crate::MoneyCents
//!  [`DatePreset`]: crate::DatePreset
//!  [`SortOrder`]: api_types::query::SortOrder
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid date filter: {0}")]
    InvalidPreset(String),
    #[error("Invalid sort order: {0}")]
    InvalidSortOrder(String),
}
