//! List state controller.
//!
//! Holds the filter, sort and page selections of one list view and keeps the
//! derived [`QueryOptions`] in sync. Every change to what is being listed
//! (filters, sort, page size) sends the view back to page 1; only explicit
//! page navigation moves away from it.

use api_types::query::{Pagination, QueryOptions, SortOrder, Sorting};

use crate::{
    dates::Clock,
    listing::PageInfo,
    query::{self, DatePreset, FilterSelection},
};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const DEFAULT_SORT_FIELD: &str = "amount";

#[derive(Debug, Clone)]
pub struct ListState<C> {
    clock: C,
    selection: FilterSelection,
    options: QueryOptions,
}

impl<C: Clock> ListState<C> {
    /// Starts on page 1, sorted by amount descending, with `date` as the
    /// initial date filter. A `per_page` of 0 falls back to
    /// [`DEFAULT_PER_PAGE`].
    pub fn new(clock: C, per_page: u32, date: DatePreset) -> Self {
        let per_page = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page
        };
        let selection = FilterSelection {
            date,
            ..FilterSelection::default()
        };
        let filters = query::build_filters(&selection, &clock.now());

        Self {
            clock,
            selection,
            options: QueryOptions {
                filters,
                sorting: Some(Sorting {
                    field: DEFAULT_SORT_FIELD.to_string(),
                    order: SortOrder::Desc,
                }),
                pagination: Pagination { per_page, page: 1 },
            },
        }
    }

    /// Expense list: current month by default.
    pub fn expenses(clock: C, per_page: u32) -> Self {
        Self::new(clock, per_page, DatePreset::ThisMonth)
    }

    /// Recurrent expense list: no date restriction.
    pub fn recurrent_expenses(clock: C, per_page: u32) -> Self {
        Self::new(clock, per_page, DatePreset::All)
    }

    pub fn query_options(&self) -> &QueryOptions {
        &self.options
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn pagination(&self) -> Pagination {
        self.options.pagination
    }

    pub fn sorting(&self) -> Option<&Sorting> {
        self.options.sorting.as_ref()
    }

    pub fn set_category_filter(&mut self, value: &str) {
        self.selection.category = value.to_string();
        self.refresh_filters();
    }

    pub fn set_date_filter(&mut self, preset: DatePreset) {
        self.selection.date = preset;
        self.refresh_filters();
    }

    /// Stores the custom range inputs. They only produce a clause while the
    /// date filter is [`DatePreset::Custom`].
    pub fn set_custom_date_range(&mut self, start: &str, end: &str) {
        self.selection.custom_start = start.to_string();
        self.selection.custom_end = end.to_string();
        self.refresh_filters();
    }

    /// Same field: flip the order. Another field: start descending.
    pub fn toggle_sort(&mut self, field: &str) {
        let order = match &self.options.sorting {
            Some(current) if current.field == field => current.order.flipped(),
            _ => SortOrder::Desc,
        };
        self.options.sorting = Some(Sorting {
            field: field.to_string(),
            order,
        });
        self.reset_to_first_page();
    }

    /// Ignored for 0.
    pub fn set_per_page(&mut self, per_page: u32) {
        if per_page == 0 {
            return;
        }
        self.options.pagination = Pagination { per_page, page: 1 };
    }

    /// Ignored for pages below 1.
    pub fn go_to_page(&mut self, page: i64) {
        if page < 1 {
            return;
        }
        let Ok(page) = u32::try_from(page) else {
            return;
        };
        self.options.pagination.page = page;
    }

    pub fn reset_to_first_page(&mut self) {
        self.options.pagination.page = 1;
    }

    /// Moves forward if the pager allows it. Returns whether the page changed.
    pub fn next_page(&mut self, info: &PageInfo) -> bool {
        if !info.can_go_next {
            return false;
        }
        self.go_to_page(info.current_page.saturating_add(1));
        true
    }

    /// Moves back if the pager allows it. Returns whether the page changed.
    pub fn prev_page(&mut self, info: &PageInfo) -> bool {
        if !info.can_go_prev {
            return false;
        }
        self.go_to_page(info.current_page.saturating_sub(1));
        true
    }

    fn refresh_filters(&mut self) {
        self.options.filters = query::build_filters(&self.selection, &self.clock.now());
        self.reset_to_first_page();
    }
}
