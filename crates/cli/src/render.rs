//! Plain-text output: tables, record details and the pager line.

use std::fmt::Write;

use api_types::{
    category::Category, expense::Expense, list::ListResult, recurrent_expense::RecurrentExpense,
};
use chrono_tz::Tz;
use client::{Alert, AlertKind};
use engine::{DatePreset, FilterSelection, MoneyCents, PageInfo, dates, page_total};

struct Table {
    header: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    /// Columns aligned to the right (amounts).
    right: Vec<usize>,
}

impl Table {
    fn new(header: Vec<&'static str>) -> Self {
        Self {
            header,
            rows: Vec::new(),
            right: Vec::new(),
        }
    }

    fn align_right(mut self, column: usize) -> Self {
        self.right.push(column);
        self
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(idx) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let header: Vec<String> = self.header.iter().map(|h| h.to_string()).collect();
        let mut out = String::new();
        for row in std::iter::once(&header).chain(&self.rows) {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(idx, (cell, width))| {
                    if self.right.contains(&idx) {
                        format!("{cell:>width$}")
                    } else {
                        format!("{cell:<width$}")
                    }
                })
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

fn category_name(categories: &[Category], id: i64) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

fn money(cents: i64) -> String {
    MoneyCents::new(cents).to_currency_string()
}

pub fn categories_table(categories: &[Category]) -> String {
    let mut table = Table::new(vec!["ID", "NAME", "UID"]);
    for category in categories {
        table.push(vec![
            category.id.to_string(),
            category.name.clone(),
            category.uid.clone(),
        ]);
    }
    table.render()
}

pub fn expenses_table(result: &ListResult<Expense>, categories: &[Category], tz: &Tz) -> String {
    let mut table =
        Table::new(vec!["ID", "DATE", "CATEGORY", "DESCRIPTION", "AMOUNT"]).align_right(4);
    for expense in &result.items {
        table.push(vec![
            expense.id.to_string(),
            dates::local_datetime_string(expense.date, tz),
            category_name(categories, expense.category_id),
            expense.description.clone(),
            money(expense.amount),
        ]);
    }

    let mut out = table.render();
    let total = page_total(result, |e| e.amount);
    let _ = writeln!(out, "Page total: {}", total.to_currency_string());
    out
}

pub fn recurrent_table(
    result: &ListResult<RecurrentExpense>,
    categories: &[Category],
    tz: &Tz,
) -> String {
    let mut table = Table::new(vec![
        "ID",
        "CATEGORY",
        "DESCRIPTION",
        "AMOUNT",
        "EVERY",
        "LAST COPY",
    ])
    .align_right(3);
    for recurrent in &result.items {
        table.push(vec![
            recurrent.id.to_string(),
            category_name(categories, recurrent.category_id),
            recurrent.description.clone(),
            money(recurrent.amount),
            period_label(recurrent.period),
            last_copy_label(recurrent.last_copy_created, tz),
        ]);
    }
    table.render()
}

fn period_label(months: i64) -> String {
    if months == 1 {
        "1 month".to_string()
    } else {
        format!("{months} months")
    }
}

fn last_copy_label(last_copy: Option<i64>, tz: &Tz) -> String {
    match last_copy {
        Some(seconds) if seconds > 0 => dates::local_datetime_string(seconds, tz),
        _ => "never".to_string(),
    }
}

pub fn expense_detail(expense: &Expense, categories: &[Category], tz: &Tz) -> String {
    format!(
        "Expense #{}\n  Date:        {}\n  Category:    {}\n  Description: {}\n  Amount:      {}\n",
        expense.id,
        dates::local_datetime_string(expense.date, tz),
        category_name(categories, expense.category_id),
        expense.description,
        money(expense.amount),
    )
}

pub fn recurrent_detail(recurrent: &RecurrentExpense, categories: &[Category], tz: &Tz) -> String {
    format!(
        "Recurrent expense #{}\n  Category:    {}\n  Description: {}\n  Amount:      {}\n  Every:       {}\n  Last copy:   {}\n  Created:     {}\n  Updated:     {}\n",
        recurrent.id,
        category_name(categories, recurrent.category_id),
        recurrent.description,
        money(recurrent.amount),
        period_label(recurrent.period),
        last_copy_label(recurrent.last_copy_created, tz),
        dates::local_datetime_string(recurrent.created_at, tz),
        dates::local_datetime_string(recurrent.updated_at, tz),
    )
}

/// Summary of the active filters, shown above a list.
pub fn filter_line(selection: &FilterSelection) -> String {
    let mut line = match selection.date {
        DatePreset::Custom => format!(
            "{}: {} to {}",
            selection.date.label(),
            selection.custom_start,
            selection.custom_end
        ),
        preset => preset.label().to_string(),
    };
    if !selection.category.trim().is_empty() {
        let _ = write!(line, ", category {}", selection.category.trim());
    }
    line
}

/// `Page 2 of 3 (45 rows, 20 per page) | prev: --page 1 | next: --page 3`
pub fn pager_line(info: &PageInfo) -> String {
    let mut line = format!(
        "Page {} of {} ({} rows, {} per page)",
        info.current_page,
        info.total_pages.max(1),
        info.rows,
        info.per_page
    );
    if info.can_go_prev {
        let _ = write!(line, " | prev: --page {}", info.current_page.saturating_sub(1));
    }
    if info.can_go_next {
        let _ = write!(line, " | next: --page {}", info.current_page.saturating_add(1));
    }
    line
}

pub fn per_page_hint(current: u32) -> String {
    let options: Vec<String> = engine::per_page_options(current)
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    format!("Page sizes: {}", options.join(", "))
}

pub fn alert_line(alert: &Alert) -> String {
    match alert.kind {
        AlertKind::Success => format!("ok: {}", alert.message),
        AlertKind::Error => format!("error: {}", alert.message),
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::UTC;

    use super::*;

    fn categories() -> Vec<Category> {
        vec![Category {
            id: 3,
            name: "Food".to_string(),
            uid: "food".to_string(),
        }]
    }

    #[test]
    fn expense_table_shows_local_dates_and_dollars() {
        let result = ListResult {
            items: vec![
                Expense {
                    id: 1,
                    category_id: 3,
                    description: "Groceries".to_string(),
                    amount: 123_450,
                    date: 1_710_496_800,
                },
                Expense {
                    id: 2,
                    category_id: 9,
                    description: "Taxi".to_string(),
                    amount: 1250,
                    date: 1_710_496_800,
                },
            ],
            per_page: 20,
            page: 1,
            rows: 2,
        };

        let out = expenses_table(&result, &categories(), &UTC);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "ID  DATE                 CATEGORY  DESCRIPTION     AMOUNT"
        );
        assert_eq!(
            lines[1],
            "1   Mar 15, 2024, 10:00  Food      Groceries    $1,234.50"
        );
        assert_eq!(
            lines[2],
            "2   Mar 15, 2024, 10:00  #9        Taxi            $12.50"
        );
        assert_eq!(lines[3], "Page total: $1,247.00");
    }

    #[test]
    fn recurrent_labels() {
        assert_eq!(period_label(1), "1 month");
        assert_eq!(period_label(12), "12 months");
        assert_eq!(last_copy_label(None, &UTC), "never");
        assert_eq!(last_copy_label(Some(0), &UTC), "never");
        assert_eq!(
            last_copy_label(Some(1_710_496_800), &UTC),
            "Mar 15, 2024, 10:00"
        );
    }

    #[test]
    fn pager_line_mentions_reachable_pages() {
        let info = PageInfo {
            current_page: 2,
            per_page: 20,
            rows: 45,
            total_pages: 3,
            can_go_prev: true,
            can_go_next: true,
        };
        assert_eq!(
            pager_line(&info),
            "Page 2 of 3 (45 rows, 20 per page) | prev: --page 1 | next: --page 3"
        );

        let empty = PageInfo {
            current_page: 1,
            rows: 0,
            total_pages: 0,
            can_go_prev: false,
            can_go_next: false,
            ..info
        };
        assert_eq!(pager_line(&empty), "Page 1 of 1 (0 rows, 20 per page)");
    }

    #[test]
    fn filter_line_describes_selection() {
        let selection = FilterSelection {
            category: "3".to_string(),
            date: DatePreset::ThisMonth,
            ..FilterSelection::default()
        };
        assert_eq!(filter_line(&selection), "This month, category 3");

        let custom = FilterSelection {
            date: DatePreset::Custom,
            custom_start: "2024-01-01".to_string(),
            custom_end: "2024-01-31".to_string(),
            ..FilterSelection::default()
        };
        assert_eq!(filter_line(&custom), "Custom range: 2024-01-01 to 2024-01-31");
    }

    #[test]
    fn per_page_hint_lists_choices() {
        assert_eq!(per_page_hint(25), "Page sizes: 10, 20, 25, 50");
    }
}
