use api_types::query::SortOrder;
use clap::{Args, Parser, Subcommand};
use engine::{DatePreset, parse_sort_order};

use crate::config::Overrides;

#[derive(Debug, Parser)]
#[command(name = "expensa")]
#[command(about = "Track expenses and recurrent expenses from the terminal")]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    /// Print canonical JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List categories.
    Categories,
    /// Manage expenses.
    #[command(subcommand)]
    Expenses(ExpenseCommand),
    /// Manage recurrent expenses.
    #[command(subcommand)]
    Recurrent(RecurrentCommand),
    /// Sign in and show the current user.
    Whoami {
        /// Also exchange the session for a fresh access token.
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpenseCommand {
    List(ListArgs),
    Show { id: i64 },
    Add(AddExpense),
    Edit(EditExpense),
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum RecurrentCommand {
    List(ListArgs),
    Show { id: i64 },
    Add(AddRecurrent),
    /// Replace a recurrent expense (PUT).
    Edit(EditRecurrent),
    /// Update a recurrent expense in place (PATCH).
    Patch(EditRecurrent),
    Delete { id: i64 },
}

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Category id to filter by.
    #[arg(long)]
    pub category: Option<String>,
    /// Date range: all, today, last7, thisMonth, lastMonth, nextMonth,
    /// sixMonths, thisYear, custom.
    #[arg(long)]
    pub date: Option<DatePreset>,
    /// Start of a custom range (YYYY-MM-DD). Implies `--date custom`.
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// End of a custom range (YYYY-MM-DD). Implies `--date custom`.
    #[arg(long, requires = "from")]
    pub to: Option<String>,
    /// Sort by field; repeat to toggle the direction.
    #[arg(long = "sort", value_name = "FIELD")]
    pub sort: Vec<String>,
    /// Force the direction of the resulting sort (asc or desc).
    #[arg(long, value_parser = parse_sort_order)]
    pub order: Option<SortOrder>,
    #[arg(long)]
    pub page: Option<i64>,
    #[arg(long)]
    pub per_page: Option<u32>,
}

#[derive(Debug, Args)]
pub struct AddExpense {
    #[arg(long)]
    pub category: i64,
    #[arg(long)]
    pub description: String,
    /// Amount in major units (e.g. 12.50).
    #[arg(long)]
    pub amount: String,
    /// Day of the expense (YYYY-MM-DD); today when omitted.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct EditExpense {
    pub id: i64,
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddRecurrent {
    #[arg(long)]
    pub category: i64,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub amount: String,
    /// Repeat interval in months.
    #[arg(long, default_value_t = 1)]
    pub period: i64,
}

#[derive(Debug, Args)]
pub struct EditRecurrent {
    pub id: i64,
    #[arg(long)]
    pub category: Option<i64>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub period: Option<i64>,
}
