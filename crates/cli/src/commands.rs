use api_types::{
    category::Category, expense::Expense, list::ListResult, recurrent_expense::RecurrentExpense,
};
use chrono_tz::Tz;
use client::{AlertKind, AlertStore, ApiClient, AuthStore, CategoryStore};
use engine::{
    Clock, DatePreset, FormFields, ListState, MoneyCents, PageInfo, SystemClock, dates, forms,
};
use serde::Serialize;
use tracing::debug;

use crate::{
    cli::{
        AddExpense, AddRecurrent, Command, EditExpense, EditRecurrent, ExpenseCommand, ListArgs,
        RecurrentCommand,
    },
    config::{AppConfig, PASSWORD_ENV},
    error::{AppError, Result},
    prompt, render,
};

/// Everything a command needs: the API client, the session stores and the
/// resolved configuration.
pub struct Session {
    pub api: ApiClient,
    pub auth: AuthStore,
    pub alerts: AlertStore,
    pub categories: CategoryStore,
    pub config: AppConfig,
    pub tz: Tz,
}

impl Session {
    pub fn new(config: AppConfig) -> Result<Self> {
        let tz = config.tz()?;
        let api = ApiClient::new(&config.base_url, config.timeout())?;
        Ok(Self {
            api,
            auth: AuthStore::new(),
            alerts: AlertStore::new(),
            categories: CategoryStore::new(),
            config,
            tz,
        })
    }

    fn clock(&self) -> SystemClock {
        SystemClock::new(self.tz)
    }

    async fn sign_in(&self) -> Result<()> {
        let mut form = FormFields::new();
        let email = if self.config.email.is_empty() {
            prompt::read_line("Email: ")?
        } else {
            self.config.email.clone()
        };
        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => password,
            _ => prompt::read_password("Password: ")?,
        };
        form.insert(forms::EMAIL.to_string(), email);
        form.insert(forms::PASSWORD.to_string(), password);

        let auth = self.api.sign_in(&forms::sign_in_payload(&form)).await?;
        self.auth
            .set_signed_in(auth.user, auth.access_token.value)
            .await;
        Ok(())
    }

    async fn token(&self) -> Option<String> {
        self.auth.access_token().await
    }

    async fn load_categories(&self) -> Vec<Category> {
        let token = self.token().await;
        self.categories
            .fetch(&self.api, token.as_deref(), false)
            .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput<'a, T> {
    #[serde(flatten)]
    result: &'a ListResult<T>,
    page_info: PageInfo,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub async fn run(session: &Session, command: Command, json: bool) -> Result<()> {
    session.sign_in().await?;

    match command {
        Command::Categories => {
            let categories = session.load_categories().await;
            if let Some(err) = session.categories.error().await {
                return Err(AppError::Usage(format!("could not load categories: {err}")));
            }
            if json {
                print_json(&categories)
            } else {
                print!("{}", render::categories_table(&categories));
                Ok(())
            }
        }
        Command::Expenses(command) => run_expenses(session, command, json).await,
        Command::Recurrent(command) => run_recurrent(session, command, json).await,
        Command::Whoami { refresh } => whoami(session, refresh, json).await,
    }
}

async fn whoami(session: &Session, refresh: bool, json: bool) -> Result<()> {
    if refresh {
        let token = session.token().await;
        let auth = session.api.refresh(token.as_deref()).await?;
        session
            .auth
            .set_signed_in(auth.user, auth.access_token.value)
            .await;
    }

    let snapshot = session.auth.snapshot().await;
    let Some(user) = snapshot.user else {
        return Err(AppError::Usage("not signed in".to_string()));
    };
    if json {
        return print_json(&user);
    }
    match &user.name {
        Some(name) => println!("{name} <{}> (id {})", user.email, user.id),
        None => println!("{} (id {})", user.email, user.id),
    }
    Ok(())
}

/// Applies list flags in the order the controller expects: filters and sort
/// first (each resets to page 1), then page size, then the page itself.
fn apply_list_args<C: Clock>(state: &mut ListState<C>, args: &ListArgs, tz: &Tz) -> Result<()> {
    if let Some(category) = &args.category {
        state.set_category_filter(category);
    }

    match (&args.from, &args.to) {
        (Some(from), Some(to)) => {
            dates::require_input_date(from, tz)?;
            dates::require_input_date(to, tz)?;
            if args.date.is_some_and(|preset| preset != DatePreset::Custom) {
                return Err(AppError::Usage(
                    "--from/--to only apply to --date custom".to_string(),
                ));
            }
            state.set_custom_date_range(from, to);
            state.set_date_filter(DatePreset::Custom);
        }
        (None, None) => {
            if let Some(preset) = args.date {
                state.set_date_filter(preset);
            }
        }
        _ => {
            return Err(AppError::Usage(
                "--from and --to must be given together".to_string(),
            ));
        }
    }

    for field in &args.sort {
        state.toggle_sort(field);
    }
    if let Some(order) = args.order
        && let Some(current) = state.sorting().cloned()
        && current.order != order
    {
        state.toggle_sort(&current.field);
    }
    if let Some(per_page) = args.per_page {
        state.set_per_page(per_page);
    }
    if let Some(page) = args.page {
        state.go_to_page(page);
    }
    Ok(())
}

fn expense_form(
    category: Option<i64>,
    description: Option<&str>,
    amount: Option<&str>,
) -> Result<FormFields> {
    let mut form = FormFields::new();
    if let Some(category) = category {
        form.insert(forms::CATEGORY_ID.to_string(), category.to_string());
    }
    if let Some(description) = description {
        form.insert(forms::DESCRIPTION.to_string(), description.to_string());
    }
    if let Some(amount) = amount {
        let amount: MoneyCents = amount.parse()?;
        form.insert(forms::AMOUNT.to_string(), amount.to_string());
    }
    Ok(form)
}

fn checked_date(raw: &str, tz: &Tz) -> Result<String> {
    let day = dates::require_input_date(raw, tz)?;
    Ok(day.format("%Y-%m-%d").to_string())
}

/// Overlays the edited fields on the stored expense. Without a new date the
/// stored timestamp is resubmitted as is, since the local day shown in forms
/// would be read back as UTC midnight.
fn expense_edit_form(
    current: &Expense,
    mut changes: FormFields,
    date: Option<&str>,
    tz: &Tz,
) -> Result<FormFields> {
    let day = match date {
        Some(raw) => checked_date(raw, tz)?,
        None => current.date.to_string(),
    };
    changes.insert(forms::DATE.to_string(), day);
    Ok(forms::merge(forms::expense_form_values(current, tz), changes))
}

async fn run_expenses(session: &Session, command: ExpenseCommand, json: bool) -> Result<()> {
    let tz = session.tz;
    let token = session.token().await;
    let token = token.as_deref();

    match command {
        ExpenseCommand::List(args) => {
            let mut state = ListState::expenses(session.clock(), session.config.per_page);
            apply_list_args(&mut state, &args, &tz)?;
            let options = state.query_options();
            debug!(?options, "listing expenses");

            let result = session.api.list_expenses(token, options).await?;
            let info = PageInfo::reconcile(Some(&result), &state.pagination());
            if json {
                return print_json(&ListOutput {
                    result: &result,
                    page_info: info,
                });
            }
            let categories = session.load_categories().await;
            println!("{}", render::filter_line(state.selection()));
            print!("{}", render::expenses_table(&result, &categories, &tz));
            println!("{}", render::pager_line(&info));
            println!("{}", render::per_page_hint(state.pagination().per_page));
        }
        ExpenseCommand::Show { id } => {
            let expense = session.api.get_expense(token, id).await?;
            if json {
                return print_json(&expense);
            }
            let categories = session.load_categories().await;
            print!("{}", render::expense_detail(&expense, &categories, &tz));
        }
        ExpenseCommand::Add(AddExpense {
            category,
            description,
            amount,
            date,
        }) => {
            let mut form = expense_form(Some(category), Some(&description), Some(&amount))?;
            let day = match date {
                Some(raw) => checked_date(&raw, &tz)?,
                None => dates::local_date_string(session.clock().now().timestamp(), &tz),
            };
            form.insert(forms::DATE.to_string(), day);

            let created = session
                .api
                .create_expense(token, &forms::expense_payload(&form))
                .await?;
            session
                .alerts
                .set(format!("expense #{} created", created.id), AlertKind::Success)
                .await;
            if json {
                return print_json(&created);
            }
        }
        ExpenseCommand::Edit(EditExpense {
            id,
            category,
            description,
            amount,
            date,
        }) => {
            let current = session.api.get_expense(token, id).await?;
            let changes = expense_form(category, description.as_deref(), amount.as_deref())?;
            let form = expense_edit_form(&current, changes, date.as_deref(), &tz)?;

            let updated = session
                .api
                .update_expense(token, id, &forms::expense_payload(&form))
                .await?;
            session
                .alerts
                .set(format!("expense #{} updated", updated.id), AlertKind::Success)
                .await;
            if json {
                return print_json(&updated);
            }
        }
        ExpenseCommand::Delete { id } => {
            session.api.delete_expense(token, id).await?;
            session
                .alerts
                .set(format!("expense #{id} deleted"), AlertKind::Success)
                .await;
        }
    }
    Ok(())
}

fn recurrent_form(
    category: Option<i64>,
    description: Option<&str>,
    amount: Option<&str>,
    period: Option<i64>,
) -> Result<FormFields> {
    let mut form = expense_form(category, description, amount)?;
    if let Some(period) = period {
        form.insert(forms::PERIOD.to_string(), period.to_string());
    }
    Ok(form)
}

async fn run_recurrent(session: &Session, command: RecurrentCommand, json: bool) -> Result<()> {
    let tz = session.tz;
    let token = session.token().await;
    let token = token.as_deref();

    match command {
        RecurrentCommand::List(args) => {
            let mut state =
                ListState::recurrent_expenses(session.clock(), session.config.per_page);
            apply_list_args(&mut state, &args, &tz)?;
            let options = state.query_options();
            debug!(?options, "listing recurrent expenses");

            let result = session.api.list_recurrent_expenses(token, options).await?;
            let info = PageInfo::reconcile(Some(&result), &state.pagination());
            if json {
                return print_json(&ListOutput {
                    result: &result,
                    page_info: info,
                });
            }
            let categories = session.load_categories().await;
            println!("{}", render::filter_line(state.selection()));
            print!("{}", render::recurrent_table(&result, &categories, &tz));
            println!("{}", render::pager_line(&info));
            println!("{}", render::per_page_hint(state.pagination().per_page));
        }
        RecurrentCommand::Show { id } => {
            let recurrent = session.api.get_recurrent_expense(token, id).await?;
            if json {
                return print_json(&recurrent);
            }
            let categories = session.load_categories().await;
            print!("{}", render::recurrent_detail(&recurrent, &categories, &tz));
        }
        RecurrentCommand::Add(AddRecurrent {
            category,
            description,
            amount,
            period,
        }) => {
            let form = recurrent_form(
                Some(category),
                Some(&description),
                Some(&amount),
                Some(period),
            )?;
            let created = session
                .api
                .create_recurrent_expense(token, &forms::recurrent_expense_payload(&form))
                .await?;
            session
                .alerts
                .set(
                    format!("recurrent expense #{} created", created.id),
                    AlertKind::Success,
                )
                .await;
            if json {
                return print_json(&created);
            }
        }
        RecurrentCommand::Edit(args) => {
            let updated = edit_recurrent(session, token, args, false).await?;
            if json {
                return print_json(&updated);
            }
        }
        RecurrentCommand::Patch(args) => {
            let patched = edit_recurrent(session, token, args, true).await?;
            if json {
                return print_json(&patched);
            }
        }
        RecurrentCommand::Delete { id } => {
            session.api.delete_recurrent_expense(token, id).await?;
            session
                .alerts
                .set(format!("recurrent expense #{id} deleted"), AlertKind::Success)
                .await;
        }
    }
    Ok(())
}

async fn edit_recurrent(
    session: &Session,
    token: Option<&str>,
    args: EditRecurrent,
    patch: bool,
) -> Result<RecurrentExpense> {
    let EditRecurrent {
        id,
        category,
        description,
        amount,
        period,
    } = args;

    let current = session.api.get_recurrent_expense(token, id).await?;
    let changes = recurrent_form(category, description.as_deref(), amount.as_deref(), period)?;
    let form = forms::merge(forms::recurrent_expense_form_values(&current), changes);
    let payload = forms::recurrent_expense_payload(&form);

    let saved = if patch {
        session.api.patch_recurrent_expense(token, id, &payload).await?
    } else {
        session.api.update_recurrent_expense(token, id, &payload).await?
    };
    session
        .alerts
        .set(
            format!("recurrent expense #{} updated", saved.id),
            AlertKind::Success,
        )
        .await;
    Ok(saved)
}
