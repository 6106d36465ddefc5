use serde::{Deserialize, Serialize};

/// Response envelope returned by every endpoint of the expenses API.
///
/// `data` is `null` when the request failed, in which case `error` carries a
/// human readable message. `meta` is optional and, when present, may be either
/// a JSON object or a JSON-encoded string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

pub mod query {
    use super::*;

    /// Comparison operator of a single filter clause.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum FilterOperator {
        #[serde(rename = "=")]
        Eq,
        #[serde(rename = "!=")]
        Ne,
        #[serde(rename = ">")]
        Gt,
        #[serde(rename = "<")]
        Lt,
        #[serde(rename = ">=")]
        Ge,
        #[serde(rename = "<=")]
        Le,
    }

    impl FilterOperator {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Eq => "=",
                Self::Ne => "!=",
                Self::Gt => ">",
                Self::Lt => "<",
                Self::Ge => ">=",
                Self::Le => "<=",
            }
        }
    }

    /// Right-hand side of a filter clause.
    ///
    /// Serialized untagged, so `Integer(3)` is `3` and `Text("x")` is `"x"`.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum FilterValue {
        Integer(i64),
        Text(String),
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FilterField {
        pub name: String,
        pub value: FilterValue,
        pub operator: FilterOperator,
    }

    impl FilterField {
        pub fn new(name: &str, value: FilterValue, operator: FilterOperator) -> Self {
            Self {
                name: name.to_string(),
                value,
                operator,
            }
        }
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Connector {
        #[default]
        And,
        Or,
    }

    /// A non-empty set of clauses joined by one connector.
    ///
    /// "No filter" is `Option::None` on [`QueryOptions::filters`], never an
    /// empty `fields` list.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Filters {
        pub fields: Vec<FilterField>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub connector: Option<Connector>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum SortOrder {
        Asc,
        #[default]
        Desc,
    }

    impl SortOrder {
        #[must_use]
        pub fn flipped(self) -> Self {
            match self {
                Self::Asc => Self::Desc,
                Self::Desc => Self::Asc,
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Asc => "asc",
                Self::Desc => "desc",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Sorting {
        pub field: String,
        pub order: SortOrder,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Pagination {
        /// Must be > 0.
        pub per_page: u32,
        /// 1-based.
        pub page: u32,
    }

    /// Filter, sort and pagination descriptor sent to list endpoints as the
    /// `query_options` query parameter.
    ///
    /// The value is also the identity of a list request: two equal options
    /// always describe the same page of results.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct QueryOptions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub filters: Option<Filters>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub sorting: Option<Sorting>,
        pub pagination: Pagination,
    }
}

pub mod list {
    use super::*;

    /// One page of canonical records plus the server's pagination numbers.
    ///
    /// `rows` is the total number of matching records server side, not the
    /// length of `items`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListResult<T> {
        pub items: Vec<T>,
        pub per_page: i64,
        pub page: i64,
        pub rows: i64,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SignIn {
        pub email: String,
        pub password: String,
    }

    /// Signed-in user as returned by the auth endpoints.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    pub struct User {
        pub id: i64,
        pub email: String,
        pub name: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccessToken {
        pub value: String,
        /// Epoch seconds.
        pub expires_at: i64,
        /// Epoch seconds.
        pub issued_at: i64,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AuthResponse {
        pub user: User,
        pub access_token: AccessToken,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Category {
        pub id: i64,
        pub name: String,
        pub uid: String,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Expense {
        pub id: i64,
        pub category_id: i64,
        pub description: String,
        /// Minor units (cents).
        pub amount: i64,
        /// Epoch seconds, UTC.
        pub date: i64,
    }

    /// Body of `POST /expenses` and `PUT /expenses/{id}`.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpensePayload {
        pub category_id: i64,
        pub description: String,
        /// Minor units (cents).
        pub amount: i64,
        /// Epoch seconds, UTC.
        pub date: i64,
    }
}

pub mod recurrent_expense {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecurrentExpense {
        pub id: i64,
        pub user_id: i64,
        pub category_id: i64,
        pub description: String,
        /// Minor units (cents).
        pub amount: i64,
        /// Repeat interval in months.
        pub period: i64,
        /// Epoch seconds of the last generated copy, `None` if none yet.
        pub last_copy_created: Option<i64>,
        pub created_at: i64,
        pub updated_at: i64,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecurrentExpensePayload {
        pub category_id: i64,
        pub description: String,
        /// Minor units (cents).
        pub amount: i64,
        /// Months.
        pub period: i64,
    }
}
