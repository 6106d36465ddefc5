//! HTTP collaborator of the expense tracker and the session state shared by
//! its callers.

pub use api::ApiClient;
pub use error::ClientError;
pub use stores::{Alert, AlertKind, AlertStore, AuthSnapshot, AuthStore, CategoryStore};

mod api;
mod error;
pub mod stores;
