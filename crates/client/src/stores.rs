//! Session state shared across views: who is signed in, the current alert
//! banner and the category cache.
//!
//! Each store is a cheap cloneable handle; clones share the same state.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use api_types::{auth::User, category::Category};
use tokio::{sync::Mutex, time::Instant};
use tracing::info;

use crate::ApiClient;

/// How long an alert stays visible.
pub const ALERT_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub is_signed_in: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AuthStore {
    inner: Arc<Mutex<AuthSnapshot>>,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_signed_in(&self, user: User, access_token: String) {
        info!(user_id = user.id, "signed in");
        let mut guard = self.inner.lock().await;
        *guard = AuthSnapshot {
            user: Some(user),
            access_token: Some(access_token),
            is_signed_in: true,
        };
    }

    pub async fn set_signed_out(&self) {
        info!("signed out");
        *self.inner.lock().await = AuthSnapshot::default();
    }

    pub async fn snapshot(&self) -> AuthSnapshot {
        self.inner.lock().await.clone()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.inner.lock().await.access_token.clone()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
    pub kind: AlertKind,
}

#[derive(Clone, Debug, Default)]
pub struct AlertStore {
    inner: Arc<Mutex<Option<(Alert, Instant)>>>,
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current alert and restarts its timer.
    pub async fn set(&self, message: impl Into<String>, kind: AlertKind) {
        let alert = Alert {
            message: message.into(),
            kind,
        };
        *self.inner.lock().await = Some((alert, Instant::now()));
    }

    pub async fn clear(&self) {
        *self.inner.lock().await = None;
    }

    /// The alert to show, if one was set less than [`ALERT_TTL`] ago.
    pub async fn current(&self) -> Option<Alert> {
        let mut guard = self.inner.lock().await;
        match guard.as_ref() {
            Some((alert, set_at)) if set_at.elapsed() < ALERT_TTL => Some(alert.clone()),
            Some(_) => {
                *guard = None;
                None
            }
            None => None,
        }
    }
}

#[derive(Debug, Default)]
struct CategoryState {
    categories: Vec<Category>,
    loaded: bool,
    error: Option<String>,
}

/// Clears the loading flag when a fetch finishes or is dropped mid-flight.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug, Default)]
pub struct CategoryStore {
    inner: Arc<Mutex<CategoryState>>,
    is_loading: Arc<AtomicBool>,
}

impl CategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.inner.lock().await.categories.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    pub async fn loaded(&self) -> bool {
        self.inner.lock().await.loaded
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.lock().await.error.clone()
    }

    pub async fn set_categories(&self, categories: Vec<Category>) {
        self.inner.lock().await.categories = categories;
    }

    /// Loads categories through `client`.
    ///
    /// Unless `force` is set, a cache that is already loaded (or loading) is
    /// returned as is. A failed load records the error and yields an empty
    /// list, leaving any previously cached categories in place.
    pub async fn fetch(
        &self,
        client: &ApiClient,
        token: Option<&str>,
        force: bool,
    ) -> Vec<Category> {
        let loading = {
            let mut guard = self.inner.lock().await;
            if !force && (guard.loaded || self.is_loading()) {
                return guard.categories.clone();
            }
            guard.error = None;
            LoadingGuard::start(&self.is_loading)
        };

        let result = client.list_categories(token).await;

        let mut guard = self.inner.lock().await;
        drop(loading);
        match result {
            Ok(categories) => {
                info!(count = categories.len(), "categories loaded");
                guard.categories = categories.clone();
                guard.loaded = true;
                categories
            }
            Err(err) => {
                guard.error = Some(err.user_message());
                Vec::new()
            }
        }
    }
}
