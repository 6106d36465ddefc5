use std::time::Duration;

use chrono_tz::Tz;
use clap::Args;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/expensa.toml";
const ENV_PREFIX: &str = "EXPENSA";

/// Environment variable the password is read from before prompting.
pub const PASSWORD_ENV: &str = "EXPENSA_PASSWORD";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub email: String,
    /// IANA name; local day boundaries and form dates use it.
    pub timezone: String,
    pub per_page: u32,
    pub log_level: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            email: String::new(),
            timezone: "UTC".to_string(),
            per_page: 20,
            log_level: "warn".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Timezone(self.timezone.clone()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:8080).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override email (password is never read from CLI).
    #[arg(long, global = true)]
    pub email: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

pub fn load(overrides: &Overrides) -> Result<AppConfig> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &overrides.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(email) = &overrides.email {
        settings.email = email.clone();
    }
    if let Some(timezone) = &overrides.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(level) = &overrides.log_level {
        settings.log_level = level.clone();
    }

    Ok(settings)
}
