use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    /// Successful status, but the envelope carried an `error` message.
    #[error("{0}")]
    Api(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response carried no data")]
    MissingData,
}

impl ClientError {
    /// Message suitable for an alert banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } | Self::Api(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}
