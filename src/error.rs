use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures while downloading the article page, before any extraction runs.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not connect to {0}")]
    Connect(String),

    #[error("page request timed out")]
    Timeout,

    #[error("page load failed: {status}")]
    Http { status: reqwest::StatusCode },

    #[error("received an empty page")]
    EmptyBody,

    #[error("{0}")]
    Request(String),
}

impl FetchError {
    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http { status }
        } else {
            Self::Request(err.to_string())
        }
    }

    /// The site itself could not be reached, as opposed to answering badly.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Timeout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("article source error: {0}")]
    ArticleSource(#[from] FetchError),

    #[error("{0}")]
    ConfigMissing(&'static str),

    #[error("network error reaching AI service: {0}")]
    UpstreamNetwork(String),

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("unexpected response format from {0}")]
    UpstreamMalformed(&'static str),

    #[error("request processing timed out")]
    Timeout,

    #[error("internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => *status,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::ArticleSource(_)
            | AppError::ConfigMissing(_)
            | AppError::UpstreamNetwork(_)
            | AppError::UpstreamMalformed(_)
            | AppError::Internal(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the caller. Internal detail never leaves the process.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::ArticleSource(err) if err.is_unreachable() => {
                "Could not connect to the article server. Check the URL and that the site is available.".to_string()
            }
            AppError::ArticleSource(err) => format!("Failed to parse article: {}", err),
            AppError::ConfigMissing(msg) => (*msg).to_string(),
            AppError::UpstreamNetwork(_) => {
                "Network error: could not connect to the AI service. Check your internet connection.".to_string()
            }
            AppError::Upstream { message, .. } => message.clone(),
            AppError::UpstreamMalformed(what) => format!("Unexpected response format from the {}", what),
            AppError::Timeout => "Request processing timed out".to_string(),
            AppError::Internal(_) | AppError::ConfigError(_) => {
                "An unexpected error occurred. Please try again or contact the administrator.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
