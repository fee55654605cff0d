use axum::http::StatusCode;
use thiserror::Error;

/// Local persistence failures. These are surfaced to the caller, never dropped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode data file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// User input rejected before any state is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("count must be a whole number of 0 or more")]
    InvalidCount,

    #[error("goal must be a whole number of 0 or more")]
    InvalidGoal,

    #[error("no calendar for {year}-{month}, expected a month 1-12 in a supported year")]
    InvalidMonth { year: i32, month: u32 },

    #[error("auth event is missing a user id")]
    MissingUserId,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store answered with status {0}")]
    Status(u16),

    #[error("remote store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::internal(err)
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
