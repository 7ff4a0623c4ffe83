use shared::error::{ApiError, ErrorBody};
use thiserror::Error;

pub const LIST_FAILED_MESSAGE: &str = "Failed to load customers";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create customer";
const NETWORK_ERROR_CODE: &str = "network_error";
const INVALID_RESPONSE_CODE: &str = "invalid_response";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid directory base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("directory request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("directory api responded with status {status}")]
    Status {
        status: u16,
        body: Option<ErrorBody>,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::InvalidBaseUrl { .. } => None,
        }
    }

    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status {
                body: Some(body), ..
            } => body.message(),
            _ => None,
        }
    }

    /// Best-effort conversion into the endpoint's error shape. Never fails,
    /// even when the response body was missing or malformed.
    pub fn to_api_error(&self, fallback_message: &str) -> ApiError {
        match self {
            Self::Status { status, body } => {
                let body = body.as_ref();
                let code = body
                    .and_then(ErrorBody::code)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("http_{status}"));
                let message = body
                    .and_then(ErrorBody::message)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{fallback_message} (HTTP {status})"));
                ApiError::new(code, message)
            }
            Self::Transport(err) if err.is_decode() => ApiError::new(
                INVALID_RESPONSE_CODE,
                format!("{fallback_message} (unreadable response)"),
            ),
            Self::Transport(_) => ApiError::new(NETWORK_ERROR_CODE, fallback_message),
            Self::InvalidBaseUrl { .. } => ApiError::new("invalid_base_url", self.to_string()),
        }
    }
}
