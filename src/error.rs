use serde_json::Value;
use thiserror::Error;

/// Main error type for request building and response resolution
#[derive(Debug, Error)]
pub enum RestError {
    /// Error reported by the API server
    #[error("API error {code}: {message}")]
    Api {
        code: String,
        message: String,
        args: Option<Value>,
    },

    /// Failed response whose body does not carry a structured error
    #[error("HTTP error{}: {body}", .status.map(|s| format!(" {}", s)).unwrap_or_default())]
    Http { status: Option<u16>, body: String },

    /// Successful response whose body cannot be mapped to the declared type
    #[error("failed to parse response: {source}")]
    Parse {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// Flat header list with a dangling name
    #[error("header list must hold name/value pairs, got {0} entries")]
    OddHeaderPairs(usize),

    /// Response handed to a builder with no request in flight
    #[error("no pending request to resolve; build the request first")]
    NotPending,

    /// Expected value was not produced
    #[error("missing {0}")]
    Missing(&'static str),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl RestError {
    /// Create a new API error
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        RestError::Api {
            code: code.into(),
            message: message.into(),
            args: None,
        }
    }

    /// Server error code, when the server reported one
    pub fn code(&self) -> Option<&str> {
        match self {
            RestError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Human readable message; the server message for API errors
    pub fn message(&self) -> String {
        match self {
            RestError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check if this error was reported by the server
    pub fn is_api_error(&self) -> bool {
        matches!(self, RestError::Api { .. })
    }

    /// Check if the session token was rejected
    pub fn is_invalid_session(&self) -> bool {
        self.code() == Some("INVALID_KS")
    }

    /// Check if the session is not allowed to call the action
    pub fn is_forbidden(&self) -> bool {
        self.code() == Some("SERVICE_FORBIDDEN")
    }

    /// Get the HTTP status of a transport level failure
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestError::Http { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type for REST operations
pub type Result<T> = std::result::Result<T, RestError>;
