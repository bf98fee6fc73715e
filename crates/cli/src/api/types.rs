//! Request options and the error taxonomy shared by every endpoint

use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Machine-readable code the backend attaches when a plan cap is hit.
pub const LIMIT_REACHED: &str = "LIMIT_REACHED";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// 401 from the backend. The stored token has already been cleared.
    #[error("Session expired. Please log in again.")]
    AuthExpired,
    /// No token stored for an authenticated call; nothing was sent.
    #[error("Not logged in. Run 'zeeremind login' first.")]
    NotAuthenticated,
    #[error("Request timed out. Please check your connection and try again.")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    /// Rejected locally before any network call.
    #[error("{0}")]
    Invalid(String),
}

impl RequestError {
    /// True iff the backend reported `LIMIT_REACHED`.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, RequestError::Api { code: Some(code), .. } if code == LIMIT_REACHED)
    }

    /// The session is gone; callers should send the user to login.
    pub fn is_auth(&self) -> bool {
        matches!(self, RequestError::AuthExpired | RequestError::NotAuthenticated)
    }

    /// Network failures and 5xx responses; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            RequestError::Network(_) => true,
            RequestError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            RequestError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Per-call options. `None` fields fall back to the client configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Sent as `Authorization: Bearer <token>` when present.
    pub auth_token: Option<String>,
    pub timeout: Option<Duration>,
    /// Defaults to the configured count for GET and 0 for everything else.
    pub max_retries: Option<u32>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}
