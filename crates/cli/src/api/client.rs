//! HTTP client for the ZeeRemind backend
//!
//! Every call goes through [`ApiClient::request`], which applies the
//! timeout, the GET-only retry policy with linear backoff, and 401 handling.

use super::token::TokenStore;
use super::types::{RequestError, RequestOptions};
use crate::config::ClientConfig;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const FALLBACK_ERROR: &str = "API Request Failed";

pub struct ApiClient {
    http: reqwest::blocking::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, RequestError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("zeeremind/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RequestError::Network(e.to_string()))?;
        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// The stored session token, or `NotAuthenticated` without touching the network.
    pub fn session_token(&self) -> Result<String, RequestError> {
        self.tokens.load().ok_or(RequestError::NotAuthenticated)
    }

    /// Issues `options.method` against `endpoint` and returns the JSON body.
    ///
    /// Retries only retryable failures (network errors, 5xx), waiting
    /// `retry_base_delay * n` before retry `n`. 401 clears the stored token
    /// and ends the call with `AuthExpired`; timeouts end it with `Timeout`.
    pub fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, RequestError> {
        let retries = options.max_retries.unwrap_or(if options.method == Method::GET {
            self.config.max_retries
        } else {
            0
        });

        let mut attempt: u32 = 0;
        loop {
            match self.send_once(endpoint, &options) {
                Ok(body) => return Ok(body),
                Err(err) if attempt < retries && err.is_retryable() => {
                    attempt += 1;
                    let delay = self.config.retry_base_delay() * attempt;
                    warn!(
                        endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(err) => {
                    debug!(endpoint, attempts = attempt + 1, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    /// GET with the stored session token.
    pub fn get_authed(&self, endpoint: &str) -> Result<Value, RequestError> {
        let token = self.session_token()?;
        self.request(endpoint, RequestOptions::get().token(token))
    }

    /// Non-GET with the stored session token and an optional JSON body.
    pub fn send_authed(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, RequestError> {
        let token = self.session_token()?;
        let mut options = RequestOptions::new(method).token(token);
        options.body = body;
        self.request(endpoint, options)
    }

    fn send_once(&self, endpoint: &str, options: &RequestOptions) -> Result<Value, RequestError> {
        let url = self.config.endpoint_url(endpoint);
        debug!(method = %options.method, %url, "sending request");

        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .timeout(options.timeout.unwrap_or_else(|| self.config.timeout()))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &options.auth_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }

        let resp = builder.send().map_err(classify)?;
        let status = resp.status();

        let text = resp.text().map_err(classify)?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(v) => v,
                Err(e) if status.is_success() => return Err(RequestError::Decode(e.to_string())),
                Err(_) => Value::Null,
            }
        };

        // Only a call that carried a session can expire one.
        if status == reqwest::StatusCode::UNAUTHORIZED && options.auth_token.is_some() {
            info!(endpoint, "session expired, clearing stored token");
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "could not clear stored token");
            }
            return Err(RequestError::AuthExpired);
        }

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

fn classify(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        RequestError::Timeout
    } else {
        RequestError::Network(err.to_string())
    }
}

/// Builds an `Api` error from a backend error body (`error`, then `message`).
pub fn api_error(status: u16, body: &Value) -> RequestError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .or_else(|| body.get("message").and_then(Value::as_str))
        .unwrap_or(FALLBACK_ERROR)
        .to_string();
    let code = body.get("code").and_then(Value::as_str).map(String::from);
    RequestError::Api {
        status,
        code,
        message,
    }
}

/// Unwraps the `{ success, data, code, error }` envelope.
///
/// A body that says `success: false` is an error even on a 2xx status.
pub fn data<T: DeserializeOwned>(body: Value) -> Result<T, RequestError> {
    let body = check_success(body)?;
    let inner = match body {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| RequestError::Decode(e.to_string()))
}

/// Passes `body` through unless it says `success: false`.
pub fn check_success(body: Value) -> Result<Value, RequestError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(api_error(200, &body));
    }
    Ok(body)
}

/// Percent-encodes `raw` as a single path segment (`/`, `?`, `#` included).
pub fn path_segment(raw: &str) -> String {
    let mut url = match reqwest::Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return raw.to_string(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(raw);
    }
    url.path().trim_start_matches('/').to_string()
}
