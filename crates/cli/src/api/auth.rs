//! `/auth/*` endpoints

use super::client::{data, path_segment, ApiClient, FALLBACK_ERROR};
use super::types::{RequestError, RequestOptions};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    pub fn new(name: &str, company_name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            company_name: company_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: "user".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The backend issued a token right away; it is now stored.
    LoggedIn,
    /// Account created, email verification pending.
    VerificationSent(String),
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChange {
    /// Same rules as the settings form: all fields present, new password at
    /// least eight characters, confirmation matching.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.current.is_empty() {
            return Err(RequestError::Invalid(
                "Current password is required".to_string(),
            ));
        }
        if self.new.chars().count() < MIN_PASSWORD_LEN {
            return Err(RequestError::Invalid(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.new != self.confirm {
            return Err(RequestError::Invalid("Passwords don't match".to_string()));
        }
        Ok(())
    }
}

/// Logs in and stores the session token.
pub fn login(client: &ApiClient, email: &str, password: &str) -> Result<String, RequestError> {
    let body = client
        .request(
            "/auth/login",
            RequestOptions::new(Method::POST).body(json!({ "email": email, "password": password })),
        )
        .map_err(|e| match e {
            // No session was sent, so a 401 is a rejected password.
            RequestError::Api {
                status: 401,
                code,
                message,
            } if message == FALLBACK_ERROR => RequestError::Api {
                status: 401,
                code,
                message: "Invalid email or password".to_string(),
            },
            other => other,
        })?;
    let token = extract_token(&body).ok_or_else(|| RequestError::Api {
        status: 200,
        code: None,
        message: "Authentication failed".to_string(),
    })?;
    store_token(client, &token);
    Ok(token)
}

pub fn register(client: &ApiClient, request: &RegisterRequest) -> Result<RegisterOutcome, RequestError> {
    let payload = serde_json::to_value(request).map_err(|e| RequestError::Decode(e.to_string()))?;
    let body = client.request("/auth/register", RequestOptions::new(Method::POST).body(payload))?;
    if let Some(token) = extract_token(&body) {
        store_token(client, &token);
        return Ok(RegisterOutcome::LoggedIn);
    }
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(super::client::api_error(200, &body));
    }
    Ok(RegisterOutcome::VerificationSent(message_or(
        &body,
        "Registration successful. Please check your email.",
    )))
}

pub fn resend_verification(client: &ApiClient, email: &str) -> Result<String, RequestError> {
    let body = client.request(
        "/auth/resend-verification",
        RequestOptions::new(Method::POST).body(json!({ "email": email })),
    )?;
    Ok(message_or(&body, "Verification email sent."))
}

pub fn verify_email(client: &ApiClient, token: &str) -> Result<String, RequestError> {
    let body = client.request(
        &format!("/auth/verify-email/{}", path_segment(token)),
        RequestOptions::get(),
    )?;
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(super::client::api_error(200, &body));
    }
    if let Some(session) = extract_token(&body) {
        store_token(client, &session);
    }
    Ok(message_or(&body, "Email verified."))
}

pub fn me(client: &ApiClient) -> Result<User, RequestError> {
    data(client.get_authed("/auth/me")?)
}

pub fn update_details(client: &ApiClient, details: &UpdateDetails) -> Result<User, RequestError> {
    let payload = serde_json::to_value(details).map_err(|e| RequestError::Decode(e.to_string()))?;
    data(client.send_authed(Method::PUT, "/auth/updatedetails", Some(payload))?)
}

/// Validates locally, then changes the password. A rotated token is stored.
pub fn update_password(client: &ApiClient, change: &PasswordChange) -> Result<(), RequestError> {
    change.validate()?;
    let body = client.send_authed(
        Method::PUT,
        "/auth/updatepassword",
        Some(json!({ "currentPassword": change.current, "newPassword": change.new })),
    )?;
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(super::client::api_error(200, &body));
    }
    if let Some(token) = extract_token(&body) {
        store_token(client, &token);
    }
    Ok(())
}

/// Forgets the stored session.
pub fn logout(client: &ApiClient) -> anyhow::Result<()> {
    client.tokens().clear()
}

fn extract_token(body: &Value) -> Option<String> {
    body.get("token")
        .or_else(|| body.get("data").and_then(|d| d.get("token")))
        .and_then(Value::as_str)
        .filter(|t| !t.trim().is_empty())
        .map(String::from)
}

fn store_token(client: &ApiClient, token: &str) {
    if let Err(e) = client.tokens().save(token) {
        warn!(error = %e, "could not persist session token");
    }
}

fn message_or(body: &Value, fallback: &str) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or(fallback)
        .to_string()
}
