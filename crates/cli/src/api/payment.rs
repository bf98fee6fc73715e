//! `/payment/*` endpoints (Paddle or Polar, whichever the backend runs)

use super::client::{check_success, data, ApiClient};
use super::types::RequestError;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    #[default]
    Monthly,
    Yearly,
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingPeriod::Monthly => write!(f, "monthly"),
            BillingPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// `client`: an in-page overlay (Paddle). `redirect`: a hosted page (Polar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutKind {
    Client,
    Redirect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Paddle,
    Polar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    pub user_id: String,
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutData {
    pub price_id: Option<String>,
    pub customer_email: Option<String>,
    pub custom_data: Option<CustomData>,
    pub checkout_url: Option<String>,
    pub checkout_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    #[serde(rename = "type")]
    pub kind: CheckoutKind,
    pub processor: Processor,
    #[serde(default)]
    pub data: CheckoutData,
}

impl CheckoutSession {
    /// Hosted checkout page, for redirect-style processors.
    pub fn redirect_url(&self) -> Option<&str> {
        match self.kind {
            CheckoutKind::Redirect => self.data.checkout_url.as_deref(),
            CheckoutKind::Client => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortalUrl {
    portal_url: String,
}

pub fn create_checkout(
    client: &ApiClient,
    plan: &str,
    period: BillingPeriod,
) -> Result<CheckoutSession, RequestError> {
    data(client.send_authed(
        Method::POST,
        "/payment/checkout",
        Some(json!({ "plan": plan, "billingCycle": period.to_string() })),
    )?)
}

pub fn cancel(client: &ApiClient) -> Result<(), RequestError> {
    check_success(client.send_authed(Method::POST, "/payment/cancel", None)?)?;
    Ok(())
}

pub fn portal_url(client: &ApiClient) -> Result<String, RequestError> {
    let portal: PortalUrl = data(client.get_authed("/payment/portal-url")?)?;
    Ok(portal.portal_url)
}
