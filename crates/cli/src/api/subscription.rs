//! `/subscription/*` endpoints

use super::client::{data, ApiClient};
use super::types::{RequestError, RequestOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeeremind_core::{Feature, Features, SubscriptionSnapshot};

/// An entry from `GET /subscription/plans`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub interval: String,
    #[serde(default)]
    pub features: Features,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingTransaction {
    pub id: String,
    pub status: String,
    pub amount: String,
    pub currency: String,
    pub created_at: String,
    #[serde(default)]
    pub billed_at: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub receipt_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureAccess {
    #[serde(default)]
    has_access: bool,
}

/// `GET /subscription/status` with an explicit token.
pub fn status_with(client: &ApiClient, token: &str) -> Result<SubscriptionSnapshot, RequestError> {
    data(client.request("/subscription/status", RequestOptions::get().token(token))?)
}

/// Plans are public; no token is sent.
pub fn plans(client: &ApiClient) -> Result<Vec<PlanInfo>, RequestError> {
    data(client.request("/subscription/plans", RequestOptions::get())?)
}

pub fn billing_history(client: &ApiClient) -> Result<Vec<BillingTransaction>, RequestError> {
    data(client.get_authed("/subscription/billing-history")?)
}

/// Raw usage statistics; the shape is owned by the backend.
pub fn usage(client: &ApiClient) -> Result<Value, RequestError> {
    data(client.get_authed("/subscription/usage")?)
}

pub fn check_feature(client: &ApiClient, feature: Feature) -> Result<bool, RequestError> {
    let access: FeatureAccess = data(
        client.get_authed(&format!("/subscription/check-feature/{}", feature.key()))?,
    )?;
    Ok(access.has_access)
}
