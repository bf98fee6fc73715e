//! Entitlement evaluation: snapshot in, access flags out
//!
//! [`evaluate`] is total and pure. Absent optional data collapses to the
//! conservative value (no remaining quota, trial/billing not applicable).

use crate::snapshot::{Feature, Features, Plan, SubscriptionSnapshot, SubscriptionStatus};
use serde::Serialize;

/// Fraction of the invoice cap at which the UI starts warning, as `NUM/DEN`.
const APPROACHING_NUM: u64 = 4;
const APPROACHING_DEN: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementView {
    pub plan: Plan,
    pub status: SubscriptionStatus,
    pub is_pro: bool,
    pub is_free: bool,
    pub is_active: bool,
    pub is_trial: bool,
    pub is_expired: bool,
    pub is_past_due: bool,
    pub can_upgrade: bool,
    pub unlimited: bool,
    pub invoices_used: u32,
    pub invoice_limit: u32,
    pub invoices_remaining: u32,
    pub is_approaching_limit: bool,
    pub trial_days_remaining: Option<u32>,
    pub cancel_at_period_end: bool,
    pub upgrade_reason: Option<String>,
    pub features: Features,
}

impl EntitlementView {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.enabled(feature)
    }
}

/// Derives the access flags for a snapshot.
pub fn evaluate(snapshot: &SubscriptionSnapshot) -> EntitlementView {
    let usage = &snapshot.usage;
    let is_pro = snapshot.plan == Plan::Pro;
    let is_free = snapshot.plan == Plan::Free;
    let is_trial = snapshot.status == SubscriptionStatus::Trial;
    let is_expired = snapshot.status == SubscriptionStatus::Expired;

    let invoices_remaining = usage
        .remaining
        .map(|r| r.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0);

    EntitlementView {
        plan: snapshot.plan,
        status: snapshot.status,
        is_pro,
        is_free,
        is_active: snapshot.status == SubscriptionStatus::Active,
        is_trial,
        is_expired,
        is_past_due: snapshot.status == SubscriptionStatus::PastDue,
        can_upgrade: is_free || is_expired || is_trial,
        unlimited: usage.unlimited,
        invoices_used: usage.used,
        invoice_limit: usage.limit,
        invoices_remaining,
        is_approaching_limit: approaching_limit(usage.used, usage.limit, usage.unlimited),
        trial_days_remaining: snapshot.trial.as_ref().map(|t| t.days_remaining),
        cancel_at_period_end: snapshot
            .billing
            .as_ref()
            .map(|b| b.cancel_at_period_end)
            .unwrap_or(false),
        upgrade_reason: snapshot.upgrade_reason.clone(),
        features: snapshot.features.clone(),
    }
}

/// `!unlimited && used >= 0.8 * limit`, in integer arithmetic.
pub fn approaching_limit(used: u32, limit: u32, unlimited: bool) -> bool {
    !unlimited && u64::from(used) * APPROACHING_DEN >= u64::from(limit) * APPROACHING_NUM
}
