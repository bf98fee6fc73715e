//! Subscription snapshot as returned by `GET /subscription/status`
//!
//! A snapshot is an immutable point-in-time copy of plan, status, feature
//! flags and usage counters. It is replaced wholesale on refresh and never
//! patched in place.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "Free"),
            Plan::Pro => write!(f, "Pro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Trial,
    Expired,
    Cancelled,
    PastDue,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Trial => write!(f, "trial"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
            SubscriptionStatus::PastDue => write!(f, "past_due"),
        }
    }
}

/// Named feature keys carried in `features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    EmailReminders,
    SmsReminders,
    WhatsappReminders,
    BasicReporting,
    AutomatedSchedule,
    PrioritySupport,
    RemoveBranding,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::EmailReminders,
        Feature::SmsReminders,
        Feature::WhatsappReminders,
        Feature::BasicReporting,
        Feature::AutomatedSchedule,
        Feature::PrioritySupport,
        Feature::RemoveBranding,
    ];

    /// Wire name, as used by `GET /subscription/check-feature/:name`.
    pub fn key(&self) -> &'static str {
        match self {
            Feature::EmailReminders => "emailReminders",
            Feature::SmsReminders => "smsReminders",
            Feature::WhatsappReminders => "whatsappReminders",
            Feature::BasicReporting => "basicReporting",
            Feature::AutomatedSchedule => "automatedSchedule",
            Feature::PrioritySupport => "prioritySupport",
            Feature::RemoveBranding => "removeBranding",
        }
    }

    pub fn from_key(key: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Feature flags and the invoice cap. Missing keys deserialize as disabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub max_invoices: i64,
    pub email_reminders: bool,
    pub sms_reminders: bool,
    pub whatsapp_reminders: bool,
    pub basic_reporting: bool,
    pub automated_schedule: bool,
    pub priority_support: bool,
    pub remove_branding: bool,
}

impl Features {
    pub fn enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::EmailReminders => self.email_reminders,
            Feature::SmsReminders => self.sms_reminders,
            Feature::WhatsappReminders => self.whatsapp_reminders,
            Feature::BasicReporting => self.basic_reporting,
            Feature::AutomatedSchedule => self.automated_schedule,
            Feature::PrioritySupport => self.priority_support,
            Feature::RemoveBranding => self.remove_branding,
        }
    }

    /// The backend reports `-1` for no cap.
    pub fn max_invoices(&self) -> Option<u32> {
        u32::try_from(self.max_invoices).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Usage {
    #[serde(deserialize_with = "non_negative")]
    pub used: u32,
    /// Unlimited plans report `-1`; read as 0.
    #[serde(deserialize_with = "non_negative")]
    pub limit: u32,
    /// Server-computed and possibly stale; may be negative or absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining: Option<i64>,
    pub unlimited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trial {
    #[serde(default)]
    pub days_remaining: u32,
    pub ends_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycle {
    pub interval: String,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_period_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_billed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnapshot {
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial: Option<Trial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing: Option<Billing>,
    #[serde(default)]
    pub upgrade_recommended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_reason: Option<String>,
}

impl SubscriptionSnapshot {
    /// True when the snapshot agrees with itself: unlimited usage only on an
    /// active or trialing Pro plan, and `remaining` (if reported) matching
    /// `max(0, limit - used)` on capped plans.
    pub fn is_consistent(&self) -> bool {
        let entitled_pro = self.plan == Plan::Pro
            && matches!(
                self.status,
                SubscriptionStatus::Active | SubscriptionStatus::Trial
            );
        if self.usage.unlimited != entitled_pro {
            return false;
        }
        if self.usage.unlimited {
            return true;
        }
        match self.usage.remaining {
            Some(r) => r == expected_remaining(&self.usage),
            None => true,
        }
    }
}

/// `max(0, limit - used)`.
pub fn expected_remaining(usage: &Usage) -> i64 {
    (i64::from(usage.limit) - i64::from(usage.used)).max(0)
}

fn non_negative<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}
