//! Invoice records as the backend returns them, plus list-view helpers

use crate::channels::ReminderChannels;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Paid => write!(f, "paid"),
            InvoiceStatus::Overdue => write!(f, "overdue"),
            InvoiceStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "pending" => InvoiceStatus::Pending,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            other => InvoiceStatus::Other(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    pub amount: f64,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub reminder_channels: ReminderChannels,
    #[serde(default)]
    pub reminders_sent: Vec<String>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    /// The body to send back on `PUT /invoice-reminder/invoices/:id`.
    pub fn to_draft(&self) -> NewInvoice {
        NewInvoice {
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            client_phone: self.client_phone.clone(),
            amount: self.amount,
            due_date: self.due_date.clone(),
            payment_link: self.payment_link.clone(),
            invoice_number: self.invoice_number.clone(),
            reminder_channels: self.reminder_channels.clone(),
        }
    }
}

/// Create/update request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub client_name: String,
    pub client_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_phone: Option<String>,
    pub amount: f64,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub reminder_channels: ReminderChannels,
}

/// List-view filter: free-text query over client name/email plus a status.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub query: Option<String>,
    /// `None` means all statuses.
    pub status: Option<InvoiceStatus>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if let Some(q) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = invoice.client_name.to_lowercase().contains(&q)
                || invoice.client_email.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        match &self.status {
            Some(status) => &invoice.status == status,
            None => true,
        }
    }

    pub fn apply<'a>(&self, invoices: &'a [Invoice]) -> Vec<&'a Invoice> {
        invoices.iter().filter(|inv| self.matches(inv)).collect()
    }
}

/// Optimistically appends a reminder timestamp to the matching invoice.
///
/// Only the list view's counter is touched; nothing here feeds gating.
/// Returns `false` if no invoice has that id.
pub fn record_reminder_sent(invoices: &mut [Invoice], id: &str, sent_at: &str) -> bool {
    match invoices.iter_mut().find(|inv| inv.id == id) {
        Some(inv) => {
            inv.reminders_sent.push(sent_at.to_string());
            true
        }
        None => false,
    }
}

/// Flips the matching invoice to `paid` after a successful `/pay` call.
pub fn mark_paid_locally(invoices: &mut [Invoice], id: &str) -> bool {
    match invoices.iter_mut().find(|inv| inv.id == id) {
        Some(inv) => {
            inv.status = InvoiceStatus::Paid;
            true
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    ManualReminder,
    BeforeDue,
    OnDue,
    AfterDue,
    #[serde(untagged)]
    Other(String),
}

impl ReminderKind {
    pub fn label(&self) -> String {
        match self {
            ReminderKind::ManualReminder => "Manual Reminder Sent".to_string(),
            ReminderKind::BeforeDue => "Upcoming Due Reminder".to_string(),
            ReminderKind::OnDue => "Due Today Reminder".to_string(),
            ReminderKind::AfterDue => "Overdue Reminder".to_string(),
            ReminderKind::Other(raw) => raw.replace('_', " "),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderLog {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub sent_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// `GET /invoice-reminder/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_unpaid: u64,
    pub overdue_amount: f64,
    pub paid_this_month: u64,
}
