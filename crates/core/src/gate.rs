//! Usage gating: decides whether a guarded action may proceed
//!
//! Decisions are pure: no navigation, no rendering, no network. A missing
//! entitlement never turns into `Allowed`.

use crate::channels::{check_channel, Channel, ChannelError};
use crate::entitlement::EntitlementView;
use serde::Serialize;
use std::fmt;

/// Actions the UI guards behind entitlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedAction {
    CreateInvoice,
    /// Enabling a reminder channel on an invoice with the given phone number.
    EnableChannel {
        channel: Channel,
        client_phone: Option<String>,
    },
}

impl fmt::Display for GuardedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardedAction::CreateInvoice => write!(f, "create invoice"),
            GuardedAction::EnableChannel { channel, .. } => write!(f, "enable {} reminders", channel),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockReason {
    LimitReached,
    ProRequired,
    PhoneRequired,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::LimitReached => write!(f, "LIMIT_REACHED"),
            BlockReason::ProRequired => write!(f, "PRO_REQUIRED"),
            BlockReason::PhoneRequired => write!(f, "PHONE_REQUIRED"),
        }
    }
}

/// What the caller needs to render an upgrade call-to-action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradePrompt {
    pub reason: BlockReason,
    pub used: u32,
    pub limit: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// No snapshot yet (or the last fetch failed). Callers show a loading
    /// state and wait; this is never treated as permission.
    Pending,
    Allowed,
    Blocked(UpgradePrompt),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            GateDecision::Blocked(prompt) => Some(prompt.reason),
            _ => None,
        }
    }

    /// `Ok` only for `Allowed`.
    pub fn into_result(self) -> Result<(), GateError> {
        match self {
            GateDecision::Allowed => Ok(()),
            GateDecision::Pending => Err(GateError::Pending),
            GateDecision::Blocked(prompt) => Err(GateError::Blocked(prompt)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("Subscription status is still loading")]
    Pending,
    #[error("{}", .0.message)]
    Blocked(UpgradePrompt),
}

/// Gating rule for a guarded action against the current entitlement.
pub fn decide(action: &GuardedAction, entitlement: Option<&EntitlementView>) -> GateDecision {
    let Some(view) = entitlement else {
        return GateDecision::Pending;
    };
    match action {
        GuardedAction::CreateInvoice => can_create_invoice(view),
        GuardedAction::EnableChannel {
            channel,
            client_phone,
        } => match check_channel(*channel, Some(view), client_phone.as_deref()) {
            Ok(()) => GateDecision::Allowed,
            Err(ChannelError::PhoneRequired(c)) => GateDecision::Blocked(UpgradePrompt {
                reason: BlockReason::PhoneRequired,
                used: view.invoices_used,
                limit: view.invoice_limit,
                message: format!("Add a client phone number to send {} reminders.", c),
            }),
            Err(_) => GateDecision::Blocked(prompt(view, BlockReason::ProRequired)),
        },
    }
}

fn can_create_invoice(view: &EntitlementView) -> GateDecision {
    if view.is_pro || view.unlimited || view.invoices_remaining > 0 {
        GateDecision::Allowed
    } else {
        GateDecision::Blocked(prompt(view, BlockReason::LimitReached))
    }
}

/// Builds the upgrade prompt for a block, preferring the server's wording.
pub fn prompt(view: &EntitlementView, reason: BlockReason) -> UpgradePrompt {
    let message = match (&view.upgrade_reason, reason) {
        (Some(server), BlockReason::LimitReached) if !server.trim().is_empty() => server.clone(),
        (_, BlockReason::LimitReached) => format!(
            "You've used {} of {} invoices on the {} plan. Upgrade to Pro for unlimited invoices.",
            view.invoices_used, view.invoice_limit, view.plan
        ),
        (_, BlockReason::ProRequired) => {
            "SMS and WhatsApp reminders are available on the Pro plan.".to_string()
        }
        (_, BlockReason::PhoneRequired) => "A client phone number is required.".to_string(),
    };
    UpgradePrompt {
        reason,
        used: view.invoices_used,
        limit: view.invoice_limit,
        message,
    }
}
