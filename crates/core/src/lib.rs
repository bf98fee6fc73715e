//! ZeeRemind Core - subscription entitlement and usage gating
//!
//! This crate is pure: no network, no filesystem, no clock.
//! - Subscription snapshot model as served by the backend
//! - Entitlement evaluation (plan/status flags, remaining quota)
//! - Gating decisions for guarded actions (invoice creation, premium channels)
//! - Invoice list helpers and display formatting

pub mod channels;
pub mod entitlement;
pub mod format;
pub mod gate;
pub mod invoice;
pub mod snapshot;

pub use channels::{Channel, ChannelError, ReminderChannels};
pub use entitlement::{evaluate, EntitlementView};
pub use format::{format_price, format_usage};
pub use gate::{decide, BlockReason, GateDecision, GateError, GuardedAction, UpgradePrompt};
pub use invoice::{
    DashboardStats, Invoice, InvoiceFilter, InvoiceStatus, NewInvoice, ReminderKind, ReminderLog,
};
pub use snapshot::{
    Billing, BillingCycle, Feature, Features, Plan, SubscriptionSnapshot, SubscriptionStatus,
    Trial, Usage,
};

/// ZeeRemind version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
