//! Usage-gated actions against the backend
//!
//! [`UsageGate`] owns the held subscription snapshot and wraps every
//! action whose outcome depends on it. Decisions come from
//! `zeeremind_core::gate`; this layer adds the network calls and the
//! refresh-after-change rule.
//!
//! While the snapshot is unknown (not loaded yet, or the last fetch failed)
//! guarded actions are held back with `Pending`, never let through.

use crate::api::{invoices, payment, ApiClient, RequestError};
use crate::snapshot::{fetch_snapshot, SnapshotCell, SnapshotState};
use std::sync::Arc;
use tracing::{info, warn};
use zeeremind_core::gate::prompt;
use zeeremind_core::invoice::record_reminder_sent;
use zeeremind_core::{
    decide, BlockReason, Channel, ChannelError, EntitlementView, GateDecision, GuardedAction,
    Invoice, NewInvoice, ReminderChannels, SubscriptionSnapshot, UpgradePrompt,
};

#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    Created {
        invoice: Invoice,
        /// Premium channels stripped before sending.
        dropped_channels: Vec<Channel>,
    },
    Blocked(UpgradePrompt),
    /// Entitlement still unknown; nothing was sent.
    Pending,
}

pub struct UsageGate {
    client: Arc<ApiClient>,
    cell: SnapshotCell,
}

impl UsageGate {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            cell: SnapshotCell::new(),
        }
    }

    pub fn state(&self) -> SnapshotState {
        self.cell.state()
    }

    pub fn entitlement(&self) -> Option<EntitlementView> {
        self.cell.entitlement()
    }

    /// Fetches a fresh snapshot and replaces the held one.
    ///
    /// On failure the held snapshot is dropped: auth failures reset to
    /// `Unknown`, anything else to `Failed`.
    pub fn refresh(&self) -> Result<Arc<SubscriptionSnapshot>, RequestError> {
        match fetch_snapshot(&self.client) {
            Ok(snapshot) => Ok(self.cell.replace(snapshot)),
            Err(err) => {
                self.note_failure(&err);
                Err(err)
            }
        }
    }

    /// Decision against whatever is held right now; no network.
    pub fn check(&self, action: &GuardedAction) -> GateDecision {
        decide(action, self.entitlement().as_ref())
    }

    /// Loads the snapshot if none is held, then decides. A failed load is
    /// returned as the error, distinct from a `Blocked` decision.
    pub fn wait_and_check(&self, action: &GuardedAction) -> Result<GateDecision, RequestError> {
        if !self.cell.state().is_loaded() {
            self.refresh()?;
        }
        Ok(self.check(action))
    }

    /// Gated invoice creation.
    ///
    /// Premium channels the caller may not use are stripped first. After
    /// the POST (success or `LIMIT_REACHED`) the snapshot is re-fetched.
    pub fn create_invoice(&self, draft: &NewInvoice) -> Result<CreateOutcome, RequestError> {
        let view = match self.check(&GuardedAction::CreateInvoice) {
            GateDecision::Pending => return Ok(CreateOutcome::Pending),
            GateDecision::Blocked(prompt) => return Ok(CreateOutcome::Blocked(prompt)),
            GateDecision::Allowed => self.entitlement(),
        };

        let mut draft = draft.clone();
        let dropped_channels = draft
            .reminder_channels
            .sanitize(view.as_ref(), draft.client_phone.as_deref());

        match invoices::create(&self.client, &draft) {
            Ok(invoice) => {
                info!(id = %invoice.id, "invoice created");
                self.refresh_after_change();
                Ok(CreateOutcome::Created {
                    invoice,
                    dropped_channels,
                })
            }
            Err(err) if err.is_limit_reached() => {
                self.refresh_after_change();
                Ok(CreateOutcome::Blocked(self.limit_prompt(&err)))
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Updates an invoice. The count is unchanged, so no refresh.
    ///
    /// Premium channels are only stripped against a loaded plan. With the
    /// plan unknown, a draft carrying SMS or WhatsApp is refused before
    /// anything is sent, so stored channels are never lost to an outage.
    pub fn update_invoice(&self, id: &str, draft: &NewInvoice) -> Result<Invoice, RequestError> {
        let mut draft = draft.clone();
        match self.entitlement() {
            Some(view) => {
                let dropped = draft
                    .reminder_channels
                    .sanitize(Some(&view), draft.client_phone.as_deref());
                if !dropped.is_empty() {
                    warn!(?dropped, "premium channels removed before update");
                }
            }
            None if draft.reminder_channels.iter().any(|c| c.is_premium()) => {
                return Err(RequestError::Invalid(
                    ChannelError::EntitlementUnknown.to_string(),
                ));
            }
            None => {}
        }
        invoices::update(&self.client, id, &draft).map_err(|e| self.fail(e))
    }

    pub fn delete_invoice(&self, id: &str) -> Result<(), RequestError> {
        invoices::delete(&self.client, id).map_err(|e| self.fail(e))?;
        self.refresh_after_change();
        Ok(())
    }

    pub fn cancel_subscription(&self) -> Result<(), RequestError> {
        payment::cancel(&self.client).map_err(|e| self.fail(e))?;
        self.refresh_after_change();
        Ok(())
    }

    /// Sends a reminder and bumps the list's counter locally. The counter
    /// gates nothing, so the snapshot is left alone.
    pub fn send_reminder(&self, list: &mut [Invoice], id: &str) -> Result<(), RequestError> {
        invoices::send_reminder(&self.client, id).map_err(|e| self.fail(e))?;
        record_reminder_sent(list, id, &chrono::Utc::now().to_rfc3339());
        Ok(())
    }

    /// Local channel toggle; never touches the network.
    pub fn toggle_channel(
        &self,
        channels: &mut ReminderChannels,
        channel: Channel,
        client_phone: Option<&str>,
    ) -> Result<(), ChannelError> {
        channels.toggle(channel, self.entitlement().as_ref(), client_phone)
    }

    /// Drops the held snapshot (logout).
    pub fn forget(&self) {
        self.cell.clear();
    }

    fn refresh_after_change(&self) {
        if let Err(e) = self.refresh() {
            warn!(error = %e, "could not refresh subscription after change");
        }
    }

    fn limit_prompt(&self, err: &RequestError) -> UpgradePrompt {
        match self.entitlement() {
            Some(view) => prompt(&view, BlockReason::LimitReached),
            None => UpgradePrompt {
                reason: BlockReason::LimitReached,
                used: 0,
                limit: 0,
                message: err.to_string(),
            },
        }
    }

    fn note_failure(&self, err: &RequestError) {
        if err.is_auth() {
            self.cell.clear();
        } else {
            self.cell.mark_failed(err.to_string());
        }
    }

    /// Passes `err` through, discarding the snapshot if the session is gone.
    fn fail(&self, err: RequestError) -> RequestError {
        if err.is_auth() {
            self.cell.clear();
        }
        err
    }
}
