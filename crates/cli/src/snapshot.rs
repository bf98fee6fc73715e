//! Subscription snapshot fetching and the process-wide held snapshot

use crate::api::{subscription, ApiClient, RequestError};
use std::sync::{Arc, RwLock};
use tracing::info;
use zeeremind_core::{evaluate, EntitlementView, SubscriptionSnapshot};

/// Full round-trip to `GET /subscription/status` with the stored token.
pub fn fetch_snapshot(client: &ApiClient) -> Result<SubscriptionSnapshot, RequestError> {
    let token = client.session_token()?;
    fetch_snapshot_with(client, &token)
}

/// Same as [`fetch_snapshot`] with an explicit token.
pub fn fetch_snapshot_with(
    client: &ApiClient,
    token: &str,
) -> Result<SubscriptionSnapshot, RequestError> {
    subscription::status_with(client, token)
}

#[derive(Debug, Clone, Default)]
pub enum SnapshotState {
    /// Nothing fetched yet, or discarded on logout/401.
    #[default]
    Unknown,
    Loaded(Arc<SubscriptionSnapshot>),
    /// The last fetch failed. Gates the same as `Unknown`.
    Failed(String),
}

impl SnapshotState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SnapshotState::Loaded(_))
    }
}

/// Holds the current snapshot. Writes replace it wholesale, so concurrent
/// refreshes need no coordination: the last one to finish wins.
#[derive(Debug, Default)]
pub struct SnapshotCell {
    state: RwLock<SnapshotState>,
}

impl SnapshotCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SnapshotState {
        self.state
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn snapshot(&self) -> Option<Arc<SubscriptionSnapshot>> {
        match self.state() {
            SnapshotState::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// Recomputed from the held snapshot on every call.
    pub fn entitlement(&self) -> Option<EntitlementView> {
        self.snapshot().map(|s| evaluate(&s))
    }

    pub fn replace(&self, snapshot: SubscriptionSnapshot) -> Arc<SubscriptionSnapshot> {
        let snapshot = Arc::new(snapshot);
        info!(
            plan = %snapshot.plan,
            status = %snapshot.status,
            used = snapshot.usage.used,
            limit = snapshot.usage.limit,
            "subscription snapshot replaced"
        );
        self.set(SnapshotState::Loaded(Arc::clone(&snapshot)));
        snapshot
    }

    pub fn mark_failed(&self, reason: impl Into<String>) {
        self.set(SnapshotState::Failed(reason.into()));
    }

    pub fn clear(&self) {
        self.set(SnapshotState::Unknown);
    }

    fn set(&self, state: SnapshotState) {
        *self.state.write().unwrap_or_else(|p| p.into_inner()) = state;
    }
}
