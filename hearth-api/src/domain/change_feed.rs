//! In-process change notification.
//!
//! Every committed mutation publishes a [`ChangeEvent`]; subscribers (the
//! WebSocket route) forward events to clients, which respond by reloading
//! the affected member's data. Events carry no payload beyond the resource
//! and member: a newer reload supersedes an older one, so a lagged
//! subscriber loses nothing it would not refetch anyway.

use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;

use super::models::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChangeResource {
    Tasks,
    Ledger,
    Schedule,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub resource: ChangeResource,
    /// `None` for family-wide changes (e.g. a spawn run).
    pub member_id: Option<MemberId>,
}

impl ChangeEvent {
    pub fn tasks(member_id: MemberId) -> Self {
        Self {
            resource: ChangeResource::Tasks,
            member_id: Some(member_id),
        }
    }

    pub fn ledger(member_id: MemberId) -> Self {
        Self {
            resource: ChangeResource::Ledger,
            member_id: Some(member_id),
        }
    }

    pub fn family_wide(resource: ChangeResource) -> Self {
        Self {
            resource,
            member_id: None,
        }
    }

    /// Whether a subscriber filtered to `member` should see this event.
    pub fn concerns(&self, member: Option<MemberId>) -> bool {
        match (self.member_id, member) {
            (_, None) | (None, _) => true,
            (Some(event_member), Some(filter)) => event_member == filter,
        }
    }
}

#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Fire-and-forget: an event with no live subscribers is dropped, and
    /// publishing never blocks or fails the write path.
    pub fn publish(&self, event: ChangeEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("change event dropped, no subscribers: {:?}", event);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}
