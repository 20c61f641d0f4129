//! Decision events recorded by the surrounding application.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CatalogItemId, DecisionEventId, ProfileId, Timestamp};

/// What the user did with an item. Closed set: unknown actions cannot be
/// represented and are rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionAction {
    /// Explicit "this is me".
    Aligned,
    /// Explicit rejection.
    #[serde(alias = "not_for_me")]
    NotForMe,
    /// Purchase; the strongest positive signal.
    Bought,
}

impl DecisionAction {
    pub fn all() -> &'static [DecisionAction] {
        &[
            DecisionAction::Aligned,
            DecisionAction::NotForMe,
            DecisionAction::Bought,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Aligned => "aligned",
            DecisionAction::NotForMe => "notForMe",
            DecisionAction::Bought => "bought",
        }
    }
}

impl fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one user decision against a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEvent {
    // log files written by hand may omit ids
    #[serde(default)]
    id: DecisionEventId,
    profile_id: ProfileId,
    item_id: CatalogItemId,
    action: DecisionAction,
    occurred_at: Timestamp,
}

impl DecisionEvent {
    pub fn new(
        profile_id: ProfileId,
        item_id: CatalogItemId,
        action: DecisionAction,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            id: DecisionEventId::new(),
            profile_id,
            item_id,
            action,
            occurred_at,
        }
    }

    pub fn id(&self) -> DecisionEventId {
        self.id
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile_id
    }

    pub fn item_id(&self) -> &CatalogItemId {
        &self.item_id
    }

    pub fn action(&self) -> DecisionAction {
        self.action
    }

    pub fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }
}

/// Stable sort by timestamp; events with equal timestamps keep log order.
pub fn sort_chronologically(events: &mut [DecisionEvent]) {
    events.sort_by_key(|e| e.occurred_at);
}
