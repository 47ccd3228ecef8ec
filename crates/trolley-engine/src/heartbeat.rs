//! Liveness pings from an open storefront tab.
//!
//! A heartbeat refreshes the activity timestamp of an active record. It
//! never creates records; only the recorder does that. Heartbeats arriving
//! after the sweeper has already fired are expected (client and sweeper
//! run independently) and must not error.

use chrono::{DateTime, Utc};
use trolley_core::{
  Error, Result,
  lifecycle::audit_note,
  record::{CartPatch, CartStatus},
  store::CartStore,
};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
  Refreshed {
    id:               Uuid,
    last_activity_at: DateTime<Utc>,
  },
  /// The sweeper got there first. Idempotent success, no mutation.
  AlreadyAbandoned { id: Uuid },
}

pub async fn heartbeat<S: CartStore>(
  store: &S,
  now: DateTime<Utc>,
  session_id: &str,
) -> Result<HeartbeatOutcome> {
  if session_id.trim().is_empty() {
    return Err(Error::InvalidInput("sessionId is required".to_owned()));
  }

  let Some(record) = store.find_open(session_id).await.map_err(Error::store)?
  else {
    // Distinguish a terminally recovered cart from one that was never
    // tracked.
    if store.has_recovered(session_id).await.map_err(Error::store)? {
      return Err(Error::NotActive);
    }
    return Err(Error::NotFound);
  };

  match record.status {
    CartStatus::Active => {
      let patch = CartPatch {
        last_activity_at: Some(now),
        // Written explicitly: if the sweeper flipped this record between
        // our read and this write, the heartbeat wins and the record
        // stays active.
        status: Some(CartStatus::Active),
        note: Some(audit_note(now, "heartbeat")),
        ..Default::default()
      };
      match store.apply(record.cart_id, patch).await.map_err(Error::store)? {
        Some(updated) => Ok(HeartbeatOutcome::Refreshed {
          id:               updated.cart_id,
          last_activity_at: updated.last_activity_at,
        }),
        None => Err(Error::NotFound),
      }
    }
    CartStatus::Abandoned => {
      Ok(HeartbeatOutcome::AlreadyAbandoned { id: record.cart_id })
    }
    CartStatus::Recovered => Err(Error::NotActive),
  }
}
