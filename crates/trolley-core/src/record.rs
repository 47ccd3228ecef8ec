//! The cart tracking record — one row per live shopping session.
//!
//! A record is created on the first qualifying activity signal and mutated
//! by activity signals, heartbeats, the sweeper, and the scheduler. Carts
//! that empty out, or that carry no resolvable contact information, are
//! deleted rather than persisted. `Recovered` is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a tracking record.
///
/// `Active → Abandoned → Recovered`, with no reverse edge. A fresh activity
/// write can still revive an abandoned record by writing `Active` through
/// the recorder; that is a business rule, not a sweeper edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
  Active,
  Abandoned,
  Recovered,
}

/// A single line in a tracked cart. Quantity is always positive; items that
/// fail normalization never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  /// Catalog key, in the catalog's numeric key space.
  pub product_id: i64,
  pub quantity:   u32,
}

/// The persisted tracking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
  pub cart_id:    Uuid,
  /// Opaque, cookie-carried session key. Unique among non-recovered
  /// records.
  pub session_id: String,
  /// Authenticated identity, when the session belongs to a signed-in user.
  pub user_id:    Option<String>,
  pub status:     CartStatus,
  pub items:      Vec<CartItem>,
  /// Snapshot of cart value at last update; never negative.
  pub cart_total: f64,

  pub customer_email: Option<String>,
  pub customer_name:  Option<String>,
  pub customer_phone: Option<String>,

  /// Store-assigned at creation; never changes.
  pub created_at:       DateTime<Utc>,
  /// Advanced on every recorder/heartbeat write while the record is
  /// active.
  pub last_activity_at: DateTime<Utc>,

  /// Which escalation-level notification has been sent, `0..=3`.
  pub reminder_stage:         u8,
  pub recovery_email_sent_at: Option<DateTime<Utc>>,

  /// Append-only audit trail, one `[timestamp] message` line per entry.
  pub notes: String,
}

impl CartRecord {
  /// Whole minutes elapsed since the last recorded activity.
  pub fn minutes_since_activity(&self, now: DateTime<Utc>) -> i64 {
    (now - self.last_activity_at).num_minutes()
  }

  /// A nonempty email is the only channel the recovery scheduler can use.
  pub fn has_recovery_email(&self) -> bool {
    self
      .customer_email
      .as_deref()
      .is_some_and(|e| !e.trim().is_empty())
  }
}

/// Input to [`crate::store::CartStore::create`].
/// `cart_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewCartRecord {
  pub session_id:       String,
  pub user_id:          Option<String>,
  pub status:           CartStatus,
  pub items:            Vec<CartItem>,
  pub cart_total:       f64,
  pub customer_email:   Option<String>,
  pub customer_name:    Option<String>,
  pub customer_phone:   Option<String>,
  pub last_activity_at: DateTime<Utc>,
  /// Initial audit line, already timestamp-formatted.
  pub note:             Option<String>,
}

/// Partial update applied by [`crate::store::CartStore::apply`].
///
/// Only fields that are `Some` are written; everything else keeps its
/// stored value. `note` is appended to the audit trail, never overwritten.
#[derive(Debug, Clone, Default)]
pub struct CartPatch {
  pub status:           Option<CartStatus>,
  pub items:            Option<Vec<CartItem>>,
  pub cart_total:       Option<f64>,
  pub user_id:          Option<String>,
  pub customer_email:   Option<String>,
  pub customer_name:    Option<String>,
  pub customer_phone:   Option<String>,
  pub last_activity_at: Option<DateTime<Utc>>,
  pub reminder_stage:   Option<u8>,
  pub recovery_email_sent_at: Option<DateTime<Utc>>,
  pub note:             Option<String>,
}

/// Aggregate record counts, reported by the sweep-status endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
  pub active:    u64,
  pub abandoned: u64,
  pub recovered: u64,
}
