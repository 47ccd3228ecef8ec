//! Pure lifecycle rules: TTL and batch clamping, the reminder schedule,
//! contact-info resolution, and item normalization.
//!
//! Everything here is synchronous and store-free so the engine's decision
//! logic can be tested without a database.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::record::CartItem;

// ─── Tunables ────────────────────────────────────────────────────────────────

pub const TTL_MIN_MINUTES: i64 = 5;
pub const TTL_MAX_MINUTES: i64 = 1440;
pub const DEFAULT_TTL_MINUTES: i64 = 30;

pub const SWEEP_BATCH_MIN: u32 = 25;
pub const SWEEP_BATCH_MAX: u32 = 100;
pub const DEFAULT_SWEEP_BATCH: u32 = 50;

/// Per-invocation cap on recovery candidates.
pub const RECOVERY_BATCH_LIMIT: u32 = 50;

pub const MAX_REMINDER_STAGE: u8 = 3;

/// Minutes since abandonment before stages 1, 2, 3 become due.
pub const REMINDER_SCHEDULE_MINUTES: [i64; 3] = [30, 120, 1440];

/// Minimum gap between two notifications to the same record. Prevents
/// stage collisions when the scheduler is invoked more frequently than the
/// stage intervals.
pub const MIN_NOTIFICATION_GAP_MINUTES: i64 = 60;

/// Clamp a caller-supplied TTL into the supported window.
pub fn clamp_ttl(minutes: i64) -> i64 {
  minutes.clamp(TTL_MIN_MINUTES, TTL_MAX_MINUTES)
}

/// Clamp a caller-supplied sweep batch size.
pub fn clamp_sweep_limit(limit: u32) -> u32 {
  limit.clamp(SWEEP_BATCH_MIN, SWEEP_BATCH_MAX)
}

// ─── Reminder schedule ───────────────────────────────────────────────────────

/// The next reminder stage that is due for a record, or `None` when the
/// record is either fully escalated or not yet due.
///
/// Stage N is due once `minutes_since_abandonment` reaches
/// `REMINDER_SCHEDULE_MINUTES[N - 1]`.
pub fn next_due_stage(
  reminder_stage: u8,
  minutes_since_abandonment: i64,
) -> Option<u8> {
  if reminder_stage >= MAX_REMINDER_STAGE {
    return None;
  }
  let target = reminder_stage + 1;
  let required = REMINDER_SCHEDULE_MINUTES[usize::from(target - 1)];
  (minutes_since_abandonment >= required).then_some(target)
}

/// Format a line for the append-only audit trail.
pub fn audit_note(now: DateTime<Utc>, message: &str) -> String {
  format!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S UTC"), message)
}

// ─── Contact resolution ──────────────────────────────────────────────────────

/// Contact fields supplied explicitly in an activity payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
  pub email: Option<String>,
  pub name:  Option<String>,
  pub phone: Option<String>,
}

impl ContactFields {
  /// True when no channel is present at all — an uncontactable cart.
  pub fn is_empty(&self) -> bool {
    fn blank(v: &Option<String>) -> bool {
      v.as_deref().is_none_or(|s| s.trim().is_empty())
    }
    blank(&self.email) && blank(&self.name) && blank(&self.phone)
  }
}

/// Profile of an authenticated user, as asserted by the external auth
/// layer.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
  pub id:    String,
  pub email: Option<String>,
  pub name:  Option<String>,
  pub phone: Option<String>,
}

/// Resolve contact info with explicit-over-profile precedence, per field.
pub fn resolve_contact(
  explicit: ContactFields,
  profile: Option<&UserProfile>,
) -> ContactFields {
  let Some(p) = profile else { return explicit };
  ContactFields {
    email: explicit.email.or_else(|| p.email.clone()),
    name:  explicit.name.or_else(|| p.name.clone()),
    phone: explicit.phone.or_else(|| p.phone.clone()),
  }
}

// ─── Item normalization ──────────────────────────────────────────────────────

/// A product identifier as sent by a loosely-typed client: a JSON number
/// or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductKey {
  Number(i64),
  Text(String),
}

impl ProductKey {
  /// The catalog's numeric key, if this identifier maps into it.
  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Self::Number(n) => Some(*n),
      Self::Text(s) => s.trim().parse().ok(),
    }
  }
}

/// One cart line as received on the wire, prior to normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCartItem {
  pub id:       ProductKey,
  #[serde(default)]
  pub quantity: i64,
}

/// Normalize wire items into the catalog's key space. Items with a
/// non-positive quantity or an identifier that does not resolve to a
/// positive numeric key are dropped silently.
pub fn normalize_items(raw: &[RawCartItem]) -> Vec<CartItem> {
  raw
    .iter()
    .filter_map(|item| {
      let product_id = item.id.as_i64().filter(|id| *id > 0)?;
      let quantity = u32::try_from(item.quantity).ok().filter(|q| *q > 0)?;
      Some(CartItem { product_id, quantity })
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ttl_is_clamped_to_window() {
    assert_eq!(clamp_ttl(0), TTL_MIN_MINUTES);
    assert_eq!(clamp_ttl(5), 5);
    assert_eq!(clamp_ttl(30), 30);
    assert_eq!(clamp_ttl(1440), 1440);
    assert_eq!(clamp_ttl(10_000), TTL_MAX_MINUTES);
  }

  #[test]
  fn sweep_limit_is_clamped() {
    assert_eq!(clamp_sweep_limit(1), SWEEP_BATCH_MIN);
    assert_eq!(clamp_sweep_limit(50), 50);
    assert_eq!(clamp_sweep_limit(500), SWEEP_BATCH_MAX);
  }

  #[test]
  fn stage_one_due_after_thirty_minutes() {
    assert_eq!(next_due_stage(0, 29), None);
    assert_eq!(next_due_stage(0, 30), Some(1));
    assert_eq!(next_due_stage(0, 35), Some(1));
  }

  #[test]
  fn later_stages_follow_the_schedule() {
    assert_eq!(next_due_stage(1, 119), None);
    assert_eq!(next_due_stage(1, 120), Some(2));
    assert_eq!(next_due_stage(2, 1439), None);
    assert_eq!(next_due_stage(2, 1440), Some(3));
  }

  #[test]
  fn fully_escalated_records_have_no_next_stage() {
    assert_eq!(next_due_stage(3, 100_000), None);
  }

  #[test]
  fn explicit_contact_wins_over_profile() {
    let profile = UserProfile {
      id:    "u1".into(),
      email: Some("profile@example.com".into()),
      name:  Some("Profile Name".into()),
      phone: None,
    };
    let resolved = resolve_contact(
      ContactFields {
        email: Some("explicit@example.com".into()),
        name:  None,
        phone: Some("555-0100".into()),
      },
      Some(&profile),
    );
    assert_eq!(resolved.email.as_deref(), Some("explicit@example.com"));
    assert_eq!(resolved.name.as_deref(), Some("Profile Name"));
    assert_eq!(resolved.phone.as_deref(), Some("555-0100"));
  }

  #[test]
  fn anonymous_without_fields_is_empty() {
    let resolved = resolve_contact(ContactFields::default(), None);
    assert!(resolved.is_empty());
  }

  #[test]
  fn whitespace_only_fields_count_as_empty() {
    let fields = ContactFields {
      email: Some("   ".into()),
      name:  None,
      phone: Some("".into()),
    };
    assert!(fields.is_empty());
  }

  #[test]
  fn normalization_accepts_numbers_and_numeric_strings() {
    let raw = vec![
      RawCartItem { id: ProductKey::Number(7), quantity: 2 },
      RawCartItem { id: ProductKey::Text("12".into()), quantity: 1 },
    ];
    let items = normalize_items(&raw);
    assert_eq!(items, vec![
      CartItem { product_id: 7, quantity: 2 },
      CartItem { product_id: 12, quantity: 1 },
    ]);
  }

  #[test]
  fn normalization_drops_bad_items_silently() {
    let raw = vec![
      RawCartItem { id: ProductKey::Text("not-a-number".into()), quantity: 1 },
      RawCartItem { id: ProductKey::Number(-3), quantity: 1 },
      RawCartItem { id: ProductKey::Number(4), quantity: 0 },
      RawCartItem { id: ProductKey::Number(4), quantity: -2 },
      RawCartItem { id: ProductKey::Number(9), quantity: 1 },
    ];
    let items = normalize_items(&raw);
    assert_eq!(items, vec![CartItem { product_id: 9, quantity: 1 }]);
  }
}
