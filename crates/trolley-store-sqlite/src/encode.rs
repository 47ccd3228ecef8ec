//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings (UTC offset is always
//! `+00:00`, so SQL string comparison orders them correctly). Items are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use trolley_core::record::{CartItem, CartRecord, CartStatus};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CartStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: CartStatus) -> &'static str {
  match s {
    CartStatus::Active => "active",
    CartStatus::Abandoned => "abandoned",
    CartStatus::Recovered => "recovered",
  }
}

pub fn decode_status(s: &str) -> Result<CartStatus> {
  match s {
    "active" => Ok(CartStatus::Active),
    "abandoned" => Ok(CartStatus::Abandoned),
    "recovered" => Ok(CartStatus::Recovered),
    other => Err(Error::Decode(format!("unknown cart status: {other:?}"))),
  }
}

// ─── Items ───────────────────────────────────────────────────────────────────

pub fn encode_items(items: &[CartItem]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_items(s: &str) -> Result<Vec<CartItem>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw column values read directly from a `carts` row.
pub struct RawCart {
  pub cart_id:                String,
  pub session_id:             String,
  pub user_id:                Option<String>,
  pub status:                 String,
  pub items:                  String,
  pub cart_total:             f64,
  pub customer_email:         Option<String>,
  pub customer_name:          Option<String>,
  pub customer_phone:         Option<String>,
  pub created_at:             String,
  pub last_activity_at:       String,
  pub reminder_stage:         i64,
  pub recovery_email_sent_at: Option<String>,
  pub notes:                  String,
}

impl RawCart {
  pub fn into_record(self) -> Result<CartRecord> {
    let reminder_stage = u8::try_from(self.reminder_stage)
      .map_err(|_| Error::Decode(format!("reminder stage out of range: {}", self.reminder_stage)))?;

    Ok(CartRecord {
      cart_id: decode_uuid(&self.cart_id)?,
      session_id: self.session_id,
      user_id: self.user_id,
      status: decode_status(&self.status)?,
      items: decode_items(&self.items)?,
      cart_total: self.cart_total,
      customer_email: self.customer_email,
      customer_name: self.customer_name,
      customer_phone: self.customer_phone,
      created_at: decode_dt(&self.created_at)?,
      last_activity_at: decode_dt(&self.last_activity_at)?,
      reminder_stage,
      recovery_email_sent_at: self
        .recovery_email_sent_at
        .as_deref()
        .map(decode_dt)
        .transpose()?,
      notes: self.notes,
    })
  }
}

/// The shared column list and row mapper for `SELECT`s over `carts`.
pub const CART_COLUMNS: &str = "cart_id, session_id, user_id, status, items, cart_total, \
   customer_email, customer_name, customer_phone, created_at, \
   last_activity_at, reminder_stage, recovery_email_sent_at, notes";

pub fn raw_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCart> {
  Ok(RawCart {
    cart_id:                row.get(0)?,
    session_id:             row.get(1)?,
    user_id:                row.get(2)?,
    status:                 row.get(3)?,
    items:                  row.get(4)?,
    cart_total:             row.get(5)?,
    customer_email:         row.get(6)?,
    customer_name:          row.get(7)?,
    customer_phone:         row.get(8)?,
    created_at:             row.get(9)?,
    last_activity_at:       row.get(10)?,
    reminder_stage:         row.get(11)?,
    recovery_email_sent_at: row.get(12)?,
    notes:                  row.get(13)?,
  })
}
