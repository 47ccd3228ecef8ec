//! The `CartStore` trait.
//!
//! Implemented by storage backends (e.g. `trolley-store-sqlite`). The
//! engine and HTTP layers depend on this abstraction, not on any concrete
//! backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::record::{CartPatch, CartRecord, NewCartRecord, StatusCounts};

/// Abstraction over the tracking-record store.
///
/// The store enforces the one-open-record-per-session invariant: creating
/// a second non-recovered record for a session is a constraint violation,
/// not a silent duplicate.
pub trait CartStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create and persist a new tracking record. `cart_id` and `created_at`
  /// are assigned by the store.
  fn create(
    &self,
    input: NewCartRecord,
  ) -> impl Future<Output = Result<CartRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CartRecord>, Self::Error>> + Send + '_;

  /// The session's open record — the unique record with
  /// `status != recovered`, if one exists.
  fn find_open<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<Option<CartRecord>, Self::Error>> + Send + 'a;

  /// Merge `patch` into an existing record. Fields left `None` keep their
  /// stored value; `patch.note` is appended to the audit trail. Returns
  /// `None` if the record no longer exists.
  fn apply(
    &self,
    id: Uuid,
    patch: CartPatch,
  ) -> impl Future<Output = Result<Option<CartRecord>, Self::Error>> + Send + '_;

  /// Hard-delete a record. Returns `false` if nothing was deleted.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Active records whose last activity predates `cutoff`, oldest first,
  /// at most `limit` of them. The sweeper's selection query.
  fn stale_active(
    &self,
    cutoff: DateTime<Utc>,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<CartRecord>, Self::Error>> + Send + '_;

  /// How many records [`CartStore::stale_active`] would currently return,
  /// without the limit. Read-only observability companion.
  fn count_stale_active(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Abandoned records eligible for a recovery notification: nonempty
  /// email, `reminder_stage < 3`, and no notification sent at or after
  /// `sent_cutoff`. Oldest activity first, at most `limit`.
  fn recovery_candidates(
    &self,
    sent_cutoff: DateTime<Utc>,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<CartRecord>, Self::Error>> + Send + '_;

  /// Whether any terminal recovered record exists for the session. Used by
  /// the heartbeat monitor to distinguish "recovered" from "never
  /// tracked".
  fn has_recovered<'a>(
    &'a self,
    session_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Aggregate counts per status.
  fn status_counts(
    &self,
  ) -> impl Future<Output = Result<StatusCounts, Self::Error>> + Send + '_;
}
