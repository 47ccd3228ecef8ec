//! [`SqliteStore`] — the SQLite implementation of [`CartStore`] and
//! [`Catalog`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use trolley_core::{
  catalog::{Catalog, CatalogProduct},
  record::{CartPatch, CartRecord, CartStatus, NewCartRecord, StatusCounts},
  store::CartStore,
};

use crate::{
  encode::{
    CART_COLUMNS, encode_dt, encode_items, encode_status, encode_uuid,
    raw_from_row,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trolley cart store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert or update a row in the product read model. Used by catalog
  /// seeding and by tests.
  pub async fn upsert_product(&self, product: CatalogProduct) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products (product_id, name, price, image_url)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(product_id) DO UPDATE SET
             name = excluded.name,
             price = excluded.price,
             image_url = excluded.image_url",
          rusqlite::params![
            product.product_id,
            product.name,
            product.price,
            product.image_url,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_one(
    &self,
    where_clause: &'static str,
    param: String,
  ) -> Result<Option<CartRecord>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CART_COLUMNS} FROM carts WHERE {where_clause}"),
              rusqlite::params![param],
              raw_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(crate::encode::RawCart::into_record).transpose()
  }

  /// Run a bounded selection query binding `(?1 = cutoff, ?2 = limit)`.
  async fn select_batch(
    &self,
    sql: String,
    cutoff: String,
    limit: u32,
  ) -> Result<Vec<CartRecord>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![cutoff, i64::from(limit)], raw_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(crate::encode::RawCart::into_record)
      .collect()
  }
}

// ─── CartStore impl ──────────────────────────────────────────────────────────

impl CartStore for SqliteStore {
  type Error = Error;

  async fn create(&self, input: NewCartRecord) -> Result<CartRecord> {
    let record = CartRecord {
      cart_id:                Uuid::new_v4(),
      session_id:             input.session_id,
      user_id:                input.user_id,
      status:                 input.status,
      items:                  input.items,
      cart_total:             input.cart_total,
      customer_email:         input.customer_email,
      customer_name:          input.customer_name,
      customer_phone:         input.customer_phone,
      created_at:             Utc::now(),
      last_activity_at:       input.last_activity_at,
      reminder_stage:         0,
      recovery_email_sent_at: None,
      notes:                  input.note.unwrap_or_default(),
    };

    let cart_id_str    = encode_uuid(record.cart_id);
    let session_id     = record.session_id.clone();
    let user_id        = record.user_id.clone();
    let status_str     = encode_status(record.status).to_owned();
    let items_str      = encode_items(&record.items)?;
    let cart_total     = record.cart_total;
    let email          = record.customer_email.clone();
    let name           = record.customer_name.clone();
    let phone          = record.customer_phone.clone();
    let created_str    = encode_dt(record.created_at);
    let activity_str   = encode_dt(record.last_activity_at);
    let notes          = record.notes.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO carts (
             cart_id, session_id, user_id, status, items, cart_total,
             customer_email, customer_name, customer_phone,
             created_at, last_activity_at, reminder_stage,
             recovery_email_sent_at, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0, NULL, ?12)",
          rusqlite::params![
            cart_id_str,
            session_id,
            user_id,
            status_str,
            items_str,
            cart_total,
            email,
            name,
            phone,
            created_str,
            activity_str,
            notes,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn get(&self, id: Uuid) -> Result<Option<CartRecord>> {
    self.select_one("cart_id = ?1", encode_uuid(id)).await
  }

  async fn find_open(&self, session_id: &str) -> Result<Option<CartRecord>> {
    self
      .select_one(
        "session_id = ?1 AND status != 'recovered'",
        session_id.to_owned(),
      )
      .await
  }

  async fn apply(&self, id: Uuid, patch: CartPatch) -> Result<Option<CartRecord>> {
    let Some(existing) = self.get(id).await? else {
      return Ok(None);
    };

    let mut merged = existing;
    if let Some(status) = patch.status {
      merged.status = status;
    }
    if let Some(items) = patch.items {
      merged.items = items;
    }
    if let Some(total) = patch.cart_total {
      merged.cart_total = total;
    }
    if let Some(user_id) = patch.user_id {
      merged.user_id = Some(user_id);
    }
    if let Some(email) = patch.customer_email {
      merged.customer_email = Some(email);
    }
    if let Some(name) = patch.customer_name {
      merged.customer_name = Some(name);
    }
    if let Some(phone) = patch.customer_phone {
      merged.customer_phone = Some(phone);
    }
    if let Some(at) = patch.last_activity_at {
      merged.last_activity_at = at;
    }
    if let Some(stage) = patch.reminder_stage {
      merged.reminder_stage = stage;
    }
    if let Some(sent_at) = patch.recovery_email_sent_at {
      merged.recovery_email_sent_at = Some(sent_at);
    }
    if let Some(note) = patch.note {
      if merged.notes.is_empty() {
        merged.notes = note;
      } else {
        merged.notes.push('\n');
        merged.notes.push_str(&note);
      }
    }

    let cart_id_str  = encode_uuid(merged.cart_id);
    let status_str   = encode_status(merged.status).to_owned();
    let items_str    = encode_items(&merged.items)?;
    let cart_total   = merged.cart_total;
    let user_id      = merged.user_id.clone();
    let email        = merged.customer_email.clone();
    let name         = merged.customer_name.clone();
    let phone        = merged.customer_phone.clone();
    let activity_str = encode_dt(merged.last_activity_at);
    let stage        = i64::from(merged.reminder_stage);
    let sent_str     = merged.recovery_email_sent_at.map(encode_dt);
    let notes        = merged.notes.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE carts SET
             status = ?2, items = ?3, cart_total = ?4, user_id = ?5,
             customer_email = ?6, customer_name = ?7, customer_phone = ?8,
             last_activity_at = ?9, reminder_stage = ?10,
             recovery_email_sent_at = ?11, notes = ?12
           WHERE cart_id = ?1",
          rusqlite::params![
            cart_id_str,
            status_str,
            items_str,
            cart_total,
            user_id,
            email,
            name,
            phone,
            activity_str,
            stage,
            sent_str,
            notes,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    Ok(Some(merged))
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM carts WHERE cart_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn stale_active(
    &self,
    cutoff: DateTime<Utc>,
    limit: u32,
  ) -> Result<Vec<CartRecord>> {
    self
      .select_batch(
        format!(
          "SELECT {CART_COLUMNS} FROM carts
           WHERE status = 'active' AND last_activity_at < ?1
           ORDER BY last_activity_at ASC
           LIMIT ?2"
        ),
        encode_dt(cutoff),
        limit,
      )
      .await
  }

  async fn count_stale_active(&self, cutoff: DateTime<Utc>) -> Result<u64> {
    let cutoff_str = encode_dt(cutoff);
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM carts
           WHERE status = 'active' AND last_activity_at < ?1",
          rusqlite::params![cutoff_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  async fn recovery_candidates(
    &self,
    sent_cutoff: DateTime<Utc>,
    limit: u32,
  ) -> Result<Vec<CartRecord>> {
    self
      .select_batch(
        format!(
          "SELECT {CART_COLUMNS} FROM carts
           WHERE status = 'abandoned'
             AND customer_email IS NOT NULL
             AND TRIM(customer_email) != ''
             AND reminder_stage < 3
             AND (recovery_email_sent_at IS NULL OR recovery_email_sent_at < ?1)
           ORDER BY last_activity_at ASC
           LIMIT ?2"
        ),
        encode_dt(sent_cutoff),
        limit,
      )
      .await
  }

  async fn has_recovered(&self, session_id: &str) -> Result<bool> {
    let session = session_id.to_owned();
    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM carts
               WHERE session_id = ?1 AND status = 'recovered'
               LIMIT 1",
              rusqlite::params![session],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn status_counts(&self) -> Result<StatusCounts> {
    let rows: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT status, COUNT(*) FROM carts GROUP BY status")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut counts = StatusCounts::default();
    for (status, n) in rows {
      let n = n.max(0) as u64;
      match crate::encode::decode_status(&status)? {
        CartStatus::Active => counts.active = n,
        CartStatus::Abandoned => counts.abandoned = n,
        CartStatus::Recovered => counts.recovered = n,
      }
    }
    Ok(counts)
  }
}

// ─── Catalog impl ────────────────────────────────────────────────────────────

impl Catalog for SqliteStore {
  type Error = Error;

  async fn resolve(&self, ids: &[i64]) -> Result<Vec<CatalogProduct>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let ids = ids.to_vec();
    let products = self
      .conn
      .call(move |conn| {
        let placeholders = (1..=ids.len())
          .map(|i| format!("?{i}"))
          .collect::<Vec<_>>()
          .join(", ");
        let sql = format!(
          "SELECT product_id, name, price, image_url FROM products
           WHERE product_id IN ({placeholders})"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), |row| {
            Ok(CatalogProduct {
              product_id: row.get(0)?,
              name:       row.get(1)?,
              price:      row.get(2)?,
              image_url:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(products)
  }
}
