//! The `Catalog` collaborator trait.
//!
//! The product catalog is owned by the storefront, not by this engine; the
//! recovery scheduler only needs to join stored item references against it
//! to rebuild a displayable line-item list.

use std::{collections::HashMap, convert::Infallible, future::Future};

use serde::{Deserialize, Serialize};

/// Display data for one catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
  pub product_id: i64,
  pub name:       String,
  pub price:      f64,
  pub image_url:  Option<String>,
}

/// Read-only lookup into the product catalog.
pub trait Catalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve the given keys to display data. Unknown keys are simply
  /// absent from the result; they are not an error.
  fn resolve<'a>(
    &'a self,
    ids: &'a [i64],
  ) -> impl Future<Output = Result<Vec<CatalogProduct>, Self::Error>> + Send + 'a;
}

/// An in-memory catalog over a fixed product set — useful for tests and
/// for small config-seeded deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
  products: HashMap<i64, CatalogProduct>,
}

impl StaticCatalog {
  pub fn new(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
    Self {
      products: products
        .into_iter()
        .map(|p| (p.product_id, p))
        .collect(),
    }
  }
}

impl Catalog for StaticCatalog {
  type Error = Infallible;

  async fn resolve(&self, ids: &[i64]) -> Result<Vec<CatalogProduct>, Infallible> {
    Ok(
      ids
        .iter()
        .filter_map(|id| self.products.get(id).cloned())
        .collect(),
    )
  }
}
