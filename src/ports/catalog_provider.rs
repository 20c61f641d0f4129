//! CatalogProvider port - read-only access to candidate items.

use async_trait::async_trait;

use crate::domain::foundation::{CatalogItemId, DomainError};
use crate::domain::taste::{CatalogItem, TasteDomain};

/// Port for looking up catalog items by domain.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// All items of a domain, in a stable order.
    async fn items(&self, domain: TasteDomain) -> Result<Vec<CatalogItem>, DomainError>;

    /// A single item, or `None` if the domain has no such item.
    async fn item(
        &self,
        domain: TasteDomain,
        item_id: &CatalogItemId,
    ) -> Result<Option<CatalogItem>, DomainError>;
}
