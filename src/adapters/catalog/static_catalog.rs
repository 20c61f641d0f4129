//! Static catalog loaded once into memory.
//!
//! Items come either from code (tests, demos) or from a JSON or YAML file
//! holding a list of items. The format is picked from the file extension.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::foundation::{CatalogItemId, DomainError, ErrorCode};
use crate::domain::taste::{CatalogItem, TasteDomain};
use crate::ports::CatalogProvider;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    items: Vec<CatalogItem>,
}

/// Immutable in-memory catalog keyed by domain and item id.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    items: BTreeMap<TasteDomain, BTreeMap<CatalogItemId, CatalogItem>>,
}

impl StaticCatalog {
    /// Builds a catalog from items. A later item with the same domain and id
    /// replaces an earlier one.
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut catalog = Self::default();
        for item in items {
            catalog
                .items
                .entry(item.domain)
                .or_default()
                .insert(item.id.clone(), item);
        }
        catalog
    }

    /// Loads `{"items": [...]}` from a `.json`, `.yaml` or `.yml` file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::new(
                ErrorCode::CatalogUnavailable,
                format!("Failed to read catalog file: {}", e),
            )
            .with_detail("path", path.display().to_string())
        })?;
        Self::parse(&raw, path)
    }

    fn parse(raw: &str, path: &Path) -> Result<Self, DomainError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let file: CatalogFile = match extension.as_deref() {
            Some("yaml") | Some("yml") => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
            Some("json") => serde_json::from_str(raw).map_err(|e| e.to_string()),
            other => Err(format!("unsupported catalog extension {:?}", other)),
        }
        .map_err(|reason| {
            DomainError::new(
                ErrorCode::CatalogUnavailable,
                format!("Invalid catalog file: {}", reason),
            )
            .with_detail("path", path.display().to_string())
        })?;

        Ok(Self::new(file.items))
    }

    pub fn len(&self) -> usize {
        self.items.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn items(&self, domain: TasteDomain) -> Result<Vec<CatalogItem>, DomainError> {
        Ok(self
            .items
            .get(&domain)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn item(
        &self,
        domain: TasteDomain,
        item_id: &CatalogItemId,
    ) -> Result<Option<CatalogItem>, DomainError> {
        Ok(self
            .items
            .get(&domain)
            .and_then(|items| items.get(item_id))
            .cloned())
    }
}
