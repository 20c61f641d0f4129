//! In-memory identity persistence.
//!
//! Keeps the latest version per profile in a map. Enforces the same
//! compare-and-swap rule as the filesystem store, so coordinator conflict
//! handling can be exercised without touching disk.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ProfileId};
use crate::domain::taste::TasteIdentity;
use crate::ports::{check_successor, IdentityPersistence};

/// In-memory store of identity snapshots.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityStore {
    identities: Arc<RwLock<HashMap<ProfileId, TasteIdentity>>>,
}

impl InMemoryIdentityStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly, bypassing the version check (useful for tests)
    pub async fn insert(&self, identity: TasteIdentity) {
        self.identities
            .write()
            .await
            .insert(identity.profile_id().clone(), identity);
    }

    /// Get the number of stored identities
    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityPersistence for InMemoryIdentityStore {
    async fn load(&self, profile_id: &ProfileId) -> Result<Option<TasteIdentity>, DomainError> {
        Ok(self.identities.read().await.get(profile_id).cloned())
    }

    async fn save(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        let mut identities = self.identities.write().await;
        check_successor(identities.get(identity.profile_id()), identity)?;
        identities.insert(identity.profile_id().clone(), identity.clone());
        Ok(())
    }

    async fn replace(&self, identity: &TasteIdentity) -> Result<(), DomainError> {
        self.identities
            .write()
            .await
            .insert(identity.profile_id().clone(), identity.clone());
        Ok(())
    }
}
