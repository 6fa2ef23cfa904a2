//! In-memory repository for unit testing and local development.

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::{Entity, Repository, RepositoryResult};

/// In-memory [`Repository`] keyed by entity id.
///
/// Clones share the same storage.
#[derive(Debug)]
pub struct LocalRepository<T: Entity> {
    entries: Arc<RwLock<BTreeMap<T::Id, T>>>,
}

impl<T: Entity> LocalRepository<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<T: Entity> Default for LocalRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for LocalRepository<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for LocalRepository<T> {
    async fn save(&self, entity: T) -> RepositoryResult<()> {
        let id = entity.entity_id();
        let replaced = self.entries.write().insert(id, entity).is_some();
        debug!(
            "local repository: {} {} {}",
            if replaced { "replaced" } else { "stored" },
            T::ENTITY_NAME,
            id
        );
        Ok(())
    }

    async fn find_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>> {
        Ok(self.entries.read().get(&id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<T>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    async fn delete_by_id(&self, id: T::Id) -> RepositoryResult<()> {
        if self.entries.write().remove(&id).is_some() {
            debug!("local repository: deleted {} {}", T::ENTITY_NAME, id);
        }
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
