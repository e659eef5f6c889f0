use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::Repository;
use super::DatabaseError;
use crate::entity::Entity;

/// Process-local repository with identity keys starting at 1
pub struct InMemoryRepository<E> {
    rows: RwLock<BTreeMap<i64, E>>,
    next_id: AtomicI64,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<E> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<E> Repository<E, i64> for InMemoryRepository<E>
where
    E: Entity<i64> + Clone + Send + Sync + 'static,
{
    async fn save(&self, mut entity: E) -> Result<E, DatabaseError> {
        let id = match entity.id() {
            Some(id) => {
                // Keep generated keys clear of caller-chosen ones
                self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
                *id
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                entity.record_mut().id = Some(id);
                id
            }
        };

        self.rows.write().await.insert(id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &i64) -> Result<Option<E>, DatabaseError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<E>, DatabaseError> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn delete_by_id(&self, id: &i64) -> Result<bool, DatabaseError> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<usize, DatabaseError> {
        Ok(self.rows.read().await.len())
    }
}
