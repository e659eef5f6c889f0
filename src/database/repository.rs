use async_trait::async_trait;

use super::DatabaseError;

/// Storage for one entity type keyed by `I`
#[async_trait]
pub trait Repository<E, I>: Send + Sync
where
    E: Send + 'static,
    I: Send + Sync + 'static,
{
    /// Insert or replace; new entities get their identity assigned here
    async fn save(&self, entity: E) -> Result<E, DatabaseError>;

    async fn find_by_id(&self, id: &I) -> Result<Option<E>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<E>, DatabaseError>;

    /// Returns whether anything was removed
    async fn delete_by_id(&self, id: &I) -> Result<bool, DatabaseError>;

    async fn count(&self) -> Result<usize, DatabaseError>;

    async fn find_404(&self, id: &I) -> Result<E, DatabaseError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))
    }
}
