//! Per-resource business logic contracts.
//!
//! Each operation receives the request's [`SecurityContext`] and answers with
//! a response envelope; failures are returned as [`ApiError`](crate::error::ApiError)
//! and rendered at the boundary.

use async_trait::async_trait;
use serde::Serialize;

use crate::api::pagination::{Page, PageRequest};
use crate::api::response::ServiceResult;
use crate::auth::SecurityContext;
use crate::error::ExceptionThrower;

#[async_trait]
pub trait CreateService<D: Send + 'static>: Send + Sync {
    type Created: Serialize + Send + 'static;

    async fn create(&self, ctx: &SecurityContext, body: D) -> ServiceResult<Self::Created>;
}

#[async_trait]
pub trait UpdateService<I: Send + 'static, D: Send + 'static>: Send + Sync {
    type Updated: Serialize + Send + 'static;

    async fn update(&self, ctx: &SecurityContext, id: I, body: D) -> ServiceResult<Self::Updated>;
}

#[async_trait]
pub trait FindService<I: Send + 'static>: Send + Sync {
    type Found: Serialize + Send + 'static;

    async fn find_by_id(&self, ctx: &SecurityContext, id: I) -> ServiceResult<Self::Found>;
}

/// Lookup returning a read-only projection instead of the full entity
#[async_trait]
pub trait FindProjectionService<I: Send + 'static>: Send + Sync {
    type Projected: Serialize + Send + 'static;

    async fn find_projection(&self, ctx: &SecurityContext, id: I) -> ServiceResult<Self::Projected>;
}

#[async_trait]
pub trait FindAllService: Send + Sync {
    type Item: Serialize + Send + 'static;

    async fn find_all(&self, ctx: &SecurityContext) -> ServiceResult<Vec<Self::Item>>;

    /// One page of `find_all`. The provided version slices the full listing;
    /// override it when the store can page natively.
    async fn find_page(&self, ctx: &SecurityContext, request: PageRequest) -> ServiceResult<Page<Self::Item>> {
        let mut listing = self.find_all(ctx).await?;
        let items = listing.data.take().unwrap_or_default();
        Ok(listing.with_data(Page::slice(items, request)))
    }
}

#[async_trait]
pub trait DeleteService<I: Send + 'static>: Send + Sync {
    async fn delete(&self, ctx: &SecurityContext, id: I) -> ServiceResult;
}

/// The five CRUD operations for one resource
pub trait BaseService<I: Send + 'static, D: Send + 'static>:
    ExceptionThrower
    + CreateService<D>
    + UpdateService<I, D>
    + FindService<I>
    + FindAllService
    + DeleteService<I>
{
}

impl<T, I, D> BaseService<I, D> for T
where
    I: Send + 'static,
    D: Send + 'static,
    T: ExceptionThrower + CreateService<D> + UpdateService<I, D> + FindService<I> + FindAllService + DeleteService<I>,
{
}
