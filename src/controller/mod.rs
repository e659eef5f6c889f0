//! HTTP bindings for the service contracts.
//!
//! [`CrudRouter`] mounts one route per operation and forwards each request
//! to the matching service method unchanged:
//!
//! | verb   | path              | service method    |
//! |--------|-------------------|-------------------|
//! | POST   | `/`               | `create`          |
//! | GET    | `/:id`            | `find_by_id`      |
//! | GET    | `/`               | `find_all`        |
//! | PUT    | `/:id`            | `update`          |
//! | DELETE | `/:id`            | `delete`          |
//! | GET    | `/projection/:id` | `find_projection` |
//! | GET    | `/page`           | `find_page`       |

use std::marker::PhantomData;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;

use crate::api::extract::{IdPath, JsonBody};
use crate::api::pagination::{Page, PageQuery};
use crate::api::response::ServiceResult;
use crate::auth::SecurityContext;
use crate::config::{self, PaginationConfig};
use crate::service::{
    BaseService, CreateService, DeleteService, FindAllService, FindProjectionService, FindService, UpdateService,
};

/// Builds the routes of one resource on top of its service.
///
/// Only operations whose service trait `S` implements can be mounted.
pub struct CrudRouter<S, I, D> {
    service: Arc<S>,
    pagination: PaginationConfig,
    router: Router,
    _marker: PhantomData<fn() -> (I, D)>,
}

/// State of the `/page` route
struct PageState<S> {
    service: Arc<S>,
    pagination: PaginationConfig,
}

impl<S> Clone for PageState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            pagination: self.pagination.clone(),
        }
    }
}

impl<S, I, D> CrudRouter<S, I, D>
where
    S: Send + Sync + 'static,
    I: DeserializeOwned + Send + 'static,
    D: DeserializeOwned + Send + 'static,
{
    /// Router using the process-wide pagination limits
    pub fn new(service: Arc<S>) -> Self {
        Self::with_pagination(service, config::config().pagination.clone())
    }

    pub fn with_pagination(service: Arc<S>, pagination: PaginationConfig) -> Self {
        Self {
            service,
            pagination,
            router: Router::new(),
            _marker: PhantomData,
        }
    }

    /// `POST /`
    pub fn create(self) -> Self
    where
        S: CreateService<D>,
    {
        self.route("/", post(create_handler::<S, D>))
    }

    /// `GET /:id`
    pub fn find(self) -> Self
    where
        S: FindService<I>,
    {
        self.route("/:id", get(find_handler::<S, I>))
    }

    /// `GET /`
    pub fn find_all(self) -> Self
    where
        S: FindAllService,
    {
        self.route("/", get(find_all_handler::<S>))
    }

    /// `PUT /:id`
    pub fn update(self) -> Self
    where
        S: UpdateService<I, D>,
    {
        self.route("/:id", put(update_handler::<S, I, D>))
    }

    /// `DELETE /:id`
    pub fn delete(self) -> Self
    where
        S: DeleteService<I>,
    {
        self.route("/:id", delete(delete_handler::<S, I>))
    }

    /// `GET /projection/:id`
    pub fn projection(self) -> Self
    where
        S: FindProjectionService<I>,
    {
        self.route("/projection/:id", get(projection_handler::<S, I>))
    }

    /// `GET /page?page=0&size=10`
    pub fn page(mut self) -> Self
    where
        S: FindAllService,
    {
        let state = PageState {
            service: self.service.clone(),
            pagination: self.pagination.clone(),
        };
        self.router = self.router.route("/page", get(page_handler::<S>).with_state(state));
        self
    }

    /// Mount all five CRUD operations
    pub fn crud(self) -> Self
    where
        S: BaseService<I, D>,
    {
        self.create().find().find_all().update().delete()
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    fn route(mut self, path: &str, method_router: MethodRouter<Arc<S>>) -> Self {
        self.router = self.router.route(path, method_router.with_state(self.service.clone()));
        self
    }
}

async fn create_handler<S, D>(
    State(service): State<Arc<S>>,
    ctx: SecurityContext,
    JsonBody(body): JsonBody<D>,
) -> ServiceResult<S::Created>
where
    S: CreateService<D>,
    D: Send + 'static,
{
    service.create(&ctx, body).await
}

async fn find_handler<S, I>(
    State(service): State<Arc<S>>,
    ctx: SecurityContext,
    IdPath(id): IdPath<I>,
) -> ServiceResult<S::Found>
where
    S: FindService<I>,
    I: Send + 'static,
{
    service.find_by_id(&ctx, id).await
}

async fn find_all_handler<S>(State(service): State<Arc<S>>, ctx: SecurityContext) -> ServiceResult<Vec<S::Item>>
where
    S: FindAllService,
{
    service.find_all(&ctx).await
}

async fn update_handler<S, I, D>(
    State(service): State<Arc<S>>,
    ctx: SecurityContext,
    IdPath(id): IdPath<I>,
    JsonBody(body): JsonBody<D>,
) -> ServiceResult<S::Updated>
where
    S: UpdateService<I, D>,
    I: Send + 'static,
    D: Send + 'static,
{
    service.update(&ctx, id, body).await
}

async fn delete_handler<S, I>(
    State(service): State<Arc<S>>,
    ctx: SecurityContext,
    IdPath(id): IdPath<I>,
) -> ServiceResult
where
    S: DeleteService<I>,
    I: Send + 'static,
{
    service.delete(&ctx, id).await
}

async fn projection_handler<S, I>(
    State(service): State<Arc<S>>,
    ctx: SecurityContext,
    IdPath(id): IdPath<I>,
) -> ServiceResult<S::Projected>
where
    S: FindProjectionService<I>,
    I: Send + 'static,
{
    service.find_projection(&ctx, id).await
}

async fn page_handler<S>(
    State(state): State<PageState<S>>,
    ctx: SecurityContext,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ServiceResult<Page<S::Item>>
where
    S: FindAllService,
{
    let Query(query) = query?;
    let request = query.resolve(&state.pagination);
    state.service.find_page(&ctx, request).await
}
