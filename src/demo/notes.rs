use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::response::{ApiResponse, ServiceResult};
use crate::auth::SecurityContext;
use crate::database::{PgEntity, PgQueryAs, Repository};
use crate::entity::{Entity, Projection, Record, RecordOptions};
use crate::error::{ApiError, ExceptionThrower};
use crate::mapper::DoubleArgsEntityMapper;
use crate::service::{
    CreateService, DeleteService, FindAllService, FindProjectionService, FindService, UpdateService,
};
use crate::util::date::now_millis;
use crate::validator::{CreateRequestValidator, FindRequestValidator, UpdateRequestValidator};

const MAX_TITLE_LENGTH: usize = 200;

/// Table backing [`Note`] when the demo runs on Postgres
pub const CREATE_NOTES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS notes (
    id BIGSERIAL PRIMARY KEY,
    created_time BIGINT NOT NULL,
    updated_time BIGINT NOT NULL,
    created_date TEXT NOT NULL,
    updated_date TEXT NOT NULL,
    created_by_id BIGINT NOT NULL,
    updated_by_id BIGINT,
    title TEXT NOT NULL,
    body TEXT NOT NULL
)"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub record: Record<i64>,
    pub title: String,
    pub body: String,
}

impl Entity<i64> for Note {
    fn record(&self) -> &Record<i64> {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record<i64> {
        &mut self.record
    }
}

impl PgEntity for Note {
    fn columns() -> &'static [&'static str] {
        &["title", "body"]
    }

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self> {
        query.bind(self.title.as_str()).bind(self.body.as_str())
    }
}

/// Create and update payload; update applies only the fields present
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Read-only view served by `/projection/:id`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: Option<i64>,
    pub title: String,
    pub created_date: String,
    pub updated_date: String,
    pub created_by_id: i64,
}

impl From<&Note> for NoteSummary {
    fn from(note: &Note) -> Self {
        let record = &note.record;
        Self {
            id: Projection::id(record).copied(),
            title: note.title.clone(),
            created_date: record.created_date().to_string(),
            updated_date: Projection::updated_date(record).to_string(),
            created_by_id: *record.created_by_id(),
        }
    }
}

pub struct NoteMapper;

impl DoubleArgsEntityMapper<Note, NoteRequest, i64> for NoteMapper {
    fn to_entity(&self, request: NoteRequest, actor: i64) -> Note {
        Note {
            record: Record::new(RecordOptions::created_by(actor)),
            title: request.title.unwrap_or_default(),
            body: request.body.unwrap_or_default(),
        }
    }
}

pub struct NoteValidator;

impl NoteValidator {
    fn check_title(&self, title: &str) -> Result<(), ApiError> {
        if title.trim().is_empty() {
            return Err(self.required("title"));
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(self.message(&format!("title must be at most {} characters", MAX_TITLE_LENGTH)));
        }
        Ok(())
    }
}

impl ExceptionThrower for NoteValidator {}

impl CreateRequestValidator<NoteRequest> for NoteValidator {
    fn validate_create_request(&self, body: &NoteRequest) -> Result<(), ApiError> {
        self.check_title(body.title.as_deref().unwrap_or_default())
    }
}

impl UpdateRequestValidator<i64, NoteRequest> for NoteValidator {
    fn validate_update_request(&self, id: &i64, body: &NoteRequest) -> Result<(), ApiError> {
        self.validate_find_request(id)?;
        if body.title.is_none() && body.body.is_none() {
            return Err(self.message("Nothing to update"));
        }
        match &body.title {
            Some(title) => self.check_title(title),
            None => Ok(()),
        }
    }
}

impl FindRequestValidator<i64> for NoteValidator {
    fn validate_find_request(&self, id: &i64) -> Result<(), ApiError> {
        if *id < 1 {
            return Err(self.message("id must be a positive number"));
        }
        Ok(())
    }
}

/// Notes owned by the demo accounts. Reads are public; writes need a bearer token.
pub struct NoteService {
    repository: Arc<dyn Repository<Note, i64>>,
    validator: NoteValidator,
}

impl NoteService {
    pub fn new(repository: Arc<dyn Repository<Note, i64>>) -> Self {
        Self {
            repository,
            validator: NoteValidator,
        }
    }

    fn actor(&self, ctx: &SecurityContext) -> Result<i64, ApiError> {
        let authentication = ctx.require()?;
        super::account(&authentication.principal)
            .map(|a| a.id)
            .ok_or_else(|| ApiError::unauthorized(format!("Unknown account '{}'", authentication.principal)))
    }

    /// Only the author or an administrator may change or remove a note
    fn check_owner(ctx: &SecurityContext, note: &Note, actor: i64, action: &str) -> Result<(), ApiError> {
        let is_admin = ctx.authentication.as_ref().is_some_and(|a| a.has_authority("ADMIN"));
        if *note.record.created_by_id() != actor && !is_admin {
            return Err(ApiError::unauthorized(format!(
                "Only the author or an administrator may {} this note",
                action
            )));
        }
        Ok(())
    }

    fn not_found<T>(id: i64) -> ServiceResult<T> {
        Ok(ApiResponse::not_found()
            .with_message(format!("Note {} not found", id))
            .without_data())
    }
}

impl ExceptionThrower for NoteService {}

#[async_trait]
impl CreateService<NoteRequest> for NoteService {
    type Created = Note;

    async fn create(&self, ctx: &SecurityContext, body: NoteRequest) -> ServiceResult<Note> {
        let actor = self.actor(ctx)?;
        self.validator.validate_create_request(&body)?;

        let note = self.repository.save(NoteMapper.to_entity(body, actor)).await?;
        tracing::info!("Note {:?} created by {}", Entity::id(&note), actor);
        Ok(ApiResponse::created().with_message("Note created").with_data(note))
    }
}

#[async_trait]
impl UpdateService<i64, NoteRequest> for NoteService {
    type Updated = Note;

    async fn update(&self, ctx: &SecurityContext, id: i64, body: NoteRequest) -> ServiceResult<Note> {
        let actor = self.actor(ctx)?;
        self.validator.validate_update_request(&id, &body)?;

        let Some(mut note) = self.repository.find_by_id(&id).await? else {
            return Self::not_found(id);
        };
        Self::check_owner(ctx, &note, actor, "update")?;

        if let Some(title) = body.title {
            note.title = title;
        }
        if let Some(text) = body.body {
            note.body = text;
        }
        note.record.set_updated_time(now_millis());
        note.record.updated_by_id = Some(actor);

        let note = self.repository.save(note).await?;
        Ok(ApiResponse::ok().with_message("Note updated").with_data(note))
    }
}

#[async_trait]
impl FindService<i64> for NoteService {
    type Found = Note;

    async fn find_by_id(&self, _ctx: &SecurityContext, id: i64) -> ServiceResult<Note> {
        self.validator.validate_find_request(&id)?;

        match self.repository.find_by_id(&id).await? {
            Some(note) => Ok(ApiResponse::ok().with_data(note)),
            None => Self::not_found(id),
        }
    }
}

#[async_trait]
impl FindProjectionService<i64> for NoteService {
    type Projected = NoteSummary;

    async fn find_projection(&self, _ctx: &SecurityContext, id: i64) -> ServiceResult<NoteSummary> {
        self.validator.validate_find_request(&id)?;

        match self.repository.find_by_id(&id).await? {
            Some(note) => Ok(ApiResponse::ok().with_data(NoteSummary::from(&note))),
            None => Self::not_found(id),
        }
    }
}

#[async_trait]
impl FindAllService for NoteService {
    type Item = Note;

    async fn find_all(&self, _ctx: &SecurityContext) -> ServiceResult<Vec<Note>> {
        let notes = self.repository.find_all().await?;
        Ok(ApiResponse::ok().with_data(notes))
    }
}

#[async_trait]
impl DeleteService<i64> for NoteService {
    async fn delete(&self, ctx: &SecurityContext, id: i64) -> ServiceResult {
        let actor = self.actor(ctx)?;
        self.validator.validate_find_request(&id)?;

        let Some(note) = self.repository.find_by_id(&id).await? else {
            return Self::not_found(id);
        };
        Self::check_owner(ctx, &note, actor, "delete")?;

        self.repository.delete_by_id(&id).await?;
        tracing::info!("Note {} deleted by {}", id, actor);
        Ok(ApiResponse::ok().with_message("Note deleted"))
    }
}
