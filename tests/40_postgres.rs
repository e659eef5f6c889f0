mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use crud_base::api::PageRequest;
use crud_base::database::{PgRepository, Repository};
use crud_base::demo::{self, Note};
use crud_base::entity::{Entity, Record, RecordOptions};

// These run only against a live database, like the rest of the Postgres stack
async fn repository(table: &str) -> Result<Option<PgRepository<Note>>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(None);
    };

    let pool = sqlx::PgPool::connect(&url).await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", table)).execute(&pool).await?;
    let create = demo::CREATE_NOTES_TABLE.replace("notes (", &format!("\"{}\" (", table));
    sqlx::query(&create).execute(&pool).await?;
    Ok(Some(PgRepository::new(table, pool)?))
}

fn note(title: &str, actor: i64) -> Note {
    Note {
        record: Record::new(RecordOptions::created_by(actor)),
        title: title.to_string(),
        body: String::new(),
    }
}

#[tokio::test]
async fn repository_round_trips_notes() -> Result<()> {
    let Some(repo) = repository("notes_repository_test").await? else {
        return Ok(());
    };

    let saved = repo.save(note("first", 2)).await?;
    let id = *Entity::id(&saved).expect("generated id");
    assert_eq!(*saved.record.created_by_id(), 2);

    let mut changed = saved.clone();
    changed.title = "renamed".to_string();
    changed.record.updated_by_id = Some(1);
    let updated = repo.save(changed).await?;
    assert_eq!(updated.title, "renamed");
    assert_eq!(updated.record.updated_by_id, Some(1));

    for n in 0..4 {
        repo.save(note(&format!("more {}", n), 2)).await?;
    }
    assert_eq!(repo.count().await?, 5);
    let page = repo.select_page(PageRequest::new(1, 2)).await?;
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.content[0].title, "more 1");

    assert!(repo.delete_by_id(&id).await?);
    assert!(repo.find_by_id(&id).await?.is_none());
    assert!(repo.save(updated).await.is_err());
    Ok(())
}

#[tokio::test]
async fn demo_app_serves_notes_from_postgres() -> Result<()> {
    let Some(repo) = repository("notes_app_test").await? else {
        return Ok(());
    };
    let app = demo::app_with_repository(&common::test_config(), Arc::new(repo))?;
    let token = common::token_for("writer", 1);

    let (status, body) = common::send(&app, "POST", "/api/notes", Some(&token), Some(json!({"title": "stored"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_i64().expect("id");

    let (status, body) = common::send(&app, "GET", &format!("/api/notes/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "stored");
    Ok(())
}
