use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, PgPool, Postgres,
};

use super::repository::Repository;
use super::DatabaseError;
use crate::api::pagination::{Page, PageRequest};
use crate::entity::{Entity, Record};

pub type PgQueryAs<'q, T> = QueryAs<'q, Postgres, T, PgArguments>;

/// Audit columns of the embedded [`Record`], in bind order
pub const RECORD_COLUMNS: [&str; 6] = [
    "created_time",
    "updated_time",
    "created_date",
    "updated_date",
    "created_by_id",
    "updated_by_id",
];

/// An entity [`PgRepository`] can write.
///
/// Rows are read back through `FromRow`, so the entity usually derives it
/// with `#[sqlx(flatten)]` on its [`Record`].
pub trait PgEntity: Entity<i64> + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// Resource-specific columns, in the order `bind_columns` binds them
    fn columns() -> &'static [&'static str];

    fn bind_columns<'q>(&'q self, query: PgQueryAs<'q, Self>) -> PgQueryAs<'q, Self>;
}

/// Repository over a single Postgres table with a `BIGSERIAL id` column.
pub struct PgRepository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> PgRepository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Result<Self, DatabaseError> {
        let table_name = table_name.into();
        if !is_valid_identifier(&table_name) {
            return Err(DatabaseError::InvalidTableName(table_name));
        }

        Ok(Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub async fn select_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" WHERE id = $1", self.table_name);
        let row = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.select_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Record not found".to_string()))
    }

    pub async fn select_all(&self) -> Result<Vec<T>, DatabaseError> {
        let sql = format!("SELECT * FROM \"{}\" ORDER BY id", self.table_name);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn select_page(&self, request: PageRequest) -> Result<Page<T>, DatabaseError> {
        let total = self.count_rows().await?;
        let (limit, offset) = page_bounds(request)?;

        let sql = format!(
            "SELECT * FROM \"{}\" ORDER BY id LIMIT $1 OFFSET $2",
            self.table_name
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(rows, request, total))
    }

    async fn count_rows(&self) -> Result<usize, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", self.table_name);
        let count = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        usize::try_from(count).map_err(|_| DatabaseError::QueryError(format!("invalid row count {}", count)))
    }

    async fn delete_row(&self, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM \"{}\" WHERE id = $1", self.table_name);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl<E: PgEntity> Repository<E, i64> for PgRepository<E> {
    /// Insert when the entity has no id yet, otherwise update that row
    async fn save(&self, entity: E) -> Result<E, DatabaseError> {
        let columns = writable_columns(E::columns())?;

        match entity.id().copied() {
            None => {
                let sql = insert_sql(&self.table_name, &columns);
                let query = bind_record(sqlx::query_as::<_, E>(&sql), entity.record());
                let saved = entity.bind_columns(query).fetch_one(&self.pool).await?;
                Ok(saved)
            }
            Some(id) => {
                let sql = update_sql(&self.table_name, &columns);
                let query = bind_record(sqlx::query_as::<_, E>(&sql), entity.record());
                entity
                    .bind_columns(query)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(|| DatabaseError::NotFound(format!("Record {} not found", id)))
            }
        }
    }

    async fn find_by_id(&self, id: &i64) -> Result<Option<E>, DatabaseError> {
        self.select_by_id(*id).await
    }

    async fn find_all(&self) -> Result<Vec<E>, DatabaseError> {
        self.select_all().await
    }

    async fn delete_by_id(&self, id: &i64) -> Result<bool, DatabaseError> {
        self.delete_row(*id).await
    }

    async fn count(&self) -> Result<usize, DatabaseError> {
        self.count_rows().await
    }
}

fn bind_record<'q, T>(query: PgQueryAs<'q, T>, record: &'q Record<i64>) -> PgQueryAs<'q, T> {
    query
        .bind(record.created_time())
        .bind(record.updated_time)
        .bind(record.created_date())
        .bind(record.updated_date.as_str())
        .bind(*record.created_by_id())
        .bind(record.updated_by_id)
}

/// Record columns followed by the entity's own, all checked as identifiers
fn writable_columns(entity_columns: &[&'static str]) -> Result<Vec<&'static str>, DatabaseError> {
    RECORD_COLUMNS
        .iter()
        .chain(entity_columns)
        .map(|&column| {
            if is_valid_identifier(column) {
                Ok(column)
            } else {
                Err(DatabaseError::QueryError(format!("invalid column name {:?}", column)))
            }
        })
        .collect()
}

fn insert_sql(table: &str, columns: &[&str]) -> String {
    let placeholders = (1..=columns.len())
        .map(|n| format!("${}", n))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
        table,
        columns.join(", "),
        placeholders
    )
}

/// The id is bound last, after every column
fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ${}", column, i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "UPDATE \"{}\" SET {} WHERE id = ${} RETURNING *",
        table,
        assignments,
        columns.len() + 1
    )
}

/// `(LIMIT, OFFSET)` for a page request
fn page_bounds(request: PageRequest) -> Result<(i64, i64), DatabaseError> {
    let to_i64 = |value: usize| {
        i64::try_from(value).map_err(|_| DatabaseError::QueryError(format!("{} exceeds the LIMIT/OFFSET range", value)))
    };
    Ok((to_i64(request.size)?, to_i64(request.offset())?))
}

/// Table names are interpolated into SQL, so only plain identifiers pass
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("notes"));
        assert!(is_valid_identifier("_audit_log_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2notes"));
        assert!(!is_valid_identifier("notes; DROP TABLE users"));
        assert!(!is_valid_identifier("Notes"));
        assert!(!is_valid_identifier(&"a".repeat(64)));
    }

    #[test]
    fn test_insert_sql_numbers_every_column() {
        assert_eq!(
            insert_sql("notes", &["title", "body"]),
            "INSERT INTO \"notes\" (title, body) VALUES ($1, $2) RETURNING *"
        );
    }

    #[test]
    fn test_update_sql_binds_id_last() {
        assert_eq!(
            update_sql("notes", &["title", "body"]),
            "UPDATE \"notes\" SET title = $1, body = $2 WHERE id = $3 RETURNING *"
        );
    }

    #[test]
    fn test_writable_columns_put_record_first() {
        let columns = writable_columns(&["title"]).unwrap();
        assert_eq!(columns.len(), 7);
        assert_eq!(columns[0], "created_time");
        assert_eq!(columns[6], "title");

        assert!(matches!(
            writable_columns(&["title; --"]),
            Err(DatabaseError::QueryError(_))
        ));
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(PageRequest::new(0, 10)).unwrap(), (10, 0));
        assert_eq!(page_bounds(PageRequest::new(3, 25)).unwrap(), (25, 75));
        assert!(page_bounds(PageRequest::new(0, usize::MAX)).is_err());
    }
}
