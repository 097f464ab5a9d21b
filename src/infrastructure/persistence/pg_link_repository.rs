//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    code: String,
    target_url: String,
    created_at: DateTime<Utc>,
    click_count: i64,
}

impl TryFrom<LinkRow> for Link {
    type Error = AppError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let click_count = clicks_from_db(row.click_count)?;
        Ok(Link::new(row.code, row.target_url, row.created_at, click_count))
    }
}

fn clicks_from_db(value: i64) -> Result<u64, AppError> {
    u64::try_from(value).map_err(|_| {
        AppError::internal("Negative click count in storage", json!({ "value": value }))
    })
}

/// PostgreSQL repository for link storage and click accounting.
///
/// Uniqueness rests on the `links.code` primary key and every mutation is a
/// single statement, so atomicity comes from row-level locking in the database.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (code, target_url)
            VALUES ($1, $2)
            ON CONFLICT (code) DO NOTHING
            RETURNING code, target_url, created_at, click_count
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_link.code }),
            )),
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT code, target_url, created_at, click_count
            FROM links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Link::try_from).transpose()
    }

    async fn increment_clicks(&self, code: &str) -> Result<u64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE links
            SET click_count = click_count + 1
            WHERE code = $1
            RETURNING click_count
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))?;

        clicks_from_db(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
