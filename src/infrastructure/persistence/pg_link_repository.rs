//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    code: String,
    target_url: String,
    is_custom_alias: bool,
    click_count: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    last_clicked_at: Option<DateTime<Utc>>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(r: ShortLinkRow) -> Self {
        ShortLink {
            id: r.id,
            code: r.code,
            target_url: r.target_url,
            is_custom_alias: r.is_custom_alias,
            click_count: r.click_count,
            created_at: r.created_at,
            expires_at: r.expires_at,
            last_clicked_at: r.last_clicked_at,
        }
    }
}

/// PostgreSQL repository for short link storage.
///
/// Code uniqueness is enforced by the `short_links_code_key` constraint, and
/// click counters move through a single `UPDATE ... RETURNING` statement.
/// Each call acquires a pooled connection and releases it when the query
/// completes.
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
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            INSERT INTO short_links (code, target_url, is_custom_alias, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, code, target_url, is_custom_alias, click_count,
                      created_at, expires_at, last_clicked_at
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target_url)
        .bind(new_link.is_custom_alias)
        .bind(new_link.created_at)
        .bind(new_link.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on_code(&e) {
                AppError::duplicate_code(
                    "Short code already exists",
                    json!({ "code": new_link.code }),
                )
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT id, code, target_url, is_custom_alias, click_count,
                   created_at, expires_at, last_clicked_at
            FROM short_links
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn record_click(
        &self,
        code: &str,
        clicked_at: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1,
                last_clicked_at = $2
            WHERE code = $1
            RETURNING id, code, target_url, is_custom_alias, click_count,
                      created_at, expires_at, last_clicked_at
            "#,
        )
        .bind(code)
        .bind(clicked_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
