// src/core/database.rs
//! Unified database operations - pool management, migrations, and the
//! candidate/job-listing repositories.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

// ===== Core Database Connection Management =====

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to Postgres and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;

        info!("Database connection pool established");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Wrap an existing pool. Migrations are the caller's concern.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get pool reference for custom operations
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// The call-result columns are appended with `ADD COLUMN IF NOT EXISTS`
    /// so that an existing candidates table picks them up on upgrade.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS candidates (
                id BIGSERIAL PRIMARY KEY,
                full_name TEXT,
                phone_numbers TEXT,
                job_url TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS job_listings (
                url TEXT PRIMARY KEY,
                job_title TEXT,
                location TEXT,
                estimated_pay TEXT
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        for column in [
            "call_id TEXT",
            "intent TEXT",
            "call_summary TEXT",
            "scheduled_at TIMESTAMPTZ",
        ] {
            sqlx::query(&format!(
                "ALTER TABLE candidates ADD COLUMN IF NOT EXISTS {};",
                column
            ))
            .execute(&self.pool)
            .await?;
        }

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_candidates_call_id ON candidates(call_id);")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_candidates_job_url ON candidates(job_url);")
            .execute(&self.pool)
            .await?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Candidate Model =====

/// A candidate row joined to its job listing. The listing side is optional:
/// candidates scraped without a job URL still exist, they just get a call
/// script with empty job fields.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Candidate {
    pub id: i64,
    pub full_name: Option<String>,
    pub phone_numbers: Option<String>,
    pub job_url: Option<String>,
    pub job_title: Option<String>,
    pub location: Option<String>,
    pub estimated_pay: Option<String>,
    pub call_id: Option<String>,
    pub intent: Option<String>,
    pub call_summary: Option<String>,
}

// ===== Candidate Repository =====

pub struct CandidateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CandidateRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Candidates with a phone number on file, joined to their job listing.
    pub async fn list_callable(&self) -> Result<Vec<Candidate>> {
        let candidates = sqlx::query_as::<_, Candidate>(
            r#"
            SELECT
                c.id,
                c.full_name,
                c.phone_numbers,
                c.job_url,
                j.job_title,
                j.location,
                j.estimated_pay,
                c.call_id,
                c.intent,
                c.call_summary
            FROM candidates c
            LEFT JOIN job_listings j ON c.job_url = j.url
            WHERE c.phone_numbers IS NOT NULL AND c.phone_numbers != ''
            ORDER BY c.id ASC
            "#,
        )
        .fetch_all(self.pool)
        .await
        .context("Failed to fetch callable candidates")?;

        Ok(candidates)
    }

    /// Stamp the time a candidate's call was scheduled for.
    pub async fn record_scheduled(&self, candidate_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE candidates SET scheduled_at = $1 WHERE id = $2")
            .bind(at)
            .bind(candidate_id)
            .execute(self.pool)
            .await
            .context("Failed to record schedule time")?;
        Ok(())
    }

    /// Attach the vendor call id once a call has been placed.
    pub async fn record_call_id(&self, candidate_id: i64, call_id: &str) -> Result<()> {
        sqlx::query("UPDATE candidates SET call_id = $1 WHERE id = $2")
            .bind(call_id)
            .bind(candidate_id)
            .execute(self.pool)
            .await
            .context("Failed to record call id")?;
        Ok(())
    }

    /// Write the final intent and summary back onto the candidate row,
    /// located by the vendor call id. Returns false when no row matched.
    pub async fn record_outcome(
        &self,
        call_id: &str,
        intent: &str,
        summary: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE candidates SET intent = $1, call_summary = $2 WHERE call_id = $3",
        )
        .bind(intent)
        .bind(summary)
        .bind(call_id)
        .execute(self.pool)
        .await
        .context("Failed to record call outcome")?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a failed call for a candidate that never got a call id.
    pub async fn record_failure(&self, candidate_id: i64, intent: &str) -> Result<()> {
        sqlx::query("UPDATE candidates SET intent = $1 WHERE id = $2")
            .bind(intent)
            .bind(candidate_id)
            .execute(self.pool)
            .await
            .context("Failed to record call failure")?;
        Ok(())
    }

    /// Insert a candidate row from LLM-extracted resume fields.
    ///
    /// The extraction output is an open-ended string map, so missing columns
    /// are appended on demand as TEXT - the reactive-schema behavior the rest
    /// of the pipeline already assumes. Column names are sanitized to
    /// `[a-z0-9_]` before they reach an ALTER statement.
    pub async fn insert_extracted(
        &self,
        fields: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<i64> {
        let mut columns: Vec<String> = Vec::new();
        let mut values: Vec<String> = Vec::new();

        for (key, value) in fields {
            let column = sanitize_column_name(key);
            if column.is_empty() {
                warn!("Skipping extracted field with unusable name: {}", key);
                continue;
            }
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            columns.push(column);
            values.push(text);
        }

        if columns.is_empty() {
            anyhow::bail!("No usable fields extracted from resume");
        }

        for column in &columns {
            if !BASE_COLUMNS.contains(&column.as_str()) {
                sqlx::query(&format!(
                    "ALTER TABLE candidates ADD COLUMN IF NOT EXISTS {} TEXT;",
                    column
                ))
                .execute(self.pool)
                .await
                .with_context(|| format!("Failed to add column: {}", column))?;
            }
        }

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
        let insert = format!(
            "INSERT INTO candidates ({}) VALUES ({}) RETURNING id",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut query = sqlx::query_scalar::<_, i64>(&insert);
        for value in &values {
            query = query.bind(value);
        }

        let id = query
            .fetch_one(self.pool)
            .await
            .context("Failed to insert extracted candidate")?;

        info!("Inserted extracted candidate row id={}", id);
        Ok(id)
    }
}

/// Columns created by the migrations; never re-ALTERed by the dynamic insert.
const BASE_COLUMNS: &[&str] = &[
    "id",
    "full_name",
    "phone_numbers",
    "job_url",
    "created_at",
    "call_id",
    "intent",
    "call_summary",
    "scheduled_at",
];

fn sanitize_column_name(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('_').to_string();
    if cleaned.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        return String::new();
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_column_name() {
        assert_eq!(sanitize_column_name("Full Name"), "full_name");
        assert_eq!(sanitize_column_name("linkedin"), "linkedin");
        assert_eq!(
            sanitize_column_name("total work-experience"),
            "total_work_experience"
        );
    }

    #[test]
    fn test_sanitize_column_name_rejects_unusable() {
        assert_eq!(sanitize_column_name(""), "");
        assert_eq!(sanitize_column_name("   "), "");
        assert_eq!(sanitize_column_name("123abc"), "");
        assert_eq!(sanitize_column_name("!!!"), "");
    }
}
