//! The record store: `StudentStore` trait and its PostgreSQL implementation.

use crate::error::AppError;
use crate::response::StudentPage;
use crate::student::{NewStudent, Student, StudentPatch};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

/// Fixed page size for list queries.
pub const PAGE_SIZE: i64 = 10;

/// Persistence seam for student records. The server injects the PostgreSQL
/// implementation; tests substitute an in-memory one.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Page of students plus total match count. `filter` is a
    /// case-insensitive substring match on name; unfiltered results are
    /// ordered by name.
    async fn list(&self, filter: Option<&str>, page: u32) -> Result<StudentPage, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
    async fn create(&self, new: &NewStudent) -> Result<Student, AppError>;
    /// Apply a partial update. Returns None when no row has this id.
    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Option<Student>, AppError>;
    /// Returns true when a row was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
    /// Liveness probe for the readiness route.
    async fn ping(&self) -> Result<(), AppError>;
}

/// 1-based page number to row offset. Pages below 1 are clamped to the first.
pub fn page_offset(page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * PAGE_SIZE
}

const STUDENT_COLUMNS: &str = "id, name, email, age, height, weight, created_at, updated_at";

pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        PgStudentStore { pool }
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn list(&self, filter: Option<&str>, page: u32) -> Result<StudentPage, AppError> {
        let offset = page_offset(page);
        match filter {
            Some(name) => {
                let pattern = format!("%{}%", name);
                let count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE name ILIKE $1")
                        .bind(&pattern)
                        .fetch_one(&self.pool)
                        .await?;
                let sql = format!(
                    "SELECT {STUDENT_COLUMNS} FROM students WHERE name ILIKE $1 LIMIT $2 OFFSET $3"
                );
                tracing::debug!(sql = %sql, pattern = %pattern, "query");
                let rows = sqlx::query_as::<_, Student>(&sql)
                    .bind(&pattern)
                    .bind(PAGE_SIZE)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(StudentPage { count, rows })
            }
            None => {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
                    .fetch_one(&self.pool)
                    .await?;
                let sql = format!(
                    "SELECT {STUDENT_COLUMNS} FROM students ORDER BY name LIMIT $1 OFFSET $2"
                );
                tracing::debug!(sql = %sql, "query");
                let rows = sqlx::query_as::<_, Student>(&sql)
                    .bind(PAGE_SIZE)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?;
                Ok(StudentPage { count, rows })
            }
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE email = $1");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, new: &NewStudent) -> Result<Student, AppError> {
        let sql = format!(
            "INSERT INTO students (name, email, age, height, weight) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {STUDENT_COLUMNS}"
        );
        tracing::debug!(sql = %sql, email = %new.email, "insert");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&new.name)
            .bind(&new.email)
            .bind(new.age)
            .bind(new.height)
            .bind(new.weight)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, patch: &StudentPatch) -> Result<Option<Student>, AppError> {
        // COALESCE keeps absent fields at their stored values, so one
        // statement covers every patch shape.
        let sql = format!(
            "UPDATE students SET \
             name = COALESCE($2, name), \
             email = COALESCE($3, email), \
             age = COALESCE($4, age), \
             height = COALESCE($5, height), \
             weight = COALESCE($6, weight), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {STUDENT_COLUMNS}"
        );
        tracing::debug!(sql = %sql, id, "update");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.email.as_deref())
            .bind(patch.age)
            .bind(patch.height)
            .bind(patch.weight)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Create the students table if it does not exist. Call once at startup.
/// The UNIQUE constraint on email backs up the application-layer pre-check.
pub async fn ensure_students_table(pool: &PgPool) -> Result<(), AppError> {
    let ddl = r#"
        CREATE TABLE IF NOT EXISTS students (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            age INTEGER NOT NULL,
            height DOUBLE PRECISION NOT NULL,
            weight DOUBLE PRECISION NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
    "#;
    sqlx::query(ddl).execute(pool).await?;
    Ok(())
}

/// Ensure the database in `database_url` exists; create it if not. Connects
/// to the default `postgres` database to run CREATE DATABASE. Call before
/// creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| AppError::BadRequest(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(AppError::Db)?;
    let exists: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(&db_name)
            .fetch_one(&mut conn)
            .await
            .map_err(AppError::Db)?;
    if !exists.0 {
        let quoted = quote_ident(&db_name);
        sqlx::query(&format!("CREATE DATABASE {}", quoted))
            .execute(&mut conn)
            .await
            .map_err(AppError::Db)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| AppError::BadRequest("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = format!("{}postgres", base);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_zero_based_from_page_one() {
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(2), 10);
        assert_eq!(page_offset(5), 40);
    }

    #[test]
    fn page_zero_is_treated_as_page_one() {
        assert_eq!(page_offset(0), 0);
    }

    #[test]
    fn db_name_is_split_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://localhost/registry").unwrap();
        assert_eq!(admin, "postgres://localhost/postgres");
        assert_eq!(name, "registry");
    }

    #[test]
    fn db_name_ignores_query_string() {
        let (_, name) =
            parse_db_name_from_url("postgres://localhost/registry?sslmode=disable").unwrap();
        assert_eq!(name, "registry");
    }
}
