//! PostgreSQL storage.
//!
//! Uniqueness is enforced by the `profiles_email_key` index on
//! `LOWER(email)`, see `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::profile::{
    Profile, ProfileId, ProfileRepository, StorageError, StorageResult,
};

const COLUMNS: &str = "id, name, email, created_at, updated_at";

/// Row of the `profiles` table.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRecord {
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id.into(),
            name: record.name,
            email: record.email,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db) if db.is_unique_violation() => StorageError::Conflict,
            _ => StorageError::internal(err),
        }
    }
}

/// PostgreSQL [`ProfileRepository`].
#[derive(Clone, Debug)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new [`PgProfileRepository`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: &ProfileId) -> StorageResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Profile::from))
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<Profile>> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {COLUMNS} FROM profiles WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(Profile::from))
    }

    async fn insert(&self, profile: Profile) -> StorageResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"INSERT INTO profiles (id, name, email, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {COLUMNS}"#
        ))
        .bind(profile.id.as_uuid())
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(record.into())
    }

    async fn update(&self, profile: Profile) -> StorageResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"UPDATE profiles
                SET name = $2, email = $3, updated_at = $4
                WHERE id = $1
                RETURNING {COLUMNS}"#
        ))
        .bind(profile.id.as_uuid())
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(profile.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Profile::from).ok_or(StorageError::NotFound)
    }

    async fn delete(&self, id: &ProfileId) -> StorageResult<()> {
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
