//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the FormStore trait. Forms
//! and responses are stored as JSONB documents, mirroring the document-store
//! layout the builder publishes into.

use super::{StorageError, traits::*};
use crate::models::{Answer, FormRecord, FormResponse, FormSnapshot, FormUpdate};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL storage backend implementation.
#[derive(Debug, Clone)]
pub struct PostgresFormStore {
    pool: PgPool,
}

impl PostgresFormStore {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            StorageError::ConnectionError(format!("Failed to connect to database: {}", e))
        })?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StorageError::ConnectionError(format!("Migration failed: {}", e)))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StorageError::SerializationError(e.to_string())
        }
        other => StorageError::ConnectionError(other.to_string()),
    }
}

#[async_trait]
impl FormStore for PostgresFormStore {
    async fn create_form(
        &self,
        owner: &UserContext,
        snapshot: FormSnapshot,
    ) -> Result<Uuid, StorageError> {
        let record = FormRecord::from_snapshot(&owner.user_id, snapshot);

        sqlx::query(
            r#"
            INSERT INTO forms (id, owner_id, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(&record.created_by)
        .bind(Json(&record))
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(record.id)
    }

    async fn get_form(&self, form_id: Uuid) -> Result<Option<FormRecord>, StorageError> {
        let row = sqlx::query("SELECT data FROM forms WHERE id = $1")
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(|row| {
            row.try_get::<Json<FormRecord>, _>("data")
                .map(|data| data.0)
                .map_err(db_error)
        })
        .transpose()
    }

    async fn update_form(
        &self,
        form_id: Uuid,
        update: FormUpdate,
    ) -> Result<FormRecord, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let row = sqlx::query("SELECT data FROM forms WHERE id = $1 FOR UPDATE")
            .bind(form_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?
            .ok_or_else(|| StorageError::form_not_found(form_id))?;

        let mut record = row
            .try_get::<Json<FormRecord>, _>("data")
            .map_err(db_error)?
            .0;
        record.apply_update(update);

        sqlx::query("UPDATE forms SET data = $2, updated_at = $3 WHERE id = $1")
            .bind(form_id)
            .bind(Json(&record))
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(record)
    }

    async fn delete_form(&self, form_id: Uuid) -> Result<(), StorageError> {
        // Responses go with the form via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(form_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::form_not_found(form_id));
        }
        Ok(())
    }

    async fn list_forms_by_owner(&self, owner_id: &str) -> Result<Vec<FormRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT data FROM forms WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<Json<FormRecord>, _>("data")
                    .map(|data| data.0)
                    .map_err(db_error)
            })
            .collect()
    }

    async fn save_response(
        &self,
        form_id: Uuid,
        answers: Vec<Answer>,
    ) -> Result<FormResponse, StorageError> {
        let exists = sqlx::query("SELECT 1 FROM forms WHERE id = $1")
            .bind(form_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        if exists.is_none() {
            return Err(StorageError::form_not_found(form_id));
        }

        let response = FormResponse::new(form_id, answers);
        sqlx::query(
            r#"
            INSERT INTO form_responses (id, form_id, data, submitted_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(response.id)
        .bind(form_id)
        .bind(Json(&response))
        .bind(response.submitted_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(response)
    }

    async fn list_responses(&self, form_id: Uuid) -> Result<Vec<FormResponse>, StorageError> {
        let rows = sqlx::query(
            "SELECT data FROM form_responses WHERE form_id = $1 ORDER BY submitted_at ASC",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<Json<FormResponse>, _>("data")
                    .map(|data| data.0)
                    .map_err(db_error)
            })
            .collect()
    }
}
