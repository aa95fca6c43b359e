use async_trait::async_trait;
use sqlx::query_as;
use uuid::Uuid;

use crate::{
    application::{
        dto::metadata_dto::FileRecordDTO, error::ApplicationError,
        repositories::metadata_repository::MetadataRepository,
    },
    domain::models::{file_record::FileRecord, user::UserIdentity},
};

pub struct PgMetadataRepository {
    pool: sqlx::PgPool,
}

impl PgMetadataRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataRepository for PgMetadataRepository {
    async fn save_file_record(&self, record: FileRecordDTO) -> Result<FileRecord, ApplicationError> {
        let mut record = record;
        record.sanitize();

        let query = r#"
            INSERT INTO drive.files (
                id, user_id, name, content_type, size, path, download_url, uploaded_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id, path) DO UPDATE SET
                name = EXCLUDED.name,
                content_type = EXCLUDED.content_type,
                size = EXCLUDED.size,
                download_url = EXCLUDED.download_url,
                uploaded_at = EXCLUDED.uploaded_at
            RETURNING *
        "#;

        let saved: FileRecord = query_as::<_, FileRecord>(query)
            .bind(Uuid::new_v4())
            .bind(&record.owner_id)
            .bind(&record.name)
            .bind(&record.content_type)
            .bind(record.size as i64)
            .bind(&record.path)
            .bind(&record.download_url)
            .bind(record.uploaded_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(saved)
    }

    async fn list_file_records(&self, owner_id: &str) -> Result<Vec<FileRecord>, ApplicationError> {
        let query = "SELECT * FROM drive.files WHERE user_id = $1 ORDER BY uploaded_at DESC";

        query_as::<_, FileRecord>(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))
    }

    async fn delete_file_record(&self, id: &str) -> Result<(), ApplicationError> {
        let id = Uuid::parse_str(id).map_err(|_| ApplicationError::NotFound)?;

        let deleted = sqlx::query("DELETE FROM drive.files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            return Err(ApplicationError::NotFound);
        }

        Ok(())
    }

    async fn create_user_profile(&self, user: &UserIdentity) -> Result<(), ApplicationError> {
        let query = r#"
            INSERT INTO drive.user_profiles (user_id, email, created_at, storage_used)
            VALUES ($1, $2, NOW(), 0)
            ON CONFLICT (user_id) DO UPDATE SET email = EXCLUDED.email
        "#;

        sqlx::query(query)
            .bind(&user.id)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
