use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use crate::{application::dto::metadata_dto::FileRecordDTO, domain::models::file_record::FileRecord};

impl FromRow<'_, PgRow> for FileRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let id: Uuid = row.try_get("id")?;
        let size: i64 = row.try_get("size")?;

        Ok(FileRecord {
            id: id.to_string(),
            owner_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            content_type: row.try_get("content_type")?,
            size: size.max(0) as u64,
            path: row.try_get("path")?,
            download_url: row.try_get("download_url")?,
            uploaded_at: row.try_get("uploaded_at")?,
        })
    }
}

impl FileRecordDTO {
    pub fn sanitize(&mut self) {
        self.size = std::cmp::min(self.size, i64::MAX as u64);
        self.name = self.name.trim().to_string();
    }
}
