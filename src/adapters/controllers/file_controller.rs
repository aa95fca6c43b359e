use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::info;

use crate::{
    adapters::dto::file_dto::{
        DeleteFileQuery, DeleteResponse, FileListResponse, LinkResponse, ListFilesQuery,
        PreviewResponse, RefreshResponse, DOWNLOAD_MESSAGE, SHARE_MESSAGE,
    },
    application::{
        catalog::{FileQuery, SortOrder},
        drive_session::DriveSession,
        error::ApplicationError,
    },
    domain::models::file_type::FileCategory,
};

pub struct FileController;

impl FileController {
    /// GET /api/v1/files?search=&category=&sort=
    pub async fn list_files(
        State(drive): State<Arc<DriveSession>>,
        Query(params): Query<ListFilesQuery>,
    ) -> Result<Json<FileListResponse>, ApplicationError> {
        let category = match params.category.as_deref() {
            Some(value) => FileCategory::parse_filter(value).map_err(ApplicationError::BadRequest)?,
            None => None,
        };
        let sort = match params.sort.as_deref() {
            Some(value) => value.parse::<SortOrder>().map_err(ApplicationError::BadRequest)?,
            None => SortOrder::default(),
        };

        let query = FileQuery {
            search: params.search,
            category,
            sort,
        };

        let listing = drive.list_files(&query).await?;
        Ok(Json(listing.into()))
    }

    /// POST /api/v1/files/refresh
    pub async fn refresh_files(
        State(drive): State<Arc<DriveSession>>,
    ) -> Result<Json<RefreshResponse>, ApplicationError> {
        let count = drive.refresh_files().await?;
        info!("File catalog refreshed: {} files", count);
        Ok(Json(RefreshResponse { count }))
    }

    /// GET /api/v1/files/{file_id}/preview
    pub async fn preview_file(
        State(drive): State<Arc<DriveSession>>,
        Path(file_id): Path<String>,
    ) -> Result<Json<PreviewResponse>, ApplicationError> {
        let preview = drive.preview_file(&file_id).await?;
        Ok(Json(preview.into()))
    }

    /// GET /api/v1/files/{file_id}/download
    pub async fn download_file(
        State(drive): State<Arc<DriveSession>>,
        Path(file_id): Path<String>,
    ) -> Result<Json<LinkResponse>, ApplicationError> {
        let link = drive.download_link(&file_id).await?;
        Ok(Json(LinkResponse::new(link, DOWNLOAD_MESSAGE)))
    }

    /// GET /api/v1/files/{file_id}/share
    pub async fn share_file(
        State(drive): State<Arc<DriveSession>>,
        Path(file_id): Path<String>,
    ) -> Result<Json<LinkResponse>, ApplicationError> {
        let link = drive.share_link(&file_id).await?;
        Ok(Json(LinkResponse::new(link, SHARE_MESSAGE)))
    }

    /// DELETE /api/v1/files/{file_id}?confirm=true
    pub async fn delete_file(
        State(drive): State<Arc<DriveSession>>,
        Path(file_id): Path<String>,
        Query(params): Query<DeleteFileQuery>,
    ) -> Result<Json<DeleteResponse>, ApplicationError> {
        let outcome = drive.delete_file(&file_id, params.confirm).await?;
        Ok(Json(outcome.into()))
    }
}
