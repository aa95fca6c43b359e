use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{
    adapters::dto::upload_dto::{
        AddFilesResponse, CancelResponse, QueueResponse, UploadStatusResponse,
    },
    application::{drive_session::DriveSession, error::ApplicationError},
    domain::models::file::QueuedFile,
};

pub struct UploadController;

impl UploadController {
    /// GET /api/v1/uploads/queue
    pub async fn get_queue(State(drive): State<Arc<DriveSession>>) -> Json<QueueResponse> {
        let entries = drive.queued_files().await;
        Json(QueueResponse::from_entries(&entries))
    }

    /// POST /api/v1/uploads/queue
    /// One multipart part per selected file.
    pub async fn add_files(
        State(drive): State<Arc<DriveSession>>,
        mut multipart: Multipart,
    ) -> Result<(StatusCode, Json<AddFilesResponse>), ApplicationError> {
        let mut files = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let content_type = field.content_type().map(str::to_string);

            let content = field.bytes().await.map_err(|e| {
                warn!("Cannot read bytes of {}: {}", file_name, e);
                ApplicationError::BadRequest("Invalid file data".to_string())
            })?;

            files.push(QueuedFile::new(file_name, content, content_type));
        }

        if files.is_empty() {
            return Err(ApplicationError::EmptyQueue);
        }

        let added = drive.add_files(files).await?;
        let entries = drive.queued_files().await;

        Ok((
            StatusCode::CREATED,
            Json(AddFilesResponse {
                added,
                queue: QueueResponse::from_entries(&entries),
            }),
        ))
    }

    /// DELETE /api/v1/uploads/queue/{name}
    pub async fn remove_file(
        State(drive): State<Arc<DriveSession>>,
        Path(name): Path<String>,
    ) -> Result<Json<QueueResponse>, ApplicationError> {
        if !drive.remove_file(&name).await? {
            return Err(ApplicationError::NotFound);
        }

        let entries = drive.queued_files().await;
        Ok(Json(QueueResponse::from_entries(&entries)))
    }

    /// POST /api/v1/uploads
    pub async fn start_upload(
        State(drive): State<Arc<DriveSession>>,
    ) -> Result<(StatusCode, Json<UploadStatusResponse>), ApplicationError> {
        let status = drive.start_upload().await?;
        info!("Upload started");
        Ok((StatusCode::ACCEPTED, Json(status.into())))
    }

    /// GET /api/v1/uploads/progress
    pub async fn get_progress(State(drive): State<Arc<DriveSession>>) -> Json<UploadStatusResponse> {
        Json(drive.upload_status().into())
    }

    /// POST /api/v1/uploads/cancel
    pub async fn cancel_upload(State(drive): State<Arc<DriveSession>>) -> Json<CancelResponse> {
        Json(CancelResponse {
            cancelled: drive.cancel_upload().await,
        })
    }
}
