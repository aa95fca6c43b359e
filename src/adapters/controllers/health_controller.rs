use axum::{extract::State, Json};
use serde::Serialize;
use sysinfo::System;
use tracing::info;

use crate::{adapters::state::AppState, application::drive_session::UploadState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub metadata_store: bool,
    pub signed_url_ttl_secs: u64,
    pub upload_state: UploadState,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub memory_usage_percent: f32,
}

impl SystemMetrics {
    /// Samples CPU and memory only.
    fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let used = sys.used_memory();
        let total = sys.total_memory();

        Self {
            cpu_usage_percent: sys.global_cpu_usage(),
            memory_used_bytes: used,
            memory_total_bytes: total,
            memory_usage_percent: if total > 0 {
                used as f32 / total as f32 * 100.0
            } else {
                0.0
            },
        }
    }
}

pub struct HealthController;

impl HealthController {
    /// GET /api/v1/health
    pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
        info!("Health check requested");

        let drive = &app_state.drive;
        Json(HealthResponse {
            status: "healthy".to_string(),
            provider: drive.provider_name(),
            metadata_store: drive.has_metadata_store(),
            signed_url_ttl_secs: app_state.local_config.signed_url_ttl_secs,
            upload_state: drive.upload_status().state,
            metrics: SystemMetrics::collect(),
        })
    }
}
