use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::adapters::{
    controllers::{
        auth_controller::AuthController, file_controller::FileController,
        health_controller::HealthController, upload_controller::UploadController,
    },
    middleware::require_session,
    state::AppState,
};

/// Queued files travel in the request body, so axum's 2 MiB default does not
/// apply here. `max_upload_bytes` sets an explicit ceiling instead.
fn queue_routes(max_upload_bytes: Option<usize>) -> MethodRouter<AppState> {
    let add_files = post(UploadController::add_files).layer(DefaultBodyLimit::disable());
    let add_files = match max_upload_bytes {
        Some(limit) => add_files.layer(RequestBodyLimitLayer::new(limit)),
        None => add_files,
    };

    get(UploadController::get_queue).merge(add_files)
}

pub fn router(app_state: AppState, cors: CorsLayer) -> Router {
    // Routes that need a signed-in user
    let protected_routes = Router::new()
        .route("/api/v1/uploads", post(UploadController::start_upload))
        .route("/api/v1/files", get(FileController::list_files))
        .route("/api/v1/files/refresh", post(FileController::refresh_files))
        .route(
            "/api/v1/files/{file_id}/preview",
            get(FileController::preview_file),
        )
        .route(
            "/api/v1/files/{file_id}/download",
            get(FileController::download_file),
        )
        .route("/api/v1/files/{file_id}/share", get(FileController::share_file))
        .route("/api/v1/files/{file_id}", delete(FileController::delete_file))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            require_session,
        ));

    let public_routes = Router::new()
        .route("/api/v1/health", get(HealthController::health_check))
        .route("/api/v1/auth/login", post(AuthController::login))
        .route("/api/v1/auth/signup", post(AuthController::signup))
        .route("/api/v1/auth/logout", post(AuthController::logout))
        .route("/api/v1/auth/me", get(AuthController::me))
        .route(
            "/api/v1/uploads/queue",
            queue_routes(app_state.local_config.max_upload_bytes),
        )
        .route(
            "/api/v1/uploads/queue/{name}",
            delete(UploadController::remove_file),
        )
        .route("/api/v1/uploads/progress", get(UploadController::get_progress))
        .route("/api/v1/uploads/cancel", post(UploadController::cancel_upload));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(cors)
        .with_state(app_state)
}
