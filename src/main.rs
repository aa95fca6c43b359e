use std::{sync::Arc, time::Duration};

use drive_service::{
    adapters::{repositories::PgMetadataRepository, routes::router, state::AppState},
    application::{
        drive_session::DriveSession,
        dto::{local_config_dto::LocalConfigDTO, secrets_dto::SecretsDTO},
        repositories::metadata_repository::MetadataRepository,
    },
    domain::config::{local::LocalConfig, secrets::Secrets},
    services,
};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let local_config: LocalConfig = LocalConfigDTO::from_env()
        .expect("ERROR: Invalid local configuration")
        .into();
    let secrets: Secrets = SecretsDTO::from_env().into();

    tracing::info!(
        "Starting drive-service with provider: {}",
        local_config.provider
    );

    // Configure CORS
    let cors = if let Some(allowed_origins) = &local_config.cors_allowed_origins {
        let origins: Vec<_> = allowed_origins
            .split(',')
            .map(|s| s.trim().parse().expect("Invalid CORS origin"))
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow all origins if not specified (only for development)
        CorsLayer::permissive()
    };

    let mut backend = services::create_backend(&local_config.provider, &secrets)
        .expect("Failed to create storage backend");

    // Supabase keeps file records in Postgres when a database is configured
    let database_url = secrets
        .supabase_secrets
        .as_ref()
        .and_then(|s| s.database_url.clone());
    if backend.metadata.is_none() {
        if let Some(database_url) = database_url {
            tracing::info!("Connecting to database...");
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&database_url)
                .await
                .expect("ERROR: Failed to connect to PostgreSQL database. Check DATABASE_URL and network connectivity.");
            tracing::info!("Database connection established");

            backend = backend
                .with_metadata(Arc::new(PgMetadataRepository::new(pool)) as Arc<dyn MetadataRepository>);
        }
    }

    let drive = Arc::new(DriveSession::new(
        backend.auth,
        backend.storage,
        backend.metadata,
        Duration::from_secs(local_config.signed_url_ttl_secs),
    ));
    let _auth_watch = drive.watch_auth_changes();

    let port = local_config.port;
    let app_state = AppState {
        local_config: Arc::new(local_config),
        drive,
    };

    let router = router(app_state, cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
